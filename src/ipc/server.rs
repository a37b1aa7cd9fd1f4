use std::io::ErrorKind;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::thread;

use tokio::sync::oneshot;
use tracing::{debug, error, info, trace, warn};

use super::protocol::{IpcError, Message, read_message};
use crate::actor::reactor::{self, Event};

/// Listening end of the IPC socket.
pub struct IpcServer {
    path: PathBuf,
    listener: UnixListener,
}

impl IpcServer {
    /// Binds `path`, replacing a stale socket left behind by an earlier run.
    pub fn bind(path: &Path) -> Result<IpcServer, IpcError> {
        remove_socket(path);
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let listener = UnixListener::bind(path)?;
        info!(path = %path.display(), "IPC server listening");
        Ok(IpcServer { path: path.to_owned(), listener })
    }

    pub fn path(&self) -> &Path { &self.path }

    /// Accepts connections on a background thread.
    pub fn spawn(self, reactor_tx: reactor::Sender) -> std::io::Result<thread::JoinHandle<()>> {
        thread::Builder::new()
            .name("ipc-server".to_string())
            .spawn(move || self.serve(reactor_tx))
    }

    fn serve(self, reactor_tx: reactor::Sender) {
        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    let reactor_tx = reactor_tx.clone();
                    let spawned = thread::Builder::new()
                        .name("ipc-client".to_string())
                        .spawn(move || handle_connection(stream, reactor_tx));
                    if let Err(e) = spawned {
                        error!("Failed to spawn IPC connection thread: {e}");
                    }
                }
                Err(e) => warn!("IPC connection error: {e}"),
            }
        }
    }
}

pub fn remove_socket(path: &Path) {
    if path.exists() {
        let _ = std::fs::remove_file(path);
    }
}

/// Serves one client until it hangs up or sends something unreadable.
fn handle_connection(mut stream: UnixStream, reactor_tx: reactor::Sender) {
    trace!("IPC client connected");
    loop {
        let request = match read_message(&mut stream) {
            Ok(request) => request,
            Err(IpcError::Io(e)) if e.kind() == ErrorKind::UnexpectedEof => {
                trace!("IPC client disconnected");
                return;
            }
            Err(e) => {
                warn!("Closing IPC connection: {e}");
                return;
            }
        };
        debug!(kind = request.kind, len = request.payload.len(), "IPC request");

        let reply = match forward(&reactor_tx, request) {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Closing IPC connection: {e}");
                return;
            }
        };
        if let Err(e) = reply.write_to(&mut stream) {
            debug!("Failed to write IPC reply: {e}");
            return;
        }
    }
}

/// Hands a request to the reactor and blocks until it answers.
pub fn forward(reactor_tx: &reactor::Sender, request: Message) -> Result<Message, IpcError> {
    let (tx, rx) = oneshot::channel();
    reactor_tx
        .try_send(Event::Ipc { request, response: tx })
        .map_err(|_| IpcError::Disconnected)?;
    rx.blocking_recv().map_err(|_| IpcError::Disconnected)
}
