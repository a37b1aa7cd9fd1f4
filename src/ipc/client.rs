use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

use nix::unistd::{Pid, Uid};

use super::protocol::{IpcError, Message, read_message, write_message};

/// Environment variable holding the socket path of the running instance.
pub const SOCKET_ENV: &str = "SPIRESOCK";

/// The socket path for a new server: `$SPIRESOCK` if set, otherwise a
/// per-user, per-process path in the runtime directory.
pub fn socket_path() -> PathBuf {
    match std::env::var_os(SOCKET_ENV) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => default_socket_path(),
    }
}

pub fn default_socket_path() -> PathBuf {
    let dir = std::env::var_os("XDG_RUNTIME_DIR")
        .filter(|d| !d.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/tmp"));
    dir.join(format!("spire-ipc.{}.{}.sock", Uid::current(), Pid::this()))
}

/// The socket a client should talk to, taken from `$SPIRESOCK`.
pub fn running_socket_path() -> Result<PathBuf, IpcError> {
    std::env::var_os(SOCKET_ENV)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .ok_or(IpcError::SocketPathUnavailable)
}

pub struct IpcClient {
    stream: UnixStream,
}

impl IpcClient {
    pub fn connect(path: &Path) -> Result<IpcClient, IpcError> {
        let stream = UnixStream::connect(path)?;
        Ok(IpcClient { stream })
    }

    /// Sends one request and waits for its reply.
    pub fn request(&mut self, kind: impl Into<u32>, payload: &[u8]) -> Result<Message, IpcError> {
        let kind = kind.into();
        write_message(&mut self.stream, kind, payload)?;
        let reply = read_message(&mut self.stream)?;
        if reply.kind != kind {
            return Err(IpcError::UnexpectedReply { sent: kind, got: reply.kind });
        }
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_names_user_and_process() {
        let path = default_socket_path();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("spire-ipc."));
        assert!(name.ends_with(&format!(".{}.sock", std::process::id())));
    }

    #[test]
    fn connecting_to_a_missing_socket_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = IpcClient::connect(&dir.path().join("nothing.sock")).err().unwrap();
        assert!(matches!(err, IpcError::Io(_)));
    }
}
