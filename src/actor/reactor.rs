//! The reactor owns the container tree and the backend.
//!
//! Every change to the tree happens on the reactor thread, in the order
//! events arrive on its channel. Other threads talk to it only by sending
//! [`Event`]s; IPC requests carry a oneshot sender for the reply.

mod error;
mod query;

mod events {
    pub mod command;
    pub mod system;
    pub mod window;
}


use std::path::PathBuf;
use std::thread;

pub use error::ReactorError;
pub use events::command::Command;
use events::command::CommandEventHandler;
use events::system::SystemEventHandler;
use events::window::WindowEventHandler;
use tokio::sync::oneshot;
use tracing::{debug, info, instrument};

use crate::actor;
use crate::common::config::Config;
use crate::ipc::protocol::Message;
use crate::layout_engine::LayoutEngine;
use crate::model::container::NodeType;
use crate::model::tree::NodeId;
use crate::sys::backend::{Backend, OutputHandle, ViewHandle};

#[derive(Debug)]
pub enum Event {
    OutputCreated(OutputHandle),
    OutputDestroyed(OutputHandle),
    ViewCreated {
        handle: ViewHandle,
        floating: bool,
    },
    ViewDestroyed(ViewHandle),
    ViewFocused(ViewHandle),
    Ipc {
        request: Message,
        response: oneshot::Sender<Message>,
    },
    ReloadConfig(Config),
    Shutdown,
}

pub type Sender = actor::Sender<Event>;
pub type Receiver = actor::Receiver<Event>;

pub fn channel() -> (Sender, Receiver) { actor::channel() }

pub struct Reactor<B> {
    pub(super) layout_engine: LayoutEngine,
    pub(super) backend: B,
    /// Where `reload` reads the configuration from.
    config_path: Option<PathBuf>,
}

impl<B: Backend> Reactor<B> {
    pub fn new(config: Config, backend: B) -> Self {
        Reactor {
            layout_engine: LayoutEngine::new(config),
            backend,
            config_path: None,
        }
    }

    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    pub fn layout_engine(&self) -> &LayoutEngine { &self.layout_engine }

    pub fn backend(&self) -> &B { &self.backend }

    pub fn backend_mut(&mut self) -> &mut B { &mut self.backend }

    pub fn config_path(&self) -> PathBuf {
        self.config_path.clone().unwrap_or_else(crate::common::config::config_file)
    }

    /// Handles events until the channel closes or a [`Event::Shutdown`] arrives.
    pub fn run(mut self, mut events: Receiver) {
        while let Some((span, event)) = events.blocking_recv() {
            let _guard = span.enter();
            if let Event::Shutdown = event {
                info!("Reactor shutting down");
                break;
            }
            self.handle_event(event);
        }
    }

    #[instrument(name = "reactor::handle_event", skip(self))]
    pub fn handle_event(&mut self, event: Event) {
        debug!(?event, "Event");
        match event {
            Event::OutputCreated(handle) => SystemEventHandler::handle_output_created(self, handle),
            Event::OutputDestroyed(handle) => {
                SystemEventHandler::handle_output_destroyed(self, handle)
            }
            Event::ReloadConfig(config) => SystemEventHandler::handle_config_updated(self, config),
            Event::ViewCreated { handle, floating } => {
                WindowEventHandler::handle_view_created(self, handle, floating)
            }
            Event::ViewDestroyed(handle) => WindowEventHandler::handle_view_destroyed(self, handle),
            Event::ViewFocused(handle) => WindowEventHandler::handle_view_focused(self, handle),
            Event::Ipc { request, response } => {
                let reply = self.handle_ipc(request);
                if response.send(reply).is_err() {
                    debug!("IPC client went away before the reply was ready");
                }
            }
            Event::Shutdown => {}
        }
        self.layout_engine.debug_tree("after event");
    }

    pub fn handle_command(&mut self, cmd: Command) -> Result<(), ReactorError> {
        CommandEventHandler::handle_command(self, cmd)
    }

    /// The node new tiled views go next to: the focused tiled node of the
    /// active workspace, or the workspace itself when nothing tiled has focus.
    pub(super) fn tiling_anchor(&self) -> Option<NodeId> {
        let engine = &self.layout_engine;
        let workspace = engine.active_workspace()?;
        let leaf = engine.focused_leaf();
        let tiled = leaf != workspace
            && engine.get(leaf).is_some_and(|c| {
                !c.is_floating && matches!(c.node_type(), NodeType::View | NodeType::Container)
            });
        Some(if tiled { leaf } else { workspace })
    }
}

impl<B: Backend + Send + 'static> Reactor<B> {
    /// Runs the reactor on its own thread.
    pub fn spawn(self, events: Receiver) -> std::io::Result<thread::JoinHandle<()>> {
        thread::Builder::new().name("reactor".to_string()).spawn(move || self.run(events))
    }
}
