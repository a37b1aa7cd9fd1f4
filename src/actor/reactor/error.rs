use thiserror::Error;

use crate::layout_engine::LayoutError;

#[derive(Debug, Error)]
pub enum ReactorError {
    #[error("Unknown command: {0:?}")]
    UnknownCommand(String),
    #[error("{command}: expected {expected}")]
    InvalidArgument {
        command: &'static str,
        expected: &'static str,
    },
    #[error("No active workspace")]
    NoActiveWorkspace,
    #[error("Layout engine error: {0}")]
    Layout(#[from] LayoutError),
    #[error("Failed to reload config: {0}")]
    Config(String),
}
