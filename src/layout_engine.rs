pub mod engine;
mod error;
mod visibility;
mod workspaces;

pub use engine::LayoutEngine;
pub use error::LayoutError;
