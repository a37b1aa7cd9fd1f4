pub mod container;
pub mod selection;
pub mod server;
pub mod tree;
