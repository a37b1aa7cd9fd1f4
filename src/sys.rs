pub mod backend;
pub mod geometry;
