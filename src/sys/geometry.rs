//! Integer geometry shared by the tree and the backend.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self { Size { width, height } }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Rect { x, y, width, height }
    }

    pub fn size(&self) -> Size { Size::new(self.width, self.height) }

    pub fn max_x(&self) -> i32 { self.x + self.width }

    /// Places a rectangle of `size` in the middle of `self`, relative to its origin.
    pub fn centered(&self, size: Size) -> Rect {
        Rect {
            x: (self.width - size.width) / 2,
            y: (self.height - size.height) / 2,
            width: size.width,
            height: size.height,
        }
    }
}
