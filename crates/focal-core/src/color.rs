//! Plain RGBA colors carried by derived display state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl ColorRgba {
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const RED: Self = Self::rgb(255, 59, 48);
    pub const GREEN: Self = Self::rgb(52, 199, 89);
    pub const BLUE: Self = Self::rgb(0, 122, 255);
    pub const ORANGE: Self = Self::rgb(255, 149, 0);
    pub const PURPLE: Self = Self::rgb(175, 82, 222);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }
}
