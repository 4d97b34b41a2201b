//! Shared value types for the glowgrid workspace.
//!
//! # Invariants
//! - Viewport sizes are logical pixels; physical sizes only appear through
//!   [`DrawingBuffer::physical_size`].
//! - Colors are stored in sRGB space and converted to linear on demand.

mod color;
mod types;
mod viewport;

pub use color::{Color, ColorError};
pub use types::Transform;
pub use viewport::{DrawingBuffer, MouseOffset, Viewport};

pub fn crate_info() -> &'static str {
    "glowgrid-common v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("common"));
    }
}
