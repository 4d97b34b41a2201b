//! Input: host events mapped to a small, host-neutral event set.
//!
//! # Invariants
//! - Positions and sizes are logical pixels; hosts convert before emitting.
//! - The animator consumes [`InputEvent`]s, never raw window events.

pub mod event;

pub use event::{InputEvent, pointer_offset};

pub fn crate_info() -> &'static str {
    "glowgrid-input v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_info_works() {
        assert!(crate_info().contains("input"));
    }
}
