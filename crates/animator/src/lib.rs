//! Scene animation: the per-frame update and the loop that drives it.
//!
//! # Invariants
//! - Viewport size and mouse offset are always the latest observed values.
//! - Per-frame updates are pure arithmetic over already-valid state; they
//!   never fail.
//! - The frame loop holds at most one pending request.

mod animator;
mod clock;
mod frame_loop;

pub use animator::{FrameState, SceneAnimator, rect_light_extent, rect_light_intensity};
pub use clock::{Clock, ManualClock, SystemClock};
pub use frame_loop::{FrameHandle, FrameHost, FrameLoop};

pub fn crate_info() -> &'static str {
    "glowgrid-animator v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("animator"));
    }
}
