use glowgrid_common::{MouseOffset, Viewport};

/// An input event any host (native window, headless driver) can produce.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// The viewport changed size or moved to a display with another pixel ratio.
    Resized {
        viewport: Viewport,
        device_pixel_ratio: f32,
    },
    /// The pointer moved to a client-space position.
    PointerMoved { client_x: f32, client_y: f32 },
}

/// Normalize a client-space pointer position into an offset from the
/// viewport center, scaled down by `divisor`.
pub fn pointer_offset(client_x: f32, client_y: f32, viewport: Viewport, divisor: f32) -> MouseOffset {
    let (cx, cy) = viewport.center();
    let offset = MouseOffset::new((client_x - cx) / divisor, (client_y - cy) / divisor);
    tracing::trace!(x = offset.x, y = offset.y, "pointer offset");
    offset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_maps_to_zero() {
        let v = Viewport::new(1280.0, 720.0);
        assert_eq!(pointer_offset(640.0, 360.0, v, 100.0), MouseOffset::default());
    }

    #[test]
    fn corners_scale_by_divisor() {
        let v = Viewport::new(1280.0, 720.0);
        assert_eq!(pointer_offset(0.0, 0.0, v, 100.0), MouseOffset::new(-6.4, -3.6));
        assert_eq!(pointer_offset(1280.0, 720.0, v, 100.0), MouseOffset::new(6.4, 3.6));
    }

    #[test]
    fn events_are_comparable() {
        let a = InputEvent::PointerMoved {
            client_x: 1.0,
            client_y: 2.0,
        };
        assert!(matches!(a, InputEvent::PointerMoved { .. }));
        let b = InputEvent::Resized {
            viewport: Viewport::new(800.0, 600.0),
            device_pixel_ratio: 2.0,
        };
        assert_ne!(a, b);
    }
}
