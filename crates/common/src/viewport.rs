use serde::{Deserialize, Serialize};

/// Logical viewport size: the window's inner size divided by its scale factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width over height. A zero-height viewport reports 1.0.
    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }
}

/// Normalized pointer offset from the viewport center.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MouseOffset {
    pub x: f32,
    pub y: f32,
}

impl MouseOffset {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// The renderer's backing buffer: a logical size plus a capped pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawingBuffer {
    size: Viewport,
    pixel_ratio: f32,
}

impl DrawingBuffer {
    pub fn new(size: Viewport, device_pixel_ratio: f32, max_pixel_ratio: f32) -> Self {
        let mut buffer = Self {
            size,
            pixel_ratio: 1.0,
        };
        buffer.set_pixel_ratio(device_pixel_ratio, max_pixel_ratio);
        buffer
    }

    pub fn set_size(&mut self, size: Viewport) {
        self.size = size;
    }

    /// Store `min(device_pixel_ratio, max_pixel_ratio)`.
    pub fn set_pixel_ratio(&mut self, device_pixel_ratio: f32, max_pixel_ratio: f32) {
        self.pixel_ratio = device_pixel_ratio.min(max_pixel_ratio);
    }

    pub fn size(&self) -> Viewport {
        self.size
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Backing buffer size in physical pixels, never smaller than 1x1.
    pub fn physical_size(&self) -> (u32, u32) {
        let scale = |v: f32| ((v * self.pixel_ratio).round() as u32).max(1);
        (scale(self.size.width), scale(self.size.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_and_center() {
        let v = Viewport::new(1600.0, 900.0);
        assert!((v.aspect() - 16.0 / 9.0).abs() < 1e-6);
        assert_eq!(v.center(), (800.0, 450.0));
        assert_eq!(Viewport::new(10.0, 0.0).aspect(), 1.0);
    }

    #[test]
    fn pixel_ratio_is_capped() {
        let buffer = DrawingBuffer::new(Viewport::new(800.0, 600.0), 3.0, 2.0);
        assert_eq!(buffer.pixel_ratio(), 2.0);
        assert_eq!(buffer.physical_size(), (1600, 1200));

        let buffer = DrawingBuffer::new(Viewport::new(800.0, 600.0), 1.25, 2.0);
        assert_eq!(buffer.pixel_ratio(), 1.25);
        assert_eq!(buffer.physical_size(), (1000, 750));
    }

    #[test]
    fn physical_size_never_zero() {
        let buffer = DrawingBuffer::new(Viewport::new(0.0, 0.0), 1.0, 2.0);
        assert_eq!(buffer.physical_size(), (1, 1));
    }
}
