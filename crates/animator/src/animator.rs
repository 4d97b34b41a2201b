use crate::clock::{Clock, SystemClock};
use glam::Vec3;
use glowgrid_common::{DrawingBuffer, MouseOffset, Viewport};
use glowgrid_input::{InputEvent, pointer_offset};
use glowgrid_scene::{AnimationConfig, ConfigError, Scene, SceneConfig};
use std::fmt;

/// Area light edge length at `elapsed`: grows at `growth_rate` and saturates
/// at half of the matching viewport dimension.
pub fn rect_light_extent(elapsed: f32, viewport_dimension: f32, growth_rate: f32) -> f32 {
    (elapsed * growth_rate).min(viewport_dimension / 2.0)
}

/// Area light intensity at `elapsed`: a sine of `amplitude`, never below `floor`.
pub fn rect_light_intensity(elapsed: f32, amplitude: f32, floor: f32) -> f32 {
    (elapsed.sin() * amplitude).max(floor)
}

/// Values written by one frame update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    pub frame: u64,
    pub elapsed: f32,
    /// Time since the previous update. Reported only; the animation reads
    /// absolute time.
    pub delta: f32,
    pub rect_light_width: f32,
    pub rect_light_height: f32,
    pub rect_light_intensity: f32,
    pub camera_position: Vec3,
    pub mouse_light_position: Vec3,
}

impl fmt::Display for FrameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frame={} t={:.3} dt={:.3} rect={:.2}x{:.2} intensity={:.3} camera=({:.2}, {:.2}, {:.2}) mouse_light=({:.2}, {:.2}, {:.2})",
            self.frame,
            self.elapsed,
            self.delta,
            self.rect_light_width,
            self.rect_light_height,
            self.rect_light_intensity,
            self.camera_position.x,
            self.camera_position.y,
            self.camera_position.z,
            self.mouse_light_position.x,
            self.mouse_light_position.y,
            self.mouse_light_position.z,
        )
    }
}

/// Owns the scene and every piece of state the frame update reads.
///
/// Resize and pointer handlers mutate it between frames; [`SceneAnimator::tick`]
/// maps elapsed time and pointer offset onto the lights and camera.
pub struct SceneAnimator<C: Clock = SystemClock> {
    scene: Scene,
    animation: AnimationConfig,
    max_pixel_ratio: f32,
    viewport: Viewport,
    drawing_buffer: DrawingBuffer,
    mouse: MouseOffset,
    camera_distance: f32,
    mouse_light_depth: f32,
    clock: C,
    last_elapsed: f32,
    frame: u64,
}

impl<C: Clock> SceneAnimator<C> {
    pub fn new(
        config: &SceneConfig,
        viewport: Viewport,
        device_pixel_ratio: f32,
        clock: C,
    ) -> Result<Self, ConfigError> {
        let scene = Scene::from_config(config, viewport.aspect())?;
        tracing::info!(
            width = viewport.width,
            height = viewport.height,
            meshes = scene.meshes().len(),
            "scene animator ready"
        );
        Ok(Self {
            scene,
            animation: config.animation,
            max_pixel_ratio: config.renderer.max_pixel_ratio,
            viewport,
            drawing_buffer: DrawingBuffer::new(
                viewport,
                device_pixel_ratio,
                config.renderer.max_pixel_ratio,
            ),
            mouse: MouseOffset::default(),
            camera_distance: config.camera.distance,
            mouse_light_depth: config.mouse_light.position.z,
            clock,
            last_elapsed: 0.0,
            frame: 0,
        })
    }

    /// Read the clock and apply one frame update.
    pub fn tick(&mut self) -> FrameState {
        let elapsed = self.clock.elapsed();
        self.advance_to(elapsed)
    }

    /// Apply the frame update for an explicit elapsed time in seconds.
    pub fn advance_to(&mut self, elapsed: f32) -> FrameState {
        let delta = elapsed - self.last_elapsed;
        self.last_elapsed = elapsed;
        self.frame += 1;

        let a = &self.animation;
        let light = &mut self.scene.rect_light;
        light.width = rect_light_extent(elapsed, self.viewport.width, a.growth_rate);
        light.height = rect_light_extent(elapsed, self.viewport.height, a.growth_rate);
        light.intensity = rect_light_intensity(elapsed, a.intensity_amplitude, a.intensity_floor);

        let camera = &mut self.scene.camera;
        camera.position = Vec3::new(-self.mouse.x, -self.mouse.y, self.camera_distance);
        camera.look_at(Vec3::ZERO);

        let gain = a.mouse_light_gain;
        self.scene.mouse_light.set_position(Vec3::new(
            self.mouse.x * gain,
            -self.mouse.y * gain,
            self.mouse_light_depth,
        ));

        let state = FrameState {
            frame: self.frame,
            elapsed,
            delta,
            rect_light_width: self.scene.rect_light.width,
            rect_light_height: self.scene.rect_light.height,
            rect_light_intensity: self.scene.rect_light.intensity,
            camera_position: self.scene.camera.position,
            mouse_light_position: self.scene.mouse_light.position(),
        };
        tracing::trace!(%state, "frame");
        state
    }

    /// Track a new viewport size and device pixel ratio.
    pub fn on_resize(&mut self, viewport: Viewport, device_pixel_ratio: f32) {
        self.viewport = viewport;

        let camera = &mut self.scene.camera;
        camera.aspect = viewport.aspect();
        camera.update_projection();

        self.drawing_buffer.set_size(viewport);
        self.drawing_buffer
            .set_pixel_ratio(device_pixel_ratio, self.max_pixel_ratio);

        let (w, h) = self.drawing_buffer.physical_size();
        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            pixel_ratio = self.drawing_buffer.pixel_ratio(),
            "resized to {w}x{h} physical"
        );
    }

    /// Recompute the mouse offset from a client-space pointer position.
    pub fn on_mouse_move(&mut self, client_x: f32, client_y: f32) {
        self.mouse = pointer_offset(
            client_x,
            client_y,
            self.viewport,
            self.animation.pointer_divisor,
        );
    }

    pub fn handle_input(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::Resized {
                viewport,
                device_pixel_ratio,
            } => self.on_resize(viewport, device_pixel_ratio),
            InputEvent::PointerMoved { client_x, client_y } => {
                self.on_mouse_move(client_x, client_y)
            }
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn drawing_buffer(&self) -> DrawingBuffer {
        self.drawing_buffer
    }

    pub fn mouse(&self) -> MouseOffset {
        self.mouse
    }

    pub fn last_elapsed(&self) -> f32 {
        self.last_elapsed
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn animator(width: f32, height: f32) -> SceneAnimator<ManualClock> {
        SceneAnimator::new(
            &SceneConfig::default(),
            Viewport::new(width, height),
            1.0,
            ManualClock::new(),
        )
        .unwrap()
    }

    #[test]
    fn degenerate_config_is_rejected_up_front() {
        let mut config = SceneConfig::default();
        config.camera.distance = 0.0;
        let result = SceneAnimator::new(&config, Viewport::new(800.0, 600.0), 1.0, ManualClock::new());
        assert!(matches!(result, Err(ConfigError::Validation(_))));

        let mut config = SceneConfig::default();
        config.animation.pointer_divisor = f32::NAN;
        let result = SceneAnimator::new(&config, Viewport::new(800.0, 600.0), 1.0, ManualClock::new());
        assert!(result.is_err());
    }

    #[test]
    fn intensity_stays_in_band() {
        let mut t = 0.0_f32;
        while t < 60.0 {
            let i = rect_light_intensity(t, 2.0, 0.8);
            assert!((0.8..=2.0).contains(&i), "t={t} intensity={i}");
            t += 0.01;
        }
        assert_eq!(rect_light_intensity(0.0, 2.0, 0.8), 0.8);
        assert_eq!(rect_light_intensity(std::f32::consts::FRAC_PI_2, 2.0, 0.8), 2.0);
    }

    #[test]
    fn extent_grows_then_saturates() {
        let mut previous = 0.0;
        let mut t = 0.0_f32;
        while t < 400.0 {
            let e = rect_light_extent(t, 600.0, 2.0);
            assert_eq!(e, (2.0 * t).min(300.0));
            assert!(e >= previous);
            previous = e;
            t += 0.5;
        }
        assert_eq!(rect_light_extent(1000.0, 600.0, 2.0), 300.0);
    }

    #[test]
    fn tick_writes_light_size_and_intensity() {
        let mut anim = animator(800.0, 600.0);
        anim.clock_mut().set(10.0);
        let state = anim.tick();
        assert_eq!(state.rect_light_width, 20.0);
        assert_eq!(state.rect_light_height, 20.0);
        assert_eq!(state.rect_light_intensity, (10.0_f32.sin() * 2.0).max(0.8));
        assert_eq!(anim.scene().rect_light.width, 20.0);

        let state = anim.advance_to(1000.0);
        assert_eq!(state.rect_light_width, 400.0);
        assert_eq!(state.rect_light_height, 300.0);
    }

    #[test]
    fn camera_mirrors_mouse_and_light_follows() {
        let mut anim = animator(1000.0, 800.0);
        anim.on_mouse_move(700.0, 300.0);
        assert_eq!(anim.mouse(), MouseOffset::new(2.0, -1.0));

        let state = anim.advance_to(1.0);
        assert_eq!(state.camera_position, Vec3::new(-2.0, 1.0, 30.0));
        assert_eq!(anim.scene().camera.target, Vec3::ZERO);
        assert_eq!(state.mouse_light_position, Vec3::new(10.0, 5.0, -1.0));
        assert_eq!(anim.scene().mouse_light.position(), state.mouse_light_position);
    }

    #[test]
    fn mouse_offset_uses_latest_viewport() {
        let mut anim = animator(1000.0, 800.0);
        anim.on_resize(Viewport::new(400.0, 200.0), 1.0);
        anim.on_mouse_move(200.0, 100.0);
        assert_eq!(anim.mouse(), MouseOffset::default());
    }

    #[test]
    fn delta_tracks_previous_frame() {
        let mut anim = animator(800.0, 600.0);
        anim.clock_mut().set(0.5);
        let first = anim.tick();
        anim.clock_mut().advance(0.25);
        let second = anim.tick();
        assert_eq!(first.delta, 0.5);
        assert_eq!(second.delta, 0.25);
        assert_eq!(second.frame, 2);
        assert_eq!(anim.frame_count(), 2);
        assert_eq!(anim.last_elapsed(), 0.75);
    }

    #[test]
    fn resize_updates_camera_and_buffer() {
        let mut anim = animator(800.0, 600.0);
        anim.on_resize(Viewport::new(1920.0, 1080.0), 1.0);
        let camera = &anim.scene().camera;
        assert_eq!(camera.aspect, 1920.0 / 1080.0);
        assert_eq!(
            camera.projection_matrix(),
            glam::Mat4::perspective_rh(75.0_f32.to_radians(), 1920.0 / 1080.0, 0.1, 200.0)
        );
        assert_eq!(anim.drawing_buffer().size(), Viewport::new(1920.0, 1080.0));
        assert_eq!(anim.drawing_buffer().physical_size(), (1920, 1080));
    }

    #[test]
    fn resize_caps_pixel_ratio() {
        let mut anim = animator(800.0, 600.0);
        anim.on_resize(Viewport::new(800.0, 600.0), 3.0);
        assert_eq!(anim.drawing_buffer().pixel_ratio(), 2.0);
        assert_eq!(anim.drawing_buffer().physical_size(), (1600, 1200));
    }

    #[test]
    fn resize_is_idempotent() {
        let mut once = animator(800.0, 600.0);
        once.on_resize(Viewport::new(1024.0, 768.0), 1.5);
        let mut twice = animator(800.0, 600.0);
        twice.on_resize(Viewport::new(1024.0, 768.0), 1.5);
        twice.on_resize(Viewport::new(1024.0, 768.0), 1.5);

        assert_eq!(once.scene().camera, twice.scene().camera);
        assert_eq!(once.drawing_buffer(), twice.drawing_buffer());
        assert_eq!(once.viewport(), twice.viewport());
    }

    #[test]
    fn input_events_dispatch_to_handlers() {
        let mut anim = animator(800.0, 600.0);
        anim.handle_input(&InputEvent::Resized {
            viewport: Viewport::new(200.0, 100.0),
            device_pixel_ratio: 2.0,
        });
        anim.handle_input(&InputEvent::PointerMoved {
            client_x: 300.0,
            client_y: 150.0,
        });
        assert_eq!(anim.viewport(), Viewport::new(200.0, 100.0));
        assert_eq!(anim.mouse(), MouseOffset::new(2.0, 1.0));
    }
}
