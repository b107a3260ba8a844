//! Application state and frame pacing
//!
//! Toggle state lives here and is copied into a [`RenderSettings`] value
//! once per frame. Camera movement events are applied directly to the camera.

use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;
use crate::input::InputEvent;
use crate::rasterizer::{Camera, RenderSettings};

/// Main application state
pub struct AppState {
    settings: RenderSettings,
    /// Cleared when the user asks to quit
    pub running: bool,
}

impl AppState {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings, running: true }
    }

    /// Snapshot of the toggles for this frame
    pub fn settings(&self) -> RenderSettings {
        self.settings
    }

    /// Apply one input event to the toggles or the camera
    pub fn apply(&mut self, event: InputEvent, camera: &mut Camera) {
        let s = &mut self.settings;
        match event {
            InputEvent::ToggleVertices => s.vertices = !s.vertices,
            InputEvent::ToggleWireframe => s.wireframe = !s.wireframe,
            InputEvent::ToggleFilled => s.filled = !s.filled,
            InputEvent::ToggleTextured => s.textured = !s.textured,
            InputEvent::ToggleGrid => s.grid = !s.grid,
            InputEvent::ToggleCulling => s.cull_backfaces = !s.cull_backfaces,
            InputEvent::MoveForward(d) => camera.move_forward(d),
            InputEvent::MoveRight(d) => camera.move_right(d),
            InputEvent::MoveUp(d) => camera.move_up(d),
            InputEvent::Yaw(a) => camera.add_yaw(a),
            InputEvent::Pitch(a) => camera.add_pitch(a),
            InputEvent::Quit => self.running = false,
        }

        if !matches!(
            event,
            InputEvent::MoveForward(_)
                | InputEvent::MoveRight(_)
                | InputEvent::MoveUp(_)
                | InputEvent::Yaw(_)
                | InputEvent::Pitch(_)
        ) {
            debug!(?event, settings = ?self.settings, "Input applied");
        }
    }
}

/// Caps the frame rate and measures delta time
pub struct FrameClock {
    target: Duration,
    previous: Instant,
}

impl FrameClock {
    /// `fps == 0` disables the cap
    pub fn new(fps: u32) -> Self {
        let target = if fps == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(1000 / fps as u64)
        };
        Self { target, previous: Instant::now() }
    }

    pub fn target(&self) -> Duration {
        self.target
    }

    /// Remaining time before the next frame may start
    pub fn time_to_wait(&self, elapsed: Duration) -> Option<Duration> {
        if elapsed < self.target {
            Some(self.target - elapsed)
        } else {
            None
        }
    }

    /// Sleep out the rest of the frame, then return seconds since the last tick
    pub fn tick(&mut self) -> f32 {
        if let Some(wait) = self.time_to_wait(self.previous.elapsed()) {
            thread::sleep(wait);
        }
        let now = Instant::now();
        let delta_time = now.duration_since(self.previous).as_secs_f32();
        self.previous = now;
        delta_time
    }
}
