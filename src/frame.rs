use std::time::Instant;

const FPS_UPDATE_INTERVAL: f32 = 1.0;

/// Counts frames and averages the frame rate over one-second windows
#[derive(Debug)]
pub struct FrameCounter {
    frame_number: u64,
    last_frame_time: Instant,
    window_frames: u32,
    window_time: f32,
    fps: f32,
}

impl FrameCounter {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            frame_number: 0,
            last_frame_time: now,
            window_frames: 0,
            window_time: 0.0,
            fps: 0.0,
        }
    }

    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    /// Frame rate of the last completed window
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Mark the start of a frame, returning its number (first frame is 0)
    pub fn tick(&mut self) -> u64 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame_time).as_secs_f32();
        self.last_frame_time = now;

        let number = self.frame_number;
        self.frame_number += 1;
        self.accumulate(delta);
        number
    }

    /// Returns true when a new FPS value has just been computed
    fn accumulate(&mut self, delta: f32) -> bool {
        self.window_frames += 1;
        self.window_time += delta;

        if self.window_time >= FPS_UPDATE_INTERVAL {
            self.fps = self.window_frames as f32 / self.window_time;
            log::debug!("FPS: {:.1}", self.fps);
            self.window_frames = 0;
            self.window_time = 0.0;
            true
        } else {
            false
        }
    }
}

impl Default for FrameCounter {
    fn default() -> Self {
        Self::new()
    }
}
