use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::data_model::DataModel;

/// Shared viewport dimensions, updated by resize events and read wherever the
/// current size is needed.
#[derive(Debug)]
pub struct WindowViewport {
    size: RwLock<(u32, u32)>,
}

impl WindowViewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: RwLock::new((width.max(1), height.max(1))),
        }
    }

    pub fn update(&self, width: u32, height: u32) {
        *self.size.write() = (width.max(1), height.max(1));
    }

    pub fn size(&self) -> (u32, u32) {
        *self.size.read()
    }
}

/// Rolling frame-rate counter, reported roughly once per second.
#[derive(Debug)]
pub struct FrameStats {
    window_start: Instant,
    frames: u32,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameStats {
    const REPORT_EVERY: Duration = Duration::from_secs(1);

    pub fn new() -> Self {
        Self {
            window_start: Instant::now(),
            frames: 0,
        }
    }

    /// Counts one frame; returns the measured rate when a report is due.
    pub fn tick(&mut self) -> Option<f32> {
        self.frames += 1;
        let elapsed = self.window_start.elapsed();
        if elapsed < Self::REPORT_EVERY {
            return None;
        }
        let fps = self.frames as f32 / elapsed.as_secs_f32();
        self.frames = 0;
        self.window_start = Instant::now();
        Some(fps)
    }
}

/// Prints the end-of-run summary shared by the headless and interactive
/// paths.
pub fn print_session_summary(demo: &str, model: &DataModel, spawned: u32, cap: u32, bodies: usize) {
    println!("Demo: {demo}");
    println!("Scene objects: {}", model.len());
    println!("Spawned {spawned} of cap {cap}");
    println!("Simulated bodies: {bodies}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_clamps_to_one() {
        let viewport = WindowViewport::new(0, 0);
        assert_eq!(viewport.size(), (1, 1));
        viewport.update(1920, 1080);
        assert_eq!(viewport.size(), (1920, 1080));
    }

    #[test]
    fn frame_stats_do_not_report_immediately() {
        let mut stats = FrameStats::new();
        assert!(stats.tick().is_none());
        assert!(stats.tick().is_none());
    }
}
