//! Frames-per-second counter
//!
//! The render loop ticks once per frame; something on a one-second
//! schedule calls `roll_over`. Both sides only touch atomics, so the
//! scheduler may run on another thread.

use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Debug, Default)]
pub struct FrameStats {
    /// Frames drawn since the last roll-over
    frames: AtomicU32,
    /// Frames drawn during the last full second
    fps: AtomicU32,
}

impl FrameStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one finished frame
    pub fn tick(&self) {
        self.frames.fetch_add(1, Ordering::Relaxed);
    }

    /// Publish this second's frame count and start counting again
    pub fn roll_over(&self) {
        let frames = self.frames.swap(0, Ordering::Relaxed);
        self.fps.store(frames, Ordering::Relaxed);
    }

    pub fn fps(&self) -> u32 {
        self.fps.load(Ordering::Relaxed)
    }

    pub fn frames_this_second(&self) -> u32 {
        self.frames.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_roll_over_publishes_and_resets() {
        let stats = FrameStats::new();
        for _ in 0..5 {
            stats.tick();
        }
        assert_eq!(stats.fps(), 0);
        stats.roll_over();
        assert_eq!(stats.fps(), 5);
        assert_eq!(stats.frames_this_second(), 0);
        stats.roll_over();
        assert_eq!(stats.fps(), 0);
    }

    #[test]
    fn test_ticks_from_another_thread_are_not_lost() {
        let stats = Arc::new(FrameStats::new());
        let worker = {
            let stats = Arc::clone(&stats);
            std::thread::spawn(move || {
                for _ in 0..1000 {
                    stats.tick();
                }
            })
        };
        for _ in 0..1000 {
            stats.tick();
        }
        worker.join().unwrap();
        stats.roll_over();
        assert_eq!(stats.fps(), 2000);
    }
}
