use spin_sleep::SpinSleeper;
use std::time::{Duration, Instant};

/// A timer that paces frames at a fixed rate.
pub struct Timer {
    start: Instant,
    period: Duration,
    sleeper: SpinSleeper,
}

impl Timer {
    /// Returns a timer for the given number of frames per second.
    pub fn new(frame_rate: u32) -> Self {
        Self {
            start: Instant::now(),
            period: Duration::from_secs(1) / frame_rate.max(1),
            sleeper: SpinSleeper::default(),
        }
    }

    /// Returns the length of one frame.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Accurately waits for the rest of the current frame, then starts the
    /// next one.
    pub fn wait_frame(&mut self) {
        let elapsed = self.start.elapsed();
        if self.period > elapsed {
            let wait_time = self.period - elapsed;
            if wait_time.as_millis() > 1 {
                self.sleeper.sleep(wait_time);
            }
        }
        self.start = Instant::now();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_period() {
        assert_eq!(Timer::new(50).period(), Duration::from_millis(20));
        assert_eq!(Timer::new(0).period(), Duration::from_secs(1));
    }

    #[test]
    fn test_wait_frame_paces() {
        let mut timer = Timer::new(50);
        let start = Instant::now();

        timer.wait_frame();
        timer.wait_frame();

        assert!(start.elapsed() >= Duration::from_millis(36));
    }
}
