use std::time::Instant;

/// Monotonic elapsed-time origin for shader animation.
///
/// The origin only moves when a new program is installed or the caller asks
/// for an explicit reset, so animation phase stays continuous across frames.
#[derive(Clone, Copy, Debug)]
pub struct RenderClock {
    origin: Instant,
}

impl RenderClock {
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Restarts elapsed time at zero.
    pub fn reset(&mut self) {
        self.origin = Instant::now();
    }

    /// Seconds since the current origin.
    pub fn elapsed_seconds(&self) -> f32 {
        self.origin.elapsed().as_secs_f32()
    }
}

impl Default for RenderClock {
    fn default() -> Self {
        Self::start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn elapsed_is_monotonic() {
        let clock = RenderClock::start();
        let first = clock.elapsed_seconds();
        std::thread::sleep(Duration::from_millis(5));
        let second = clock.elapsed_seconds();
        assert!(second >= first);
        assert!(second > 0.0);
    }

    #[test]
    fn reset_zeroes_elapsed_time() {
        let mut clock = RenderClock::start();
        std::thread::sleep(Duration::from_millis(5));
        clock.reset();
        assert!(clock.elapsed_seconds() < 0.5);
    }
}
