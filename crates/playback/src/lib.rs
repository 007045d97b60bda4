//! Playback control for fragview.
//!
//! Decides *which* shader is active and *when* to switch; the renderer is
//! passive and only exposes `load_shader`/`reset_clock`. A [`Rotation`]
//! walks the catalogued names in order, advancing on a timer or on manual
//! navigation, with wrap-around at both ends.

use std::time::{Duration, Instant};

#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("rotation requires at least one shader")]
    EmptyRotation,
    #[error("shader '{0}' is not in the rotation")]
    UnknownShader(String),
}

/// Ordered rotation over shader names with optional timed auto-advance.
#[derive(Debug, Clone)]
pub struct Rotation {
    names: Vec<String>,
    cursor: usize,
    auto_advance: Option<Duration>,
    last_change: Instant,
}

impl Rotation {
    /// Builds a rotation starting at the first name. A zero interval means
    /// auto-advance is disabled.
    pub fn new(
        names: Vec<String>,
        auto_advance: Option<Duration>,
        now: Instant,
    ) -> Result<Self, PlaybackError> {
        if names.is_empty() {
            return Err(PlaybackError::EmptyRotation);
        }
        Ok(Self {
            names,
            cursor: 0,
            auto_advance: auto_advance.filter(|interval| !interval.is_zero()),
            last_change: now,
        })
    }

    pub fn current(&self) -> &str {
        &self.names[self.cursor]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Manual skip forward; restarts the auto-advance timer.
    pub fn advance(&mut self, now: Instant) -> &str {
        self.cursor = (self.cursor + 1) % self.names.len();
        self.last_change = now;
        self.current()
    }

    /// Manual skip backward; restarts the auto-advance timer.
    pub fn rewind(&mut self, now: Instant) -> &str {
        self.cursor = (self.cursor + self.names.len() - 1) % self.names.len();
        self.last_change = now;
        self.current()
    }

    /// Jumps to a named entry.
    pub fn select(&mut self, name: &str, now: Instant) -> Result<&str, PlaybackError> {
        match self.names.iter().position(|candidate| candidate == name) {
            Some(index) => {
                self.cursor = index;
                self.last_change = now;
                Ok(self.current())
            }
            None => Err(PlaybackError::UnknownShader(name.to_string())),
        }
    }

    /// Advances when the configured interval has elapsed. Returns the new
    /// name only on an actual change; single-entry rotations never advance.
    pub fn tick(&mut self, now: Instant) -> Option<&str> {
        let interval = self.auto_advance?;
        if self.names.len() < 2 {
            return None;
        }
        if now.duration_since(self.last_change) < interval {
            return None;
        }
        Some(self.advance(now))
    }

    /// Reconfigures the auto-advance interval; `None` or zero disables it.
    pub fn set_auto_advance(&mut self, interval: Option<Duration>) {
        self.auto_advance = interval.filter(|interval| !interval.is_zero());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["gradient".into(), "plasma".into(), "rings".into()]
    }

    #[test]
    fn starts_at_the_first_name() {
        let rotation = Rotation::new(names(), None, Instant::now()).unwrap();
        assert_eq!(rotation.current(), "gradient");
        assert_eq!(rotation.len(), 3);
    }

    #[test]
    fn empty_rotation_is_rejected() {
        let err = Rotation::new(vec![], None, Instant::now()).unwrap_err();
        assert!(matches!(err, PlaybackError::EmptyRotation));
    }

    #[test]
    fn advance_and_rewind_wrap_around() {
        let now = Instant::now();
        let mut rotation = Rotation::new(names(), None, now).unwrap();
        assert_eq!(rotation.advance(now), "plasma");
        assert_eq!(rotation.advance(now), "rings");
        assert_eq!(rotation.advance(now), "gradient");
        assert_eq!(rotation.rewind(now), "rings");
    }

    #[test]
    fn tick_advances_after_the_interval() {
        let now = Instant::now();
        let mut rotation =
            Rotation::new(names(), Some(Duration::from_secs(15)), now).unwrap();
        assert_eq!(rotation.tick(now + Duration::from_secs(5)), None);
        assert_eq!(
            rotation.tick(now + Duration::from_secs(15)),
            Some("plasma")
        );
    }

    #[test]
    fn manual_navigation_restarts_the_timer() {
        let now = Instant::now();
        let mut rotation =
            Rotation::new(names(), Some(Duration::from_secs(15)), now).unwrap();
        rotation.advance(now + Duration::from_secs(14));
        // The timer restarted at 14s, so 15s after start is only 1s in.
        assert_eq!(rotation.tick(now + Duration::from_secs(15)), None);
        assert_eq!(
            rotation.tick(now + Duration::from_secs(29)),
            Some("rings")
        );
    }

    #[test]
    fn single_entry_rotations_never_auto_advance() {
        let now = Instant::now();
        let mut rotation = Rotation::new(
            vec!["gradient".into()],
            Some(Duration::from_secs(1)),
            now,
        )
        .unwrap();
        assert_eq!(rotation.tick(now + Duration::from_secs(60)), None);
        assert_eq!(rotation.current(), "gradient");
    }

    #[test]
    fn zero_interval_disables_auto_advance() {
        let now = Instant::now();
        let mut rotation = Rotation::new(names(), Some(Duration::ZERO), now).unwrap();
        assert_eq!(rotation.tick(now + Duration::from_secs(600)), None);
    }

    #[test]
    fn select_jumps_by_name() {
        let now = Instant::now();
        let mut rotation = Rotation::new(names(), None, now).unwrap();
        assert_eq!(rotation.select("rings", now).unwrap(), "rings");
        assert!(matches!(
            rotation.select("missing", now),
            Err(PlaybackError::UnknownShader(_))
        ));
    }
}
