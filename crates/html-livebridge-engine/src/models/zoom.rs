use html_livebridge_config::{MAX_ZOOM, MIN_ZOOM};

/// Percent added or removed by one zoom in/out step.
pub const ZOOM_STEP: u16 = 25;

/// Preview zoom level in percent, always within `[MIN_ZOOM, MAX_ZOOM]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Zoom(u16);

impl Zoom {
    /// Creates a zoom level, clamping out-of-range input.
    pub fn new(level: u16) -> Self {
        Self(level.clamp(MIN_ZOOM, MAX_ZOOM))
    }

    pub fn level(self) -> u16 {
        self.0
    }

    #[must_use]
    pub fn zoomed_in(self) -> Self {
        Self::new(self.0.saturating_add(ZOOM_STEP))
    }

    #[must_use]
    pub fn zoomed_out(self) -> Self {
        Self::new(self.0.saturating_sub(ZOOM_STEP))
    }

    /// Scale factor for the rendered frame (1.0 at 100%).
    pub fn scale(self) -> f32 {
        f32::from(self.0) / 100.0
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(100, 125)]
    #[case(375, 400)]
    #[case(400, 400)]
    fn zoom_in_steps_and_clamps(#[case] from: u16, #[case] expected: u16) {
        assert_eq!(Zoom::new(from).zoomed_in().level(), expected);
    }

    #[rstest]
    #[case(100, 75)]
    #[case(50, 25)]
    #[case(25, 25)]
    fn zoom_out_steps_and_clamps(#[case] from: u16, #[case] expected: u16) {
        assert_eq!(Zoom::new(from).zoomed_out().level(), expected);
    }

    #[test]
    fn new_clamps_into_range() {
        assert_eq!(Zoom::new(0).level(), 25);
        assert_eq!(Zoom::new(9999).level(), 400);
        assert_eq!(Zoom::default().scale(), 1.0);
    }
}
