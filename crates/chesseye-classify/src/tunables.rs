use crate::ClassifyParams;
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};

/// Live operator controls: the edge threshold and the minimum cell area can
/// be adjusted while the classification loop is running, without a restart.
/// The loop reads a consistent copy at the start of each cycle.
#[derive(Debug)]
pub struct Tunables {
    threshold: AtomicU8,
    min_square_area: AtomicU32,
}

impl Tunables {
    pub fn new(params: &ClassifyParams) -> Self {
        Self {
            threshold: AtomicU8::new(params.threshold),
            min_square_area: AtomicU32::new(params.min_square_area.max(0.0) as u32),
        }
    }

    pub fn set_threshold(&self, cutoff: u8) {
        self.threshold.store(cutoff, Ordering::Relaxed);
    }

    /// Clamped to the 0..=3000 control range.
    pub fn set_min_square_area(&self, area: u32) {
        self.min_square_area.store(area.min(3000), Ordering::Relaxed);
    }

    pub fn threshold(&self) -> u8 {
        self.threshold.load(Ordering::Relaxed)
    }

    pub fn min_square_area(&self) -> f64 {
        self.min_square_area.load(Ordering::Relaxed) as f64
    }

    /// Fold the current control values into a parameter copy for one cycle.
    pub fn apply(&self, params: &ClassifyParams) -> ClassifyParams {
        ClassifyParams {
            threshold: self.threshold(),
            min_square_area: self.min_square_area(),
            ..*params
        }
    }
}

impl Default for Tunables {
    fn default() -> Self {
        Self::new(&ClassifyParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_mirror_classify_params() {
        let t = Tunables::default();
        assert_eq!(t.threshold(), 228);
        assert_eq!(t.min_square_area(), 300.0);
    }

    #[test]
    fn updates_are_visible_and_clamped() {
        let t = Tunables::default();
        t.set_threshold(100);
        t.set_min_square_area(5000);
        assert_eq!(t.threshold(), 100);
        assert_eq!(t.min_square_area(), 3000.0);

        let params = t.apply(&ClassifyParams::default());
        assert_eq!(params.threshold, 100);
        assert_eq!(params.min_square_area, 3000.0);
    }
}
