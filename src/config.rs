//! Configuration surface: the tunables a caller can set when creating a
//! `Table`.

/// Minimum fill ratio accepted by [`crate::Table::rebuild`].
pub const RATIO_MIN: f64 = 0.01;

/// Maximum number of `u32` data words an entry may carry.
pub const DATA_MAXSIZE: u32 = crate::bin::DATA_MAXSIZE as u32;

/// Table construction and resizing parameters.
///
/// The defaults mirror the upstream library's recommended values: grow
/// aggressively (`upper = 1.0`), never shrink unless explicitly told to
/// (`lower = 0.0`), and favor a comfortably low cuckoo-insertion depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Target number of keys to dimension the initial table for.
    pub start: u32,
    /// Number of `u32` words of data carried per entry (0..=15).
    pub data: u32,
    /// Maximum recursive displacement depth during insertion.
    pub depth: u32,
    /// Fill ratio below which a delete triggers a shrink. `0 <= lower < upper`.
    pub lower: f64,
    /// Fill ratio above which an insert triggers a grow. `lower < upper <= 1`.
    pub upper: f64,
    /// Base growth factor applied to the prime index on a failed insertion.
    pub growth: f64,
    /// Per-attempt growth increment applied on repeated grow failures.
    pub attempt: f64,
    /// Weight of the random draw mixed into the grow factor.
    pub random: f64,
}

impl Default for Config {
    #[inline]
    fn default() -> Self {
        Config {
            start: 112,
            data: 1,
            depth: 3,
            lower: 0.0,
            upper: 1.0,
            growth: 1.5,
            attempt: 0.5,
            random: 0.5,
        }
    }
}

impl Config {
    /// Checks the fill-threshold ordering and data-size bound.
    ///
    /// # Panics
    ///
    /// Panics if `lower`/`upper` are out of `[0, 1]` or misordered, or if
    /// `data` exceeds [`DATA_MAXSIZE`].
    pub(crate) fn validate(&self) {
        assert!(
            (0.0..self.upper).contains(&self.lower) && self.upper <= 1.0,
            "cfix config: fill thresholds must satisfy 0.0 <= lower < upper <= 1.0, got lower={}, upper={}",
            self.lower,
            self.upper
        );
        assert!(
            self.data <= DATA_MAXSIZE,
            "cfix config: data size {} exceeds maximum of {}",
            self.data,
            DATA_MAXSIZE
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        Config::default().validate();
    }

    #[test]
    #[should_panic(expected = "fill thresholds")]
    fn rejects_inverted_thresholds() {
        let config = Config {
            lower: 0.9,
            upper: 0.1,
            ..Config::default()
        };
        config.validate();
    }

    #[test]
    #[should_panic(expected = "data size")]
    fn rejects_oversized_data() {
        let config = Config {
            data: 100,
            ..Config::default()
        };
        config.validate();
    }
}
