//! Validated configuration types.
//!
//! Mirrors the teacher's `Probability`/`CaseID` pattern: invalid states are
//! rejected once, at construction, so every other component can treat a
//! `UnitInterval` as already-in-range.

use crate::error::MinerError;

/// A value clamped to the closed interval `[0.0, 1.0]`.
///
/// Used for `depend_threshold` (θ_dep) and `xor_threshold` (θ_xor), both of
/// which are compared directly against dependency scores and XOR ratios.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct UnitInterval(f64);

impl UnitInterval {
    pub fn new(value: f64) -> Result<Self, MinerError> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(MinerError::Configuration(format!(
                "value must be finite and within [0.0, 1.0], got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

/// Configuration for the incremental, lossy-counting [`crate::miner::Miner`].
#[derive(Debug, Clone, Copy)]
pub struct MinerConfig {
    error_epsilon: f64,
    depend_threshold: UnitInterval,
    xor_threshold: UnitInterval,
}

impl MinerConfig {
    /// `error_epsilon` bounds the lossy-counting approximation error and must
    /// be in `(0.0, 1.0]`. `depend_threshold` is θ_dep, `xor_threshold` is
    /// θ_xor; both in `[0.0, 1.0]`.
    pub fn new(
        error_epsilon: f64,
        depend_threshold: f64,
        xor_threshold: f64,
    ) -> Result<Self, MinerError> {
        if !error_epsilon.is_finite() || !(0.0..=1.0).contains(&error_epsilon) || error_epsilon == 0.0
        {
            return Err(MinerError::Configuration(format!(
                "error_epsilon must be finite and within (0.0, 1.0], got {error_epsilon}"
            )));
        }
        Ok(Self {
            error_epsilon,
            depend_threshold: UnitInterval::new(depend_threshold)?,
            xor_threshold: UnitInterval::new(xor_threshold)?,
        })
    }

    pub fn error_epsilon(&self) -> f64 {
        self.error_epsilon
    }

    pub fn depend_threshold(&self) -> f64 {
        self.depend_threshold.get()
    }

    pub fn xor_threshold(&self) -> f64 {
        self.xor_threshold.get()
    }

    /// Bucket width `w = ceil(1 / error_epsilon)`, per Manku-Motwani.
    pub fn bucket_width(&self) -> u64 {
        (1.0 / self.error_epsilon).ceil() as u64
    }
}

/// Configuration for the batch [`crate::windowed::WindowedMiner`] — no
/// lossy-counting parameters, since a window's directly-follows counts are
/// exact within that window.
#[derive(Debug, Clone, Copy)]
pub struct WindowedMinerConfig {
    depend_threshold: UnitInterval,
    xor_threshold: UnitInterval,
}

impl WindowedMinerConfig {
    pub fn new(depend_threshold: f64, xor_threshold: f64) -> Result<Self, MinerError> {
        Ok(Self {
            depend_threshold: UnitInterval::new(depend_threshold)?,
            xor_threshold: UnitInterval::new(xor_threshold)?,
        })
    }

    pub fn depend_threshold(&self) -> f64 {
        self.depend_threshold.get()
    }

    pub fn xor_threshold(&self) -> f64 {
        self.xor_threshold.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_interval_rejects_out_of_range() {
        assert!(UnitInterval::new(-0.1).is_err());
        assert!(UnitInterval::new(1.1).is_err());
        assert!(UnitInterval::new(f64::NAN).is_err());
        assert!(UnitInterval::new(0.0).is_ok());
        assert!(UnitInterval::new(1.0).is_ok());
    }

    #[test]
    fn miner_config_rejects_zero_epsilon() {
        assert!(MinerConfig::new(0.0, 0.5, 0.5).is_err());
    }

    #[test]
    fn miner_config_bucket_width() {
        let cfg = MinerConfig::new(0.01, 0.5, 0.5).unwrap();
        assert_eq!(cfg.bucket_width(), 100);
    }
}
