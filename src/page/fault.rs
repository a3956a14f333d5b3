use rand::Rng;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Fault rate must be within 0.0..=1.0, got {0}")]
pub struct InvalidFaultRate(pub f64);

/// Probabilistic fault switch for exercising failure paths.
///
/// Rate `0.0` never fires, `1.0` always fires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaultInjector {
    rate: f64,
}

impl FaultInjector {
    pub fn new(rate: f64) -> Result<Self, InvalidFaultRate> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(InvalidFaultRate(rate));
        }
        Ok(Self { rate })
    }

    pub fn never() -> Self {
        Self { rate: 0.0 }
    }

    pub fn always() -> Self {
        Self { rate: 1.0 }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn should_fail(&self) -> bool {
        if self.rate <= 0.0 {
            return false;
        }
        if self.rate >= 1.0 {
            return true;
        }
        rand::rng().random_bool(self.rate)
    }
}

impl Default for FaultInjector {
    fn default() -> Self {
        Self::never()
    }
}
