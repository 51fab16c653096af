use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ScanPhase {
    #[default]
    Idle,
    Running,
    Settling,
    Done,
}

pub const COMPLETE_PERCENT: f64 = 100.0;

/// Progress of the one scan a user can have in flight.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    pub phase: ScanPhase,
    pub percent: f64,
}

impl ProgressState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while the progress bar should be animating.
    pub fn is_active(&self) -> bool {
        matches!(self.phase, ScanPhase::Running | ScanPhase::Settling)
    }

    pub fn begin(&mut self) {
        *self = Self {
            phase: ScanPhase::Running,
            percent: 0.0,
        };
    }

    /// Adds `step` percent, clamped to 100. Returns true when this step moved
    /// the scan into `Settling`.
    pub fn advance(&mut self, step: f64) -> bool {
        if self.phase != ScanPhase::Running {
            return false;
        }

        self.percent = (self.percent + step.max(0.0)).min(COMPLETE_PERCENT);
        if self.percent >= COMPLETE_PERCENT {
            self.phase = ScanPhase::Settling;
            return true;
        }
        false
    }

    pub fn finish(&mut self) {
        if self.phase == ScanPhase::Settling {
            self.phase = ScanPhase::Done;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
