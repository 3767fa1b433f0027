use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    /// Tolerance in seconds applied on both sides of a segment when looking it up by time.
    ///
    /// When `None`, half of the duration of each candidate segment is used instead.
    pub segment_overlap_tolerance_time: Option<f64>,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            segment_overlap_tolerance_time: Some(0.05),
        }
    }
}
