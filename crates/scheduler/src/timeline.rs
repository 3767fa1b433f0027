//! A wall clock based [`TimelineConverter`].
//!
//! References:
//! - [DASH-IF implementation guidelines: restricted timing model](https://dashif.org/Guidelines-TimingModel)

use std::sync::Mutex;

use chrono::{DateTime, TimeDelta, Utc};

use crate::{AvailabilityRange, MpdInfo, Representation, TimelineConverter};

#[derive(Debug, Clone)]
pub enum Clock {
    /// Local clock, corrected by how much it is behind the remote clock.
    System { offset: TimeDelta },
    Fixed(DateTime<Utc>),
}

impl Default for Clock {
    fn default() -> Self {
        Self::System {
            offset: TimeDelta::zero(),
        }
    }
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Self::System { offset } => Utc::now() + *offset,
            Self::Fixed(now) => *now,
        }
    }

    fn offset(&self) -> TimeDelta {
        match self {
            Self::System { offset } => *offset,
            Self::Fixed(_) => TimeDelta::zero(),
        }
    }
}

#[derive(Debug, Default)]
pub struct BasicTimelineConverter {
    clock: Clock,
    expected_live_edge: Mutex<Option<f64>>,
}

impl BasicTimelineConverter {
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            expected_live_edge: Mutex::new(None),
        }
    }

    pub fn expected_live_edge(&self) -> Option<f64> {
        self.expected_live_edge
            .lock()
            .map(|edge| *edge)
            .unwrap_or_default()
    }

    /// Seconds elapsed on the presentation timeline at the current wall clock time.
    fn presentation_now(&self, mpd: &MpdInfo) -> f64 {
        (self.clock.now() - mpd.availability_start_time).as_seconds_f64()
    }
}

fn seconds(value: f64) -> TimeDelta {
    TimeDelta::milliseconds((value * 1000.).round() as i64)
}

impl TimelineConverter for BasicTimelineConverter {
    fn availability_start_time(
        &self,
        presentation_time: f64,
        mpd: &MpdInfo,
        is_dynamic: bool,
    ) -> Option<DateTime<Utc>> {
        if !is_dynamic {
            return Some(mpd.availability_start_time);
        }
        Some(mpd.availability_start_time + seconds(presentation_time) - self.clock.offset())
    }

    fn availability_end_time(
        &self,
        presentation_end_time: f64,
        mpd: &MpdInfo,
        is_dynamic: bool,
    ) -> Option<DateTime<Utc>> {
        if !is_dynamic || !presentation_end_time.is_finite() {
            return None;
        }
        let depth = mpd.time_shift_buffer_depth?;
        Some(mpd.availability_start_time + seconds(presentation_end_time + depth))
    }

    fn segment_availability_range(
        &self,
        representation: &Representation,
        is_dynamic: bool,
    ) -> AvailabilityRange {
        let period = &representation.period;
        let period_end = period.start + period.duration;
        if !is_dynamic {
            return AvailabilityRange::new(period.start, period_end);
        }

        let segment_duration = representation
            .segment_duration
            .or_else(|| {
                representation
                    .segments
                    .as_ref()
                    .and_then(|segments| segments.last())
                    .map(|segment| segment.duration)
            })
            .unwrap_or_default();

        let now = self.presentation_now(&period.mpd);
        let start = match period.mpd.time_shift_buffer_depth {
            Some(depth) => (now - depth).max(period.start),
            None => period.start,
        };
        let end = if now >= period_end && now - segment_duration < period_end {
            period_end
        } else {
            now - segment_duration
        };

        AvailabilityRange::new(start, end)
    }

    fn set_expected_live_edge(&self, time: f64) {
        if let Ok(mut edge) = self.expected_live_edge.lock() {
            *edge = Some(time);
        }
    }
}
