use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{ByteRange, MediaType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    InitializationSegment,
    #[default]
    MediaSegment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestAction {
    #[default]
    Download,
    /// No more segments will be produced by this representation.
    Complete,
}

/// A fully resolved fetch, handed over to the transport layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FragmentRequest {
    pub media_type: Option<MediaType>,
    pub kind: RequestKind,
    pub action: RequestAction,

    pub url: Option<String>,
    /// Service location of the base url the request url was resolved against.
    pub service_location: Option<String>,
    pub range: Option<ByteRange>,

    pub start_time: Option<f64>,
    pub duration: Option<f64>,
    pub timescale: Option<u64>,
    pub availability_start_time: Option<DateTime<Utc>>,
    pub availability_end_time: Option<DateTime<Utc>>,
    pub wall_start_time: Option<DateTime<Utc>>,

    pub quality: Option<usize>,
    /// Availability index of the segment, or the cursor for a completion marker.
    pub index: Option<usize>,
    pub adaptation_index: Option<usize>,
    pub representation_id: Option<String>,
}

impl FragmentRequest {
    pub(crate) fn complete(media_type: Option<MediaType>, index: Option<usize>) -> Self {
        Self {
            media_type,
            action: RequestAction::Complete,
            index,
            ..Default::default()
        }
    }

    pub fn is_complete(&self) -> bool {
        self.action == RequestAction::Complete
    }
}
