use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ByteRange;

/// Top-level type of the track a scheduler serves, as defined in
/// [RFC6838](https://datatracker.ietf.org/doc/html/rfc6838#section-4.2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Video,
    Audio,
    Text,
    Unknown,
}

impl MediaType {
    pub fn from_mime_type(mime_type: Option<&str>) -> Self {
        let mime_type = mime_type.unwrap_or("video");

        if mime_type.starts_with("video") {
            Self::Video
        } else if mime_type.starts_with("audio") {
            Self::Audio
        } else if mime_type.starts_with("text") || mime_type.starts_with("application/ttml") {
            Self::Text
        } else {
            Self::Unknown
        }
    }
}

/// How the segments of a representation are addressed in the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SegmentInfoType {
    /// `SegmentTemplate` with `SegmentTimeline`, aka explicit addressing.
    SegmentTimeline,
    /// `SegmentTemplate` with `@duration`, aka simple addressing.
    #[default]
    SegmentTemplate,
    SegmentList,
    /// Indexed addressing, segments are described by the index segment.
    SegmentBase,
    /// A single media file without any segment information.
    BaseUrl,
}

/// Manifest level values the timeline conversion needs.
#[derive(Debug, Clone, PartialEq)]
pub struct MpdInfo {
    /// `MPD@availabilityStartTime`, the zero point of a dynamic presentation.
    pub availability_start_time: DateTime<Utc>,
    /// `MPD@timeShiftBufferDepth` in seconds.
    pub time_shift_buffer_depth: Option<f64>,
    /// `MPD@maxSegmentDuration` in seconds, unbounded when absent.
    pub max_segment_duration: f64,
    /// Wall clock time the manifest was fetched at.
    pub loaded_time: DateTime<Utc>,
}

impl Default for MpdInfo {
    fn default() -> Self {
        Self {
            availability_start_time: DateTime::UNIX_EPOCH,
            time_shift_buffer_depth: None,
            max_segment_duration: f64::INFINITY,
            loaded_time: DateTime::UNIX_EPOCH,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Period {
    pub index: usize,
    /// Start of the period on the presentation timeline, in seconds.
    pub start: f64,
    /// Duration in seconds. Infinite for the last period of a live presentation.
    pub duration: f64,
    pub mpd: MpdInfo,
}

impl Default for Period {
    fn default() -> Self {
        Self {
            index: 0,
            start: 0.,
            duration: f64::INFINITY,
            mpd: MpdInfo::default(),
        }
    }
}

/// Position of a representation inside the manifest, used to resolve its base url.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct RepresentationPath {
    pub period: usize,
    pub adaptation: usize,
    pub representation: usize,
}

/// Time span, in seconds of presentation time, whose segments can be requested.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AvailabilityRange {
    pub start: f64,
    pub end: f64,
}

impl AvailabilityRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn is_inverted(&self) -> bool {
        self.end < self.start
    }
}

/// One encoded quality of a media track.
///
/// `segments`, `segment_availability_range` and `available_segments_number` are only written
/// by [`SegmentScheduler`](crate::SegmentScheduler), through `refresh`, the segment list update
/// and loader completions. Everything else reads them.
#[derive(Debug, Clone)]
pub struct Representation {
    pub id: String,
    /// Position of this representation in its adaptation set, reported as the request quality.
    pub index: usize,
    pub adaptation_index: usize,
    pub period: Period,
    pub path: RepresentationPath,

    pub mime_type: Option<String>,
    pub bandwidth: u64,
    pub timescale: u64,

    /// Initialization segment url, relative to the base url.
    pub initialization: Option<String>,
    /// Byte range of the initialization segment.
    pub range: Option<ByteRange>,
    /// `SegmentBase@indexRange`, segments are loaded from the index segment when present.
    pub index_range: Option<String>,

    pub segment_info_type: SegmentInfoType,
    /// Fixed segment duration in seconds for template addressing.
    pub segment_duration: Option<f64>,
    pub start_number: u64,
    /// `@presentationTimeOffset` in seconds.
    pub presentation_time_offset: f64,
    pub use_calculated_live_edge_time: bool,

    pub segment_availability_range: AvailabilityRange,
    pub available_segments_number: usize,
    /// Resolved segments, `None` until they are computed or loaded.
    pub segments: Option<Vec<Segment>>,
}

impl Default for Representation {
    fn default() -> Self {
        Self {
            id: String::new(),
            index: 0,
            adaptation_index: 0,
            period: Period::default(),
            path: RepresentationPath::default(),
            mime_type: None,
            bandwidth: 0,
            timescale: 1,
            initialization: None,
            range: None,
            index_range: None,
            segment_info_type: SegmentInfoType::default(),
            segment_duration: None,
            start_number: 1,
            presentation_time_offset: 0.,
            use_calculated_live_edge_time: false,
            segment_availability_range: AvailabilityRange::default(),
            available_segments_number: 0,
            segments: None,
        }
    }
}

impl Representation {
    pub fn has_initialization(&self) -> bool {
        self.initialization.is_some() || self.range.is_some()
    }

    pub fn has_segments(&self) -> bool {
        !matches!(
            self.segment_info_type,
            SegmentInfoType::BaseUrl | SegmentInfoType::SegmentBase
        ) && self.index_range.is_none()
    }

    /// Whether requests may be served from this representation.
    ///
    /// An inverted availability window blocks the representation unless its live edge is
    /// calculated rather than declared by the manifest.
    pub fn is_available(&self) -> bool {
        !self.segment_availability_range.is_inverted() || self.use_calculated_live_edge_time
    }

    pub fn media_type(&self) -> MediaType {
        MediaType::from_mime_type(self.mime_type.as_deref())
    }
}

/// One fetchable media fragment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Segment {
    /// Id of the owning representation, for lookup only.
    pub representation_id: String,
    /// Position in the resolved sequence of the representation.
    pub availability_idx: usize,

    /// Start on the presentation timeline, in seconds.
    pub presentation_start_time: f64,
    /// Duration in seconds.
    pub duration: f64,
    /// Start on the sample timeline, in seconds.
    pub media_start_time: f64,
    pub timescale: u64,

    /// Media url, possibly still containing template identifiers.
    pub media: String,
    pub media_range: Option<ByteRange>,

    /// Value of `$Number$`
    pub replacement_number: Option<u64>,
    /// Value of `$Time$`
    pub replacement_time: Option<u64>,

    pub availability_start_time: Option<DateTime<Utc>>,
    pub availability_end_time: Option<DateTime<Utc>>,
    pub wall_start_time: Option<DateTime<Utc>>,
}

impl Segment {
    pub fn presentation_end_time(&self) -> f64 {
        self.presentation_start_time + self.duration
    }
}
