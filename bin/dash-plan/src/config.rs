use std::path::Path;

use chrono::{DateTime, Utc};
use dash_scheduler::{
    timeline::Clock, BaseUrl, ByteRange, MediaType, MpdInfo, Period, Representation,
    SchedulerSettings, SegmentInfoType, SegmentReference,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub settings: SchedulerSettings,
    pub stream: StreamConfig,
    pub representation: RepresentationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Live presentation
    #[serde(default)]
    pub dynamic: bool,
    pub base_url: String,
    pub service_location: Option<String>,

    #[serde(default = "unix_epoch")]
    pub availability_start_time: DateTime<Utc>,
    pub time_shift_buffer_depth: Option<f64>,
    pub max_segment_duration: Option<f64>,
    /// Pin the wall clock, the system clock is used otherwise.
    pub now: Option<DateTime<Utc>>,

    #[serde(default)]
    pub period_start: f64,
    /// Unbounded when absent
    pub period_duration: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RepresentationConfig {
    pub id: String,
    pub mime_type: Option<String>,
    /// Overrides the type derived from `mime_type`
    pub media_type: Option<MediaType>,
    #[serde(default)]
    pub bandwidth: u64,
    #[serde(default = "default_timescale")]
    pub timescale: u64,
    pub initialization: Option<String>,
    #[serde(default = "default_start_number")]
    pub start_number: u64,
    /// In timescale units
    #[serde(default)]
    pub presentation_time_offset: u64,
    #[serde(default)]
    pub use_calculated_live_edge_time: bool,
    pub addressing: Addressing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Addressing {
    /// `SegmentTemplate@duration`, in timescale units
    Template { media: String, duration: u64 },
    /// `SegmentTemplate` with a `SegmentTimeline`
    Timeline {
        media: String,
        segments: Vec<TimelineEntry>,
    },
    /// `SegmentBase`, segments are listed by the index segment
    Indexed {
        media: String,
        init_range: String,
        index_range: String,
        references: Vec<IndexEntry>,
    },
}

/// `S` element of a `SegmentTimeline`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub t: Option<u64>,
    pub d: u64,
    #[serde(default)]
    pub r: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub duration: u64,
    pub size: u64,
}

fn unix_epoch() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH
}

fn default_timescale() -> u64 {
    1
}

fn default_start_number() -> u64 {
    1
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config = toml::from_str(&data)?;
        Ok(config)
    }

    pub fn clock(&self) -> Clock {
        self.stream.now.map(Clock::Fixed).unwrap_or_default()
    }

    pub fn base_url(&self) -> BaseUrl {
        let base_url = BaseUrl::new(&self.stream.base_url);
        match &self.stream.service_location {
            Some(location) => base_url.with_service_location(location),
            None => base_url,
        }
    }

    pub fn media_type(&self) -> MediaType {
        let representation = &self.representation;
        representation
            .media_type
            .unwrap_or_else(|| MediaType::from_mime_type(representation.mime_type.as_deref()))
    }

    pub fn representation(&self) -> anyhow::Result<Representation> {
        let stream = &self.stream;
        let config = &self.representation;
        let timescale = config.timescale.max(1);

        let mut representation = Representation {
            id: config.id.clone(),
            mime_type: config.mime_type.clone(),
            bandwidth: config.bandwidth,
            timescale,
            initialization: config.initialization.clone(),
            start_number: config.start_number,
            presentation_time_offset: config.presentation_time_offset as f64 / timescale as f64,
            use_calculated_live_edge_time: config.use_calculated_live_edge_time,
            period: Period {
                start: stream.period_start,
                duration: stream.period_duration.unwrap_or(f64::INFINITY),
                mpd: MpdInfo {
                    availability_start_time: stream.availability_start_time,
                    time_shift_buffer_depth: stream.time_shift_buffer_depth,
                    max_segment_duration: stream.max_segment_duration.unwrap_or(f64::INFINITY),
                    loaded_time: stream.now.unwrap_or_else(Utc::now),
                },
                ..Default::default()
            },
            ..Default::default()
        };

        match &config.addressing {
            Addressing::Template { duration, .. } => {
                let duration = *duration as f64 / timescale as f64;
                if duration <= 0. {
                    anyhow::bail!("segment duration of {} must be positive", config.id);
                }
                representation.segment_info_type = SegmentInfoType::SegmentTemplate;
                representation.segment_duration = Some(duration);
                let count = (representation.period.duration / duration).ceil();
                if count.is_finite() {
                    representation.available_segments_number = count as usize;
                }
            }
            Addressing::Timeline { segments, .. } => {
                representation.segment_info_type = SegmentInfoType::SegmentTimeline;
                representation.available_segments_number =
                    segments.iter().map(|s| s.r as usize + 1).sum();
            }
            Addressing::Indexed {
                init_range,
                index_range,
                ..
            } => {
                representation.segment_info_type = SegmentInfoType::SegmentBase;
                representation.range = Some(ByteRange::parse(init_range)?);
                representation.index_range = Some(index_range.clone());
            }
        }

        Ok(representation)
    }

    /// Content of the index segment, for indexed representations.
    pub fn references(&self) -> anyhow::Result<Option<Vec<SegmentReference>>> {
        let Addressing::Indexed {
            media,
            index_range,
            references,
            ..
        } = &self.representation.addressing
        else {
            return Ok(None);
        };

        let index_range = ByteRange::parse(index_range)?;
        // Media data follows the index segment
        let mut offset = index_range.offset + index_range.length.unwrap_or_default();
        let mut start_time = 0;

        let references = references
            .iter()
            .map(|entry| {
                let reference = SegmentReference {
                    start_time,
                    duration: entry.duration,
                    timescale: self.representation.timescale.max(1),
                    media: media.clone(),
                    media_range: Some(ByteRange::new(offset, Some(entry.size))),
                };
                offset += entry.size;
                start_time += entry.duration;
                reference
            })
            .collect();
        Ok(Some(references))
    }
}
