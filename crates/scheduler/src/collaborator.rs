//! Interfaces of the components the scheduler relies on but does not implement.

use chrono::{DateTime, TimeDelta, Utc};

use crate::{
    AvailabilityRange, LoaderHandle, MediaType, MpdInfo, Representation, RepresentationPath,
    Segment,
};

/// Maps presentation time onto wall clock time and computes availability windows.
pub trait TimelineConverter: Send + Sync {
    fn availability_start_time(
        &self,
        presentation_time: f64,
        mpd: &MpdInfo,
        is_dynamic: bool,
    ) -> Option<DateTime<Utc>>;

    fn availability_end_time(
        &self,
        presentation_end_time: f64,
        mpd: &MpdInfo,
        is_dynamic: bool,
    ) -> Option<DateTime<Utc>>;

    fn segment_availability_range(
        &self,
        representation: &Representation,
        is_dynamic: bool,
    ) -> AvailabilityRange;

    /// Record the live edge announced by the newest segment of a dynamic timeline.
    fn set_expected_live_edge(&self, time: f64);

    fn presentation_time_from_media_time(
        &self,
        media_time: f64,
        representation: &Representation,
    ) -> f64 {
        media_time - representation.presentation_time_offset + representation.period.start
    }

    fn wall_time_for_segment(
        &self,
        segment: &Segment,
        mpd: &MpdInfo,
        is_dynamic: bool,
    ) -> Option<DateTime<Utc>> {
        if !is_dynamic {
            return None;
        }
        let offset = TimeDelta::milliseconds((segment.presentation_start_time * 1000.) as i64);
        Some(mpd.availability_start_time + offset)
    }
}

/// Produces the candidate segments of a representation from its addressing metadata.
pub trait SegmentEnumerator: Send + Sync {
    fn segments(
        &self,
        representation: &Representation,
        requested_time: Option<f64>,
        current_index: Option<usize>,
        is_dynamic: bool,
    ) -> Option<Vec<Segment>>;
}

impl<F> SegmentEnumerator for F
where
    F: Fn(&Representation, Option<f64>, Option<usize>, bool) -> Option<Vec<Segment>>
        + Send
        + Sync,
{
    fn segments(
        &self,
        representation: &Representation,
        requested_time: Option<f64>,
        current_index: Option<usize>,
        is_dynamic: bool,
    ) -> Option<Vec<Segment>> {
        self(representation, requested_time, current_index, is_dynamic)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl {
    pub url: String,
    pub service_location: Option<String>,
}

impl BaseUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            service_location: None,
        }
    }

    pub fn with_service_location(mut self, service_location: impl Into<String>) -> Self {
        self.service_location = Some(service_location.into());
        self
    }
}

/// Picks the base url currently in use for a representation.
pub trait BaseUrlResolver: Send + Sync {
    fn resolve(&self, path: &RepresentationPath) -> Option<BaseUrl>;
}

impl BaseUrlResolver for BaseUrl {
    fn resolve(&self, _path: &RepresentationPath) -> Option<BaseUrl> {
        Some(self.clone())
    }
}

/// Fetches initialization and index data. Completions are reported through the handle.
pub trait SegmentLoader: Send + Sync {
    fn load_initialization(&self, representation: &Representation, handle: LoaderHandle);

    fn load_segments(
        &self,
        representation: &Representation,
        media_type: Option<MediaType>,
        index_range: Option<&str>,
        handle: LoaderHandle,
    );
}
