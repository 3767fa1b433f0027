use std::sync::Arc;

use dash_scheduler::{
    timeline::BasicTimelineConverter, LoaderHandle, MediaType, Representation, SchedulerError,
    Segment, SegmentEnumerator, SegmentLoader, SegmentReference, TimelineConverter,
};

use crate::config::{Addressing, TimelineEntry};

/// Lists the segments described by the stream config.
pub struct ConfigEnumerator {
    addressing: Addressing,
    timeline: Arc<BasicTimelineConverter>,
}

impl ConfigEnumerator {
    pub fn new(addressing: Addressing, timeline: Arc<BasicTimelineConverter>) -> Self {
        Self {
            addressing,
            timeline,
        }
    }

    fn template_segments(
        &self,
        representation: &Representation,
        media: &str,
        duration: u64,
        is_dynamic: bool,
    ) -> Vec<Segment> {
        let timescale = representation.timescale.max(1);
        let seconds = duration as f64 / timescale as f64;
        if seconds <= 0. {
            return Vec::new();
        }
        let period = &representation.period;

        let (first, last) = if is_dynamic {
            let range = representation.segment_availability_range;
            let first = ((range.start - period.start) / seconds).floor().max(0.);
            let last = ((range.end - period.start) / seconds).floor();
            if last < first {
                return Vec::new();
            }
            (first as u64, last as u64)
        } else {
            let count = (period.duration / seconds).ceil();
            if !count.is_finite() || count < 1. {
                return Vec::new();
            }
            (0, count as u64 - 1)
        };

        (first..=last)
            .map(|number| {
                let media_time = number * duration;
                self.segment(
                    representation,
                    media,
                    number as usize,
                    media_time,
                    duration,
                    is_dynamic,
                )
            })
            .collect()
    }

    fn timeline_segments(
        &self,
        representation: &Representation,
        media: &str,
        entries: &[TimelineEntry],
        is_dynamic: bool,
    ) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut time = 0;

        for entry in entries {
            if let Some(t) = entry.t {
                time = t;
            }
            for _ in 0..=entry.r {
                let index = segments.len();
                segments.push(self.segment(representation, media, index, time, entry.d, is_dynamic));
                time += entry.d;
            }
        }
        segments
    }

    fn segment(
        &self,
        representation: &Representation,
        media: &str,
        index: usize,
        media_time: u64,
        duration: u64,
        is_dynamic: bool,
    ) -> Segment {
        let timescale = representation.timescale.max(1);
        let mpd = &representation.period.mpd;

        let media_start_time = media_time as f64 / timescale as f64;
        let duration = duration as f64 / timescale as f64;
        let presentation_start_time = self
            .timeline
            .presentation_time_from_media_time(media_start_time, representation);

        let mut segment = Segment {
            representation_id: representation.id.clone(),
            availability_idx: index,
            presentation_start_time,
            duration,
            media_start_time,
            timescale,
            media: media.to_string(),
            media_range: None,
            replacement_number: Some(representation.start_number + index as u64),
            replacement_time: Some(media_time),
            availability_start_time: self.timeline.availability_start_time(
                presentation_start_time,
                mpd,
                is_dynamic,
            ),
            availability_end_time: self.timeline.availability_end_time(
                presentation_start_time + duration,
                mpd,
                is_dynamic,
            ),
            wall_start_time: None,
        };
        segment.wall_start_time = self
            .timeline
            .wall_time_for_segment(&segment, mpd, is_dynamic);
        segment
    }
}

impl SegmentEnumerator for ConfigEnumerator {
    fn segments(
        &self,
        representation: &Representation,
        _requested_time: Option<f64>,
        _current_index: Option<usize>,
        is_dynamic: bool,
    ) -> Option<Vec<Segment>> {
        match &self.addressing {
            Addressing::Template { media, duration } => {
                Some(self.template_segments(representation, media, *duration, is_dynamic))
            }
            Addressing::Timeline { media, segments } => {
                Some(self.timeline_segments(representation, media, segments, is_dynamic))
            }
            // Listed by the index segment
            Addressing::Indexed { .. } => None,
        }
    }
}

/// Answers loads right away from the stream config.
pub struct ConfigLoader {
    references: Option<Vec<SegmentReference>>,
}

impl ConfigLoader {
    pub fn new(references: Option<Vec<SegmentReference>>) -> Self {
        Self { references }
    }
}

impl SegmentLoader for ConfigLoader {
    fn load_initialization(&self, representation: &Representation, handle: LoaderHandle) {
        tracing::debug!(representation_id = %representation.id, "Loading initialization");
        handle.initialization_loaded(representation.id.clone());
    }

    fn load_segments(
        &self,
        representation: &Representation,
        media_type: Option<MediaType>,
        index_range: Option<&str>,
        handle: LoaderHandle,
    ) {
        tracing::debug!(representation_id = %representation.id, index_range, "Loading segments");
        let result = self.references.clone().ok_or_else(|| {
            SchedulerError::Loader(format!("no index segment for {}", representation.id))
        });
        handle.segments_loaded(representation.id.clone(), media_type, result);
    }
}
