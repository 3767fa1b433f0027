use std::sync::Arc;

use tokio::sync::mpsc;

use crate::{
    builder::RequestBuilder,
    resolver::{resolve_index, segment_by_index},
    BaseUrlResolver, FragmentRequest, LoaderHandle, LoaderNotification, MediaType, Representation,
    SchedulerEvent, SchedulerSettings, Segment, SegmentEnumerator, SegmentInfoType, SegmentLoader,
    TimelineConverter,
};

/// Collaborators and settings shared by every scheduler of a player.
#[derive(Clone)]
pub struct SchedulerConfig {
    pub settings: SchedulerSettings,
    pub timeline_converter: Arc<dyn TimelineConverter>,
    pub segment_enumerator: Arc<dyn SegmentEnumerator>,
    pub base_url_resolver: Arc<dyn BaseUrlResolver>,
    pub segment_loader: Arc<dyn SegmentLoader>,
}

/// The track a scheduler is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Track {
    pub media_type: MediaType,
    /// Whether the presentation is dynamic (live).
    pub is_dynamic: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RequestOptions {
    /// Only check that `time` resolves, keeping the current position unless the
    /// representation is a live `SegmentTimeline`.
    pub keep_index: bool,
    /// Overrides [`SchedulerSettings::segment_overlap_tolerance_time`].
    pub tolerance: Option<f64>,
    pub ignore_is_finished: bool,
}

/// Resolves which fragment of a representation must be fetched next, and keeps track of the
/// position reached in its timeline.
///
/// One scheduler serves one track. Its cursor is `None` until a request has been resolved by
/// time, and points at the availability index of the last served segment afterwards.
pub struct SegmentScheduler {
    pub(crate) settings: SchedulerSettings,
    pub(crate) timeline_converter: Arc<dyn TimelineConverter>,
    pub(crate) segment_enumerator: Arc<dyn SegmentEnumerator>,
    pub(crate) segment_loader: Arc<dyn SegmentLoader>,
    pub(crate) builder: RequestBuilder,

    pub(crate) events: mpsc::UnboundedSender<SchedulerEvent>,
    pub(crate) loader_handle: LoaderHandle,
    pub(crate) notifications: mpsc::UnboundedReceiver<LoaderNotification>,

    pub(crate) track: Option<Track>,
    pub(crate) index: Option<usize>,
    requested_time: Option<f64>,
    current_time: f64,
}

impl SegmentScheduler {
    pub fn new(config: SchedulerConfig) -> (Self, mpsc::UnboundedReceiver<SchedulerEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let (sender, notifications) = mpsc::unbounded_channel();

        let scheduler = Self {
            settings: config.settings,
            builder: RequestBuilder::new(
                config.timeline_converter.clone(),
                config.base_url_resolver,
            ),
            timeline_converter: config.timeline_converter,
            segment_enumerator: config.segment_enumerator,
            segment_loader: config.segment_loader,
            events,
            loader_handle: LoaderHandle::new(sender),
            notifications,
            track: None,
            index: None,
            requested_time: None,
            current_time: 0.,
        };
        (scheduler, receiver)
    }

    /// Bind the scheduler to a track. Returns the handle loader completions are sent through.
    pub fn initialize(&mut self, track: Track) -> LoaderHandle {
        self.track = Some(track);
        self.loader_handle.clone()
    }

    pub fn track(&self) -> Option<Track> {
        self.track
    }

    pub fn media_type(&self) -> Option<MediaType> {
        self.track.map(|track| track.media_type)
    }

    pub fn is_dynamic(&self) -> bool {
        self.track.is_some_and(|track| track.is_dynamic)
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn set_current_time(&mut self, time: f64) {
        self.current_time = time;
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn reset_index(&mut self) {
        self.index = None;
    }

    /// Forget the position and the track binding.
    ///
    /// Completions of loads started before the reset are discarded.
    pub fn reset(&mut self) {
        self.reset_index();
        self.current_time = 0.;
        self.requested_time = None;
        self.track = None;

        let (sender, notifications) = mpsc::unbounded_channel();
        self.loader_handle = LoaderHandle::new(sender);
        self.notifications = notifications;
    }

    pub fn init_request(&self, representation: &Representation) -> Option<FragmentRequest> {
        self.builder
            .init_request(representation, self.media_type(), self.is_dynamic())
    }

    /// Resolve the request for the segment at `time`, used when seeking or starting playback.
    pub fn resolve_at_time(
        &mut self,
        representation: &mut Representation,
        time: f64,
        options: RequestOptions,
    ) -> Option<FragmentRequest> {
        if !representation.is_available() {
            tracing::debug!(representation_id = %representation.id, "Segments are not available yet");
            return None;
        }

        let previous_index = self.index;
        let media_type = self.media_type();

        // At the live edge the same time is requested repeatedly until its segment is available
        if self.requested_time != Some(time) {
            self.requested_time = Some(time);
            tracing::debug!(?media_type, time, "Getting the request for time");
        }

        let tolerance = options
            .tolerance
            .or(self.settings.segment_overlap_tolerance_time);

        self.update_segments(representation);
        self.index = resolve_index(time, representation, tolerance);

        // The segment list may not cover `time` yet, give it another chance
        if self.index.is_none() {
            self.update_segments(representation);
            self.index = resolve_index(time, representation, tolerance);
        }

        if let Some(index) = self.index {
            tracing::debug!(?media_type, time, index, "Resolved index for time");
        }

        let finished = !options.ignore_is_finished && self.is_finished(representation);
        let request = if finished {
            tracing::debug!(?media_type, "Signal complete when resolving by time");
            Some(FragmentRequest::complete(media_type, self.index))
        } else {
            let representation: &Representation = representation;
            self.index
                .and_then(|index| segment_by_index(index, representation))
                .and_then(|segment| self.build_media_request(segment, representation))
        };

        if options.keep_index && previous_index.is_some() && !self.is_live_timeline(representation)
        {
            self.index = previous_index;
        }

        request
    }

    /// Step to the segment following the current position, used during continuous playback.
    ///
    /// Returns `None` when nothing was positioned yet, or when the next segment of a live
    /// stream is not available yet. In the latter case the position is kept so that the next
    /// call retries the same segment.
    pub fn advance(&mut self, representation: &mut Representation) -> Option<FragmentRequest> {
        if !representation.is_available() {
            tracing::debug!(representation_id = %representation.id, "Segments are not available yet");
            return None;
        }

        let index = self.index? + 1;
        let media_type = self.media_type();
        let is_dynamic = self.is_dynamic();

        self.requested_time = None;
        self.index = Some(index);
        tracing::debug!(?media_type, index, "Getting the next request");

        if is_dynamic && segment_by_index(index, representation).is_none() {
            tracing::debug!(index, "No segment found at index, waiting for the next loop");
            self.update_segments(representation);
            self.index = Some(index - 1);
            return None;
        }

        if self.is_finished(representation) {
            tracing::debug!(?media_type, "Signal complete");
            return Some(FragmentRequest::complete(media_type, self.index));
        }

        self.update_segments(representation);
        let Some(segment) = segment_by_index(index, representation) else {
            if is_dynamic {
                // Asked for a segment of the live edge before it was produced
                self.index = Some(index - 1);
            }
            return None;
        };
        self.build_media_request(segment, representation)
    }

    /// Whether the cursor has reached the end of the representation.
    pub fn is_finished(&self, representation: &Representation) -> bool {
        if !self.is_dynamic() && self.index == Some(representation.available_segments_number) {
            return true;
        }

        let Some(segment) = self
            .index
            .and_then(|index| segment_by_index(index, representation))
        else {
            tracing::debug!(index = ?self.index, "No segment found when checking completion");
            return false;
        };

        // A live timeline is only closed by the manifest
        if self.is_live_timeline(representation) {
            return false;
        }

        let time = round5(segment.presentation_start_time - representation.period.start);
        let duration = representation.period.duration;
        tracing::debug!(
            segment_info_type = ?representation.segment_info_type,
            time,
            duration,
            "Checking completion"
        );
        time >= duration
    }

    fn is_live_timeline(&self, representation: &Representation) -> bool {
        self.is_dynamic() && representation.segment_info_type == SegmentInfoType::SegmentTimeline
    }

    fn build_media_request(
        &self,
        segment: &Segment,
        representation: &Representation,
    ) -> Option<FragmentRequest> {
        self.builder
            .media_request(segment, representation, self.media_type())
    }

    /// Ask the enumerator for the current segments of `representation`.
    pub(crate) fn update_segments(&self, representation: &mut Representation) {
        let segments = self.segment_enumerator.segments(
            representation,
            self.requested_time,
            self.index,
            self.is_dynamic(),
        );
        if segments.is_some() {
            self.on_segment_list_updated(representation, segments);
        }
    }

    pub(crate) fn on_segment_list_updated(
        &self,
        representation: &mut Representation,
        segments: Option<Vec<Segment>>,
    ) {
        representation.segments = segments;

        if !self.is_dynamic() {
            return;
        }
        if let Some(last) = representation
            .segments
            .as_ref()
            .and_then(|segments| segments.last())
        {
            // The last segment is the expected, not calculated, live edge
            let live_edge = last.presentation_start_time;
            self.timeline_converter.set_expected_live_edge(live_edge);
            tracing::debug!(live_edge, "Updated expected live edge");
        }
    }
}

fn round5(value: f64) -> f64 {
    (value * 100000.).round() / 100000.
}
