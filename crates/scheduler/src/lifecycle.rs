use crate::{
    AvailabilityRange, LoaderNotification, Representation, SchedulerError, SchedulerEvent,
    SegmentReference, SegmentScheduler, Segment,
};

impl SegmentScheduler {
    /// Prepare `representation` for serving requests, after it was first seen or after its
    /// manifest was updated.
    ///
    /// Publishes [`SchedulerEvent::RepresentationUpdated`] once the representation is ready, or
    /// with [`SchedulerError::SegmentsUnavailable`] when its availability window is inverted.
    pub fn refresh(&mut self, representation: &mut Representation, keep_index: bool) {
        let has_initialization = representation.has_initialization();
        let has_segments = representation.has_segments();
        let is_dynamic = self.is_dynamic();

        if representation.segment_duration.is_none() && representation.segments.is_none() {
            self.update_segment_list(representation);
        }

        representation.segment_availability_range = self
            .timeline_converter
            .segment_availability_range(representation, is_dynamic);

        let range = representation.segment_availability_range;
        if range.is_inverted() && !representation.use_calculated_live_edge_time {
            let availability_delay = range.start - range.end;
            tracing::warn!(
                representation_id = %representation.id,
                availability_delay,
                "Segments of representation are not available"
            );
            self.notify_updated(
                representation,
                Some(SchedulerError::SegmentsUnavailable { availability_delay }),
            );
            return;
        }

        if !keep_index {
            self.reset_index();
        }

        // Boundary segments move with the availability window
        if representation.segment_duration.is_some() {
            self.update_segment_list(representation);
        }

        if !has_initialization {
            self.segment_loader
                .load_initialization(representation, self.loader_handle.clone());
        }

        if !has_segments {
            self.segment_loader.load_segments(
                representation,
                self.media_type(),
                representation.index_range.as_deref(),
                self.loader_handle.clone(),
            );
        }

        if has_initialization && has_segments {
            self.notify_updated(representation, None);
        }
    }

    /// Drop the segments of `representation` and compute them again.
    pub fn update_segment_list(&mut self, representation: &mut Representation) {
        representation.segments = None;
        self.update_segments(representation);
    }

    /// Next loader completion, if one is already queued.
    pub fn try_next_notification(&mut self) -> Option<LoaderNotification> {
        self.notifications.try_recv().ok()
    }

    /// Wait for the next loader completion.
    pub async fn next_notification(&mut self) -> Option<LoaderNotification> {
        self.notifications.recv().await
    }

    /// Apply a loader completion to the representation it was issued for.
    pub fn handle_notification(
        &mut self,
        representation: &mut Representation,
        notification: LoaderNotification,
    ) {
        if notification.representation_id() != representation.id {
            tracing::debug!(
                expected = %representation.id,
                received = notification.representation_id(),
                "Ignoring loader completion of another representation"
            );
            return;
        }

        match notification {
            LoaderNotification::InitializationLoaded { .. } => {
                if representation.segments.is_none() {
                    return;
                }
                self.notify_updated(representation, None);
            }
            LoaderNotification::SegmentsLoaded {
                media_type, result, ..
            } => {
                if media_type != self.media_type() {
                    return;
                }
                match result {
                    Ok(references) => self.on_segments_loaded(representation, &references),
                    Err(error) => {
                        tracing::debug!(%error, "Ignoring failed segment load");
                    }
                }
            }
        }
    }

    fn on_segments_loaded(
        &mut self,
        representation: &mut Representation,
        references: &[SegmentReference],
    ) {
        let segments: Vec<Segment> = references
            .iter()
            .enumerate()
            .map(|(index, reference)| self.time_based_segment(representation, reference, index))
            .collect();

        if let (Some(first), Some(last)) = (segments.first(), segments.last()) {
            representation.segment_availability_range =
                AvailabilityRange::new(first.presentation_start_time, last.presentation_start_time);
        }
        representation.available_segments_number = segments.len();
        tracing::debug!(
            representation_id = %representation.id,
            count = segments.len(),
            "Segments loaded"
        );

        self.on_segment_list_updated(representation, Some(segments));

        if !representation.has_initialization() {
            return;
        }
        self.notify_updated(representation, None);
    }

    fn time_based_segment(
        &self,
        representation: &Representation,
        reference: &SegmentReference,
        index: usize,
    ) -> Segment {
        let is_dynamic = self.is_dynamic();
        let mpd = &representation.period.mpd;

        let timescale = reference.timescale.max(1) as f64;
        let scaled_time = reference.start_time as f64 / timescale;
        let scaled_duration = (reference.duration as f64 / timescale).min(mpd.max_segment_duration);

        let presentation_start_time = self
            .timeline_converter
            .presentation_time_from_media_time(scaled_time, representation);
        let presentation_end_time = presentation_start_time + scaled_duration;

        let mut segment = Segment {
            representation_id: representation.id.clone(),
            availability_idx: index,
            presentation_start_time,
            duration: scaled_duration,
            media_start_time: scaled_time,
            timescale: reference.timescale,
            media: reference.media.clone(),
            media_range: reference.media_range,
            replacement_number: Some(representation.start_number + index as u64),
            replacement_time: Some(reference.start_time),
            availability_start_time: Some(mpd.loaded_time),
            availability_end_time: self.timeline_converter.availability_end_time(
                presentation_end_time,
                mpd,
                is_dynamic,
            ),
            wall_start_time: None,
        };
        segment.wall_start_time = self
            .timeline_converter
            .wall_time_for_segment(&segment, mpd, is_dynamic);
        segment
    }

    fn notify_updated(&self, representation: &Representation, error: Option<SchedulerError>) {
        let event = SchedulerEvent::RepresentationUpdated {
            media_type: self.media_type(),
            representation_id: representation.id.clone(),
            error,
        };
        if self.events.send(event).is_err() {
            tracing::debug!("No one is listening to scheduler events");
        }
    }
}
