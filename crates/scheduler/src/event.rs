use tokio::sync::mpsc;

use crate::{ByteRange, MediaType, SchedulerError, SchedulerResult};

/// Notifications published by a [`SegmentScheduler`](crate::SegmentScheduler).
#[derive(Debug)]
pub enum SchedulerEvent {
    /// The representation is ready to serve requests, or failed permanently when `error` is set.
    RepresentationUpdated {
        media_type: Option<MediaType>,
        representation_id: String,
        error: Option<SchedulerError>,
    },
}

/// Segment described by an index segment, in timescale units.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentReference {
    pub start_time: u64,
    pub duration: u64,
    pub timescale: u64,
    pub media: String,
    pub media_range: Option<ByteRange>,
}

/// Completions of the work requested from a [`SegmentLoader`](crate::SegmentLoader).
#[derive(Debug)]
pub enum LoaderNotification {
    InitializationLoaded {
        representation_id: String,
    },
    SegmentsLoaded {
        representation_id: String,
        media_type: Option<MediaType>,
        result: SchedulerResult<Vec<SegmentReference>>,
    },
}

impl LoaderNotification {
    pub fn representation_id(&self) -> &str {
        match self {
            Self::InitializationLoaded { representation_id }
            | Self::SegmentsLoaded {
                representation_id, ..
            } => representation_id,
        }
    }
}

/// Sending half of the completion channel of one scheduler binding.
///
/// Completions sent after the scheduler was reset are dropped silently.
#[derive(Debug, Clone)]
pub struct LoaderHandle {
    sender: mpsc::UnboundedSender<LoaderNotification>,
}

impl LoaderHandle {
    pub(crate) fn new(sender: mpsc::UnboundedSender<LoaderNotification>) -> Self {
        Self { sender }
    }

    pub fn initialization_loaded(&self, representation_id: impl Into<String>) {
        self.send(LoaderNotification::InitializationLoaded {
            representation_id: representation_id.into(),
        });
    }

    pub fn segments_loaded(
        &self,
        representation_id: impl Into<String>,
        media_type: Option<MediaType>,
        result: SchedulerResult<Vec<SegmentReference>>,
    ) {
        self.send(LoaderNotification::SegmentsLoaded {
            representation_id: representation_id.into(),
            media_type,
            result,
        });
    }

    pub fn send(&self, notification: LoaderNotification) {
        if self.sender.send(notification).is_err() {
            tracing::debug!("Scheduler binding is gone, dropping loader completion");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
