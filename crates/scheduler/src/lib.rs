//! # MPEG-DASH fragment scheduling
//!
//! Given a [`Representation`] and a playback time, this crate decides which media segment has
//! to be fetched next and builds the [`FragmentRequest`] describing it. Manifest parsing,
//! networking and quality selection are left to the caller, which plugs them in through the
//! traits of [`collaborator`].
//!
//! ```text
//!                 resolve_at_time ──┐        ┌── advance
//!                                   ▼        ▼
//!  ┌─────────────┐  segments  ┌──────────────────────┐  request  ┌───────────┐
//!  │  Segment    ├────────────►   SegmentScheduler   ├───────────► Transport │
//!  │  Enumerator │            │  (cursor, lifecycle) │           └───────────┘
//!  └─────────────┘            └──────────▲───────────┘
//!                                        │ LoaderNotification
//!                              ┌─────────┴──────────┐
//!                              │   SegmentLoader    │
//!                              └────────────────────┘
//! ```
//!
//! Both static (on-demand) and dynamic (live) presentations are supported, with either
//! `SegmentTimeline` or `SegmentTemplate@duration` addressing.

pub mod builder;
pub mod collaborator;
pub mod error;
pub mod event;
mod lifecycle;
pub mod model;
pub mod request;
pub mod resolver;
pub mod scheduler;
pub mod settings;
pub mod template;
pub mod timeline;
pub mod util;

pub use collaborator::{
    BaseUrl, BaseUrlResolver, SegmentEnumerator, SegmentLoader, TimelineConverter,
};
pub use error::{SchedulerError, SchedulerResult};
pub use event::{LoaderHandle, LoaderNotification, SchedulerEvent, SegmentReference};
pub use model::{
    AvailabilityRange, MediaType, MpdInfo, Period, Representation, RepresentationPath, Segment,
    SegmentInfoType,
};
pub use request::{FragmentRequest, RequestAction, RequestKind};
pub use scheduler::{RequestOptions, SchedulerConfig, SegmentScheduler, Track};
pub use settings::SchedulerSettings;
pub use util::range::ByteRange;
