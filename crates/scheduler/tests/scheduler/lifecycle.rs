use dash_scheduler::{
    ByteRange, MediaType, RequestOptions, SchedulerError, SchedulerEvent, SegmentInfoType,
    SegmentReference, Track,
};

use super::{numbered_segments, representation, Harness};
use crate::AssertOption;

fn live_template() -> (Harness, dash_scheduler::Representation) {
    let harness = Harness::new(MediaType::Video, true);
    harness.enumerator.set(numbered_segments(3, 2., 1));

    let mut representation = representation(SegmentInfoType::SegmentTemplate, f64::INFINITY);
    representation.segment_duration = Some(2.);
    (harness, representation)
}

fn indexed_audio() -> (Harness, dash_scheduler::Representation) {
    let harness = Harness::new(MediaType::Audio, false);

    let mut representation = representation(SegmentInfoType::SegmentBase, 6.);
    representation.mime_type = Some("audio/mp4".to_string());
    representation.initialization = None;
    representation.index_range = Some("863-1062".to_string());
    representation.timescale = 90000;
    (harness, representation)
}

fn references(count: u64) -> Vec<SegmentReference> {
    (0..count)
        .map(|i| SegmentReference {
            start_time: i * 180000,
            duration: 180000,
            timescale: 90000,
            media: "audio.mp4".to_string(),
            media_range: Some(ByteRange::new(1063 + i * 4096, Some(4096))),
        })
        .collect()
}

#[test]
fn test_inverted_window_blocks_representation() {
    let (mut harness, mut representation) = live_template();
    harness.converter.set_range(10., 4.);

    harness.scheduler.refresh(&mut representation, false);

    let events = harness.drain_events();
    assert_eq!(events.len(), 1);
    let SchedulerEvent::RepresentationUpdated { error, .. } = &events[0];
    assert!(matches!(
        error,
        Some(SchedulerError::SegmentsUnavailable { availability_delay }) if *availability_delay == 6.
    ));

    harness
        .scheduler
        .resolve_at_time(&mut representation, 0., RequestOptions::default())
        .assert_none();
    harness
        .scheduler
        .advance(&mut representation)
        .assert_none();
    assert!(harness.loader.initializations.lock().unwrap().is_empty());
    assert!(harness.loader.segments.lock().unwrap().is_empty());
}

#[test]
fn test_inverted_window_keeps_position() {
    let (mut harness, mut representation) = live_template();
    harness.converter.set_range(0., 4.);
    harness.scheduler.refresh(&mut representation, false);
    harness
        .scheduler
        .resolve_at_time(&mut representation, 0.5, RequestOptions::default())
        .assert_some();
    harness.drain_events();

    harness.converter.set_range(8., 4.);
    harness.scheduler.refresh(&mut representation, true);
    assert_eq!(harness.drain_events().len(), 1);

    harness
        .scheduler
        .advance(&mut representation)
        .assert_none();
    assert_eq!(harness.scheduler.index(), Some(0));
}

#[test]
fn test_calculated_live_edge_ignores_inverted_window() {
    let (mut harness, mut representation) = live_template();
    harness.converter.set_range(10., 4.);
    representation.use_calculated_live_edge_time = true;

    harness.scheduler.refresh(&mut representation, false);

    let events = harness.drain_events();
    assert_eq!(events.len(), 1);
    let SchedulerEvent::RepresentationUpdated { error, .. } = &events[0];
    assert!(error.is_none());

    harness
        .scheduler
        .resolve_at_time(&mut representation, 2.5, RequestOptions::default())
        .assert_some();
}

#[test]
fn test_refresh_resets_position_unless_kept() {
    let (mut harness, mut representation) = live_template();
    harness.converter.set_range(0., 4.);
    harness.scheduler.refresh(&mut representation, false);
    harness
        .scheduler
        .resolve_at_time(&mut representation, 2.5, RequestOptions::default())
        .assert_some();

    harness.scheduler.refresh(&mut representation, true);
    assert_eq!(harness.scheduler.index(), Some(1));

    harness.scheduler.refresh(&mut representation, false);
    assert_eq!(harness.scheduler.index(), None);
}

#[test]
fn test_indexed_segments_come_from_loader() {
    let (mut harness, mut representation) = indexed_audio();

    harness.scheduler.refresh(&mut representation, false);
    assert!(harness.drain_events().is_empty());
    assert_eq!(
        *harness.loader.initializations.lock().unwrap(),
        vec!["v1".to_string()]
    );
    assert_eq!(
        *harness.loader.segments.lock().unwrap(),
        vec![(
            "v1".to_string(),
            Some(MediaType::Audio),
            Some("863-1062".to_string())
        )]
    );
    let handle = harness.loader.handles.lock().unwrap()[0].clone();

    // Initialization first, no segments to serve yet
    representation.range = Some(ByteRange::new(0, Some(863)));
    handle.initialization_loaded("v1");
    let notification = harness.scheduler.try_next_notification().assert_some();
    harness
        .scheduler
        .handle_notification(&mut representation, notification);
    assert!(harness.drain_events().is_empty());

    handle.segments_loaded("v1", Some(MediaType::Audio), Ok(references(3)));
    let notification = harness.scheduler.try_next_notification().assert_some();
    harness
        .scheduler
        .handle_notification(&mut representation, notification);

    let events = harness.drain_events();
    assert_eq!(events.len(), 1);
    let SchedulerEvent::RepresentationUpdated {
        media_type, error, ..
    } = &events[0];
    assert_eq!(*media_type, Some(MediaType::Audio));
    assert!(error.is_none());

    assert_eq!(representation.available_segments_number, 3);
    assert_eq!(representation.segment_availability_range.start, 0.);
    assert_eq!(representation.segment_availability_range.end, 4.);
    let segments = representation.segments.as_ref().assert_some();
    assert_eq!(
        segments
            .iter()
            .map(|s| (s.presentation_start_time, s.duration, s.replacement_number))
            .collect::<Vec<_>>(),
        vec![(0., 2., Some(1)), (2., 2., Some(2)), (4., 2., Some(3))]
    );
    assert_eq!(segments[1].replacement_time, Some(180000));

    // The enumerator knows nothing about indexed segments, the loaded ones stay in place
    let request = harness
        .scheduler
        .resolve_at_time(&mut representation, 2.5, RequestOptions::default())
        .assert_some();
    assert_eq!(request.index, Some(1));
    assert_eq!(
        request.url.as_deref(),
        Some("https://cdn.example.com/media/audio.mp4")
    );
    assert_eq!(request.range, Some(ByteRange::new(1063 + 4096, Some(4096))));

    let request = harness
        .scheduler
        .init_request(&representation)
        .assert_some();
    assert_eq!(request.range, Some(ByteRange::new(0, Some(863))));
}

#[test]
fn test_initialization_after_segments_notifies() {
    let (mut harness, mut representation) = indexed_audio();
    harness.scheduler.refresh(&mut representation, false);

    harness
        .handle
        .segments_loaded("v1", Some(MediaType::Audio), Ok(references(2)));
    let notification = harness.scheduler.try_next_notification().assert_some();
    harness
        .scheduler
        .handle_notification(&mut representation, notification);
    // Still waiting for the initialization segment
    assert!(harness.drain_events().is_empty());
    assert_eq!(representation.available_segments_number, 2);

    representation.range = Some(ByteRange::new(0, Some(863)));
    harness.handle.initialization_loaded("v1");
    let notification = harness.scheduler.try_next_notification().assert_some();
    harness
        .scheduler
        .handle_notification(&mut representation, notification);
    assert_eq!(harness.drain_events().len(), 1);
}

#[test]
fn test_unrelated_completions_are_ignored() {
    let (mut harness, mut representation) = indexed_audio();
    harness.scheduler.refresh(&mut representation, false);

    harness
        .handle
        .segments_loaded("a2", Some(MediaType::Audio), Ok(references(3)));
    harness
        .handle
        .segments_loaded("v1", Some(MediaType::Video), Ok(references(3)));
    harness.handle.segments_loaded(
        "v1",
        Some(MediaType::Audio),
        Err(SchedulerError::Loader("index segment unreachable".to_string())),
    );

    while let Some(notification) = harness.scheduler.try_next_notification() {
        harness
            .scheduler
            .handle_notification(&mut representation, notification);
    }

    assert!(representation.segments.is_none());
    assert_eq!(representation.available_segments_number, 0);
    assert!(harness.drain_events().is_empty());
}

#[test]
fn test_reset_discards_stale_completions() {
    let (mut harness, mut representation) = indexed_audio();
    harness.scheduler.refresh(&mut representation, false);
    let stale = harness.handle.clone();

    harness.scheduler.reset();
    assert!(stale.is_closed());
    stale.segments_loaded("v1", Some(MediaType::Audio), Ok(references(3)));
    harness
        .scheduler
        .try_next_notification()
        .assert_none();

    let fresh = harness.scheduler.initialize(Track {
        media_type: MediaType::Audio,
        is_dynamic: false,
    });
    assert!(!fresh.is_closed());
    fresh.initialization_loaded("v1");
    harness
        .scheduler
        .try_next_notification()
        .assert_some();
}

#[tokio::test]
async fn test_next_notification_waits_for_loader() -> anyhow::Result<()> {
    let (mut harness, mut representation) = indexed_audio();
    harness.scheduler.refresh(&mut representation, false);
    representation.range = Some(ByteRange::new(0, Some(863)));

    let handle = harness.handle.clone();
    tokio::spawn(async move {
        tokio::task::yield_now().await;
        handle.segments_loaded("v1", Some(MediaType::Audio), Ok(references(3)));
    });

    let notification = harness.scheduler.next_notification().await.assert_some();
    assert_eq!(notification.representation_id(), "v1");
    harness
        .scheduler
        .handle_notification(&mut representation, notification);

    let event = harness.events.recv().await.assert_some();
    let SchedulerEvent::RepresentationUpdated { error, .. } = event;
    assert!(error.is_none());
    assert_eq!(representation.available_segments_number, 3);

    Ok(())
}
