use dash_scheduler::{
    MediaType, RequestAction, RequestKind, RequestOptions, SchedulerEvent, SchedulerSettings,
    SegmentInfoType,
};

use super::{numbered_segments, representation, Harness};
use crate::AssertOption;

fn vod_harness() -> (Harness, dash_scheduler::Representation) {
    let harness = Harness::new(MediaType::Video, false);
    harness.enumerator.set(numbered_segments(5, 4., 1));
    harness.converter.set_range(0., 20.);

    let mut representation = representation(SegmentInfoType::SegmentTemplate, 20.);
    representation.segment_duration = Some(4.);
    representation.available_segments_number = 5;

    (harness, representation)
}

#[test]
fn test_vod_template_plays_to_completion() -> anyhow::Result<()> {
    let (mut harness, mut representation) = vod_harness();

    harness.scheduler.refresh(&mut representation, false);
    let events = harness.drain_events();
    assert_eq!(events.len(), 1);
    let SchedulerEvent::RepresentationUpdated {
        media_type,
        representation_id,
        error,
    } = &events[0];
    assert_eq!(*media_type, Some(MediaType::Video));
    assert_eq!(representation_id, "v1");
    assert!(error.is_none());

    let request = harness
        .scheduler
        .resolve_at_time(&mut representation, 0., RequestOptions::default())
        .assert_some();
    assert_eq!(request.index, Some(0));
    assert_eq!(request.kind, RequestKind::MediaSegment);
    assert_eq!(
        request.url.as_deref(),
        Some("https://cdn.example.com/media/v1/1.m4s")
    );
    assert_eq!(request.service_location.as_deref(), Some("cdn"));
    assert_eq!(harness.scheduler.index(), Some(0));

    for expected in 1..5 {
        assert!(!harness.scheduler.is_finished(&representation));
        let request = harness
            .scheduler
            .advance(&mut representation)
            .assert_some();
        assert_eq!(request.action, RequestAction::Download);
        assert_eq!(request.index, Some(expected));
        assert_eq!(request.start_time, Some(expected as f64 * 4.));
        assert_eq!(
            request.url,
            Some(format!(
                "https://cdn.example.com/media/v1/{}.m4s",
                expected + 1
            ))
        );
    }

    let request = harness
        .scheduler
        .advance(&mut representation)
        .assert_some();
    assert!(request.is_complete());
    assert_eq!(request.action, RequestAction::Complete);
    assert_eq!(request.index, Some(5));
    assert_eq!(request.media_type, Some(MediaType::Video));
    assert!(harness.scheduler.is_finished(&representation));

    Ok(())
}

#[test]
fn test_advance_without_position() {
    let (mut harness, mut representation) = vod_harness();
    harness.scheduler.refresh(&mut representation, false);

    harness
        .scheduler
        .advance(&mut representation)
        .assert_none();
    assert_eq!(harness.scheduler.index(), None);
}

#[test]
fn test_keep_index_restores_position() {
    let (mut harness, mut representation) = vod_harness();
    harness.scheduler.refresh(&mut representation, false);

    harness
        .scheduler
        .resolve_at_time(&mut representation, 0., RequestOptions::default())
        .assert_some();
    harness
        .scheduler
        .advance(&mut representation)
        .assert_some();
    assert_eq!(harness.scheduler.index(), Some(1));

    let request = harness
        .scheduler
        .resolve_at_time(
            &mut representation,
            13.,
            RequestOptions {
                keep_index: true,
                ..Default::default()
            },
        )
        .assert_some();
    assert_eq!(request.index, Some(3));
    assert_eq!(harness.scheduler.index(), Some(1));

    let request = harness
        .scheduler
        .advance(&mut representation)
        .assert_some();
    assert_eq!(request.index, Some(2));
}

#[test]
fn test_keep_index_without_previous_position() {
    let (mut harness, mut representation) = vod_harness();
    harness.scheduler.refresh(&mut representation, false);

    harness
        .scheduler
        .resolve_at_time(
            &mut representation,
            9.,
            RequestOptions {
                keep_index: true,
                ..Default::default()
            },
        )
        .assert_some();
    assert_eq!(harness.scheduler.index(), Some(2));
}

#[test]
fn test_resolve_outside_segments_retries_enumeration() {
    let (mut harness, mut representation) = vod_harness();
    harness.scheduler.refresh(&mut representation, false);
    let calls = harness.enumerator.calls();

    harness
        .scheduler
        .resolve_at_time(&mut representation, 100., RequestOptions::default())
        .assert_none();
    assert_eq!(harness.enumerator.calls(), calls + 2);
    assert_eq!(harness.scheduler.index(), None);
}

#[test]
fn test_resolve_near_boundary_uses_tolerance() {
    let (mut harness, mut representation) = vod_harness();
    harness.scheduler.refresh(&mut representation, false);

    // Within the default overlap tolerance of the end of the first segment
    let request = harness
        .scheduler
        .resolve_at_time(&mut representation, 4.03, RequestOptions::default())
        .assert_some();
    assert_eq!(request.index, Some(0));

    let request = harness
        .scheduler
        .resolve_at_time(
            &mut representation,
            4.03,
            RequestOptions {
                tolerance: Some(0.),
                ..Default::default()
            },
        )
        .assert_some();
    assert_eq!(request.index, Some(1));
}

#[test]
fn test_half_duration_tolerance_when_unset() {
    let mut harness = Harness::with_settings(
        MediaType::Video,
        false,
        SchedulerSettings {
            segment_overlap_tolerance_time: None,
        },
    );
    harness.enumerator.set(numbered_segments(5, 4., 1));
    harness.converter.set_range(0., 20.);

    let mut representation = representation(SegmentInfoType::SegmentTemplate, 20.);
    representation.segment_duration = Some(4.);
    representation.available_segments_number = 5;
    harness.scheduler.refresh(&mut representation, false);

    // 20.5 is within half a segment of the last one
    let request = harness
        .scheduler
        .resolve_at_time(&mut representation, 20.5, RequestOptions::default())
        .assert_some();
    assert_eq!(request.index, Some(4));
}

#[test]
fn test_complete_when_resolving_at_end() {
    let (mut harness, mut representation) = vod_harness();
    harness.scheduler.refresh(&mut representation, false);

    harness.enumerator.set(numbered_segments(6, 4., 1));

    // A sixth segment starting at the end of the period is past the presentation
    let request = harness
        .scheduler
        .resolve_at_time(&mut representation, 21., RequestOptions::default())
        .assert_some();
    assert!(request.is_complete());
    assert_eq!(request.index, Some(5));

    let request = harness
        .scheduler
        .resolve_at_time(
            &mut representation,
            21.,
            RequestOptions {
                ignore_is_finished: true,
                ..Default::default()
            },
        )
        .assert_some();
    assert!(!request.is_complete());
    assert_eq!(request.index, Some(5));
}

#[test]
fn test_init_request() {
    let (mut harness, mut representation) = vod_harness();
    harness.scheduler.refresh(&mut representation, false);

    let request = harness
        .scheduler
        .init_request(&representation)
        .assert_some();
    assert_eq!(request.kind, RequestKind::InitializationSegment);
    assert_eq!(request.media_type, Some(MediaType::Video));
    assert_eq!(
        request.url.as_deref(),
        Some("https://cdn.example.com/media/$RepresentationID$/init.mp4")
    );
}

#[test]
fn test_reset_forgets_track() {
    let (mut harness, mut representation) = vod_harness();
    harness.scheduler.refresh(&mut representation, false);
    harness
        .scheduler
        .resolve_at_time(&mut representation, 4., RequestOptions::default())
        .assert_some();
    harness.scheduler.set_current_time(4.);

    harness.scheduler.reset();
    assert_eq!(harness.scheduler.index(), None);
    assert_eq!(harness.scheduler.media_type(), None);
    assert_eq!(harness.scheduler.current_time(), 0.);
}
