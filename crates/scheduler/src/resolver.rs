use crate::{Representation, Segment};

/// Find the availability index of the first segment whose presentation interval, widened by
/// `tolerance` on both sides, contains `time`.
///
/// Without a tolerance, each candidate is widened by half of its own duration.
pub fn resolve_index(
    time: f64,
    representation: &Representation,
    tolerance: Option<f64>,
) -> Option<usize> {
    let segments = representation.segments.as_deref()?;

    segments
        .iter()
        .find(|segment| {
            let start = segment.presentation_start_time;
            let duration = segment.duration;
            let epsilon = tolerance.unwrap_or(duration / 2.);

            time + epsilon >= start && time - epsilon < start + duration
        })
        .map(|segment| segment.availability_idx)
}

/// Look up a segment by its availability index.
pub fn segment_by_index(index: usize, representation: &Representation) -> Option<&Segment> {
    let segments = representation.segments.as_deref()?;

    // Fast path: the sequence usually starts at index 0 without holes
    if let Some(segment) = segments.get(index) {
        if segment.availability_idx == index {
            return Some(segment);
        }
    }

    segments
        .iter()
        .find(|segment| segment.availability_idx == index)
}
