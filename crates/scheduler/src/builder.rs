use std::sync::Arc;

use crate::{
    template::Template,
    util::url::{is_absolute_url, is_relative_url, merge_baseurls},
    BaseUrlResolver, FragmentRequest, MediaType, Representation, RequestKind, Segment,
    TimelineConverter,
};

/// Materializes [`FragmentRequest`]s for initialization and media segments.
#[derive(Clone)]
pub struct RequestBuilder {
    timeline_converter: Arc<dyn TimelineConverter>,
    base_url_resolver: Arc<dyn BaseUrlResolver>,
}

struct ResolvedUrl {
    url: String,
    service_location: Option<String>,
}

impl RequestBuilder {
    pub fn new(
        timeline_converter: Arc<dyn TimelineConverter>,
        base_url_resolver: Arc<dyn BaseUrlResolver>,
    ) -> Self {
        Self {
            timeline_converter,
            base_url_resolver,
        }
    }

    pub fn init_request(
        &self,
        representation: &Representation,
        media_type: Option<MediaType>,
        is_dynamic: bool,
    ) -> Option<FragmentRequest> {
        let period = &representation.period;

        let resolved = self.resolve_url(representation.initialization.as_deref(), representation)?;
        let mut template = Template::new();
        template.insert(Template::BANDWIDTH, representation.bandwidth.to_string());
        let url = template.replace(&resolved.url, Template::BANDWIDTH);

        Some(FragmentRequest {
            media_type,
            kind: RequestKind::InitializationSegment,
            url: Some(url),
            service_location: resolved.service_location,
            range: representation.range,
            availability_start_time: self.timeline_converter.availability_start_time(
                period.start,
                &period.mpd,
                is_dynamic,
            ),
            availability_end_time: self.timeline_converter.availability_end_time(
                period.start + period.duration,
                &period.mpd,
                is_dynamic,
            ),
            quality: Some(representation.index),
            representation_id: Some(representation.id.clone()),
            ..Default::default()
        })
    }

    pub fn media_request(
        &self,
        segment: &Segment,
        representation: &Representation,
        media_type: Option<MediaType>,
    ) -> Option<FragmentRequest> {
        let mut template = Template::new();
        template
            .insert_optional(
                Template::NUMBER,
                segment.replacement_number.map(|n| n.to_string()),
            )
            .insert_optional(
                Template::TIME,
                segment.replacement_time.map(|t| t.to_string()),
            )
            .insert(Template::BANDWIDTH, representation.bandwidth.to_string())
            .insert(Template::REPRESENTATION_ID, representation.id.clone());
        let url = template.resolve(&segment.media);

        let resolved = self.resolve_url(Some(&url), representation)?;

        Some(FragmentRequest {
            media_type,
            kind: RequestKind::MediaSegment,
            url: Some(resolved.url),
            service_location: resolved.service_location,
            range: segment.media_range,
            start_time: Some(segment.presentation_start_time),
            duration: Some(segment.duration),
            timescale: Some(representation.timescale),
            availability_start_time: segment.availability_start_time,
            availability_end_time: segment.availability_end_time,
            wall_start_time: segment.wall_start_time,
            quality: Some(representation.index),
            index: Some(segment.availability_idx),
            adaptation_index: Some(representation.adaptation_index),
            representation_id: Some(representation.id.clone()),
            ..Default::default()
        })
    }

    /// Resolve `destination` against the base url of the representation.
    ///
    /// Returns `None` when the result is still relative, which means the manifest does not
    /// provide enough information to locate the segment.
    fn resolve_url(
        &self,
        destination: Option<&str>,
        representation: &Representation,
    ) -> Option<ResolvedUrl> {
        let base_url = self.base_url_resolver.resolve(&representation.path);

        let resolved = match (base_url, destination) {
            (None, destination) => destination.map(|url| ResolvedUrl {
                url: url.to_string(),
                service_location: None,
            }),
            (Some(base_url), Some(destination))
                if destination == base_url.url || is_absolute_url(destination) =>
            {
                Some(ResolvedUrl {
                    url: destination.to_string(),
                    service_location: None,
                })
            }
            (Some(base_url), Some(destination)) => {
                match merge_baseurls(&base_url.url, destination) {
                    Ok(url) => Some(ResolvedUrl {
                        url,
                        service_location: base_url.service_location,
                    }),
                    Err(error) => {
                        tracing::warn!(base_url = %base_url.url, destination, %error, "Failed to resolve segment url");
                        None
                    }
                }
            }
            (Some(base_url), None) => Some(ResolvedUrl {
                url: base_url.url,
                service_location: base_url.service_location,
            }),
        };

        match resolved {
            Some(resolved) if !is_relative_url(&resolved.url) => Some(resolved),
            resolved => {
                tracing::warn!(
                    representation_id = %representation.id,
                    url = ?resolved.map(|r| r.url),
                    "Request url is still relative after resolution, skipping"
                );
                None
            }
        }
    }
}
