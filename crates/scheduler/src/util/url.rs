use url::Url;

use crate::SchedulerResult;

/// A url is absolute when it starts with a scheme as described in RFC 3986 section 3.1.
pub(crate) fn is_absolute_url(s: &str) -> bool {
    let Some((scheme, _)) = s.split_once(':') else {
        return false;
    };

    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

pub(crate) fn is_relative_url(s: &str) -> bool {
    !is_absolute_url(s)
}

pub(crate) fn merge_baseurls(current: &str, new: &str) -> SchedulerResult<String> {
    if is_absolute_url(new) {
        return Ok(new.to_string());
    }

    // The query of the base url is carried over to the new url, unless the new url has its own.
    //
    // merge_baseurls(https://example.com/manifest.mpd?auth=secret, /video42.mp4) =>
    //   https://example.com/video42.mp4?auth=secret
    //
    // merge_baseurls(https://example.com/manifest.mpd?auth=old, /video42.mp4?auth=new) =>
    //   https://example.com/video42.mp4?auth=new
    let current = Url::parse(current)?;
    let mut merged = current.join(new)?;
    if merged.query().is_none() {
        merged.set_query(current.query());
    }
    Ok(merged.to_string())
}
