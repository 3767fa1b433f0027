// References:
// 1. https://github.com/clitic/vsd/blob/30ca1985e4a467ea3304b11c08d3176deaafd22a/vsd/src/dash/template.rs
// 2. https://github.com/emarsden/dash-mpd-rs/blob/6ebdfb4759adbda8233b5b3520804e23ff86e7de/src/fetch.rs#L435-L466

use regex::{Regex, Replacer};
use std::{collections::HashMap, sync::LazyLock};

// Example template: "$RepresentationID$/$Number%06d$.m4s"
//
// The format specifier is captured loosely so that an unsupported one can be left untouched
// instead of being treated as a plain token.
static TEMPLATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(RepresentationID|Number|Time|Bandwidth)(?:%0(\d+)([A-Za-z]))?\$").unwrap()
});

/// Identifiers of a `SegmentTemplate` url, substituted one at a time.
///
/// Substitution always runs in the order `$Number$`, `$Time$`, `$Bandwidth$`,
/// `$RepresentationID$` and finishes by unescaping `$$`. A value substituted by one pass is
/// never seen as a token by a later one.
#[derive(Debug, Default, Clone)]
pub struct Template {
    args: HashMap<&'static str, String>,
}

impl Template {
    pub const REPRESENTATION_ID: &'static str = "RepresentationID";
    pub const NUMBER: &'static str = "Number";
    pub const TIME: &'static str = "Time";
    pub const BANDWIDTH: &'static str = "Bandwidth";

    const ORDER: [&'static str; 4] = [
        Self::NUMBER,
        Self::TIME,
        Self::BANDWIDTH,
        Self::REPRESENTATION_ID,
    ];

    pub fn new() -> Self {
        Self {
            args: HashMap::with_capacity(4),
        }
    }

    pub fn insert(&mut self, key: &'static str, value: String) -> &mut Self {
        self.args.insert(key, value);
        self
    }

    pub fn insert_optional(&mut self, key: &'static str, value: Option<String>) -> &mut Self {
        if let Some(value) = value {
            self.args.insert(key, value);
        }
        self
    }

    /// Substitute every known identifier, then unescape `$$`.
    pub fn resolve(&self, template: &str) -> String {
        let mut url = template.to_string();
        for key in Self::ORDER {
            url = self.replace(&url, key);
        }
        unescape_dollars(&url)
    }

    /// Substitute a single identifier, leaving every other one in place.
    pub fn replace(&self, template: &str, key: &str) -> String {
        let Some(value) = self.args.get(key) else {
            return template.to_string();
        };

        TEMPLATE_REGEX
            .replace_all(template, TemplateReplacer { key, value })
            .to_string()
    }
}

pub fn unescape_dollars(url: &str) -> String {
    url.replace("$$", "$")
}

struct TemplateReplacer<'a> {
    key: &'a str,
    value: &'a str,
}

impl Replacer for TemplateReplacer<'_> {
    fn replace_append(&mut self, caps: &regex::Captures<'_>, dst: &mut String) {
        let matched = caps.get(0).map_or("", |m| m.as_str());
        let key = caps.get(1).map_or("", |m| m.as_str());
        if key != self.key {
            dst.push_str(matched);
            return;
        }

        let (Some(width), Some(specifier)) = (caps.get(2), caps.get(3)) else {
            dst.push_str(self.value);
            return;
        };

        // The identifier is only substituted as-is by players
        if key == Template::REPRESENTATION_ID {
            dst.push_str(matched);
            return;
        }

        let Ok(width) = width.as_str().parse::<usize>() else {
            dst.push_str(matched);
            return;
        };
        let radix = match specifier.as_str() {
            "d" | "i" | "u" => None,
            "x" | "X" | "o" => match self.value.parse::<u64>() {
                Ok(value) => Some(value),
                Err(_) => {
                    dst.push_str(matched);
                    return;
                }
            },
            _ => {
                dst.push_str(matched);
                return;
            }
        };

        let value = match (specifier.as_str(), radix) {
            ("x", Some(value)) => format!("{value:x}"),
            ("X", Some(value)) => format!("{value:X}"),
            ("o", Some(value)) => format!("{value:o}"),
            _ => self.value.to_string(),
        };
        dst.push_str(&format!("{value:0>width$}"));
    }
}
