use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical placeholder title. Production code and comparisons both use
/// this constant; no other "unknown title" string exists in the system.
pub const FALLBACK_TITLE: &str = "Untitled";

/// Canonical placeholder synopsis.
pub const FALLBACK_SYNOPSIS: &str = "No summary available.";

/// Key under `Summary::extra_attributes` recording that one side of a dual
/// analysis failed. Consumed by callers for observability, not rendered.
pub const ATTR_PARTIAL_FAILURE: &str = "partial_failure";

/// Key under `Summary::extra_attributes` carrying the video URL a summary
/// was (partly) derived from. Drives timestamp linking and embeds.
pub const ATTR_VIDEO_URL: &str = "video_url";

/// Closed set of content classifications driving provider routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentType {
    ThreadPost,
    Video,
    Article,
    #[serde(rename = "topic")]
    FreeformTopic,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::ThreadPost => "thread-post",
            ContentType::Video => "video",
            ContentType::Article => "article",
            ContentType::FreeformTopic => "topic",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A secondary resource URL discovered inside a primary resource's body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedRef {
    pub url: String,
    pub content_type: ContentType,
}

/// Output of the classifier. Created once per request, read-only downstream.
#[derive(Debug, Clone)]
pub struct ClassifiedRequest {
    pub original_url: String,
    pub normalized_url: String,
    pub content_type: ContentType,
    /// Stable resource identifier where one exists (e.g. a video id).
    pub extracted_id: Option<String>,
    /// Embedded secondary references, deduplicated, in encounter order.
    pub embedded_refs: Vec<EmbeddedRef>,
}

impl ClassifiedRequest {
    /// First embedded reference of the given type, if any.
    pub fn embedded_ref(&self, content_type: ContentType) -> Option<&EmbeddedRef> {
        self.embedded_refs
            .iter()
            .find(|r| r.content_type == content_type)
    }
}

/// Extracted page content returned by the fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub text: String,
    /// Whether the text was cut down to the per-kind length cap.
    pub truncated: bool,
}

/// Attribute values are either a single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Text(String),
    List(Vec<String>),
}

impl AttrValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            AttrValue::List(_) => None,
        }
    }
}

/// The canonical analysis output handed to the external renderer/store.
///
/// Invariants: `title` and `synopsis` are never empty (placeholders fill in
/// when a provider supplied nothing); `key_points` may be empty, never null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_identity: Option<String>,
    pub synopsis: String,
    pub key_points: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_attributes: BTreeMap<String, AttrValue>,
}

impl Summary {
    pub fn has_placeholder_title(&self) -> bool {
        self.title == FALLBACK_TITLE
    }
}

/// A partially populated Summary, as recovered from one provider reply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryFragment {
    pub title: Option<String>,
    pub secondary_identity: Option<String>,
    pub synopsis: Option<String>,
    pub key_points: Vec<String>,
    pub duration: Option<String>,
    pub extra_attributes: BTreeMap<String, AttrValue>,
}

impl SummaryFragment {
    /// Usable (non-empty, non-placeholder) title, if the fragment has one.
    pub fn usable_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty() && *t != FALLBACK_TITLE)
    }

    /// Usable (non-empty, non-placeholder) synopsis, if the fragment has one.
    pub fn usable_synopsis(&self) -> Option<&str> {
        self.synopsis
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != FALLBACK_SYNOPSIS)
    }

    /// Promote to a complete Summary, filling canonical placeholders for
    /// anything the provider never supplied. Whitespace-only values count
    /// as absent.
    pub fn finish(self) -> Summary {
        Summary {
            title: non_blank(self.title).unwrap_or_else(|| FALLBACK_TITLE.to_string()),
            secondary_identity: non_blank(self.secondary_identity),
            synopsis: non_blank(self.synopsis).unwrap_or_else(|| FALLBACK_SYNOPSIS.to_string()),
            key_points: self.key_points,
            duration: non_blank(self.duration),
            extra_attributes: self.extra_attributes,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
