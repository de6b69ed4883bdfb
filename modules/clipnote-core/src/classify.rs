//! URL classification: content type detection, host normalization, resource
//! id extraction, and embedded-reference discovery. Pure functions, no I/O.
//!
//! Classification is total: any input produces exactly one result. Valid
//! http(s) URLs that match no specific rule fall back to `Article` (the
//! most general handling path); input that is not a URL at all becomes a
//! `FreeformTopic`.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use clipnote_common::{ClassifiedRequest, ContentType, EmbeddedRef};

// Rules are checked in order; they are mutually exclusive on their
// distinguishing path/host segments, so first match wins.
static THREAD_STATUS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.|mobile\.)?(?:twitter\.com|x\.com)/(\w+)/status/(\d+)")
        .expect("valid regex")
});

static THREAD_PROFILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.|mobile\.)?(?:twitter\.com|x\.com)/(\w+)/?$")
        .expect("valid regex")
});

static YOUTUBE_WATCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.|m\.)?youtube\.com/watch\?(?:[^#\s]*&)?v=([A-Za-z0-9_-]{6,})")
        .expect("valid regex")
});

static YOUTUBE_SHORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.)?youtu\.be/([A-Za-z0-9_-]{6,})").expect("valid regex")
});

static YOUTUBE_SHORTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.|m\.)?youtube\.com/shorts/([A-Za-z0-9_-]{6,})")
        .expect("valid regex")
});

static URL_IN_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"{}|\\^`\[\]]+"#).expect("valid regex"));

/// Classify a URL or freeform text. Total function: never fails.
pub fn classify(input: &str) -> ClassifiedRequest {
    let trimmed = input.trim();

    if let Some(caps) = THREAD_STATUS_RE.captures(trimmed) {
        let user = &caps[1];
        let status = &caps[2];
        return ClassifiedRequest {
            original_url: trimmed.to_string(),
            // twitter.com and mobile forms collapse to the canonical host.
            normalized_url: format!("https://x.com/{user}/status/{status}"),
            content_type: ContentType::ThreadPost,
            extracted_id: Some(status.to_string()),
            embedded_refs: Vec::new(),
        };
    }

    if let Some(caps) = THREAD_PROFILE_RE.captures(trimmed) {
        let user = &caps[1];
        return ClassifiedRequest {
            original_url: trimmed.to_string(),
            normalized_url: format!("https://x.com/{user}"),
            content_type: ContentType::ThreadPost,
            extracted_id: None,
            embedded_refs: Vec::new(),
        };
    }

    if let Some(id) = video_id(trimmed) {
        return ClassifiedRequest {
            original_url: trimmed.to_string(),
            // Short-link and mobile forms collapse to one watch URL so all
            // downstream logic sees a single shape.
            normalized_url: format!("https://www.youtube.com/watch?v={id}"),
            content_type: ContentType::Video,
            extracted_id: Some(id),
            embedded_refs: Vec::new(),
        };
    }

    if is_http_url(trimmed) {
        return ClassifiedRequest {
            original_url: trimmed.to_string(),
            normalized_url: trimmed.to_string(),
            content_type: ContentType::Article,
            extracted_id: None,
            embedded_refs: Vec::new(),
        };
    }

    // Not a URL: treat the text itself as a research topic.
    ClassifiedRequest {
        original_url: trimmed.to_string(),
        normalized_url: trimmed.to_string(),
        content_type: ContentType::FreeformTopic,
        extracted_id: None,
        embedded_refs: Vec::new(),
    }
}

/// Extract a video id from any recognized video URL form.
pub fn video_id(url: &str) -> Option<String> {
    for re in [&*YOUTUBE_WATCH_RE, &*YOUTUBE_SHORT_RE, &*YOUTUBE_SHORTS_RE] {
        if let Some(caps) = re.captures(url) {
            return Some(caps[1].to_string());
        }
    }
    None
}

/// First URL found in freeform text, if any.
pub fn extract_url_from_text(text: &str) -> Option<&str> {
    URL_IN_TEXT_RE.find(text).map(|m| m.as_str())
}

/// Scan resource text for embedded secondary-resource URLs of a different
/// content type than `primary`. Deduplicated, encounter order preserved.
pub fn find_embedded_refs(text: &str, primary: ContentType) -> Vec<EmbeddedRef> {
    let mut seen = HashSet::new();
    let mut refs = Vec::new();

    for m in URL_IN_TEXT_RE.find_iter(text) {
        let candidate = m.as_str().trim_end_matches(['.', ',', ')', ';']);
        let classified = classify(candidate);
        if classified.content_type == primary
            || classified.content_type == ContentType::FreeformTopic
        {
            continue;
        }
        if seen.insert(classified.normalized_url.clone()) {
            refs.push(EmbeddedRef {
                url: classified.normalized_url,
                content_type: classified.content_type,
            });
        }
    }

    refs
}

fn is_http_url(input: &str) -> bool {
    match Url::parse(input) {
        Ok(url) => (url.scheme() == "http" || url.scheme() == "https") && url.has_host(),
        Err(_) => false,
    }
}
