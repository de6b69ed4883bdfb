//! Resilient provider-reply parsing. Providers are asked for a fixed JSON
//! shape but are not contractually bound to emit it, so parsing runs in
//! three tiers: strict JSON, balanced-brace extraction from surrounding
//! prose, then per-field regex recovery. Degradation is observable, never
//! silent.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use ai_client::util::strip_code_blocks;
use ai_client::RawReply;
use clipnote_common::{AttrValue, SummaryFragment};

/// Fields the parser knows how to recover individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedField {
    Title,
    Synopsis,
    KeyPoints,
    SecondaryIdentity,
    Duration,
}

impl ExpectedField {
    pub fn name(self) -> &'static str {
        match self {
            ExpectedField::Title => "title",
            ExpectedField::Synopsis => "summary",
            ExpectedField::KeyPoints => "key_points",
            ExpectedField::SecondaryIdentity => "secondary_identity",
            ExpectedField::Duration => "duration",
        }
    }
}

/// Why an analysis leg produced no usable fragment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisFailure {
    #[error("no recognizable fields in provider reply")]
    Unparseable,

    #[error("provider call exceeded its deadline")]
    Timeout,

    #[error("provider error: {0}")]
    Provider(String),
}

/// Result of parsing one provider reply.
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    /// Strict parse succeeded. `extracted_from_prose` marks replies where
    /// the JSON had to be dug out of surrounding text or a code fence.
    Parsed {
        fragment: SummaryFragment,
        extracted_from_prose: bool,
    },
    /// Field-by-field fallback recovered some but not necessarily all
    /// fields; the ones listed fell back to empty defaults.
    Degraded {
        fragment: SummaryFragment,
        missing_fields: Vec<ExpectedField>,
    },
    Failed(AnalysisFailure),
}

impl ParseOutcome {
    pub fn into_result(self) -> Result<SummaryFragment, AnalysisFailure> {
        match self {
            ParseOutcome::Parsed { fragment, .. } | ParseOutcome::Degraded { fragment, .. } => {
                Ok(fragment)
            }
            ParseOutcome::Failed(failure) => Err(failure),
        }
    }

    pub fn fragment(&self) -> Option<&SummaryFragment> {
        match self {
            ParseOutcome::Parsed { fragment, .. } | ParseOutcome::Degraded { fragment, .. } => {
                Some(fragment)
            }
            ParseOutcome::Failed(_) => None,
        }
    }
}

/// Wire shape providers are prompted to return. Every field is optional;
/// unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
struct WireFragment {
    title: Option<String>,
    summary: Option<String>,
    #[serde(default)]
    key_points: Vec<String>,
    author: Option<String>,
    channel: Option<String>,
    duration: Option<String>,
    thread_date: Option<String>,
    publication: Option<String>,
    #[serde(default)]
    suggestions: Vec<String>,
}

impl WireFragment {
    fn into_fragment(self) -> SummaryFragment {
        let mut fragment = SummaryFragment {
            title: self.title,
            // Channel (video) and author (thread/article) both map onto the
            // secondary identity slot; channel wins when both appear.
            secondary_identity: self.channel.or(self.author),
            synopsis: self.summary,
            key_points: self.key_points,
            duration: self.duration,
            ..Default::default()
        };

        if let Some(date) = self.thread_date {
            fragment
                .extra_attributes
                .insert("thread_date".to_string(), AttrValue::Text(date));
        }
        if let Some(publication) = self.publication {
            fragment
                .extra_attributes
                .insert("publication".to_string(), AttrValue::Text(publication));
        }
        if !self.suggestions.is_empty() {
            fragment
                .extra_attributes
                .insert("suggestions".to_string(), AttrValue::List(self.suggestions));
        }

        fragment
    }
}

/// Parse a raw provider reply into a Summary fragment.
pub fn parse(reply: &RawReply, expected: &[ExpectedField]) -> ParseOutcome {
    let stripped = strip_code_blocks(&reply.text);

    // Tier 1: the whole reply is the JSON object (possibly fenced).
    if let Some(fragment) = parse_strict(stripped) {
        let extracted_from_prose = stripped.len() != reply.text.len();
        return ParseOutcome::Parsed {
            fragment,
            extracted_from_prose,
        };
    }

    // Tier 2: JSON object embedded in prose.
    if let Some(region) = balanced_json_region(stripped) {
        if let Some(fragment) = parse_strict(region) {
            debug!(provider = %reply.provider, "Parsed reply via embedded JSON region");
            return ParseOutcome::Parsed {
                fragment,
                extracted_from_prose: true,
            };
        }
    }

    // Tier 3: per-field regex recovery.
    let mut fragment = SummaryFragment::default();
    let mut missing = Vec::new();
    let mut recovered = 0usize;

    for &field in expected {
        if extract_field(stripped, field, &mut fragment) {
            recovered += 1;
        } else {
            missing.push(field);
        }
    }

    if recovered == 0 {
        return ParseOutcome::Failed(AnalysisFailure::Unparseable);
    }

    debug!(
        provider = %reply.provider,
        recovered,
        missing = missing.len(),
        "Recovered reply via field-level fallback"
    );
    ParseOutcome::Degraded {
        fragment,
        missing_fields: missing,
    }
}

fn parse_strict(text: &str) -> Option<SummaryFragment> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    if !value.is_object() {
        return None;
    }
    let wire: WireFragment = serde_json::from_value(value).ok()?;
    Some(wire.into_fragment())
}

/// First balanced `{...}` region, honoring JSON string and escape rules so
/// braces inside quoted values don't end the region early.
fn balanced_json_region(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }

    None
}

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""title"\s*:\s*"([^"]*)""#).expect("valid regex"));
static SYNOPSIS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""summary"\s*:\s*"([^"]*)""#).expect("valid regex"));
static IDENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""(?:channel|author)"\s*:\s*"([^"]*)""#).expect("valid regex"));
static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""duration"\s*:\s*"([^"]*)""#).expect("valid regex"));
static KEY_POINTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""key_points"\s*:\s*\[([^\]]*)\]"#).expect("valid regex"));
static ARRAY_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]*)""#).expect("valid regex"));

/// Try one field's tolerant pattern against the raw text. Returns whether
/// anything non-empty was recovered; misses leave the fragment's default.
fn extract_field(text: &str, field: ExpectedField, fragment: &mut SummaryFragment) -> bool {
    fn first_capture(re: &Regex, text: &str) -> Option<String> {
        re.captures(text)
            .map(|caps| caps[1].to_string())
            .filter(|s| !s.trim().is_empty())
    }

    match field {
        ExpectedField::Title => {
            if let Some(value) = first_capture(&TITLE_RE, text) {
                fragment.title = Some(value);
                return true;
            }
        }
        ExpectedField::Synopsis => {
            if let Some(value) = first_capture(&SYNOPSIS_RE, text) {
                fragment.synopsis = Some(value);
                return true;
            }
        }
        ExpectedField::SecondaryIdentity => {
            if let Some(value) = first_capture(&IDENTITY_RE, text) {
                fragment.secondary_identity = Some(value);
                return true;
            }
        }
        ExpectedField::Duration => {
            if let Some(value) = first_capture(&DURATION_RE, text) {
                fragment.duration = Some(value);
                return true;
            }
        }
        ExpectedField::KeyPoints => {
            if let Some(caps) = KEY_POINTS_RE.captures(text) {
                let items: Vec<String> = ARRAY_ITEM_RE
                    .captures_iter(&caps[1])
                    .map(|c| c[1].to_string())
                    .filter(|s| !s.trim().is_empty())
                    .collect();
                if !items.is_empty() {
                    fragment.key_points = items;
                    return true;
                }
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use ai_client::ProviderId;

    use super::*;

    const ALL_FIELDS: &[ExpectedField] = &[
        ExpectedField::Title,
        ExpectedField::Synopsis,
        ExpectedField::KeyPoints,
        ExpectedField::SecondaryIdentity,
    ];

    fn reply(text: &str) -> RawReply {
        RawReply::new(ProviderId::OpenRouter, text)
    }

    const WELL_FORMED: &str = r#"{
        "title": "Test Article Title",
        "summary": "A test summary of the piece.",
        "key_points": ["first", "second", "third"],
        "author": "Test Author"
    }"#;

    #[test]
    fn strict_json_parses() {
        let outcome = parse(&reply(WELL_FORMED), ALL_FIELDS);
        let ParseOutcome::Parsed {
            fragment,
            extracted_from_prose,
        } = outcome
        else {
            panic!("expected Parsed, got {outcome:?}");
        };
        assert!(!extracted_from_prose);
        assert_eq!(fragment.title.as_deref(), Some("Test Article Title"));
        assert_eq!(fragment.key_points.len(), 3);
        assert_eq!(fragment.secondary_identity.as_deref(), Some("Test Author"));
    }

    #[test]
    fn fenced_json_parses() {
        let fenced = format!("```json\n{WELL_FORMED}\n```");
        let outcome = parse(&reply(&fenced), ALL_FIELDS);
        let ParseOutcome::Parsed {
            fragment,
            extracted_from_prose,
        } = outcome
        else {
            panic!("expected Parsed, got {outcome:?}");
        };
        assert!(extracted_from_prose);
        assert_eq!(fragment.title.as_deref(), Some("Test Article Title"));
    }

    #[test]
    fn prose_wrapped_json_matches_unwrapped() {
        let wrapped = format!("Sure! Here is the analysis you asked for:\n\n{WELL_FORMED}\n\nLet me know if you need more.");
        let wrapped_outcome = parse(&reply(&wrapped), ALL_FIELDS);
        let plain_outcome = parse(&reply(WELL_FORMED), ALL_FIELDS);

        let ParseOutcome::Parsed {
            fragment: wrapped_fragment,
            extracted_from_prose: true,
        } = wrapped_outcome
        else {
            panic!("expected prose-extracted Parsed");
        };
        let ParseOutcome::Parsed {
            fragment: plain_fragment,
            ..
        } = plain_outcome
        else {
            panic!("expected Parsed");
        };
        assert_eq!(wrapped_fragment, plain_fragment);
    }

    #[test]
    fn braces_inside_strings_do_not_truncate_region() {
        let text = r#"Note: {"title": "Curly {braces} inside", "summary": "ok"} done"#;
        let outcome = parse(&reply(text), ALL_FIELDS);
        let fragment = outcome.fragment().expect("should parse").clone();
        assert_eq!(fragment.title.as_deref(), Some("Curly {braces} inside"));
    }

    #[test]
    fn malformed_json_recovers_fields_via_regex() {
        // Broken overall (trailing garbage key), but fields are extractable.
        let text = r#"{"title": "Extractable Title", "summary": "can still be extracted", key_points: broken"#;
        let outcome = parse(&reply(text), ALL_FIELDS);
        let ParseOutcome::Degraded {
            fragment,
            missing_fields,
        } = outcome
        else {
            panic!("expected Degraded, got {outcome:?}");
        };
        assert_eq!(fragment.title.as_deref(), Some("Extractable Title"));
        assert_eq!(fragment.synopsis.as_deref(), Some("can still be extracted"));
        assert!(missing_fields.contains(&ExpectedField::KeyPoints));
        assert!(missing_fields.contains(&ExpectedField::SecondaryIdentity));
    }

    #[test]
    fn key_points_recovered_from_broken_reply() {
        let text = r#"partial: "key_points": ["a", "b"] and "title": "T" trailing"#;
        let outcome = parse(&reply(text), &[ExpectedField::Title, ExpectedField::KeyPoints]);
        let ParseOutcome::Degraded {
            fragment,
            missing_fields,
        } = outcome
        else {
            panic!("expected Degraded, got {outcome:?}");
        };
        assert!(missing_fields.is_empty());
        assert_eq!(fragment.key_points, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(fragment.title.as_deref(), Some("T"));
    }

    #[test]
    fn unstructured_garbage_fails() {
        let outcome = parse(&reply("This has no JSON at all, just plain text."), ALL_FIELDS);
        assert!(matches!(
            outcome,
            ParseOutcome::Failed(AnalysisFailure::Unparseable)
        ));
    }

    #[test]
    fn empty_reply_fails() {
        let outcome = parse(&reply(""), ALL_FIELDS);
        assert!(matches!(
            outcome,
            ParseOutcome::Failed(AnalysisFailure::Unparseable)
        ));
    }

    #[test]
    fn channel_maps_to_secondary_identity() {
        let text = r#"{"title": "Video", "summary": "s", "channel": "Some Channel"}"#;
        let fragment = parse(&reply(text), ALL_FIELDS)
            .fragment()
            .expect("should parse")
            .clone();
        assert_eq!(fragment.secondary_identity.as_deref(), Some("Some Channel"));
    }

    #[test]
    fn suggestions_land_in_extra_attributes() {
        let text = r#"{"summary": "s", "key_points": ["k"], "suggestions": ["explore x", "read y"]}"#;
        let fragment = parse(&reply(text), &[ExpectedField::Synopsis, ExpectedField::KeyPoints])
            .fragment()
            .expect("should parse")
            .clone();
        assert_eq!(
            fragment.extra_attributes.get("suggestions"),
            Some(&AttrValue::List(vec![
                "explore x".to_string(),
                "read y".to_string()
            ]))
        );
    }
}
