//! Timestamp linkification: rewrites `[MM:SS]` and `[H:MM:SS]` markers in
//! summary text into markdown links that seek into the source video.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d{1,2}):(\d{2})(?::(\d{2}))?\]").expect("valid regex"));

/// Rewrite timestamp markers in `text` into links against `base_url`.
/// Without a base URL the text passes through untouched. Markers that are
/// not valid clock values (e.g. `[99:99]`) are left as-is.
pub fn linkify(text: &str, base_url: Option<&str>) -> String {
    let Some(base) = base_url else {
        return text.to_string();
    };

    let sep = if base.contains('?') { '&' } else { '?' };
    MARKER_RE
        .replace_all(text, |caps: &Captures<'_>| {
            match offset_seconds(caps) {
                Some(secs) => {
                    let inner = &caps[0][1..caps[0].len() - 1];
                    format!("[{inner}]({base}{sep}t={secs})")
                }
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Apply linkification to every text field of a summary in place.
pub fn linkify_summary(summary: &mut clipnote_common::Summary, base_url: &str) {
    let base = Some(base_url);
    summary.synopsis = linkify(&summary.synopsis, base);
    for point in &mut summary.key_points {
        *point = linkify(point, base);
    }
}

/// Seconds offset for a captured marker, or None when components overflow
/// their clock positions. Two components read as MM:SS, three as H:MM:SS.
fn offset_seconds(caps: &Captures<'_>) -> Option<u32> {
    let a: u32 = caps[1].parse().ok()?;
    let b: u32 = caps[2].parse().ok()?;
    match caps.get(3) {
        None => {
            if a < 60 && b < 60 {
                Some(a * 60 + b)
            } else {
                None
            }
        }
        Some(c) => {
            let c: u32 = c.as_str().parse().ok()?;
            if b < 60 && c < 60 {
                Some(a * 3600 + b * 60 + c)
            } else {
                None
            }
        }
    }
}
