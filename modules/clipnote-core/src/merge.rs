//! Merging two analysis legs into one Summary. A dual analysis degrades
//! gracefully: as long as one side produced a fragment, a Summary comes
//! out, annotated with what went wrong on the other side.

use tracing::warn;

use clipnote_common::{
    AttrValue, MergeError, Summary, SummaryFragment, ATTR_PARTIAL_FAILURE, FALLBACK_SYNOPSIS,
    FALLBACK_TITLE,
};

use crate::parse::ParseOutcome;
use crate::route::MergePriority;

/// Combine the two legs of a dual analysis.
///
/// Both usable: field-level merge with `priority` deciding conflicts.
/// One usable: the survivor is promoted, with a `partial_failure` attribute
/// recording the other side's failure. Neither: `BothProvidersFailed`.
pub fn merge(
    primary: ParseOutcome,
    secondary: ParseOutcome,
    priority: MergePriority,
) -> Result<Summary, MergeError> {
    match (primary.into_result(), secondary.into_result()) {
        (Ok(p), Ok(s)) => Ok(merge_fragments(p, s, priority)),
        (Ok(p), Err(failure)) => {
            warn!(%failure, "Secondary provider failed; using primary fragment alone");
            Ok(survivor(p, format!("secondary provider failed: {failure}")))
        }
        (Err(failure), Ok(s)) => {
            warn!(%failure, "Primary provider failed; using secondary fragment alone");
            Ok(survivor(s, format!("primary provider failed: {failure}")))
        }
        (Err(p), Err(s)) => Err(MergeError::BothProvidersFailed {
            primary: p.to_string(),
            secondary: s.to_string(),
        }),
    }
}

fn survivor(fragment: SummaryFragment, note: String) -> Summary {
    let mut summary = fragment.finish();
    summary
        .extra_attributes
        .insert(ATTR_PARTIAL_FAILURE.to_string(), AttrValue::Text(note));
    summary
}

fn merge_fragments(
    primary: SummaryFragment,
    secondary: SummaryFragment,
    priority: MergePriority,
) -> Summary {
    let (winner, loser) = match priority {
        MergePriority::Primary => (&primary, &secondary),
        MergePriority::Secondary => (&secondary, &primary),
    };

    let title = winner
        .usable_title()
        .or_else(|| loser.usable_title())
        .unwrap_or(FALLBACK_TITLE)
        .to_string();
    let synopsis = winner
        .usable_synopsis()
        .or_else(|| loser.usable_synopsis())
        .unwrap_or(FALLBACK_SYNOPSIS)
        .to_string();

    // Key points concatenate rather than compete: primary's first, always.
    let mut key_points = primary.key_points.clone();
    key_points.extend(secondary.key_points.iter().cloned());

    let secondary_identity = winner
        .secondary_identity
        .clone()
        .or_else(|| loser.secondary_identity.clone());
    let duration = winner.duration.clone().or_else(|| loser.duration.clone());

    // Union of attributes, winner's value on key collisions.
    let mut extra_attributes = loser.extra_attributes.clone();
    extra_attributes.extend(winner.extra_attributes.clone());

    Summary {
        title,
        secondary_identity,
        synopsis,
        key_points,
        duration,
        extra_attributes,
    }
}
