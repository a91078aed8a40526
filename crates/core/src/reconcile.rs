#![forbid(unsafe_code)]

//! Tool/equipment markers: step text tags required items as `[item]`.
//! Markers are a tagging convention only and never survive into stored text.

use std::collections::BTreeSet;

const OPEN: char = '[';
const CLOSE: char = ']';

/// Returns the trimmed, non-empty contents of every `[...]` marker in `text`, in order.
pub fn tool_mentions(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    for_each_marker(text, |segment| {
        if let Segment::Marker(inner) = segment {
            let inner = inner.trim();
            if !inner.is_empty() {
                out.push(inner.to_string());
            }
        }
    });
    out
}

/// Removes marker brackets while keeping their contents.
pub fn strip_markers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for_each_marker(text, |segment| match segment {
        Segment::Plain(plain) => out.push_str(plain),
        Segment::Marker(inner) => out.push_str(inner),
    });
    out
}

/// Existing prerequisites first (marker-free, deduplicated, original order), followed by
/// every tool mentioned in `steps` that is not already present, in first-seen order.
/// Matching is exact and case-sensitive.
pub fn reconcile<S: AsRef<str>>(steps: &[S], existing: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::with_capacity(existing.len());

    for item in existing {
        let item = strip_markers(item).trim().to_string();
        if !item.is_empty() && seen.insert(item.clone()) {
            out.push(item);
        }
    }

    for step in steps {
        for tool in tool_mentions(step.as_ref()) {
            if seen.insert(tool.clone()) {
                out.push(tool);
            }
        }
    }

    out
}

enum Segment<'a> {
    Plain(&'a str),
    Marker(&'a str),
}

// A marker is `[` followed by the nearest `]` with no other `[` in between.
// Anything else, including unbalanced brackets, is plain text.
fn for_each_marker<'a>(text: &'a str, mut visit: impl FnMut(Segment<'a>)) {
    let mut rest = text;
    while let Some(open) = rest.find(OPEN) {
        let after = &rest[open + OPEN.len_utf8()..];
        let Some(close) = after.find(CLOSE) else {
            break;
        };
        let inner = &after[..close];
        if let Some(nested) = inner.rfind(OPEN) {
            let plain_end = open + OPEN.len_utf8() + nested;
            visit(Segment::Plain(&rest[..plain_end]));
            rest = &rest[plain_end..];
            continue;
        }
        if open > 0 {
            visit(Segment::Plain(&rest[..open]));
        }
        visit(Segment::Marker(inner));
        rest = &after[close + CLOSE.len_utf8()..];
    }
    if !rest.is_empty() {
        visit(Segment::Plain(rest));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn appends_tools_after_existing_in_first_seen_order() {
        let steps = ["[hammer] nail the bracket", "tighten with [screwdriver]"];
        assert_eq!(
            reconcile(&steps, &list(&["wrench"])),
            list(&["wrench", "hammer", "screwdriver"])
        );
    }

    #[test]
    fn repeated_mentions_do_not_duplicate() {
        let steps = [
            "use [torque driver] on the rails",
            "[torque driver] again, then [label maker]",
            "[label maker]",
        ];
        let out = reconcile(&steps, &list(&["torque driver"]));
        assert_eq!(out, list(&["torque driver", "label maker"]));
    }

    #[test]
    fn existing_entries_lose_markers_and_duplicates() {
        let out = reconcile::<&str>(&[], &list(&["[ladder]", "ladder", "Ladder", " "]));
        assert_eq!(out, list(&["ladder", "Ladder"]));
    }

    #[test]
    fn reconciling_twice_changes_nothing() {
        let steps = ["grab [cable tester]", "[console cable] into port 0", "[cable tester]"];
        let once = reconcile(&steps, &list(&["laptop", "[console cable]"]));
        let twice = reconcile(&steps, &once);
        assert_eq!(once, twice);
    }

    #[test]
    fn strip_keeps_marker_contents_and_plain_brackets() {
        assert_eq!(strip_markers("tighten with [screwdriver]"), "tighten with screwdriver");
        assert_eq!(strip_markers("array[ index"), "array[ index");
        assert_eq!(strip_markers("[a [b] c]"), "[a b c]");
        assert_eq!(strip_markers("[]"), "");
    }

    #[test]
    fn mentions_skip_empty_and_unbalanced_markers() {
        assert_eq!(tool_mentions("[] [ ] [ multimeter ] [open"), list(&["multimeter"]));
        assert_eq!(tool_mentions("[a [b] c]"), list(&["b"]));
    }
}
