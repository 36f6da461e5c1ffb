//! Topic naming and glob matching for change events.
//!
//! Topics have the form `<prefix><EntityType>_<SUFFIX>`. Patterns may contain
//! `*`, which matches any (possibly empty) run of characters.

use super::types::ChangeAction;

/// Returns the topic a change of `action` on `entity_type` is published on.
pub fn change_topic(prefix: &str, entity_type: &str, action: ChangeAction) -> String {
    format!("{}{}_{}", prefix, entity_type, action.topic_suffix())
}

/// Returns the pattern matching every change topic under `prefix`.
pub fn all_changes_pattern(prefix: &str) -> String {
    format!("{}*", prefix)
}

/// Checks whether `topic` matches the glob `pattern`.
///
/// A pattern without `*` only matches the identical topic.
///
/// # Examples
///
/// ```
/// use refcache_core::events::topic_matches;
///
/// assert!(topic_matches("platform_*", "platform_Rule_EDIT_TOPIC"));
/// assert!(topic_matches("platform_*_DELETE_TOPIC", "platform_Status_DELETE_TOPIC"));
/// assert!(!topic_matches("platform_*", "other_Rule_EDIT_TOPIC"));
/// ```
pub fn topic_matches(pattern: &str, topic: &str) -> bool {
    let mut segments = pattern.split('*');
    let head = segments.next().unwrap_or("");
    let Some(rest) = topic.strip_prefix(head) else {
        return false;
    };

    let tail: Vec<&str> = segments.collect();
    let Some((last, middle)) = tail.split_last() else {
        // No wildcard at all
        return rest.is_empty();
    };

    let Some(mut remaining) = rest.strip_suffix(last) else {
        return false;
    };

    for segment in middle.iter().filter(|s| !s.is_empty()) {
        match remaining.find(segment) {
            Some(pos) => remaining = &remaining[pos + segment.len()..],
            None => return false,
        }
    }

    true
}
