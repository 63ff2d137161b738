//! Predicates that narrow a list of throw events before summing workload.
//!
//! Every filter keeps the input order and returns a fresh `Vec`, so filters can be
//! chained by passing one result into the next.

use crate::ThrowEvent;

/// Keep events whose tag is one of `tags` (exact, case-sensitive).
///
/// With `blacklist` set, keep events whose tag is *not* one of `tags` instead. Untagged
/// events never match a tag, so they are dropped by the whitelist and kept by the
/// blacklist.
pub fn filter_by_tag<I, S>(events: &[ThrowEvent], tags: I, blacklist: bool) -> Vec<ThrowEvent>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let tags: Vec<S> = tags.into_iter().collect();
    let matches = |event: &ThrowEvent| {
        event
            .tag
            .as_deref()
            .is_some_and(|tag| tags.iter().any(|t| t.as_ref() == tag))
    };
    events
        .iter()
        .filter(|event| matches(*event) != blacklist)
        .cloned()
        .collect()
}

/// Keep simulated events when `get_simulated` is set, otherwise the rest.
/// A missing flag counts as not simulated.
pub fn filter_simulated(events: &[ThrowEvent], get_simulated: bool) -> Vec<ThrowEvent> {
    events
        .iter()
        .filter(|event| event.is_simulated() == get_simulated)
        .cloned()
        .collect()
}

/// Keep high-effort events when `get_high_effort` is set, otherwise the rest.
pub fn filter_high_effort(events: &[ThrowEvent], get_high_effort: bool) -> Vec<ThrowEvent> {
    events
        .iter()
        .filter(|event| event.high_effort == get_high_effort)
        .cloned()
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    pub(crate) fn event(
        id: &str,
        tag: Option<&str>,
        simulated: Option<bool>,
        high_effort: bool,
        workload: f64,
        normalized_workload: f64,
    ) -> ThrowEvent {
        ThrowEvent {
            event_id: id.to_string(),
            timestamp: Utc.with_ymd_and_hms(2022, 6, 1, 15, 0, 0).unwrap(),
            tag: tag.map(str::to_string),
            simulated,
            high_effort,
            workload,
            normalized_workload,
            scaler: None,
            arm_slot: None,
            arm_speed: None,
            shoulder_rotation: None,
            torque: None,
            ball_velocity: None,
            ball_weight_oz: None,
            preferred_ball_weight_unit: None,
        }
    }

    pub(crate) fn sample_events() -> Vec<ThrowEvent> {
        vec![
            event("a", Some("Pre-Game"), Some(false), false, 8.588786125183105, 0.011941837146878242),
            event("b", Some("Plyo"), Some(true), true, 117.60966491699219, 0.163524329662323),
            event("c", None, Some(false), true, 121.55718994140625, 0.16901294887065887),
            event("d", Some("Bullpen"), None, false, 50.0, 0.07),
        ]
    }

    fn ids(events: &[ThrowEvent]) -> Vec<&str> {
        events.iter().map(|e| e.event_id.as_str()).collect()
    }

    #[test]
    fn filter_by_single_tag() {
        let events = sample_events();
        assert_eq!(ids(&filter_by_tag(&events, ["Pre-Game"], false)), ["a"]);
        assert_eq!(ids(&filter_by_tag(&events, ["Pre-Game"], true)), ["b", "c", "d"]);
    }

    #[test]
    fn filter_by_tag_list() {
        let events = sample_events();
        let tags = vec!["Pre-Game".to_string(), "Plyo".to_string()];
        assert_eq!(ids(&filter_by_tag(&events, &tags, false)), ["a", "b"]);
        assert_eq!(ids(&filter_by_tag(&events, &tags, true)), ["c", "d"]);
    }

    #[test]
    fn filter_by_tag_is_case_sensitive() {
        let events = sample_events();
        assert!(filter_by_tag(&events, ["plyo"], false).is_empty());
    }

    #[test]
    fn tag_whitelist_and_blacklist_partition_events() {
        let events = sample_events();
        let tags = ["Plyo", "Bullpen"];
        let kept = filter_by_tag(&events, tags, false);
        let rest = filter_by_tag(&events, tags, true);
        assert_eq!(kept.len() + rest.len(), events.len());
        assert!(kept.iter().all(|e| !rest.contains(e)));
    }

    #[test]
    fn filter_simulated_treats_missing_as_false() {
        let events = sample_events();
        assert_eq!(ids(&filter_simulated(&events, false)), ["a", "c", "d"]);
        assert_eq!(ids(&filter_simulated(&events, true)), ["b"]);
    }

    #[test]
    fn filter_high_effort_splits_in_order() {
        let events = sample_events();
        let high = filter_high_effort(&events, true);
        let low = filter_high_effort(&events, false);
        assert_eq!(ids(&high), ["b", "c"]);
        assert_eq!(ids(&low), ["a", "d"]);
    }

    #[test]
    fn filters_chain_and_accept_empty_input() {
        let events = sample_events();
        let chained = filter_high_effort(&filter_simulated(&events, false), true);
        assert_eq!(ids(&chained), ["c"]);

        let empty: Vec<ThrowEvent> = Vec::new();
        assert!(filter_by_tag(&empty, ["Plyo"], true).is_empty());
        assert!(filter_simulated(&empty, true).is_empty());
        assert!(filter_high_effort(&empty, true).is_empty());
    }
}
