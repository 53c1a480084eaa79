//! Resolved completion-time bundles.
//!
//! A [`StatBundle`] is the normalized form of one reference-source match:
//! four independent duration fields plus provenance. Bundles are written
//! into the cache once and never mutated; a re-resolution after a full
//! library reload replaces the whole bundle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::duration::{parse_hours, HourValue, PLACEHOLDER};

/// The raw best-match record a lookup capability returns.
///
/// Duration fields are display strings exactly as the source publishes
/// them (`"7½ Hours"`, `"--"`); normalization happens when the bundle is
/// built, not at the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Main story.
    pub main: String,

    /// Main story plus optional content.
    pub main_plus: String,

    /// Full completionist run.
    pub completionist: String,

    /// Average across all play styles.
    pub all_styles: String,

    /// The source's own identifier for this record, when it has one.
    #[serde(default)]
    pub record_id: Option<String>,
}

/// The per-item resolved estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatBundle {
    /// Main story hours.
    pub main: HourValue,

    /// Main + extras hours.
    pub main_plus: HourValue,

    /// Completionist hours.
    pub completionist: HourValue,

    /// All-styles average hours.
    pub all_styles: HourValue,

    /// Reference-source record id, for building an outbound link.
    pub record_id: Option<String>,

    /// Whether the bundle carries anything worth showing: true iff at
    /// least one raw field was present and not the placeholder.
    pub has_data: bool,

    /// When this bundle was resolved.
    pub resolved_at: DateTime<Utc>,
}

impl StatBundle {
    /// Build a bundle from a raw match record, normalizing every field.
    pub fn from_record(record: &MatchRecord) -> Self {
        let has_data = [
            &record.main,
            &record.main_plus,
            &record.completionist,
            &record.all_styles,
        ]
        .iter()
        .any(|raw| {
            let raw = raw.trim();
            !raw.is_empty() && raw != PLACEHOLDER
        });

        Self {
            main: parse_hours(&record.main),
            main_plus: parse_hours(&record.main_plus),
            completionist: parse_hours(&record.completionist),
            all_styles: parse_hours(&record.all_styles),
            record_id: record.record_id.clone(),
            has_data,
            resolved_at: Utc::now(),
        }
    }

    /// The terminal bundle for "no match" and for lookup failures.
    ///
    /// Downstream cannot tell the two apart, and that is deliberate: a
    /// game with no published estimate and a lookup that errored both
    /// display as an item with no stat badge.
    pub fn no_match() -> Self {
        Self {
            main: HourValue::Unknown,
            main_plus: HourValue::Unknown,
            completionist: HourValue::Unknown,
            all_styles: HourValue::Unknown,
            record_id: None,
            has_data: false,
            resolved_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(main: &str, main_plus: &str, completionist: &str, all_styles: &str) -> MatchRecord {
        MatchRecord {
            main: main.to_string(),
            main_plus: main_plus.to_string(),
            completionist: completionist.to_string(),
            all_styles: all_styles.to_string(),
            record_id: Some("10110".to_string()),
        }
    }

    #[test]
    fn test_full_record() {
        let bundle = StatBundle::from_record(&record(
            "8½ Hours",
            "13 Hours",
            "22 Hours",
            "11 Hours",
        ));

        assert_eq!(bundle.main, HourValue::Known(8.5));
        assert_eq!(bundle.main_plus, HourValue::Known(13.0));
        assert_eq!(bundle.completionist, HourValue::Known(22.0));
        assert_eq!(bundle.all_styles, HourValue::Known(11.0));
        assert!(bundle.has_data);
        assert_eq!(bundle.record_id.as_deref(), Some("10110"));
    }

    #[test]
    fn test_all_placeholders_has_no_data() {
        let bundle = StatBundle::from_record(&record("--", "--", "--", "--"));
        assert!(!bundle.has_data);
        assert_eq!(bundle.main, HourValue::Unknown);
    }

    #[test]
    fn test_one_field_is_enough_for_has_data() {
        let bundle = StatBundle::from_record(&record("--", "--", "40 Hours", "--"));
        assert!(bundle.has_data);
        assert_eq!(bundle.completionist, HourValue::Known(40.0));
        assert_eq!(bundle.main, HourValue::Unknown);
    }

    #[test]
    fn test_unparseable_field_still_counts_as_present() {
        // A malformed but present field makes the bundle displayable even
        // though its own value degrades to unknown.
        let bundle = StatBundle::from_record(&record("Varies", "--", "--", "--"));
        assert!(bundle.has_data);
        assert_eq!(bundle.main, HourValue::Unknown);
    }

    #[test]
    fn test_no_match_bundle() {
        let bundle = StatBundle::no_match();
        assert!(!bundle.has_data);
        assert_eq!(bundle.record_id, None);
        assert_eq!(bundle.main, HourValue::Unknown);
    }
}
