//! Mock telemetry records and the rules that turn their fields into panel rows
//!
//! Records are free-form ordered `label: value` pairs. How a field is drawn
//! is decided purely from its label and value:
//! - labels containing "Health", "Reserve" or "Capacity" become a percentage bar
//! - labels containing "Status" get a colored status dot
//! - everything else is plain text

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Label of the field used as the panel title
pub const TITLE_FIELD: &str = "Name";

/// Percentages at or above this are "good"
pub const GOOD_THRESHOLD: i32 = 75;

/// Percentages below this are "danger"
pub const DANGER_THRESHOLD: i32 = 30;

/// Severity tier shared by percentage bars and status dots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Good,
    Warning,
    Danger,
}

impl Tier {
    /// Tier for a percentage value
    pub fn for_percentage(percent: i32) -> Self {
        if percent < DANGER_THRESHOLD {
            Tier::Danger
        } else if percent < GOOD_THRESHOLD {
            Tier::Warning
        } else {
            Tier::Good
        }
    }

    /// Tier for a free-text status value (case-insensitive keyword match)
    pub fn for_status(value: &str) -> Self {
        let value = value.to_lowercase();
        if value.contains("error") || value.contains("offline") {
            Tier::Danger
        } else if value.contains("idle") || value.contains("awaiting") || value.contains("scheduled") {
            Tier::Warning
        } else {
            Tier::Good
        }
    }

    /// RGB color used by the overlays
    pub fn rgb(self) -> [u8; 3] {
        match self {
            Tier::Good => [46, 204, 113],
            Tier::Warning => [241, 196, 15],
            Tier::Danger => [231, 76, 60],
        }
    }
}

/// One `label: value` pair of a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryField {
    pub label: String,
    pub value: String,
}

impl TelemetryField {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Display record for a focusable object (or a logical entity several objects alias to)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    #[serde(default)]
    pub fields: Vec<TelemetryField>,
}

impl TelemetryRecord {
    /// Build a record from `(label, value)` pairs, keeping their order
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            fields: pairs
                .into_iter()
                .map(|(label, value)| TelemetryField::new(label, value))
                .collect(),
        }
    }

    /// Look up a field value by exact label
    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.value.as_str())
    }

    /// Panel title: the `Name` field, or the key with underscores as spaces
    pub fn title(&self, key: &str) -> String {
        self.get(TITLE_FIELD)
            .map(str::to_string)
            .unwrap_or_else(|| key.replace('_', " "))
    }

    /// Rows to draw, in record order, without the title field
    pub fn rows(&self) -> Vec<FieldView> {
        self.fields
            .iter()
            .filter(|f| f.label != TITLE_FIELD)
            .map(FieldView::classify)
            .collect()
    }
}

/// A field after the rendering rules have been applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldView {
    Percentage { label: String, percent: i32, tier: Tier },
    Status { label: String, value: String, tier: Tier },
    Text { label: String, value: String },
}

impl FieldView {
    pub fn classify(field: &TelemetryField) -> Self {
        let label = &field.label;
        if label.contains("Health") || label.contains("Reserve") || label.contains("Capacity") {
            if let Some(percent) = parse_leading_int(&field.value) {
                return FieldView::Percentage {
                    label: label.clone(),
                    percent,
                    tier: Tier::for_percentage(percent),
                };
            }
            tracing::debug!(label = %label, value = %field.value, "Non-numeric percentage field, drawing as text");
        } else if label.contains("Status") {
            return FieldView::Status {
                label: label.clone(),
                value: field.value.clone(),
                tier: Tier::for_status(&field.value),
            };
        }
        FieldView::Text {
            label: label.clone(),
            value: field.value.clone(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            FieldView::Percentage { label, .. }
            | FieldView::Status { label, .. }
            | FieldView::Text { label, .. } => label,
        }
    }
}

/// Parse the leading integer of a value like `"85% Full"` or `"-28%"`
pub fn parse_leading_int(value: &str) -> Option<i32> {
    let trimmed = value.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    digits[..end].parse::<i32>().ok().map(|n| n * sign)
}

/// Banner shown while the camera follows a trackable object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingNote {
    /// Optimized traffic renders green, congested renders red
    pub optimized: bool,
    /// Headline shown in bold before the message
    pub headline: String,
    pub text: String,
}

impl TrackingNote {
    pub fn new(optimized: bool, headline: &str, text: &str) -> Self {
        Self {
            optimized,
            headline: headline.to_string(),
            text: text.to_string(),
        }
    }
}

/// Figures for the crane analytics overlay, re-rolled every time it opens
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsSnapshot {
    pub current_container: String,
    pub next_container: String,
    pub unloading_reduction_pct: f32,
}

impl AnalyticsSnapshot {
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            current_container: format!("C-{}", rng.random_range(40..45)),
            next_container: format!("C-{}", rng.random_range(80..85)),
            unloading_reduction_pct: 28.0 + rng.random::<f32>() * 5.0,
        }
    }
}

/// Figures for the vehicle dwell-time overlay, re-rolled every time it opens
#[derive(Debug, Clone, PartialEq)]
pub struct DwellSnapshot {
    pub average_dwell_minutes: u32,
    pub queue_length: u32,
    /// Dwell samples for the trend graph, oldest first
    pub history: Vec<f32>,
}

impl DwellSnapshot {
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            average_dwell_minutes: rng.random_range(18..32),
            queue_length: rng.random_range(2..9),
            history: sample_trend(rng, 18.0, 14.0, TREND_SAMPLES),
        }
    }
}

/// Points in a trend graph
pub const TREND_SAMPLES: usize = 12;

/// `len` values in `base..base + spread`
pub fn sample_trend<R: Rng + ?Sized>(rng: &mut R, base: f32, spread: f32, len: usize) -> Vec<f32> {
    (0..len).map(|_| base + rng.random::<f32>() * spread).collect()
}

/// Scene-wide figures for the energy grid overlay
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyReadout {
    pub solar_output_mw: f32,
    pub storage_pct: i32,
    pub grid_draw_mw: f32,
    pub shore_power_berths: u32,
}

impl EnergyReadout {
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            solar_output_mw: 38.0 + rng.random::<f32>() * 8.0,
            storage_pct: rng.random_range(55..95),
            grid_draw_mw: 4.0 + rng.random::<f32>() * 3.0,
            shore_power_berths: rng.random_range(3..7),
        }
    }

    pub fn storage_tier(&self) -> Tier {
        Tier::for_percentage(self.storage_pct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_percentage_tiers() {
        let row = |value: &str| FieldView::classify(&TelemetryField::new("Equipment Health", value));

        assert_eq!(
            row("92%"),
            FieldView::Percentage { label: "Equipment Health".into(), percent: 92, tier: Tier::Good }
        );
        assert_eq!(
            row("60%"),
            FieldView::Percentage { label: "Equipment Health".into(), percent: 60, tier: Tier::Warning }
        );
        assert_eq!(
            row("20%"),
            FieldView::Percentage { label: "Equipment Health".into(), percent: 20, tier: Tier::Danger }
        );
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(Tier::for_percentage(75), Tier::Good);
        assert_eq!(Tier::for_percentage(74), Tier::Warning);
        assert_eq!(Tier::for_percentage(30), Tier::Warning);
        assert_eq!(Tier::for_percentage(29), Tier::Danger);
    }

    #[test]
    fn test_capacity_with_suffix() {
        let view = FieldView::classify(&TelemetryField::new("Cargo Capacity", "85% Full"));
        assert!(matches!(view, FieldView::Percentage { percent: 85, tier: Tier::Good, .. }));

        let view = FieldView::classify(&TelemetryField::new("Fuel Reserve", "unknown"));
        assert!(matches!(view, FieldView::Text { .. }));
    }

    #[test]
    fn test_status_dots() {
        assert_eq!(Tier::for_status("Idle"), Tier::Warning);
        assert_eq!(Tier::for_status("Awaiting Pickup"), Tier::Warning);
        assert_eq!(Tier::for_status("Minor Hydraulics Check Scheduled"), Tier::Warning);
        assert_eq!(Tier::for_status("Sensor ERROR"), Tier::Danger);
        assert_eq!(Tier::for_status("Offline - idle"), Tier::Danger);
        assert_eq!(Tier::for_status("Active - Scanning"), Tier::Good);

        let view = FieldView::classify(&TelemetryField::new("Maintenance Status", "No Issues Reported"));
        assert!(matches!(view, FieldView::Status { tier: Tier::Good, .. }));
    }

    #[test]
    fn test_rows_skip_title() {
        let record = TelemetryRecord::from_pairs([
            ("Name", "Crane Alpha-3"),
            ("Status", "Idle"),
            ("Temperature", "45°C"),
        ]);
        assert_eq!(record.title("Object_4_002"), "Crane Alpha-3");

        let rows = record.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].label(), "Status");
        assert_eq!(
            rows[1],
            FieldView::Text { label: "Temperature".into(), value: "45°C".into() }
        );
    }

    #[test]
    fn test_title_fallback() {
        let record = TelemetryRecord::from_pairs([("Status", "Active")]);
        assert_eq!(record.title("Robotic_Arm_System"), "Robotic Arm System");
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("98%"), Some(98));
        assert_eq!(parse_leading_int("+35%"), Some(35));
        assert_eq!(parse_leading_int("-28%"), Some(-28));
        assert_eq!(parse_leading_int("  7 Tons"), Some(7));
        assert_eq!(parse_leading_int("n/a"), None);
        assert_eq!(parse_leading_int(""), None);
    }

    #[test]
    fn test_analytics_snapshot_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let snap = AnalyticsSnapshot::sample(&mut rng);
            let current: u32 = snap.current_container[2..].parse().unwrap();
            let next: u32 = snap.next_container[2..].parse().unwrap();
            assert!((40..45).contains(&current));
            assert!((80..85).contains(&next));
            assert!(snap.unloading_reduction_pct >= 28.0 && snap.unloading_reduction_pct <= 33.0);
        }
    }

    #[test]
    fn test_dwell_history_length() {
        let mut rng = StdRng::seed_from_u64(3);
        let snap = DwellSnapshot::sample(&mut rng);
        assert_eq!(snap.history.len(), TREND_SAMPLES);
        assert!(snap.history.iter().all(|v| (18.0..=32.0).contains(v)));
        assert!((2..9).contains(&snap.queue_length));
    }
}
