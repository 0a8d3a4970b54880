use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::scale::ColorScale;
use crate::states::{KeyMode, STATES};

/// A caller-supplied value: a number, or a string the caller expects to be
/// number-coercible. Kept untagged so JSON like `{"value": "3"}` and
/// `{"value": 3}` both deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DatumValue {
    Number(f64),
    Text(String),
}

impl DatumValue {
    /// Coerce to a finite f64, `None` for malformed input.
    pub fn as_f64(&self) -> Option<f64> {
        let parsed = match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok(),
        };
        parsed.filter(|v| v.is_finite())
    }
}

impl From<f64> for DatumValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for DatumValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// One input record. Either identifier field may be present; [`KeyMode`]
/// decides which one is matched against the reference table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDatum {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub value: DatumValue,
}

impl StateDatum {
    pub fn by_code(code: &str, value: impl Into<DatumValue>) -> Self {
        Self {
            code: Some(code.to_string()),
            name: None,
            value: value.into(),
        }
    }

    pub fn by_name(name: &str, value: impl Into<DatumValue>) -> Self {
        Self {
            code: None,
            name: Some(name.to_string()),
            value: value.into(),
        }
    }

    pub fn full(code: &str, name: &str, value: impl Into<DatumValue>) -> Self {
        Self {
            code: Some(code.to_string()),
            name: Some(name.to_string()),
            value: value.into(),
        }
    }

    /// The identifier this record is matched by under `mode`.
    pub fn key(&self, mode: KeyMode) -> Option<&str> {
        match mode {
            KeyMode::Code => self.code.as_deref(),
            KeyMode::Name => self.name.as_deref(),
        }
    }
}

/// What a FIPS id resolves to: the display key under the active mode (if
/// the id is in the reference table) and the matched value (if the dataset
/// supplied one).
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedState {
    pub state_name: Option<String>,
    pub value: Option<f64>,
}

/// Normalized form of the caller's records, rebuilt from scratch on every
/// redraw. Holds the display-key→value map, the FIPS→display-key map
/// derived from the reference table, and the value domain.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    values: HashMap<String, f64>,
    display_keys: HashMap<u32, &'static str>,
    invalid: Vec<String>,
    domain: Option<(f64, f64)>,
}

impl Dataset {
    pub fn from_records(records: &[StateDatum], mode: KeyMode) -> Self {
        let mut values: HashMap<String, f64> = HashMap::new();
        let mut invalid = Vec::new();

        for record in records {
            let Some(key) = record.key(mode) else {
                continue;
            };
            match record.value.as_f64() {
                // Last write wins on duplicate identifiers.
                Some(v) => {
                    values.insert(key.to_string(), v);
                }
                None => invalid.push(key.to_string()),
            }
        }

        let mut domain: Option<(f64, f64)> = None;
        for &v in values.values() {
            domain = Some(match domain {
                Some((min, max)) => (min.min(v), max.max(v)),
                None => (v, v),
            });
        }

        let display_keys = STATES.iter().map(|s| (s.id, s.key(mode))).collect();

        Self {
            values,
            display_keys,
            invalid,
            domain,
        }
    }

    /// `[min, max]` over the parsed values; `None` for an empty dataset.
    pub fn domain(&self) -> Option<(f64, f64)> {
        self.domain
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Identifiers whose values failed numeric coercion. They render as
    /// no-data but are reported here instead of vanishing silently.
    pub fn invalid_keys(&self) -> &[String] {
        &self.invalid
    }

    pub fn value_for_key(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// Total over every FIPS id: ids outside the reference table resolve
    /// with no name and no value, matched ids carry the display key and
    /// the dataset value when one was supplied.
    pub fn resolve(&self, fips_id: u32) -> ResolvedState {
        let state_name = self.display_keys.get(&fips_id).copied();
        let value = state_name.and_then(|key| self.values.get(key).copied());
        ResolvedState {
            state_name: state_name.map(str::to_string),
            value,
        }
    }

    /// The single choke point for region coloring: a matched value goes
    /// through the scale, everything else gets the fallback.
    pub fn fill_color(&self, scale: &ColorScale, fallback: Rgb, fips_id: u32) -> Rgb {
        match self.resolve(fips_id).value {
            Some(v) => scale.color_at(v),
            None => fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::states::find_by_id;

    const FALLBACK: Rgb = Rgb(0xc9, 0xc9, 0xc9);

    fn sample() -> Vec<StateDatum> {
        vec![
            StateDatum::full("FL", "Florida", 3.0),
            StateDatum::full("CA", "California", 1.0),
        ]
    }

    #[test]
    fn domain_is_min_max_of_values() {
        let ds = Dataset::from_records(&sample(), KeyMode::Code);
        assert_eq!(ds.domain(), Some((1.0, 3.0)));
    }

    #[test]
    fn resolve_is_total_over_reference_table() {
        let ds = Dataset::from_records(&sample(), KeyMode::Code);
        for state in STATES {
            let resolved = ds.resolve(state.id);
            assert_eq!(resolved.state_name.as_deref(), Some(state.code));
        }
    }

    #[test]
    fn unknown_fips_resolves_without_name_or_value() {
        let ds = Dataset::from_records(&sample(), KeyMode::Code);
        let resolved = ds.resolve(999);
        assert_eq!(resolved.state_name, None);
        assert_eq!(resolved.value, None);
    }

    #[test]
    fn matched_regions_use_the_scale() {
        let ds = Dataset::from_records(&sample(), KeyMode::Code);
        let (min, max) = ds.domain().unwrap();
        let scale =
            ColorScale::linear((min, max), vec![Rgb(0, 0, 0), Rgb(255, 255, 255)]).unwrap();

        // FL (id 12) carries the max, CA (id 6) the min.
        assert_eq!(ds.fill_color(&scale, FALLBACK, 12), Rgb(255, 255, 255));
        assert_eq!(ds.fill_color(&scale, FALLBACK, 6), Rgb(0, 0, 0));
    }

    #[test]
    fn unmatched_regions_use_the_fallback() {
        let ds = Dataset::from_records(&sample(), KeyMode::Code);
        let scale =
            ColorScale::linear((1.0, 3.0), vec![Rgb(0, 0, 0), Rgb(255, 255, 255)]).unwrap();
        for state in STATES {
            if state.code == "FL" || state.code == "CA" {
                continue;
            }
            assert_eq!(ds.fill_color(&scale, FALLBACK, state.id), FALLBACK);
        }
    }

    #[test]
    fn zero_is_a_value_not_missing_data() {
        let records = vec![StateDatum::by_code("OR", 0.0), StateDatum::by_code("TX", 43.0)];
        let ds = Dataset::from_records(&records, KeyMode::Code);
        let scale =
            ColorScale::linear((0.0, 43.0), vec![Rgb(10, 10, 10), Rgb(250, 250, 250)]).unwrap();
        // Oregon has value 0: low end of the scale, not the fallback.
        assert_eq!(ds.fill_color(&scale, FALLBACK, 41), Rgb(10, 10, 10));
    }

    #[test]
    fn string_values_coerce_to_numbers() {
        let records = vec![StateDatum::by_name("Tennessee", "9")];
        let ds = Dataset::from_records(&records, KeyMode::Name);
        assert_eq!(ds.value_for_key("Tennessee"), Some(9.0));
    }

    #[test]
    fn malformed_values_are_reported_and_render_as_no_data() {
        let records = vec![
            StateDatum::by_code("WA", "n/a"),
            StateDatum::by_code("TX", 43.0),
        ];
        let ds = Dataset::from_records(&records, KeyMode::Code);
        assert_eq!(ds.invalid_keys(), ["WA".to_string()]);
        let scale =
            ColorScale::linear((0.0, 43.0), vec![Rgb(0, 0, 0), Rgb(255, 255, 255)]).unwrap();
        let wa_id = 53;
        assert_eq!(ds.fill_color(&scale, FALLBACK, wa_id), FALLBACK);
        // The malformed record does not poison the domain.
        assert_eq!(ds.domain(), Some((43.0, 43.0)));
    }

    #[test]
    fn duplicate_keys_last_write_wins() {
        let records = vec![
            StateDatum::by_code("FL", 3.0),
            StateDatum::by_code("FL", 7.0),
        ];
        let ds = Dataset::from_records(&records, KeyMode::Code);
        assert_eq!(ds.value_for_key("FL"), Some(7.0));
        assert_eq!(ds.domain(), Some((7.0, 7.0)));
    }

    #[test]
    fn key_mode_switch_matches_the_same_regions() {
        let records = vec![
            StateDatum::full("FL", "Florida", 3.0),
            StateDatum::full("TX", "Texas", 43.0),
        ];
        let by_code = Dataset::from_records(&records, KeyMode::Code);
        let by_name = Dataset::from_records(&records, KeyMode::Name);
        for state in STATES {
            assert_eq!(
                by_code.resolve(state.id).value,
                by_name.resolve(state.id).value,
                "mismatch for {}",
                state.code
            );
        }
    }

    #[test]
    fn records_deserialize_with_numeric_or_string_values() {
        let json = r#"[
            {"name": "Florida", "value": "2"},
            {"code": "TX", "value": 43},
            {"code": "WA", "value": "oops"}
        ]"#;
        let records: Vec<StateDatum> = serde_json::from_str(json).unwrap();
        assert_eq!(records[0].value.as_f64(), Some(2.0));
        assert_eq!(records[1].value.as_f64(), Some(43.0));
        assert_eq!(records[2].value.as_f64(), None);
    }

    #[test]
    fn reference_table_lookup_matches_resolution() {
        let ds = Dataset::from_records(&sample(), KeyMode::Name);
        let fl = find_by_id(12).unwrap();
        assert_eq!(ds.resolve(fl.id).state_name.as_deref(), Some("Florida"));
    }
}
