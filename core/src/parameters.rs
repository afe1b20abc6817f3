//! Typed key/value parameter store (C3).
//!
//! Public API policy
//! -----------------
//! Keys are matched case-insensitively but stored and echoed back in their
//! original case. A value's unit is fixed the first time it is set; a later
//! `set` with an incompatible unit is rejected with
//! [`BandsError::UnitMismatch`] rather than silently reinterpreting the
//! stored number. `set_internal` bypasses unit bookkeeping entirely for
//! callers that already have an SI value in hand.

use std::collections::HashMap;

use crate::error::BandsError;
use crate::units::Unit;

/// One stored entry: the value in internal (SI) units, plus enough of the
/// original text to round-trip it back out the way it came in.
#[derive(Debug, Clone)]
struct Entry {
    /// Canonical (mixed-case, as first inserted) form of the key.
    original_key: String,
    internal_value: f64,
    unit: Unit,
    /// Original numeric text, preserved verbatim for round-tripping a
    /// bulk-loaded parameter file back out unless the caller used
    /// `set_internal`, which has no external text to preserve.
    original_text: Option<String>,
    is_boolean: Option<bool>,
    string_value: Option<String>,
}

/// Case-insensitive, insertion-order-preserving key/value store for bands
/// engine configuration (turn rates, buffer sizes, alerting thresholds, ...).
#[derive(Debug, Clone, Default)]
pub struct ParameterData {
    entries: HashMap<String, Entry>,
    order: Vec<String>,
}

fn fold(key: &str) -> String {
    key.trim().to_ascii_lowercase()
}

impl ParameterData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&fold(key))
    }

    /// Numeric value in internal (SI) units, or `0.0` if unset / non-numeric.
    pub fn get_value(&self, key: &str) -> f64 {
        self.entries
            .get(&fold(key))
            .map(|e| e.internal_value)
            .unwrap_or(0.0)
    }

    /// Numeric value converted to `unit`.
    pub fn get_value_in(&self, key: &str, unit: Unit) -> f64 {
        unit.from_internal(self.get_value(key))
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.entries
            .get(&fold(key))
            .and_then(|e| e.is_boolean)
            .unwrap_or(false)
    }

    pub fn get_string(&self, key: &str) -> String {
        self.entries
            .get(&fold(key))
            .and_then(|e| e.string_value.clone())
            .unwrap_or_default()
    }

    pub fn unit(&self, key: &str) -> Unit {
        self.entries.get(&fold(key)).map(|e| e.unit).unwrap_or(Unit::Internal)
    }

    /// Set a numeric value expressed in `unit`. Rejects the write with
    /// [`BandsError::UnitMismatch`] if `key` already holds a value in an
    /// incompatible unit kind (e.g. writing a speed over a distance).
    pub fn set(&mut self, key: &str, value: f64, unit: Unit) -> Result<(), BandsError> {
        let folded = fold(key);
        if let Some(existing) = self.entries.get(&folded) {
            if !existing.unit.kind().compatible(unit.kind()) {
                return Err(BandsError::UnitMismatch {
                    key: existing.original_key.clone(),
                    existing: existing.unit.name().to_string(),
                    new: unit.name().to_string(),
                });
            }
        }
        self.insert_order(&folded, key);
        let entry = self.entries.entry(folded).or_insert_with(|| Entry {
            original_key: key.to_string(),
            internal_value: 0.0,
            unit,
            original_text: None,
            is_boolean: None,
            string_value: None,
        });
        entry.internal_value = unit.to_internal(value);
        entry.unit = unit;
        entry.original_text = Some(format!("{value} [{}]", unit.name()));
        entry.is_boolean = None;
        entry.string_value = None;
        Ok(())
    }

    /// Set a value already expressed in internal (SI) units, bypassing the
    /// unit-compatibility check entirely.
    pub fn set_internal(&mut self, key: &str, value: f64) {
        let folded = fold(key);
        self.insert_order(&folded, key);
        let entry = self.entries.entry(folded).or_insert_with(|| Entry {
            original_key: key.to_string(),
            internal_value: 0.0,
            unit: Unit::Internal,
            original_text: None,
            is_boolean: None,
            string_value: None,
        });
        entry.internal_value = value;
        entry.original_text = None;
        entry.is_boolean = None;
        entry.string_value = None;
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        let folded = fold(key);
        self.insert_order(&folded, key);
        let entry = self.entries.entry(folded).or_insert_with(|| Entry {
            original_key: key.to_string(),
            internal_value: 0.0,
            unit: Unit::Internal,
            original_text: None,
            is_boolean: None,
            string_value: None,
        });
        entry.is_boolean = Some(value);
        entry.string_value = None;
    }

    pub fn set_string(&mut self, key: &str, value: impl Into<String>) {
        let folded = fold(key);
        self.insert_order(&folded, key);
        let entry = self.entries.entry(folded).or_insert_with(|| Entry {
            original_key: key.to_string(),
            internal_value: 0.0,
            unit: Unit::Internal,
            original_text: None,
            is_boolean: None,
            string_value: None,
        });
        entry.string_value = Some(value.into());
    }

    fn insert_order(&mut self, folded: &str, original_key: &str) {
        if !self.entries.contains_key(folded) {
            self.order.push(original_key.to_string());
        }
    }

    /// Keys in first-inserted order, in their original case.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|k| k.as_str())
    }

    /// Render back to `key = value [unit]` lines, in insertion order,
    /// preserving the original numeric text for any entry set via [`set`].
    pub fn to_parameter_list(&self) -> Vec<String> {
        self.order
            .iter()
            .filter_map(|k| {
                let e = self.entries.get(&fold(k))?;
                if let Some(b) = e.is_boolean {
                    Some(format!("{k} = {b}"))
                } else if let Some(s) = &e.string_value {
                    Some(format!("{k} = {s}"))
                } else if let Some(text) = &e.original_text {
                    Some(format!("{k} = {text}"))
                } else {
                    Some(format!("{k} = {}", e.internal_value))
                }
            })
            .collect()
    }

    /// Parse a block of `key = value[unit]` lines. A line is only accepted
    /// once trimmed of surrounding whitespace and at least 5 characters long
    /// (the minimum that can hold `a=b;` worth of signal); shorter lines and
    /// lines without an `=` are silently skipped, matching a permissive bulk
    /// loader that tolerates blank lines and comments mixed into a file.
    pub fn parse_parameter_list(&mut self, text: &str) -> Result<(), BandsError> {
        for raw_line in text.lines() {
            let line = raw_line.trim();
            if line.len() < 5 || line.starts_with('#') {
                continue;
            }
            let Some((key, rhs)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let rhs = rhs.trim();
            if key.is_empty() || rhs.is_empty() {
                continue;
            }
            self.set_parsed_entry(key, rhs)?;
        }
        Ok(())
    }

    fn set_parsed_entry(&mut self, key: &str, rhs: &str) -> Result<(), BandsError> {
        if let Ok(b) = rhs.parse::<bool>() {
            self.set_bool(key, b);
            return Ok(());
        }
        if let Some((num_text, unit_text)) = split_unit_suffix(rhs) {
            if let Ok(v) = num_text.trim().parse::<f64>() {
                let unit = Unit::parse(unit_text);
                self.set(key, v, unit)?;
                return Ok(());
            }
        }
        self.set_string(key, rhs);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Split `"154.3 [kn]"` or `"154.3 kn"` into `("154.3", "kn")`; a bare
/// number with no bracket/suffix splits to `(text, "")` (i.e. `Unit::Internal`).
fn split_unit_suffix(rhs: &str) -> Option<(&str, &str)> {
    if let Some(open) = rhs.find('[') {
        let close = rhs.rfind(']')?;
        if close > open {
            return Some((&rhs[..open], &rhs[open + 1..close]));
        }
    }
    let mut parts = rhs.splitn(2, char::is_whitespace);
    let num = parts.next()?;
    let rest = parts.next().unwrap_or("").trim();
    Some((num, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_case_insensitive_but_echoed_verbatim() {
        let mut p = ParameterData::new();
        p.set("Min_GS", 10.0, Unit::MetersPerSecond).unwrap();
        assert!(p.contains_key("min_gs"));
        assert_eq!(p.keys().collect::<Vec<_>>(), vec!["Min_GS"]);
    }

    #[test]
    fn incompatible_unit_overwrite_is_rejected() {
        let mut p = ParameterData::new();
        p.set("lookahead_time", 60.0, Unit::Second).unwrap();
        let err = p.set("lookahead_time", 100.0, Unit::Meter).unwrap_err();
        assert!(matches!(err, BandsError::UnitMismatch { .. }));
    }

    #[test]
    fn compatible_unit_overwrite_converts_value() {
        let mut p = ParameterData::new();
        p.set("min_gs", 100.0, Unit::Knot).unwrap();
        p.set("min_gs", 60.0, Unit::MetersPerSecond).unwrap();
        assert!((p.get_value("min_gs") - 60.0).abs() < 1e-9);
    }

    #[test]
    fn set_internal_bypasses_unit_check() {
        let mut p = ParameterData::new();
        p.set("x", 5.0, Unit::Meter).unwrap();
        p.set_internal("x", 42.0);
        assert_eq!(p.get_value("x"), 42.0);
    }

    #[test]
    fn bulk_parse_rejects_short_lines_and_comments() {
        let mut p = ParameterData::new();
        p.parse_parameter_list("a=b\n# min_gs = 10 [kn]\nmin_gs = 10 [kn]\n\n")
            .unwrap();
        assert!(!p.contains_key("a"));
        assert!(p.contains_key("min_gs"));
        assert!((p.get_value_in("min_gs", Unit::Knot) - 10.0).abs() < 1e-6);
    }

    #[test]
    fn to_parameter_list_round_trips_through_reparse() {
        let mut p = ParameterData::new();
        p.set("min_gs", 50.0, Unit::Knot).unwrap();
        p.set_bool("recovery_stability_time", true);
        let lines = p.to_parameter_list();
        let mut q = ParameterData::new();
        q.parse_parameter_list(&lines.join("\n")).unwrap();
        assert!((q.get_value_in("min_gs", Unit::Knot) - 50.0).abs() < 1e-6);
        assert!(q.get_bool("recovery_stability_time"));
    }
}
