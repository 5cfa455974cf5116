//! Payload: the flat key/value object sent over the serial link.
//!
//! Keys come from a fixed list of pulse-generator parameters. Values are
//! integers or floats, chosen by whether the entered text contains a decimal
//! point. The payload serializes to a single-line JSON object whose keys keep
//! the order in which they were first set.

use std::fmt;
use std::io;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::ser::Formatter;

use crate::errors::ValueError;


// ---------------------------------------------------------------------------
// ParamKey
// ---------------------------------------------------------------------------

/// One of the parameters the pulse generator accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKey {
    PulseWidth1,
    InterPulseDelay,
    PulseWidth2,
    PulseInterval,
}

impl ParamKey {
    /// All keys, in selector order.
    pub const ALL: [ParamKey; 4] = [
        ParamKey::PulseWidth1,
        ParamKey::InterPulseDelay,
        ParamKey::PulseWidth2,
        ParamKey::PulseInterval,
    ];

    /// The JSON key for this parameter.
    pub fn wire_name(&self) -> &'static str {
        match self {
            ParamKey::PulseWidth1 => "pulseWidth1",
            ParamKey::InterPulseDelay => "interPulseDelay",
            ParamKey::PulseWidth2 => "pulseWidth2",
            ParamKey::PulseInterval => "pulseInterval",
        }
    }

    /// Look up a key by its JSON name. Matching is exact.
    pub fn from_wire_name(name: &str) -> Option<ParamKey> {
        ParamKey::ALL.into_iter().find(|k| k.wire_name() == name)
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}


// ---------------------------------------------------------------------------
// ParamValue
// ---------------------------------------------------------------------------

/// A numeric parameter value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
}

impl ParamValue {
    /// Parse user-entered text.
    ///
    /// Text containing a `.` is read as a float, anything else as an
    /// integer. Surrounding whitespace is ignored. Non-finite floats are
    /// rejected since JSON cannot carry them.
    pub fn parse(text: &str) -> Result<ParamValue, ValueError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ValueError::Empty);
        }
        if trimmed.contains('.') {
            let v: f64 = trimmed
                .parse()
                .map_err(|_| ValueError::NotANumber(trimmed.to_string()))?;
            if !v.is_finite() {
                return Err(ValueError::NotFinite(trimmed.to_string()));
            }
            Ok(ParamValue::Float(v))
        } else {
            trimmed
                .parse::<i64>()
                .map(ParamValue::Int)
                .map_err(|_| ValueError::NotANumber(trimmed.to_string()))
        }
    }
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParamValue::Int(v) => serializer.serialize_i64(*v),
            ParamValue::Float(v) => serializer.serialize_f64(*v),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{:?}", v),
        }
    }
}


// ---------------------------------------------------------------------------
// JsonStyle
// ---------------------------------------------------------------------------

/// Separator style for the serialized payload. Both styles are single-line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JsonStyle {
    /// `{"a":1,"b":2.5}`
    #[default]
    Compact,
    /// `{"a": 1, "b": 2.5}`
    Spaced,
}

impl JsonStyle {
    pub fn parse(text: &str) -> Option<JsonStyle> {
        match text {
            "compact" => Some(JsonStyle::Compact),
            "spaced" => Some(JsonStyle::Spaced),
            _ => None,
        }
    }
}

/// Writes `", "` between members and `": "` after keys.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }
}


// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Ordered parameter map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    entries: Vec<(ParamKey, ParamValue)>,
}

impl Payload {
    pub fn new() -> Self {
        Payload {
            entries: Vec::new(),
        }
    }

    /// Set `key` to `value`. An existing key keeps its position.
    pub fn set(&mut self, key: ParamKey, value: ParamValue) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: ParamKey) -> Option<ParamValue> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    /// Remove `key`, returning its old value.
    pub fn remove(&mut self, key: ParamKey) -> Option<ParamValue> {
        let pos = self.entries.iter().position(|(k, _)| *k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize to a JSON object with all `\n` and `\r` removed.
    pub fn to_json(&self, style: JsonStyle) -> String {
        let mut buf = Vec::new();
        let written = match style {
            JsonStyle::Compact => self.serialize(&mut serde_json::Serializer::new(&mut buf)),
            JsonStyle::Spaced => self.serialize(&mut serde_json::Serializer::with_formatter(
                &mut buf,
                SpacedFormatter,
            )),
        };
        // Keys are static strings and values are numbers, so writing into a
        // Vec only fails on an internal serde_json bug.
        if let Err(e) = written {
            tracing::error!("payload serialization failed: {}", e);
            return "{}".to_string();
        }
        String::from_utf8_lossy(&buf)
            .chars()
            .filter(|c| *c != '\n' && *c != '\r')
            .collect()
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key.wire_name(), value)?;
        }
        map.end()
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // --- ParamKey ---

    #[test]
    fn wire_names_in_selector_order() {
        let names: Vec<&str> = ParamKey::ALL.iter().map(|k| k.wire_name()).collect();
        assert_eq!(
            names,
            vec!["pulseWidth1", "interPulseDelay", "pulseWidth2", "pulseInterval"]
        );
    }

    #[test]
    fn from_wire_name_is_exact() {
        assert_eq!(
            ParamKey::from_wire_name("pulseInterval"),
            Some(ParamKey::PulseInterval)
        );
        assert_eq!(ParamKey::from_wire_name("pulseinterval"), None);
        assert_eq!(ParamKey::from_wire_name(""), None);
    }

    // --- ParamValue ---

    #[test]
    fn parse_integer() {
        assert_eq!(ParamValue::parse("12"), Ok(ParamValue::Int(12)));
        assert_eq!(ParamValue::parse("-7"), Ok(ParamValue::Int(-7)));
    }

    #[test]
    fn parse_float_when_decimal_point_present() {
        assert_eq!(ParamValue::parse("12.5"), Ok(ParamValue::Float(12.5)));
        assert_eq!(ParamValue::parse("12."), Ok(ParamValue::Float(12.0)));
        assert_eq!(ParamValue::parse(".5"), Ok(ParamValue::Float(0.5)));
    }

    #[test]
    fn parse_trims_whitespace() {
        assert_eq!(ParamValue::parse("  40 \t"), Ok(ParamValue::Int(40)));
    }

    #[test]
    fn parse_rejects_non_numbers() {
        assert_eq!(ParamValue::parse(""), Err(ValueError::Empty));
        assert_eq!(ParamValue::parse("   "), Err(ValueError::Empty));
        assert!(matches!(
            ParamValue::parse("abc"),
            Err(ValueError::NotANumber(_))
        ));
        assert!(matches!(
            ParamValue::parse("1.2.3"),
            Err(ValueError::NotANumber(_))
        ));
    }

    #[test]
    fn exponent_without_point_is_not_an_integer() {
        assert!(matches!(
            ParamValue::parse("1e3"),
            Err(ValueError::NotANumber(_))
        ));
        assert_eq!(ParamValue::parse("1.5e3"), Ok(ParamValue::Float(1500.0)));
    }

    #[test]
    fn parse_rejects_overflow() {
        assert!(matches!(
            ParamValue::parse("99999999999999999999"),
            Err(ValueError::NotANumber(_))
        ));
        assert!(matches!(
            ParamValue::parse("1.0e999"),
            Err(ValueError::NotFinite(_))
        ));
    }

    #[test]
    fn value_display() {
        assert_eq!(ParamValue::Int(3).to_string(), "3");
        assert_eq!(ParamValue::Float(3.0).to_string(), "3.0");
    }

    // --- Payload ---

    #[test]
    fn empty_payload_is_empty_object() {
        let p = Payload::new();
        assert!(p.is_empty());
        assert_eq!(p.to_json(JsonStyle::Compact), "{}");
        assert_eq!(p.to_json(JsonStyle::Spaced), "{}");
    }

    #[test]
    fn set_keeps_first_insertion_order() {
        let mut p = Payload::new();
        p.set(ParamKey::PulseWidth2, ParamValue::Int(5));
        p.set(ParamKey::PulseWidth1, ParamValue::Int(10));
        p.set(ParamKey::PulseWidth2, ParamValue::Float(7.5));
        assert_eq!(p.len(), 2);
        assert_eq!(
            p.to_json(JsonStyle::Compact),
            r#"{"pulseWidth2":7.5,"pulseWidth1":10}"#
        );
    }

    #[test]
    fn spaced_style_matches_desktop_tool() {
        let mut p = Payload::new();
        p.set(ParamKey::PulseWidth1, ParamValue::Int(12));
        p.set(ParamKey::PulseInterval, ParamValue::Float(12.5));
        assert_eq!(
            p.to_json(JsonStyle::Spaced),
            r#"{"pulseWidth1": 12, "pulseInterval": 12.5}"#
        );
    }

    #[test]
    fn float_with_zero_fraction_keeps_point() {
        let mut p = Payload::new();
        p.set(ParamKey::InterPulseDelay, ParamValue::Float(3.0));
        assert_eq!(p.to_json(JsonStyle::Compact), r#"{"interPulseDelay":3.0}"#);
    }

    #[test]
    fn json_is_single_line() {
        let mut p = Payload::new();
        for (i, key) in ParamKey::ALL.iter().enumerate() {
            p.set(*key, ParamValue::Int(i as i64));
        }
        for style in [JsonStyle::Compact, JsonStyle::Spaced] {
            let text = p.to_json(style);
            assert!(!text.contains('\n'));
            assert!(!text.contains('\r'));
        }
    }

    #[test]
    fn json_parses_back_as_object() {
        let mut p = Payload::new();
        p.set(ParamKey::PulseWidth1, ParamValue::Int(-4));
        p.set(ParamKey::PulseWidth2, ParamValue::Float(0.25));
        let v: serde_json::Value = serde_json::from_str(&p.to_json(JsonStyle::Compact)).unwrap();
        assert_eq!(v["pulseWidth1"], serde_json::json!(-4));
        assert_eq!(v["pulseWidth2"], serde_json::json!(0.25));
    }

    #[test]
    fn remove_and_clear() {
        let mut p = Payload::new();
        p.set(ParamKey::PulseWidth1, ParamValue::Int(1));
        p.set(ParamKey::PulseWidth2, ParamValue::Int(2));
        assert_eq!(p.remove(ParamKey::PulseWidth1), Some(ParamValue::Int(1)));
        assert_eq!(p.remove(ParamKey::PulseWidth1), None);
        assert_eq!(p.get(ParamKey::PulseWidth2), Some(ParamValue::Int(2)));
        p.clear();
        assert!(p.is_empty());
    }

    #[test]
    fn style_parse() {
        assert_eq!(JsonStyle::parse("compact"), Some(JsonStyle::Compact));
        assert_eq!(JsonStyle::parse("spaced"), Some(JsonStyle::Spaced));
        assert_eq!(JsonStyle::parse("pretty"), None);
        assert_eq!(JsonStyle::default(), JsonStyle::Compact);
    }
}
