//! Field sanitizer
//!
//! Turns an untyped input mapping (form submission, API payload) into a typed
//! field set, following the schema table of the target entity. Only keys the
//! schema recognizes survive, and every value is coerced to its declared kind.
//!
//! Missing required fields are the only hard failure. Malformed optional input
//! is normalized instead: unknown enum values fall back to the default,
//! negative integers become 0, unreadable timestamps become "now". Strict mode
//! reports those normalizations as invalid fields instead.

pub mod html;

use crate::app_config::ValidationConfig;
use crate::error::{FieldProblem, ValidationError};
use crate::schema::{EntitySchema, FieldKind};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{IdenStatic, Value};
use serde::Serialize;

/// Raw, untyped input keyed by field name.
pub type RawInput = serde_json::Map<String, serde_json::Value>;

/// Storage format of timestamp fields.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const TIMESTAMP_INPUT_FORMATS: &[&str] = &[TIMESTAMP_FORMAT, "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[A-Za-z0-9-]{2,}$").unwrap());

/// A sanitized, storage-ready value.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(Option<String>),
    Integer(Option<i32>),
    Decimal(Option<f64>),
    Timestamp(NaiveDateTime),
}

impl FieldValue {
    /// Whether the value carries nothing a required field could accept.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.as_deref().map_or(true, str::is_empty),
            Self::Integer(value) => value.is_none(),
            Self::Decimal(value) => value.is_none(),
            Self::Timestamp(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => text.as_deref(),
            _ => None,
        }
    }
}

impl From<FieldValue> for Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Text(text) => Value::String(text.map(Box::new)),
            FieldValue::Integer(value) => Value::Int(value),
            FieldValue::Decimal(value) => Value::Double(value),
            FieldValue::Timestamp(at) => Value::from(at),
        }
    }
}

/// Sanitized fields in schema order, ready to be written.
#[derive(Clone, Debug)]
pub struct FieldSet<C> {
    entries: Vec<(C, FieldValue)>,
}

impl<C: IdenStatic> FieldSet<C> {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, column: C, value: FieldValue) {
        self.entries.push((column, value));
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(column, _)| column.as_str() == name)
            .map(|(_, value)| value)
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(column, _)| column.as_str()).collect()
    }
}

impl<C> IntoIterator for FieldSet<C> {
    type Item = (C, FieldValue);
    type IntoIter = std::vec::IntoIter<(C, FieldValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Result of coercing one raw value.
struct Coerced {
    value: FieldValue,
    /// Input was malformed and got replaced by a fallback
    degraded: Option<&'static str>,
}

impl Coerced {
    fn clean(value: FieldValue) -> Self {
        Self {
            value,
            degraded: None,
        }
    }

    fn fallback(value: FieldValue, reason: &'static str) -> Self {
        Self {
            value,
            degraded: Some(reason),
        }
    }
}

/// Current server time at storage precision.
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(0)
}

#[derive(Clone, Debug, Default)]
pub struct Sanitizer {
    strict: bool,
}

impl Sanitizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report permissive coercions as validation failures.
    pub fn strict() -> Self {
        Self { strict: true }
    }

    pub fn from_config(config: &ValidationConfig) -> Self {
        Self {
            strict: config.strict,
        }
    }

    /// Sanitize input for a new record. Every schema field gets a value:
    /// absent optional fields receive their kind's default.
    pub fn for_create<C: IdenStatic>(
        &self,
        schema: &EntitySchema<C>,
        input: &RawInput,
    ) -> Result<FieldSet<C>, ValidationError> {
        let now = now();
        let mut fields = FieldSet::new();
        let mut problems = Vec::new();

        for spec in schema.fields {
            let name = spec.column.as_str();
            let coerced = match input.get(name).filter(|raw| !is_blank(raw)) {
                Some(raw) => coerce(spec.kind, raw, now),
                None => Coerced::clean(default_for(spec.kind, now)),
            };

            if spec.required && coerced.value.is_empty() {
                problems.push(FieldProblem::Missing(name.to_string()));
                continue;
            }
            self.check_degraded(name, &coerced, &mut problems);
            fields.push(spec.column, coerced.value);
        }

        finish(schema, fields, problems)
    }

    /// Sanitize a partial update. Only fields present in `input` and not
    /// frozen after creation are produced.
    pub fn for_update<C: IdenStatic>(
        &self,
        schema: &EntitySchema<C>,
        input: &RawInput,
    ) -> Result<FieldSet<C>, ValidationError> {
        let now = now();
        let mut fields = FieldSet::new();
        let mut problems = Vec::new();

        for spec in schema.fields {
            let name = spec.column.as_str();
            let Some(raw) = input.get(name) else {
                continue;
            };
            if spec.immutable {
                log::debug!("Ignoring update of frozen field {}.{}", schema.kind, name);
                continue;
            }

            let coerced = if is_blank(raw) {
                Coerced::clean(default_for(spec.kind, now))
            } else {
                coerce(spec.kind, raw, now)
            };

            // Clearing a required field is as bad as omitting it
            if spec.required && coerced.value.is_empty() {
                problems.push(FieldProblem::Missing(name.to_string()));
                continue;
            }
            self.check_degraded(name, &coerced, &mut problems);
            fields.push(spec.column, coerced.value);
        }

        finish(schema, fields, problems)
    }

    /// Coerce a single value the way a field of `kind` would be, without the
    /// required-field rules. Used for filter values.
    pub fn coerce_value(&self, kind: FieldKind, raw: &serde_json::Value) -> FieldValue {
        if is_blank(raw) {
            return default_for(kind, now());
        }
        coerce(kind, raw, now()).value
    }

    fn check_degraded(&self, name: &str, coerced: &Coerced, problems: &mut Vec<FieldProblem>) {
        if let Some(reason) = coerced.degraded {
            if self.strict {
                problems.push(FieldProblem::Invalid {
                    field: name.to_string(),
                    reason: reason.to_string(),
                });
            } else {
                log::debug!("Normalized field {}: {}", name, reason);
            }
        }
    }
}

fn finish<C>(
    schema: &EntitySchema<C>,
    fields: FieldSet<C>,
    problems: Vec<FieldProblem>,
) -> Result<FieldSet<C>, ValidationError> {
    if problems.is_empty() {
        Ok(fields)
    } else {
        Err(ValidationError {
            entity: schema.kind,
            problems,
        })
    }
}

fn is_blank(raw: &serde_json::Value) -> bool {
    match raw {
        serde_json::Value::Null => true,
        serde_json::Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Value stored for a field the input did not supply.
fn default_for(kind: FieldKind, now: NaiveDateTime) -> FieldValue {
    match kind {
        FieldKind::PlainText | FieldKind::LongText | FieldKind::RichTextHtml | FieldKind::Email => {
            FieldValue::Text(None)
        }
        FieldKind::NonNegativeInteger => FieldValue::Integer(Some(0)),
        FieldKind::Reference => FieldValue::Integer(None),
        FieldKind::Decimal => FieldValue::Decimal(None),
        FieldKind::Enum { default, .. } => FieldValue::Text(Some(default.to_string())),
        FieldKind::Timestamp => FieldValue::Timestamp(now),
    }
}

fn coerce(kind: FieldKind, raw: &serde_json::Value, now: NaiveDateTime) -> Coerced {
    match kind {
        FieldKind::PlainText => text_field(raw, html::plain_text),
        FieldKind::LongText => text_field(raw, html::long_text),
        FieldKind::RichTextHtml => text_field(raw, html::rich_text),
        FieldKind::NonNegativeInteger => match raw_integer(raw) {
            Some(n) if n < 0 => Coerced::fallback(FieldValue::Integer(Some(0)), "negative integer"),
            Some(n) if n > i64::from(i32::MAX) => {
                Coerced::fallback(FieldValue::Integer(Some(i32::MAX)), "integer out of range")
            }
            Some(n) => Coerced::clean(FieldValue::Integer(Some(n as i32))),
            None => Coerced::fallback(FieldValue::Integer(Some(0)), "not an integer"),
        },
        FieldKind::Reference => match raw_integer(raw) {
            Some(n) if n > 0 && n <= i64::from(i32::MAX) => {
                Coerced::clean(FieldValue::Integer(Some(n as i32)))
            }
            _ => Coerced::fallback(FieldValue::Integer(None), "not a record id"),
        },
        FieldKind::Decimal => match raw_decimal(raw) {
            Some(n) => Coerced::clean(FieldValue::Decimal(Some(n))),
            None => Coerced::fallback(FieldValue::Decimal(None), "not a number"),
        },
        FieldKind::Enum { allowed, default } => {
            let value = raw_text(raw).map(|s| s.trim().to_string());
            match value {
                Some(v) if allowed.iter().any(|a| *a == v) => {
                    Coerced::clean(FieldValue::Text(Some(v)))
                }
                _ => Coerced::fallback(
                    FieldValue::Text(Some(default.to_string())),
                    "value not in allowed set",
                ),
            }
        }
        FieldKind::Timestamp => match raw_text(raw).and_then(|s| parse_timestamp(&s)) {
            Some(at) => Coerced::clean(FieldValue::Timestamp(at)),
            None => Coerced::fallback(FieldValue::Timestamp(now), "unreadable timestamp"),
        },
        FieldKind::Email => {
            let value = raw_text(raw).map(|s| html::plain_text(&s));
            match value {
                Some(v) if EMAIL_REGEX.is_match(&v) => Coerced::clean(FieldValue::Text(Some(v))),
                _ => Coerced::fallback(FieldValue::Text(None), "not an email address"),
            }
        }
    }
}

fn text_field(raw: &serde_json::Value, clean: fn(&str) -> String) -> Coerced {
    match raw_text(raw) {
        Some(s) => Coerced::clean(FieldValue::Text(Some(clean(&s)))),
        None => Coerced::fallback(FieldValue::Text(None), "not a text value"),
    }
}

fn raw_text(raw: &serde_json::Value) -> Option<String> {
    match raw {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn raw_integer(raw: &serde_json::Value) -> Option<i64> {
    match raw {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        serde_json::Value::String(s) => leading_integer(s),
        serde_json::Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

/// Integer prefix of a string, so "45 minutes" reads as 45.
fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Saturate rather than fail on absurdly long digit runs
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

fn raw_decimal(raw: &serde_json::Value) -> Option<f64> {
    let value = match raw {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|f| f.is_finite())
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    for format in TIMESTAMP_INPUT_FORMATS {
        if let Ok(at) = NaiveDateTime::parse_from_str(s, format) {
            return Some(at.trunc_subsecs(0));
        }
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(s) {
        return Some(at.with_timezone(&Utc).naive_utc().trunc_subsecs(0));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::reports;
    use serde_json::json;

    fn input(value: serde_json::Value) -> RawInput {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("test input must be an object"),
        }
    }

    #[test]
    fn create_applies_defaults() {
        let fields = Sanitizer::new()
            .for_create(
                &reports::SCHEMA,
                &input(json!({
                    "case_id": 7,
                    "report_title": "EVP session",
                    "report_content": "<p>Heard a voice</p>",
                    "unknown_key": "dropped",
                })),
            )
            .expect("valid input");

        assert_eq!(fields.get("report_type"), Some(&FieldValue::Text(Some("investigation".into()))));
        assert_eq!(fields.get("duration_minutes"), Some(&FieldValue::Integer(Some(0))));
        assert_eq!(fields.get("report_summary"), Some(&FieldValue::Text(None)));
        assert!(matches!(fields.get("report_date"), Some(FieldValue::Timestamp(_))));
        assert!(fields.get("unknown_key").is_none());
        assert!(fields.get("investigator_id").is_none());
    }

    #[test]
    fn create_reports_every_missing_required_field() {
        let err = Sanitizer::new()
            .for_create(&reports::SCHEMA, &input(json!({ "report_title": "   " })))
            .unwrap_err();

        let missing: Vec<&str> = err.missing_fields().collect();
        assert_eq!(missing, vec!["case_id", "report_title", "report_content"]);
    }

    #[test]
    fn required_field_that_sanitizes_to_nothing_is_missing() {
        let err = Sanitizer::new()
            .for_create(
                &reports::SCHEMA,
                &input(json!({
                    "case_id": 7,
                    "report_title": "<b></b>",
                    "report_content": "<p>x</p>",
                })),
            )
            .unwrap_err();
        assert_eq!(err.missing_fields().collect::<Vec<_>>(), vec!["report_title"]);
    }

    #[test]
    fn permissive_coercions() {
        let fields = Sanitizer::new()
            .for_update(
                &reports::SCHEMA,
                &input(json!({
                    "duration_minutes": -5,
                    "report_type": "seance",
                    "report_date": "last tuesday",
                })),
            )
            .expect("permissive mode never fails on optional input");

        assert_eq!(fields.get("duration_minutes"), Some(&FieldValue::Integer(Some(0))));
        assert_eq!(fields.get("report_type"), Some(&FieldValue::Text(Some("investigation".into()))));
        assert!(matches!(fields.get("report_date"), Some(FieldValue::Timestamp(_))));
    }

    #[test]
    fn strict_mode_rejects_degraded_values() {
        let err = Sanitizer::strict()
            .for_update(
                &reports::SCHEMA,
                &input(json!({ "duration_minutes": -5, "report_type": "follow_up" })),
            )
            .unwrap_err();

        assert_eq!(err.problems.len(), 1);
        assert!(matches!(
            &err.problems[0],
            FieldProblem::Invalid { field, .. } if field == "duration_minutes"
        ));
    }

    #[test]
    fn update_is_partial_and_skips_frozen_fields() {
        let fields = Sanitizer::new()
            .for_update(
                &reports::SCHEMA,
                &input(json!({ "case_id": 99, "moon_phase": " Waxing\n gibbous " })),
            )
            .expect("valid update");

        assert_eq!(fields.names(), vec!["moon_phase"]);
        assert_eq!(fields.get("moon_phase").and_then(FieldValue::as_text), Some("Waxing gibbous"));
    }

    #[test]
    fn update_cannot_clear_required_field() {
        let err = Sanitizer::new()
            .for_update(&reports::SCHEMA, &input(json!({ "report_title": "" })))
            .unwrap_err();
        assert_eq!(err.missing_fields().collect::<Vec<_>>(), vec!["report_title"]);
    }

    #[test]
    fn integers() {
        assert_eq!(leading_integer("45 minutes"), Some(45));
        assert_eq!(leading_integer(" -12"), Some(-12));
        assert_eq!(leading_integer("+3"), Some(3));
        assert_eq!(leading_integer("abc"), None);
        assert_eq!(raw_integer(&json!(12.9)), Some(12));
        assert_eq!(raw_integer(&json!(true)), Some(1));
        assert_eq!(raw_integer(&json!([1])), None);
    }

    #[test]
    fn timestamps() {
        let expected = NaiveDate::from_ymd_opt(2023, 10, 31)
            .and_then(|d| d.and_hms_opt(23, 15, 0))
            .unwrap();
        assert_eq!(parse_timestamp("2023-10-31 23:15:00"), Some(expected));
        assert_eq!(parse_timestamp("2023-10-31T23:15"), Some(expected));
        assert_eq!(parse_timestamp("2023-10-31T23:15:00.250Z"), Some(expected));
        assert_eq!(
            parse_timestamp("2023-10-31"),
            NaiveDate::from_ymd_opt(2023, 10, 31).and_then(|d| d.and_hms_opt(0, 0, 0))
        );
        assert_eq!(parse_timestamp("midnight"), None);
    }

    #[test]
    fn emails_and_references() {
        let now = now();
        let email = |v| coerce(FieldKind::Email, &json!(v), now).value;
        assert_eq!(email(" lead@ghosthunt.org "), FieldValue::Text(Some("lead@ghosthunt.org".into())));
        assert_eq!(email("not-an-email"), FieldValue::Text(None));

        let reference = |v: serde_json::Value| coerce(FieldKind::Reference, &v, now).value;
        assert_eq!(reference(json!("12")), FieldValue::Integer(Some(12)));
        assert_eq!(reference(json!(0)), FieldValue::Integer(None));
        assert_eq!(reference(json!(-3)), FieldValue::Integer(None));
    }
}
