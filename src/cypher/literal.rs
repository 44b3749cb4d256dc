//! Value-to-literal conversion: one property value → Cypher literal text.
//!
//! Every map rendered here emits its keys in ascending lexical order; the
//! snapshot stores properties in a hash map, and sorted emission is what
//! keeps the script byte-reproducible.

use crate::model::{IsoDuration, Value};

/// A value that has no Cypher literal form.
///
/// The statement builder attaches the offending node/relationship id before
/// surfacing this; a partial script would not be replayable, so rendering
/// failures always abort the run.
#[derive(Debug, thiserror::Error)]
pub enum LiteralError {
    #[error("NaN float values have no Cypher literal")]
    NanFloat,
    #[error("infinite float values have no Cypher literal")]
    InfinityFloat,
    #[error("nested collections are not supported")]
    NestedList,
}

/// Quote an identifier (label, type, property key) for use in a statement.
///
/// Valid bare tokens pass through; anything else is backtick-quoted with
/// embedded backticks stripped first — a stray backtick in a label must not
/// be able to break out of the quoted identifier.
pub fn quote_ident(name: &str) -> String {
    if is_bare_ident(name) {
        name.to_string()
    } else {
        format!("`{}`", name.replace('`', ""))
    }
}

fn is_bare_ident(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Render a string value as a double-quoted Cypher literal.
pub fn string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Render one value as a Cypher literal.
pub fn value_literal(value: &Value) -> Result<String, LiteralError> {
    match value {
        Value::Null => Ok("null".to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Int(i) => Ok(i.to_string()),
        // Wider than the native 64-bit range: emit the full digit string.
        Value::BigInt(i) => Ok(i.to_string()),
        Value::Float(f) => float_literal(*f),
        Value::String(s) => Ok(string_literal(s)),
        Value::Bytes(b) => Ok(bytes_literal(b)),
        Value::List(items) => list_literal(items),
        Value::Date(d) => Ok(format!("date('{}')", d.format("%Y-%m-%d"))),
        Value::Time(t) => Ok(format!("time('{}')", t.format("%H:%M:%S%.f"))),
        Value::DateTime(dt) => Ok(format!("datetime('{}')", dt.format("%Y-%m-%dT%H:%M:%S%.fZ"))),
        Value::LocalDateTime(dt) => {
            Ok(format!("localdatetime('{}')", dt.format("%Y-%m-%dT%H:%M:%S%.f")))
        }
        Value::Duration(d) => Ok(duration_literal(d)),
        Value::Point2D { srid, x, y } => Ok(format!(
            "point({{x:{}, y:{}, crs:'{}'}})",
            float_literal(*x)?,
            float_literal(*y)?,
            crs_2d(*srid),
        )),
        Value::Point3D { srid, x, y, z } => Ok(format!(
            "point({{x:{}, y:{}, z:{}, crs:'{}'}})",
            float_literal(*x)?,
            float_literal(*y)?,
            float_literal(*z)?,
            crs_3d(*srid),
        )),
    }
}

/// Floats always carry a decimal point (or exponent) so replay keeps the
/// FLOAT type instead of collapsing whole values to INTEGER.
fn float_literal(f: f64) -> Result<String, LiteralError> {
    if f.is_nan() {
        return Err(LiteralError::NanFloat);
    }
    if f.is_infinite() {
        return Err(LiteralError::InfinityFloat);
    }
    if f == f.trunc() && f.abs() < 1e16 {
        Ok(format!("{f:.1}"))
    } else {
        Ok(format!("{f}"))
    }
}

fn bytes_literal(bytes: &[u8]) -> String {
    let parts: Vec<String> = bytes.iter().map(|b| b.to_string()).collect();
    format!("[{}]", parts.join(", "))
}

fn list_literal(items: &[Value]) -> Result<String, LiteralError> {
    let mut parts = Vec::with_capacity(items.len());
    for item in items {
        if matches!(item, Value::List(_)) {
            return Err(LiteralError::NestedList);
        }
        parts.push(value_literal(item)?);
    }
    Ok(format!("[{}]", parts.join(", ")))
}

fn duration_literal(d: &IsoDuration) -> String {
    if d.nanoseconds == 0 {
        format!("duration('P{}M{}DT{}S')", d.months, d.days, d.seconds)
    } else {
        format!(
            "duration('P{}M{}DT{}.{:09}S')",
            d.months, d.days, d.seconds, d.nanoseconds
        )
    }
}

// Reference system chosen by srid, defaulting by dimensionality.
fn crs_2d(srid: i32) -> &'static str {
    match srid {
        4326 => "wgs-84",
        _ => "cartesian",
    }
}

fn crs_3d(srid: i32) -> &'static str {
    match srid {
        4979 => "wgs-84-3d",
        _ => "cartesian-3d",
    }
}

/// Render `key:value` pairs in ascending key order, skipping `exclude` keys.
///
/// Returns the bare pair list without braces; callers own the surrounding
/// `{}` so the same text serves patterns and row maps.
pub fn property_pairs(
    properties: &crate::model::PropertyMap,
    exclude: &[&str],
) -> Result<String, LiteralError> {
    let mut keys: Vec<&String> = properties
        .keys()
        .filter(|k| !exclude.contains(&k.as_str()))
        .collect();
    keys.sort();
    let mut parts = Vec::with_capacity(keys.len());
    for key in keys {
        parts.push(format!("{}:{}", quote_ident(key), value_literal(&properties[key])?));
    }
    Ok(parts.join(", "))
}
