//! JSON encoding for student records and the flat-object decoder used for
//! incoming request bodies.
//!
//! The decoder is deliberately naive. It understands a single-level object
//! whose values contain neither `,` nor `:`. It splits on every comma and
//! then on every colon, so a string value holding either character is
//! mangled: a comma tears the value apart and a colon drops the whole pair.
//! Callers see that as a missing or wrong-typed field.

use crate::error::CoreError;
use crate::structs::{NewStudent, Student};
use std::collections::BTreeMap;

/// Renders one record as a JSON object with the fixed key order.
pub fn to_json(student: &Student) -> Result<String, serde_json::Error> {
    serde_json::to_string(student)
}

/// Renders records as a JSON array, preserving their order.
pub fn to_json_array(students: &[Student]) -> Result<String, serde_json::Error> {
    serde_json::to_string(students)
}

/// A scalar value recovered by [`decode_flat_object`].
#[derive(Debug, Clone, PartialEq)]
pub enum FlatValue {
    Text(String),
    Integer(i32),
    Float(f64),
    /// A token that was neither quoted nor numeric.
    Raw(String),
}

pub type FlatObject = BTreeMap<String, FlatValue>;

pub fn decode_flat_object(input: &str) -> FlatObject {
    let mut body = input.trim();
    if let Some(rest) = body.strip_prefix('{') {
        body = rest;
    }
    if let Some(rest) = body.strip_suffix('}') {
        body = rest;
    }

    let mut fields = FlatObject::new();
    for pair in body.split(',') {
        let mut parts: Vec<&str> = pair.split(':').collect();
        while parts.last().is_some_and(|p| p.is_empty()) {
            parts.pop();
        }
        let [key, value] = parts.as_slice() else {
            continue;
        };

        let key = key.trim().replace('"', "");
        fields.insert(key, parse_value(value.trim()));
    }
    fields
}

fn parse_value(value: &str) -> FlatValue {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        return FlatValue::Text(value[1..value.len() - 1].to_string());
    }

    if value.contains('.') {
        value
            .parse::<f64>()
            .map(FlatValue::Float)
            .unwrap_or_else(|_| FlatValue::Raw(value.to_string()))
    } else {
        value
            .parse::<i32>()
            .map(FlatValue::Integer)
            .unwrap_or_else(|_| FlatValue::Raw(value.to_string()))
    }
}

fn integer_field(fields: &FlatObject, key: &str) -> Result<i32, CoreError> {
    match fields.get(key) {
        Some(FlatValue::Integer(v)) => Ok(*v),
        Some(_) => Err(CoreError::WrongType {
            field: key.to_string(),
            expected: "integer",
        }),
        None => Err(CoreError::MissingField(key.to_string())),
    }
}

fn text_field(fields: &FlatObject, key: &str) -> Result<String, CoreError> {
    match fields.get(key) {
        Some(FlatValue::Text(v)) => Ok(v.clone()),
        Some(_) => Err(CoreError::WrongType {
            field: key.to_string(),
            expected: "string",
        }),
        None => Err(CoreError::MissingField(key.to_string())),
    }
}

impl NewStudent {
    /// Pulls `rollNo`, `name` and the three subject marks out of a decoded
    /// body. Extra keys (e.g. derived fields echoed back) are ignored.
    pub fn from_fields(fields: &FlatObject) -> Result<Self, CoreError> {
        Ok(Self {
            roll_no: integer_field(fields, "rollNo")?,
            name: text_field(fields, "name")?,
            subject1: integer_field(fields, "subject1")?,
            subject2: integer_field(fields, "subject2")?,
            subject3: integer_field(fields, "subject3")?,
        })
    }
}
