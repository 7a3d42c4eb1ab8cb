//! Decoders for the backend's `{"data": [...]}` response envelope.
//!
//! # Design
//! List endpoints return `data` as an array of entities. Single-entity
//! endpoints use the same shape with exactly one element, so `decode_single`
//! reads index 0 and ignores anything after it. The helpers work on parsed
//! `serde_json::Value`s and take the per-element decoder as a closure, which
//! keeps them independent of any particular resource.

use serde::Deserializer;
use serde_json::Value;

use crate::error::ApiError;
use crate::id::RawIdVisitor;

/// Parse a raw response body into JSON.
pub fn parse_body(body: &str) -> Result<Value, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::BadBody(e.to_string()))
}

/// Decode every element of the top-level `data` array, preserving order.
pub fn decode_collection<T, F>(body: &Value, mut decode: F) -> Result<Vec<T>, ApiError>
where
    F: FnMut(&Value) -> Result<T, ApiError>,
{
    data_array(body)?
        .iter()
        .enumerate()
        .map(|(index, item)| decode(item).map_err(|e| at_index(index, e)))
        .collect()
}

/// Decode the first element of the top-level `data` array.
pub fn decode_single<T, F>(body: &Value, decode: F) -> Result<T, ApiError>
where
    F: FnOnce(&Value) -> Result<T, ApiError>,
{
    let first = data_array(body)?
        .first()
        .ok_or_else(|| ApiError::BadBody("`data` is empty".to_string()))?;
    decode(first).map_err(|e| at_index(0, e))
}

/// Read the `"id"` field of an entity object and wrap it.
///
/// The id may be a JSON integer or a string containing one.
pub fn decode_entity_id<I>(item: &Value, wrap: fn(i64) -> I) -> Result<I, ApiError> {
    let raw = item
        .get("id")
        .ok_or_else(|| ApiError::BadBody("missing field `id`".to_string()))?;
    raw.deserialize_any(RawIdVisitor)
        .map(wrap)
        .map_err(|e| ApiError::BadBody(format!("field `id`: {e}")))
}

fn data_array(body: &Value) -> Result<&Vec<Value>, ApiError> {
    match body.get("data") {
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(ApiError::BadBody("`data` is not an array".to_string())),
        None => Err(ApiError::BadBody("missing field `data`".to_string())),
    }
}

fn at_index(index: usize, err: ApiError) -> ApiError {
    match err {
        ApiError::BadBody(msg) => ApiError::BadBody(format!("data[{index}]: {msg}")),
        other => other,
    }
}
