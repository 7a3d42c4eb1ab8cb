//! Per-resource configuration shared by every CRUD operation.
//!
//! # Design
//! A `Resource` bundles everything that varies between backend resources:
//! the collection path, how ids convert to and from raw integers, how values
//! encode and decode, how errors are mapped, and how query parameters are
//! encoded. Every capability is a plain `fn` pointer, so a descriptor holds no
//! state, is `Copy`-cheap to share, and can live in a `static`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::envelope::decode_entity_id;
use crate::error::ApiError;
use crate::id::Id;

/// Ordered query-string pairs.
pub type QueryPairs = Vec<(String, String)>;

/// Description of one backend resource.
///
/// * `I` – identifier type (usually [`Id<T>`])
/// * `V` – value type, without the id
/// * `P` – query-parameter type accepted by `select`
/// * `E` – error type surfaced to callers
pub struct Resource<I, V, P, E> {
    pub path: &'static str,
    pub wrap_id: fn(i64) -> I,
    pub unwrap_id: fn(&I) -> i64,
    pub decode_value: fn(&Value) -> Result<V, ApiError>,
    /// Encodes the value body. The backend assigns the id, so it is not
    /// included here.
    pub encode_value: fn(&V) -> Result<Value, ApiError>,
    pub map_error: fn(ApiError) -> E,
    pub encode_params: fn(&P) -> QueryPairs,
}

impl<I, V, P, E> Resource<I, V, P, E> {
    pub const fn new(
        path: &'static str,
        wrap_id: fn(i64) -> I,
        unwrap_id: fn(&I) -> i64,
        decode_value: fn(&Value) -> Result<V, ApiError>,
        encode_value: fn(&V) -> Result<Value, ApiError>,
        map_error: fn(ApiError) -> E,
        encode_params: fn(&P) -> QueryPairs,
    ) -> Self {
        Self {
            path,
            wrap_id,
            unwrap_id,
            decode_value,
            encode_value,
            map_error,
            encode_params,
        }
    }

    /// Same descriptor with a different error mapping.
    pub fn with_error<E2>(self, map_error: fn(ApiError) -> E2) -> Resource<I, V, P, E2> {
        Resource {
            path: self.path,
            wrap_id: self.wrap_id,
            unwrap_id: self.unwrap_id,
            decode_value: self.decode_value,
            encode_value: self.encode_value,
            map_error,
            encode_params: self.encode_params,
        }
    }

    /// Decode one `(id, value)` entity from an envelope element.
    pub fn decode_entity(&self, item: &Value) -> Result<(I, V), ApiError> {
        let id = decode_entity_id(item, self.wrap_id)?;
        let value = (self.decode_value)(item)?;
        Ok((id, value))
    }
}

impl<T, V, P> Resource<Id<T>, V, P, ApiError>
where
    V: Serialize + DeserializeOwned,
{
    /// Descriptor for a serde-backed value type with `Id<T>` ids and the
    /// identity error mapping.
    pub const fn json(path: &'static str, encode_params: fn(&P) -> QueryPairs) -> Self {
        Self::new(
            path,
            Id::wrap,
            unwrap_typed_id,
            decode_json,
            encode_json,
            identity,
            encode_params,
        )
    }
}

impl<I, V, P, E> Clone for Resource<I, V, P, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I, V, P, E> Copy for Resource<I, V, P, E> {}

impl<I, V, P, E> std::fmt::Debug for Resource<I, V, P, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource").field("path", &self.path).finish_non_exhaustive()
    }
}

/// Parameter encoder for resources whose `select` takes no query parameters.
pub fn no_params<P>(_: &P) -> QueryPairs {
    Vec::new()
}

/// Value decoder backed by `serde::Deserialize`.
pub fn decode_json<V: DeserializeOwned>(item: &Value) -> Result<V, ApiError> {
    V::deserialize(item).map_err(|e| ApiError::BadBody(e.to_string()))
}

/// Value encoder backed by `serde::Serialize`.
pub fn encode_json<V: Serialize>(value: &V) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Encode(e.to_string()))
}

fn unwrap_typed_id<T>(id: &Id<T>) -> i64 {
    id.unwrap()
}

fn identity(err: ApiError) -> ApiError {
    err
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    struct Task;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct TaskBody {
        label: String,
        done: bool,
    }

    struct Filter {
        label: String,
        limit: u32,
    }

    fn filter_params(filter: &Filter) -> QueryPairs {
        vec![
            ("label".to_string(), filter.label.clone()),
            ("limit".to_string(), filter.limit.to_string()),
        ]
    }

    const TASKS: Resource<Id<Task>, TaskBody, Filter, ApiError> =
        Resource::json("tasks", filter_params);

    #[derive(Debug, PartialEq)]
    enum AppError {
        Missing,
        Other(String),
    }

    fn app_error(err: ApiError) -> AppError {
        if err.is_not_found() {
            AppError::Missing
        } else {
            AppError::Other(err.to_string())
        }
    }

    #[test]
    fn json_descriptor_ids_round_trip() {
        let id = (TASKS.wrap_id)(3);
        assert_eq!((TASKS.unwrap_id)(&id), 3);
    }

    #[test]
    fn decode_entity_pairs_id_with_value() {
        let (id, body) = TASKS
            .decode_entity(&json!({"id": 9, "label": "x", "done": true}))
            .unwrap();
        assert_eq!(id, Id::wrap(9));
        assert_eq!(
            body,
            TaskBody {
                label: "x".to_string(),
                done: true
            }
        );
    }

    #[test]
    fn encode_value_omits_id() {
        let body = TaskBody {
            label: "x".to_string(),
            done: false,
        };
        let encoded = (TASKS.encode_value)(&body).unwrap();
        assert_eq!(encoded, json!({"label": "x", "done": false}));
    }

    #[test]
    fn params_keep_their_order() {
        let filter = Filter {
            label: "home".to_string(),
            limit: 10,
        };
        let pairs = (TASKS.encode_params)(&filter);
        assert_eq!(pairs[0].0, "label");
        assert_eq!(pairs[1], ("limit".to_string(), "10".to_string()));
    }

    #[test]
    fn with_error_swaps_only_the_error_mapping() {
        let tasks = TASKS.with_error(app_error);
        assert_eq!(tasks.path, "tasks");
        let missing = ApiError::BadStatus {
            status: 404,
            body: String::new(),
        };
        assert_eq!((tasks.map_error)(missing), AppError::Missing);
        assert!(matches!((tasks.map_error)(ApiError::Timeout), AppError::Other(_)));
    }

    #[test]
    fn no_params_is_empty() {
        assert!(no_params(&()).is_empty());
    }
}
