//! Request builders and response parsers for every CRUD operation.
//!
//! # Design
//! Each operation is split into a `build_*` function producing an
//! `HttpRequest` and a `parse_*` function consuming an `HttpResponse`. Both
//! halves are pure and parameterized by a [`Resource`], so they can be tested
//! without a network and reused by any transport. The async
//! [`ResourceClient`](crate::client::ResourceClient) only glues them together.
//!
//! Errors here are always `ApiError`; the resource's error mapping is applied
//! by the caller.

use serde_json::Value;

use crate::envelope::{decode_collection, decode_single, parse_body};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::resource::{QueryPairs, Resource};

/// Name of the query parameter carrying the caller's credential.
pub const ACCESS_TOKEN: &str = "access_token";

/// Join two URL pieces with exactly one `/` between them.
pub fn join_url(base: &str, segment: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        segment.trim_start_matches('/')
    )
}

/// Append the credential, when present, after the caller's own pairs.
pub fn with_credential(mut query: QueryPairs, token: Option<&str>) -> QueryPairs {
    if let Some(token) = token {
        query.push((ACCESS_TOKEN.to_string(), token.to_string()));
    }
    query
}

fn collection_url<I, V, P, E>(base_url: &str, resource: &Resource<I, V, P, E>) -> String {
    join_url(base_url, resource.path)
}

fn entity_url<I, V, P, E>(base_url: &str, resource: &Resource<I, V, P, E>, id: &I) -> String {
    let raw = (resource.unwrap_id)(id);
    join_url(&collection_url(base_url, resource), &raw.to_string())
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

fn encode_body<I, V, P, E>(resource: &Resource<I, V, P, E>, value: &V) -> Result<String, ApiError> {
    let json = (resource.encode_value)(value)?;
    serde_json::to_string(&json).map_err(|e| ApiError::Encode(e.to_string()))
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn build_select<I, V, P, E>(
    base_url: &str,
    token: Option<&str>,
    resource: &Resource<I, V, P, E>,
    params: &P,
) -> HttpRequest {
    HttpRequest {
        method: HttpMethod::Get,
        url: collection_url(base_url, resource),
        query: with_credential((resource.encode_params)(params), token),
        headers: Vec::new(),
        body: None,
    }
}

/// Shared by `get` and `get_404`; they differ only in how a 404 is parsed.
pub fn build_get<I, V, P, E>(
    base_url: &str,
    token: Option<&str>,
    resource: &Resource<I, V, P, E>,
    id: &I,
) -> HttpRequest {
    HttpRequest {
        method: HttpMethod::Get,
        url: entity_url(base_url, resource, id),
        query: with_credential(Vec::new(), token),
        headers: Vec::new(),
        body: None,
    }
}

pub fn build_create<I, V, P, E>(
    base_url: &str,
    token: Option<&str>,
    resource: &Resource<I, V, P, E>,
    value: &V,
) -> Result<HttpRequest, ApiError> {
    Ok(HttpRequest {
        method: HttpMethod::Post,
        url: collection_url(base_url, resource),
        query: with_credential(Vec::new(), token),
        headers: json_headers(),
        body: Some(encode_body(resource, value)?),
    })
}

pub fn build_replace<I, V, P, E>(
    base_url: &str,
    token: Option<&str>,
    resource: &Resource<I, V, P, E>,
    id: &I,
    value: &V,
) -> Result<HttpRequest, ApiError> {
    Ok(HttpRequest {
        method: HttpMethod::Put,
        url: entity_url(base_url, resource, id),
        query: with_credential(Vec::new(), token),
        headers: json_headers(),
        body: Some(encode_body(resource, value)?),
    })
}

/// The patch document is sent verbatim; it does not go through
/// `encode_value` since it need not be a complete value.
pub fn build_patch<I, V, P, E>(
    base_url: &str,
    token: Option<&str>,
    resource: &Resource<I, V, P, E>,
    id: &I,
    patch: &Value,
) -> Result<HttpRequest, ApiError> {
    let body = serde_json::to_string(patch).map_err(|e| ApiError::Encode(e.to_string()))?;
    Ok(HttpRequest {
        method: HttpMethod::Patch,
        url: entity_url(base_url, resource, id),
        query: with_credential(Vec::new(), token),
        headers: json_headers(),
        body: Some(body),
    })
}

pub fn build_delete<I, V, P, E>(
    base_url: &str,
    token: Option<&str>,
    resource: &Resource<I, V, P, E>,
    id: &I,
) -> HttpRequest {
    HttpRequest {
        method: HttpMethod::Delete,
        url: entity_url(base_url, resource, id),
        query: with_credential(Vec::new(), token),
        headers: Vec::new(),
        body: None,
    }
}

// ---------------------------------------------------------------------------
// Parsers
// ---------------------------------------------------------------------------

pub fn parse_select<I, V, P, E>(
    resource: &Resource<I, V, P, E>,
    response: &HttpResponse,
) -> Result<Vec<(I, V)>, ApiError> {
    check_status(response)?;
    let body = parse_body(&response.body)?;
    decode_collection(&body, |item| resource.decode_entity(item))
}

/// A 404 means the entity does not exist and is returned as `Ok(None)`.
pub fn parse_get<I, V, P, E>(
    resource: &Resource<I, V, P, E>,
    response: &HttpResponse,
) -> Result<Option<(I, V)>, ApiError> {
    if response.status == 404 {
        return Ok(None);
    }
    parse_get_404(resource, response).map(Some)
}

/// Like [`parse_get`] but a 404 is an error like any other status.
pub fn parse_get_404<I, V, P, E>(
    resource: &Resource<I, V, P, E>,
    response: &HttpResponse,
) -> Result<(I, V), ApiError> {
    check_status(response)?;
    let body = parse_body(&response.body)?;
    decode_single(&body, |item| resource.decode_entity(item))
}

pub fn parse_create<I, V, P, E>(
    resource: &Resource<I, V, P, E>,
    response: &HttpResponse,
) -> Result<(I, V), ApiError> {
    check_status(response)?;
    let body = parse_body(&response.body)?;
    decode_single(&body, |item| resource.decode_entity(item))
}

/// The caller already holds the id, so only the value is decoded.
pub fn parse_replace<I, V, P, E>(
    resource: &Resource<I, V, P, E>,
    response: &HttpResponse,
) -> Result<V, ApiError> {
    check_status(response)?;
    let body = parse_body(&response.body)?;
    decode_single(&body, resource.decode_value)
}

pub fn parse_patch<I, V, P, E>(
    resource: &Resource<I, V, P, E>,
    response: &HttpResponse,
) -> Result<V, ApiError> {
    check_status(response)?;
    let body = parse_body(&response.body)?;
    decode_single(&body, resource.decode_value)
}

/// Status-only parse for the ignore-response variants and `delete`. The body
/// is never read, so a malformed 2xx body still succeeds.
pub fn parse_ignored(response: &HttpResponse) -> Result<(), ApiError> {
    check_status(response)
}

/// Map non-2xx status codes to `ApiError::BadStatus`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::BadStatus {
        status: response.status,
        body: response.body.clone(),
    })
}
