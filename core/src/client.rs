//! Async CRUD client over any [`Transport`].
//!
//! # Design
//! `ResourceClient` holds a transport and a base URL and nothing else; the
//! resource descriptor and the optional credential are passed per call.
//! Every operation builds its request with the matching `build_*` function,
//! sends it once, parses the response with the matching `parse_*` function,
//! and passes any failure through the resource's `map_error`. There is no
//! retry, caching or request coalescing.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::request::{
    build_create, build_delete, build_get, build_patch, build_replace, build_select,
    parse_create, parse_get, parse_get_404, parse_ignored, parse_patch, parse_replace,
    parse_select,
};
use crate::resource::Resource;
use crate::transport::Transport;

#[derive(Debug, Clone)]
pub struct ResourceClient<T> {
    transport: T,
    base_url: String,
}

impl<T: Transport> ResourceClient<T> {
    pub fn new(transport: T, base_url: &str) -> Self {
        Self {
            transport,
            base_url: base_url.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// List the collection, filtered by `params`.
    pub async fn select<I, V, P, E>(
        &self,
        token: Option<&str>,
        resource: &Resource<I, V, P, E>,
        params: &P,
    ) -> Result<Vec<(I, V)>, E> {
        let request = build_select(&self.base_url, token, resource, params);
        let response = self.send(request).await.map_err(resource.map_error)?;
        parse_select(resource, &response).map_err(resource.map_error)
    }

    /// Fetch one entity; `Ok(None)` when the backend answers 404.
    pub async fn get<I, V, P, E>(
        &self,
        token: Option<&str>,
        resource: &Resource<I, V, P, E>,
        id: &I,
    ) -> Result<Option<(I, V)>, E> {
        let request = build_get(&self.base_url, token, resource, id);
        let response = match self.send(request).await {
            Ok(response) => response,
            // A 404 reported by the transport is absence too.
            Err(err) if err.is_not_found() => return Ok(None),
            Err(err) => return Err((resource.map_error)(err)),
        };
        parse_get(resource, &response).map_err(resource.map_error)
    }

    /// Fetch one entity that must exist; a 404 is an error.
    pub async fn get_404<I, V, P, E>(
        &self,
        token: Option<&str>,
        resource: &Resource<I, V, P, E>,
        id: &I,
    ) -> Result<(I, V), E> {
        let request = build_get(&self.base_url, token, resource, id);
        let response = self.send(request).await.map_err(resource.map_error)?;
        parse_get_404(resource, &response).map_err(resource.map_error)
    }

    pub async fn create<I, V, P, E>(
        &self,
        token: Option<&str>,
        resource: &Resource<I, V, P, E>,
        value: &V,
    ) -> Result<(I, V), E> {
        let request =
            build_create(&self.base_url, token, resource, value).map_err(resource.map_error)?;
        let response = self.send(request).await.map_err(resource.map_error)?;
        parse_create(resource, &response).map_err(resource.map_error)
    }

    /// Replace the whole entity and return the value the backend stored.
    pub async fn replace<I, V, P, E>(
        &self,
        token: Option<&str>,
        resource: &Resource<I, V, P, E>,
        id: &I,
        value: &V,
    ) -> Result<V, E> {
        let request = build_replace(&self.base_url, token, resource, id, value)
            .map_err(resource.map_error)?;
        let response = self.send(request).await.map_err(resource.map_error)?;
        parse_replace(resource, &response).map_err(resource.map_error)
    }

    pub async fn replace_ignore_response<I, V, P, E>(
        &self,
        token: Option<&str>,
        resource: &Resource<I, V, P, E>,
        id: &I,
        value: &V,
    ) -> Result<(), E> {
        let request = build_replace(&self.base_url, token, resource, id, value)
            .map_err(resource.map_error)?;
        let response = self.send(request).await.map_err(resource.map_error)?;
        parse_ignored(&response).map_err(resource.map_error)
    }

    /// Apply a partial JSON document and return the updated value.
    pub async fn patch<I, V, P, E>(
        &self,
        token: Option<&str>,
        resource: &Resource<I, V, P, E>,
        id: &I,
        patch: &Value,
    ) -> Result<V, E> {
        let request =
            build_patch(&self.base_url, token, resource, id, patch).map_err(resource.map_error)?;
        let response = self.send(request).await.map_err(resource.map_error)?;
        parse_patch(resource, &response).map_err(resource.map_error)
    }

    pub async fn patch_ignore_response<I, V, P, E>(
        &self,
        token: Option<&str>,
        resource: &Resource<I, V, P, E>,
        id: &I,
        patch: &Value,
    ) -> Result<(), E> {
        let request =
            build_patch(&self.base_url, token, resource, id, patch).map_err(resource.map_error)?;
        let response = self.send(request).await.map_err(resource.map_error)?;
        parse_ignored(&response).map_err(resource.map_error)
    }

    pub async fn delete<I, V, P, E>(
        &self,
        token: Option<&str>,
        resource: &Resource<I, V, P, E>,
        id: &I,
    ) -> Result<(), E> {
        let request = build_delete(&self.base_url, token, resource, id);
        let response = self.send(request).await.map_err(resource.map_error)?;
        parse_ignored(&response).map_err(resource.map_error)
    }

    /// One round-trip. The query string is left out of the logs since it may
    /// carry the access token.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = request.method;
        let url = request.url.clone();
        debug!(%method, %url, "sending request");
        match self.transport.send(request).await {
            Ok(response) => {
                debug!(%method, %url, status = response.status, "received response");
                Ok(response)
            }
            Err(err) => {
                warn!(%method, %url, error = %err, "transport failure");
                Err(err)
            }
        }
    }
}
