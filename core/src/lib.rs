//! Typed CRUD client for REST backends that wrap responses in a `data`
//! envelope.
//!
//! # Overview
//! Describe a backend resource once as a [`Resource`] (path, id conversion,
//! value codec, error mapping, query-parameter encoding) and reuse it with
//! every operation of [`ResourceClient`]: `select`, `get`, `get_404`,
//! `create`, `replace`, `replace_ignore_response`, `patch`,
//! `patch_ignore_response` and `delete`.
//!
//! # Design
//! - Identifiers are [`Id<T>`], phantom-typed by resource kind.
//! - Each operation is split into a pure `build_*` / `parse_*` pair in
//!   [`request`], so protocol details are testable without a network.
//! - The network is behind the [`Transport`] trait; [`ReqwestTransport`] is
//!   the default implementation (feature `reqwest`).
//! - Descriptors are immutable and hold only `fn` pointers, so one value can
//!   serve any number of concurrent calls.

pub mod client;
pub mod envelope;
pub mod error;
pub mod http;
pub mod id;
pub mod request;
pub mod resource;
pub mod transport;

pub use client::ResourceClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use id::Id;
pub use resource::{decode_json, encode_json, no_params, QueryPairs, Resource};
#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
pub use transport::{Transport, TransportConfig};
