//! Error types for resource hydration and hypermedia navigation.

use thiserror::Error;

/// Errors raised at the transport boundary.
///
/// Transport implementations report failures through this type; the engine
/// never retries, it propagates them unchanged inside [`HalError`].
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {message}")]
    Failed { url: String, message: String },

    #[cfg(feature = "remote")]
    #[error("http request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to build http client: {source}")]
    Build {
        #[source]
        source: reqwest::Error,
    },
}

/// Errors raised by cursor navigation.
///
/// Every navigation method signals a missing link slot the same way; none of
/// them silently return an empty result.
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("collection has no \"{rel}\" link")]
    MissingLink { rel: String },

    #[error("no collection has been fetched yet")]
    NoCursor,
}

/// Errors surfaced by engine operations.
#[derive(Debug, Error)]
pub enum HalError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    /// A 500 response; carries the body's `error` field when present.
    #[error("server fault: {message}")]
    ServerFault { message: String },

    #[error("unexpected status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The entity could not be serialized for a write or rebuilt from a payload.
    #[error("cannot serialize or hydrate entity: {source}")]
    InvalidEntity {
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed response body: {message}")]
    MalformedBody { message: String },

    /// A write was targeted at an entity that has never been persisted.
    #[error("entity has no self link")]
    MissingSelfLink,
}
