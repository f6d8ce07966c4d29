use std::net::SocketAddr;

/// Errors that end a refresh token run. None of them are retried; the user
/// re-runs the tool.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("missing client ID or secret")]
    MissingCredentials,

    #[error("authorization failed: {0}")]
    Authorization(String),

    #[error("failed to exchange authorization code (status {status}): {body}")]
    TokenExchange {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("no refresh token in response: {body}")]
    MissingRefreshToken { body: String },

    #[error("failed to bind OAuth callback listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("callback listener on {0} stopped before a redirect was received")]
    CallbackDropped(SocketAddr),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
