use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    Router,
    extract::{RawQuery, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use tokio::net::TcpListener;
use tokio::sync::{Notify, oneshot};
use tracing::debug;

use crate::{Error, Result};

const SUCCESS_PAGE: &str = r#"<html><body style="font-family: sans-serif; padding: 40px; text-align: center;">
<h1>Authorization successful!</h1>
<p>You can close this window and return to the terminal.</p>
</body></html>"#;

const ALREADY_CAPTURED_PAGE: &str = r#"<html><body style="font-family: sans-serif; padding: 40px; text-align: center;">
<h1>Authorization already received</h1>
<p>You can close this window.</p>
</body></html>"#;

/// Outcome of the authorization redirect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackResult {
    Success { code: String },
    Failure { error: String },
}

#[derive(Debug, Default)]
struct AuthCallback {
    code: Option<String>,
    error: Option<String>,
}

impl AuthCallback {
    /// Lenient query parsing: never rejects, first non-empty value of a key wins
    fn from_query(query: Option<&str>) -> Self {
        let mut params = AuthCallback::default();
        let pairs = url::form_urlencoded::parse(query.unwrap_or_default().as_bytes());
        for (key, value) in pairs {
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "code" if params.code.is_none() => params.code = Some(value.into_owned()),
                "error" if params.error.is_none() => params.error = Some(value.into_owned()),
                _ => {}
            }
        }
        params
    }
}

impl From<AuthCallback> for CallbackResult {
    fn from(params: AuthCallback) -> Self {
        match params.code {
            Some(code) => CallbackResult::Success { code },
            None => CallbackResult::Failure {
                error: params.error.unwrap_or_else(|| "Unknown error".to_string()),
            },
        }
    }
}

#[derive(Clone)]
struct CallbackState {
    /// Single-slot handoff; whoever takes the sender records the result
    slot: Arc<Mutex<Option<oneshot::Sender<CallbackResult>>>>,
    captured: Arc<Notify>,
}

/// Local HTTP listener that receives exactly one OAuth redirect, then shuts down.
pub struct CallbackServer {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl CallbackServer {
    /// Bind the listener. The port is held until [`wait_for_result`](Self::wait_for_result) returns.
    pub async fn bind(addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr).await.map_err(|source| Error::Bind {
            addr: addr.to_string(),
            source,
        })?;
        let local_addr = listener.local_addr()?;
        debug!(%local_addr, "OAuth callback listener bound");

        Ok(Self {
            listener,
            local_addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve until the first redirect to `/` is recorded, then release the port.
    ///
    /// Blocks indefinitely if the redirect never arrives.
    pub async fn wait_for_result(self) -> Result<CallbackResult> {
        let Self {
            listener,
            local_addr,
        } = self;

        let (tx, rx) = oneshot::channel();
        let captured = Arc::new(Notify::new());
        let state = CallbackState {
            slot: Arc::new(Mutex::new(Some(tx))),
            captured: captured.clone(),
        };

        let app = Router::new()
            .route("/", get(handle_callback))
            .with_state(state);

        // Graceful shutdown lets the confirmation page reach the browser
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { captured.notified().await })
            .await?;
        debug!(%local_addr, "OAuth callback listener closed");

        rx.await.map_err(|_| Error::CallbackDropped(local_addr))
    }
}

async fn handle_callback(
    State(state): State<CallbackState>,
    RawQuery(query): RawQuery,
) -> Response {
    let sender = state
        .slot
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .take();

    let Some(sender) = sender else {
        debug!("ignoring redirect received after authorization was captured");
        return (StatusCode::CONFLICT, Html(ALREADY_CAPTURED_PAGE)).into_response();
    };

    let result = CallbackResult::from(AuthCallback::from_query(query.as_deref()));
    let response = render(&result);
    debug!(
        success = matches!(result, CallbackResult::Success { .. }),
        "OAuth redirect received"
    );

    // The receiver only goes away once the server has stopped
    let _ = sender.send(result);
    state.captured.notify_one();

    response
}

fn render(result: &CallbackResult) -> Response {
    match result {
        CallbackResult::Success { .. } => (StatusCode::OK, Html(SUCCESS_PAGE)).into_response(),
        CallbackResult::Failure { error } => (
            StatusCode::BAD_REQUEST,
            Html(format!(
                r#"<html><body style="font-family: sans-serif; padding: 40px; text-align: center;">
<h1>Authorization failed</h1>
<p>Error: {}</p>
</body></html>"#,
                html_escape::encode_text(error)
            )),
        )
            .into_response(),
    }
}
