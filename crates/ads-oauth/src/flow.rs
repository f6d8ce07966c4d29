use std::io::Write;

use tracing::{debug, warn};

use crate::{
    AUTH_ENDPOINT, AuthorizationRequest, BrowserLauncher, CallbackResult, CallbackServer,
    CredentialSource, Error, OAUTH_CALLBACK_PORT, REDIRECT_URI, REFRESH_TOKEN_ENV, Result, SCOPES,
    TOKEN_ENDPOINT, TokenExchanger, authorization_url,
};

const RULE: &str = "============================================================";

/// Endpoints and listener settings for a run
#[derive(Debug, Clone)]
pub struct FlowConfig {
    pub auth_endpoint: String,
    pub token_endpoint: String,
    /// Must match the redirect URI registered with the OAuth client
    pub redirect_uri: String,
    /// Address the callback listener binds; must serve `redirect_uri`
    pub listen_addr: String,
    pub scopes: Vec<String>,
    /// Launch the system browser; the URL is printed either way
    pub open_browser: bool,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            auth_endpoint: AUTH_ENDPOINT.to_string(),
            token_endpoint: TOKEN_ENDPOINT.to_string(),
            redirect_uri: REDIRECT_URI.to_string(),
            // IPv4 loopback; resolving "localhost" may pick ::1 only
            listen_addr: format!("127.0.0.1:{}", OAUTH_CALLBACK_PORT),
            scopes: SCOPES.iter().map(|s| s.to_string()).collect(),
            open_browser: true,
        }
    }
}

/// Runs the authorization code flow end to end and prints the refresh token.
pub struct RefreshTokenFlow<C, B> {
    config: FlowConfig,
    credentials: C,
    browser: B,
    exchanger: TokenExchanger,
}

impl<C: CredentialSource, B: BrowserLauncher> RefreshTokenFlow<C, B> {
    pub fn new(config: FlowConfig, credentials: C, browser: B) -> Self {
        let exchanger = TokenExchanger::new(config.token_endpoint.clone());
        Self {
            config,
            credentials,
            browser,
            exchanger,
        }
    }

    /// Writes the status narrative to `status` and the result to `out`.
    /// Returns the refresh token.
    pub async fn run<O: Write, S: Write>(&mut self, out: &mut O, status: &mut S) -> Result<String> {
        writeln!(status, "{}", RULE)?;
        writeln!(status, "Google OAuth Refresh Token Generator")?;
        writeln!(status, "Scopes: Google Ads + Google Sheets")?;
        writeln!(status, "{}\n", RULE)?;

        let credentials = self.credentials.credentials()?;
        if credentials.is_incomplete() {
            return Err(Error::MissingCredentials);
        }

        let request = AuthorizationRequest::new(
            &credentials.client_id,
            &self.config.redirect_uri,
            self.config.scopes.as_slice(),
        );
        let auth_url = authorization_url(&self.config.auth_endpoint, &request);

        // Bound before the browser opens so the redirect cannot beat the listener
        let server = CallbackServer::bind(&self.config.listen_addr).await?;

        if self.config.open_browser {
            writeln!(status, "Opening browser for authorization...")?;
            writeln!(status, "If browser doesn't open, go to:\n{}\n", auth_url)?;
            if let Err(e) = self.browser.open(&auth_url) {
                warn!(error = %e, "failed to launch browser");
                writeln!(status, "Could not open browser: {}", e)?;
            }
        } else {
            writeln!(status, "Go to the following URL to authorize:\n{}\n", auth_url)?;
        }

        writeln!(status, "Waiting for authorization...")?;
        status.flush()?;

        let code = match server.wait_for_result().await? {
            CallbackResult::Success { code } => code,
            CallbackResult::Failure { error } => return Err(Error::Authorization(error)),
        };
        debug!("authorization code captured");

        writeln!(status, "\nExchanging code for tokens...")?;
        let refresh_token = self
            .exchanger
            .exchange(&credentials, &code, &self.config.redirect_uri)
            .await?;

        print_refresh_token(out, &refresh_token)?;
        Ok(refresh_token)
    }
}

fn print_refresh_token<O: Write>(out: &mut O, refresh_token: &str) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "SUCCESS! Here's your new refresh token:")?;
    writeln!(out, "{}\n", RULE)?;
    writeln!(out, "{}\n", refresh_token)?;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "Update your .env file:")?;
    writeln!(out, "{}={}", REFRESH_TOKEN_ENV, refresh_token)?;
    writeln!(out, "{}", RULE)?;
    out.flush()?;
    Ok(())
}
