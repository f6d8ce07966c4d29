//! OAuth 2.0 authorization code flow that mints a refresh token for the
//! Google Ads and Sheets APIs using a loopback redirect.

pub mod auth_url;
pub mod browser;
pub mod callback;
pub mod credentials;
pub mod error;
pub mod exchange;
pub mod flow;

pub use auth_url::{AuthorizationRequest, authorization_url};
pub use browser::{BrowserLauncher, SystemBrowser};
pub use callback::{CallbackResult, CallbackServer};
pub use credentials::{ClientCredentials, CredentialSource, PromptCredentialSource};
pub use error::{Error, Result};
pub use exchange::{TokenExchanger, TokenResponse};
pub use flow::{FlowConfig, RefreshTokenFlow};

/// OAuth callback port, must match the redirect URI registered with the client
pub const OAUTH_CALLBACK_PORT: u16 = 8080;

/// Redirect URI registered with the OAuth client
pub const REDIRECT_URI: &str = "http://localhost:8080";

/// Google authorization endpoint
pub const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/auth";

/// Google token endpoint
pub const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// Requested scopes: Google Ads management and Google Sheets
pub const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/adwords",
    "https://www.googleapis.com/auth/spreadsheets",
];

/// Environment variable holding the OAuth client ID
pub const CLIENT_ID_ENV: &str = "GOOGLE_ADS_CLIENT_ID";

/// Environment variable holding the OAuth client secret
pub const CLIENT_SECRET_ENV: &str = "GOOGLE_ADS_CLIENT_SECRET";

/// Configuration key the minted refresh token is printed under
pub const REFRESH_TOKEN_ENV: &str = "GOOGLE_ADS_REFRESH_TOKEN";
