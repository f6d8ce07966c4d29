/// Parameters of the authorization redirect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub client_id: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub response_type: &'static str,
    /// `offline` is required for the token endpoint to issue a refresh token
    pub access_type: &'static str,
    /// `consent` forces the consent screen; without it repeat grants omit the refresh token
    pub prompt: &'static str,
}

impl AuthorizationRequest {
    pub fn new<S: AsRef<str>>(client_id: &str, redirect_uri: &str, scopes: &[S]) -> Self {
        Self {
            client_id: client_id.to_string(),
            redirect_uri: redirect_uri.to_string(),
            scopes: scopes.iter().map(|s| s.as_ref().to_string()).collect(),
            response_type: "code",
            access_type: "offline",
            prompt: "consent",
        }
    }
}

/// Generate authorization URL
pub fn authorization_url(auth_endpoint: &str, request: &AuthorizationRequest) -> String {
    format!(
        "{}?\
        client_id={}&\
        redirect_uri={}&\
        response_type={}&\
        scope={}&\
        access_type={}&\
        prompt={}",
        auth_endpoint,
        urlencoding::encode(&request.client_id),
        urlencoding::encode(&request.redirect_uri),
        request.response_type,
        urlencoding::encode(&request.scopes.join(" ")),
        request.access_type,
        request.prompt,
    )
}
