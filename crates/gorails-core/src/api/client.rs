//! HTTP client for the GoRails website.
//!
//! `PlatformClient` fetches HTML pages with the session cookie attached,
//! performs the form login, walks download redirects and opens download
//! streams. Page markup is interpreted by the configured [`PageParser`].

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, redirect, Client, Response};
use tracing::{debug, info};
use url::Url;

use crate::auth::{Credentials, SessionData};
use crate::config::Config;
use crate::scrape::PageParser;

use super::{ApiError, ApiResult};

// ============================================================================
// Constants
// ============================================================================

/// Connect timeout in seconds. Downloads have no overall timeout.
const CONNECT_TIMEOUT_SECS: u64 = 15;

/// Maximum same-site redirects followed while resolving a download link.
const MAX_REDIRECT_HOPS: usize = 10;

/// Redirects followed automatically for page and download requests.
const MAX_PAGE_REDIRECTS: usize = 10;

/// Client for the platform website.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct PlatformClient {
    client: Client,
    no_redirect: Client,
    parser: Arc<dyn PageParser>,
    base_url: Url,
    sign_in_url: Url,
    cookie_name: String,
    request_timeout: Duration,
}

impl PlatformClient {
    /// Create a new client
    pub fn new(config: &Config, parser: Arc<dyn PageParser>) -> Result<Self> {
        let client = Self::builder(config)
            .redirect(redirect::Policy::limited(MAX_PAGE_REDIRECTS))
            .build()
            .context("Failed to build HTTP client")?;
        let no_redirect = Self::builder(config)
            .redirect(redirect::Policy::none())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            no_redirect,
            parser,
            base_url: config.base_url.clone(),
            sign_in_url: config.sign_in_url()?,
            cookie_name: config.cookie_name.clone(),
            request_timeout: config.request_timeout,
        })
    }

    fn builder(config: &Config) -> reqwest::ClientBuilder {
        Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
    }

    pub fn parser(&self) -> &dyn PageParser {
        self.parser.as_ref()
    }

    /// Name of the session cookie
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    fn is_platform_url(&self, url: &Url) -> bool {
        url.origin() == self.base_url.origin()
    }

    fn is_sign_in_url(&self, url: &Url) -> bool {
        self.is_platform_url(url)
            && url.path().trim_end_matches('/') == self.sign_in_url.path().trim_end_matches('/')
    }

    fn session_rejected() -> ApiError {
        ApiError::Auth("session was rejected; run `gorails-dl auth` to sign in again".to_string())
    }

    /// Check if response is successful, mapping the status to an error if not.
    fn check_response(response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(ApiError::from_status(status, response.url().as_str()))
        }
    }

    /// Cookie header replaying every cookie the response set
    fn cookie_jar_header(response: &Response) -> String {
        response
            .cookies()
            .map(|c| format!("{}={}", c.name(), c.value()))
            .collect::<Vec<_>>()
            .join("; ")
    }

    // ===== Authentication =====

    /// Sign in with email and password and return the new session.
    /// Any failure, including transport errors, is reported as `ApiError::Auth`.
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<SessionData> {
        let network = |e: reqwest::Error| ApiError::Auth(format!("login request failed: {}", e));

        debug!(email = %credentials.identifier, "Fetching sign-in page");
        let page = self
            .no_redirect
            .get(self.sign_in_url.clone())
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(network)?;
        let page = Self::check_response(page).map_err(|e| {
            ApiError::Auth(format!("sign-in page unavailable: {}", e))
        })?;
        let cookies = Self::cookie_jar_header(&page);
        let html = page.text().await.map_err(network)?;

        let csrf = self
            .parser
            .csrf_token(&html)
            .ok_or_else(|| ApiError::Auth("could not find CSRF token on sign-in page".to_string()))?;

        debug!("Submitting login form");
        let mut request = self
            .no_redirect
            .post(self.sign_in_url.clone())
            .timeout(self.request_timeout)
            .form(&[
                ("authenticity_token", csrf.as_str()),
                ("user[email]", credentials.identifier.as_str()),
                ("user[password]", credentials.secret.as_str()),
                ("user[remember_me]", "1"),
                ("commit", "Log in"),
            ]);
        if !cookies.is_empty() {
            request = request.header(header::COOKIE, cookies);
        }
        let response = request.send().await.map_err(network)?;

        let status = response.status();
        let token = response
            .cookies()
            .find(|c| c.name() == self.cookie_name)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty());
        let location = Self::location(&response);

        if status.is_redirection() {
            if location.as_ref().is_some_and(|l| self.is_sign_in_url(l)) {
                return Err(ApiError::login_rejected("invalid email or password"));
            }
        } else if status.is_success() {
            let body = response.text().await.map_err(network)?;
            if self.parser.is_sign_in_form(&body) {
                let message = self
                    .parser
                    .login_error(&body)
                    .unwrap_or_else(|| "invalid email or password".to_string());
                return Err(ApiError::login_rejected(&message));
            }
        } else {
            let body = response.text().await.unwrap_or_default();
            let message = self
                .parser
                .login_error(&body)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            return Err(ApiError::login_rejected(&message));
        }

        let token = token.ok_or_else(|| {
            ApiError::Auth("no session cookie received from login".to_string())
        })?;
        info!("Login successful");
        Ok(SessionData::new(token))
    }

    // ===== Pages =====

    /// Fetch a page's HTML with the session cookie attached
    pub async fn fetch_page(&self, url: &Url, session: &SessionData) -> ApiResult<String> {
        debug!(url = %url, "Fetching page");
        let response = self
            .client
            .get(url.clone())
            .timeout(self.request_timeout)
            .header(header::COOKIE, session.cookie_header(&self.cookie_name))
            .send()
            .await?;

        if self.is_sign_in_url(response.url()) && !self.is_sign_in_url(url) {
            return Err(Self::session_rejected());
        }
        let response = Self::check_response(response)?;
        Ok(response.text().await?)
    }

    // ===== Downloads =====

    fn location(response: &Response) -> Option<Url> {
        let raw = response.headers().get(header::LOCATION)?.to_str().ok()?;
        response.url().join(raw.trim()).ok()
    }

    /// Follow the download link's redirects to the direct asset URL.
    ///
    /// Same-site hops are requested in turn; the first hop leaving the site
    /// is the asset URL and is returned without being requested.
    pub async fn resolve_asset(&self, download_url: &Url, session: &SessionData) -> ApiResult<Url> {
        let mut current = download_url.clone();

        for hop in 0..MAX_REDIRECT_HOPS {
            debug!(url = %current, hop = hop, "Resolving download redirect");
            let mut request = self
                .no_redirect
                .get(current.clone())
                .timeout(self.request_timeout);
            if self.is_platform_url(&current) {
                request = request.header(header::COOKIE, session.cookie_header(&self.cookie_name));
            }
            let response = request.send().await?;
            let status = response.status();

            if status.is_redirection() {
                let target = Self::location(&response).ok_or_else(|| {
                    ApiError::Resolve(format!("redirect from {} has no Location header", current))
                })?;
                if self.is_sign_in_url(&target) {
                    return Err(Self::session_rejected());
                }
                if !self.is_platform_url(&target) {
                    debug!(from = %download_url, to = %target, "Resolved direct asset URL");
                    return Ok(target);
                }
                current = target;
            } else if status.is_success() {
                if hop == 0 {
                    return Err(ApiError::Resolve(format!(
                        "{} answered {} instead of redirecting to the video",
                        current, status
                    )));
                }
                // Served directly after same-site hops
                return Ok(current);
            } else {
                return Err(ApiError::from_status(status, current.as_str()));
            }
        }

        Err(ApiError::Resolve(format!(
            "more than {} redirects resolving {}",
            MAX_REDIRECT_HOPS, download_url
        )))
    }

    /// Open a streaming GET for an asset. The session cookie is only sent to the platform.
    pub async fn open_stream(&self, url: &Url, session: &SessionData) -> ApiResult<Response> {
        let mut request = self.client.get(url.clone());
        if self.is_platform_url(url) {
            request = request.header(header::COOKIE, session.cookie_header(&self.cookie_name));
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() && !self.is_platform_url(response.url()) {
            // Expired signed CDN links answer 403; that is not a session problem
            return Err(ApiError::Fetch {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }
        Self::check_response(response)
    }
}
