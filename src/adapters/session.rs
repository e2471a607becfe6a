//! Cookie-authenticated access to the intranet module list.

use crate::config::toml_config::PortalConfig;
use crate::core::semester::select_semester;
use crate::domain::model::{ModulesPayload, RawRecord, SemesterRecords};
use crate::utils::error::{Result, StrategyError};
use regex::Regex;
use reqwest::{header, Client, StatusCode};
use std::sync::OnceLock;
use std::time::Duration;

const ACCEPT_JSON: &str = "application/json, text/javascript, */*; q=0.01";
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/144.0.0.0 Safari/537.36";

fn user_token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?:^|;)\s*user=([^;]*)").unwrap())
}

fn auth_error(message: &str) -> StrategyError {
    StrategyError::AuthenticationError {
        status: None,
        message: message.to_string(),
    }
}

/// Accepts a full `Cookie` header value or the bare `user` token.
pub fn normalize_cookie(raw: &str) -> Result<String> {
    let cookie = raw.trim();
    if cookie.is_empty() {
        return Err(auth_error("no cookie supplied"));
    }
    if cookie.chars().any(|c| c.is_control()) {
        return Err(auth_error("cookie contains control characters"));
    }

    if let Some(captures) = user_token_pattern().captures(cookie) {
        if captures[1].trim().is_empty() {
            return Err(auth_error("the `user` session token is empty"));
        }
        return Ok(cookie.to_string());
    }

    if cookie.contains('=') || cookie.contains(';') {
        return Err(auth_error("cookie has no `user` session token"));
    }

    Ok(format!("user={}; gdpr=1", cookie))
}

/// Decode the module list body. An HTML page means the session was
/// redirected to the login form.
pub fn parse_modules_payload(body: &str) -> Result<Vec<RawRecord>> {
    if body.trim_start().starts_with('<') {
        return Err(auth_error(
            "the intranet answered with an HTML page instead of JSON",
        ));
    }
    let payload: ModulesPayload = serde_json::from_str(body)?;
    Ok(payload.into_records())
}

pub struct SessionClient {
    client: Client,
    cookie: String,
    modules_url: String,
    referer: String,
    location: Option<String>,
}

impl SessionClient {
    pub fn new(cookie: impl Into<String>, portal: &PortalConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(portal.timeout_seconds))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            cookie: cookie.into(),
            modules_url: portal.modules_url(),
            referer: format!("{}/module/", portal.base_url.trim_end_matches('/')),
            location: portal.location_filter().map(str::to_string),
        })
    }

    /// Every module the portal lists for the student, all semesters mixed.
    pub async fn current_modules(&self) -> Result<Vec<RawRecord>> {
        let cookie = normalize_cookie(&self.cookie)?;

        tracing::debug!("Making API request to: {}", self.modules_url);
        let response = self
            .client
            .get(&self.modules_url)
            .header(header::COOKIE, cookie)
            .header(header::ACCEPT, ACCEPT_JSON)
            .header(header::REFERER, self.referer.as_str())
            .header("X-Requested-With", "XMLHttpRequest")
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(StrategyError::AuthenticationError {
                status: Some(status.as_u16()),
                message: status.canonical_reason().unwrap_or("unauthorized").to_string(),
            });
        }
        if !status.is_success() {
            return Err(StrategyError::HttpStatusError {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        let body = response.text().await?;
        parse_modules_payload(&body)
    }

    /// Module records of `semester`, or of the latest listed semester.
    pub async fn fetch(&self, semester: Option<u32>) -> Result<SemesterRecords> {
        let records = self.current_modules().await?;
        tracing::info!("Connection OK - {} modules listed", records.len());

        let mut selected = select_semester(records, semester)?;
        if semester.is_none() {
            tracing::info!("Auto-detected latest semester: {}", selected.semester);
        }

        let listed = selected.records.len();
        selected
            .records
            .retain(|record| record.is_relevant(self.location.as_deref()));
        tracing::info!(
            "Semester {}: {} of {} modules carry credits{}",
            selected.semester,
            selected.records.len(),
            listed,
            self.location
                .as_deref()
                .map(|location| format!(" at {}", location))
                .unwrap_or_default()
        );

        Ok(selected)
    }
}
