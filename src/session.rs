/*!
 * Browser session abstraction.
 *
 * Crawlers, gateways and translators all drive a page through the
 * [`BrowserSession`] trait: navigate, read the rendered source, fill a form
 * field, click an element. Two implementations exist:
 *
 * - [`HttpSession`]: plain reqwest fetches for pages that do not need
 *   client-side rendering. Form interaction is reported as unsupported
 *   (callers treat a missing field as non-fatal).
 * - [`RemoteSession`]: a thin W3C WebDriver client for pages that do.
 *
 * A session is a single-mutator resource: all operations for one document
 * request go through one `&mut` session, serialized by the caller.
 */

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use serde_json::{Value, json};

use crate::errors::SessionError;

/// Which driver backs a [`BrowserSession`].
///
/// Resolved once at startup via [`probe_driver`] and injected into session
/// construction; never re-detected mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverKind {
    /// Plain HTTP fetches, no JavaScript execution
    Http,
    /// Remote WebDriver endpoint (chromedriver / selenium)
    Remote,
}

/// Capability interface over a navigating session.
#[async_trait]
pub trait BrowserSession: Send {
    /// Navigate to `url`.
    async fn navigate(&mut self, url: &str) -> Result<(), SessionError>;

    /// Re-request the current page.
    async fn refresh(&mut self) -> Result<(), SessionError>;

    /// URL after redirects of the last navigation.
    fn current_url(&self) -> &str;

    /// Rendered page source of the current page.
    async fn page_source(&mut self) -> Result<String, SessionError>;

    /// Fill the form field with DOM id `field_id`. Returns `Ok(false)` when
    /// the field does not exist; callers log and continue.
    async fn fill_field(&mut self, field_id: &str, value: &str) -> Result<bool, SessionError>;

    /// Click the element with DOM id `element_id`. Returns `Ok(false)` when
    /// the element does not exist.
    async fn click(&mut self, element_id: &str) -> Result<bool, SessionError>;
}

/// Session backed by plain HTTP fetches.
pub struct HttpSession {
    client: reqwest::Client,
    current_url: String,
    source: String,
}

impl HttpSession {
    /// Create a session with explicit connect/read timeouts.
    pub fn new(connect_timeout: Duration, request_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .cookie_store(true)
            .build()
            .unwrap_or_default();
        HttpSession { client, current_url: String::new(), source: String::new() }
    }

    /// The underlying HTTP client, shared with direct-fetch helpers.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

impl Default for HttpSession {
    fn default() -> Self {
        Self::new(Duration::from_secs(10), Duration::from_secs(30))
    }
}

#[async_trait]
impl BrowserSession for HttpSession {
    async fn navigate(&mut self, url: &str) -> Result<(), SessionError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SessionError::Navigation(e.to_string()))?;
        self.current_url = response.url().to_string();
        self.source = response
            .text()
            .await
            .map_err(|e| SessionError::Navigation(e.to_string()))?;
        debug!("fetched {} ({} bytes)", self.current_url, self.source.len());
        Ok(())
    }

    async fn refresh(&mut self) -> Result<(), SessionError> {
        if self.current_url.is_empty() {
            return Ok(());
        }
        let url = self.current_url.clone();
        self.navigate(&url).await
    }

    fn current_url(&self) -> &str {
        &self.current_url
    }

    async fn page_source(&mut self) -> Result<String, SessionError> {
        Ok(self.source.clone())
    }

    async fn fill_field(&mut self, field_id: &str, _value: &str) -> Result<bool, SessionError> {
        warn!("http session cannot fill form field '{}'", field_id);
        Ok(false)
    }

    async fn click(&mut self, element_id: &str) -> Result<bool, SessionError> {
        warn!("http session cannot click element '{}'", element_id);
        Ok(false)
    }
}

/// Minimal W3C WebDriver client for pages that require client-side rendering.
///
/// Speaks just the handful of endpoints the pipeline needs: new session,
/// navigate, current URL, page source, find element by id, send keys, click.
pub struct RemoteSession {
    client: reqwest::Client,
    endpoint: String,
    session_id: String,
    current_url: String,
    load_wait: Duration,
}

impl RemoteSession {
    /// Open a WebDriver session against `endpoint` (e.g.
    /// `http://localhost:9515`), waiting `load_wait` after each navigation
    /// for client-side rendering to settle.
    pub async fn connect(endpoint: &str, load_wait: Duration) -> Result<Self, SessionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_default();
        let body = json!({
            "capabilities": {
                "alwaysMatch": {
                    "goog:chromeOptions": { "args": ["--headless=new", "--disable-gpu"] }
                }
            }
        });
        let value = post_json(&client, &format!("{}/session", endpoint.trim_end_matches('/')), &body)
            .await?;
        let session_id = value
            .pointer("/value/sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| SessionError::Protocol("no sessionId in response".to_string()))?
            .to_string();
        Ok(RemoteSession {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            session_id,
            current_url: String::new(),
            load_wait,
        })
    }

    fn url(&self, tail: &str) -> String {
        format!("{}/session/{}{}", self.endpoint, self.session_id, tail)
    }

    async fn find_element(&self, element_id: &str) -> Result<Option<String>, SessionError> {
        let body = json!({ "using": "css selector", "value": format!("#{}", element_id) });
        let value = match post_json(&self.client, &self.url("/element"), &body).await {
            Ok(v) => v,
            // "no such element" comes back as an error payload; treat as absent.
            Err(SessionError::Protocol(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        let handle = value
            .pointer("/value")
            .and_then(Value::as_object)
            .and_then(|o| o.values().next())
            .and_then(Value::as_str)
            .map(str::to_string);
        Ok(handle)
    }
}

async fn post_json(
    client: &reqwest::Client,
    url: &str,
    body: &Value,
) -> Result<Value, SessionError> {
    let response = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|e| SessionError::Navigation(e.to_string()))?;
    let status = response.status();
    let value: Value = response
        .json()
        .await
        .map_err(|e| SessionError::Protocol(e.to_string()))?;
    if !status.is_success() {
        return Err(SessionError::Protocol(format!("{}: {}", status, value)));
    }
    Ok(value)
}

async fn get_json(client: &reqwest::Client, url: &str) -> Result<Value, SessionError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| SessionError::Navigation(e.to_string()))?;
    response
        .json()
        .await
        .map_err(|e| SessionError::Protocol(e.to_string()))
}

#[async_trait]
impl BrowserSession for RemoteSession {
    async fn navigate(&mut self, url: &str) -> Result<(), SessionError> {
        post_json(&self.client, &self.url("/url"), &json!({ "url": url })).await?;
        tokio::time::sleep(self.load_wait).await;
        let value = get_json(&self.client, &self.url("/url")).await?;
        self.current_url = value
            .pointer("/value")
            .and_then(Value::as_str)
            .unwrap_or(url)
            .to_string();
        Ok(())
    }

    async fn refresh(&mut self) -> Result<(), SessionError> {
        post_json(&self.client, &self.url("/refresh"), &json!({})).await?;
        tokio::time::sleep(self.load_wait).await;
        Ok(())
    }

    fn current_url(&self) -> &str {
        &self.current_url
    }

    async fn page_source(&mut self) -> Result<String, SessionError> {
        let value = get_json(&self.client, &self.url("/source")).await?;
        value
            .pointer("/value")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| SessionError::Protocol("no page source in response".to_string()))
    }

    async fn fill_field(&mut self, field_id: &str, value: &str) -> Result<bool, SessionError> {
        let Some(handle) = self.find_element(field_id).await? else {
            return Ok(false);
        };
        let body = json!({ "text": value });
        post_json(&self.client, &self.url(&format!("/element/{}/value", handle)), &body).await?;
        Ok(true)
    }

    async fn click(&mut self, element_id: &str) -> Result<bool, SessionError> {
        let Some(handle) = self.find_element(element_id).await? else {
            return Ok(false);
        };
        post_json(&self.client, &self.url(&format!("/element/{}/click", handle)), &json!({}))
            .await?;
        Ok(true)
    }
}

/// Probe which driver kind is available: a WebDriver endpoint that answers
/// `/status` wins, otherwise fall back to plain HTTP fetches.
///
/// Called once at startup; the result is carried in the configuration rather
/// than re-probed by each component.
pub async fn probe_driver(webdriver_url: &str) -> DriverKind {
    if webdriver_url.is_empty() {
        return DriverKind::Http;
    }
    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(2))
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap_or_default();
    let status_url = format!("{}/status", webdriver_url.trim_end_matches('/'));
    match client.get(&status_url).send().await {
        Ok(response) if response.status().is_success() => DriverKind::Remote,
        _ => {
            debug!("no webdriver at {}, using http fetches", webdriver_url);
            DriverKind::Http
        }
    }
}
