//! Authenticated HTTP transport.
//!
//! Every call made by the resource clients goes through [`Transport`], which:
//!
//! 1. prefixes the path with the configured API root,
//! 2. attaches the stored token, tenant code and session cookie,
//! 3. encodes the body (JSON, raw bytes or multipart form),
//! 4. classifies the response into a [`Payload`] or an [`Error`],
//! 5. clears local credentials and redirects to the login view on 401.

mod backend;
mod download;

use std::sync::Arc;

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::session::{CredentialContext, Navigator};
use crate::util::compact_text;

pub use backend::{HttpBackend, ReqwestBackend};
pub use download::{
    filename_from_disposition, filename_from_path, is_downloadable, resolve_filename,
    DirectorySink, DownloadSink, DownloadedFile, DEFAULT_DOWNLOAD_NAME,
};
pub use reqwest::{Method, StatusCode};

const JSON_MEDIA_TYPE: &str = "application/json";

/// Request as handed to the [`HttpBackend`]
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<OutgoingBody>,
}

/// Encoded request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutgoingBody {
    Bytes(Vec<u8>),
    Multipart(FormData),
}

/// Fully buffered response returned by the [`HttpBackend`]
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Multipart form payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    pub parts: Vec<FormPart>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub value: FormValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File {
        filename: String,
        content_type: Option<String>,
        bytes: Vec<u8>,
    },
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            value: FormValue::Text(value.into()),
        });
        self
    }

    #[must_use]
    pub fn file(
        mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: Option<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            value: FormValue::File {
                filename: filename.into(),
                content_type,
                bytes,
            },
        });
        self
    }
}

/// Body supplied by a caller
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Structured value, encoded as JSON text
    Json(Value),
    /// Pre-encoded bytes, sent as is
    Raw(Vec<u8>),
    /// Multipart form; the HTTP stack writes the content type and boundary
    Form(FormData),
}

/// Per-call headers and body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn json<T: Serialize + ?Sized>(body: &T) -> Result<Self> {
        Ok(Self {
            headers: Vec::new(),
            body: Some(RequestBody::Json(serde_json::to_value(body)?)),
        })
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }
}

/// Classified success result of a request
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// 204 No Content
    Empty,
    /// No content type was declared
    Text(String),
    Json(Value),
    File(DownloadedFile),
    /// A content type this client does not interpret; kept for inspection
    Unsupported {
        content_type: String,
        body: Vec<u8>,
    },
}

impl Payload {
    /// Decode into a caller-declared shape.
    ///
    /// Empty and blank text decode from `null`; text that is not JSON decodes
    /// as a JSON string. Files and unsupported content are decode errors.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T> {
        let value = match self {
            Self::Empty => Value::Null,
            Self::Json(value) => value,
            Self::Text(text) => {
                if text.trim().is_empty() {
                    Value::Null
                } else {
                    match serde_json::from_str::<Value>(&text) {
                        Ok(value) => value,
                        Err(_) => Value::String(text),
                    }
                }
            }
            Self::File(file) => {
                return Err(Error::Decode(format!(
                    "expected structured data, received file '{}' ({})",
                    file.filename, file.content_type
                )));
            }
            Self::Unsupported { content_type, .. } => {
                return Err(Error::Decode(format!(
                    "unsupported response content type '{content_type}'"
                )));
            }
        };
        serde_json::from_value(value).map_err(|error| Error::Decode(error.to_string()))
    }
}

/// Shared, cloneable HTTP transport
#[derive(Clone)]
pub struct Transport {
    backend: Arc<dyn HttpBackend>,
    config: Arc<ClientConfig>,
    credentials: CredentialContext,
    navigator: Arc<dyn Navigator>,
    download_sink: Option<Arc<dyn DownloadSink>>,
}

impl Transport {
    pub fn new(
        config: ClientConfig,
        backend: Arc<dyn HttpBackend>,
        credentials: CredentialContext,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            backend,
            config: Arc::new(config),
            credentials,
            navigator,
            download_sink: None,
        }
    }

    #[must_use]
    pub fn with_download_sink(mut self, sink: Arc<dyn DownloadSink>) -> Self {
        self.download_sink = Some(sink);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub const fn credentials(&self) -> &CredentialContext {
        &self.credentials
    }

    pub fn navigator(&self) -> Arc<dyn Navigator> {
        Arc::clone(&self.navigator)
    }

    /// Send a request and classify the response.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<Payload> {
        let request = self.build_request(method, path, options)?;
        tracing::debug!(method = %request.method, path, "Sending request");

        let response = self.backend.send(request).await.inspect_err(|error| {
            tracing::warn!(path, "Request did not complete: {}", error);
        })?;
        self.classify(path, response)
    }

    /// Send a request and decode the payload into `T`.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<T> {
        self.request(method, path, options).await?.decode()
    }

    /// Send a request whose success payload carries nothing of interest.
    pub async fn request_unit(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<()> {
        self.request(method, path, options).await.map(|_| ())
    }

    fn build_request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<HttpRequest> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_MEDIA_TYPE));

        if let Some(code) = self.credentials.tenant_code()? {
            let name = HeaderName::from_bytes(self.config.tenant_header.as_bytes())
                .map_err(|error| Error::InvalidConfiguration(error.to_string()))?;
            headers.insert(name, header_value(&code)?);
        }
        if let Some(token) = self.credentials.token()? {
            headers.insert(AUTHORIZATION, header_value(&token)?);
        }
        if let Some(cookie) = self.credentials.session_cookie()? {
            headers.insert(COOKIE, header_value(&cookie)?);
        }

        let mut caller_content_type = false;
        for (name, value) in options.headers {
            let name = HeaderName::from_bytes(name.trim().as_bytes())
                .map_err(|error| Error::InvalidInput(format!("invalid header name: {error}")))?;
            caller_content_type |= name == CONTENT_TYPE;
            headers.insert(name, header_value(&value)?);
        }

        let body = match options.body {
            None => None,
            Some(RequestBody::Json(value)) => {
                let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
                if !content_type.is_some_and(is_json_media_type) {
                    return Err(Error::InvalidInput(format!(
                        "structured body requires a JSON content type, got {}",
                        content_type.unwrap_or("none")
                    )));
                }
                Some(OutgoingBody::Bytes(serde_json::to_vec(&value)?))
            }
            Some(RequestBody::Raw(bytes)) => {
                if !caller_content_type {
                    headers.remove(CONTENT_TYPE);
                }
                Some(OutgoingBody::Bytes(bytes))
            }
            Some(RequestBody::Form(form)) => {
                headers.remove(CONTENT_TYPE);
                Some(OutgoingBody::Multipart(form))
            }
        };

        Ok(HttpRequest {
            method,
            url: self.config.endpoint(path),
            headers,
            body,
        })
    }

    fn classify(&self, path: &str, response: HttpResponse) -> Result<Payload> {
        let status = response.status;

        if !status.is_success() {
            let text = response.text();
            if status == StatusCode::UNAUTHORIZED {
                self.handle_auth_failure();
                return Err(Error::AuthExpired { message: text });
            }

            tracing::debug!(path, status = status.as_u16(), "Request failed: {}", compact_text(&text));
            let message = if text.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            } else {
                text
            };
            return Err(Error::Http { status, message });
        }

        self.remember_session_cookie(&response.headers);

        if status == StatusCode::NO_CONTENT {
            return Ok(Payload::Empty);
        }

        let Some(content_type) = response
            .headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string)
        else {
            return Ok(Payload::Text(response.text()));
        };

        if is_json_media_type(&content_type) {
            let value = serde_json::from_slice(&response.body)
                .map_err(|error| Error::Decode(format!("invalid JSON response: {error}")))?;
            return Ok(Payload::Json(value));
        }

        if is_downloadable(&content_type) {
            let filename = resolve_filename(&response.headers, path);
            let saved_to = self.download_sink.as_ref().and_then(|sink| {
                sink.save(&filename, &response.body)
                    .inspect_err(|error| {
                        tracing::warn!("Failed to save download '{}': {}", filename, error);
                    })
                    .ok()
            });
            return Ok(Payload::File(DownloadedFile {
                filename,
                content_type,
                bytes: response.body,
                saved_to,
            }));
        }

        tracing::warn!(path, "Ignoring response with unsupported content type {}", content_type);
        Ok(Payload::Unsupported {
            content_type,
            body: response.body,
        })
    }

    /// Clear all local session state and send the user to the login view,
    /// unless they are already there.
    fn handle_auth_failure(&self) {
        tracing::warn!("Authentication expired; clearing stored credentials");
        if let Err(error) = self.credentials.clear() {
            tracing::error!("Failed to clear stored credentials: {}", error);
        }

        let login_path = &self.config.login_path;
        if self.navigator.current_path() != *login_path {
            self.navigator.redirect(login_path);
        }
    }

    fn remember_session_cookie(&self, headers: &HeaderMap) {
        for value in headers.get_all(SET_COOKIE) {
            let Some(update) = value.to_str().ok().and_then(parse_set_cookie) else {
                continue;
            };
            let result = match update {
                CookieUpdate::Set(pair) => self.credentials.set_session_cookie(&pair),
                CookieUpdate::Expire => self.credentials.remove_session_cookie(),
            };
            if let Err(error) = result {
                tracing::warn!("Failed to persist session cookie: {}", error);
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum CookieUpdate {
    Set(String),
    Expire,
}

fn parse_set_cookie(raw: &str) -> Option<CookieUpdate> {
    let mut segments = raw.split(';');
    let pair = segments.next()?.trim();
    if !pair.contains('=') || pair.starts_with('=') {
        return None;
    }

    let expired = segments.any(|attribute| {
        let attribute = attribute.trim();
        attribute
            .split_once('=')
            .filter(|(name, _)| name.trim().eq_ignore_ascii_case("max-age"))
            .and_then(|(_, value)| value.trim().parse::<i64>().ok())
            .is_some_and(|max_age| max_age <= 0)
    });

    if expired {
        Some(CookieUpdate::Expire)
    } else {
        Some(CookieUpdate::Set(pair.to_string()))
    }
}

fn is_json_media_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|media_type| media_type.trim().eq_ignore_ascii_case(JSON_MEDIA_TYPE))
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value.trim())
        .map_err(|error| Error::InvalidInput(format!("invalid header value: {error}")))
}
