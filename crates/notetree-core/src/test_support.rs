//! In-crate fakes shared by unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::session::{CredentialContext, MemoryNavigator, MemoryStore};
use crate::transport::{HttpBackend, HttpRequest, HttpResponse, Transport};

pub const TEST_BASE_URL: &str = "https://notes.example.com";

/// Backend answering from a queue of canned responses and recording requests
#[derive(Clone, Default)]
pub struct FakeBackend {
    responses: Arc<Mutex<VecDeque<Result<HttpResponse>>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl FakeBackend {
    pub fn push(&self, response: HttpResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_error(&self, error: Error) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }

    pub fn last_json_body(&self) -> serde_json::Value {
        match self.last_request().body {
            Some(crate::transport::OutgoingBody::Bytes(bytes)) => {
                serde_json::from_slice(&bytes).expect("body is not JSON")
            }
            other => panic!("unexpected body {other:?}"),
        }
    }
}

#[async_trait]
impl HttpBackend for FakeBackend {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Network("no canned response".to_string())))
    }
}

pub fn response(status: u16, content_type: Option<&str>, body: &str) -> HttpResponse {
    let mut response = HttpResponse {
        status: StatusCode::from_u16(status).unwrap(),
        headers: reqwest::header::HeaderMap::new(),
        body: body.as_bytes().to_vec(),
    };
    if let Some(content_type) = content_type {
        response
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
    }
    response
}

pub fn json_response(status: u16, body: &serde_json::Value) -> HttpResponse {
    response(status, Some("application/json; charset=utf-8"), &body.to_string())
}

impl HttpResponse {
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.append(
            HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_str(value).unwrap(),
        );
        self
    }
}

/// Transport wired to a fake backend, a memory store and a memory navigator
pub struct TestHarness {
    pub backend: FakeBackend,
    pub store: MemoryStore,
    pub credentials: CredentialContext,
    pub navigator: MemoryNavigator,
    pub transport: Transport,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_navigator(MemoryNavigator::new("/"))
    }

    pub fn with_navigator(navigator: MemoryNavigator) -> Self {
        let backend = FakeBackend::default();
        let store = MemoryStore::new();
        let credentials = CredentialContext::init(Arc::new(store.clone()));
        let config = ClientConfig::new(TEST_BASE_URL).validate().unwrap();
        let transport = Transport::new(
            config,
            Arc::new(backend.clone()),
            credentials.clone(),
            Arc::new(navigator.clone()),
        );
        Self {
            backend,
            store,
            credentials,
            navigator,
            transport,
        }
    }
}
