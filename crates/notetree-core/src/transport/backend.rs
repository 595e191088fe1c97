//! Network primitive behind the transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

use super::{FormData, FormValue, HttpRequest, HttpResponse, OutgoingBody};
use crate::error::Result;

/// Sends one fully built request and buffers the response.
#[async_trait]
pub trait HttpBackend: Send + Sync + 'static {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Production backend over `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    client: Client,
}

impl ReqwestBackend {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
        })
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);

        builder = match request.body {
            None => builder,
            Some(OutgoingBody::Bytes(bytes)) => builder.body(bytes),
            Some(OutgoingBody::Multipart(form)) => builder.multipart(into_multipart(form)?),
        };

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn into_multipart(form: FormData) -> Result<Form> {
    let mut multipart = Form::new();
    for part in form.parts {
        multipart = match part.value {
            FormValue::Text(value) => multipart.text(part.name, value),
            FormValue::File {
                filename,
                content_type,
                bytes,
            } => {
                let mut file = Part::bytes(bytes).file_name(filename);
                if let Some(content_type) = content_type {
                    file = file.mime_str(&content_type)?;
                }
                multipart.part(part.name, file)
            }
        };
    }
    Ok(multipart)
}
