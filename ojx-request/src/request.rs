// Copyright 2025 ojx developers.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::Error;
use async_trait::async_trait;
use axum::http::Method;
use axum::http::header::HeaderMap;
use axum::http::uri::Uri;
use bytes::Bytes;
use reqwest::Client as ReqwestClient;
use reqwest::RequestBuilder;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use ojx_util::{Stopwatch, json_get};
use tracing::info;

type Result<T> = std::result::Result<T, Error>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// Default empty query and body parameters
static EMPTY_QUERY: Option<&[(&str, &str)]> = None;
static EMPTY_BODY: Option<&[(&str, &str)]> = None;

/// Request parameters structure
/// Generic over query (Q) and body (P) types that must be serializable
#[derive(Clone, Debug, Default)]
pub struct Params<'a, Q, P>
where
    Q: Serialize + ?Sized,
    P: Serialize + ?Sized,
{
    // http method
    pub method: Method,
    // request timeout
    pub timeout: Option<Duration>,
    // query parameters
    pub query: Option<&'a Q>,
    // request body
    pub body: Option<&'a P>,
    // extra headers for this request only
    pub headers: Option<HeaderMap>,
    // request url
    pub url: &'a str,
}

/// Statistics for HTTP requests
#[derive(Default, Clone, Debug)]
pub struct HttpStats {
    pub method: String,
    pub path: String,
    pub remote_addr: String,
    pub status: u16,
    pub content_length: usize,
    pub processing: u32,
    pub transfer: u32,
    pub total: u32,
}

/// HTTP interceptor trait for request modification and monitoring
#[async_trait]
pub trait HttpInterceptor: Send + Sync {
    // Modify outgoing requests
    async fn request(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        Ok(req)
    }
    // Handle request completion
    async fn on_done(&self, _stats: &HttpStats, _err: Option<&Error>) -> Result<()> {
        Ok(())
    }
}

/// Default interceptor implementation with logging
pub struct CommonInterceptor {
    service: String,
}

impl CommonInterceptor {
    pub fn new(service: &str) -> CommonInterceptor {
        CommonInterceptor {
            service: service.to_string(),
        }
    }
}

#[async_trait]
impl HttpInterceptor for CommonInterceptor {
    async fn on_done(&self, stats: &HttpStats, err: Option<&Error>) -> Result<()> {
        let error = err.map(ToString::to_string);
        info!(
            service = self.service,
            method = stats.method,
            path = stats.path,
            status = stats.status,
            remote_addr = stats.remote_addr,
            content_length = stats.content_length,
            processing = stats.processing,
            transfer = stats.transfer,
            total = stats.total,
            error,
        );
        Ok(())
    }
}

/// HTTP client configuration
struct ClientConfig {
    service: String,
    base_url: String,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    headers: Option<HeaderMap>,
    interceptors: Option<Vec<Box<dyn HttpInterceptor>>>,
}

/// Builder for HTTP client configuration
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    pub fn new(service: &str) -> Self {
        Self {
            config: ClientConfig {
                service: service.to_string(),
                base_url: "".to_string(),
                timeout: None,
                connect_timeout: None,
                headers: None,
                interceptors: None,
            },
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.config.base_url = base_url.to_string();
        self
    }

    pub fn with_interceptor(mut self, interceptor: Box<dyn HttpInterceptor>) -> Self {
        self.config
            .interceptors
            .get_or_insert_with(Vec::new)
            .push(interceptor);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.config.connect_timeout = Some(connect_timeout);
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.config.headers = Some(headers);
        self
    }

    pub fn with_common_interceptor(self) -> Self {
        let service = self.config.service.clone();
        self.with_interceptor(Box::new(CommonInterceptor::new(&service)))
    }

    pub fn build(mut self) -> Result<Client> {
        let mut builder = ReqwestClient::builder()
            .user_agent(format!("ojx-request/{VERSION}"))
            .referer(false);
        if let Some(timeout) = self.config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(headers) = self.config.headers.take() {
            builder = builder.default_headers(headers.clone());
        }
        if let Some(connect_timeout) = self.config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        let client = builder.build().map_err(|e| Error::Build {
            service: self.config.service.clone(),
            source: e,
        })?;
        Ok(Client {
            client,
            config: self.config,
        })
    }
}

/// HTTP client implementation, a thin service-aware wrapper over reqwest
pub struct Client {
    client: ReqwestClient,
    config: ClientConfig,
}

impl Client {
    /// Constructs full URL from base URL and path
    fn get_url(&self, url: &str) -> String {
        if url.starts_with("http") {
            url.to_string()
        } else {
            self.config.base_url.to_string() + url
        }
    }
    /// Makes raw HTTP request and returns the response bytes. A non-success
    /// status surfaces as `Error::Status` so callers can distinguish an
    /// upstream rejection from a transport failure.
    async fn raw<Q, P>(&self, stats: &mut HttpStats, params: Params<'_, Q, P>) -> Result<Bytes>
    where
        Q: Serialize + ?Sized,
        P: Serialize + ?Sized,
    {
        let url = self.get_url(params.url);
        let uri = url.parse::<Uri>().map_err(|e| Error::Uri {
            service: self.config.service.clone(),
            source: e,
        })?;
        let path = uri.path();
        stats.path = path.to_string();
        stats.method = params.method.to_string();

        let mut req = match params.method {
            Method::POST => self.client.post(url),
            Method::PUT => self.client.put(url),
            Method::PATCH => self.client.patch(url),
            Method::DELETE => self.client.delete(url),
            _ => self.client.get(url),
        };
        if let Some(value) = params.timeout {
            req = req.timeout(value);
        }
        if let Some(value) = params.headers {
            req = req.headers(value);
        }
        if let Some(value) = params.query {
            req = req.query(value);
        }
        if let Some(value) = params.body {
            req = req.json(value);
        }
        if let Some(interceptors) = &self.config.interceptors {
            for interceptor in interceptors {
                req = interceptor.request(req).await?;
            }
        }
        let process_done = Stopwatch::new();
        let res = req.send().await.map_err(|e| Error::Request {
            service: self.config.service.clone(),
            path: path.to_string(),
            source: e,
        })?;

        stats.processing = process_done.elapsed_ms();

        if let Some(remote_addr) = res.remote_addr() {
            stats.remote_addr = remote_addr.to_string();
        }

        let status = res.status().as_u16();
        let transfer_done = Stopwatch::new();
        let full = res.bytes().await.map_err(|e| Error::Request {
            service: self.config.service.clone(),
            path: path.to_string(),
            source: e,
        })?;
        stats.transfer = transfer_done.elapsed_ms();
        stats.content_length = full.len();
        stats.status = status;

        if status >= 400 {
            let mut message = json_get(&full, "message");
            if message.is_empty() {
                message = json_get(&full, "detail");
            }
            if message.is_empty() {
                message = "unknown error".to_string();
            }
            return Err(Error::Status {
                service: self.config.service.clone(),
                path: path.to_string(),
                status,
                message,
            });
        }
        Ok(full)
    }

    async fn request<Q, P, T>(&self, params: Params<'_, Q, P>) -> Result<T>
    where
        Q: Serialize + ?Sized,
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut stats = HttpStats {
            ..Default::default()
        };
        let done = Stopwatch::new();
        let result = self.raw(&mut stats, params).await;
        stats.total = done.elapsed_ms();
        let mut err = None;
        if let Err(ref e) = result {
            err = Some(e)
        }
        if let Some(interceptors) = &self.config.interceptors {
            for interceptor in interceptors {
                interceptor.on_done(&stats, err).await?;
            }
        }
        let full = result?;
        serde_json::from_slice(&full).map_err(|e| Error::Serde {
            service: self.config.service.clone(),
            source: e,
        })
    }

    /// Makes GET request and deserializes response
    pub async fn get<T>(&self, url: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.request(Params {
            timeout: None,
            method: Method::GET,
            url,
            query: EMPTY_QUERY,
            body: EMPTY_BODY,
            headers: None,
        })
        .await
    }
    /// Makes POST request with JSON body and deserializes response
    pub async fn post<P, T>(&self, url: &str, json: &P) -> Result<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Params {
            timeout: None,
            method: Method::POST,
            url,
            query: EMPTY_QUERY,
            body: Some(json),
            headers: None,
        })
        .await
    }
    /// Makes POST request with JSON body, per-request headers and timeout
    pub async fn post_with_headers<P, T>(
        &self,
        url: &str,
        json: &P,
        headers: HeaderMap,
        timeout: Option<Duration>,
    ) -> Result<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Params {
            timeout,
            method: Method::POST,
            url,
            query: EMPTY_QUERY,
            body: Some(json),
            headers: Some(headers),
        })
        .await
    }
}
