//! The HTTP seam between the scraper and the network.
//!
//! Station lookups and observation fetches only need "send a GET or POST,
//! get back a status and a body". [`HttpTransport`] captures exactly that so
//! the pipeline can run against [`ReqwestTransport`] in production and a
//! scripted transport in tests.

use crate::config::ScraperConfig;
use log::debug;
use reqwest::{Client, RequestBuilder, StatusCode};
use std::future::Future;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, body)
    }
}

/// The request never produced a response (connection, timeout, body read).
#[derive(Debug, Error)]
#[error("Network request failed for {url}")]
pub struct TransportError {
    pub url: String,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl TransportError {
    pub fn new(url: &str, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            url: url.to_string(),
            source: source.into(),
        }
    }
}

pub trait HttpTransport {
    fn get(&self, url: &str) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;

    fn post(&self, url: &str) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// [`HttpTransport`] over a shared `reqwest` client carrying the configured
/// user agent and per-request timeout.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &ScraperConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { client })
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> Result<HttpResponse, TransportError> {
        let response = request
            .send()
            .await
            .map_err(|e| TransportError::new(url, e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::new(url, e))?;
        debug!("{} answered {} ({} bytes)", url, status, body.len());
        Ok(HttpResponse { status, body })
    }
}

impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        self.send(self.client.get(url), url).await
    }

    async fn post(&self, url: &str) -> Result<HttpResponse, TransportError> {
        self.send(self.client.post(url), url).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    type Responder = Box<dyn Fn(&str, &str) -> Result<HttpResponse, TransportError> + Send + Sync>;

    /// Answers every request through a closure of `(method, url)` and
    /// records the calls it saw.
    pub(crate) struct ScriptedTransport {
        responder: Responder,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedTransport {
        pub(crate) fn new(
            responder: impl Fn(&str, &str) -> Result<HttpResponse, TransportError>
                + Send
                + Sync
                + 'static,
        ) -> Self {
            Self {
                responder: Box::new(responder),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Serves the same body with status 200 for every request.
        pub(crate) fn always(body: &'static str) -> Self {
            Self::new(move |_, _| Ok(HttpResponse::ok(body)))
        }

        pub(crate) fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }

        pub(crate) fn urls(&self, method: &str) -> Vec<String> {
            self.calls()
                .into_iter()
                .filter(|(m, _)| m == method)
                .map(|(_, url)| url)
                .collect()
        }

        fn answer(&self, method: &str, url: &str) -> Result<HttpResponse, TransportError> {
            self.calls
                .lock()
                .unwrap()
                .push((method.to_string(), url.to_string()));
            (self.responder)(method, url)
        }
    }

    impl HttpTransport for ScriptedTransport {
        async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
            self.answer("GET", url)
        }

        async fn post(&self, url: &str) -> Result<HttpResponse, TransportError> {
            self.answer("POST", url)
        }
    }

    pub(crate) fn network_error(url: &str) -> TransportError {
        TransportError::new(
            url,
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "Network Error"),
        )
    }
}
