//! Public entry points, one per verb.
//!
//! # Design
//! `ApiClient` holds only a shared transport and the service configuration.
//! Each entry point creates an `ApiService` for its verb and runs one call,
//! so concurrent calls on the same client share nothing mutable.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ServiceConfig;
use crate::form::FormContributor;
use crate::http::{set_header, Headers, Transport, Verb};
use crate::payload::Payload;
use crate::result::CallResult;
use crate::service::ApiService;
use crate::transport::ReqwestTransport;

/// Authentication and header options for a single call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOptions {
    pub requires_auth: bool,
    pub token: Option<String>,
    pub headers: Headers,
}

impl CallOptions {
    /// No authentication required, no token sent.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Authentication required; `token` is sent as a bearer token.
    pub fn authenticated(token: impl Into<String>) -> Self {
        Self {
            requires_auth: true,
            token: Some(token.into()),
            headers: Headers::new(),
        }
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        set_header(&mut self.headers, name, value);
        self
    }

    fn extra_headers(&self) -> Option<&Headers> {
        (!self.headers.is_empty()).then_some(&self.headers)
    }
}

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    config: ServiceConfig,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(ReqwestTransport::default())
    }
}

impl ApiClient {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::from_shared(Arc::new(transport))
    }

    pub fn from_shared(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            config: ServiceConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// A service bound to `verb` sharing this client's transport.
    pub fn service(&self, verb: Verb) -> ApiService {
        ApiService::new(verb, Arc::clone(&self.transport), self.config.clone())
    }

    async fn run<T: DeserializeOwned>(
        &self,
        verb: Verb,
        endpoint: &str,
        payload: Option<Payload>,
        options: &CallOptions,
    ) -> CallResult<T> {
        self.service(verb)
            .execute(
                endpoint,
                options.requires_auth,
                payload,
                options.token.clone(),
                options.extra_headers(),
            )
            .await
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str, options: &CallOptions) -> CallResult<T> {
        self.run(Verb::Get, endpoint, None, options).await
    }

    /// POST `body` as JSON.
    pub async fn post<T, B>(&self, endpoint: &str, body: B, options: &CallOptions) -> CallResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + Send + Sync + 'static,
    {
        self.run(Verb::Post, endpoint, Some(Payload::json(body)), options).await
    }

    /// POST `body` as `multipart/form-data` built by its `FormContributor`.
    pub async fn post_multipart<T, B>(&self, endpoint: &str, body: B, options: &CallOptions) -> CallResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + FormContributor + Send + Sync + 'static,
    {
        self.run(Verb::Post, endpoint, Some(Payload::form(body)), options).await
    }

    pub async fn put<T, B>(&self, endpoint: &str, body: B, options: &CallOptions) -> CallResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + Send + Sync + 'static,
    {
        self.run(Verb::Put, endpoint, Some(Payload::json(body)), options).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str, options: &CallOptions) -> CallResult<T> {
        self.run(Verb::Delete, endpoint, None, options).await
    }
}
