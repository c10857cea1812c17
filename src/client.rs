//! Authenticated client for the engine API.
//!
//! Every request is signed with the cached credentials (or with none before
//! the first login). A 401 triggers exactly one login against
//! `POST {host}/auth/token` followed by one retry of the original request.

use log::debug;
use reqwest::Method;
use serde_json::Value;
use std::sync::{Arc, RwLock};

use crate::{
    auth::{AUTH_TOKEN_PATH, Credentials, HawkSigner, Signer, TokenRequest},
    error::EngineError,
    http::{Transport, TransportError, TransportRequest, TransportResponse, normalize},
    logger::{EngineLog, LogMarker},
};

const UNAUTHORIZED: u16 = 401;

pub struct EngineClient<T: Transport, S: Signer = HawkSigner> {
    transport: T,
    signer: S,
    host: String,
    username: String,
    password: String,
    credentials: RwLock<Option<Arc<Credentials>>>,
    log: Option<Arc<dyn EngineLog>>,
}

impl<T: Transport> EngineClient<T, HawkSigner> {
    /// Creates a client that signs with Hawk. No request is made until the
    /// first call.
    pub fn new(
        transport: T,
        host: &str,
        username: &str,
        password: &str,
        log: Option<Arc<dyn EngineLog>>,
    ) -> Self {
        Self::with_signer(transport, HawkSigner::new(), host, username, password, log)
    }
}

impl<T: Transport, S: Signer> EngineClient<T, S> {
    pub fn with_signer(
        transport: T,
        signer: S,
        host: &str,
        username: &str,
        password: &str,
        log: Option<Arc<dyn EngineLog>>,
    ) -> Self {
        Self {
            transport,
            signer,
            host: host.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
            credentials: RwLock::new(None),
            log,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Credentials from the most recent successful login.
    pub fn credentials(&self) -> Option<Arc<Credentials>> {
        match self.credentials.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn store_credentials(&self, credentials: Arc<Credentials>) {
        match self.credentials.write() {
            Ok(mut guard) => *guard = Some(credentials),
            Err(poisoned) => *poisoned.into_inner() = Some(credentials),
        }
    }

    pub async fn get(&self, path: &str, marker: impl Into<LogMarker>) -> Result<Value, EngineError> {
        self.execute(Method::GET, path, None, marker).await
    }

    pub async fn post(
        &self,
        path: &str,
        body: Value,
        marker: impl Into<LogMarker>,
    ) -> Result<Value, EngineError> {
        self.execute(Method::POST, path, Some(body), marker).await
    }

    pub async fn patch(
        &self,
        path: &str,
        body: Value,
        marker: impl Into<LogMarker>,
    ) -> Result<Value, EngineError> {
        self.execute(Method::PATCH, path, Some(body), marker).await
    }

    pub async fn put(
        &self,
        path: &str,
        body: Value,
        marker: impl Into<LogMarker>,
    ) -> Result<Value, EngineError> {
        self.execute(Method::PUT, path, Some(body), marker).await
    }

    pub async fn delete(
        &self,
        path: &str,
        marker: impl Into<LogMarker>,
    ) -> Result<Value, EngineError> {
        self.execute(Method::DELETE, path, None, marker).await
    }

    /// Sends `method {host}/{path}` and returns the response body.
    ///
    /// On a 401 the client logs in once and retries once; any failure of
    /// the login or the retry is returned without further attempts.
    #[tracing::instrument(skip(self, body, marker))]
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        marker: impl Into<LogMarker>,
    ) -> Result<Value, EngineError> {
        let marker = marker.into();
        let url = format!("{}/{}", self.host, path);
        let cached = self.credentials();

        let err = match self
            .attempt(&method, &url, body.as_ref(), cached.as_deref())
            .await
        {
            Ok(response) => {
                self.log_completion(&marker, &method, &url, false);
                return Ok(response.data);
            }
            Err(err) => err,
        };

        if !is_unauthorized(&err) {
            return Err(self.classify(&method, &url, err));
        }

        self.log_debug("trying to authenticate");
        let fresh = self.authenticate(&method, &url).await?;

        match self
            .attempt(&method, &url, body.as_ref(), Some(fresh.as_ref()))
            .await
        {
            Ok(response) => {
                self.log_completion(&marker, &method, &url, true);
                Ok(response.data)
            }
            Err(err) => Err(self.classify(&method, &url, err)),
        }
    }

    async fn attempt(
        &self,
        method: &Method,
        url: &str,
        body: Option<&Value>,
        credentials: Option<&Credentials>,
    ) -> Result<TransportResponse, TransportError> {
        let authorization = self.signer.sign(url, method, credentials);
        self.transport
            .send(TransportRequest {
                method: method.clone(),
                url: url.to_string(),
                data: body.cloned(),
                authorization: Some(authorization),
            })
            .await
    }

    /// Logs in and replaces the cached credentials. Failures are reported
    /// against the request that triggered the login.
    async fn authenticate(&self, method: &Method, url: &str) -> Result<Arc<Credentials>, EngineError> {
        let auth_url = format!("{}/{}", self.host, AUTH_TOKEN_PATH);
        let token_request = TokenRequest {
            username: &self.username,
            password: &self.password,
        };
        let data = serde_json::to_value(&token_request)
            .map_err(|e| EngineError::InvalidAuthResponse(e.to_string()))?;

        let response = self
            .transport
            .send(TransportRequest {
                method: Method::POST,
                url: auth_url.clone(),
                data: Some(data),
                authorization: None,
            })
            .await
            .map_err(|err| self.classify(method, url, err))?;

        let credentials: Credentials = serde_json::from_value(response.data).map_err(|e| {
            self.log_error(&format!("es> POST {} -> invalid credentials: {}", auth_url, e));
            EngineError::InvalidAuthResponse(e.to_string())
        })?;

        self.log_info(&format!("{} logged in", self.username));
        debug!("Using credentials {}", credentials.id);

        let credentials = Arc::new(credentials);
        self.store_credentials(Arc::clone(&credentials));
        Ok(credentials)
    }

    /// Logs a failure once and converts it into the error returned to the
    /// caller.
    fn classify(&self, method: &Method, url: &str, err: TransportError) -> EngineError {
        match err {
            TransportError::Network(raw) => {
                let message = raw.to_string();
                if message.is_empty() {
                    self.log_error(&format!("es> {} {} -> unknown error", method, url));
                } else {
                    self.log_error(&format!("es> {} {} -> {}", method, url, message));
                }
                EngineError::Transport(raw)
            }
            TransportError::Response(response) => {
                let normalized = normalize(&response);
                match response.status {
                    Some(status) => self.log_error(&format!(
                        "es> {} {} -> {} ({})",
                        method, url, status, normalized.message
                    )),
                    None => self.log_error(&format!(
                        "es> {} {} -> error: {}",
                        method, url, normalized.message
                    )),
                }
                EngineError::Http(normalized)
            }
        }
    }

    fn log_completion(&self, marker: &LogMarker, method: &Method, url: &str, retried: bool) {
        if let Some(line) = marker.completion_line(method.as_str(), url, retried) {
            self.log_info(&line);
        }
    }

    fn log_info(&self, msg: &str) {
        if let Some(log) = &self.log {
            log.info(msg);
        }
    }

    fn log_debug(&self, msg: &str) {
        if let Some(log) = &self.log {
            log.debug(msg);
        }
    }

    fn log_error(&self, msg: &str) {
        if let Some(log) = &self.log {
            log.error(msg);
        }
    }
}

fn is_unauthorized(err: &TransportError) -> bool {
    matches!(err, TransportError::Response(response) if response.status == Some(UNAUTHORIZED))
}
