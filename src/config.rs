//! Client configuration and construction.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use log::debug;
use reqwest::Client;

use crate::{
    auth::HawkSigner,
    client::EngineClient,
    http::ReqwestTransport,
    logger::{EngineLog, LogFacade},
};

/// User agent sent with every request.
pub fn default_user_agent() -> String {
    format!("engine-client/{}", crate::VERSION)
}

/// Connection settings for one engine session.
#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
}

impl Config {
    pub fn new(host: &str, username: &str, password: &str) -> Self {
        Self {
            host: host.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
            user_agent: default_user_agent(),
        }
    }

    /// Checks that the host is an absolute http(s) URL.
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.host)
            .with_context(|| format!("Invalid engine host '{}'", self.host))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            bail!("Engine host must use http or https, got '{}'", url.scheme());
        }
        Ok(())
    }

    /// Builds the reqwest client shared by every request of the session.
    pub fn build_http_client(&self) -> Result<Client> {
        let client = Client::builder()
            .user_agent(self.user_agent.as_str())
            .build()
            .context("Failed to build HTTP client")?;
        debug!("HTTP client configured for {}", self.host);
        Ok(client)
    }

    /// Builds a client that logs through the `log` crate.
    pub fn build_client(&self) -> Result<EngineClient<ReqwestTransport, HawkSigner>> {
        let log: Arc<dyn EngineLog> = Arc::new(LogFacade);
        self.build_client_with_log(Some(log))
    }

    pub fn build_client_with_log(
        &self,
        log: Option<Arc<dyn EngineLog>>,
    ) -> Result<EngineClient<ReqwestTransport, HawkSigner>> {
        self.validate()?;
        let transport = ReqwestTransport::new(self.build_http_client()?);
        Ok(EngineClient::new(
            transport,
            &self.host,
            &self.username,
            &self.password,
            log,
        ))
    }
}

// Keeps the password out of debug output.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"*********")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[test]
    fn test_config_trims_trailing_slash() {
        let config = Config::new("http://engine.test/", "bob", "pw");
        assert_eq!(config.host, "http://engine.test");
    }

    #[test]
    fn test_config_debug_hides_password() {
        let config = Config::new("http://engine.test", "bob", "hunter2");
        let debug = format!("{:?}", config);
        assert!(debug.contains("bob"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_validate_rejects_bad_hosts() {
        assert!(Config::new("engine.test", "u", "p").validate().is_err());
        assert!(Config::new("ftp://engine.test", "u", "p").validate().is_err());
        assert!(Config::new("https://engine.test", "u", "p").validate().is_ok());
    }

    #[test]
    fn test_build_client_rejects_bad_host() {
        assert!(Config::new("not a url", "u", "p").build_client().is_err());
    }

    #[test]
    fn test_build_client_keeps_session_settings() {
        let client = Config::new("http://engine.test/", "bob", "pw")
            .build_client()
            .unwrap();
        assert_eq!(client.host(), "http://engine.test");
        assert_eq!(client.username(), "bob");
        assert!(client.credentials().is_none());
    }

    #[tokio::test]
    async fn test_build_client_sends_user_agent() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/ping")
            .match_header("User-Agent", Matcher::Exact(default_user_agent()))
            .with_status(200)
            .create_async()
            .await;

        let client = Config::new(&server.url(), "bob", "pw")
            .build_client_with_log(None)
            .unwrap();
        client.get("ping", "").await.unwrap();

        mock.assert_async().await;
    }
}
