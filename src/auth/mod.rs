//! Credentials issued by the engine and request signing.

mod hawk;

use reqwest::Method;
use serde::{Deserialize, Serialize};

pub use hawk::HawkSigner;

/// Path of the token endpoint, relative to the engine host.
pub const AUTH_TOKEN_PATH: &str = "auth/token";

/// Signing material returned by `POST /auth/token`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub id: String,
    pub key: String,
    pub algorithm: String,
}

// The key stays out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("id", &self.id)
            .field("key", &"*********")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

/// Body of the token request.
#[derive(Debug, Clone, Serialize)]
pub struct TokenRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Computes the `Authorization` header for one request attempt.
///
/// Signing never fails: without usable credentials the signer returns an
/// empty header, which the engine rejects with 401.
pub trait Signer: Send + Sync {
    fn sign(&self, url: &str, method: &Method, credentials: Option<&Credentials>) -> String;
}
