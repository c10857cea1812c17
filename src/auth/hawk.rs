//! Hawk `Authorization` header generation.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use log::warn;
use rand::{Rng, distributions::Alphanumeric};
use reqwest::{Method, Url};
use sha1::Sha1;
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

use super::{Credentials, Signer};

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;

const HEADER_VERSION: &str = "1";
const NONCE_LEN: usize = 6;

/// MAC algorithms accepted in engine credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Algorithm {
    Sha1,
    Sha256,
}

impl Algorithm {
    fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "sha1" => Some(Algorithm::Sha1),
            "sha256" => Some(Algorithm::Sha256),
            _ => None,
        }
    }

    fn mac(self, key: &[u8], data: &[u8]) -> Option<Vec<u8>> {
        match self {
            Algorithm::Sha1 => {
                let mut mac = HmacSha1::new_from_slice(key).ok()?;
                mac.update(data);
                Some(mac.finalize().into_bytes().to_vec())
            }
            Algorithm::Sha256 => {
                let mut mac = HmacSha256::new_from_slice(key).ok()?;
                mac.update(data);
                Some(mac.finalize().into_bytes().to_vec())
            }
        }
    }
}

/// Signs requests with the Hawk header scheme (no payload hash, no ext).
#[derive(Debug, Clone, Copy, Default)]
pub struct HawkSigner;

impl HawkSigner {
    pub fn new() -> Self {
        Self
    }

    /// Builds the header for a fixed timestamp and nonce.
    ///
    /// Returns `None` if the URL cannot be parsed or the algorithm is neither
    /// `sha1` nor `sha256`.
    pub fn header_at(
        &self,
        url: &str,
        method: &Method,
        credentials: &Credentials,
        ts: u64,
        nonce: &str,
    ) -> Option<String> {
        let Some(algorithm) = Algorithm::parse(&credentials.algorithm) else {
            warn!(
                "Unsupported Hawk algorithm '{}' for credentials {}",
                credentials.algorithm, credentials.id
            );
            return None;
        };

        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Cannot sign invalid URL {}: {}", url, e);
                return None;
            }
        };

        let normalized = normalized_string(&parsed, method, ts, nonce)?;
        let mac = STANDARD.encode(algorithm.mac(credentials.key.as_bytes(), normalized.as_bytes())?);

        Some(format!(
            "Hawk id=\"{}\", ts=\"{}\", nonce=\"{}\", mac=\"{}\"",
            credentials.id, ts, nonce, mac
        ))
    }
}

impl Signer for HawkSigner {
    fn sign(&self, url: &str, method: &Method, credentials: Option<&Credentials>) -> String {
        let Some(credentials) = credentials else {
            return String::new();
        };
        self.header_at(url, method, credentials, now_secs(), &nonce())
            .unwrap_or_default()
    }
}

/// The string covered by the MAC.
fn normalized_string(url: &Url, method: &Method, ts: u64, nonce: &str) -> Option<String> {
    let host = url.host_str()?;
    let port = url.port_or_known_default()?;
    let resource = match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    };

    // hash and ext are left empty
    Some(format!(
        "hawk.{}.header\n{}\n{}\n{}\n{}\n{}\n{}\n\n\n",
        HEADER_VERSION,
        ts,
        nonce,
        method.as_str().to_uppercase(),
        resource,
        host.to_lowercase(),
        port
    ))
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect()
}
