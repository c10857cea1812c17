//! Authenticated HTTP client for the engine API.
//!
//! Requests are signed with Hawk credentials obtained from
//! `POST {host}/auth/token`. A rejected credential triggers one login and
//! one retry; every HTTP failure is reported as a [`NormalizedError`].

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod logger;

pub use auth::{Credentials, HawkSigner, Signer};
pub use client::EngineClient;
pub use config::Config;
pub use error::{EngineError, NormalizedError};
pub use logger::{EngineLog, LogFacade, LogMarker};

/// Version stamped by the build script.
pub const VERSION: &str = env!("ENGINE_CLIENT_VERSION");
