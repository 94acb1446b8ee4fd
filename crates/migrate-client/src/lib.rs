//! Migration API Client
//!
//! Pulls monitors and dashboards from the v1 REST API and pushes patched
//! documents back.
//!
//! # Core Concepts
//!
//! - [`ObjectApi`]: the four calls the migration tool needs, behind a trait so
//!   commands can run against a fake in tests
//! - [`DatadogClient`]: reqwest implementation authenticated per organisation
//! - [`RetryPolicy`]: exponential backoff on rate limiting, server errors and
//!   transport failures
//!
//! # Example
//!
//! ```rust,ignore
//! use migrate_client::{DatadogClient, ObjectApi};
//!
//! let client = DatadogClient::from_config(&config)?;
//! let credential = config.credentials_for(org_id)?;
//! let monitor = client.get_monitor(credential, 42).await?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod api;
mod client;
mod error;
mod retry;

pub use api::{MonitorUpdate, ObjectApi};
pub use client::{DatadogClient, API_KEY_HEADER, APP_KEY_HEADER};
pub use error::ClientError;
pub use retry::RetryPolicy;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
