//! Migration Document Model
//!
//! Typed views over the two document kinds the migration tool handles.
//!
//! # Core Concepts
//!
//! - [`Monitor`]: alert definition with a single query, a name and a message
//! - [`Dashboard`]: tree of [`Widget`]s plus a flat list of [`TemplateVariable`]s
//! - [`WidgetDefinition`]: closed set of widget shapes the migration understands,
//!   everything else is carried as raw JSON
//! - [`Request`]: the query-carrying unit of a leaf widget
//!
//! Every type keeps the fields it does not model in a flattened `extra` map, so
//! a document read from disk can be written back without losing data. The
//! modelled fields are normalised: a `null` list reads as empty, while an
//! empty template variable list and a `null` prefix or query are omitted on
//! write.
//!
//! # Example
//!
//! ```rust,ignore
//! use migrate_model::{Document, Monitor};
//!
//! let monitor = Monitor::from_json(&content)?;
//! println!("{}", monitor.query);
//! let out = monitor.to_json_pretty()?;
//! ```

#![warn(unreachable_pub)]

mod dashboard;
mod de;
mod document;
mod error;
mod monitor;
mod request;
mod widget;

pub use dashboard::{Dashboard, TemplateVariable};
pub use document::{Document, DocumentKind};
pub use error::ModelError;
pub use monitor::Monitor;
pub use request::{MetricQuery, QueryDefinition, Request, METRICS_DATA_SOURCE};
pub use widget::{GroupDefinition, RequestsDefinition, Widget, WidgetDefinition, WidgetKind};

/// Raw JSON object used for unmodelled fields
pub type RawObject = serde_json::Map<String, serde_json::Value>;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
