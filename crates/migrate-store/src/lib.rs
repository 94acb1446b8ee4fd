//! Migration Store
//!
//! The boundary between the file system and the migration engine.
//!
//! # Core Operations
//!
//! - **Config**: per-organisation API credentials ([`Config`])
//! - **Input refs**: the JSON lists of objects to dump ([`SerializedRef`])
//! - **Objects**: `<root>/<orgID>/<type>-<id>.json` documents ([`LocalStore`])
//! - **Touched markers**: `<type>-<id>.touched` files flagging objects that
//!   still have to be pushed back
//!
//! # Layout
//!
//! ```text
//! objects/
//! ├── 1234/
//! │   ├── dashboard-abc-def-ghi.json
//! │   ├── dashboard-abc-def-ghi.touched
//! │   └── monitor-42.json
//! └── 5678/
//!     └── monitor-7.json
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod object;
pub mod store;

pub use config::{Config, ConfigError, Credential, DEFAULT_SITE};
pub use error::StoreError;
pub use object::{
    object_file_path, parse_object_file_name, read_input_refs, FileExt, ObjectFileName, ObjectRef,
    SerializedRef,
};
pub use store::{LocalStore, Listing, StoredObject};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
