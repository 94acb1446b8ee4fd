use async_trait::async_trait;
use migrate_model::{Dashboard, Monitor};
use migrate_store::Credential;
use serde::Serialize;

use crate::error::ClientError;

/// Remote operations on monitors and dashboards
///
/// Every call carries the credentials of the organisation owning the object.
#[async_trait]
pub trait ObjectApi: Send + Sync {
    /// Fetch a dashboard
    async fn get_dashboard(&self, credential: &Credential, id: &str) -> Result<Dashboard, ClientError>;

    /// Fetch a monitor
    async fn get_monitor(&self, credential: &Credential, id: i64) -> Result<Monitor, ClientError>;

    /// Replace a dashboard
    async fn update_dashboard(
        &self,
        credential: &Credential,
        id: &str,
        dashboard: &Dashboard,
    ) -> Result<(), ClientError>;

    /// Update the query, name and message of a monitor
    async fn update_monitor(
        &self,
        credential: &Credential,
        id: i64,
        update: &MonitorUpdate,
    ) -> Result<(), ClientError>;
}

/// Monitor update request body
///
/// Only the fields the migration rewrites are sent; the rest of the monitor
/// is left as the API has it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonitorUpdate {
    /// New query
    pub query: String,
    /// New title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<&Monitor> for MonitorUpdate {
    fn from(monitor: &Monitor) -> Self {
        Self {
            query: monitor.query.clone(),
            name: monitor.name.clone(),
            message: monitor.message.clone(),
        }
    }
}
