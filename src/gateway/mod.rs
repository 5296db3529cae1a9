//! Record gateway: the only component that talks to the record store.
//!
//! Modules:
//! - client: Table API implementation over reqwest
//!
//! The gateway performs no retries and no caching. Every failure surfaces
//! as a [`GatewayError`]; retry/backoff is the caller's policy.

pub mod client;

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::record::{FieldMap, Record, RecordKind};

pub use client::TableApiClient;

/// Key under which the record store wraps every response payload.
pub const RESULT_KEY: &str = "result";

/// Hard cap on records returned by one unfiltered or filtered list call.
///
/// Not configurable. Leads, opportunities and quotes cap at 1000. The
/// recent-activity feed mirrors the backend's short recent list
/// (`sysparm_limit=50`), so it caps at 50. A result of exactly the cap may
/// be truncated.
pub fn list_limit(kind: RecordKind) -> usize {
    match kind {
        RecordKind::Activity => 50,
        _ => 1000,
    }
}

/// True when `len` hit the cap, so more records may exist server-side.
pub fn is_possibly_truncated(kind: RecordKind, len: usize) -> bool {
    len >= list_limit(kind)
}

/// Backend query for a stage filter: `<field>=<value>`.
pub fn stage_query(kind: RecordKind, stage: &str) -> String {
    format!("{}={}", kind.stage_field(), stage)
}

/// Typed access to the remote record store.
#[async_trait]
pub trait RecordGateway: Send + Sync {
    /// List records of `kind`, optionally restricted to one stage value.
    async fn list(&self, kind: RecordKind, stage: Option<&str>) -> Result<Vec<Record>, GatewayError>;

    /// Apply a partial-field patch and return the server's record.
    async fn update(
        &self,
        kind: RecordKind,
        id: &str,
        fields: &FieldMap,
    ) -> Result<Record, GatewayError>;

    /// Create a record. Only leads and opportunities can be created.
    async fn create(&self, kind: RecordKind, fields: &FieldMap) -> Result<Record, GatewayError>;
}

/// Save collaborator for the detail editor.
///
/// In production this is [`GatewaySaver`]; tests supply stubs.
#[async_trait]
pub trait SaveRecord: Send + Sync {
    async fn save(&self, id: &str, fields: &FieldMap) -> Result<Record, GatewayError>;
}

/// Binds a gateway's `update` for one record kind.
pub struct GatewaySaver<'a> {
    gateway: &'a dyn RecordGateway,
    kind: RecordKind,
}

impl<'a> GatewaySaver<'a> {
    pub fn new(gateway: &'a dyn RecordGateway, kind: RecordKind) -> Self {
        Self { gateway, kind }
    }
}

#[async_trait]
impl<'a> SaveRecord for GatewaySaver<'a> {
    async fn save(&self, id: &str, fields: &FieldMap) -> Result<Record, GatewayError> {
        self.gateway.update(self.kind, id, fields).await
    }
}
