//! Advisor dashboard core.
//!
//! Fetches leads, opportunities, quotes and the recent-activity feed from a
//! Table API record store, and shapes them for display: stage filters,
//! pagination, summary counts, and a refresh-on-save detail editor.

pub mod collection;
pub mod config;
pub mod dashboard;
pub mod display;
pub mod editor;
pub mod error;
pub mod fixtures;
pub mod gateway;
pub mod record;
pub mod session;

pub use collection::{CollectionView, CollectionViewModel, StageFilter, PAGE_SIZE};
pub use dashboard::{Dashboard, DashboardData, LoadResult, SummaryCounts};
pub use editor::{DetailEditor, EditorMode};
pub use error::{EditorError, GatewayError, ValidationError};
pub use gateway::{RecordGateway, SaveRecord, TableApiClient};
pub use record::{FieldValue, Record, RecordKind};
pub use session::DashboardSession;
