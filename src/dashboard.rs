//! Dashboard aggregator: loads the four collections and derives summary counts.
//!
//! A load either replaces every collection at once or, if any fetch fails,
//! swaps in the fixed demo data set. Failure is absorbed here and only here,
//! and shows up as [`LoadResult::Fallback`]. With fallback disabled it shows
//! up as [`LoadResult::Failed`] and the previous collections stay in place.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::error::GatewayError;
use crate::fixtures;
use crate::gateway::RecordGateway;
use crate::record::{Record, RecordKind};

/// The four collections, always replaced together.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub leads: Vec<Record>,
    pub opportunities: Vec<Record>,
    pub quotes: Vec<Record>,
    pub recent: Vec<Record>,
}

impl DashboardData {
    /// Fixed demo data used in degraded mode.
    pub fn fallback() -> Self {
        Self {
            leads: fixtures::fallback_leads(),
            opportunities: fixtures::fallback_opportunities(),
            quotes: fixtures::fallback_quotes(),
            recent: fixtures::fallback_recent(),
        }
    }

    pub fn collection(&self, kind: RecordKind) -> &[Record] {
        match kind {
            RecordKind::Lead => &self.leads,
            RecordKind::Opportunity => &self.opportunities,
            RecordKind::Quote => &self.quotes,
            RecordKind::Activity => &self.recent,
        }
    }

    pub fn counts(&self) -> SummaryCounts {
        SummaryCounts {
            leads: self.leads.len(),
            opportunities: self.opportunities.len(),
            quotes: self.quotes.len(),
            recent: self.recent.len(),
        }
    }
}

/// Per-kind record counts, recomputed after every load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryCounts {
    pub leads: usize,
    pub opportunities: usize,
    pub quotes: usize,
    pub recent: usize,
}

impl SummaryCounts {
    pub fn get(&self, kind: RecordKind) -> usize {
        match kind {
            RecordKind::Lead => self.leads,
            RecordKind::Opportunity => self.opportunities,
            RecordKind::Quote => self.quotes,
            RecordKind::Activity => self.recent,
        }
    }
}

/// Outcome of [`Dashboard::load_all`].
#[derive(Debug)]
pub enum LoadResult {
    Loaded(DashboardData),
    /// A fetch failed; the demo data set is now showing.
    Fallback {
        data: DashboardData,
        cause: GatewayError,
    },
    /// A fetch failed and fallback is disabled; nothing was applied.
    Failed(GatewayError),
    /// A newer load started before this one resolved; nothing was applied.
    Superseded,
}

impl LoadResult {
    pub fn data(&self) -> Option<&DashboardData> {
        match self {
            LoadResult::Loaded(data) | LoadResult::Fallback { data, .. } => Some(data),
            LoadResult::Failed(_) | LoadResult::Superseded => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, LoadResult::Fallback { .. })
    }

    /// The fetch error behind a fallback or failed load.
    pub fn cause(&self) -> Option<&GatewayError> {
        match self {
            LoadResult::Fallback { cause, .. } | LoadResult::Failed(cause) => Some(cause),
            LoadResult::Loaded(_) | LoadResult::Superseded => None,
        }
    }
}

/// Read-only copy of the last applied load.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub data: DashboardData,
    pub counts: SummaryCounts,
    pub using_fallback: bool,
    pub loaded_at: Option<DateTime<Utc>>,
}

struct DashboardState {
    snapshot: DashboardSnapshot,
    /// Bumped by every load; only the newest load may apply its result.
    generation: u64,
    loading: bool,
}

pub struct Dashboard {
    gateway: Arc<dyn RecordGateway>,
    state: RwLock<DashboardState>,
    fallback_on_error: bool,
}

impl Dashboard {
    /// Start with empty collections; nothing is fetched until `load_all`.
    pub fn new(gateway: Arc<dyn RecordGateway>) -> Self {
        Self {
            gateway,
            state: RwLock::new(DashboardState {
                snapshot: DashboardSnapshot {
                    data: DashboardData::default(),
                    counts: SummaryCounts::default(),
                    using_fallback: false,
                    loaded_at: None,
                },
                generation: 0,
                loading: false,
            }),
            fallback_on_error: true,
        }
    }

    /// Whether a failed load swaps in the demo data set (the default).
    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.fallback_on_error = enabled;
        self
    }

    pub fn gateway(&self) -> &dyn RecordGateway {
        self.gateway.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    /// True when the data on show is the demo set.
    pub fn using_fallback(&self) -> bool {
        self.state.read().snapshot.using_fallback
    }

    /// Current collections, or `None` while a load is in flight.
    pub fn snapshot(&self) -> Option<DashboardSnapshot> {
        let state = self.state.read();
        if state.loading {
            return None;
        }
        Some(state.snapshot.clone())
    }

    /// Fetch all four collections concurrently.
    ///
    /// Fails fast on the first error and falls back to the demo data set,
    /// or returns [`LoadResult::Failed`] when fallback is disabled.
    /// If another load starts before this one resolves, this result is
    /// discarded and [`LoadResult::Superseded`] is returned.
    pub async fn load_all(&self) -> LoadResult {
        let generation = {
            let mut state = self.state.write();
            state.generation += 1;
            state.loading = true;
            state.generation
        };
        log::info!("Dashboard load #{} started", generation);

        let gateway = self.gateway.as_ref();
        let fetched = tokio::try_join!(
            gateway.list(RecordKind::Lead, None),
            gateway.list(RecordKind::Opportunity, None),
            gateway.list(RecordKind::Quote, None),
            gateway.list(RecordKind::Activity, None),
        );

        let mut state = self.state.write();
        if state.generation != generation {
            log::info!(
                "Dashboard load #{} discarded; #{} is newer",
                generation,
                state.generation
            );
            return LoadResult::Superseded;
        }

        let result = match fetched {
            Ok((leads, opportunities, quotes, recent)) => LoadResult::Loaded(DashboardData {
                leads,
                opportunities,
                quotes,
                recent,
            }),
            Err(cause) if !self.fallback_on_error => {
                log::warn!("Dashboard load #{} failed: {}", generation, cause);
                LoadResult::Failed(cause)
            }
            Err(cause) => {
                log::warn!(
                    "Dashboard load #{} failed, showing demo data: {}",
                    generation,
                    cause
                );
                LoadResult::Fallback {
                    data: DashboardData::fallback(),
                    cause,
                }
            }
        };

        if let Some(data) = result.data() {
            state.snapshot = DashboardSnapshot {
                counts: data.counts(),
                data: data.clone(),
                using_fallback: result.is_fallback(),
                loaded_at: Some(Utc::now()),
            };
        }
        state.loading = false;

        let counts = state.snapshot.counts;
        log::info!(
            "Dashboard load #{} done: {} leads, {} opportunities, {} quotes, {} recent",
            generation,
            counts.leads,
            counts.opportunities,
            counts.quotes,
            counts.recent
        );
        result
    }
}
