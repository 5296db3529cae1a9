//! Dashboard session: one aggregator plus a collection view per record kind.
//!
//! Loads flow aggregator → views; edits flow editor → gateway → full reload.

use std::sync::Arc;

use serde::Serialize;

use crate::collection::{CollectionView, CollectionViewModel, StageFilter};
use crate::dashboard::{Dashboard, LoadResult, SummaryCounts};
use crate::editor::DetailEditor;
use crate::error::EditorError;
use crate::gateway::{GatewaySaver, RecordGateway};
use crate::record::RecordKind;

/// One tab of the dashboard, e.g. `"Leads (2)"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabLabel {
    pub kind: RecordKind,
    pub label: String,
    pub active: bool,
}

pub struct DashboardSession {
    dashboard: Dashboard,
    leads: CollectionView,
    opportunities: CollectionView,
    quotes: CollectionView,
    recent: CollectionView,
    active_tab: RecordKind,
}

impl DashboardSession {
    pub fn new(gateway: Arc<dyn RecordGateway>) -> Self {
        Self::with_dashboard(Dashboard::new(gateway))
    }

    /// Wrap an already configured aggregator.
    pub fn with_dashboard(dashboard: Dashboard) -> Self {
        Self {
            dashboard,
            leads: CollectionView::new(RecordKind::Lead),
            opportunities: CollectionView::new(RecordKind::Opportunity),
            quotes: CollectionView::new(RecordKind::Quote),
            recent: CollectionView::new(RecordKind::Activity),
            active_tab: RecordKind::Lead,
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn view(&self, kind: RecordKind) -> &CollectionView {
        match kind {
            RecordKind::Lead => &self.leads,
            RecordKind::Opportunity => &self.opportunities,
            RecordKind::Quote => &self.quotes,
            RecordKind::Activity => &self.recent,
        }
    }

    pub fn view_mut(&mut self, kind: RecordKind) -> &mut CollectionView {
        match kind {
            RecordKind::Lead => &mut self.leads,
            RecordKind::Opportunity => &mut self.opportunities,
            RecordKind::Quote => &mut self.quotes,
            RecordKind::Activity => &mut self.recent,
        }
    }

    /// Load everything and push the new collections into every view.
    ///
    /// Views keep their filter and page across the reload.
    pub async fn refresh(&mut self) -> LoadResult {
        let result = self.dashboard.load_all().await;
        if let Some(data) = result.data() {
            for kind in RecordKind::ALL {
                let records = data.collection(kind).to_vec();
                self.view_mut(kind).reload(records);
            }
        }
        result
    }

    pub fn counts(&self) -> SummaryCounts {
        self.dashboard
            .snapshot()
            .map(|s| s.counts)
            .unwrap_or_default()
    }

    pub fn active_tab(&self) -> RecordKind {
        self.active_tab
    }

    pub fn select_tab(&mut self, kind: RecordKind) {
        self.active_tab = kind;
    }

    pub fn tabs(&self) -> Vec<TabLabel> {
        let counts = self.counts();
        RecordKind::ALL
            .iter()
            .map(|&kind| TabLabel {
                kind,
                label: format!("{} ({})", kind.label(), counts.get(kind)),
                active: kind == self.active_tab,
            })
            .collect()
    }

    pub fn set_filter(&mut self, kind: RecordKind, filter: StageFilter) {
        self.view_mut(kind).set_filter(filter);
    }

    /// View model for the active tab.
    pub fn active_view(&self) -> CollectionViewModel {
        self.view(self.active_tab).view()
    }

    /// Open a read-only editor on a record of `kind`.
    pub fn open_editor(&self, kind: RecordKind, id: &str) -> Option<DetailEditor> {
        self.view(kind)
            .find(id)
            .map(|record| DetailEditor::open(kind, record))
    }

    /// Save the editor through the gateway, then reload everything.
    ///
    /// A failed save leaves the editor in edit mode and skips the reload.
    pub async fn commit_edit(&mut self, editor: &mut DetailEditor) -> Result<LoadResult, EditorError> {
        let saver = GatewaySaver::new(self.dashboard.gateway(), editor.kind());
        editor.commit(&saver).await?;
        Ok(self.refresh().await)
    }
}
