//! Record model shared by the gateway, the collection views and the editor.
//!
//! Records come back from the Table API as flat JSON objects. Values are
//! almost always strings, occasionally numbers; anything else is kept as an
//! inert [`FieldValue::Other`] so an unexpected shape never fails a load.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Field holding the opaque record identifier.
pub const ID_FIELD: &str = "sys_id";

/// The four record kinds the dashboard shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Lead,
    Opportunity,
    Quote,
    Activity,
}

impl RecordKind {
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Lead,
        RecordKind::Opportunity,
        RecordKind::Quote,
        RecordKind::Activity,
    ];

    /// Backend table backing this kind.
    pub fn table(self) -> &'static str {
        match self {
            RecordKind::Lead => "x_dxc_advisor_lead",
            RecordKind::Opportunity => "x_dxc_advisor_opportunity",
            RecordKind::Quote => "x_dxc_advisor_quote",
            RecordKind::Activity => "sys_ui_list_recent",
        }
    }

    /// Name of the stage/status field for this kind.
    pub fn stage_field(self) -> &'static str {
        match self {
            RecordKind::Lead | RecordKind::Opportunity => "stage",
            RecordKind::Quote => "status",
            RecordKind::Activity => "type",
        }
    }

    /// Ordered stage vocabulary.
    pub fn stages(self) -> &'static [&'static str] {
        match self {
            RecordKind::Lead => &["New", "Contacted", "Nurturing", "Qualified", "Disqualified"],
            RecordKind::Opportunity => &["Qualify", "Develop", "Propose", "Negotiate", "Closed"],
            RecordKind::Quote => &["Draft", "Pending", "Approved", "Rejected"],
            RecordKind::Activity => &["lead", "opportunity", "quote", "task"],
        }
    }

    /// Plural label used for tabs and summary cards.
    pub fn label(self) -> &'static str {
        match self {
            RecordKind::Lead => "Leads",
            RecordKind::Opportunity => "Opportunities",
            RecordKind::Quote => "Quotes",
            RecordKind::Activity => "Recent",
        }
    }

    /// Classify a raw stage value against this kind's vocabulary.
    pub fn classify_stage(self, raw: Option<&str>) -> Stage {
        match raw {
            None => Stage::Missing,
            Some(value) => match self.stages().iter().position(|s| *s == value) {
                Some(index) => Stage::Known {
                    index,
                    name: self.stages()[index],
                },
                None => Stage::Unknown(value.to_string()),
            },
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where a record sits in its kind's stage vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Known { index: usize, name: &'static str },
    /// Present but outside the vocabulary; shown as unprogressed.
    Unknown(String),
    Missing,
}

/// One step of a stage progress bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageStep {
    pub name: &'static str,
    pub completed: bool,
    pub active: bool,
}

/// Progress across the kind's vocabulary for one record.
///
/// Steps before the current stage are completed and the current one is
/// active. Unknown or missing stages produce a fully unprogressed bar.
pub fn stage_progress(kind: RecordKind, record: &Record) -> Vec<StageStep> {
    let current = match kind.classify_stage(record.stage(kind)) {
        Stage::Known { index, .. } => Some(index),
        _ => None,
    };

    kind.stages()
        .iter()
        .enumerate()
        .map(|(i, name)| StageStep {
            name: *name,
            completed: current.is_some_and(|c| i < c),
            active: current == Some(i),
        })
        .collect()
}

/// A single field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    /// Anything else the backend sends (bool, null, nested objects).
    /// Carried through untouched and displayed as empty.
    Other(serde_json::Value),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether the editor may change this value.
    pub fn is_editable(&self) -> bool {
        !matches!(self, FieldValue::Other(_))
    }

    /// Display form; inert values render as an empty string.
    pub fn display(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Other(_) => String::new(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

pub type FieldMap = BTreeMap<String, FieldValue>;

/// A record of any kind: named fields keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: FieldMap,
}

impl Record {
    pub fn new(fields: FieldMap) -> Self {
        Self { fields }
    }

    /// Build a record from `(name, text)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), FieldValue::from(v)))
                .collect(),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.text(ID_FIELD)
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Text value of a field; numbers and inert values yield `None`.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(FieldValue::as_text)
    }

    pub fn stage(&self, kind: RecordKind) -> Option<&str> {
        self.text(kind.stage_field())
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }
}
