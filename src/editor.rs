//! Detail editor: read-only/edit toggle over a local snapshot of one record.
//!
//! Edits never touch the source collection. A successful commit only asks
//! the caller to reload; the next reload is the displayed truth.

use serde::Serialize;

use crate::error::{EditorError, ValidationError};
use crate::gateway::SaveRecord;
use crate::record::{FieldMap, FieldValue, Record, RecordKind, ID_FIELD};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EditorMode {
    ReadOnly,
    Editing,
}

/// Allowed values for choice fields, if `field` is one for `kind`.
pub fn field_options(kind: RecordKind, field: &str) -> Option<&'static [&'static str]> {
    if field == kind.stage_field() && kind != RecordKind::Activity {
        return Some(kind.stages());
    }
    match (kind, field) {
        (RecordKind::Lead, "lead_type") => Some(&["New Business", "Existing Business"]),
        (RecordKind::Lead, "lead_rating") => Some(&["Cold", "Warm", "Hot", "Super Hot"]),
        (RecordKind::Lead, "industry") => Some(&["Insurance", "Finance", "Technology", "Healthcare"]),
        _ => None,
    }
}

fn validate(kind: RecordKind, field: &str, value: &FieldValue) -> Result<(), ValidationError> {
    if field.trim().is_empty() {
        return Err(ValidationError::EmptyFieldName);
    }
    let Some(allowed) = field_options(kind, field) else {
        return Ok(());
    };
    match value.as_text() {
        Some(text) if allowed.contains(&text) => Ok(()),
        _ => Err(ValidationError::NotAnOption {
            field: field.to_string(),
            value: value.display(),
            allowed: allowed.to_vec(),
        }),
    }
}

pub struct DetailEditor {
    kind: RecordKind,
    original: Record,
    snapshot: Record,
    mode: EditorMode,
}

impl DetailEditor {
    /// Open read-only on a copy of `record`.
    pub fn open(kind: RecordKind, record: &Record) -> Self {
        Self {
            kind,
            original: record.clone(),
            snapshot: record.clone(),
            mode: EditorMode::ReadOnly,
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn is_editing(&self) -> bool {
        self.mode == EditorMode::Editing
    }

    pub fn snapshot(&self) -> &Record {
        &self.snapshot
    }

    pub fn original(&self) -> &Record {
        &self.original
    }

    pub fn begin_edit(&mut self) {
        self.mode = EditorMode::Editing;
    }

    /// Stage a field edit in the local snapshot.
    ///
    /// Fields holding a structured value (references, flags) are inert and
    /// cannot be overwritten.
    pub fn set_field(
        &mut self,
        name: &str,
        value: impl Into<FieldValue>,
    ) -> Result<(), EditorError> {
        if !self.is_editing() {
            return Err(EditorError::NotEditing);
        }
        if self.original.get(name).is_some_and(|v| !v.is_editable()) {
            return Err(ValidationError::Inert {
                field: name.to_string(),
            }
            .into());
        }
        let value = value.into();
        validate(self.kind, name, &value)?;
        self.snapshot.set(name, value);
        Ok(())
    }

    /// Fields whose snapshot value differs from the original.
    pub fn changed_fields(&self) -> FieldMap {
        self.snapshot
            .fields()
            .iter()
            .filter(|(name, value)| self.original.get(name) != Some(*value))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.snapshot != self.original
    }

    /// Save the full edited snapshot.
    ///
    /// On success the editor returns to read-only and hands back the
    /// server's record; the caller should reload the collection, since the
    /// next reload is the displayed truth. On failure it stays in edit mode
    /// with every staged edit intact.
    pub async fn commit(&mut self, save: &dyn SaveRecord) -> Result<Record, EditorError> {
        if !self.is_editing() {
            return Err(EditorError::NotEditing);
        }
        let id = self
            .original
            .id()
            .ok_or(EditorError::MissingId(ID_FIELD))?
            .to_string();

        match save.save(&id, self.snapshot.fields()).await {
            Ok(saved) => {
                log::info!("Saved {} record {}", self.kind, id);
                self.mode = EditorMode::ReadOnly;
                Ok(saved)
            }
            Err(e) => {
                log::warn!("Save of {} record {} failed: {}", self.kind, id, e);
                Err(EditorError::Save(e))
            }
        }
    }

    /// Discard staged edits and return to read-only.
    pub fn cancel(&mut self) {
        self.snapshot = self.original.clone();
        self.mode = EditorMode::ReadOnly;
    }

    /// Close the editor; returns true if unsaved edits were discarded.
    pub fn close(self) -> bool {
        let discarded = self.is_editing() && self.has_unsaved_changes();
        if discarded {
            log::debug!("Closing {} editor with unsaved edits", self.kind);
        }
        discarded
    }
}
