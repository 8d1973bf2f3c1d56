//! Pattern document: the shared, read-only operation tree plus its label tables.
//!
//! A document is built once (by the host's loader) and then shared by every
//! bullet executing it, usually behind an `Arc`. Named definitions come in
//! three kinds, each with its own table:
//! - actions (targets of `actionRef`)
//! - fires (targets of `fireRef`)
//! - bullet definitions (targets of `bulletRef`)

pub mod node;
mod validate;

pub use node::{
    Accel, Action, BulletDef, BulletSource, ChangeDirection, ChangeSpeed, DirectionKind,
    DirectionSpec, Fire, Node, NodeKind, NodeRef, Reference, Repeat, RepeatBody, SpeedKind,
    SpeedSpec, Wait,
};

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{ErrorSeverity, PatternError};

/// Kind of labelled definition a reference points at.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "lowercase")]
pub enum DefinitionKind {
    Action,
    Fire,
    Bullet,
}

/// Failures while building a document or resolving a reference in it.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    #[error("{kind} definition '{label}' not found")]
    DefinitionNotFound { kind: DefinitionKind, label: String },

    #[error("{kind} label '{label}' defined more than once")]
    DuplicateLabel { kind: DefinitionKind, label: String },

    #[error("top-level {kind} definition has no label")]
    MissingLabel { kind: DefinitionKind },
}

impl PatternError for DocumentError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Authoring
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::DefinitionNotFound { .. } => "DOCUMENT_DEFINITION_NOT_FOUND",
            Self::DuplicateLabel { .. } => "DOCUMENT_DUPLICATE_LABEL",
            Self::MissingLabel { .. } => "DOCUMENT_MISSING_LABEL",
        }
    }
}

/// Immutable pattern document.
#[derive(Clone, Debug, Default)]
pub struct PatternDocument {
    actions: HashMap<String, Arc<Action>>,
    fires: HashMap<String, Arc<Fire>>,
    bullets: HashMap<String, Arc<BulletDef>>,
}

impl PatternDocument {
    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::default()
    }

    /// Looks up a named action.
    pub fn resolve_action(&self, label: &str) -> Result<&Arc<Action>, DocumentError> {
        self.actions
            .get(label)
            .ok_or_else(|| not_found(DefinitionKind::Action, label))
    }

    /// Looks up a named fire.
    pub fn resolve_fire(&self, label: &str) -> Result<&Arc<Fire>, DocumentError> {
        self.fires
            .get(label)
            .ok_or_else(|| not_found(DefinitionKind::Fire, label))
    }

    /// Looks up a named bullet definition.
    pub fn resolve_bullet(&self, label: &str) -> Result<&Arc<BulletDef>, DocumentError> {
        self.bullets
            .get(label)
            .ok_or_else(|| not_found(DefinitionKind::Bullet, label))
    }

    /// Labels of the entry-point actions (`top`, `top1`, `top2`, ...), sorted.
    pub fn top_labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self
            .actions
            .keys()
            .map(String::as_str)
            .filter(|label| label.starts_with("top"))
            .collect();
        labels.sort_unstable();
        labels
    }

    /// Checks that every reference in the document resolves to a definition of
    /// the matching kind.
    pub fn validate(&self) -> Result<(), DocumentError> {
        validate::validate(self)
    }

    pub(crate) fn actions(&self) -> impl Iterator<Item = &Arc<Action>> {
        self.actions.values()
    }

    pub(crate) fn fires(&self) -> impl Iterator<Item = &Arc<Fire>> {
        self.fires.values()
    }

    pub(crate) fn bullets(&self) -> impl Iterator<Item = &Arc<BulletDef>> {
        self.bullets.values()
    }
}

fn not_found(kind: DefinitionKind, label: &str) -> DocumentError {
    DocumentError::DefinitionNotFound {
        kind,
        label: label.to_string(),
    }
}

/// Collects labelled definitions into a [`PatternDocument`].
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    actions: Vec<Action>,
    fires: Vec<Fire>,
    bullets: Vec<BulletDef>,
}

impl DocumentBuilder {
    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn fire(mut self, fire: Fire) -> Self {
        self.fires.push(fire);
        self
    }

    pub fn bullet(mut self, bullet: BulletDef) -> Self {
        self.bullets.push(bullet);
        self
    }

    /// Builds the document and validates every reference in it.
    pub fn build(self) -> Result<PatternDocument, DocumentError> {
        let document = self.build_unchecked()?;
        document.validate()?;
        Ok(document)
    }

    /// Builds the document without resolving references; unresolved ones
    /// surface when a bullet first reaches them.
    pub fn build_unchecked(self) -> Result<PatternDocument, DocumentError> {
        Ok(PatternDocument {
            actions: index(DefinitionKind::Action, self.actions, |a| a.label.as_deref())?,
            fires: index(DefinitionKind::Fire, self.fires, |f| f.label.as_deref())?,
            bullets: index(DefinitionKind::Bullet, self.bullets, |b| b.label.as_deref())?,
        })
    }
}

fn index<T>(
    kind: DefinitionKind,
    items: Vec<T>,
    label_of: impl Fn(&T) -> Option<&str>,
) -> Result<HashMap<String, Arc<T>>, DocumentError> {
    let mut table = HashMap::with_capacity(items.len());
    for item in items {
        let label = label_of(&item)
            .ok_or(DocumentError::MissingLabel { kind })?
            .to_string();
        if table.contains_key(&label) {
            return Err(DocumentError::DuplicateLabel { kind, label });
        }
        table.insert(label, Arc::new(item));
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shot() -> Fire {
        Fire::new(BulletSource::inline(BulletDef::default())).with_label("shot")
    }

    #[test]
    fn resolves_each_kind_from_its_own_table() {
        let doc = PatternDocument::builder()
            .action(Action::labeled("top", vec![Node::vanish()]))
            .fire(shot())
            .bullet(BulletDef::labeled("round"))
            .build()
            .unwrap();

        assert!(doc.resolve_action("top").is_ok());
        assert!(doc.resolve_fire("shot").is_ok());
        assert!(doc.resolve_bullet("round").is_ok());
    }

    #[test]
    fn kind_mismatch_is_not_found() {
        let doc = PatternDocument::builder().fire(shot()).build().unwrap();
        assert_eq!(
            doc.resolve_action("shot").unwrap_err(),
            DocumentError::DefinitionNotFound {
                kind: DefinitionKind::Action,
                label: "shot".into()
            }
        );
    }

    #[test]
    fn rejects_duplicate_and_missing_labels() {
        let dup = PatternDocument::builder()
            .action(Action::labeled("a", vec![]))
            .action(Action::labeled("a", vec![]))
            .build();
        assert!(matches!(dup, Err(DocumentError::DuplicateLabel { .. })));

        let missing = PatternDocument::builder().action(Action::new(vec![])).build();
        assert_eq!(
            missing.unwrap_err(),
            DocumentError::MissingLabel {
                kind: DefinitionKind::Action
            }
        );
    }

    #[test]
    fn top_labels_are_sorted_entry_points() {
        let doc = PatternDocument::builder()
            .action(Action::labeled("top2", vec![]))
            .action(Action::labeled("helper", vec![]))
            .action(Action::labeled("top1", vec![]))
            .build()
            .unwrap();
        assert_eq!(doc.top_labels(), vec!["top1", "top2"]);
    }

    #[test]
    fn error_message_names_label_and_kind() {
        let err = not_found(DefinitionKind::Bullet, "missing");
        assert_eq!(err.to_string(), "bullet definition 'missing' not found");
        assert_eq!(err.error_code(), "DOCUMENT_DEFINITION_NOT_FOUND");
    }
}
