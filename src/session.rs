use std::collections::HashSet;

use crate::interchange::component::DefinitionId;
use crate::schedule::config::{AnimationConfig, ExportSettings};

/// Per-application state shared by the editor, import hooks and animation commands.
///
/// Create one at startup and call [`Session::reset_for_new_document`] whenever the host opens or
/// creates a document.
#[derive(Clone, Debug, Default)]
pub struct Session {
    editor_open: bool,
    /// Last-used sampling settings.
    pub animation: AnimationConfig,
    /// Last-used export settings.
    pub export: ExportSettings,
    imported_definitions: HashSet<DefinitionId>,
}

impl Session {
    /// Fresh session with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget per-document state. Settings survive.
    pub fn reset_for_new_document(&mut self) {
        self.imported_definitions.clear();
    }

    /// Mark the editor open. Returns `false` if it already was.
    pub fn try_open_editor(&mut self) -> bool {
        if self.editor_open {
            return false;
        }
        self.editor_open = true;
        true
    }

    /// Mark the editor closed.
    pub fn close_editor(&mut self) {
        self.editor_open = false;
    }

    /// Whether the editor is open.
    pub fn is_editor_open(&self) -> bool {
        self.editor_open
    }

    /// Record that `def`'s time bundle was offered. Returns `false` if it already was.
    pub fn mark_definition_seen(&mut self, def: DefinitionId) -> bool {
        self.imported_definitions.insert(def)
    }

    /// Whether `def`'s time bundle was already offered in this document.
    pub fn has_seen_definition(&self, def: DefinitionId) -> bool {
        self.imported_definitions.contains(&def)
    }
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
