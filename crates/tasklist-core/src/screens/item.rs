//! Single todo row with its inline edit form.

use crate::models::{Todo, TodoId};
use crate::util::is_blank;

/// What a row asks the list store to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemIntent {
    Toggle { id: TodoId, is_completed: bool },
    Edit { id: TodoId, title: String },
    Delete { id: TodoId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemMode {
    Viewing,
    Editing { draft: String },
}

/// Rendered from a snapshot record; the only local state is the edit draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoItemView {
    id: TodoId,
    title: String,
    is_completed: bool,
    mode: ItemMode,
}

impl TodoItemView {
    pub fn new(todo: &Todo) -> Self {
        Self {
            id: todo.id,
            title: todo.title.clone(),
            is_completed: todo.is_completed,
            mode: ItemMode::Viewing,
        }
    }

    pub const fn id(&self) -> TodoId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub const fn is_completed(&self) -> bool {
        self.is_completed
    }

    pub const fn mode(&self) -> &ItemMode {
        &self.mode
    }

    pub const fn is_editing(&self) -> bool {
        matches!(self.mode, ItemMode::Editing { .. })
    }

    pub fn draft(&self) -> Option<&str> {
        match &self.mode {
            ItemMode::Editing { draft } => Some(draft),
            ItemMode::Viewing => None,
        }
    }

    pub fn begin_edit(&mut self) {
        if !self.is_editing() {
            self.mode = ItemMode::Editing {
                draft: self.title.clone(),
            };
        }
    }

    /// Ignored unless the edit form is open.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        if let ItemMode::Editing { draft } = &mut self.mode {
            *draft = text.into();
        }
    }

    /// Submit the edit form.
    ///
    /// A blank draft keeps the form open and reports nothing.
    pub fn save(&mut self) -> Option<ItemIntent> {
        let ItemMode::Editing { draft } = &self.mode else {
            return None;
        };
        if is_blank(draft) {
            return None;
        }

        let title = draft.clone();
        self.mode = ItemMode::Viewing;
        Some(ItemIntent::Edit { id: self.id, title })
    }

    /// Close the form and drop the draft.
    pub fn cancel(&mut self) {
        self.mode = ItemMode::Viewing;
    }

    /// Checkbox click; available in both modes.
    pub const fn toggle(&self) -> ItemIntent {
        ItemIntent::Toggle {
            id: self.id,
            is_completed: !self.is_completed,
        }
    }

    /// Delete button; hidden while editing.
    pub const fn delete(&self) -> Option<ItemIntent> {
        if self.is_editing() {
            None
        } else {
            Some(ItemIntent::Delete { id: self.id })
        }
    }

    /// Display line: checkbox marker plus title.
    pub fn label(&self) -> String {
        let marker = if self.is_completed { "[x]" } else { "[ ]" };
        format!("{marker} {}", self.title)
    }
}
