//! Overlay editing modes

use pdf_text_editor_core::BlockKey;
use std::collections::HashMap;

/// How overlays turn into text editors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditMode {
    /// Clicking a block opens a single editor over it
    #[default]
    ClickToEdit,
    /// Every block has its own editor; one of them is active at a time
    EditAll,
}

impl EditMode {
    pub const ALL: [EditMode; 2] = [EditMode::ClickToEdit, EditMode::EditAll];

    pub fn label(&self) -> &'static str {
        match self {
            EditMode::ClickToEdit => "Click to edit",
            EditMode::EditAll => "Edit all",
        }
    }
}

/// Text buffers of the per-block editors in [`EditMode::EditAll`]
#[derive(Debug, Default)]
pub struct BatchBuffers {
    buffers: HashMap<BlockKey, String>,
    /// Editor that currently has keyboard focus
    focused: Option<BlockKey>,
}

impl BatchBuffers {
    /// Reset every buffer to its block's current text.
    pub fn reset<'a>(&mut self, blocks: impl IntoIterator<Item = (BlockKey, &'a str)>) {
        self.buffers = blocks
            .into_iter()
            .map(|(key, text)| (key, text.to_string()))
            .collect();
        self.focused = None;
    }

    /// Put `key`'s buffer back to `text` after its draft was discarded.
    pub fn revert(&mut self, key: BlockKey, text: &str) {
        if let Some(buffer) = self.buffers.get_mut(&key) {
            buffer.clear();
            buffer.push_str(text);
        }
    }

    pub fn buffer_mut(&mut self, key: BlockKey) -> Option<&mut String> {
        self.buffers.get_mut(&key)
    }

    pub fn focused(&self) -> Option<BlockKey> {
        self.focused
    }

    pub fn set_focused(&mut self, key: Option<BlockKey>) {
        self.focused = key;
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }
}
