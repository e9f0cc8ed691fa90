//! Edit session state machine
//!
//! At most one block is edited at a time. Activating another block discards the
//! current draft; nothing is ever committed implicitly.

use crate::geometry::PdfPoint;
use crate::text_block::{block_at, BlockKey, TextBlock};
use std::collections::HashMap;

/// An edit ready to be written to the page
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEdit {
    pub block: TextBlock,
    pub text: String,
}

/// Which block, if any, is being edited
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EditSession {
    #[default]
    Idle,
    Editing { block: TextBlock, draft: String },
}

/// What a pointer click did to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// A block was activated (replacing any previous draft)
    Activated,
    /// The click missed every block and discarded the draft
    Cancelled,
    /// The click missed every block while idle
    Ignored,
}

impl EditSession {
    pub fn is_editing(&self) -> bool {
        matches!(self, EditSession::Editing { .. })
    }

    pub fn block(&self) -> Option<&TextBlock> {
        match self {
            EditSession::Editing { block, .. } => Some(block),
            EditSession::Idle => None,
        }
    }

    pub fn draft(&self) -> Option<&str> {
        match self {
            EditSession::Editing { draft, .. } => Some(draft),
            EditSession::Idle => None,
        }
    }

    /// Start editing `block`, seeding the draft with its text.
    pub fn activate(&mut self, block: TextBlock) {
        if let EditSession::Editing { block: previous, .. } = self {
            if *previous != block {
                log::debug!("Discarding draft for block at {:?}", previous.rect);
            }
        }
        let draft = block.text.clone();
        *self = EditSession::Editing { block, draft };
    }

    /// Route a click at `point` (page coordinates) against the current blocks.
    pub fn click(&mut self, point: PdfPoint, blocks: &[TextBlock]) -> ClickOutcome {
        match block_at(blocks, point) {
            Some(block) => {
                self.activate(block.clone());
                ClickOutcome::Activated
            }
            None if self.is_editing() => {
                self.cancel();
                ClickOutcome::Cancelled
            }
            None => ClickOutcome::Ignored,
        }
    }

    /// Replace the draft. Returns `false` (and does nothing) while idle.
    pub fn edit(&mut self, text: impl Into<String>) -> bool {
        match self {
            EditSession::Editing { draft, .. } => {
                *draft = text.into();
                true
            }
            EditSession::Idle => false,
        }
    }

    /// Finish editing. Blank drafts are dropped so a stray commit cannot wipe text.
    pub fn commit(&mut self) -> Option<PendingEdit> {
        match std::mem::take(self) {
            EditSession::Editing { block, draft } if !draft.trim().is_empty() => {
                Some(PendingEdit { block, text: draft })
            }
            EditSession::Editing { block, .. } => {
                log::debug!("Ignoring blank edit for block at {:?}", block.rect);
                None
            }
            EditSession::Idle => None,
        }
    }

    pub fn cancel(&mut self) {
        *self = EditSession::Idle;
    }
}

/// Interaction reported by an overlay widget
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayEvent {
    Focused,
    Changed(String),
    FocusLost,
    CommitRequested,
}

/// Per-overlay listener registrations, keyed by block identity
///
/// Registrations are replaced wholesale whenever the page is re-rendered;
/// events for keys that are no longer registered come from stale widgets and
/// are dropped.
#[derive(Debug, Clone, Default)]
pub struct OverlayListeners {
    registered: HashMap<BlockKey, TextBlock>,
}

impl OverlayListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one listener per block, dropping all previous registrations.
    pub fn register_all<'a>(&mut self, blocks: impl IntoIterator<Item = &'a TextBlock>) {
        self.registered = blocks
            .into_iter()
            .map(|block| (block.key(), block.clone()))
            .collect();
    }

    pub fn is_registered(&self, key: BlockKey) -> bool {
        self.registered.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    pub fn clear(&mut self) {
        self.registered.clear();
    }

    /// Apply an overlay event to `session`, returning an edit to write if the
    /// event committed one.
    pub fn dispatch(
        &self,
        session: &mut EditSession,
        key: BlockKey,
        event: OverlayEvent,
    ) -> Option<PendingEdit> {
        let Some(block) = self.registered.get(&key) else {
            log::debug!("Dropping {:?} for unregistered overlay", event);
            return None;
        };
        let is_active = session.block().is_some_and(|active| active.key() == key);

        match event {
            OverlayEvent::Focused => {
                if !is_active {
                    session.activate(block.clone());
                }
                None
            }
            OverlayEvent::Changed(text) => {
                if !is_active {
                    session.activate(block.clone());
                }
                session.edit(text);
                None
            }
            OverlayEvent::FocusLost => {
                if is_active {
                    session.cancel();
                }
                None
            }
            OverlayEvent::CommitRequested => {
                if is_active {
                    session.commit()
                } else {
                    None
                }
            }
        }
    }
}
