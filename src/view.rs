//! Display sink abstraction.
//!
//! The client never touches a real UI. It talks to a [`ChatView`], which
//! owns an ordered list of message slots and an input control. Each message
//! gets one slot, addressed through a [`RenderTarget`].

use std::sync::{Mutex, MutexGuard, PoisonError};

use itertools::Itertools;

use crate::model::Role;

/// Identifier of one message slot inside a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub usize);

/// Display surface for a conversation.
///
/// Methods take `&self` so that several in-flight replies can share a view;
/// implementations provide their own interior mutability.
pub trait ChatView: Send + Sync {
    /// Append an empty slot for a new message and return its id.
    fn create_slot(&self, role: Role) -> SlotId;

    /// Replace the displayed HTML of a slot.
    fn set_html(&self, slot: SlotId, html: &str);

    /// Bring the newest content into view.
    fn scroll_to_latest(&self);

    /// Empty the text input after a submission.
    fn clear_input(&self);
}

/// Handle to the slot of a single message.
///
/// Not `Clone`: the request that created it is its only writer.
#[derive(Debug, PartialEq, Eq)]
pub struct RenderTarget {
    slot: SlotId,
}

impl RenderTarget {
    /// Allocate a slot in `view` for a message with the given role.
    pub fn create<V: ChatView + ?Sized>(view: &V, role: Role) -> Self {
        Self {
            slot: view.create_slot(role),
        }
    }

    pub fn slot(&self) -> SlotId {
        self.slot
    }

    /// Overwrite the slot with `html`.
    pub fn write<V: ChatView + ?Sized>(&self, view: &V, html: &str) {
        view.set_html(self.slot, html);
    }
}

/// One rendered message in a [`Transcript`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub role: Role,
    pub html: String,
    /// How many times the slot has been written.
    pub revisions: usize,
}

#[derive(Debug, Default)]
struct TranscriptState {
    entries: Vec<TranscriptEntry>,
    scrolled_to: Option<usize>,
    input_clears: usize,
}

/// In-memory [`ChatView`] that keeps the latest HTML of every slot.
#[derive(Debug, Default)]
pub struct Transcript {
    state: Mutex<TranscriptState>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, TranscriptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of all entries in display order.
    pub fn entries(&self) -> Vec<TranscriptEntry> {
        self.state().entries.clone()
    }

    pub fn entry(&self, slot: SlotId) -> Option<TranscriptEntry> {
        self.state().entries.get(slot.0).cloned()
    }

    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots that were visible at the last scroll, if any.
    pub fn scrolled_to(&self) -> Option<usize> {
        self.state().scrolled_to
    }

    pub fn input_clears(&self) -> usize {
        self.state().input_clears
    }

    /// Render the whole conversation as an HTML fragment.
    pub fn to_html(&self) -> String {
        self.state()
            .entries
            .iter()
            .map(|entry| {
                let class = match entry.role {
                    Role::User => "user-message",
                    Role::Assistant => "bot-message",
                };
                format!("<div class=\"message {}\">{}</div>", class, entry.html)
            })
            .join("\n")
    }
}

impl ChatView for Transcript {
    fn create_slot(&self, role: Role) -> SlotId {
        let mut state = self.state();
        state.entries.push(TranscriptEntry {
            role,
            html: String::new(),
            revisions: 0,
        });
        SlotId(state.entries.len() - 1)
    }

    fn set_html(&self, slot: SlotId, html: &str) {
        if let Some(entry) = self.state().entries.get_mut(slot.0) {
            entry.html.clear();
            entry.html.push_str(html);
            entry.revisions += 1;
        }
    }

    fn scroll_to_latest(&self) {
        let mut state = self.state();
        state.scrolled_to = Some(state.entries.len());
    }

    fn clear_input(&self) {
        self.state().input_clears += 1;
    }
}
