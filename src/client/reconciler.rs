use thiserror::Error;

use crate::messages::EnrichedMessage;

/// The thread currently on screen: one counterpart and its ordered messages.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveConversation {
    pub counterpart: String,
    pub counterpart_name: String,
    pub messages: Vec<EnrichedMessage>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReconcileError {
    /// The open thread records the caller itself as counterpart and no
    /// message in its history names anyone else. Sending must be refused
    /// rather than addressed back to the caller.
    #[error("cannot determine recipient")]
    RecipientIndeterminate,

    #[error("no active conversation")]
    NoActiveConversation,
}

/// Per-session state machine deciding which live pushes belong to the open
/// thread. The relay channel is per-user, not per-conversation, so every
/// push for any of the user's threads lands here and must be re-validated
/// against the active counterpart.
#[derive(Debug)]
pub struct Reconciler {
    self_identity: String,
    active: Option<ActiveConversation>,
}

impl Reconciler {
    pub fn new(self_identity: impl Into<String>) -> Self {
        Self {
            self_identity: self_identity.into(),
            active: None,
        }
    }

    pub fn self_identity(&self) -> &str {
        &self.self_identity
    }

    pub fn active(&self) -> Option<&ActiveConversation> {
        self.active.as_ref()
    }

    /// Open a thread with `counterpart`, replacing any previous thread
    /// wholesale with the fetched history. Nothing is merged across
    /// counterparts.
    pub fn open_conversation(
        &mut self,
        counterpart: impl Into<String>,
        counterpart_name: impl Into<String>,
        history: Vec<EnrichedMessage>,
    ) {
        self.active = Some(ActiveConversation {
            counterpart: counterpart.into(),
            counterpart_name: counterpart_name.into(),
            messages: history,
        });
    }

    pub fn close(&mut self) {
        self.active = None;
    }

    /// Handle a live push from the relay. Appended in receipt order iff the
    /// event's participant pair is exactly `{self, active counterpart}`;
    /// everything else is silently dropped (it belongs to a thread that is
    /// not on screen). Returns whether the event was appended.
    pub fn receive_live_event(&mut self, msg: EnrichedMessage) -> bool {
        let self_id = self.self_identity.as_str();
        let Some(active) = self.active.as_mut() else {
            return false;
        };

        let outgoing = msg.from.id == self_id && msg.to.id == active.counterpart;
        let incoming = msg.from.id == active.counterpart && msg.to.id == self_id;
        if !outgoing && !incoming {
            return false;
        }

        active.messages.push(msg);
        true
    }

    /// The identity a reply in the open thread should go to.
    ///
    /// A thread opened from a directory listing can record the caller itself
    /// as counterpart; in that case the real counterpart is inferred from any
    /// history message naming someone else. With no such message the send is
    /// refused.
    pub fn resolve_recipient(&self) -> Result<String, ReconcileError> {
        let active = self
            .active
            .as_ref()
            .ok_or(ReconcileError::NoActiveConversation)?;

        if active.counterpart != self.self_identity {
            return Ok(active.counterpart.clone());
        }

        active
            .messages
            .iter()
            .find_map(|msg| {
                if msg.from.id != self.self_identity {
                    Some(msg.from.id.clone())
                } else if msg.to.id != self.self_identity {
                    Some(msg.to.id.clone())
                } else {
                    None
                }
            })
            .ok_or(ReconcileError::RecipientIndeterminate)
    }
}
