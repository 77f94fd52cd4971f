//! Client-side conversation state.
//!
//! The server pushes every event for a user down one identity channel; this
//! module holds the per-session state that decides what the open thread
//! actually shows.

mod reconciler;

pub use reconciler::{ActiveConversation, ReconcileError, Reconciler};

use crate::directory::{Party, Role};

/// A logged-in dashboard session. One variant per messaging role; admins
/// have no dashboard here.
#[derive(Debug)]
pub enum Dashboard {
    /// A guardian messaging their children's teachers.
    Parent {
        counterparts: Vec<Party>,
        reconciler: Reconciler,
    },
    /// A teacher messaging the guardians of their class.
    Teacher {
        counterparts: Vec<Party>,
        reconciler: Reconciler,
    },
}

impl Dashboard {
    /// Build the dashboard for a fresh login. `counterparts` is the
    /// directory-provided set of identities this user may message.
    pub fn for_login(role: Role, identity: impl Into<String>, counterparts: Vec<Party>) -> Option<Self> {
        let reconciler = Reconciler::new(identity);
        match role {
            Role::Parent => Some(Dashboard::Parent {
                counterparts,
                reconciler,
            }),
            Role::Teacher => Some(Dashboard::Teacher {
                counterparts,
                reconciler,
            }),
            Role::Admin => None,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Dashboard::Parent { .. } => Role::Parent,
            Dashboard::Teacher { .. } => Role::Teacher,
        }
    }

    pub fn counterparts(&self) -> &[Party] {
        match self {
            Dashboard::Parent { counterparts, .. } | Dashboard::Teacher { counterparts, .. } => {
                counterparts
            }
        }
    }

    pub fn reconciler(&mut self) -> &mut Reconciler {
        match self {
            Dashboard::Parent { reconciler, .. } | Dashboard::Teacher { reconciler, .. } => {
                reconciler
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teacher(id: &str) -> Party {
        Party {
            id: id.to_owned(),
            username: format!("t_{id}"),
            role: Role::Teacher,
        }
    }

    #[test]
    fn dashboard_variant_follows_role() {
        let parent = Dashboard::for_login(Role::Parent, "p1", vec![teacher("t1")]).unwrap();
        assert_eq!(parent.role(), Role::Parent);
        assert_eq!(parent.counterparts().len(), 1);

        let teacher_board = Dashboard::for_login(Role::Teacher, "t1", vec![]).unwrap();
        assert_eq!(teacher_board.role(), Role::Teacher);

        assert!(Dashboard::for_login(Role::Admin, "a1", vec![]).is_none());
    }

    #[test]
    fn reconciler_is_shared_across_variants() {
        let mut board = Dashboard::for_login(Role::Parent, "p1", vec![teacher("t1")]).unwrap();
        board.reconciler().open_conversation("t1", "Ms. Alice", vec![]);

        assert_eq!(board.reconciler().resolve_recipient().unwrap(), "t1");
    }
}
