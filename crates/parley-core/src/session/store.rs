//! Process-wide session store with one lock per session id.
//!
//! Sessions are created lazily on first reference to an unknown id
//! (get-or-create -- lookups never fail with not-found) and destroyed
//! only by process termination. Each session sits behind its own
//! `tokio::sync::Mutex`, so at most one exchange mutates a session at a
//! time and appends land in exchange order.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::Mutex;
use tracing::info;

use parley_types::chat::{MessageRole, SessionOutcome, Turn};

use super::session::Session;

/// Handle to a stored session: the per-key lock plus whether this call
/// created it.
pub type SessionHandle = Arc<Mutex<Session>>;

/// The only shared mutable resource in the process.
pub struct SessionStore {
    sessions: DashMap<String, SessionHandle>,
    max_turns: usize,
}

impl SessionStore {
    /// Create an empty store. `max_turns` caps every session's history.
    pub fn new(max_turns: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            max_turns,
        }
    }

    /// Get-or-create the session for `id`, reporting which happened.
    ///
    /// On creation the session is seeded with `system_instruction` as
    /// its only turn; for an existing session the instruction argument
    /// is ignored (the instruction is fixed at creation).
    pub fn open(&self, id: &str, system_instruction: &str) -> (SessionHandle, SessionOutcome) {
        match self.sessions.entry(id.to_string()) {
            Entry::Occupied(entry) => (entry.get().clone(), SessionOutcome::Existing),
            Entry::Vacant(entry) => {
                let session = Arc::new(Mutex::new(Session::new(
                    id,
                    system_instruction,
                    self.max_turns,
                )));
                entry.insert(session.clone());
                info!(session_id = %id, "session created");
                (session, SessionOutcome::Created)
            }
        }
    }

    /// Idempotent creation: a no-op on an existing session.
    pub fn create(&self, id: &str, system_instruction: &str) -> SessionOutcome {
        self.open(id, system_instruction).1
    }

    /// Snapshot of a session's turns, creating the session first if
    /// absent.
    pub async fn history(&self, id: &str, system_instruction: &str) -> Vec<Turn> {
        let (session, _) = self.open(id, system_instruction);
        let session = session.lock().await;
        session.turns().to_vec()
    }

    /// Append one turn, creating the session first if absent.
    pub async fn append(
        &self,
        id: &str,
        system_instruction: &str,
        role: MessageRole,
        content: &str,
    ) {
        let (session, _) = self.open(id, system_instruction);
        let mut session = session.lock().await;
        session.append(role, content);
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_id_yields_single_system_turn() {
        let store = SessionStore::new(200);
        let history = store.history("never-seen", "You are Minji.").await;

        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, MessageRole::System);
        assert!(!history[0].content.is_empty());
    }

    #[tokio::test]
    async fn test_open_reports_created_then_existing() {
        let store = SessionStore::new(200);
        let (_, first) = store.open("s1", "sys");
        let (_, second) = store.open("s1", "other instruction");

        assert_eq!(first, SessionOutcome::Created);
        assert_eq!(second, SessionOutcome::Existing);
        assert_eq!(store.session_count(), 1);

        // The instruction from the second open was ignored.
        let history = store.history("s1", "ignored").await;
        assert_eq!(history[0].content, "sys");
    }

    #[tokio::test]
    async fn test_create_is_idempotent() {
        let store = SessionStore::new(200);
        assert_eq!(store.create("s1", "sys"), SessionOutcome::Created);
        assert_eq!(store.create("s1", "sys"), SessionOutcome::Existing);
        assert_eq!(store.session_count(), 1);
    }

    #[tokio::test]
    async fn test_n_appends_yield_n_plus_one_turns_in_order() {
        let store = SessionStore::new(200);
        store.append("s1", "sys", MessageRole::User, "one").await;
        store.append("s1", "sys", MessageRole::Assistant, "two").await;
        store.append("s1", "sys", MessageRole::User, "three").await;

        let history = store.history("s1", "sys").await;
        assert_eq!(history.len(), 4);
        let contents: Vec<_> = history.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["sys", "one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = SessionStore::new(200);
        store.append("a", "sys-a", MessageRole::User, "hi").await;
        store.append("b", "sys-b", MessageRole::User, "yo").await;

        assert_eq!(store.session_count(), 2);
        assert_eq!(store.history("a", "sys-a").await.len(), 2);
        assert_eq!(store.history("b", "sys-b").await.len(), 2);
    }

    #[tokio::test]
    async fn test_interleaved_appends_respect_per_session_lock() {
        let store = Arc::new(SessionStore::new(200));

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .append("shared", "sys", MessageRole::User, &format!("m{i}"))
                    .await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // Order across tasks is unspecified, but every append landed
        // exactly once and the system turn stayed first.
        let history = store.history("shared", "sys").await;
        assert_eq!(history.len(), 9);
        assert_eq!(history[0].role, MessageRole::System);
    }
}
