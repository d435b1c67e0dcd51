//! A single conversational session and its invariants.
//!
//! `turns[0]` is always the system turn carrying the rendered persona
//! instruction. It is set exactly once, at creation, and later appends
//! never mutate or duplicate it.

use parley_types::chat::{MessageRole, Turn};

/// Floor for the per-session turn cap: the system turn plus at least
/// one exchange turn must always fit.
const MIN_TURN_CAP: usize = 2;

/// One ongoing conversation, keyed by an opaque identifier.
#[derive(Debug)]
pub struct Session {
    id: String,
    turns: Vec<Turn>,
    max_turns: usize,
}

impl Session {
    /// Create a session whose only turn is the system instruction.
    ///
    /// `max_turns` caps total stored turns (system turn included) and is
    /// floored at 2.
    pub fn new(
        id: impl Into<String>,
        system_instruction: impl Into<String>,
        max_turns: usize,
    ) -> Self {
        Self {
            id: id.into(),
            turns: vec![Turn::system(system_instruction)],
            max_turns: max_turns.max(MIN_TURN_CAP),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The stored turns, in creation order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Append one exchange turn.
    ///
    /// The system instruction is fixed at creation; appending a system
    /// turn is a programming error.
    pub fn append(&mut self, role: MessageRole, content: impl Into<String>) {
        debug_assert!(
            role != MessageRole::System,
            "system instruction is fixed at session creation"
        );
        self.turns.push(Turn {
            role,
            content: content.into(),
        });
        self.enforce_cap();
    }

    /// Evict the oldest non-system turns past the cap. Index 0 is never
    /// touched.
    fn enforce_cap(&mut self) {
        while self.turns.len() > self.max_turns {
            self.turns.remove(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_has_single_system_turn() {
        let session = Session::new("s1", "You are a friend.", 200);
        assert_eq!(session.id(), "s1");
        assert_eq!(session.turns().len(), 1);
        assert_eq!(session.turns()[0].role, MessageRole::System);
        assert_eq!(session.turns()[0].content, "You are a friend.");
    }

    #[test]
    fn test_append_preserves_order() {
        let mut session = Session::new("s1", "sys", 200);
        session.append(MessageRole::User, "hello");
        session.append(MessageRole::Assistant, "hi there");
        session.append(MessageRole::User, "how are you?");

        let roles: Vec<_> = session.turns().iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![
                MessageRole::System,
                MessageRole::User,
                MessageRole::Assistant,
                MessageRole::User,
            ]
        );
        assert_eq!(session.turns()[3].content, "how are you?");
    }

    #[test]
    fn test_cap_evicts_oldest_but_never_system() {
        let mut session = Session::new("s1", "sys", 4);
        for i in 0..6 {
            session.append(MessageRole::User, format!("m{i}"));
        }

        assert_eq!(session.turns().len(), 4);
        assert_eq!(session.turns()[0].role, MessageRole::System);
        assert_eq!(session.turns()[0].content, "sys");
        // Oldest exchange turns were evicted.
        assert_eq!(session.turns()[1].content, "m3");
        assert_eq!(session.turns()[3].content, "m5");
    }

    #[test]
    fn test_cap_is_floored() {
        let mut session = Session::new("s1", "sys", 0);
        session.append(MessageRole::User, "hello");
        // Even with a zero cap, the system turn plus one turn remain.
        assert_eq!(session.turns().len(), 2);
        assert_eq!(session.turns()[0].role, MessageRole::System);
    }
}
