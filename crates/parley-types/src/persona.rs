//! Persona supplied with each chat request.

use serde::{Deserialize, Serialize};

/// The identity the bot role-plays for one conversation.
///
/// Supplied per request and rendered into the system instruction
/// template; a session fixes its rendered instruction at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// The user's age; the bot matches it.
    pub user_age: u32,
    pub bot_gender: String,
    pub bot_name: String,
}
