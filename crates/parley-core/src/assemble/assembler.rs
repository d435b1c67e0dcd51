//! Builds the ordered turn list for one completion call.
//!
//! Output shape: `[system instruction] + prior history + [new user turn]`.
//! The system instruction is always first and singular: when the
//! supplied history already starts with a system turn (a caller passing
//! back previously assembled output), that turn is replaced by the
//! freshly rendered instruction rather than prepended to.

use parley_types::chat::{MessageRole, Turn};
use parley_types::error::TemplateError;
use parley_types::persona::Persona;

use super::template::PersonaTemplate;

/// Assembles completion requests from a persona template.
#[derive(Debug, Clone)]
pub struct MessageAssembler {
    template: PersonaTemplate,
}

impl MessageAssembler {
    pub fn new(template: PersonaTemplate) -> Self {
        Self { template }
    }

    /// Render the system instruction for a persona.
    pub fn render_instruction(&self, persona: &Persona) -> Result<String, TemplateError> {
        self.template.render(persona)
    }

    /// Assemble with a pre-rendered instruction.
    ///
    /// A leading system turn in `prior_history` is dropped in favor of
    /// `instruction`; interior turns are relayed untouched.
    pub fn assemble(instruction: &str, prior_history: &[Turn], user_message: &str) -> Vec<Turn> {
        let rest = match prior_history.first() {
            Some(turn) if turn.role == MessageRole::System => &prior_history[1..],
            _ => prior_history,
        };

        let mut turns = Vec::with_capacity(rest.len() + 2);
        turns.push(Turn::system(instruction));
        turns.extend_from_slice(rest);
        turns.push(Turn::user(user_message));
        turns
    }

    /// Render the instruction and assemble in one step.
    pub fn build(
        &self,
        persona: &Persona,
        user_message: &str,
        prior_history: &[Turn],
    ) -> Result<Vec<Turn>, TemplateError> {
        let instruction = self.render_instruction(persona)?;
        Ok(Self::assemble(&instruction, prior_history, user_message))
    }
}
