//! Persona instruction template rendering.
//!
//! The template is plain text with `{user_age}`, `{bot_gender}`, and
//! `{bot_name}` placeholders; `{{` and `}}` escape literal braces.
//! Loading the file is the infrastructure layer's job -- this type only
//! holds and renders the text.

use parley_types::error::TemplateError;
use parley_types::persona::Persona;

/// A parsed-on-demand persona template.
///
/// Loaded once at startup and cached; rendering is cheap enough to run
/// per request.
#[derive(Debug, Clone)]
pub struct PersonaTemplate {
    source: String,
}

impl PersonaTemplate {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Substitute the persona's fields into the template.
    ///
    /// Fails on a placeholder naming anything outside the persona's
    /// fields, on an unclosed `{`, or on a stray `}`.
    pub fn render(&self, persona: &Persona) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.source.len());
        let mut chars = self.source.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' => {
                    if chars.peek() == Some(&'{') {
                        chars.next();
                        out.push('{');
                        continue;
                    }
                    let mut key = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(c) => key.push(c),
                            None => return Err(TemplateError::UnclosedPlaceholder),
                        }
                    }
                    match key.as_str() {
                        "user_age" => out.push_str(&persona.user_age.to_string()),
                        "bot_gender" => out.push_str(&persona.bot_gender),
                        "bot_name" => out.push_str(&persona.bot_name),
                        other => {
                            return Err(TemplateError::UnknownPlaceholder(other.to_string()));
                        }
                    }
                }
                '}' => {
                    if chars.peek() == Some(&'}') {
                        chars.next();
                        out.push('}');
                    } else {
                        return Err(TemplateError::StrayBrace);
                    }
                }
                c => out.push(c),
            }
        }

        Ok(out)
    }
}
