mod error;
mod gemini;
mod prompt;

pub use error::TranslateError;
pub use gemini::{GeminiClient, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use prompt::SchemaPrompt;

/// Turns a natural-language question into SQL text for the store schema.
///
/// The returned text is not trusted: callers sanitize it before execution.
pub trait Translator {
    fn translate(&self, question: &str, prompt: &SchemaPrompt) -> Result<String, TranslateError>;
}

impl<F> Translator for F
where
    F: Fn(&str, &SchemaPrompt) -> Result<String, TranslateError>,
{
    fn translate(&self, question: &str, prompt: &SchemaPrompt) -> Result<String, TranslateError> {
        self(question, prompt)
    }
}
