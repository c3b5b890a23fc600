//! Prompt construction for transcript cleanup

pub const SYSTEM_INSTRUCTION: &str = "You are a dictation assistant. Clean up text by fixing grammar and punctuation. Output ONLY the cleaned text without any explanations, options, or commentary.";

/// User-message template.
///
/// `Agent` is chosen when the user addressed the persona by name in the
/// dictated text; the model is then told to drop its own name from the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptTemplate {
    Agent(String),
    Regular,
}

impl PromptTemplate {
    pub fn select(text: &str, persona: Option<&str>) -> Self {
        match persona.map(str::trim) {
            Some(name) if !name.is_empty() && text.to_lowercase().contains(&name.to_lowercase()) => {
                Self::Agent(name.to_string())
            }
            _ => Self::Regular,
        }
    }

    pub fn is_agent(&self) -> bool {
        matches!(self, Self::Agent(_))
    }

    pub fn render(&self, text: &str) -> String {
        match self {
            Self::Agent(name) => format!(
                "You are {name}, a helpful AI assistant. Process and improve the following text, removing any reference to your name from the output:\n\n{text}\n\nImproved text:"
            ),
            Self::Regular => {
                format!("Process and improve the following text:\n\n{text}\n\nImproved text:")
            }
        }
    }
}
