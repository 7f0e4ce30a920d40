use serde::{Deserialize, Serialize};

/// A chat answer plus the prompt suggestions pulled out of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub text: String,
    pub suggestions: Vec<String>,
}

impl ChatReply {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let suggestions = crate::suggestions::extract(&text);
        Self { text, suggestions }
    }
}
