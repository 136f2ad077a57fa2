//! Pull generated output out of llama.cpp completion responses.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct TextChoice {
    text: String,
}

#[derive(Debug, Deserialize)]
struct Completion<C> {
    #[serde(default = "Vec::new")]
    choices: Vec<C>,
}

/// `choices[0].message` of a `create_chat_completion` response
pub fn parse_chat_completion(response: &Value) -> Result<ChatMessage> {
    let completion: Completion<ChatChoice> = Completion::deserialize(response)?;
    completion
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or(Error::MissingField("choices[0].message"))
}

/// `choices[0].text` of a plain text completion response
pub fn parse_text_completion(response: &Value) -> Result<String> {
    let completion: Completion<TextChoice> = Completion::deserialize(response)?;
    completion
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.text)
        .ok_or(Error::MissingField("choices[0].text"))
}
