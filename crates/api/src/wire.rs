//! Request and response payloads for the chat-style completion endpoint.

use serde::{Deserialize, Serialize};

/// Fixed system instruction constraining replies to a bare completion fragment.
pub const SYSTEM_INSTRUCTION: &str = "You are an assistant that provides short, contextual completions for sentences. \
Respond with only the completion, not a full sentence. \
Respond with only the completion, not a string with quotation marks.";

pub const MAX_TOKENS: u32 = 50;
pub const TEMPERATURE: f32 = 0.7;
pub const TOP_P: f32 = 1.0;
pub const STOP_SEQUENCES: [&str; 2] = ["\n", "."];

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    pub stop: Vec<String>,
}

impl ChatRequest {
    /// The two-message exchange sent for every prompt.
    pub fn for_prompt(prompt: &str) -> Self {
        Self {
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_INSTRUCTION.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: format!("Complete this sentence: \"{prompt}\""),
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            top_p: TOP_P,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            stop: STOP_SEQUENCES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// Content of the first choice, if the service returned one.
    pub fn first_content(self) -> Option<String> {
        self.choices.into_iter().next().and_then(|choice| choice.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_carries_fixed_generation_parameters() {
        let body = serde_json::to_value(ChatRequest::for_prompt("My name is")).unwrap();
        assert_eq!(body["max_tokens"], json!(50));
        assert_eq!(body["top_p"], json!(1.0));
        assert_eq!(body["frequency_penalty"], json!(0.0));
        assert_eq!(body["presence_penalty"], json!(0.0));
        assert_eq!(body["stop"], json!(["\n", "."]));
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);

        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"], SYSTEM_INSTRUCTION);
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[1]["content"], "Complete this sentence: \"My name is\"");
    }

    #[test]
    fn first_content_handles_missing_choices() {
        let empty: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert_eq!(empty.first_content(), None);

        let null_content: ChatResponse = serde_json::from_value(json!({"choices": [{"message": {"content": null}}]})).unwrap();
        assert_eq!(null_content.first_content(), None);
    }
}
