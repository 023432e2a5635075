use serde_json::json;

/// System prompt for the summary call
pub const SUMMARY_SYSTEM_PROMPT: &str = r#"You are an expert at summarizing customer service calls.
Create a concise 2-3 sentence summary that captures:
- The main customer issue or request
- Any actions taken or solutions provided
- The overall outcome or next steps
Focus on the key business-relevant information.
Submit the summary using the submit_summary tool."#;

/// System prompt for the sentiment call
pub const SENTIMENT_SYSTEM_PROMPT: &str = r#"You are an expert at analyzing customer emotions and sentiment from service calls.
Identify the customer's primary emotional state and sentiment throughout the conversation.
Be specific and descriptive - use terms like:
- Frustrated, Angry, Irritated (for negative emotions)
- Satisfied, Grateful, Happy (for positive emotions)
- Confused, Uncertain, Neutral (for neutral states)
- Anxious, Concerned, Worried (for concern-based emotions)

Provide the most accurate emotional descriptor that captures the customer's overall tone.
Submit it using the submit_sentiment tool."#;

/// A forced tool call with a single required string field
#[derive(Debug, Clone, Copy)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// The one property the model must fill in
    pub field: &'static str,
    pub field_description: &'static str,
}

impl ToolSpec {
    /// JSON schema for the tool parameters
    pub fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                self.field: {
                    "type": "string",
                    "description": self.field_description
                }
            },
            "required": [self.field]
        })
    }
}

pub const SUMMARY_TOOL: ToolSpec = ToolSpec {
    name: "submit_summary",
    description: "Submit the summary of the customer call",
    field: "summary",
    field_description: "Concise 2-3 sentence summary of the customer call focusing on main issue and resolution.",
};

pub const SENTIMENT_TOOL: ToolSpec = ToolSpec {
    name: "submit_sentiment",
    description: "Submit the customer's emotional state",
    field: "sentiment",
    field_description: "Customer's emotional state and sentiment expressed during the call (e.g., frustrated, satisfied, confused, angry, grateful, etc.)",
};

/// Build the user message embedding the transcript
///
/// With `max_chars` set, only that many characters of the transcript go into
/// the prompt.
pub fn build_transcript_prompt(heading: &str, transcript: &str, max_chars: Option<usize>) -> String {
    let body = match max_chars {
        Some(limit) => truncate_chars(transcript, limit),
        None => transcript,
    };

    format!("{}:\n\n{}", heading, body)
}

pub fn build_summary_prompt(transcript: &str, max_chars: Option<usize>) -> String {
    build_transcript_prompt("Transcript to summarize", transcript, max_chars)
}

pub fn build_sentiment_prompt(transcript: &str, max_chars: Option<usize>) -> String {
    build_transcript_prompt("Transcript to analyze", transcript, max_chars)
}

fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
