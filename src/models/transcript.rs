use std::fmt;

/// A call transcript that passed validation
///
/// Only the validate stage constructs one, so holding a `Transcript` means the
/// text is non-blank and long enough. The caller's text is kept as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    text: String,
}

impl Transcript {
    pub(crate) fn accepted(text: String) -> Self {
        Self { text }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_inner(self) -> String {
        self.text
    }
}

impl AsRef<str> for Transcript {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Canned call transcripts for trying the pipeline end to end
pub const SAMPLE_TRANSCRIPTS: [(&str, &str); 5] = [
    (
        "billing-confusion",
        "Hello, I'm calling about my monthly bill. I usually pay around $45 but this month it's $78 and I don't understand why. I didn't use any extra services or change my plan. Can you help me figure out what these additional charges are for? I'm not angry, just really confused about what happened.",
    ),
    (
        "tech-support-anxiety",
        "Hi, my laptop has been running extremely slow for the past week and now it's not starting up properly. I have an important presentation tomorrow and all my files are on this computer. I'm really worried I might lose everything. Can you please help me fix this quickly?",
    ),
    (
        "product-return",
        "I ordered a wireless headset last week expecting premium quality based on your website description, but the sound quality is terrible and it keeps disconnecting from my phone. This is really disappointing because I specifically chose your brand based on the reviews. I'd like to return this and get a full refund please.",
    ),
    (
        "account-access",
        "Good morning, I'm trying to log into my online account but I can't remember my password. I've tried the password reset option but I'm not receiving the email. Could you help me reset my password or check if there's an issue with my email address on file?",
    ),
    (
        "delivery-delay",
        "This is ridiculous! I paid extra for express shipping and my package was supposed to arrive three days ago. I need these items for my daughter's birthday party this weekend. Every time I track the package it just says 'in transit' with no real updates. Where is my order and when will it actually arrive?",
    ),
];

/// Look up a sample transcript by name
pub fn sample_transcript(name: &str) -> Option<&'static str> {
    SAMPLE_TRANSCRIPTS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, text)| *text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_lookup() {
        let text = sample_transcript("delivery-delay").unwrap();
        assert!(text.starts_with("This is ridiculous!"));
        assert!(sample_transcript("unknown").is_none());
    }

    #[test]
    fn test_transcript_keeps_original_text() {
        let transcript = Transcript::accepted("  padded text here  ".to_string());
        assert_eq!(transcript.as_str(), "  padded text here  ");
        assert_eq!(transcript.into_inner(), "  padded text here  ");
    }
}
