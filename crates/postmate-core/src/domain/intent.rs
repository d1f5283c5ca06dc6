//! Classification of inbound conversational messages.

use serde::{Deserialize, Serialize};

use super::post::PostType;
use super::schedule::SchedulingToken;

/// Classified meaning of one inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    /// Post-type help request.
    Help,
    /// A bare `0`..`3` reply to the draft menu.
    ConfirmationDigit(u8),
    /// One of the fixed scheduling choices.
    SchedulingToken(SchedulingToken),
    /// Looks like a scheduling shorthand (`3h`, `5d`) but is not offered.
    UnknownSchedulingToken(String),
    /// `3 <text>`: the user's own version of the draft. May be empty.
    ModifiedDraftSubmission(String),
    /// Anything else starts a new post.
    NewPostRequest { topic: String, post_type: PostType },
}

impl Intent {
    /// Classify a message. Total: every input maps to an intent, so callers
    /// must discard blank messages before classifying.
    pub fn classify(text: &str) -> Intent {
        let text = text.trim();

        if ["help", "post types", "types"]
            .iter()
            .any(|k| text.eq_ignore_ascii_case(k))
        {
            return Intent::Help;
        }

        if let Some(digit) = confirmation_digit(text) {
            return Intent::ConfirmationDigit(digit);
        }

        if let Ok(token) = text.parse::<SchedulingToken>() {
            return Intent::SchedulingToken(token);
        }

        if looks_like_schedule(text) {
            return Intent::UnknownSchedulingToken(text.to_string());
        }

        if let Some(rest) = text.strip_prefix("3 ") {
            return Intent::ModifiedDraftSubmission(rest.trim().to_string());
        }

        if let Some((post_type, topic)) = typed_topic(text) {
            return Intent::NewPostRequest {
                topic: topic.to_string(),
                post_type,
            };
        }

        Intent::NewPostRequest {
            topic: text.to_string(),
            post_type: PostType::default(),
        }
    }

    /// Whether this intent is a reply about an existing post.
    pub fn needs_active_post(&self) -> bool {
        matches!(
            self,
            Intent::ConfirmationDigit(_)
                | Intent::SchedulingToken(_)
                | Intent::ModifiedDraftSubmission(_)
        )
    }
}

fn confirmation_digit(text: &str) -> Option<u8> {
    match text {
        "0" => Some(0),
        "1" => Some(1),
        "2" => Some(2),
        "3" => Some(3),
        _ => None,
    }
}

/// `<digits><h|d|w>`, e.g. `3h` or `10D`.
fn looks_like_schedule(text: &str) -> bool {
    let Some(unit) = text.chars().last() else {
        return false;
    };
    let digits = &text[..text.len() - unit.len_utf8()];
    matches!(unit.to_ascii_lowercase(), 'h' | 'd' | 'w')
        && !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit())
}

/// `<postType>:<topic>` with a non-empty topic.
fn typed_topic(text: &str) -> Option<(PostType, &str)> {
    PostType::ALL.into_iter().find_map(|post_type| {
        let name = post_type.as_str();
        let prefix = text.get(..name.len())?;
        if !prefix.eq_ignore_ascii_case(name) {
            return None;
        }
        let topic = text[name.len()..].strip_prefix(':')?.trim();
        (!topic.is_empty()).then_some((post_type, topic))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_post(topic: &str, post_type: PostType) -> Intent {
        Intent::NewPostRequest {
            topic: topic.to_string(),
            post_type,
        }
    }

    #[test]
    fn test_help_keywords() {
        assert_eq!(Intent::classify("HELP"), Intent::Help);
        assert_eq!(Intent::classify("Post Types"), Intent::Help);
        assert_eq!(Intent::classify(" types "), Intent::Help);
    }

    #[test]
    fn test_confirmation_digits() {
        for (text, digit) in [("0", 0), ("1", 1), ("2", 2), ("3", 3)] {
            assert_eq!(Intent::classify(text), Intent::ConfirmationDigit(digit));
        }
        assert_eq!(Intent::classify("4"), new_post("4", PostType::Educational));
    }

    #[test]
    fn test_scheduling_tokens() {
        assert_eq!(
            Intent::classify("Now"),
            Intent::SchedulingToken(SchedulingToken::Now)
        );
        assert_eq!(
            Intent::classify(" 12H "),
            Intent::SchedulingToken(SchedulingToken::TwelveHours)
        );
    }

    #[test]
    fn test_unknown_scheduling_shorthand() {
        assert_eq!(
            Intent::classify("3h"),
            Intent::UnknownSchedulingToken("3h".to_string())
        );
        assert_eq!(
            Intent::classify("10D"),
            Intent::UnknownSchedulingToken("10D".to_string())
        );
        assert_eq!(Intent::classify("h"), new_post("h", PostType::Educational));
    }

    #[test]
    fn test_modified_draft_submission() {
        assert_eq!(
            Intent::classify("3 Here is my edited post"),
            Intent::ModifiedDraftSubmission("Here is my edited post".to_string())
        );
        assert_eq!(
            Intent::classify("3   spaced out  "),
            Intent::ModifiedDraftSubmission("spaced out".to_string())
        );
    }

    #[test]
    fn test_typed_topic() {
        assert_eq!(
            Intent::classify("Listicle: remote work tips"),
            new_post("remote work tips", PostType::Listicle)
        );
        assert_eq!(
            Intent::classify("thought-leadership:future of AI"),
            new_post("future of AI", PostType::ThoughtLeadership)
        );
    }

    #[test]
    fn test_typed_prefix_without_topic_falls_through() {
        assert_eq!(
            Intent::classify("interview:   "),
            new_post("interview:", PostType::Educational)
        );
    }

    #[test]
    fn test_plain_topic_defaults_to_educational() {
        assert_eq!(
            Intent::classify("AI in healthcare"),
            new_post("AI in healthcare", PostType::Educational)
        );
    }

    #[test]
    fn test_needs_active_post() {
        assert!(Intent::ConfirmationDigit(1).needs_active_post());
        assert!(Intent::SchedulingToken(SchedulingToken::Now).needs_active_post());
        assert!(Intent::ModifiedDraftSubmission(String::new()).needs_active_post());
        assert!(!Intent::Help.needs_active_post());
        assert!(!new_post("x", PostType::Educational).needs_active_post());
    }
}
