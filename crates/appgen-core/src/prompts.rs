//! Prompt specs, question descriptors, and collected answers
//!
//! A prompt spec is a plain identifier, optionally containing a `?` marker.
//! The marker makes the question a yes/no confirmation defaulting to true;
//! without it the question is free-text input defaulting to a placeholder.
//! The marker is stripped to form the answer's variable name.

use std::collections::HashMap;

/// Marker character that turns a prompt spec into a confirmation
pub const BOOLEAN_MARKER: char = '?';

/// Default value for free-text questions
pub const DEFAULT_INPUT: &str = "foobar";

/// A collected answer value
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    /// Answer to a confirmation question
    Flag(bool),
    /// Answer to a free-text question
    Text(String),
}

impl Answer {
    /// Whether this answer counts as affirmative when filtering optional
    /// packages (an empty text answer is falsy)
    pub fn is_truthy(&self) -> bool {
        match self {
            Answer::Flag(value) => *value,
            Answer::Text(value) => !value.is_empty(),
        }
    }

    /// The answer as template substitution text
    pub fn render_value(&self) -> String {
        match self {
            Answer::Flag(value) => value.to_string(),
            Answer::Text(value) => value.clone(),
        }
    }
}

/// Answers keyed by variable name, produced once and never mutated after
pub type Answers = HashMap<String, Answer>;

/// Flatten answers into template variables
pub fn template_vars(answers: &Answers) -> HashMap<String, String> {
    answers
        .iter()
        .map(|(name, answer)| (name.clone(), answer.render_value()))
        .collect()
}

/// How a question is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    Confirm,
    Input,
}

/// One question derived from a prompt spec
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    /// Variable name the answer is stored under (marker stripped)
    pub name: String,
    pub kind: QuestionKind,
    /// Message shown to the user, quoting the original spec
    pub message: String,
    /// Default answer, also used wholesale in non-interactive mode
    pub default: Answer,
}

impl Question {
    /// Derive a question from a prompt spec string
    pub fn from_spec(spec: &str) -> Self {
        let is_confirm = spec.contains(BOOLEAN_MARKER);
        let name: String = spec.chars().filter(|c| *c != BOOLEAN_MARKER).collect();
        let (kind, default) = if is_confirm {
            (QuestionKind::Confirm, Answer::Flag(true))
        } else {
            (QuestionKind::Input, Answer::Text(DEFAULT_INPUT.to_string()))
        };
        Question {
            name,
            kind,
            message: format!("Value for {}", spec),
            default,
        }
    }
}
