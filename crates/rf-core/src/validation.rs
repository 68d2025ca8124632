//! # Content Validation
//!
//! A stateless validator built once at startup and handed to the services.
//! It owns its compiled pattern, so there is no process-wide regex.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ForumError, Result};
use crate::models::VoteKind;

/// At least one word of three or more letters.
const TITLE_WORD_PATTERN: &str = r"(?i)\b[a-z]{3,}\b";

/// Character limits applied to user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationLimits {
    pub title_max_chars: usize,
    pub content_max_chars: usize,
    pub search_max_chars: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self { title_max_chars: 35, content_max_chars: 70, search_max_chars: 35 }
    }
}

#[derive(Debug, Clone)]
pub struct ContentValidator {
    limits: ValidationLimits,
    title_word: Regex,
}

impl ContentValidator {
    pub fn new(limits: ValidationLimits) -> std::result::Result<Self, regex::Error> {
        Ok(Self { limits, title_word: Regex::new(TITLE_WORD_PATTERN)? })
    }

    pub fn limits(&self) -> ValidationLimits {
        self.limits
    }

    pub fn validate_title(&self, title: &str) -> Result<()> {
        let trimmed = required("title", title)?;
        within("title", trimmed, self.limits.title_max_chars)?;
        if !self.title_word.is_match(trimmed) {
            return Err(ForumError::Validation(
                "title must contain at least one word with three or more letters".into(),
            ));
        }
        Ok(())
    }

    pub fn validate_content(&self, content: &str) -> Result<()> {
        let trimmed = required("content", content)?;
        within("content", trimmed, self.limits.content_max_chars)
    }

    pub fn validate_search_term(&self, term: &str) -> Result<()> {
        let trimmed = required("search term", term)?;
        within("search term", trimmed, self.limits.search_max_chars)
    }

    pub fn parse_vote(&self, raw: &str) -> Result<VoteKind> {
        raw.trim().parse()
    }
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ForumError::Validation(format!("{field} is required")));
    }
    Ok(trimmed)
}

fn within(field: &str, value: &str, max_chars: usize) -> Result<()> {
    if value.chars().count() > max_chars {
        return Err(ForumError::Validation(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(())
}
