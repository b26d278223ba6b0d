//! Article and affiliate-link records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ContentError;

/// Stored article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    /// URL of the uploaded thumbnail
    pub thumbnail: String,
    /// URL of the uploaded video, if any
    pub video: Option<String>,
    /// Rich-text HTML body
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleDraft {
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub video: Option<String>,
    pub content: String,
}

/// Input for editing an article. The thumbnail may be left as it was.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleUpdate {
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub video: Option<String>,
    pub content: String,
}

/// Stored affiliate link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Affiliate {
    pub id: String,
    pub link: String,
    pub thumbnail: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AffiliateDraft {
    pub link: String,
    pub thumbnail: String,
}

/// An editor left with nothing but an empty paragraph counts as empty
fn content_is_empty(content: &str) -> bool {
    let trimmed = content.trim();
    trimmed.is_empty() || trimmed == "<p></p>"
}

fn check_common(title: &str, description: &str, content: &str) -> Result<(), ContentError> {
    if title.trim().is_empty() {
        return Err(ContentError::Validation("title"));
    }
    if description.trim().is_empty() {
        return Err(ContentError::Validation("description"));
    }
    if content_is_empty(content) {
        return Err(ContentError::Validation("content"));
    }
    Ok(())
}

impl ArticleDraft {
    pub fn validate(&self) -> Result<(), ContentError> {
        check_common(&self.title, &self.description, &self.content)?;
        if self.thumbnail.trim().is_empty() {
            return Err(ContentError::Validation("thumbnail"));
        }
        Ok(())
    }
}

impl ArticleUpdate {
    pub fn validate(&self) -> Result<(), ContentError> {
        check_common(&self.title, &self.description, &self.content)
    }
}

impl AffiliateDraft {
    pub fn validate(&self) -> Result<(), ContentError> {
        if self.link.trim().is_empty() {
            return Err(ContentError::Validation("link"));
        }
        Ok(())
    }
}
