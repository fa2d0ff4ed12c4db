/*
 * Responsibility
 * - Blog の request/response DTO
 * - 公開 ID は encode 済みの値を返す (内部 ID を漏らさない)
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlogStatus {
    Draft,
    Published,
}

impl BlogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlogStatus::Draft => "draft",
            BlogStatus::Published => "published",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateBlogRequest {
    pub title: String,
    pub thumbnail: Option<String>,
    pub content: String,
}

impl CreateBlogRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.title.trim().is_empty() {
            return Err("title is required");
        }
        if self.title.len() > 200 {
            return Err("title must be <= 200 chars");
        }
        if self.content.trim().is_empty() {
            return Err("content is required");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateBlogStatusRequest {
    pub status: BlogStatus,
}

#[derive(Debug, Serialize)]
pub struct BlogResponse {
    pub id: String, // encoded
    pub title: String,
    pub thumbnail: Option<String>,
    pub content: String,
    pub status: String,
    pub author_email: String,
    pub created_at: DateTime<Utc>,
}
