use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use uuid::Uuid;

use crate::model::{
    category::CategoryRef,
    errors::ResError,
    vote::VoteCount,
};

pub const TITLE_MIN: usize = 5;
pub const TITLE_MAX: usize = 200;
pub const CONTENT_MIN: usize = 10;
pub const CONTENT_MAX: usize = 10_000;

#[derive(Debug, Serialize)]
pub struct Topic {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category_id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub author_avatar: Option<String>,
    pub is_pinned: bool,
    pub is_locked: bool,
    pub view_count: i32,
    pub reply_count: i32,
    pub vote_score: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_reply_at: DateTime<Utc>,
}

impl TryFrom<Row> for Topic {
    type Error = ResError;

    fn try_from(row: Row) -> Result<Self, Self::Error> {
        Ok(Topic {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            content: row.try_get("content")?,
            category_id: row.try_get("category_id")?,
            author_id: row.try_get("author_id")?,
            author_name: row.try_get("author_name")?,
            author_avatar: row.try_get("author_avatar")?,
            is_pinned: row.try_get("is_pinned")?,
            is_locked: row.try_get("is_locked")?,
            view_count: row.try_get("view_count")?,
            reply_count: row.try_get("reply_count")?,
            vote_score: row.try_get("vote_score")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            last_reply_at: row.try_get("last_reply_at")?,
        })
    }
}

/// Topic row with its category joined in one query. The category is
/// optional only because the join is a LEFT JOIN.
#[derive(Debug)]
pub struct TopicWithCategory {
    pub topic: Topic,
    pub category: Option<CategoryRef>,
}

impl TryFrom<Row> for TopicWithCategory {
    type Error = ResError;

    fn try_from(row: Row) -> Result<Self, Self::Error> {
        let category = row
            .try_get::<_, Option<String>>("category_name")?
            .map(|name| -> Result<CategoryRef, ResError> {
                Ok(CategoryRef {
                    id: row.try_get("category_id")?,
                    name,
                    color: row.try_get("category_color")?,
                })
            })
            .transpose()?;

        Ok(TopicWithCategory {
            topic: Topic::try_from(row)?,
            category,
        })
    }
}

impl TopicWithCategory {
    pub fn attach_votes(self, counts: &HashMap<Uuid, VoteCount>) -> TopicWithVotes {
        let count = counts.get(&self.topic.id).copied().unwrap_or_default();
        TopicWithVotes {
            topic: self.topic,
            category: self.category,
            like_count: count.like_count,
            dislike_count: count.dislike_count,
        }
    }
}

#[derive(Serialize)]
pub struct TopicWithVotes {
    #[serde(flatten)]
    pub topic: Topic,
    pub category: Option<CategoryRef>,
    pub like_count: i64,
    pub dislike_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct TopicRequest {
    pub title: String,
    pub content: String,
    pub category_id: Uuid,
}

impl TopicRequest {
    pub fn check_new(&self) -> Result<(), ResError> {
        let title = self.title.trim();
        if title.chars().count() < TITLE_MIN || title.chars().count() > TITLE_MAX {
            return Err(ResError::BadRequest(format!(
                "Title must be between {} and {} characters",
                TITLE_MIN, TITLE_MAX
            )));
        }
        let content = self.content.trim();
        if content.chars().count() < CONTENT_MIN || content.chars().count() > CONTENT_MAX {
            return Err(ResError::BadRequest(format!(
                "Content must be between {} and {} characters",
                CONTENT_MIN, CONTENT_MAX
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TopicSort {
    #[default]
    Latest,
    Popular,
    Oldest,
}

impl TopicSort {
    pub fn order_clause(self) -> &'static str {
        match self {
            TopicSort::Latest => "ORDER BY t.is_pinned DESC, t.last_reply_at DESC",
            TopicSort::Popular => "ORDER BY t.vote_score DESC",
            TopicSort::Oldest => "ORDER BY t.created_at ASC",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TopicListQuery {
    pub id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(default)]
    pub sort: TopicSort,
}

#[derive(Debug, Deserialize)]
pub struct TopicRemoveQuery {
    pub topic_id: Uuid,
    // legacy wire field, authorization uses the session's author id only
    #[allow(dead_code)]
    pub author_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: &str, content: &str) -> TopicRequest {
        TopicRequest {
            title: title.to_owned(),
            content: content.to_owned(),
            category_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn title_bounds_are_enforced() {
        assert!(request("abcd", &"x".repeat(20)).check_new().is_err());
        assert!(request("abcde", &"x".repeat(20)).check_new().is_ok());
        assert!(request(&"t".repeat(200), &"x".repeat(20)).check_new().is_ok());
        assert!(request(&"t".repeat(201), &"x".repeat(20)).check_new().is_err());
    }

    #[test]
    fn content_bounds_are_enforced() {
        assert!(request("a title", &"x".repeat(9)).check_new().is_err());
        assert!(request("a title", &"x".repeat(10)).check_new().is_ok());
        assert!(request("a title", &"x".repeat(10_000)).check_new().is_ok());
        assert!(request("a title", &"x".repeat(10_001)).check_new().is_err());
    }

    #[test]
    fn sort_defaults_to_latest() {
        let q: TopicListQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.sort, TopicSort::Latest);

        let q: TopicListQuery = serde_json::from_str(r#"{"sort":"popular"}"#).unwrap();
        assert_eq!(q.sort, TopicSort::Popular);
        assert!(q.sort.order_clause().contains("vote_score"));
    }
}
