use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use uuid::Uuid;

use crate::model::{errors::ResError, vote::VoteCount};

pub const CONTENT_MIN: usize = 1;
pub const CONTENT_MAX: usize = 5_000;

#[derive(Debug, Serialize)]
pub struct Post {
    pub id: Uuid,
    pub content: String,
    pub topic_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub author_id: Uuid,
    pub author_name: String,
    pub author_avatar: Option<String>,
    pub vote_score: i32,
    pub is_edited: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<Row> for Post {
    type Error = ResError;

    fn try_from(row: Row) -> Result<Self, Self::Error> {
        Ok(Post {
            id: row.try_get("id")?,
            content: row.try_get("content")?,
            topic_id: row.try_get("topic_id")?,
            parent_id: row.try_get("parent_id")?,
            author_id: row.try_get("author_id")?,
            author_name: row.try_get("author_name")?,
            author_avatar: row.try_get("author_avatar")?,
            vote_score: row.try_get("vote_score")?,
            is_edited: row.try_get("is_edited")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[derive(Serialize)]
pub struct PostWithVotes {
    #[serde(flatten)]
    pub post: Post,
    pub like_count: i64,
    pub dislike_count: i64,
}

impl Post {
    pub fn attach_votes(self, counts: &HashMap<Uuid, VoteCount>) -> PostWithVotes {
        let count = counts.get(&self.id).copied().unwrap_or_default();
        PostWithVotes {
            post: self,
            like_count: count.like_count,
            dislike_count: count.dislike_count,
        }
    }
}

/// Top-level post carrying its direct replies. Nesting stops here, a
/// reply can never be a parent.
#[derive(Serialize)]
pub struct PostWithReplies {
    #[serde(flatten)]
    pub post: Post,
    pub like_count: i64,
    pub dislike_count: i64,
    pub replies: Vec<PostWithVotes>,
}

/// Groups reply rows under their parents, keeping the reply query's
/// created_at ordering. Replies whose parent is not in the page are
/// dropped.
pub fn group_replies(
    top_level: Vec<Post>,
    replies: Vec<Post>,
    counts: &HashMap<Uuid, VoteCount>,
) -> Vec<PostWithReplies> {
    let mut by_parent: HashMap<Uuid, Vec<Post>> = HashMap::new();
    for reply in replies {
        if let Some(parent_id) = reply.parent_id {
            by_parent.entry(parent_id).or_default().push(reply);
        }
    }

    top_level
        .into_iter()
        .map(|post| {
            let replies = by_parent
                .remove(&post.id)
                .unwrap_or_default()
                .into_iter()
                .map(|r| r.attach_votes(counts))
                .collect();
            let count = counts.get(&post.id).copied().unwrap_or_default();
            PostWithReplies {
                post,
                like_count: count.like_count,
                dislike_count: count.dislike_count,
                replies,
            }
        })
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct PostRequest {
    pub content: String,
    pub topic_id: Uuid,
    pub parent_id: Option<Uuid>,
}

impl PostRequest {
    pub fn check_new(&self) -> Result<(), ResError> {
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
pub enum PostSort {
    #[default]
    Oldest,
    Newest,
    Popular,
}

impl PostSort {
    pub fn order_clause(self) -> &'static str {
        match self {
            PostSort::Oldest => "ORDER BY created_at ASC",
            PostSort::Newest => "ORDER BY created_at DESC",
            PostSort::Popular => "ORDER BY vote_score DESC",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PostListQuery {
    pub topic_id: Uuid,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(default)]
    pub sort: PostSort,
}

#[derive(Debug, Deserialize)]
pub struct PostRemoveQuery {
    pub post_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::vote::{tally_votes, VoteType};
    use chrono::TimeZone;

    fn post(id: Uuid, topic_id: Uuid, parent_id: Option<Uuid>, minute: u32) -> Post {
        Post {
            id,
            content: "merhaba".to_owned(),
            topic_id,
            parent_id,
            author_id: Uuid::new_v4(),
            author_name: "ayse".to_owned(),
            author_avatar: None,
            vote_score: 0,
            is_edited: false,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, minute, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, minute, 0).unwrap(),
        }
    }

    #[test]
    fn content_bounds_are_enforced() {
        let request = |content: String| PostRequest {
            content,
            topic_id: Uuid::new_v4(),
            parent_id: None,
        };
        assert!(request(String::new()).check_new().is_err());
        assert!(request(" ".to_owned()).check_new().is_err());
        assert!(request("x".to_owned()).check_new().is_ok());
        assert!(request("x".repeat(5_000)).check_new().is_ok());
        assert!(request("x".repeat(5_001)).check_new().is_err());
    }

    #[test]
    fn replies_nest_under_their_parent_in_order() {
        let topic_id = Uuid::new_v4();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let r1 = Uuid::new_v4();
        let r2 = Uuid::new_v4();
        let r3 = Uuid::new_v4();

        let top_level = vec![post(a, topic_id, None, 0), post(b, topic_id, None, 1)];
        // reply rows arrive ordered by created_at, grouping must keep that
        let replies = vec![
            post(r1, topic_id, Some(a), 2),
            post(r2, topic_id, Some(b), 3),
            post(r3, topic_id, Some(a), 4),
        ];

        let grouped = group_replies(top_level, replies, &HashMap::new());
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].post.id, a);
        assert_eq!(grouped[0].replies.len(), 2);
        assert_eq!(grouped[0].replies[0].post.id, r1);
        assert_eq!(grouped[0].replies[1].post.id, r3);
        assert_eq!(grouped[1].replies.len(), 1);
        assert_eq!(grouped[1].replies[0].post.id, r2);
    }

    #[test]
    fn orphan_replies_are_dropped() {
        let topic_id = Uuid::new_v4();
        let a = Uuid::new_v4();
        let stray = post(Uuid::new_v4(), topic_id, Some(Uuid::new_v4()), 5);

        let grouped = group_replies(vec![post(a, topic_id, None, 0)], vec![stray], &HashMap::new());
        assert_eq!(grouped.len(), 1);
        assert!(grouped[0].replies.is_empty());
    }

    #[test]
    fn vote_counts_attach_to_posts_and_replies() {
        let topic_id = Uuid::new_v4();
        let a = Uuid::new_v4();
        let r1 = Uuid::new_v4();

        let counts = tally_votes(&[
            (a, VoteType::Up),
            (a, VoteType::Up),
            (r1, VoteType::Down),
        ]);

        let grouped = group_replies(
            vec![post(a, topic_id, None, 0)],
            vec![post(r1, topic_id, Some(a), 1)],
            &counts,
        );
        assert_eq!(grouped[0].like_count, 2);
        assert_eq!(grouped[0].dislike_count, 0);
        assert_eq!(grouped[0].replies[0].dislike_count, 1);
    }
}
