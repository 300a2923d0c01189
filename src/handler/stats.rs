use futures::try_join;
use serde::Serialize;

use crate::handler::db::DatabaseService;
use crate::model::errors::ResError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumStats {
    pub topics: i64,
    pub messages: i64,
    pub active_users: i64,
}

impl DatabaseService {
    /// Aggregate counts for the forum landing page. Messages means
    /// topics plus replies; active users are user-directory rows touched
    /// in the last 30 days (read-only external query).
    pub async fn get_forum_stats(&self) -> Result<ForumStats, ResError> {
        let client = self.client().await?;

        let (topics, posts, active_users) = try_join!(
            client.query_one("SELECT COUNT(*) FROM forum_topics", &[]),
            client.query_one("SELECT COUNT(*) FROM forum_posts", &[]),
            client.query_one(
                "SELECT COUNT(*) FROM users WHERE updated_at >= now() - interval '30 days'",
                &[],
            ),
        )?;

        let topics: i64 = topics.try_get(0)?;
        let posts: i64 = posts.try_get(0)?;
        Ok(ForumStats {
            topics,
            messages: topics + posts,
            active_users: active_users.try_get(0)?,
        })
    }
}
