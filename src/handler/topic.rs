use uuid::Uuid;

use crate::handler::db::DatabaseService;
use crate::model::{
    common::{clamp_limit, clamp_page, ListData, Pagination},
    errors::ResError,
    topic::{Topic, TopicListQuery, TopicRequest, TopicWithCategory, TopicWithVotes},
    user::SessionUser,
    vote::VoteTarget,
};

const SELECT_TOPICS: &str = "SELECT t.id, t.title, t.content, t.category_id, t.author_id,
        t.author_name, t.author_avatar, t.is_pinned, t.is_locked, t.view_count,
        t.reply_count, t.vote_score, t.created_at, t.updated_at, t.last_reply_at,
        c.name AS category_name, c.color AS category_color
    FROM forum_topics t
    LEFT JOIN forum_categories c ON c.id = t.category_id";

impl DatabaseService {
    pub async fn get_topics(
        &self,
        query: TopicListQuery,
    ) -> Result<ListData<TopicWithVotes>, ResError> {
        let page = clamp_page(query.page);
        let limit = clamp_limit(query.limit);
        let order = query.sort.order_clause();

        let client = self.client().await?;

        let (pagination, rows) = match query.category_id {
            Some(category_id) => {
                let total: i64 = client
                    .query_one(
                        "SELECT COUNT(*) FROM forum_topics WHERE category_id = $1",
                        &[&category_id],
                    )
                    .await?
                    .try_get(0)?;
                let pagination = Pagination::new(page, limit, total);
                let rows = client
                    .query(
                        &format!(
                            "{} WHERE t.category_id = $1 {} OFFSET $2 LIMIT $3",
                            SELECT_TOPICS, order
                        ),
                        &[&category_id, &pagination.offset(), &limit],
                    )
                    .await?;
                (pagination, rows)
            }
            None => {
                let total: i64 = client
                    .query_one("SELECT COUNT(*) FROM forum_topics", &[])
                    .await?
                    .try_get(0)?;
                let pagination = Pagination::new(page, limit, total);
                let rows = client
                    .query(
                        &format!("{} {} OFFSET $1 LIMIT $2", SELECT_TOPICS, order),
                        &[&pagination.offset(), &limit],
                    )
                    .await?;
                (pagination, rows)
            }
        };

        let topics = rows
            .into_iter()
            .map(TopicWithCategory::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let ids: Vec<Uuid> = topics.iter().map(|t| t.topic.id).collect();
        let counts = self.vote_counts(&client, VoteTarget::Topic, &ids).await?;

        Ok(ListData {
            data: topics.into_iter().map(|t| t.attach_votes(&counts)).collect(),
            pagination,
        })
    }

    pub async fn get_topic(&self, id: Uuid) -> Result<TopicWithVotes, ResError> {
        let client = self.client().await?;

        let row = client
            .query_opt(&format!("{} WHERE t.id = $1", SELECT_TOPICS), &[&id])
            .await?
            .ok_or(ResError::NotFound("Topic not found"))?;
        let topic = TopicWithCategory::try_from(row)?;

        let counts = self.vote_counts(&client, VoteTarget::Topic, &[id]).await?;
        Ok(topic.attach_votes(&counts))
    }

    pub async fn add_topic(
        &self,
        author: &SessionUser,
        req: TopicRequest,
    ) -> Result<Topic, ResError> {
        let author_name = author.display_name();

        let mut db = self.client().await?;
        let tx = db.transaction().await?;

        tx.query_opt(
            "SELECT id FROM forum_categories WHERE id = $1",
            &[&req.category_id],
        )
        .await?
        .ok_or(ResError::NotFound("Category not found"))?;

        let row = tx
            .query_one(
                "INSERT INTO forum_topics (id, title, content, category_id, author_id,
                    author_name, author_avatar)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING *",
                &[
                    &Uuid::new_v4(),
                    &req.title.trim(),
                    &req.content.trim(),
                    &req.category_id,
                    &author.user_id,
                    &author_name,
                    &author.avatar_url,
                ],
            )
            .await?;
        let topic = Topic::try_from(row)?;

        tx.execute(
            "UPDATE forum_categories SET topic_count = topic_count + 1, updated_at = now()
            WHERE id = $1",
            &[&req.category_id],
        )
        .await?;

        tx.commit().await?;
        Ok(topic)
    }

    /// Author-only removal. The cascade deletes every vote on the topic,
    /// every vote on its posts, the posts and the topic itself, then
    /// fixes up the category counters, all in one transaction.
    pub async fn remove_topic(
        &self,
        requester: &SessionUser,
        topic_id: Uuid,
    ) -> Result<(), ResError> {
        let mut db = self.client().await?;
        let tx = db.transaction().await?;

        let row = tx
            .query_opt(
                "SELECT author_id, category_id FROM forum_topics WHERE id = $1 FOR UPDATE",
                &[&topic_id],
            )
            .await?
            .ok_or(ResError::NotFound("Topic not found"))?;
        let author_id: Uuid = row.try_get(0)?;
        let category_id: Uuid = row.try_get(1)?;

        if author_id != requester.user_id {
            return Err(ResError::Forbidden("You can only delete your own topics"));
        }

        let post_ids: Vec<Uuid> = tx
            .query("SELECT id FROM forum_posts WHERE topic_id = $1", &[&topic_id])
            .await?
            .into_iter()
            .map(|row| row.try_get(0))
            .collect::<Result<_, _>>()?;

        tx.execute(
            "DELETE FROM forum_votes WHERE target_type = 'topic' AND target_id = $1",
            &[&topic_id],
        )
        .await?;
        if !post_ids.is_empty() {
            tx.execute(
                "DELETE FROM forum_votes WHERE target_type = 'post' AND target_id = ANY($1)",
                &[&post_ids],
            )
            .await?;
        }

        let removed_posts = tx
            .execute("DELETE FROM forum_posts WHERE topic_id = $1", &[&topic_id])
            .await?;
        tx.execute("DELETE FROM forum_topics WHERE id = $1", &[&topic_id])
            .await?;

        tx.execute(
            "UPDATE forum_categories
            SET topic_count = GREATEST(topic_count - 1, 0),
                post_count = GREATEST(post_count - $2, 0),
                updated_at = now()
            WHERE id = $1",
            &[&category_id, &(removed_posts as i32)],
        )
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
