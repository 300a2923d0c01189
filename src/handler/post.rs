use uuid::Uuid;

use crate::handler::db::DatabaseService;
use crate::model::{
    common::{clamp_limit, clamp_page, ListData, Pagination},
    errors::ResError,
    post::{group_replies, Post, PostListQuery, PostRequest, PostWithReplies},
    user::SessionUser,
    vote::VoteTarget,
};

const SELECT_POSTS: &str = "SELECT id, content, topic_id, parent_id, author_id, author_name,
        author_avatar, vote_score, is_edited, created_at, updated_at
    FROM forum_posts";

impl DatabaseService {
    /// Top-level posts for a topic, each carrying its direct replies.
    /// Pagination counts top-level posts only, the vote fan-out covers
    /// the union of page ids and reply ids in one query.
    pub async fn get_posts(
        &self,
        query: PostListQuery,
    ) -> Result<ListData<PostWithReplies>, ResError> {
        let page = clamp_page(query.page);
        let limit = clamp_limit(query.limit);

        let client = self.client().await?;

        let total: i64 = client
            .query_one(
                "SELECT COUNT(*) FROM forum_posts WHERE topic_id = $1 AND parent_id IS NULL",
                &[&query.topic_id],
            )
            .await?
            .try_get(0)?;
        let pagination = Pagination::new(page, limit, total);

        let rows = client
            .query(
                &format!(
                    "{} WHERE topic_id = $1 AND parent_id IS NULL {} OFFSET $2 LIMIT $3",
                    SELECT_POSTS,
                    query.sort.order_clause()
                ),
                &[&query.topic_id, &pagination.offset(), &limit],
            )
            .await?;
        let top_level = rows
            .into_iter()
            .map(Post::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let top_ids: Vec<Uuid> = top_level.iter().map(|p| p.id).collect();
        let replies = if top_ids.is_empty() {
            Vec::new()
        } else {
            client
                .query(
                    &format!(
                        "{} WHERE parent_id = ANY($1) ORDER BY created_at ASC",
                        SELECT_POSTS
                    ),
                    &[&top_ids],
                )
                .await?
                .into_iter()
                .map(Post::try_from)
                .collect::<Result<Vec<_>, _>>()?
        };

        let mut all_ids = top_ids;
        all_ids.extend(replies.iter().map(|r| r.id));
        let counts = self.vote_counts(&client, VoteTarget::Post, &all_ids).await?;

        Ok(ListData {
            data: group_replies(top_level, replies, &counts),
            pagination,
        })
    }

    pub async fn add_post(&self, author: &SessionUser, req: PostRequest) -> Result<Post, ResError> {
        let author_name = author.display_name();

        let mut db = self.client().await?;
        let tx = db.transaction().await?;

        let topic = tx
            .query_opt(
                "SELECT category_id, is_locked FROM forum_topics WHERE id = $1 FOR UPDATE",
                &[&req.topic_id],
            )
            .await?
            .ok_or(ResError::NotFound("Topic not found"))?;
        let category_id: Uuid = topic.try_get(0)?;
        if topic.try_get::<_, bool>(1)? {
            return Err(ResError::Forbidden("Topic is locked"));
        }

        if let Some(parent_id) = req.parent_id {
            let parent = tx
                .query_opt(
                    "SELECT topic_id, parent_id FROM forum_posts WHERE id = $1",
                    &[&parent_id],
                )
                .await?
                .ok_or(ResError::NotFound("Parent post not found"))?;
            if parent.try_get::<_, Uuid>(0)? != req.topic_id {
                return Err(ResError::BadRequest(
                    "Parent post belongs to another topic".to_owned(),
                ));
            }
            // replies stay one level deep
            if parent.try_get::<_, Option<Uuid>>(1)?.is_some() {
                return Err(ResError::BadRequest(
                    "Replies to replies are not allowed".to_owned(),
                ));
            }
        }

        let row = tx
            .query_one(
                "INSERT INTO forum_posts (id, content, topic_id, parent_id, author_id,
                    author_name, author_avatar)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING *",
                &[
                    &Uuid::new_v4(),
                    &req.content.trim(),
                    &req.topic_id,
                    &req.parent_id,
                    &author.user_id,
                    &author_name,
                    &author.avatar_url,
                ],
            )
            .await?;
        let post = Post::try_from(row)?;

        tx.execute(
            "UPDATE forum_topics
            SET reply_count = reply_count + 1, last_reply_at = now(), updated_at = now()
            WHERE id = $1",
            &[&req.topic_id],
        )
        .await?;
        tx.execute(
            "UPDATE forum_categories SET post_count = post_count + 1, updated_at = now()
            WHERE id = $1",
            &[&category_id],
        )
        .await?;

        tx.commit().await?;
        Ok(post)
    }

    /// Author-only removal. Direct replies and every vote on the removed
    /// rows go with the post, and the topic's reply_count drops by the
    /// number of posts actually removed.
    pub async fn remove_post(
        &self,
        requester: &SessionUser,
        post_id: Uuid,
    ) -> Result<(), ResError> {
        let mut db = self.client().await?;
        let tx = db.transaction().await?;

        let row = tx
            .query_opt(
                "SELECT author_id, topic_id FROM forum_posts WHERE id = $1 FOR UPDATE",
                &[&post_id],
            )
            .await?
            .ok_or(ResError::NotFound("Post not found"))?;
        let author_id: Uuid = row.try_get(0)?;
        let topic_id: Uuid = row.try_get(1)?;

        if author_id != requester.user_id {
            return Err(ResError::Forbidden("You can only delete your own posts"));
        }

        let mut removed_ids: Vec<Uuid> = tx
            .query("SELECT id FROM forum_posts WHERE parent_id = $1", &[&post_id])
            .await?
            .into_iter()
            .map(|row| row.try_get(0))
            .collect::<Result<_, _>>()?;
        removed_ids.push(post_id);

        tx.execute(
            "DELETE FROM forum_votes WHERE target_type = 'post' AND target_id = ANY($1)",
            &[&removed_ids],
        )
        .await?;
        let removed_posts = tx
            .execute(
                "DELETE FROM forum_posts WHERE id = $1 OR parent_id = $1",
                &[&post_id],
            )
            .await?;

        tx.execute(
            "UPDATE forum_topics SET reply_count = GREATEST(reply_count - $2, 0)
            WHERE id = $1",
            &[&topic_id, &(removed_posts as i32)],
        )
        .await?;
        tx.execute(
            "UPDATE forum_categories SET post_count = GREATEST(post_count - $2, 0), updated_at = now()
            WHERE id = (SELECT category_id FROM forum_topics WHERE id = $1)",
            &[&topic_id, &(removed_posts as i32)],
        )
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
