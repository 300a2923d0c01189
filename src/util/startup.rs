use crate::handler::db::DatabaseService;
use crate::model::errors::ResError;

/// Idempotent schema bootstrap for the forum tables. The user directory
/// (users table, validate_session function) belongs to the external
/// auth service and is never created here.
pub async fn build_schema(db: &DatabaseService) -> Result<(), ResError> {
    let client = db.client().await?;
    client
        .batch_execute(
            "
    CREATE TABLE IF NOT EXISTS forum_categories (
        id              uuid PRIMARY KEY,
        name            text NOT NULL UNIQUE,
        description     text,
        icon            text,
        color           text,
        topic_count     integer NOT NULL DEFAULT 0,
        post_count      integer NOT NULL DEFAULT 0,
        created_at      timestamptz NOT NULL DEFAULT now(),
        updated_at      timestamptz NOT NULL DEFAULT now()
    );

    CREATE TABLE IF NOT EXISTS forum_topics (
        id              uuid PRIMARY KEY,
        title           text NOT NULL,
        content         text NOT NULL,
        category_id     uuid NOT NULL REFERENCES forum_categories (id),
        author_id       uuid NOT NULL,
        author_name     text NOT NULL,
        author_avatar   text,
        is_pinned       boolean NOT NULL DEFAULT false,
        is_locked       boolean NOT NULL DEFAULT false,
        view_count      integer NOT NULL DEFAULT 0,
        reply_count     integer NOT NULL DEFAULT 0,
        vote_score      integer NOT NULL DEFAULT 0,
        created_at      timestamptz NOT NULL DEFAULT now(),
        updated_at      timestamptz NOT NULL DEFAULT now(),
        last_reply_at   timestamptz NOT NULL DEFAULT now()
    );

    CREATE TABLE IF NOT EXISTS forum_posts (
        id              uuid PRIMARY KEY,
        content         text NOT NULL,
        topic_id        uuid NOT NULL REFERENCES forum_topics (id),
        parent_id       uuid REFERENCES forum_posts (id),
        author_id       uuid NOT NULL,
        author_name     text NOT NULL,
        author_avatar   text,
        vote_score      integer NOT NULL DEFAULT 0,
        is_edited       boolean NOT NULL DEFAULT false,
        created_at      timestamptz NOT NULL DEFAULT now(),
        updated_at      timestamptz NOT NULL DEFAULT now()
    );

    CREATE TABLE IF NOT EXISTS forum_votes (
        id              uuid PRIMARY KEY,
        target_type     text NOT NULL CHECK (target_type IN ('topic', 'post')),
        target_id       uuid NOT NULL,
        voter_id        uuid NOT NULL,
        voter_name      text NOT NULL,
        vote_type       text NOT NULL CHECK (vote_type IN ('up', 'down')),
        created_at      timestamptz NOT NULL DEFAULT now(),
        updated_at      timestamptz NOT NULL DEFAULT now()
    );

    CREATE UNIQUE INDEX IF NOT EXISTS forum_votes_one_per_voter
        ON forum_votes (target_type, target_id, voter_id);
    CREATE INDEX IF NOT EXISTS forum_votes_by_target
        ON forum_votes (target_type, target_id);
    CREATE INDEX IF NOT EXISTS forum_topics_by_category
        ON forum_topics (category_id);
    CREATE INDEX IF NOT EXISTS forum_posts_by_topic
        ON forum_posts (topic_id);
    CREATE INDEX IF NOT EXISTS forum_posts_by_parent
        ON forum_posts (parent_id);
    ",
        )
        .await?;
    Ok(())
}
