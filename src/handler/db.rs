use std::collections::HashMap;
use std::str::FromStr;

use deadpool_postgres::{Client, Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;
use uuid::Uuid;

use crate::model::{
    errors::ResError,
    vote::{tally_votes, VoteCount, VoteTarget, VoteType},
};

/// Shared handle to the relational store. All durable state lives behind
/// this pool, request handlers hold no other mutable state.
#[derive(Clone)]
pub struct DatabaseService {
    pool: Pool,
}

impl DatabaseService {
    pub async fn init(postgres_url: &str) -> Result<Self, ResError> {
        let config = tokio_postgres::Config::from_str(postgres_url).map_err(|e| {
            log::error!("invalid DATABASE_URL: {}", e);
            ResError::Internal
        })?;
        let manager = Manager::from_config(
            config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );
        let pool = Pool::builder(manager).max_size(16).build().map_err(|e| {
            log::error!("failed to build connection pool: {}", e);
            ResError::Internal
        })?;

        // fail fast on an unreachable database
        let service = DatabaseService { pool };
        service.client().await?;
        Ok(service)
    }

    pub(crate) async fn client(&self) -> Result<Client, ResError> {
        Ok(self.pool.get().await?)
    }

    /// One fan-out query for a whole page of targets, tallied in-process.
    pub(crate) async fn vote_counts(
        &self,
        client: &Client,
        target: VoteTarget,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, VoteCount>, ResError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let target_type = target.as_str();
        let rows = client
            .query(
                "SELECT target_id, vote_type FROM forum_votes
                WHERE target_type = $1 AND target_id = ANY($2)",
                &[&target_type, &ids],
            )
            .await?;

        let mut votes = Vec::with_capacity(rows.len());
        for row in rows {
            let target_id: Uuid = row.try_get(0)?;
            let vote_type: VoteType = row.try_get::<_, &str>(1)?.parse()?;
            votes.push((target_id, vote_type));
        }
        Ok(tally_votes(&votes))
    }
}
