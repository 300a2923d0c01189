use uuid::Uuid;

use crate::handler::db::DatabaseService;
use crate::model::{
    errors::ResError,
    user::SessionUser,
    vote::{transition, VoteAction, VoteReceipt, VoteRequest, VoteStatus, VoteTarget, VoteType},
};

impl DatabaseService {
    /// Applies one vote intent as a single transaction: look up the
    /// voter's existing row, mutate the ledger, then move the target's
    /// denormalized score with one atomic increment. Nothing here reads
    /// a score and writes it back.
    pub async fn cast_vote(
        &self,
        voter: &SessionUser,
        req: VoteRequest,
    ) -> Result<VoteReceipt, ResError> {
        let table = req.target_type.table();
        let target_type = req.target_type.as_str();
        let vote_type = req.vote_type.as_str();
        let voter_name = voter.display_name();

        let mut db = self.client().await?;
        let tx = db.transaction().await?;

        tx.query_opt(&format!("SELECT id FROM {} WHERE id = $1", table), &[&req.target_id])
            .await?
            .ok_or(ResError::NotFound("Target not found"))?;

        let existing: Option<(Uuid, VoteType)> = match tx
            .query_opt(
                "SELECT id, vote_type FROM forum_votes
                WHERE target_type = $1 AND target_id = $2 AND voter_id = $3
                FOR UPDATE",
                &[&target_type, &req.target_id, &voter.user_id],
            )
            .await?
        {
            Some(row) => Some((row.try_get(0)?, row.try_get::<_, &str>(1)?.parse()?)),
            None => None,
        };

        let (action, delta) = transition(existing.map(|(_, prev)| prev), req.vote_type);
        match (action, existing) {
            (VoteAction::Added, _) => {
                tx.execute(
                    "INSERT INTO forum_votes (id, target_type, target_id, voter_id,
                        voter_name, vote_type)
                    VALUES ($1, $2, $3, $4, $5, $6)",
                    &[
                        &Uuid::new_v4(),
                        &target_type,
                        &req.target_id,
                        &voter.user_id,
                        &voter_name,
                        &vote_type,
                    ],
                )
                .await?;
            }
            (VoteAction::Changed, Some((id, _))) => {
                tx.execute(
                    "UPDATE forum_votes SET vote_type = $2, updated_at = now() WHERE id = $1",
                    &[&id, &vote_type],
                )
                .await?;
            }
            (VoteAction::Removed, Some((id, _))) => {
                tx.execute("DELETE FROM forum_votes WHERE id = $1", &[&id]).await?;
            }
            // transition only yields Changed/Removed when a row exists
            _ => return Err(ResError::Internal),
        }

        let new_score: i32 = tx
            .query_opt(
                &format!(
                    "UPDATE {} SET vote_score = vote_score + $2 WHERE id = $1
                    RETURNING vote_score",
                    table
                ),
                &[&req.target_id, &delta],
            )
            .await?
            .ok_or(ResError::NotFound("Target not found"))?
            .try_get(0)?;

        tx.commit().await?;
        Ok(VoteReceipt {
            action,
            vote_change: delta,
            new_score,
        })
    }

    /// The caller's current vote on a target, if any.
    pub async fn get_vote_status(
        &self,
        voter: &SessionUser,
        target_type: VoteTarget,
        target_id: Uuid,
    ) -> Result<VoteStatus, ResError> {
        let client = self.client().await?;
        let row = client
            .query_opt(
                "SELECT vote_type FROM forum_votes
                WHERE target_type = $1 AND target_id = $2 AND voter_id = $3",
                &[&target_type.as_str(), &target_id, &voter.user_id],
            )
            .await?;

        let vote_type = match row {
            Some(row) => Some(row.try_get::<_, &str>(0)?.parse::<VoteType>()?),
            None => None,
        };
        Ok(VoteStatus {
            has_voted: vote_type.is_some(),
            vote_type,
        })
    }
}
