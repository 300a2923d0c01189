use actix_web::{
    web::{Data, Json, Query},
    Error, HttpResponse,
};

use crate::handler::db::DatabaseService;
use crate::model::{
    user::SessionUser,
    vote::{VoteRequest, VoteStatusQuery},
};

pub async fn add(
    user: SessionUser,
    req: Json<VoteRequest>,
    db: Data<DatabaseService>,
) -> Result<HttpResponse, Error> {
    let receipt = db.cast_vote(&user, req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(&receipt))
}

pub async fn query_handler(
    user: SessionUser,
    query: Query<VoteStatusQuery>,
    db: Data<DatabaseService>,
) -> Result<HttpResponse, Error> {
    let query = query.into_inner();
    let status = db
        .get_vote_status(&user, query.target_type, query.target_id)
        .await?;
    Ok(HttpResponse::Ok().json(&status))
}
