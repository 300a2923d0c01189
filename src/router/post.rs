use actix_web::{
    web::{Data, Json, Query},
    Error, HttpResponse,
};

use crate::handler::db::DatabaseService;
use crate::model::{
    post::{PostListQuery, PostRemoveQuery, PostRequest},
    user::SessionUser,
};

pub async fn query_handler(
    query: Query<PostListQuery>,
    db: Data<DatabaseService>,
) -> Result<HttpResponse, Error> {
    let list = db.get_posts(query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(&list))
}

pub async fn add(
    user: SessionUser,
    req: Json<PostRequest>,
    db: Data<DatabaseService>,
) -> Result<HttpResponse, Error> {
    let req = req.into_inner();
    req.check_new()?;

    let post = db.add_post(&user, req).await?;
    Ok(HttpResponse::Created().json(&post))
}

pub async fn remove(
    user: SessionUser,
    query: Query<PostRemoveQuery>,
    db: Data<DatabaseService>,
) -> Result<HttpResponse, Error> {
    db.remove_post(&user, query.post_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Post deleted successfully" })))
}
