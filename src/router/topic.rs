use actix_web::{
    web::{Data, Json, Query},
    Error, HttpResponse,
};

use crate::handler::db::DatabaseService;
use crate::model::{
    topic::{TopicListQuery, TopicRemoveQuery, TopicRequest},
    user::SessionUser,
};

/// GET /forum/topics serves both the paginated listing and, with `?id=`,
/// a single topic.
pub async fn query_handler(
    query: Query<TopicListQuery>,
    db: Data<DatabaseService>,
) -> Result<HttpResponse, Error> {
    let query = query.into_inner();
    match query.id {
        Some(id) => {
            let topic = db.get_topic(id).await?;
            Ok(HttpResponse::Ok().json(&topic))
        }
        None => {
            let list = db.get_topics(query).await?;
            Ok(HttpResponse::Ok().json(&list))
        }
    }
}

pub async fn add(
    user: SessionUser,
    req: Json<TopicRequest>,
    db: Data<DatabaseService>,
) -> Result<HttpResponse, Error> {
    let req = req.into_inner();
    req.check_new()?;

    let topic = db.add_topic(&user, req).await?;
    Ok(HttpResponse::Created().json(&topic))
}

pub async fn remove(
    user: SessionUser,
    query: Query<TopicRemoveQuery>,
    db: Data<DatabaseService>,
) -> Result<HttpResponse, Error> {
    db.remove_topic(&user, query.topic_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Topic deleted successfully" })))
}
