use actix_web::{web::Data, Error, HttpResponse};

use crate::handler::db::DatabaseService;

pub async fn query_handler(db: Data<DatabaseService>) -> Result<HttpResponse, Error> {
    let categories = db.get_categories().await?;
    Ok(HttpResponse::Ok().json(&categories))
}
