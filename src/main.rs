use actix_cors::Cors;
use actix_web::{middleware, web::Data, App, HttpServer};
use log::info;

mod config;
mod handler;
mod model;
mod router;
mod util;

use crate::handler::db::DatabaseService;
use crate::util::env::Env;

#[actix_rt::main]
async fn main() -> std::io::Result<()> {
    let env = Env::from_env();
    env_logger::init();

    let db = DatabaseService::init(env.postgres_url())
        .await
        .expect("Failed to connect to postgres");
    util::startup::build_schema(&db)
        .await
        .expect("Failed to prepare database schema");

    let addr = env.addr();
    info!("starting server on {}", addr);

    HttpServer::new(move || {
        let cors = if env.cors_origin() == "All" {
            Cors::permissive()
        } else {
            Cors::default()
                .allowed_origin(env.cors_origin())
                .allow_any_method()
                .allow_any_header()
                .supports_credentials()
        };

        App::new()
            .app_data(Data::new(db.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::new("\"%r\" %s %b %Dms"))
            .configure(config::conf_forum)
    })
    .bind(&addr)?
    .run()
    .await
}
