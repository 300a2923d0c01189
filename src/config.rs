use actix_web::web::{self, ServiceConfig};

use crate::router;

pub(crate) fn conf_forum(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope("/forum")
            .service(
                web::resource("/topics")
                    .route(web::get().to(router::topic::query_handler))
                    .route(web::post().to(router::topic::add))
                    .route(web::delete().to(router::topic::remove)),
            )
            .service(
                web::resource("/posts")
                    .route(web::get().to(router::post::query_handler))
                    .route(web::post().to(router::post::add))
                    .route(web::delete().to(router::post::remove)),
            )
            .service(
                web::resource("/votes")
                    .route(web::get().to(router::vote::query_handler))
                    .route(web::post().to(router::vote::add)),
            )
            .service(web::resource("/categories").route(web::get().to(router::category::query_handler)))
            .service(web::resource("/stats").route(web::get().to(router::stats::query_handler))),
    );
}
