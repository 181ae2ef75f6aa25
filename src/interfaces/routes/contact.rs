use actix_web::web;

use crate::handlers::contacts;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/contact")
            .service(
                web::resource("")
                    .route(web::get().to(contacts::list_contacts))
                    .route(web::post().to(contacts::create_contact))
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(contacts::get_contact))
                    .route(web::put().to(contacts::update_contact))
                    .route(web::patch().to(contacts::partially_update_contact))
                    .route(web::delete().to(contacts::delete_contact))
            )
    );
}
