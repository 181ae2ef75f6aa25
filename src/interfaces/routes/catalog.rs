use actix_web::web;

use crate::handlers::catalog;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/categories")
            .service(web::resource("").route(web::get().to(catalog::list_categories)))
            .service(web::resource("/{id}").route(web::get().to(catalog::get_category)))
    );

    cfg.service(
        web::scope("/technologies")
            .service(web::resource("").route(web::get().to(catalog::list_technologies)))
            .service(web::resource("/{id}").route(web::get().to(catalog::get_technology)))
    );
}
