use actix_web::web;

use crate::handlers::{admin, auth};

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(web::resource("/login").route(web::post().to(auth::admin_login)))
            .service(web::resource("/health").route(web::get().to(admin::health_check)))
            .service(web::resource("/projects").route(web::get().to(admin::list_all_projects)))
            .service(
                web::scope("/categories")
                    .service(web::resource("").route(web::post().to(admin::create_category)))
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(admin::update_category))
                            .route(web::patch().to(admin::update_category))
                            .route(web::delete().to(admin::delete_category))
                    )
            )
            .service(
                web::scope("/technologies")
                    .service(web::resource("").route(web::post().to(admin::create_technology)))
                    .service(
                        web::resource("/{id}")
                            .route(web::patch().to(admin::update_technology))
                            .route(web::delete().to(admin::delete_technology))
                    )
            )
            .service(
                web::scope("/gallery-images")
                    .service(
                        web::resource("")
                            .route(web::get().to(admin::list_gallery_images))
                            .route(web::post().to(admin::create_gallery_image))
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::delete().to(admin::delete_gallery_image))
                    )
            )
    );
}
