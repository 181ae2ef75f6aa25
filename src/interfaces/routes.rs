use actix_web::web;

use crate::handlers::home::home;

mod admin;
mod catalog;
mod contact;
mod projects;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home);

    cfg.service(
        web::scope("/api")
            .configure(projects::config_routes)
            .configure(catalog::config_routes)
            .configure(contact::config_routes)
            .configure(admin::config_routes)
    );
}
