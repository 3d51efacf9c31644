//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod error;
pub mod health;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod travels;
pub mod travels_dto;
pub mod users;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register the `/api/v1` routes and extractor settings.
///
/// Callers supply `web::Data<HttpState>` on the enclosing app.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use backend::inbound::http::configure_api;
///
/// let _app = App::new().configure(configure_api);
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .app_data(validation::json_config())
            .app_data(validation::query_config())
            .service(users::register)
            .service(users::login)
            .service(travels::create_travel)
            .service(travels::list_travels)
            .service(travels::get_travel)
            .service(travels::update_travel)
            .service(travels::change_travel_status)
            .service(travels::list_all_travels),
    );
}
