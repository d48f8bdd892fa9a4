use actix_web::web;

pub mod alerts;
pub mod health;
pub mod history;
pub mod status;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health_route)
        .service(status::ecosystem_status)
        .service(history::service_history)
        .service(alerts::list_alerts);
}
