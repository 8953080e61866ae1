mod get_alert;
mod list_alerts;
mod new_alert;
mod upsert_alert;

use actix_web::web;
use get_alert::get_alert_controller;
use list_alerts::list_alerts_controller;
use new_alert::new_alert_controller;
use upsert_alert::upsert_alert_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(list_alerts_controller));
    cfg.route("/alerts", web::post().to(upsert_alert_controller));
    // Registered before the detail page so that `new` is not taken as an id
    cfg.route("/alerts/new", web::get().to(new_alert_controller));
    cfg.route("/alerts/{alert_id}", web::get().to(get_alert_controller));
}
