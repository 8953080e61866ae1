mod test_alert_event;

use actix_web::web;
use test_alert_event::{send_test_event_controller, test_event_form_controller};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/events", web::get().to(test_event_form_controller));
    cfg.route("/events", web::post().to(send_test_event_controller));
}
