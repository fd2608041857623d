use actix_web::web::ServiceConfig;
use actix_web::get;

use crate::controllers;

pub fn route(app: &mut ServiceConfig) {
    app.service(index);

    // Health check endpoints
    app.service(controllers::health::health);
    app.service(controllers::health::health_db);
}

#[get("/")]
pub async fn index() -> &'static str {
    "lighter-pool"
}
