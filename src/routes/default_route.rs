use actix_web::{get, web, HttpResponse};
use askama::Template;

use crate::configuration::ApplicationSettings;

#[derive(Template)]
#[template(path = "extract.html")]
struct ExtractFormTemplate {
    default_target: String,
}

#[get("/")]
pub async fn default(application: web::Data<ApplicationSettings>) -> HttpResponse {
    let page = ExtractFormTemplate {
        default_target: application.default_target.clone(),
    };

    match page.render() {
        Ok(body) => HttpResponse::Ok().content_type("text/html").body(body),
        Err(e) => {
            log::error!("Failed to render extraction form: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}
