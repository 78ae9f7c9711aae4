use std::{net::TcpListener, sync::Arc};

use actix_files::Files;
use actix_web::{dev::Server, middleware::Logger, web, App, HttpServer};

use crate::{
    configuration::Settings,
    routes::{default_route, extract_route, health_check_route},
    services::{
        BackendError, Droid, ExtractionOrchestrator, LlmExtractor, Pipeline, RunGate,
        SessionFetcher,
    },
};

/// Wires the WebDriver browser and the LLM extractor into a pipeline.
pub fn build_pipeline(settings: &Settings) -> Result<Pipeline, BackendError> {
    let launcher = Droid::new(settings.browser.clone());
    let extractor = LlmExtractor::new(settings.extraction.clone(), settings.api_keys.llm.clone())?;

    Ok(Pipeline::new(
        SessionFetcher::new(Arc::new(launcher), settings.fetcher.clone()),
        ExtractionOrchestrator::new(Arc::new(extractor)),
    ))
}

pub fn run(
    listener: TcpListener,
    settings: &Settings,
    pipeline: Pipeline,
) -> Result<Server, std::io::Error> {
    let pipeline = web::Data::new(pipeline);
    let run_gate = web::Data::new(RunGate::new());
    let application = web::Data::new(settings.application.clone());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .service(Files::new("/static", "./templates/static").prefer_utf8(true))
            .service(default_route::default)
            .service(health_check_route::health_check)
            .service(extract_route::extract_page)
            .service(extract_route::extract_json)
            .app_data(pipeline.clone())
            .app_data(run_gate.clone())
            .app_data(application.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
