use crate::core::regions::RegionCatalog;
use crate::core::session::{MapSession, SessionReport};
use crate::types::{MapRequest, Region};
use crate::web::page::{index_page, FormState};
use crate::web::render::PanelSet;
use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// JSON envelope for the `/api` routes
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: String,
    pub execution_time_ms: Option<u64>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
            execution_time_ms: None,
        }
    }

    pub fn error(message: &str) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message.to_string()),
            timestamp: chrono::Utc::now().to_rfc3339(),
            execution_time_ms: None,
        }
    }

    fn timed(mut self, start: Instant) -> Self {
        self.execution_time_ms = Some(start.elapsed().as_millis() as u64);
        self
    }
}

/// Fields posted by the form on the index page
#[derive(Debug, Deserialize)]
pub struct SubmitForm {
    pub region: String,
    pub year1: i32,
    pub year2: i32,
    pub year3: i32,
}

impl SubmitForm {
    fn form_state(&self) -> FormState {
        FormState {
            region: self.region.clone(),
            years: [self.year1, self.year2, self.year3],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub classifier_trained: bool,
    pub training_samples: Option<u64>,
}

pub async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(index_page(&FormState::default(), None))
}

pub async fn submit(
    session: web::Data<Arc<MapSession>>,
    form: web::Form<SubmitForm>,
) -> impl Responder {
    let form = form.into_inner();
    let state = form.form_state();
    let request = MapRequest {
        region: form.region,
        years: state.years.to_vec(),
    };

    let session = session.get_ref().clone();
    let result = match web::block(move || session.process(&request)).await {
        Ok(report) => PanelSet::from_report(&report),
        Err(e) => {
            log::error!("Blocking task failed: {}", e);
            return HttpResponse::InternalServerError()
                .content_type("text/html; charset=utf-8")
                .body("Ошибка выполнения запроса");
        }
    };

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(index_page(&state, Some(&result)))
}

pub async fn generate_maps(
    session: web::Data<Arc<MapSession>>,
    request: web::Json<MapRequest>,
) -> impl Responder {
    let start = Instant::now();
    let request = request.into_inner();
    log::info!("API map request for {} ({} years)", request.region, request.years.len());

    let session = session.get_ref().clone();
    let report = match web::block(move || session.process(&request)).await {
        Ok(report) => report,
        Err(e) => {
            log::error!("Blocking task failed: {}", e);
            return HttpResponse::InternalServerError()
                .json(ApiResponse::<PanelSet>::error("Execution error").timed(start));
        }
    };

    match report {
        SessionReport::NotReady => HttpResponse::ServiceUnavailable()
            .json(ApiResponse::<PanelSet>::error(&report.status()).timed(start)),
        SessionReport::Rejected(_) => HttpResponse::BadRequest()
            .json(ApiResponse::<PanelSet>::error(&report.status()).timed(start)),
        SessionReport::Completed(_) => {
            HttpResponse::Ok().json(ApiResponse::success(PanelSet::from_report(&report)).timed(start))
        }
    }
}

pub async fn regions() -> impl Responder {
    let regions: Vec<&Region> = RegionCatalog::all().iter().collect();
    HttpResponse::Ok().json(ApiResponse::success(regions))
}

pub async fn health(session: web::Data<Arc<MapSession>>) -> impl Responder {
    let status = HealthStatus {
        classifier_trained: session.is_ready(),
        training_samples: session.classifier().map(|c| c.training_samples()),
    };
    HttpResponse::Ok().json(ApiResponse::success(status))
}

/// Register all routes on an actix `App` or scope
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/", web::post().to(submit))
        .route("/api/maps", web::post().to(generate_maps))
        .route("/api/regions", web::get().to(regions))
        .route("/api/health", web::get().to(health));
}
