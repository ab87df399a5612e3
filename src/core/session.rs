use crate::core::classifier::Classifier;
use crate::core::maps::{ClassificationParams, MapGenerator, YearOutcome};
use crate::core::regions::RegionCatalog;
use crate::core::years::validate_years;
use crate::io::earth_engine::ImageryService;
use crate::types::{LandcoverError, MapRequest, FIRST_YEAR, LAST_YEAR, MAX_YEARS};
use std::sync::Arc;

pub const NOT_TRAINED_MESSAGE: &str =
    "Ошибка: модель не обучена. Проверьте логи на наличие проблем с GEE.";

/// How one submission ended, before any rendering
#[derive(Debug)]
pub enum SessionReport {
    /// No service or no classifier; nothing was attempted
    NotReady,
    /// The request itself was invalid; nothing was sent to the server
    Rejected(LandcoverError),
    /// One outcome per distinct year, oldest first
    Completed(Vec<YearOutcome>),
}

impl SessionReport {
    /// Status line shown above the panels
    pub fn status(&self) -> String {
        match self {
            SessionReport::NotReady => NOT_TRAINED_MESSAGE.to_string(),
            SessionReport::Rejected(error) => rejection_message(error),
            SessionReport::Completed(outcomes) => {
                let mut status = "✅ Готово.".to_string();
                for message in outcomes.iter().filter_map(YearOutcome::message) {
                    status.push(' ');
                    status.push_str(&message);
                }
                status
            }
        }
    }

    pub fn outcomes(&self) -> &[YearOutcome] {
        match self {
            SessionReport::Completed(outcomes) => outcomes,
            _ => &[],
        }
    }
}

fn rejection_message(error: &LandcoverError) -> String {
    match error {
        LandcoverError::UnknownRegion(region) => format!("Ошибка: неизвестный регион «{}».", region),
        LandcoverError::YearOutOfRange(year) => format!(
            "Ошибка: {} год вне допустимого диапазона {}-{}.",
            year, FIRST_YEAR, LAST_YEAR
        ),
        LandcoverError::TooManyYears(count) => format!(
            "Ошибка: можно сравнить не более {} лет, выбрано {}.",
            MAX_YEARS, count
        ),
        other => format!("Ошибка: {}", other),
    }
}

/// Process-wide state: the remote service and the classifier trained at
/// startup. Both are fixed once the server is running.
pub struct MapSession {
    service: Option<Arc<dyn ImageryService>>,
    classifier: Option<Classifier>,
    params: ClassificationParams,
}

impl MapSession {
    pub fn new(
        service: Option<Arc<dyn ImageryService>>,
        classifier: Option<Classifier>,
        params: ClassificationParams,
    ) -> Self {
        Self {
            service,
            classifier,
            params,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.service.is_some() && self.classifier.is_some()
    }

    pub fn classifier(&self) -> Option<&Classifier> {
        self.classifier.as_ref()
    }

    /// Serve one submission. Readiness is checked first, then the request;
    /// years are processed one after another, oldest first, and a year
    /// without imagery does not stop the others.
    pub fn process(&self, request: &MapRequest) -> SessionReport {
        let (service, classifier) = match (&self.service, &self.classifier) {
            (Some(service), Some(classifier)) => (service, classifier),
            _ => return SessionReport::NotReady,
        };

        let region = match RegionCatalog::lookup(&request.region) {
            Some(region) => region,
            None => {
                let error = LandcoverError::UnknownRegion(request.region.clone());
                log::warn!("Rejected request: {}", error);
                return SessionReport::Rejected(error);
            }
        };

        let years = match validate_years(&request.years) {
            Ok(years) => years,
            Err(e) => {
                log::warn!("Rejected request: {}", e);
                return SessionReport::Rejected(e);
            }
        };

        log::info!("New request: region {}, years {:?}", region.label, years);

        let generator = MapGenerator::new(service.as_ref(), self.params.clone());
        let outcomes = years
            .into_iter()
            .map(|year| generator.generate(region, year, classifier))
            .collect();

        SessionReport::Completed(outcomes)
    }
}
