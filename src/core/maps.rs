use crate::core::classifier::Classifier;
use crate::core::expression::Node;
use crate::core::imagery::{self, DateWindow, SceneQuery};
use crate::io::earth_engine::{value_as_count, ImageryService};
use crate::types::{LandCoverClass, LandcoverError, LandcoverResult, MapResult, Region};

/// Parameters for classifying one region and year
#[derive(Debug, Clone)]
pub struct ClassificationParams {
    /// Scenes at or above this cloud percentage are skipped
    pub max_cloud_percent: f64,
}

impl Default for ClassificationParams {
    fn default() -> Self {
        Self {
            max_cloud_percent: 25.0,
        }
    }
}

/// Outcome of the map request for a single year
#[derive(Debug)]
pub enum YearOutcome {
    Rendered(MapResult),
    NoImagery(i32),
    Failed { year: i32, error: LandcoverError },
}

impl YearOutcome {
    pub fn year(&self) -> i32 {
        match self {
            YearOutcome::Rendered(map) => map.year,
            YearOutcome::NoImagery(year) => *year,
            YearOutcome::Failed { year, .. } => *year,
        }
    }

    pub fn map(&self) -> Option<&MapResult> {
        match self {
            YearOutcome::Rendered(map) => Some(map),
            _ => None,
        }
    }

    /// User-facing note for years that produced no map
    pub fn message(&self) -> Option<String> {
        match self {
            YearOutcome::Rendered(_) => None,
            YearOutcome::NoImagery(year) => Some(format!("⚠️ Не найдено снимков за {} год.", year)),
            YearOutcome::Failed { year, error } => Some(format!(
                "⚠️ Не удалось построить карту за {} год: {}",
                year, error
            )),
        }
    }
}

/// Visualization of the classified raster: one palette entry per class id
pub fn visualize_classes(classified: Node) -> Node {
    let palette: Vec<&str> = LandCoverClass::ALL.iter().map(|c| c.color()).collect();
    let max_class = LandCoverClass::ALL.len() - 1;
    Node::invoke(
        "Image.visualize",
        [
            ("image", classified),
            ("min", Node::constant(0)),
            ("max", Node::constant(max_class)),
            ("palette", Node::strings(palette.as_slice())),
        ],
    )
}

/// Requests classified maps from the remote service
pub struct MapGenerator<'a> {
    service: &'a dyn ImageryService,
    params: ClassificationParams,
}

impl<'a> MapGenerator<'a> {
    pub fn new(service: &'a dyn ImageryService, params: ClassificationParams) -> Self {
        Self { service, params }
    }

    /// Scene query for the summer of `year` over the region
    pub fn scene_query(&self, region: &Region, year: i32) -> LandcoverResult<SceneQuery> {
        let window = DateWindow::summer(year).ok_or(LandcoverError::YearOutOfRange(year))?;
        Ok(SceneQuery {
            window,
            bounds: imagery::rectangle(&region.bbox),
            max_cloud_percent: self.params.max_cloud_percent,
        })
    }

    /// Classify one year. Empty collections and remote failures are reported
    /// through the outcome rather than as an error.
    pub fn generate(&self, region: &Region, year: i32, classifier: &Classifier) -> YearOutcome {
        log::info!("Generating map for {} ({})", year, region.label);
        match self.try_generate(region, year, classifier) {
            Ok(map) => {
                log::info!("Map for {} generated", year);
                YearOutcome::Rendered(map)
            }
            Err(LandcoverError::NoImagery(year)) => {
                log::warn!("No scenes for {} over {}", year, region.label);
                YearOutcome::NoImagery(year)
            }
            Err(error) => {
                log::error!("Map generation for {} failed: {}", year, error);
                YearOutcome::Failed { year, error }
            }
        }
    }

    fn try_generate(
        &self,
        region: &Region,
        year: i32,
        classifier: &Classifier,
    ) -> LandcoverResult<MapResult> {
        let query = self.scene_query(region, year)?;

        let scenes = value_as_count(&self.service.compute_value(&query.count())?)?;
        log::debug!("{} scenes for {}", scenes, year);
        if scenes == 0 {
            return Err(LandcoverError::NoImagery(year));
        }

        let classified = classifier.classify(query.median_composite());
        let tile_url = self.service.create_map(&visualize_classes(classified))?;

        Ok(MapResult {
            center: region.center,
            tile_url,
            year,
        })
    }
}
