//! Random-forest land-cover classifier trained on Earth Engine
//!
//! Training samples for each class live in server-side feature collections.
//! The trained model never leaves the server: [`Classifier`] only carries the
//! expression that produces it.

use crate::core::expression::Node;
use crate::core::imagery::{self, DateWindow, SceneQuery, NDVI_BAND};
use crate::io::earth_engine::{value_as_count, ImageryService};
use crate::types::{LandCoverClass, LandcoverError, LandcoverResult};
use chrono::NaiveDate;

/// Property carrying the class id on samples
pub const CLASS_PROPERTY: &str = "class";

/// Parameters of the one-shot training run
#[derive(Debug, Clone)]
pub struct TrainingParams {
    /// Asset folder holding the `kalmykia_<class>_samples` tables
    pub asset_root: String,
    pub window: DateWindow,
    pub max_cloud_percent: f64,
    pub bands: Vec<String>,
    pub number_of_trees: u32,
    /// Sampling resolution in meters
    pub scale: f64,
    pub tile_scale: f64,
}

impl TrainingParams {
    pub fn for_project(project: &str) -> Self {
        Self {
            asset_root: format!("projects/{}/assets", project),
            ..Self::default()
        }
    }

    /// Table holding the training points of one class
    pub fn sample_asset(&self, class: LandCoverClass) -> String {
        format!("{}/kalmykia_{}_samples", self.asset_root, class.asset_slug())
    }
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            asset_root: "projects/gen-lang-client-0605302377/assets".to_string(),
            window: DateWindow::new(
                NaiveDate::from_ymd_opt(2023, 6, 1).unwrap_or_default(),
                NaiveDate::from_ymd_opt(2023, 9, 1).unwrap_or_default(),
            ),
            max_cloud_percent: 10.0,
            bands: ["B2", "B3", "B4", "B8", NDVI_BAND]
                .iter()
                .map(|b| b.to_string())
                .collect(),
            number_of_trees: 50,
            scale: 10.0,
            tile_scale: 4.0,
        }
    }
}

/// Handle to a classifier trained on the server
#[derive(Debug, Clone, PartialEq)]
pub struct Classifier {
    model: Node,
    bands: Vec<String>,
    training_samples: u64,
}

impl Classifier {
    /// Build the training graph and check on the server that sampling the
    /// composite at the training points yields at least one sample. This
    /// runs everything the model depends on short of fitting it.
    pub fn train(service: &dyn ImageryService, params: &TrainingParams) -> LandcoverResult<Self> {
        log::info!(
            "Training random forest ({} trees) on {} classes",
            params.number_of_trees,
            LandCoverClass::ALL.len()
        );

        let samples = sampled_points(params, training_points(params));
        let count = value_as_count(&service.compute_value(&imagery::collection_size(samples.clone()))?)?;
        if count == 0 {
            return Err(LandcoverError::InvalidResponse(
                "No training samples overlap the training composite".to_string(),
            ));
        }
        log::info!("Sampled {} training points", count);

        let model = trained_model(params, samples);
        log::info!("Classifier trained on {} classes", LandCoverClass::ALL.len());

        Ok(Self {
            model,
            bands: params.bands.clone(),
            training_samples: count,
        })
    }

    /// Train unless a classifier is already present
    pub fn ensure_trained(
        current: Option<Self>,
        service: &dyn ImageryService,
        params: &TrainingParams,
    ) -> Option<Self> {
        if let Some(classifier) = current {
            log::info!("Classifier already trained");
            return Some(classifier);
        }

        match Self::train(service, params) {
            Ok(classifier) => Some(classifier),
            Err(e) => {
                log::error!("Classifier training failed: {}", e);
                None
            }
        }
    }

    pub fn bands(&self) -> &[String] {
        &self.bands
    }

    pub fn training_samples(&self) -> u64 {
        self.training_samples
    }

    /// Per-pixel class ids for `image`
    pub fn classify(&self, image: Node) -> Node {
        Node::invoke(
            "Image.classify",
            [("image", image), ("classifier", self.model.clone())],
        )
    }
}

/// All class sample tables merged, each feature tagged with its class id
pub fn training_points(params: &TrainingParams) -> Node {
    LandCoverClass::ALL
        .iter()
        .map(|class| {
            imagery::set_property(
                imagery::feature_collection(&params.sample_asset(*class)),
                CLASS_PROPERTY,
                Node::constant(class.id()),
            )
        })
        .reduce(imagery::merge)
        .unwrap_or_else(|| Node::Array(Vec::new()))
}

/// Composite band values at every training point, tagged with the class id
pub fn sampled_points(params: &TrainingParams, points: Node) -> Node {
    let roi = imagery::collection_bounds(points.clone());
    let composite = SceneQuery {
        window: params.window,
        bounds: roi,
        max_cloud_percent: params.max_cloud_percent,
    }
    .median_composite();

    Node::invoke(
        "Image.sampleRegions",
        [
            ("image", imagery::select(composite, params.bands.as_slice())),
            ("collection", points),
            ("properties", Node::strings(&[CLASS_PROPERTY])),
            ("scale", Node::constant(params.scale)),
            ("tileScale", Node::constant(params.tile_scale)),
        ],
    )
}

fn trained_model(params: &TrainingParams, samples: Node) -> Node {
    let forest = Node::invoke(
        "Classifier.smileRandomForest",
        [("numberOfTrees", Node::constant(params.number_of_trees))],
    );

    Node::invoke(
        "Classifier.train",
        [
            ("classifier", forest),
            ("features", samples),
            ("classProperty", Node::string(CLASS_PROPERTY)),
            ("inputProperties", Node::strings(params.bands.as_slice())),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    struct ScriptedService {
        count: LandcoverResult<Value>,
        calls: Mutex<usize>,
        last_query: Mutex<Option<Node>>,
    }

    impl ImageryService for ScriptedService {
        fn compute_value(&self, expression: &Node) -> LandcoverResult<Value> {
            *self.calls.lock().unwrap() += 1;
            *self.last_query.lock().unwrap() = Some(expression.clone());
            match &self.count {
                Ok(v) => Ok(v.clone()),
                Err(_) => Err(LandcoverError::Remote {
                    status: 404,
                    message: "Table not found".to_string(),
                }),
            }
        }

        fn create_map(&self, _image: &Node) -> LandcoverResult<String> {
            unreachable!("training never renders maps")
        }
    }

    fn service(count: LandcoverResult<Value>) -> ScriptedService {
        ScriptedService {
            count,
            calls: Mutex::new(0),
            last_query: Mutex::new(None),
        }
    }

    #[test]
    fn test_sample_assets() {
        let params = TrainingParams::for_project("demo");
        assert_eq!(
            params.sample_asset(LandCoverClass::Solonchak),
            "projects/demo/assets/kalmykia_solonchak_samples"
        );
    }

    #[test]
    fn test_training_points_merge_all_classes() {
        let points = training_points(&TrainingParams::default());
        let mut merges = 0;
        let mut node = &points;
        while node.function_name() == Some("Collection.merge") {
            merges += 1;
            node = node.arg("collection1").unwrap();
        }
        assert_eq!(merges, LandCoverClass::ALL.len() - 1);
    }

    #[test]
    fn test_train_succeeds() {
        let svc = service(Ok(json!(742)));
        let classifier = Classifier::train(&svc, &TrainingParams::default()).unwrap();
        assert_eq!(classifier.training_samples(), 742);
        assert_eq!(classifier.bands().len(), 5);
        assert_eq!(*svc.calls.lock().unwrap(), 1);

        let classified = classifier.classify(Node::argument("img"));
        assert_eq!(classified.function_name(), Some("Image.classify"));
        assert_eq!(
            classified.arg("classifier").unwrap().function_name(),
            Some("Classifier.train")
        );
    }

    #[test]
    fn test_validation_counts_sampled_composite() {
        let svc = service(Ok(json!(120)));
        let params = TrainingParams::default();
        let classifier = Classifier::train(&svc, &params).unwrap();

        let query = svc.last_query.lock().unwrap().clone().unwrap();
        assert_eq!(query.function_name(), Some("Collection.size"));
        let samples = query.arg("collection").unwrap();
        assert_eq!(samples.function_name(), Some("Image.sampleRegions"));

        let selected = samples.arg("image").unwrap();
        assert_eq!(selected.function_name(), Some("Image.select"));
        assert_eq!(selected.arg("bandSelectors"), Some(&Node::strings(params.bands.as_slice())));
        let composite = selected.arg("input").unwrap().arg("input").unwrap();
        assert_eq!(composite.function_name(), Some("reduce.median"));

        // The model is fitted on exactly the validated samples
        let classified = classifier.classify(Node::argument("img"));
        let model = classified.arg("classifier").unwrap();
        assert_eq!(model.arg("features"), Some(samples));
    }

    #[test]
    fn test_sampling_error_leaves_handle_unset() {
        let svc = service(Err(LandcoverError::ClassifierUnavailable));
        let params = TrainingParams::default();
        assert!(matches!(
            Classifier::train(&svc, &params),
            Err(LandcoverError::Remote { status: 404, .. })
        ));
        assert!(Classifier::ensure_trained(None, &svc, &params).is_none());
    }

    #[test]
    fn test_remote_error_leaves_handle_unset() {
        let svc = service(Err(LandcoverError::ClassifierUnavailable));
        assert!(Classifier::ensure_trained(None, &svc, &TrainingParams::default()).is_none());
    }

    #[test]
    fn test_empty_samples_leave_handle_unset() {
        let svc = service(Ok(json!(0)));
        assert!(Classifier::ensure_trained(None, &svc, &TrainingParams::default()).is_none());
    }

    #[test]
    fn test_ensure_trained_is_idempotent() {
        let svc = service(Ok(json!(10)));
        let first = Classifier::ensure_trained(None, &svc, &TrainingParams::default());
        assert!(first.is_some());
        let second = Classifier::ensure_trained(first.clone(), &svc, &TrainingParams::default());
        assert_eq!(first, second);
        assert_eq!(*svc.calls.lock().unwrap(), 1);
    }
}
