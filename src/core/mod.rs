//! Core request handling: expression graphs, queries, classifier and session

pub mod expression;
pub mod imagery;
pub mod regions;
pub mod years;
pub mod classifier;
pub mod maps;
pub mod session;

// Re-export main types
pub use expression::{Expression, Node};
pub use imagery::{DateWindow, SceneQuery};
pub use regions::RegionCatalog;
pub use years::{normalize_years, validate_years};
pub use classifier::{Classifier, TrainingParams};
pub use maps::{ClassificationParams, MapGenerator, YearOutcome};
pub use session::{MapSession, SessionReport};
