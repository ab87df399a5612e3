//! landcover: side-by-side Sentinel-2 land-cover maps
//!
//! A small web front end over Google Earth Engine. The user picks a region and
//! up to three years; for each year a random-forest classification of the
//! summer Sentinel-2 composite is rendered remotely and shown as a Leaflet map.
//! All imagery processing happens on Earth Engine; this crate authenticates,
//! builds the request expressions and assembles the pages.

pub mod types;
pub mod config;
pub mod io;
pub mod core;
pub mod web;

// Re-export main types and functions for easier access
pub use types::{
    BoundingBox, LandCoverClass, LandcoverError, LandcoverResult, LatLon, MapRequest, MapResult,
    Region,
};

pub use config::AppConfig;
pub use io::{Credentials, EarthEngineClient, ImageryService, TokenProvider};
pub use crate::core::{Classifier, MapSession, RegionCatalog, SessionReport, TrainingParams};
