//! I/O modules for talking to Earth Engine: credentials and the REST client

pub mod credentials;
pub mod earth_engine;

pub use credentials::{Credentials, TokenProvider};
pub use earth_engine::{EarthEngineClient, ImageryService};
