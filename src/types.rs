use serde::{Deserialize, Serialize};

/// First and last year the year sliders accept
pub const FIRST_YEAR: i32 = 2019;
pub const LAST_YEAR: i32 = 2025;

/// Maximum number of years compared in one request
pub const MAX_YEARS: usize = 3;

/// Geographic point, latitude first as the map widget expects
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Coordinates in the order the remote rectangle constructor takes them:
    /// `[lon_min, lat_min, lon_max, lat_max]`
    pub fn to_rectangle_coords(&self) -> [f64; 4] {
        [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
    }

    pub fn contains(&self, point: LatLon) -> bool {
        (self.min_lon..=self.max_lon).contains(&point.lon)
            && (self.min_lat..=self.max_lat).contains(&point.lat)
    }
}

/// A named study area from the region catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    pub label: &'static str,
    pub center: LatLon,
    pub bbox: BoundingBox,
}

/// Land-cover classes produced by the classifier, in class-id order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LandCoverClass {
    Desert,
    Solonchak,
    AridSteppe,
    Greenery,
    Water,
}

impl LandCoverClass {
    pub const ALL: [LandCoverClass; 5] = [
        LandCoverClass::Desert,
        LandCoverClass::Solonchak,
        LandCoverClass::AridSteppe,
        LandCoverClass::Greenery,
        LandCoverClass::Water,
    ];

    /// Value of the `class` property on training samples and classified pixels
    pub fn id(&self) -> u8 {
        match self {
            LandCoverClass::Desert => 0,
            LandCoverClass::Solonchak => 1,
            LandCoverClass::AridSteppe => 2,
            LandCoverClass::Greenery => 3,
            LandCoverClass::Water => 4,
        }
    }

    /// Suffix of the training sample asset for this class
    pub fn asset_slug(&self) -> &'static str {
        match self {
            LandCoverClass::Desert => "desert",
            LandCoverClass::Solonchak => "solonchak",
            LandCoverClass::AridSteppe => "arid",
            LandCoverClass::Greenery => "greenery",
            LandCoverClass::Water => "water",
        }
    }

    /// Palette color used when rendering the classified raster
    pub fn color(&self) -> &'static str {
        match self {
            LandCoverClass::Desert => "#e3a25a",
            LandCoverClass::Solonchak => "#ffffff",
            LandCoverClass::AridSteppe => "#ffff00",
            LandCoverClass::Greenery => "#00ff00",
            LandCoverClass::Water => "#0000FF",
        }
    }

    /// Legend label shown on the map
    pub fn label(&self) -> &'static str {
        match self {
            LandCoverClass::Desert => "Пустыня",
            LandCoverClass::Solonchak => "Солончак",
            LandCoverClass::AridSteppe => "Сухая степь",
            LandCoverClass::Greenery => "Зелень",
            LandCoverClass::Water => "Вода",
        }
    }
}

impl std::fmt::Display for LandCoverClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.asset_slug())
    }
}

/// A rendered classification for one year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapResult {
    pub center: LatLon,
    /// Tile URL template with `{z}`, `{x}` and `{y}` placeholders
    pub tile_url: String,
    pub year: i32,
}

/// One user submission: a region label and the years to compare
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapRequest {
    pub region: String,
    pub years: Vec<i32>,
}

/// Error types for the land-cover front end
#[derive(Debug, thiserror::Error)]
pub enum LandcoverError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Earth Engine returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown region: {0}")]
    UnknownRegion(String),

    #[error("Year {0} is outside {}-{}", FIRST_YEAR, LAST_YEAR)]
    YearOutOfRange(i32),

    #[error("At most {} distinct years can be compared, got {0}", MAX_YEARS)]
    TooManyYears(usize),

    #[error("Classifier is not trained")]
    ClassifierUnavailable,

    #[error("No imagery found for {0}")]
    NoImagery(i32),
}

/// Result type for land-cover operations
pub type LandcoverResult<T> = Result<T, LandcoverError>;
