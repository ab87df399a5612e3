//! Sentinel-2 imagery queries
//!
//! Builders for the remote verbs used to select, filter and composite
//! Sentinel-2 surface reflectance scenes.

use crate::core::expression::Node;
use crate::types::BoundingBox;
use chrono::NaiveDate;

/// Harmonized Sentinel-2 Level-2A surface reflectance collection
pub const SENTINEL2_SR: &str = "COPERNICUS/S2_SR_HARMONIZED";

/// Scene metadata property holding the cloudy pixel share (percent)
pub const CLOUD_PROPERTY: &str = "CLOUDY_PIXEL_PERCENTAGE";

/// Band name of the added vegetation index
pub const NDVI_BAND: &str = "NDVI";

/// Bands combined into NDVI: (near infrared, red)
pub const NDVI_INPUTS: [&str; 2] = ["B8", "B4"];

const MAPPING_VAR: &str = "_MAPPING_VAR_0_0";

/// Half-open acquisition window `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Growing season of a year: June 1 up to (not including) September 1
    pub fn summer(year: i32) -> Option<Self> {
        Some(Self {
            start: NaiveDate::from_ymd_opt(year, 6, 1)?,
            end: NaiveDate::from_ymd_opt(year, 9, 1)?,
        })
    }
}

/// Scene selection for one composite
#[derive(Debug, Clone, PartialEq)]
pub struct SceneQuery {
    pub window: DateWindow,
    pub bounds: Node,
    /// Scenes at or above this cloud percentage are dropped
    pub max_cloud_percent: f64,
}

impl SceneQuery {
    /// Filtered scene collection, before any per-image processing
    pub fn collection(&self) -> Node {
        let scenes = image_collection(SENTINEL2_SR);
        let scenes = filter_date(scenes, self.window);
        let scenes = filter_bounds(scenes, self.bounds.clone());
        filter_less_than(scenes, CLOUD_PROPERTY, self.max_cloud_percent)
    }

    /// Number of scenes matching the query
    pub fn count(&self) -> Node {
        collection_size(self.collection())
    }

    /// Median composite of all matching scenes with NDVI added, clipped to the
    /// query bounds
    pub fn median_composite(&self) -> Node {
        let with_ndvi = map_collection(self.collection(), add_ndvi(Node::argument(MAPPING_VAR)));
        clip(median(with_ndvi), self.bounds.clone())
    }
}

pub fn image_collection(id: &str) -> Node {
    Node::invoke("ImageCollection.load", [("id", Node::string(id))])
}

pub fn feature_collection(table_id: &str) -> Node {
    Node::invoke("Collection.loadTable", [("tableId", Node::string(table_id))])
}

pub fn date(day: NaiveDate) -> Node {
    Node::invoke(
        "Date",
        [("value", Node::string(&day.format("%Y-%m-%d").to_string()))],
    )
}

pub fn filter_date(collection: Node, window: DateWindow) -> Node {
    let range = Node::invoke(
        "DateRange",
        [("start", date(window.start)), ("end", date(window.end))],
    );
    let filter = Node::invoke(
        "Filter.dateRangeContains",
        [
            ("leftValue", range),
            ("rightField", Node::string("system:time_start")),
        ],
    );
    filter_collection(collection, filter)
}

pub fn filter_bounds(collection: Node, geometry: Node) -> Node {
    let filter = Node::invoke(
        "Filter.intersects",
        [("leftField", Node::string(".all")), ("rightValue", geometry)],
    );
    filter_collection(collection, filter)
}

pub fn filter_less_than(collection: Node, property: &str, value: f64) -> Node {
    let filter = Node::invoke(
        "Filter.lessThan",
        [
            ("leftField", Node::string(property)),
            ("rightValue", Node::constant(value)),
        ],
    );
    filter_collection(collection, filter)
}

fn filter_collection(collection: Node, filter: Node) -> Node {
    Node::invoke(
        "Collection.filter",
        [("collection", collection), ("filter", filter)],
    )
}

/// Apply `body` to every element; `body` refers to the element through
/// `Node::argument("_MAPPING_VAR_0_0")`
pub fn map_collection(collection: Node, body: Node) -> Node {
    Node::invoke(
        "Collection.map",
        [
            ("collection", collection),
            ("baseAlgorithm", Node::function(MAPPING_VAR, body)),
        ],
    )
}

pub fn merge(first: Node, second: Node) -> Node {
    Node::invoke(
        "Collection.merge",
        [("collection1", first), ("collection2", second)],
    )
}

pub fn collection_size(collection: Node) -> Node {
    Node::invoke("Collection.size", [("collection", collection)])
}

pub fn collection_bounds(collection: Node) -> Node {
    let geometry = Node::invoke("Collection.geometry", [("collection", collection)]);
    Node::invoke("Geometry.bounds", [("geometry", geometry)])
}

/// Set a property on every feature of a collection
pub fn set_property(collection: Node, key: &str, value: Node) -> Node {
    let body = Node::invoke(
        "Element.set",
        [
            ("object", Node::argument(MAPPING_VAR)),
            ("key", Node::string(key)),
            ("value", value),
        ],
    );
    map_collection(collection, body)
}

/// Planar rectangle from a bounding box
pub fn rectangle(bbox: &BoundingBox) -> Node {
    let coords = bbox.to_rectangle_coords();
    Node::invoke(
        "GeometryConstructors.Rectangle",
        [(
            "coordinates",
            Node::Array(coords.iter().map(|c| Node::constant(*c)).collect()),
        )],
    )
}

/// `image` with an extra `NDVI` band
pub fn add_ndvi(image: Node) -> Node {
    let ndvi = Node::invoke(
        "Image.normalizedDifference",
        [("input", image.clone()), ("bandNames", Node::strings(&NDVI_INPUTS))],
    );
    let ndvi = Node::invoke(
        "Image.rename",
        [("input", ndvi), ("names", Node::strings(&[NDVI_BAND]))],
    );
    Node::invoke("Image.addBands", [("dstImg", image), ("srcImg", ndvi)])
}

/// Per-band median of the collection. Band names are kept as they are,
/// unlike `ImageCollection.reduce`, which suffixes them with `_median`.
pub fn median(collection: Node) -> Node {
    Node::invoke("reduce.median", [("collection", collection)])
}

pub fn clip(image: Node, geometry: Node) -> Node {
    Node::invoke("Image.clip", [("input", image), ("geometry", geometry)])
}

pub fn select<S: AsRef<str>>(image: Node, bands: &[S]) -> Node {
    Node::invoke(
        "Image.select",
        [("input", image), ("bandSelectors", Node::strings(bands))],
    )
}
