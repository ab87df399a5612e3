//! Catalog of study regions offered in the region dropdown

use crate::types::{BoundingBox, LatLon, Region};

static REGIONS: [Region; 6] = [
    Region {
        label: "Калмыкия (Озеро Нурын-Хаг)",
        center: LatLon { lat: 46.817790, lon: 45.354546 },
        bbox: BoundingBox { min_lon: 45.20, max_lon: 45.50, min_lat: 46.70, max_lat: 46.90 },
    },
    Region {
        label: "Волгоградская область (Озеро Эльтон)",
        center: LatLon { lat: 49.13, lon: 46.69 },
        bbox: BoundingBox { min_lon: 46.49, max_lon: 46.89, min_lat: 49.03, max_lat: 49.23 },
    },
    Region {
        label: "Ставропольский край (Чограйское вдхр.)",
        center: LatLon { lat: 45.45, lon: 44.70 },
        bbox: BoundingBox { min_lon: 44.50, max_lon: 44.90, min_lat: 45.35, max_lat: 45.55 },
    },
    Region {
        label: "Ростовская область (Восточные степи)",
        center: LatLon { lat: 46.40, lon: 43.65 },
        bbox: BoundingBox { min_lon: 43.45, max_lon: 43.85, min_lat: 46.30, max_lat: 46.50 },
    },
    Region {
        label: "Алтайский край (Кулундинская степь)",
        center: LatLon { lat: 53.00, lon: 79.70 },
        bbox: BoundingBox { min_lon: 79.50, max_lon: 79.90, min_lat: 52.90, max_lat: 53.10 },
    },
    Region {
        label: "Оренбургская область (Соль-Илецк)",
        center: LatLon { lat: 51.16, lon: 54.99 },
        bbox: BoundingBox { min_lon: 54.79, max_lon: 55.19, min_lat: 51.06, max_lat: 51.26 },
    },
];

/// Static region lookup
pub struct RegionCatalog;

impl RegionCatalog {
    /// All regions in dropdown order
    pub fn all() -> &'static [Region] {
        &REGIONS
    }

    /// Region preselected in the form
    pub fn default_region() -> &'static Region {
        &REGIONS[0]
    }

    pub fn lookup(label: &str) -> Option<&'static Region> {
        REGIONS.iter().find(|region| region.label == label)
    }

    pub fn labels() -> impl Iterator<Item = &'static str> {
        REGIONS.iter().map(|region| region.label)
    }
}
