//! HTML fragments for the map panels
//!
//! Each classified year is shown as a self-contained Leaflet page inside an
//! `<iframe srcdoc>`, so the whole page has to be HTML-escaped.

use crate::core::maps::YearOutcome;
use crate::core::session::SessionReport;
use crate::types::{LandCoverClass, MapResult, MAX_YEARS};
use serde::Serialize;

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.7.1/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.7.1/dist/leaflet.js";

pub const DEFAULT_ZOOM: u8 = 12;
pub const OVERLAY_OPACITY: f64 = 0.7;

/// Escape text for HTML content and double- or single-quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// JavaScript string literal for `text`, safe inside a `<script>` element
pub fn js_string(text: &str) -> String {
    serde_json::Value::String(text.to_string())
        .to_string()
        .replace("</", "<\\/")
}

fn legend_rows() -> String {
    LandCoverClass::ALL
        .iter()
        .map(|class| {
            format!(
                "<div><i style=\"background:{}\"></i>{}</div>",
                class.color(),
                escape_html(class.label())
            )
        })
        .collect()
}

/// Standalone Leaflet page: Google satellite and OpenStreetMap base layers,
/// the classification overlay, a layer switcher and a class legend
pub fn map_page(map: &MapResult) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Карта {year}</title>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <link rel="stylesheet" href="{css}" />
    <script src="{js}"></script>
    <style>
        html, body, #map {{ height: 100%; width: 100%; margin: 0; padding: 0; }}
        .legend {{ background: rgba(255,255,255,0.85); padding: 6px 8px; font: 12px sans-serif; border-radius: 4px; }}
        .legend i {{ display: inline-block; width: 12px; height: 12px; margin-right: 6px; border: 1px solid #999; vertical-align: middle; }}
    </style>
</head>
<body>
    <div id="map"></div>
    <script>
        var osm = L.tileLayer('https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png', {{
            attribution: '&copy; <a href="https://www.openstreetmap.org/copyright">OpenStreetMap</a>'
        }});

        var googleSatellite = L.tileLayer('https://{{s}}.google.com/vt/lyrs=s&x={{x}}&y={{y}}&z={{z}}', {{
            maxZoom: 20,
            subdomains: ['mt0', 'mt1', 'mt2', 'mt3'],
            attribution: 'Google Satellite'
        }});

        var classification = L.tileLayer({tile_url}, {{
            attribution: 'Google Earth Engine',
            opacity: {opacity}
        }});

        var map = L.map('map', {{
            center: [{lat}, {lon}],
            zoom: {zoom},
            layers: [googleSatellite, classification]
        }});

        L.control.layers(
            {{ "Спутник Google": googleSatellite, "Карта-схема": osm }},
            {{ "Классификация {year}": classification }}
        ).addTo(map);

        var legend = L.control({{ position: 'bottomright' }});
        legend.onAdd = function () {{
            var div = L.DomUtil.create('div', 'legend');
            div.innerHTML = {legend};
            return div;
        }};
        legend.addTo(map);
    </script>
</body>
</html>
"#,
        year = map.year,
        css = LEAFLET_CSS,
        js = LEAFLET_JS,
        tile_url = js_string(&map.tile_url),
        opacity = OVERLAY_OPACITY,
        lat = map.center.lat,
        lon = map.center.lon,
        zoom = DEFAULT_ZOOM,
        legend = js_string(&legend_rows()),
    )
}

/// The map page wrapped in an inline frame
pub fn map_iframe(map: &MapResult) -> String {
    format!(
        r#"<iframe srcdoc="{}" style="width: 100%; height: 500px; border: 1px solid #ccc;"></iframe>"#,
        escape_html(&map_page(map))
    )
}

/// Panel shown in place of a map for a year that produced none
pub fn placeholder_panel(message: &str) -> String {
    format!(
        "<p style=\"text-align:center; padding-top: 200px;\">{}</p>",
        escape_html(message)
    )
}

/// What one submission renders: up to three HTML panels and a status line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelSet {
    pub panels: [Option<String>; MAX_YEARS],
    pub status: String,
}

impl PanelSet {
    pub fn from_report(report: &SessionReport) -> Self {
        let mut panels: [Option<String>; MAX_YEARS] = Default::default();
        for (slot, outcome) in panels.iter_mut().zip(report.outcomes()) {
            *slot = Some(match outcome {
                YearOutcome::Rendered(map) => map_iframe(map),
                _ => placeholder_panel(&outcome.message().unwrap_or_default()),
            });
        }
        Self {
            panels,
            status: report.status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LatLon;

    fn unescape_html(text: &str) -> String {
        text.replace("&quot;", "\"")
            .replace("&#x27;", "'")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&amp;", "&")
    }

    fn sample_map(tile_url: &str) -> MapResult {
        MapResult {
            center: LatLon { lat: 46.81779, lon: 45.354546 },
            tile_url: tile_url.to_string(),
            year: 2023,
        }
    }

    #[test]
    fn test_escape_round_trip() {
        let urls = [
            "https://earthengine.googleapis.com/v1/projects/p/maps/abc/tiles/{z}/{x}/{y}",
            "https://example.com/t?a=1&b=\"2\"&c='3'&d=<4>",
            "&amp; already escaped",
        ];
        for url in urls {
            let escaped = escape_html(url);
            assert!(!escaped.contains('"'));
            assert!(!escaped.contains('<'));
            assert!(!escaped.contains('\''));
            assert_eq!(unescape_html(&escaped), url);
        }
    }

    #[test]
    fn test_js_string_cannot_close_script() {
        let literal = js_string("https://x/</script><script>alert(1)</script>");
        assert!(!literal.contains("</"));
        assert!(literal.starts_with('"') && literal.ends_with('"'));
        assert_eq!(js_string("a\"b"), r#""a\"b""#);
    }

    #[test]
    fn test_map_page_contents() {
        let page = map_page(&sample_map(
            "https://earthengine.googleapis.com/v1/projects/p/maps/m/tiles/{z}/{x}/{y}",
        ));
        assert!(page.contains(LEAFLET_JS));
        assert!(page.contains(
            "L.tileLayer(\"https://earthengine.googleapis.com/v1/projects/p/maps/m/tiles/{z}/{x}/{y}\""
        ));
        assert!(page.contains("center: [46.81779, 45.354546]"));
        assert!(page.contains("zoom: 12"));
        assert!(page.contains("opacity: 0.7"));
        assert!(page.contains("https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png"));
        for class in LandCoverClass::ALL {
            assert!(page.contains(class.color()));
        }
    }

    #[test]
    fn test_iframe_embeds_escaped_page() {
        let map = sample_map("https://tiles.example/{z}/{x}/{y}?k=a&b");
        let iframe = map_iframe(&map);
        assert!(iframe.starts_with("<iframe srcdoc=\""));
        assert!(iframe.ends_with("</iframe>"));

        let start = "<iframe srcdoc=\"".len();
        let end = iframe.find("\" style=").unwrap();
        let srcdoc = &iframe[start..end];
        assert!(!srcdoc.contains('"'));
        assert_eq!(unescape_html(srcdoc), map_page(&map));
    }

    #[test]
    fn test_placeholder_escapes_message() {
        let panel = placeholder_panel("<b>нет</b>");
        assert!(panel.contains("&lt;b&gt;нет&lt;/b&gt;"));
    }

    #[test]
    fn test_panels_follow_outcomes() {
        let report = SessionReport::Completed(vec![
            YearOutcome::Rendered(MapResult {
                center: LatLon { lat: 46.8, lon: 45.35 },
                tile_url: "https://tiles/2019/{z}/{x}/{y}".to_string(),
                year: 2019,
            }),
            YearOutcome::NoImagery(2021),
        ]);
        let set = PanelSet::from_report(&report);
        assert!(set.panels[0].as_ref().unwrap().starts_with("<iframe srcdoc=\""));
        assert!(set.panels[1].as_ref().unwrap().contains("Не найдено снимков за 2021 год."));
        assert!(set.panels[2].is_none());
        assert_eq!(set.status, report.status());

        let rejected = PanelSet::from_report(&SessionReport::NotReady);
        assert!(rejected.panels.iter().all(Option::is_none));
    }
}
