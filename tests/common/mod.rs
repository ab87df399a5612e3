#![allow(dead_code)]

use landcover::core::expression::Node;
use landcover::{ImageryService, LandcoverError, LandcoverResult};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory stand-in for Earth Engine. Scene counts are looked up by the
/// year found in the query's date filter; training queries report
/// `training_points` samples.
pub struct FakeEarthEngine {
    pub training_points: u64,
    pub scenes_per_year: HashMap<i32, u64>,
    pub failing_years: Vec<i32>,
    pub compute_calls: Mutex<usize>,
    pub map_calls: Mutex<Vec<Node>>,
}

impl FakeEarthEngine {
    pub fn new(training_points: u64) -> Self {
        Self {
            training_points,
            scenes_per_year: HashMap::new(),
            failing_years: Vec::new(),
            compute_calls: Mutex::new(0),
            map_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_scenes(mut self, year: i32, count: u64) -> Self {
        self.scenes_per_year.insert(year, count);
        self
    }

    pub fn failing(mut self, year: i32) -> Self {
        self.failing_years.push(year);
        self
    }

    pub fn remote_calls(&self) -> usize {
        *self.compute_calls.lock().unwrap() + self.map_calls.lock().unwrap().len()
    }
}

/// Year of the first `Date` constant in the tree, e.g. `2021-06-01`
pub fn query_year(node: &Node) -> Option<i32> {
    match node {
        Node::Invocation { function, arguments } => {
            if function == "Date" {
                if let Some(Node::Constant(Value::String(day))) = arguments.get("value") {
                    return day.get(..4).and_then(|y| y.parse().ok());
                }
            }
            arguments.values().find_map(query_year)
        }
        Node::Array(items) => items.iter().find_map(query_year),
        Node::Dictionary(entries) => entries.values().find_map(query_year),
        Node::Function { body, .. } => query_year(body),
        _ => None,
    }
}

fn is_training_query(node: &Node) -> bool {
    match node {
        Node::Invocation { function, arguments } => {
            function == "Collection.loadTable" || arguments.values().any(is_training_query)
        }
        Node::Function { body, .. } => is_training_query(body),
        _ => false,
    }
}

impl ImageryService for FakeEarthEngine {
    fn compute_value(&self, expression: &Node) -> LandcoverResult<Value> {
        *self.compute_calls.lock().unwrap() += 1;
        if is_training_query(expression) {
            return Ok(json!(self.training_points));
        }

        let year = query_year(expression).expect("scene count query without a date filter");
        if self.failing_years.contains(&year) {
            return Err(LandcoverError::Remote {
                status: 503,
                message: "Service unavailable".to_string(),
            });
        }
        Ok(json!(self.scenes_per_year.get(&year).copied().unwrap_or(0)))
    }

    fn create_map(&self, image: &Node) -> LandcoverResult<String> {
        let mut calls = self.map_calls.lock().unwrap();
        calls.push(image.clone());
        // Skip the classifier subtree, whose training window has its own dates
        let year = image
            .arg("image")
            .and_then(|classified| classified.arg("image"))
            .and_then(query_year)
            .unwrap_or_default();
        Ok(format!(
            "https://earthengine.googleapis.com/v1/projects/test/maps/{}-{}/tiles/{{z}}/{{x}}/{{y}}",
            year,
            calls.len()
        ))
    }
}
