use crate::core::expression::{Expression, Node};
use crate::io::credentials::TokenProvider;
use crate::types::{LandcoverError, LandcoverResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_API_URL: &str = "https://earthengine.googleapis.com";
const API_VERSION: &str = "v1";

/// The remote operations the front end needs from Earth Engine
pub trait ImageryService: Send + Sync {
    /// Evaluate an expression and return its value
    fn compute_value(&self, expression: &Node) -> LandcoverResult<Value>;

    /// Register a visualized image and return its tile URL template
    fn create_map(&self, image: &Node) -> LandcoverResult<String>;
}

#[derive(Serialize)]
struct ComputeValueRequest<'a> {
    expression: &'a Expression,
}

#[derive(Deserialize)]
struct ComputeValueResponse {
    result: Option<Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateMapRequest<'a> {
    expression: &'a Expression,
    file_format: &'a str,
}

#[derive(Deserialize)]
struct CreateMapResponse {
    name: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Pull the human-readable message out of a Google API error body
pub fn remote_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

/// Blocking client for the Earth Engine REST API
pub struct EarthEngineClient {
    api_url: String,
    project: String,
    http: reqwest::blocking::Client,
    tokens: TokenProvider,
}

impl EarthEngineClient {
    pub fn new(
        api_url: &str,
        project: &str,
        http: reqwest::blocking::Client,
        tokens: TokenProvider,
    ) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            project: project.to_string(),
            http,
            tokens,
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// Endpoint for a project-scoped method, e.g. `value:compute`
    pub fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/{}/projects/{}/{}",
            self.api_url, API_VERSION, self.project, method
        )
    }

    /// Tile URL template for a map resource name returned by `maps.create`
    pub fn tile_url_template(&self, map_name: &str) -> String {
        format!(
            "{}/{}/{}/tiles/{{z}}/{{x}}/{{y}}",
            self.api_url, API_VERSION, map_name
        )
    }

    /// Make sure the credentials can be exchanged for a token
    pub fn authenticate(&self) -> LandcoverResult<()> {
        self.tokens.access_token().map(|_| ())
    }

    fn post<B: Serialize>(&self, url: &str, body: &B) -> LandcoverResult<String> {
        let token = self.tokens.access_token()?;
        log::debug!("POST {}", url);

        let response = self.http.post(url).bearer_auth(token).json(body).send()?;
        let status = response.status();
        let text = response.text()?;

        if !status.is_success() {
            return Err(LandcoverError::Remote {
                status: status.as_u16(),
                message: remote_error_message(&text),
            });
        }
        Ok(text)
    }
}

impl ImageryService for EarthEngineClient {
    fn compute_value(&self, expression: &Node) -> LandcoverResult<Value> {
        let expression = Expression::from_node(expression);
        let text = self.post(
            &self.endpoint("value:compute"),
            &ComputeValueRequest { expression: &expression },
        )?;
        let response: ComputeValueResponse = serde_json::from_str(&text)?;
        Ok(response.result.unwrap_or(Value::Null))
    }

    fn create_map(&self, image: &Node) -> LandcoverResult<String> {
        let expression = Expression::from_node(image);
        let text = self.post(
            &self.endpoint("maps"),
            &CreateMapRequest {
                expression: &expression,
                file_format: "AUTO_JPEG_PNG",
            },
        )?;
        let response: CreateMapResponse = serde_json::from_str(&text)?;
        if response.name.is_empty() {
            return Err(LandcoverError::InvalidResponse(
                "maps.create returned an empty map name".to_string(),
            ));
        }
        Ok(self.tile_url_template(&response.name))
    }
}

/// Interpret a computed value as a count
pub fn value_as_count(value: &Value) -> LandcoverResult<u64> {
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|v| *v >= 0.0).map(|v| v as u64))
        .ok_or_else(|| LandcoverError::InvalidResponse(format!("Expected a count, got {}", value)))
}
