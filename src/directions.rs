//! Directions-API HTTP adapter for routed paths.

use serde::Deserialize;
use tracing::warn;

use crate::latlng::LatLng;
use crate::traits::PathFetcher;

#[derive(Debug, Clone)]
pub struct DirectionsConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Default for DirectionsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://maps.googleapis.com/maps/api/directions/json".to_string(),
            api_key: String::new(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DirectionsClient {
    config: DirectionsConfig,
    client: reqwest::blocking::Client,
}

impl DirectionsClient {
    pub fn new(config: DirectionsConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

impl PathFetcher for DirectionsClient {
    fn fetch_path(&self, origin: LatLng, destination: LatLng) -> Vec<String> {
        let url = format!(
            "{}?origin={:.6},{:.6}&destination={:.6},{:.6}&key={}",
            self.config.base_url,
            origin.lat,
            origin.lng,
            destination.lat,
            destination.lng,
            self.config.api_key
        );

        let response = self
            .client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<DirectionsResponse>());

        match response {
            Ok(body) if body.status == "OK" => body
                .routes
                .into_iter()
                .take(1)
                .flat_map(|route| route.legs)
                .flat_map(|leg| leg.steps)
                .map(|step| step.polyline.points)
                .collect(),
            Ok(body) => {
                warn!(status = %body.status, "directions request rejected");
                Vec::new()
            }
            Err(err) => {
                warn!(error = %err, "directions request failed");
                Vec::new()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    #[serde(default)]
    legs: Vec<DirectionsLeg>,
}

#[derive(Debug, Deserialize)]
struct DirectionsLeg {
    #[serde(default)]
    steps: Vec<DirectionsStep>,
}

#[derive(Debug, Deserialize)]
struct DirectionsStep {
    polyline: EncodedPolyline,
}

#[derive(Debug, Deserialize)]
struct EncodedPolyline {
    points: String,
}
