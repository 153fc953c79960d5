//! Weather tool backed by wttr.in.
//!
//! Fetches `{base}/{city}?format=%C+%t` (condition plus temperature) and
//! wraps the body in a sentence the model can quote directly. Any failure
//! collapses into one fixed apology line: the model re-plans from it, so
//! transport detail would only add noise.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::traits::Tool;

const WEATHER_FORMAT_QUERY: &str = "format=%C+%t";
const WEATHER_FAILURE: &str = "Sorry, I couldn't retrieve the weather information right now.";

pub struct WeatherTool {
    base: Url,
    client: Client,
}

impl WeatherTool {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let base = Url::parse(base_url)
            .with_context(|| format!("invalid weather base URL: {base_url}"))?;
        anyhow::ensure!(
            !base.cannot_be_a_base(),
            "weather base URL cannot take a city path: {base_url}"
        );
        Ok(Self {
            base,
            client: Client::builder()
                .timeout(Duration::from_secs(15))
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
        })
    }

    fn endpoint(&self, city: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&city.to_lowercase());
        }
        url.set_query(Some(WEATHER_FORMAT_QUERY));
        url
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Takes a city name as input string and returns the current weather information for that city"
    }

    async fn run(&self, input: &str) -> anyhow::Result<String> {
        let city = input.trim();
        let Ok(response) = self.client.get(self.endpoint(city)).send().await else {
            return Ok(WEATHER_FAILURE.to_string());
        };
        if response.status() != reqwest::StatusCode::OK {
            return Ok(WEATHER_FAILURE.to_string());
        }
        match response.text().await {
            // The reported sentence keeps the caller's casing of the city.
            Ok(body) => Ok(format!("The current weather in {city} is: {body}")),
            Err(_) => Ok(WEATHER_FAILURE.to_string()),
        }
    }
}

// ─────────────────────────────── Tests ───────────────────────────────
