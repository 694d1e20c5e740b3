//! Scenario files: recorded or generated request streams for replay.

use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use incidra_core::types::HttpMethod;
use incidra_engine::RawRequest;

/// A named stream of raw requests with pinned timestamps.
#[derive(Debug, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub requests: Vec<RawRequest>,
}

impl Scenario {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("reading scenario {}", path.as_ref().display()))?;
        serde_yaml::from_str(&text).context("parsing scenario YAML")
    }

    pub fn to_yaml(&self) -> anyhow::Result<String> {
        serde_yaml::to_string(self).context("serializing scenario")
    }
}

/// Synthesize a mixed benign/hostile scenario. Deterministic for a given
/// seed, so generated scenarios are replayable fixtures.
pub fn generate(seed: u64, count: usize) -> Scenario {
    let mut rng = StdRng::seed_from_u64(seed);
    let base = Utc::now() - Duration::minutes(4);

    let sources = ["10.0.0.1", "10.0.0.2", "172.16.3.7", "192.168.1.50"];
    let endpoints = ["/api/items", "/api/search", "/api/v1/login", "/api/orders"];

    let requests = (0..count)
        .map(|i| {
            let at = base + Duration::seconds(i as i64 * 3);
            let source = sources[rng.random_range(0..sources.len())];
            match rng.random_range(0..5u8) {
                0 => attack_request(source, at, "q=1 union select password from users"),
                1 => attack_request(source, at, "comment=<script>document.cookie</script>"),
                2 => failed_login(source, at),
                _ => benign_request(
                    source,
                    at,
                    endpoints[rng.random_range(0..endpoints.len())],
                ),
            }
        })
        .collect();

    Scenario {
        name: format!("generated-{seed}"),
        description: Some(format!("synthetic mixed traffic, seed {seed}")),
        requests,
    }
}

fn base_request(source: &str, at: DateTime<Utc>, endpoint: &str) -> RawRequest {
    RawRequest {
        source_addr: source.to_string(),
        source: incidra_core::types::EventSource::Simulator,
        target_system: "incidra-backend".to_string(),
        endpoint: endpoint.to_string(),
        http_method: Some(HttpMethod::Post),
        status_code: 200,
        body: String::new(),
        query: String::new(),
        username: None,
        bytes_in: 128,
        bytes_out: 512,
        timestamp: Some(at),
    }
}

fn benign_request(source: &str, at: DateTime<Utc>, endpoint: &str) -> RawRequest {
    RawRequest {
        body: r#"{"page":1,"size":20}"#.to_string(),
        ..base_request(source, at, endpoint)
    }
}

fn attack_request(source: &str, at: DateTime<Utc>, payload: &str) -> RawRequest {
    RawRequest {
        body: payload.to_string(),
        ..base_request(source, at, "/api/search")
    }
}

fn failed_login(source: &str, at: DateTime<Utc>) -> RawRequest {
    RawRequest {
        status_code: 401,
        username: Some("admin".to_string()),
        body: r#"{"username":"admin","password":"hunter2"}"#.to_string(),
        ..base_request(source, at, "/api/v1/login")
    }
}
