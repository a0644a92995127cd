//! Benchmark results.
//!
//! After the load test completes, the Goose request metrics can be turned into
//! a [`BenchmarkSubmission`]: the record format stored by the benchmark results
//! site. It combines a description of the system that was benchmarked
//! ([`BenchmarkMetadata`], read from `BENCHMARK_*` environment variables) with
//! per-request statistics ([`BenchmarkStat`]).
//!
//! | Variable | Field |
//! |---|---|
//! | `BENCHMARK_USER_NAME` | `user_name` |
//! | `BENCHMARK_ENVIRONMENT` | `environment`, defaults to `local` |
//! | `BENCHMARK_DRUPAL_VERSION` | `drupal_version`, defaults to `unknown` |
//! | `BENCHMARK_DOCKER_VERSION` | `docker_version` |
//! | `BENCHMARK_WEB_SERVER` | `web_server` |
//! | `BENCHMARK_DATABASE_TYPE` | `database.type` |
//! | `BENCHMARK_DATABASE_VERSION` | `database.version` |
//! | `BENCHMARK_PHP_VERSION` | `php_version` |
//! | `BENCHMARK_COMPUTER_MODEL` | `computer_model` |
//! | `BENCHMARK_COMMENT` | `comment` |
//! | `BENCHMARK_CPU` | `system.cpu`, defaults to `unknown` |
//! | `BENCHMARK_MEMORY` | `system.memory`, defaults to `unknown` |
//!
//! The record is posted to `BENCHMARK_SUBMIT_URL` and/or written to
//! `BENCHMARK_RESULTS_FILE` by [`deliver`].

use goose::metrics::GooseMetrics;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;

use crate::{BenchmarkError, APP_USER_AGENT};

/// Environment variable holding the URL results are posted to.
pub const SUBMIT_URL_VAR: &str = "BENCHMARK_SUBMIT_URL";

/// Environment variable holding the path results are written to.
pub const RESULTS_FILE_VAR: &str = "BENCHMARK_RESULTS_FILE";

/// Statistics for one request, response times in milliseconds.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct BenchmarkStat {
    pub name: String,
    pub method: String,
    pub num_requests: usize,
    pub num_failures: usize,
    pub total_response_time: usize,
    pub min_response_time: usize,
    pub max_response_time: usize,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct DatabaseMetadata {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SystemMetadata {
    pub os: String,
    pub cpu: String,
    pub memory: String,
}

/// Describes the system that was benchmarked.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct BenchmarkMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub environment: String,
    pub drupal_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_server: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub php_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computer_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub benchmark_version: String,
    pub system: SystemMetadata,
}

impl BenchmarkMetadata {
    /// Build the metadata, looking up each `BENCHMARK_*` variable with the
    /// provided function.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values are treated as unset.
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let database_type = get("BENCHMARK_DATABASE_TYPE");
        let database_version = get("BENCHMARK_DATABASE_VERSION");
        let database = if database_type.is_some() || database_version.is_some() {
            Some(DatabaseMetadata {
                kind: database_type,
                version: database_version,
            })
        } else {
            None
        };

        BenchmarkMetadata {
            user_name: get("BENCHMARK_USER_NAME"),
            environment: get("BENCHMARK_ENVIRONMENT").unwrap_or_else(|| "local".to_string()),
            drupal_version: get("BENCHMARK_DRUPAL_VERSION")
                .unwrap_or_else(|| "unknown".to_string()),
            docker_version: get("BENCHMARK_DOCKER_VERSION"),
            web_server: get("BENCHMARK_WEB_SERVER"),
            database,
            php_version: get("BENCHMARK_PHP_VERSION"),
            computer_model: get("BENCHMARK_COMPUTER_MODEL"),
            comment: get("BENCHMARK_COMMENT"),
            benchmark_version: env!("CARGO_PKG_VERSION").to_string(),
            system: SystemMetadata {
                os: env::consts::OS.to_string(),
                cpu: get("BENCHMARK_CPU").unwrap_or_else(|| "unknown".to_string()),
                memory: get("BENCHMARK_MEMORY").unwrap_or_else(|| "unknown".to_string()),
            },
        }
    }

    /// Build the metadata from the process environment.
    pub fn from_env() -> Self {
        BenchmarkMetadata::from_lookup(|key| env::var(key).ok())
    }
}

/// One benchmark record, as stored by the benchmark results site.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct BenchmarkSubmission {
    pub metadata: BenchmarkMetadata,
    pub stats: Vec<BenchmarkStat>,
}

impl BenchmarkSubmission {
    pub fn new(metadata: BenchmarkMetadata, metrics: &GooseMetrics) -> Self {
        BenchmarkSubmission {
            metadata,
            stats: stats_from_metrics(metrics),
        }
    }

    /// Find the statistics of a request by name.
    pub fn stat(&self, name: &str) -> Option<&BenchmarkStat> {
        self.stats.iter().find(|stat| stat.name == name)
    }
}

/// Convert the request metrics of a completed load test, sorted by request name
/// then method.
pub fn stats_from_metrics(metrics: &GooseMetrics) -> Vec<BenchmarkStat> {
    let mut stats: Vec<BenchmarkStat> = metrics
        .requests
        .values()
        .map(|request| BenchmarkStat {
            name: request.path.clone(),
            method: format!("{:?}", request.method).to_uppercase(),
            num_requests: request.success_count + request.fail_count,
            num_failures: request.fail_count,
            total_response_time: request.raw_data.total_time,
            min_response_time: request.raw_data.minimum_time,
            max_response_time: request.raw_data.maximum_time,
        })
        .collect();
    stats.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.method.cmp(&b.method)));
    stats
}

/// Where to deliver the results of a benchmark.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReportConfig {
    /// URL the results are posted to.
    pub submit_url: Option<String>,
    /// Path the results are written to.
    pub results_file: Option<String>,
}

impl ReportConfig {
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        ReportConfig {
            submit_url: get(SUBMIT_URL_VAR),
            results_file: get(RESULTS_FILE_VAR),
        }
    }

    pub fn from_env() -> Self {
        ReportConfig::from_lookup(|key| env::var(key).ok())
    }

    /// Whether the results need to be delivered anywhere.
    pub fn is_enabled(&self) -> bool {
        self.submit_url.is_some() || self.results_file.is_some()
    }
}

/// Post the results to the benchmark results site.
///
/// Any 2xx response (normally `201 Created`) is success. Other responses are
/// returned as [`BenchmarkError::SubmitRejected`].
pub async fn submit(url: &str, submission: &BenchmarkSubmission) -> Result<(), BenchmarkError> {
    let client = Client::builder().user_agent(APP_USER_AGENT).build()?;
    let response = client.post(url).json(submission).send().await?;

    let status = response.status();
    if status.is_success() {
        info!("submitted benchmark results to {} ({})", url, status);
        Ok(())
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(BenchmarkError::SubmitRejected {
            status: status.as_u16(),
            body,
        })
    }
}

/// Write the results to a file as pretty printed JSON.
pub async fn write_results(path: &str, submission: &BenchmarkSubmission) -> Result<(), BenchmarkError> {
    let json = serde_json::to_vec_pretty(submission)?;
    tokio::fs::write(path, json).await?;
    info!("wrote benchmark results to {}", path);

    Ok(())
}

/// Deliver the results of a completed load test wherever configured.
pub async fn deliver(
    config: &ReportConfig,
    metadata: BenchmarkMetadata,
    metrics: &GooseMetrics,
) -> Result<(), BenchmarkError> {
    if !config.is_enabled() {
        return Ok(());
    }

    let submission = BenchmarkSubmission::new(metadata, metrics);
    if submission.stat(crate::user::MODULES_PATH).is_none() {
        warn!(
            "no requests to {} were recorded",
            crate::user::MODULES_PATH
        );
    }

    if let Some(path) = config.results_file.as_ref() {
        write_results(path, &submission).await?;
    }
    if let Some(url) = config.submit_url.as_ref() {
        submit(url, &submission).await?;
    }

    Ok(())
}
