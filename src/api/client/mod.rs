use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::envelope::Envelope;
use super::error::ApiError;
use super::model::{
    ClusterStatus, DatabaseStatistics, ExecuteQueryRequest, HistoryRecord, PerformanceInsight,
    PerformanceMetrics, PoolNode, PoolProcess, PoolStats, QueryResult, QueryStatistics,
};
use crate::config::Api;

const USER_AGENT: &str = concat!("pgpool_watch/", env!("CARGO_PKG_VERSION"));

const CLUSTER_STATUS: &str = "/api/cluster_status";
const CLUSTER_HISTORY: &str = "/api/cluster_history";
const EXECUTE_QUERY: &str = "/api/execute_query";
const STATS: &str = "/api/stats";
const PERFORMANCE_METRICS: &str = "/api/performance_metrics";
const QUERY_STATISTICS: &str = "/api/query_statistics";
const POOL_NODES: &str = "/api/pool_nodes";
const POOL_PROCESSES: &str = "/api/pool_processes";
const PERFORMANCE_INSIGHTS: &str = "/api/performance_insights";
const DATABASE_STATISTICS: &str = "/api/database_statistics";

/// Thin client for the pgpool admin API. Cheap to clone; every panel task
/// holds its own copy.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(api: &Api) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(api.request_timeout_secs))
            .build()
            .map_err(|error| ApiError::Client(format!("http client build failed: {error}")))?;

        Ok(Self {
            http,
            base_url: api.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn cluster_status(&self) -> Result<ClusterStatus, ApiError> {
        self.get_envelope(CLUSTER_STATUS, &[]).await
    }

    pub async fn cluster_history(&self, hours: u32) -> Result<Vec<HistoryRecord>, ApiError> {
        self.get_envelope(CLUSTER_HISTORY, &[("hours", hours.to_string())])
            .await
    }

    pub async fn performance_metrics(&self) -> Result<PerformanceMetrics, ApiError> {
        self.get_envelope(PERFORMANCE_METRICS, &[]).await
    }

    pub async fn query_statistics(&self) -> Result<QueryStatistics, ApiError> {
        self.get_envelope(QUERY_STATISTICS, &[]).await
    }

    pub async fn performance_insights(&self) -> Result<Vec<PerformanceInsight>, ApiError> {
        self.get_envelope(PERFORMANCE_INSIGHTS, &[]).await
    }

    pub async fn database_statistics(&self) -> Result<DatabaseStatistics, ApiError> {
        self.get_envelope(DATABASE_STATISTICS, &[]).await
    }

    pub async fn pool_nodes(&self) -> Result<Vec<PoolNode>, ApiError> {
        self.get_envelope(POOL_NODES, &[]).await
    }

    pub async fn pool_processes(&self) -> Result<Vec<PoolProcess>, ApiError> {
        self.get_envelope(POOL_PROCESSES, &[]).await
    }

    /// `/api/stats` is not enveloped; a populated `error` field is still an
    /// application failure.
    pub async fn stats(&self) -> Result<PoolStats, ApiError> {
        let body = self.send(STATS, self.http.get(self.url(STATS))).await?;
        let stats: PoolStats =
            serde_json::from_slice(&body).map_err(|error| ApiError::decode(STATS, error))?;

        if let Some(message) = stats.error.as_ref().filter(|message| !message.is_empty()) {
            return Err(ApiError::Application {
                endpoint: STATS.to_string(),
                message: message.clone(),
            });
        }

        Ok(stats)
    }

    pub async fn execute_query(&self, query: &str, database: &str) -> Result<QueryResult, ApiError> {
        let request = ExecuteQueryRequest {
            query: query.to_string(),
            database: database.to_string(),
        };
        self.post_envelope(EXECUTE_QUERY, &request).await
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn get_envelope<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let request = self.http.get(self.url(endpoint)).query(query);
        let body = self.send(endpoint, request).await?;
        Envelope::parse(endpoint, &body)?.into_data(endpoint)
    }

    async fn post_envelope<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        payload: &B,
    ) -> Result<T, ApiError> {
        let request = self.http.post(self.url(endpoint)).json(payload);
        let body = self.send(endpoint, request).await?;
        Envelope::parse(endpoint, &body)?.into_data(endpoint)
    }

    async fn send(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<Vec<u8>, ApiError> {
        let transport = |source| ApiError::Transport {
            endpoint: endpoint.to_string(),
            source,
        };

        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(rejected(endpoint, status.as_u16(), &body));
        }

        let body = response.bytes().await.map_err(transport)?;
        Ok(body.to_vec())
    }
}

/// Validation failures come back as 4xx with an error envelope; keep the
/// backend's message when there is one.
fn rejected(endpoint: &str, status: u16, body: &[u8]) -> ApiError {
    let message = Envelope::parse(endpoint, body)
        .ok()
        .and_then(|envelope| envelope.message)
        .filter(|message| !message.trim().is_empty());

    match message {
        Some(message) => ApiError::Application {
            endpoint: endpoint.to_string(),
            message,
        },
        None => ApiError::HttpStatus {
            endpoint: endpoint.to_string(),
            status,
        },
    }
}
