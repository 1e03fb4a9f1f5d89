//! HTTP transport for SPARQL SELECT queries.

use crate::error::QueryError;
use crate::query::results::SparqlResults;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Anything that can answer a SPARQL SELECT query.
pub trait SparqlEndpoint: Send + Sync {
    /// Human readable service name used in logs.
    fn name(&self) -> &str;

    fn endpoint(&self) -> &str;

    fn select(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<SparqlResults, QueryError>> + Send;
}

/// SPARQL endpoint reached over HTTP GET with `format=json`.
#[derive(Debug, Clone)]
pub struct HttpSparqlClient {
    name: String,
    endpoint: String,
    timeout_seconds: u64,
    http_client: reqwest::Client,
}

impl HttpSparqlClient {
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        timeout_seconds: u64,
    ) -> Result<Self, QueryError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| QueryError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            name: name.into(),
            endpoint: endpoint.into(),
            timeout_seconds,
            http_client,
        })
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }
}

impl SparqlEndpoint for HttpSparqlClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn select(&self, query: &str) -> Result<SparqlResults, QueryError> {
        info!("Executing {} SPARQL query (length: {})", self.name, query.len());
        debug!("Query endpoint: {}", self.endpoint);

        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[("query", query), ("format", "json")])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    QueryError::Timeout(self.timeout_seconds)
                } else if e.is_connect() {
                    QueryError::Connection {
                        endpoint: self.endpoint.clone(),
                        message: e.to_string(),
                    }
                } else {
                    QueryError::Request(e.to_string())
                }
            })?;

        debug!("SPARQL response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!("{} returned HTTP {}", self.name, status);
            return Err(QueryError::Http { status, body });
        }

        let results: SparqlResults = response.json().await.map_err(|e| {
            if e.is_timeout() {
                QueryError::Timeout(self.timeout_seconds)
            } else {
                QueryError::InvalidJson(e.to_string())
            }
        })?;

        info!("Retrieved {} SPARQL result bindings", results.len());
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_keeps_settings() {
        let client =
            HttpSparqlClient::new("AOP-Wiki", "https://example.org/sparql/", 10).unwrap();
        assert_eq!(client.name(), "AOP-Wiki");
        assert_eq!(client.endpoint(), "https://example.org/sparql/");
        assert_eq!(client.timeout_seconds(), 10);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_connection_error() {
        // Port 9 on localhost is the discard service; nothing listens there in CI.
        let client = HttpSparqlClient::new("test", "http://127.0.0.1:9/sparql", 2).unwrap();
        let err = client.select("SELECT * WHERE { ?s ?p ?o }").await.unwrap_err();
        assert!(
            matches!(err, QueryError::Connection { .. } | QueryError::Timeout(_)),
            "unexpected error: {err:?}"
        );
        assert!(err.is_transient());
    }
}
