//! Network construction from SPARQL endpoints.
//!
//! The builder owns the network and one client per endpoint. Every step
//! reports what it did as a [`QueryOutcome`] so callers can show or log
//! the queries that were sent.

pub mod processor;

use crate::cytoscape::elements::CytoscapeDocument;
use crate::error::{AopError, QueryError, Result};
use crate::model::network::AopNetwork;
use crate::model::types::AOP_URI_PREFIX;
use crate::query::aopwiki::{self, QueryType};
use crate::query::bgee;
use crate::query::client::SparqlEndpoint;
use crate::query::results::{Binding, SparqlResults};
use processor::{AopBindingProcessor, AssociationProcessor};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

pub use processor::ProcessedPathways;

/// Result of a single builder step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// The query was sent and its rows applied to the network.
    Executed { query: String, bindings: usize },
    /// Nothing to ask for; the reason is human readable.
    Skipped(String),
}

impl QueryOutcome {
    pub fn query(&self) -> Option<&str> {
        match self {
            QueryOutcome::Executed { query, .. } => Some(query),
            QueryOutcome::Skipped(_) => None,
        }
    }

    pub fn is_executed(&self) -> bool {
        matches!(self, QueryOutcome::Executed { .. })
    }
}

/// Enrichment queries that run after the pathway backbone is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Genes { include_proteins: bool },
    Organs,
    Components { go_only: bool },
    Compounds,
    GeneExpression { confidence: Option<u8> },
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Genes { .. } => "genes",
            Step::Organs => "organs",
            Step::Components { .. } => "components",
            Step::Compounds => "compounds",
            Step::GeneExpression { .. } => "gene expression",
        };
        f.write_str(name)
    }
}

/// Which enrichments [`AopNetworkBuilder::enrich`] runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichOptions {
    pub genes: bool,
    pub include_proteins: bool,
    pub organs: bool,
    pub components: bool,
    pub go_only: bool,
    pub compounds: bool,
    pub gene_expression: bool,
    pub confidence: Option<u8>,
}

impl EnrichOptions {
    /// AOP-Wiki steps, in the order their results are applied.
    pub fn aopwiki_steps(&self) -> Vec<Step> {
        let mut steps = Vec::new();
        if self.genes {
            steps.push(Step::Genes {
                include_proteins: self.include_proteins,
            });
        }
        if self.organs {
            steps.push(Step::Organs);
        }
        if self.components {
            steps.push(Step::Components {
                go_only: self.go_only,
            });
        }
        if self.compounds {
            steps.push(Step::Compounds);
        }
        steps
    }

    pub fn is_empty(&self) -> bool {
        self.aopwiki_steps().is_empty() && !self.gene_expression
    }
}

/// What an [`AopNetworkBuilder::enrich`] call did.
#[derive(Debug, Default)]
pub struct EnrichReport {
    pub outcomes: Vec<(Step, QueryOutcome)>,
    pub failures: Vec<(Step, QueryError)>,
}

impl EnrichReport {
    fn record(&mut self, step: Step, result: std::result::Result<QueryOutcome, QueryError>) {
        match result {
            Ok(outcome) => self.outcomes.push((step, outcome)),
            Err(e) => {
                warn!("Failed to query {}: {}", step, e);
                self.failures.push((step, e));
            }
        }
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

enum Fetched {
    Skipped(String),
    Done { query: String, results: SparqlResults },
    Failed(QueryError),
}

async fn fetch<E: SparqlEndpoint>(endpoint: &E, prepared: std::result::Result<String, String>) -> Fetched {
    let query = match prepared {
        Ok(query) => query,
        Err(reason) => return Fetched::Skipped(reason),
    };
    debug!("Sending query to {}", endpoint.name());
    match endpoint.select(&query).await {
        Ok(results) => Fetched::Done { query, results },
        Err(e) => Fetched::Failed(e),
    }
}

/// Builds an [`AopNetwork`] from AOP-Wiki and Bgee.
pub struct AopNetworkBuilder<E: SparqlEndpoint> {
    network: AopNetwork,
    aopwiki: E,
    bgee: E,
}

impl<E: SparqlEndpoint> AopNetworkBuilder<E> {
    pub fn new(aopwiki: E, bgee: E) -> Self {
        Self {
            network: AopNetwork::new(),
            aopwiki,
            bgee,
        }
    }

    pub fn with_network(mut self, network: AopNetwork) -> Self {
        self.network = network;
        self
    }

    pub fn network(&self) -> &AopNetwork {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut AopNetwork {
        &mut self.network
    }

    pub fn into_network(self) -> AopNetwork {
        self.network
    }

    /// Query pathways by MIE, AOP or key event identifiers and add them to
    /// the network.
    pub async fn query_by_identifier(
        &mut self,
        query_type: QueryType,
        values: &str,
    ) -> std::result::Result<QueryOutcome, QueryError> {
        let prepared = if values.trim().is_empty() {
            Err("No identifiers to query".to_string())
        } else {
            Ok(aopwiki::aop_network_query(query_type, values))
        };

        match fetch(&self.aopwiki, prepared).await {
            Fetched::Skipped(reason) => {
                warn!("{}", reason);
                Ok(QueryOutcome::Skipped(reason))
            }
            Fetched::Failed(e) => Err(e),
            Fetched::Done { query, results } => {
                let processed = AopBindingProcessor::process(results.bindings());
                info!(
                    "Pathway query returned {} key events and {} KERs",
                    processed.key_events.len(),
                    processed.relationships.len()
                );
                for key_event in processed.key_events {
                    self.network.add_key_event(key_event);
                }
                for relationship in processed.relationships {
                    self.network.add_relationship(relationship);
                }
                Ok(QueryOutcome::Executed {
                    query,
                    bindings: results.len(),
                })
            }
        }
    }

    pub async fn query_genes(
        &mut self,
        include_proteins: bool,
    ) -> std::result::Result<QueryOutcome, QueryError> {
        self.run_step(Step::Genes { include_proteins }).await
    }

    pub async fn query_organs(&mut self) -> std::result::Result<QueryOutcome, QueryError> {
        self.run_step(Step::Organs).await
    }

    pub async fn query_compounds(&mut self) -> std::result::Result<QueryOutcome, QueryError> {
        self.run_step(Step::Compounds).await
    }

    pub async fn query_components(
        &mut self,
        go_only: bool,
    ) -> std::result::Result<QueryOutcome, QueryError> {
        self.run_step(Step::Components { go_only }).await
    }

    /// Query Bgee for expression of the network's genes in its organs.
    /// Skipped unless the network has both.
    pub async fn query_gene_expression(
        &mut self,
        confidence: Option<u8>,
    ) -> std::result::Result<QueryOutcome, QueryError> {
        self.run_step(Step::GeneExpression { confidence }).await
    }

    /// Run the requested AOP-Wiki enrichments concurrently, then gene
    /// expression. A failing step is recorded in the report and does not
    /// stop the others.
    pub async fn enrich(&mut self, options: &EnrichOptions) -> EnrichReport {
        let steps = options.aopwiki_steps();
        let fetched = futures::future::join_all(
            steps
                .iter()
                .map(|&step| fetch(self.endpoint_for(step), self.prepare(step))),
        )
        .await;

        let mut report = EnrichReport::default();
        for (step, result) in steps.into_iter().zip(fetched) {
            let settled = self.settle(step, result);
            report.record(step, settled);
        }

        if options.gene_expression {
            let step = Step::GeneExpression {
                confidence: options.confidence,
            };
            let settled = self.run_step(step).await;
            report.record(step, settled);
        }

        report
    }

    /// Replace the network with one loaded from a Cytoscape JSON document.
    /// A document without elements leaves the network untouched.
    pub fn update_from_json(&mut self, cytoscape_json: Value) -> Result<()> {
        let document: CytoscapeDocument = serde_json::from_value(cytoscape_json)?;
        if document.elements.is_empty() {
            warn!("No elements found in cytoscape JSON");
            return Ok(());
        }
        self.network.from_cytoscape_elements(&document.elements);
        Ok(())
    }

    /// [`update_from_json`](Self::update_from_json) for a Cytoscape JSON file.
    pub fn update_from_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AopError::io(format!("Failed to read {}", path.display()), e))?;
        let json: Value = serde_json::from_str(&content)?;
        debug!("Loaded network JSON from {}", path.display());
        self.update_from_json(json)
    }

    async fn run_step(&mut self, step: Step) -> std::result::Result<QueryOutcome, QueryError> {
        let fetched = fetch(self.endpoint_for(step), self.prepare(step)).await;
        self.settle(step, fetched)
    }

    fn endpoint_for(&self, step: Step) -> &E {
        match step {
            Step::GeneExpression { .. } => &self.bgee,
            _ => &self.aopwiki,
        }
    }

    /// Build the query for a step, or the reason it has nothing to ask.
    fn prepare(&self, step: Step) -> std::result::Result<String, String> {
        match step {
            Step::Genes { include_proteins } => {
                let ke_uris = self.require_key_events(step)?;
                Ok(aopwiki::gene_query(&ke_uris, include_proteins))
            }
            Step::Organs => {
                let ke_uris = self.require_key_events(step)?;
                Ok(aopwiki::organ_query(&ke_uris))
            }
            Step::Components { go_only } => {
                let ke_uris = self.require_key_events(step)?;
                Ok(aopwiki::component_query(go_only, &ke_uris))
            }
            Step::Compounds => {
                let aop_uris: Vec<String> = self
                    .network
                    .aop_ids()
                    .iter()
                    .map(|id| format!("{}{}", AOP_URI_PREFIX, id))
                    .collect();
                if aop_uris.is_empty() {
                    return Err("No AOPs found for compound querying".to_string());
                }
                Ok(aopwiki::compound_query(&aop_uris))
            }
            Step::GeneExpression { confidence } => {
                let gene_ids = self.network.gene_ids();
                let organ_names = self.network.organ_names();
                if gene_ids.is_empty() || organ_names.is_empty() {
                    return Err("Gene expression needs both genes and organs".to_string());
                }
                Ok(bgee::gene_expression_query(&gene_ids, &organ_names, confidence))
            }
        }
    }

    fn require_key_events(&self, step: Step) -> std::result::Result<Vec<String>, String> {
        let ke_uris = self.network.ke_uris();
        if ke_uris.is_empty() {
            return Err(format!("No Key Events found for {} querying", step));
        }
        Ok(ke_uris)
    }

    fn settle(&mut self, step: Step, fetched: Fetched) -> std::result::Result<QueryOutcome, QueryError> {
        match fetched {
            Fetched::Skipped(reason) => {
                warn!("{}", reason);
                Ok(QueryOutcome::Skipped(reason))
            }
            Fetched::Failed(e) => Err(e),
            Fetched::Done { query, results } => {
                let added = self.apply(step, results.bindings());
                info!("Added {} {} associations", added, step);
                Ok(QueryOutcome::Executed {
                    query,
                    bindings: results.len(),
                })
            }
        }
    }

    fn apply(&mut self, step: Step, bindings: &[Binding]) -> usize {
        match step {
            Step::Genes { include_proteins } => {
                let associations = AssociationProcessor::genes(bindings, include_proteins);
                let n = associations.len();
                for association in associations {
                    self.network.add_gene_association(association);
                }
                n
            }
            Step::Organs => {
                let associations = AssociationProcessor::organs(bindings);
                let n = associations.len();
                for association in associations {
                    self.network.add_organ_association(association);
                }
                n
            }
            Step::Components { .. } => {
                let associations = AssociationProcessor::components(bindings);
                let n = associations.len();
                for association in associations {
                    self.network.add_component_association(association);
                }
                n
            }
            Step::Compounds => {
                let associations = AssociationProcessor::compounds(bindings);
                let n = associations.len();
                for association in associations {
                    self.network.add_compound_association(association);
                }
                n
            }
            Step::GeneExpression { .. } => {
                let associations = AssociationProcessor::gene_expressions(bindings);
                let n = associations.len();
                for association in associations {
                    self.network.add_gene_expression_association(association);
                }
                n
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    const MIE: &str = "https://identifiers.org/aop.events/1";
    const KE: &str = "https://identifiers.org/aop.events/2";
    const AO: &str = "https://identifiers.org/aop.events/3";

    /// Answers queries by substring match and remembers what it was asked.
    struct FakeEndpoint {
        name: &'static str,
        responses: Vec<(&'static str, Vec<Binding>)>,
        fail_on: Option<&'static str>,
        seen: Mutex<Vec<String>>,
    }

    impl FakeEndpoint {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                responses: Vec::new(),
                fail_on: None,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn respond(mut self, needle: &'static str, rows: Vec<Binding>) -> Self {
            self.responses.push((needle, rows));
            self
        }

        fn fail_on(mut self, needle: &'static str) -> Self {
            self.fail_on = Some(needle);
            self
        }

        fn queries(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl SparqlEndpoint for FakeEndpoint {
        fn name(&self) -> &str {
            self.name
        }

        fn endpoint(&self) -> &str {
            "memory://sparql"
        }

        async fn select(&self, query: &str) -> std::result::Result<SparqlResults, QueryError> {
            self.seen.lock().unwrap().push(query.to_string());
            if let Some(needle) = self.fail_on {
                if query.contains(needle) {
                    return Err(QueryError::Http {
                        status: 503,
                        body: "unavailable".to_string(),
                    });
                }
            }
            let rows = self
                .responses
                .iter()
                .find(|(needle, _)| query.contains(needle))
                .map(|(_, rows)| rows.clone())
                .unwrap_or_default();
            Ok(SparqlResults::from_bindings(rows))
        }
    }

    fn row(pairs: &[(&str, &str)]) -> Binding {
        pairs.iter().copied().collect()
    }

    fn pathway_rows() -> Vec<Binding> {
        let base = [
            ("aop", "https://identifiers.org/aop/3"),
            ("aop_title", "Test pathway"),
            ("MIE", MIE),
            ("MIEtitle", "Receptor binding"),
            ("ao", AO),
            ("ao_title", "Liver failure"),
        ];
        let ker = |up: &'static str, down: &'static str, id: &'static str| {
            let mut pairs = base.to_vec();
            pairs.extend([
                ("KE_upstream", up),
                ("KE_upstream_title", "up"),
                ("KE_downstream", down),
                ("KE_downstream_title", "Cell death"),
                ("KER", id),
            ]);
            row(&pairs)
        };
        vec![
            ker(MIE, KE, "https://identifiers.org/aop.relationships/10"),
            ker(KE, AO, "https://identifiers.org/aop.relationships/11"),
        ]
    }

    fn aopwiki_fake() -> FakeEndpoint {
        FakeEndpoint::new("AOP-Wiki")
            .respond("?aop_title", pathway_rows())
            .respond(
                "?gene ?protein",
                vec![row(&[("ke", KE), ("gene", "TP53"), ("protein", "P04637")])],
            )
            .respond(
                "?organ_name",
                vec![row(&[
                    ("ke", AO),
                    ("organ", "http://purl.obolibrary.org/obo/UBERON_0002107"),
                    ("organ_name", "liver"),
                ])],
            )
    }

    fn bgee_fake() -> FakeEndpoint {
        FakeEndpoint::new("Bgee").respond(
            "?gene_id",
            vec![row(&[
                ("gene_id", "TP53"),
                ("anatomical_entity_id", "http://purl.obolibrary.org/obo/UBERON_0002107"),
                ("anatomical_entity_name", "liver"),
                ("expression_level", "91.2"),
                ("confidence_level_name", "high confidence"),
                ("expr", "http://bgee.org/expr/1"),
            ])],
        )
    }

    #[tokio::test]
    async fn test_query_by_identifier_builds_backbone() {
        let mut builder = AopNetworkBuilder::new(aopwiki_fake(), bgee_fake());
        let outcome = builder.query_by_identifier(QueryType::Mie, MIE).await.unwrap();

        assert!(outcome.is_executed());
        assert!(outcome.query().unwrap().contains("VALUES ?MIE"));

        let summary = builder.network().summary();
        assert_eq!(summary.total_key_events, 3);
        assert_eq!(summary.ker_count, 2);
        assert_eq!(summary.total_aops, 1);
    }

    #[tokio::test]
    async fn test_empty_network_skips_enrichment() {
        let mut builder = AopNetworkBuilder::new(aopwiki_fake(), bgee_fake());

        let outcome = builder.query_genes(true).await.unwrap();
        assert!(matches!(outcome, QueryOutcome::Skipped(_)));
        assert!(builder.query_compounds().await.unwrap().query().is_none());
        assert!(!builder.query_gene_expression(Some(50)).await.unwrap().is_executed());
        assert!(builder.aopwiki.queries().is_empty());
        assert!(builder.bgee.queries().is_empty());
    }

    #[tokio::test]
    async fn test_blank_identifiers_are_skipped() {
        let mut builder = AopNetworkBuilder::new(aopwiki_fake(), bgee_fake());
        let outcome = builder.query_by_identifier(QueryType::Aop, "  ").await.unwrap();
        assert!(!outcome.is_executed());
    }

    #[tokio::test]
    async fn test_enrich_runs_requested_steps() {
        let mut builder = AopNetworkBuilder::new(aopwiki_fake(), bgee_fake());
        builder.query_by_identifier(QueryType::Mie, MIE).await.unwrap();

        let options = EnrichOptions {
            genes: true,
            include_proteins: true,
            organs: true,
            compounds: true,
            gene_expression: true,
            confidence: Some(80),
            ..Default::default()
        };
        let report = builder.enrich(&options).await;

        assert!(report.is_success());
        assert_eq!(report.outcomes.len(), 4);
        let network = builder.network();
        assert_eq!(network.gene_associations.len(), 1);
        assert_eq!(network.organ_associations.len(), 1);
        assert_eq!(network.gene_expression_associations.len(), 1);
        assert!(network.compound_associations.is_empty());

        let compound_query = builder
            .aopwiki
            .queries()
            .into_iter()
            .find(|q| q.contains("?compound_name"))
            .unwrap();
        assert!(compound_query.contains("<https://identifiers.org/aop/3>"));

        let bgee_queries = builder.bgee.queries();
        assert_eq!(bgee_queries.len(), 1);
        assert!(bgee_queries[0].contains(r#"VALUES ?anatomical_entity_name { "liver" }"#));
    }

    #[tokio::test]
    async fn test_enrich_failure_is_not_fatal() {
        let aopwiki = aopwiki_fake().fail_on("?organ_name");
        let mut builder = AopNetworkBuilder::new(aopwiki, bgee_fake());
        builder.query_by_identifier(QueryType::Mie, MIE).await.unwrap();

        let options = EnrichOptions {
            genes: true,
            organs: true,
            gene_expression: true,
            ..Default::default()
        };
        let report = builder.enrich(&options).await;

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, Step::Organs);
        assert_eq!(builder.network().gene_associations.len(), 1);
        // no organs, so expression is skipped rather than sent
        let (step, outcome) = report.outcomes.last().unwrap();
        assert!(matches!(step, Step::GeneExpression { .. }));
        assert!(!outcome.is_executed());
    }

    #[test]
    fn test_update_from_json() {
        let mut builder = AopNetworkBuilder::new(aopwiki_fake(), bgee_fake());
        builder
            .update_from_json(json!({
                "elements": [
                    {"data": {"id": MIE, "label": "Receptor binding", "type": "mie"}},
                    {"data": {"id": AO, "label": "Liver failure", "type": "ao"}},
                    {"data": {"id": "e1", "source": MIE, "target": AO, "type": "ker",
                              "ker_label": "10", "curie": "aop.relationships:10"}}
                ]
            }))
            .unwrap();
        assert_eq!(builder.network().key_events().len(), 2);
        assert_eq!(builder.network().relationships().len(), 1);

        builder.update_from_json(json!({"elements": []})).unwrap();
        assert_eq!(builder.network().key_events().len(), 2);
    }

    #[test]
    fn test_update_from_file_errors() {
        let mut builder = AopNetworkBuilder::new(aopwiki_fake(), bgee_fake());
        let err = builder
            .update_from_file(Path::new("/nonexistent/network.json"))
            .unwrap_err();
        assert!(matches!(err, AopError::Io { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"{ not json").unwrap();
        let err = builder.update_from_file(file.path()).unwrap_err();
        assert!(matches!(err, AopError::Serialization(_)));
    }

    #[test]
    fn test_enrich_options_steps() {
        let options = EnrichOptions {
            components: true,
            go_only: true,
            compounds: true,
            ..Default::default()
        };
        assert_eq!(
            options.aopwiki_steps(),
            vec![Step::Components { go_only: true }, Step::Compounds]
        );
        assert!(EnrichOptions::default().is_empty());
    }
}
