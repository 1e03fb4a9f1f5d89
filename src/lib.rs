//! aopnet - Adverse Outcome Pathway networks from SPARQL data
//!
//! Builds AOP networks (MIEs, key events, adverse outcomes and the
//! relationships between them) from the AOP-Wiki SPARQL endpoint, enriches
//! them with genes, organs, components, compounds and Bgee expression data,
//! and exports them as Cytoscape JSON, CX2, tables or Markdown.

pub mod builder;
pub mod cytoscape;
pub mod error;
pub mod export;
pub mod model;
pub mod query;

pub use builder::{AopNetworkBuilder, EnrichOptions, EnrichReport, QueryOutcome};
pub use error::{AopError, ModelError, QueryError, Result};
pub use model::{AopNetwork, NetworkSummary};
pub use query::{HttpSparqlClient, QueryType, SparqlEndpoint};
