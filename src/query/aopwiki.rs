//! SPARQL builders for the AOP-Wiki RDF endpoint.
//!
//! The endpoint predeclares the `aopo`, `dc`, `edam`, `skos`, `nci` and
//! `cheminf` prefixes, so none of these queries carry a PREFIX block.

use crate::error::QueryError;
use crate::query::format_uris;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

pub const SERVICE_NAME: &str = "AOP-Wiki";
pub const DEFAULT_ENDPOINT: &str = "https://aopwiki.rdf.bigcat-bioinformatics.org/sparql/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const VALUES_PLACEHOLDER: &str = "%VALUES_CLAUSE%";

const NETWORK_TEMPLATE: &str = r#"SELECT DISTINCT ?aop ?aop_title ?MIEtitle ?MIE ?KE_downstream ?KE_downstream_title ?KER ?ao ?ao_title ?KE_upstream ?KE_upstream_title
WHERE {
  %VALUES_CLAUSE%
  ?aop a aopo:AdverseOutcomePathway ;
       dc:title ?aop_title ;
       aopo:has_adverse_outcome ?ao ;
       aopo:has_molecular_initiating_event ?MIE .
  ?ao dc:title ?ao_title .
  ?MIE dc:title ?MIEtitle .
  OPTIONAL {
    ?aop aopo:has_key_event_relationship ?KER .
    ?KER a aopo:KeyEventRelationship ;
         aopo:has_upstream_key_event ?KE_upstream ;
         aopo:has_downstream_key_event ?KE_downstream .
    ?KE_upstream dc:title ?KE_upstream_title .
    ?KE_downstream dc:title ?KE_downstream_title .
  }
}"#;

/// Anchors on every AOP sharing a KER with the given key events, then pulls
/// in all KERs of those AOPs. `%ANCHOR%` is the upstream or downstream
/// predicate.
const KE_ANCHORED_TEMPLATE: &str = r#"SELECT DISTINCT ?aop ?aop_title ?MIEtitle ?MIE ?KE_downstream ?KE_downstream_title ?KER ?ao ?ao_title ?KE_upstream ?KE_upstream_title
WHERE {
  %VALUES_CLAUSE%
  ?KERx a aopo:KeyEventRelationship ;
        %ANCHOR% .
  ?aop aopo:has_key_event_relationship ?KERx .
  ?aop aopo:has_key_event_relationship ?KER .
  ?KER aopo:has_downstream_key_event ?KE_downstream ;
        aopo:has_upstream_key_event ?KE_upstream .
  ?KE_upstream dc:title ?KE_upstream_title .
  ?KE_downstream dc:title ?KE_downstream_title .
  ?aop a aopo:AdverseOutcomePathway ;
       dc:title ?aop_title ;
       aopo:has_adverse_outcome ?ao ;
       aopo:has_molecular_initiating_event ?MIE .
  ?ao dc:title ?ao_title .
  ?MIE dc:title ?MIEtitle .
}"#;

/// How the identifiers passed to [`aop_network_query`] are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryType {
    /// Molecular initiating event URIs
    Mie,
    /// AOP URIs
    Aop,
    /// Key events appearing upstream in some KER
    KeUpstream,
    /// Key events appearing downstream in some KER
    KeDownstream,
}

impl QueryType {
    pub const ALL: [QueryType; 4] = [
        QueryType::Mie,
        QueryType::Aop,
        QueryType::KeUpstream,
        QueryType::KeDownstream,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Mie => "mie",
            QueryType::Aop => "aop",
            QueryType::KeUpstream => "ke_upstream",
            QueryType::KeDownstream => "ke_downstream",
        }
    }

    fn values_variable(&self) -> &'static str {
        match self {
            QueryType::Mie => "?MIE",
            QueryType::Aop => "?aop",
            QueryType::KeUpstream => "?KE_upstream_x",
            QueryType::KeDownstream => "?KE_downstream_x",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryType {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QueryType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| QueryError::InvalidQueryType(s.to_string()))
    }
}

/// Build the pathway query for whitespace-separated `values`.
pub fn aop_network_query(query_type: QueryType, values: &str) -> String {
    info!("Building AOP SPARQL query: {}, values: {}", query_type, values);

    let uris: Vec<&str> = values.split_whitespace().collect();
    let values_clause = format!(
        "VALUES {} {{ {} }}",
        query_type.values_variable(),
        format_uris(&uris)
    );

    let query = match query_type {
        QueryType::Mie | QueryType::Aop => NETWORK_TEMPLATE.replace(VALUES_PLACEHOLDER, &values_clause),
        QueryType::KeUpstream => KE_ANCHORED_TEMPLATE
            .replace(VALUES_PLACEHOLDER, &values_clause)
            .replace("%ANCHOR%", "aopo:has_upstream_key_event ?KE_upstream_x"),
        QueryType::KeDownstream => KE_ANCHORED_TEMPLATE
            .replace(VALUES_PLACEHOLDER, &values_clause)
            .replace("%ANCHOR%", "aopo:has_downstream_key_event ?KE_downstream_x"),
    };

    debug!("Generated SPARQL query length: {}", query.len());
    query
}

/// Genes (and optionally proteins) linked to key events via their objects.
pub fn gene_query<S: AsRef<str>>(ke_uris: &[S], include_proteins: bool) -> String {
    let values = format_uris(ke_uris);
    if include_proteins {
        format!(
            r#"SELECT DISTINCT ?ke ?gene ?protein WHERE {{
    VALUES ?ke {{ {values} }}
    ?ke a aopo:KeyEvent; edam:data_1025 ?object .
    ?object skos:exactMatch ?id .
    ?id a edam:data_1033; edam:data_1033 ?gene .
    OPTIONAL {{
        ?object skos:exactMatch ?prot .
        ?prot a edam:data_2291 ;
              edam:data_2291 ?protein .
    }}
}}"#
        )
    } else {
        format!(
            r#"SELECT DISTINCT ?ke ?gene WHERE {{
    VALUES ?ke {{ {values} }}
    ?ke a aopo:KeyEvent; edam:data_1025 ?object .
    ?object skos:exactMatch ?id .
    ?id a edam:data_1033; edam:data_1033 ?gene .
}}"#
        )
    }
}

/// Chemical stressors of the given AOPs that have a PubChem mapping.
pub fn compound_query<S: AsRef<str>>(aop_uris: &[S]) -> String {
    let values = format_uris(aop_uris);
    format!(
        r#"SELECT DISTINCT ?aop ?compound_name ?cid ?pubchem_compound ?mie ?chemical
WHERE {{
    VALUES ?aop {{ {values} }}
    FILTER(STRSTARTS(STR(?pubchem_compound), "https://identifiers.org/pubchem.compound/"))

    ?aop a aopo:AdverseOutcomePathway ; nci:C54571 ?stressor ; aopo:has_molecular_initiating_event ?mie .
    ?chemical skos:exactMatch ?pubchem_compound ; dc:title ?compound_name.
    ?stressor a nci:C54571 ; aopo:has_chemical_entity ?chemical .
    ?pubchem_compound cheminf:000140 ?cid .
}}
ORDER BY ?compound_name"#
    )
}

/// Organ contexts of the given key events.
pub fn organ_query<S: AsRef<str>>(ke_uris: &[S]) -> String {
    let values = format_uris(ke_uris);
    format!(
        r#"SELECT DISTINCT ?ke ?organ ?organ_name WHERE {{
    VALUES ?ke {{ {values} }}
    ?ke a aopo:KeyEvent; aopo:OrganContext ?organ .
    ?organ dc:title ?organ_name .
}}"#
    )
}

/// Biological event components (process, object, action) of key events.
/// With `go_only` only Gene Ontology processes are returned.
pub fn component_query<S: AsRef<str>>(go_only: bool, ke_uris: &[S]) -> String {
    let go_filter = if go_only {
        r#"FILTER(STRSTARTS(STR(?process), "http://purl.obolibrary.org/obo/GO_"))"#
    } else {
        ""
    };
    let values = format_uris(ke_uris);
    format!(
        r#"SELECT DISTINCT ?ke ?keTitle ?bioEvent ?process ?processName ?object ?objectName ?action ?objectType
WHERE {{
    {go_filter}
    VALUES ?ke {{ {values} }}
    ?ke a aopo:KeyEvent ;
        dc:title ?keTitle .
    OPTIONAL {{ ?ke aopo:hasBiologicalEvent ?bioEvent. ?bioEvent aopo:hasProcess ?process . ?process dc:title ?processName.}}
    OPTIONAL {{ ?ke aopo:hasBiologicalEvent ?bioEvent. ?bioEvent aopo:hasObject ?object . ?object dc:title ?objectName ; a ?objectType . }}
    OPTIONAL {{ ?ke aopo:hasBiologicalEvent ?bioEvent. ?bioEvent aopo:hasAction ?action . }}
}}
ORDER BY ?ke"#
    )
}
