//! SPARQL 1.1 JSON results.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single RDF term in a result row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

/// One result row, keyed by variable name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Binding(pub HashMap<String, Term>);

impl Binding {
    /// The bound value of `key`, or `""` when the variable is unbound.
    pub fn value(&self, key: &str) -> &str {
        self.0.get(key).map(|t| t.value.as_str()).unwrap_or("")
    }

    pub fn is_bound(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Binding {
    /// Build a row of untyped literals. Handy for fakes and fixtures.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Binding(
            iter.into_iter()
                .map(|(k, v)| {
                    (
                        k.into(),
                        Term {
                            kind: "literal".to_string(),
                            value: v.into(),
                            datatype: None,
                            lang: None,
                        },
                    )
                })
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Head {
    #[serde(default)]
    pub vars: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSet {
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

/// Parsed SELECT response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparqlResults {
    #[serde(default)]
    pub head: Head,
    #[serde(default)]
    pub results: ResultSet,
}

impl SparqlResults {
    pub fn from_bindings(bindings: Vec<Binding>) -> Self {
        Self {
            head: Head::default(),
            results: ResultSet { bindings },
        }
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.results.bindings
    }

    pub fn into_bindings(self) -> Vec<Binding> {
        self.results.bindings
    }

    pub fn len(&self) -> usize {
        self.results.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_select_response() {
        let body = r#"{
            "head": {"vars": ["ke", "gene"]},
            "results": {"bindings": [
                {"ke": {"type": "uri", "value": "https://identifiers.org/aop.events/1497"},
                 "gene": {"type": "literal", "value": "TP53", "xml:lang": "en"}},
                {"ke": {"type": "uri", "value": "https://identifiers.org/aop.events/1498"}}
            ]}
        }"#;

        let results: SparqlResults = serde_json::from_str(body).unwrap();
        assert_eq!(results.head.vars, vec!["ke", "gene"]);
        assert_eq!(results.len(), 2);

        let first = &results.bindings()[0];
        assert_eq!(first.value("gene"), "TP53");
        assert_eq!(first.0["gene"].lang.as_deref(), Some("en"));
        assert_eq!(first.0["ke"].kind, "uri");

        let second = &results.bindings()[1];
        assert_eq!(second.value("gene"), "");
        assert!(!second.is_bound("gene"));
    }

    #[test]
    fn test_missing_sections_default() {
        let results: SparqlResults = serde_json::from_str("{}").unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_binding_from_pairs() {
        let binding: Binding = [("gene", "TP53"), ("protein", "P04637")].into_iter().collect();
        assert_eq!(binding.value("protein"), "P04637");
        assert_eq!(binding.0["gene"].kind, "literal");
    }
}
