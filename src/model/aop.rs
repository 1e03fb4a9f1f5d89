//! Pathway backbone: AOPs, key events and key event relationships.

use crate::cytoscape::elements::{data_from, data_str_list, Data, Element};
use crate::error::ModelError;
use crate::model::types::{id_from_uri, EdgeType, NodeType};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

/// AOP metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AopInfo {
    pub aop_id: String,
    pub title: String,
    pub uri: String,
}

impl AopInfo {
    pub fn new(
        aop_id: impl Into<String>,
        title: impl Into<String>,
        uri: impl Into<String>,
    ) -> Result<Self, ModelError> {
        let info = Self {
            aop_id: aop_id.into(),
            title: title.into(),
            uri: uri.into(),
        };
        if info.aop_id.is_empty() || info.uri.is_empty() {
            return Err(ModelError::MissingAopIdentity);
        }
        Ok(info)
    }

    /// Build an `AopInfo` from a pathway URI, deriving the id from its last segment.
    pub fn from_uri(uri: &str, title: &str) -> Result<Self, ModelError> {
        Self::new(id_from_uri(uri), title, uri)
    }

    /// Collect the unique AOPs referenced by node elements.
    pub fn from_elements(elements: &[Element]) -> Vec<AopInfo> {
        let mut seen = HashSet::new();
        let mut infos = Vec::new();

        for element in elements.iter().filter(|e| e.is_node()) {
            for info in aop_pairs(&element.data) {
                if seen.insert(info.aop_id.clone()) {
                    infos.push(info);
                }
            }
        }

        infos
    }
}

impl fmt::Display for AopInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AOP(id:{}, title:'{}', URI:{})",
            self.aop_id, self.title, self.uri
        )
    }
}

/// Zip a node's parallel `aop_uris` / `aop_titles` lists into `AopInfo`s.
pub(crate) fn aop_pairs(data: &Data) -> Vec<AopInfo> {
    let uris = data_str_list(data, "aop_uris");
    let titles = data_str_list(data, "aop_titles");

    uris.iter()
        .zip(titles.iter())
        .filter(|(uri, title)| !uri.is_empty() && !title.is_empty())
        .filter_map(|(uri, title)| AopInfo::from_uri(uri, title).ok())
        .collect()
}

/// A key event of one or more AOPs.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEvent {
    pub ke_id: String,
    pub uri: String,
    pub title: String,
    pub ke_type: NodeType,
    pub associated_aops: Vec<AopInfo>,
}

impl KeyEvent {
    pub fn new(
        ke_id: impl Into<String>,
        uri: impl Into<String>,
        title: impl Into<String>,
        ke_type: NodeType,
    ) -> Result<Self, ModelError> {
        let ke_id = ke_id.into();
        let uri = uri.into();
        if ke_id.is_empty() || uri.is_empty() {
            return Err(ModelError::MissingKeyEventIdentity);
        }

        let mut title = title.into();
        if title.is_empty() {
            title = ke_id.clone();
        }

        Ok(Self {
            ke_id,
            uri,
            title,
            ke_type,
            associated_aops: Vec::new(),
        })
    }

    /// Returns true when the AOP was not yet associated.
    pub fn add_aop(&mut self, aop: AopInfo) -> bool {
        if self.associated_aops.contains(&aop) {
            return false;
        }
        self.associated_aops.push(aop);
        true
    }

    pub fn aop_ids(&self) -> Vec<&str> {
        self.associated_aops
            .iter()
            .map(|a| a.aop_id.as_str())
            .collect()
    }

    pub fn to_cytoscape_data(&self) -> Data {
        let uris: Vec<Value> = self
            .associated_aops
            .iter()
            .map(|a| Value::from(a.uri.as_str()))
            .collect();
        let titles: Vec<Value> = self
            .associated_aops
            .iter()
            .map(|a| Value::from(a.title.as_str()))
            .collect();

        data_from([
            ("id", Value::from(self.uri.as_str())),
            ("label", Value::from(self.title.as_str())),
            ("type", Value::from(self.ke_type.as_str())),
            ("is_mie", Value::from(self.ke_type == NodeType::Mie)),
            ("is_ao", Value::from(self.ke_type == NodeType::Ao)),
            ("aop_uris", Value::Array(uris)),
            ("aop_titles", Value::Array(titles)),
        ])
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ke_type, self.ke_id)
    }
}

/// A directed relationship between two key events.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEventRelationship {
    pub ker_id: String,
    pub ker_uri: String,
    pub upstream: KeyEvent,
    pub downstream: KeyEvent,
}

impl KeyEventRelationship {
    pub fn new(
        ker_id: impl Into<String>,
        ker_uri: impl Into<String>,
        upstream: KeyEvent,
        downstream: KeyEvent,
    ) -> Result<Self, ModelError> {
        let ker_id = ker_id.into();
        let ker_uri = ker_uri.into();
        if ker_id.is_empty() || ker_uri.is_empty() {
            return Err(ModelError::MissingRelationshipIdentity);
        }
        if upstream.uri == downstream.uri {
            return Err(ModelError::SelfRelationship(upstream.uri));
        }

        Ok(Self {
            ker_id,
            ker_uri,
            upstream,
            downstream,
        })
    }

    pub fn edge_id(&self) -> String {
        format!("{}_{}", self.upstream.uri, self.downstream.uri)
    }

    pub fn to_cytoscape_data(&self) -> Data {
        data_from([
            ("id", Value::from(self.edge_id())),
            ("source", Value::from(self.upstream.uri.as_str())),
            ("target", Value::from(self.downstream.uri.as_str())),
            (
                "curie",
                Value::from(format!("aop.relationships:{}", self.ker_id)),
            ),
            ("ker_label", Value::from(self.ker_id.as_str())),
            ("type", Value::from(EdgeType::Ker.as_str())),
        ])
    }
}

impl fmt::Display for KeyEventRelationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KER:{}", self.ker_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::KE_URI_PREFIX;
    use serde_json::json;

    fn ke(id: &str, ke_type: NodeType) -> KeyEvent {
        KeyEvent::new(id, format!("{}{}", KE_URI_PREFIX, id), "", ke_type).unwrap()
    }

    #[test]
    fn test_aop_info_requires_identity() {
        assert_eq!(
            AopInfo::new("", "t", "u").unwrap_err(),
            ModelError::MissingAopIdentity
        );
        let info = AopInfo::from_uri("https://identifiers.org/aop/17", "Liver fibrosis").unwrap();
        assert_eq!(info.aop_id, "17");
        assert_eq!(
            info.to_string(),
            "AOP(id:17, title:'Liver fibrosis', URI:https://identifiers.org/aop/17)"
        );
    }

    #[test]
    fn test_aop_info_from_elements() {
        let elements: Vec<Element> = serde_json::from_value(json!([
            {"data": {"id": "a", "aop_uris": ["https://identifiers.org/aop/1", "https://identifiers.org/aop/2"],
                      "aop_titles": ["One", ""]}},
            {"data": {"id": "b", "aop_uris": "https://identifiers.org/aop/1", "aop_titles": "One again"}},
            {"group": "edges", "data": {"source": "a", "target": "b",
                      "aop_uris": ["https://identifiers.org/aop/3"], "aop_titles": ["Edge"]}}
        ]))
        .unwrap();

        let infos = AopInfo::from_elements(&elements);
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].title, "One");
    }

    #[test]
    fn test_key_event_title_fallback_and_aops() {
        let mut event = ke("1497", NodeType::Mie);
        assert_eq!(event.title, "1497");
        assert_eq!(event.to_string(), "mie:1497");

        let aop = AopInfo::from_uri("https://identifiers.org/aop/5", "Five").unwrap();
        assert!(event.add_aop(aop.clone()));
        assert!(!event.add_aop(aop));
        assert_eq!(event.aop_ids(), vec!["5"]);

        let data = event.to_cytoscape_data();
        assert_eq!(data["is_mie"], json!(true));
        assert_eq!(data["is_ao"], json!(false));
        assert_eq!(data["aop_titles"], json!(["Five"]));
    }

    #[test]
    fn test_key_event_requires_identity() {
        assert_eq!(
            KeyEvent::new("", "uri", "t", NodeType::Ke).unwrap_err(),
            ModelError::MissingKeyEventIdentity
        );
    }

    #[test]
    fn test_relationship_rejects_self_loop() {
        let a = ke("1", NodeType::Ke);
        let err = KeyEventRelationship::new("9", "uri/9", a.clone(), a).unwrap_err();
        assert!(matches!(err, ModelError::SelfRelationship(_)));
    }

    #[test]
    fn test_relationship_edge_data() {
        let ker = KeyEventRelationship::new(
            "2033",
            "https://identifiers.org/aop.relationships/2033",
            ke("1", NodeType::Mie),
            ke("2", NodeType::Ao),
        )
        .unwrap();

        let data = ker.to_cytoscape_data();
        assert_eq!(
            data["id"],
            json!("https://identifiers.org/aop.events/1_https://identifiers.org/aop.events/2")
        );
        assert_eq!(data["curie"], json!("aop.relationships:2033"));
        assert_eq!(data["type"], json!("ker"));
        assert_eq!(ker.to_string(), "KER:2033");
    }
}
