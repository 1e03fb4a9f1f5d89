//! Node, edge and data source vocabularies.
//!
//! The string forms are what ends up in Cytoscape `type` fields, so they
//! must stay stable across releases.

use serde::{Deserialize, Serialize};
use std::fmt;

/// URI prefix of AOP-Wiki key events.
pub const KE_URI_PREFIX: &str = "https://identifiers.org/aop.events/";

/// URI prefix of AOP-Wiki pathways.
pub const AOP_URI_PREFIX: &str = "https://identifiers.org/aop/";

/// URI prefix of AOP-Wiki key event relationships.
pub const KER_URI_PREFIX: &str = "https://identifiers.org/aop.relationships/";

/// Object type AOP-Wiki uses for organ contexts.
pub const ORGAN_CONTEXT_TYPE: &str = "http://aopkb.org/aop_ontology#OrganContext";

/// Extract the trailing identifier of a URI.
pub fn id_from_uri(uri: &str) -> &str {
    uri.rsplit('/').next().unwrap_or(uri)
}

/// Whether a URI points at an AOP-Wiki key event.
pub fn is_ke_uri(uri: &str) -> bool {
    uri.starts_with(KE_URI_PREFIX)
}

/// Kind of node in an AOP network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    /// Molecular initiating event
    Mie,
    /// Intermediate key event
    Ke,
    /// Adverse outcome
    Ao,
    Chemical,
    Protein,
    Gene,
    Organ,
    ComponentProcess,
    ComponentObject,
    Custom,
    Cell,
    Quality,
    CellularComponent,
}

impl NodeType {
    pub const ALL: [NodeType; 13] = [
        NodeType::Mie,
        NodeType::Ke,
        NodeType::Ao,
        NodeType::Chemical,
        NodeType::Protein,
        NodeType::Gene,
        NodeType::Organ,
        NodeType::ComponentProcess,
        NodeType::ComponentObject,
        NodeType::Custom,
        NodeType::Cell,
        NodeType::Quality,
        NodeType::CellularComponent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Mie => "mie",
            NodeType::Ke => "ke",
            NodeType::Ao => "ao",
            NodeType::Chemical => "chemical",
            NodeType::Protein => "protein",
            NodeType::Gene => "gene",
            NodeType::Organ => "organ",
            NodeType::ComponentProcess => "component_process",
            NodeType::ComponentObject => "component_object",
            NodeType::Custom => "custom",
            NodeType::Cell => "cell",
            NodeType::Quality => "quality",
            NodeType::CellularComponent => "cellular_component",
        }
    }

    /// Parse the Cytoscape string form.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    /// MIE, KE and AO nodes are the pathway backbone.
    pub fn is_key_event(&self) -> bool {
        matches!(self, NodeType::Mie | NodeType::Ke | NodeType::Ao)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of edge in an AOP network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeType {
    Ker,
    Interaction,
    PartOf,
    TranslatesTo,
    ExpressionIn,
    Custom,
    IsStressorOf,
    HasProcess,
    Involves,
    Na,
    HasObject,
    Increased,
    Decreased,
    Delayed,
    Occurrence,
    Abnormal,
    Premature,
    Disrupted,
    FunctionalChange,
    MorphologicalChange,
    Pathological,
    Arrested,
}

impl EdgeType {
    /// Organ context edges share the `involves` label with component objects.
    pub const ASSOCIATED_WITH: EdgeType = EdgeType::Involves;

    pub const ALL: [EdgeType; 22] = [
        EdgeType::Ker,
        EdgeType::Interaction,
        EdgeType::PartOf,
        EdgeType::TranslatesTo,
        EdgeType::ExpressionIn,
        EdgeType::Custom,
        EdgeType::IsStressorOf,
        EdgeType::HasProcess,
        EdgeType::Involves,
        EdgeType::Na,
        EdgeType::HasObject,
        EdgeType::Increased,
        EdgeType::Decreased,
        EdgeType::Delayed,
        EdgeType::Occurrence,
        EdgeType::Abnormal,
        EdgeType::Premature,
        EdgeType::Disrupted,
        EdgeType::FunctionalChange,
        EdgeType::MorphologicalChange,
        EdgeType::Pathological,
        EdgeType::Arrested,
    ];

    const COMPONENT_ACTIONS: [EdgeType; 11] = [
        EdgeType::Increased,
        EdgeType::Decreased,
        EdgeType::Delayed,
        EdgeType::Occurrence,
        EdgeType::Abnormal,
        EdgeType::Premature,
        EdgeType::Disrupted,
        EdgeType::FunctionalChange,
        EdgeType::MorphologicalChange,
        EdgeType::Pathological,
        EdgeType::Arrested,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::Ker => "ker",
            EdgeType::Interaction => "interaction",
            EdgeType::PartOf => "part_of",
            EdgeType::TranslatesTo => "translates_to",
            EdgeType::ExpressionIn => "expression_in",
            EdgeType::Custom => "custom",
            EdgeType::IsStressorOf => "is stressor of",
            EdgeType::HasProcess => "has process",
            EdgeType::Involves => "involves",
            EdgeType::Na => "na",
            EdgeType::HasObject => "has object",
            EdgeType::Increased => "increased process quality",
            EdgeType::Decreased => "decreased process quality",
            EdgeType::Delayed => "delayed",
            EdgeType::Occurrence => "occurrence",
            EdgeType::Abnormal => "abnormal",
            EdgeType::Premature => "premature",
            EdgeType::Disrupted => "disrupted",
            EdgeType::FunctionalChange => "functional change",
            EdgeType::MorphologicalChange => "morphological change",
            EdgeType::Pathological => "pathological",
            EdgeType::Arrested => "arrested",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    /// Labels of the component action edges (KE to process).
    pub fn component_actions() -> impl Iterator<Item = &'static str> {
        Self::COMPONENT_ACTIONS.iter().map(|t| t.as_str())
    }

    pub fn is_component_action(label: &str) -> bool {
        Self::component_actions().any(|a| a == label)
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Origin of network data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Aopwiki,
    Qsprpred,
    Bgee,
    Opentargets,
    CustomTable,
    Manual,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Aopwiki => write!(f, "aopwiki"),
            DataSource::Qsprpred => write!(f, "qsprpred"),
            DataSource::Bgee => write!(f, "bgee"),
            DataSource::Opentargets => write!(f, "opentargets"),
            DataSource::CustomTable => write!(f, "custom_table"),
            DataSource::Manual => write!(f, "manual"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_from_uri() {
        assert_eq!(id_from_uri("https://identifiers.org/aop.events/1497"), "1497");
        assert_eq!(id_from_uri("P04637"), "P04637");
        assert_eq!(id_from_uri("http://purl.obolibrary.org/obo/GO_0006915"), "GO_0006915");
    }

    #[test]
    fn test_node_type_round_trip_strings() {
        for t in NodeType::ALL {
            assert_eq!(NodeType::parse(t.as_str()), Some(t));
        }
        assert_eq!(NodeType::parse("component_process"), Some(NodeType::ComponentProcess));
        assert_eq!(NodeType::parse("bogus"), None);
        assert!(NodeType::Mie.is_key_event());
        assert!(!NodeType::Gene.is_key_event());
    }

    #[test]
    fn test_associated_with_is_involves() {
        assert_eq!(EdgeType::ASSOCIATED_WITH.as_str(), "involves");
        assert_eq!(EdgeType::parse("involves"), Some(EdgeType::Involves));
    }

    #[test]
    fn test_component_actions() {
        let actions: Vec<_> = EdgeType::component_actions().collect();
        assert_eq!(actions.len(), 11);
        assert!(EdgeType::is_component_action("increased process quality"));
        assert!(EdgeType::is_component_action("arrested"));
        assert!(!EdgeType::is_component_action("has process"));
    }

    #[test]
    fn test_node_type_serde() {
        let json = serde_json::to_string(&NodeType::CellularComponent).unwrap();
        assert_eq!(json, "\"cellular_component\"");
    }
}
