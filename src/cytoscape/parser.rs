//! Parse Cytoscape JSON elements into typed nodes and edges.

use crate::cytoscape::elements::{CytoscapeEdge, CytoscapeNode, EdgeSet, Element, NodeSet};
use crate::model::types::{EdgeType, NodeType};
use tracing::info;

/// Parsed view over a list of Cytoscape elements.
///
/// Nodes are deduplicated within the parser; edges whose endpoint was merged
/// into another node are pointed at the surviving node.
#[derive(Debug, Clone, Default)]
pub struct CytoscapeNetworkParser {
    pub nodes: Vec<CytoscapeNode>,
    pub edges: Vec<CytoscapeEdge>,
}

impl CytoscapeNetworkParser {
    pub fn new(elements: &[Element]) -> Self {
        let mut nodes = NodeSet::new();
        for node in elements.iter().filter_map(CytoscapeNode::from_element) {
            nodes.insert(node);
        }

        let mut edges = EdgeSet::new();
        for mut edge in elements.iter().filter_map(CytoscapeEdge::from_element) {
            edge.source = nodes.resolve(&edge.source).to_string();
            edge.target = nodes.resolve(&edge.target).to_string();
            edges.insert(edge);
        }

        info!("Parsed {} nodes and {} edges", nodes.len(), edges.len());

        Self {
            nodes: nodes.into_vec(),
            edges: edges.into_vec(),
        }
    }

    pub fn nodes_by_type(&self, node_type: NodeType) -> Vec<&CytoscapeNode> {
        self.nodes
            .iter()
            .filter(|n| n.is_instance_of(node_type))
            .collect()
    }

    pub fn edges_by_type(&self, edge_type: EdgeType) -> Vec<&CytoscapeEdge> {
        self.edges
            .iter()
            .filter(|e| e.is_instance_of(edge_type))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn elements() -> Vec<Element> {
        serde_json::from_value(json!([
            {"data": {"id": "gene_TP53", "label": "TP53", "type": "gene"}},
            {"data": {"id": "protein_P04637", "label": "P04637", "type": "protein"}},
            {"data": {"id": "gene_tp53_dup", "label": "tp53", "type": "gene", "extra": 1}},
            {"data": {"id": "e1", "source": "gene_tp53_dup", "target": "protein_P04637", "label": "translates to"}},
            {"group": "edges", "data": {"id": "e1", "source": "x", "target": "y"}},
            {"data": {"id": "e2", "source": "protein_P04637", "target": "ke", "label": "part of"}}
        ]))
        .unwrap()
    }

    #[test]
    fn test_parser_dedupes_and_rewrites_edges() {
        let parser = CytoscapeNetworkParser::new(&elements());

        assert_eq!(parser.nodes.len(), 2);
        assert_eq!(parser.nodes[0].properties["extra"], json!(1));

        assert_eq!(parser.edges.len(), 2);
        assert_eq!(parser.edges[0].source, "gene_TP53");
    }

    #[test]
    fn test_parser_filters_by_type() {
        let parser = CytoscapeNetworkParser::new(&elements());
        assert_eq!(parser.nodes_by_type(NodeType::Gene).len(), 1);
        assert_eq!(parser.nodes_by_type(NodeType::Protein).len(), 1);
        assert_eq!(parser.nodes_by_type(NodeType::Organ).len(), 0);
        assert_eq!(parser.edges_by_type(EdgeType::Custom).len(), 0);
    }

    #[test]
    fn test_parser_empty() {
        let parser = CytoscapeNetworkParser::new(&[]);
        assert!(parser.nodes.is_empty());
        assert!(parser.edges.is_empty());
    }
}
