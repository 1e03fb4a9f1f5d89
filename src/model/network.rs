//! The AOP network container.
//!
//! Key events and relationships form the pathway backbone. Associations add
//! evidence around it; their nodes and edges are merged into a single
//! deduplicated node list and edge list that the exporters work from.

use crate::cytoscape::elements::{
    CytoscapeDocument, CytoscapeEdge, CytoscapeNode, EdgeSet, Element, NodeSet, Position,
};
use crate::cytoscape::parser::CytoscapeNetworkParser;
use crate::cytoscape::styles::StyleManager;
use crate::model::aop::{aop_pairs, AopInfo, KeyEvent, KeyEventRelationship};
use crate::model::associations::{
    Association, ComponentAssociation, CompoundAssociation, GeneAssociation,
    GeneExpressionAssociation, OrganAssociation,
};
use crate::model::types::{
    id_from_uri, is_ke_uri, EdgeType, NodeType, KER_URI_PREFIX,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, info, warn};

/// Network totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NetworkSummary {
    pub total_key_events: usize,
    pub mie_count: usize,
    pub ao_count: usize,
    pub ke_count: usize,
    pub ker_count: usize,
    pub gene_associations: usize,
    pub gene_expression_associations: usize,
    pub compound_associations: usize,
    pub component_associations: usize,
    pub organ_associations: usize,
    pub total_aops: usize,
}

/// A complete AOP network.
#[derive(Debug, Clone, Default)]
pub struct AopNetwork {
    key_events: Vec<KeyEvent>,
    ke_index: HashMap<String, usize>,
    relationships: Vec<KeyEventRelationship>,
    pub gene_associations: Vec<GeneAssociation>,
    pub component_associations: Vec<ComponentAssociation>,
    pub compound_associations: Vec<CompoundAssociation>,
    pub organ_associations: Vec<OrganAssociation>,
    pub gene_expression_associations: Vec<GeneExpressionAssociation>,
    aop_info: Vec<AopInfo>,
    nodes: NodeSet,
    edges: EdgeSet,
    positions: HashMap<String, Position>,
    style_manager: StyleManager,
}

impl AopNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_events(&self) -> &[KeyEvent] {
        &self.key_events
    }

    pub fn key_event(&self, uri: &str) -> Option<&KeyEvent> {
        self.ke_index.get(uri).map(|&i| &self.key_events[i])
    }

    pub fn relationships(&self) -> &[KeyEventRelationship] {
        &self.relationships
    }

    pub fn aop_info(&self) -> &[AopInfo] {
        &self.aop_info
    }

    pub fn nodes(&self) -> impl Iterator<Item = &CytoscapeNode> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = &CytoscapeEdge> {
        self.edges.iter()
    }

    pub fn position(&self, node_id: &str) -> Option<Position> {
        self.positions.get(node_id).copied()
    }

    pub fn style_manager(&self) -> &StyleManager {
        &self.style_manager
    }

    fn register_aop(&mut self, aop: &AopInfo) {
        if !self.aop_info.iter().any(|a| a.aop_id == aop.aop_id) {
            self.aop_info.push(aop.clone());
        }
    }

    /// Add or replace a key event, registering its AOPs.
    pub fn add_key_event(&mut self, key_event: KeyEvent) {
        for aop in &key_event.associated_aops {
            self.register_aop(aop);
        }

        match self.ke_index.get(&key_event.uri) {
            Some(&idx) => self.key_events[idx] = key_event,
            None => {
                self.ke_index
                    .insert(key_event.uri.clone(), self.key_events.len());
                self.key_events.push(key_event);
            }
        }
    }

    /// Merge a key event into an existing one by adding its AOPs.
    fn merge_key_event(&mut self, key_event: &KeyEvent) {
        match self.ke_index.get(&key_event.uri) {
            Some(&idx) => {
                for aop in &key_event.associated_aops {
                    self.key_events[idx].add_aop(aop.clone());
                }
                for aop in &key_event.associated_aops {
                    self.register_aop(aop);
                }
            }
            None => self.add_key_event(key_event.clone()),
        }
    }

    /// Add a relationship and both of its key events. Repeated relationships
    /// (same endpoints) are ignored.
    pub fn add_relationship(&mut self, relationship: KeyEventRelationship) {
        self.merge_key_event(&relationship.upstream);
        self.merge_key_event(&relationship.downstream);

        let edge_id = relationship.edge_id();
        if self.relationships.iter().any(|r| r.edge_id() == edge_id) {
            return;
        }
        self.relationships.push(relationship);
    }

    fn merge_association<A: Association>(&mut self, association: &A) {
        for node in association.nodes() {
            self.nodes.insert(node);
        }
        for mut edge in association.edges() {
            edge.source = self.nodes.resolve(&edge.source).to_string();
            edge.target = self.nodes.resolve(&edge.target).to_string();
            self.edges.insert(edge);
        }
    }

    pub fn add_gene_association(&mut self, association: GeneAssociation) {
        self.merge_association(&association);
        self.gene_associations.push(association);
    }

    pub fn add_component_association(&mut self, association: ComponentAssociation) {
        self.merge_association(&association);
        self.component_associations.push(association);
    }

    pub fn add_compound_association(&mut self, association: CompoundAssociation) {
        self.merge_association(&association);
        self.compound_associations.push(association);
    }

    pub fn add_organ_association(&mut self, association: OrganAssociation) {
        self.merge_association(&association);
        self.organ_associations.push(association);
    }

    pub fn add_gene_expression_association(&mut self, association: GeneExpressionAssociation) {
        self.merge_association(&association);
        self.gene_expression_associations.push(association);
    }

    pub fn ke_uris(&self) -> Vec<String> {
        self.key_events.iter().map(|ke| ke.uri.clone()).collect()
    }

    pub fn aop_ids(&self) -> Vec<String> {
        self.aop_info.iter().map(|a| a.aop_id.clone()).collect()
    }

    /// Gene identifiers from gene nodes, then from gene associations.
    pub fn gene_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        let mut push = |id: &str| {
            if !id.is_empty() && !ids.iter().any(|g| g == id) {
                ids.push(id.to_string());
            }
        };

        for node in self.nodes.iter().filter(|n| n.is_instance_of(NodeType::Gene)) {
            let gene_id = match node.property("gene_id") {
                "" => node.id.strip_prefix("gene_").unwrap_or(node.label.as_str()),
                id => id,
            };
            push(gene_id);
        }
        for assoc in &self.gene_associations {
            push(&assoc.gene_id);
        }

        ids
    }

    /// Organ names from organ nodes, then from organ associations.
    pub fn organ_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let mut push = |name: &str| {
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        };

        for node in self.nodes.iter().filter(|n| n.is_instance_of(NodeType::Organ)) {
            match node.property("anatomical_name") {
                "" => push(&node.label),
                name => push(name),
            }
        }
        for assoc in &self.organ_associations {
            if assoc.organ.is_instance_of(NodeType::Organ) {
                push(assoc.organ_name());
            }
        }

        names
    }

    pub fn genes_for_ke(&self, ke_uri: &str) -> Vec<&GeneAssociation> {
        self.gene_associations
            .iter()
            .filter(|a| a.ke_uri == ke_uri)
            .collect()
    }

    pub fn compounds_for_aop(&self, aop_uri: &str) -> Vec<&CompoundAssociation> {
        self.compound_associations
            .iter()
            .filter(|a| a.aop_uri == aop_uri)
            .collect()
    }

    /// Render the network as a Cytoscape document.
    ///
    /// Key event nodes and KER edges come first, followed by the merged
    /// association nodes and edges.
    pub fn to_cytoscape(&self, include_styles: bool) -> CytoscapeDocument {
        let mut elements: Vec<Element> = Vec::new();

        for ke in &self.key_events {
            let mut element = Element::node(ke.to_cytoscape_data(), "");
            element.position = self.position(&ke.uri);
            elements.push(element);
        }

        let mut ker_pairs = HashSet::new();
        for rel in &self.relationships {
            ker_pairs.insert((rel.upstream.uri.as_str(), rel.downstream.uri.as_str()));
            elements.push(Element::edge(rel.to_cytoscape_data()));
        }

        for node in self.nodes.iter() {
            if self.ke_index.contains_key(&node.id) {
                continue;
            }
            let mut element = node.to_element();
            element.position = self.position(&node.id);
            elements.push(element);
        }

        for edge in self.edges.iter() {
            let is_ker = edge.is_instance_of(EdgeType::Ker)
                && ker_pairs.contains(&(edge.source.as_str(), edge.target.as_str()));
            if !is_ker {
                elements.push(edge.to_element());
            }
        }

        info!("Generated {} Cytoscape elements", elements.len());

        CytoscapeDocument {
            elements,
            style: include_styles.then(|| self.style_manager.styles().to_vec()),
            layout: include_styles.then(|| self.style_manager.layout()),
        }
    }

    /// Replace the network contents with the elements of a Cytoscape document.
    pub fn from_cytoscape_elements(&mut self, elements: &[Element]) {
        let style_manager = std::mem::take(&mut self.style_manager);
        *self = Self {
            style_manager,
            ..Self::default()
        };

        let parser = CytoscapeNetworkParser::new(elements);
        for node in parser.nodes {
            self.nodes.insert(node);
        }
        for edge in parser.edges {
            self.edges.insert(edge);
        }

        for element in elements.iter().filter(|e| e.is_node()) {
            if let Some(position) = element.position {
                self.positions.insert(element.id().to_string(), position);
            }
        }

        self.gene_associations = GeneAssociation::from_elements(elements);
        self.component_associations = ComponentAssociation::from_elements(elements);
        self.compound_associations = CompoundAssociation::from_elements(elements);
        self.gene_expression_associations = GeneExpressionAssociation::from_elements(elements);
        self.organ_associations = OrganAssociation::from_elements(elements);

        let aops = AopInfo::from_elements(elements);
        debug!("Parsed {} AOP info objects from elements", aops.len());
        for aop in &aops {
            self.register_aop(aop);
        }

        self.parse_key_events(elements);
        self.parse_relationships(elements);

        info!(
            "Populated network from {} Cytoscape elements: {} nodes, {} edges, {} KEs, {} KERs, {} AOPs",
            elements.len(),
            self.nodes.len(),
            self.edges.len(),
            self.key_events.len(),
            self.relationships.len(),
            self.aop_info.len()
        );
    }

    fn parse_key_events(&mut self, elements: &[Element]) {
        for element in elements.iter().filter(|e| e.is_node()) {
            let ke_type = match NodeType::parse(element.type_str()) {
                Some(t) if t.is_key_event() => t,
                _ => continue,
            };
            let uri = element.id();
            if !is_ke_uri(uri) {
                continue;
            }

            match KeyEvent::new(id_from_uri(uri), uri, element.str("label"), ke_type) {
                Ok(mut key_event) => {
                    for aop in aop_pairs(&element.data) {
                        key_event.add_aop(aop);
                    }
                    self.add_key_event(key_event);
                }
                Err(e) => warn!("Skipping key event {}: {}", uri, e),
            }
        }
    }

    fn parse_relationships(&mut self, elements: &[Element]) {
        for element in elements.iter().filter(|e| e.is_edge()) {
            if element.type_str() != EdgeType::Ker.as_str() || element.str("ker_label").is_empty() {
                continue;
            }

            let ker_id = match element.str("curie").rsplit_once(':') {
                Some((_, id)) => id,
                None => element.str("ker_label"),
            };
            let (Some(up), Some(down)) = (
                self.key_event(element.str("source")).cloned(),
                self.key_event(element.str("target")).cloned(),
            ) else {
                continue;
            };

            let ker_uri = format!("{}{}", KER_URI_PREFIX, ker_id);
            match KeyEventRelationship::new(ker_id, ker_uri, up, down) {
                Ok(rel) => self.add_relationship(rel),
                Err(e) => warn!("Skipping relationship {}: {}", ker_id, e),
            }
        }
    }

    pub fn summary(&self) -> NetworkSummary {
        let count = |t: NodeType| self.key_events.iter().filter(|ke| ke.ke_type == t).count();

        NetworkSummary {
            total_key_events: self.key_events.len(),
            mie_count: count(NodeType::Mie),
            ao_count: count(NodeType::Ao),
            ke_count: count(NodeType::Ke),
            ker_count: self.relationships.len(),
            gene_associations: self.gene_associations.len(),
            gene_expression_associations: self.gene_expression_associations.len(),
            compound_associations: self.compound_associations.len(),
            component_associations: self.component_associations.len(),
            organ_associations: self.organ_associations.len(),
            total_aops: self.aop_info.len(),
        }
    }
}

impl fmt::Display for AopNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AopNetwork({} KEs, {} KERs, {} AOPs)",
            self.key_events.len(),
            self.relationships.len(),
            self.aop_info.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::{AOP_URI_PREFIX, KE_URI_PREFIX};
    use serde_json::json;

    fn ke_uri(id: &str) -> String {
        format!("{}{}", KE_URI_PREFIX, id)
    }

    fn key_event(id: &str, ke_type: NodeType, aop: &str) -> KeyEvent {
        let mut ke = KeyEvent::new(id, ke_uri(id), format!("Event {}", id), ke_type).unwrap();
        let info = AopInfo::from_uri(&format!("{}{}", AOP_URI_PREFIX, aop), &format!("AOP {}", aop))
            .unwrap();
        ke.add_aop(info);
        ke
    }

    fn sample_network() -> AopNetwork {
        let mut network = AopNetwork::new();
        let mie = key_event("1", NodeType::Mie, "10");
        let ao = key_event("2", NodeType::Ao, "10");
        network.add_relationship(
            KeyEventRelationship::new("100", format!("{}100", KER_URI_PREFIX), mie, ao).unwrap(),
        );
        network.add_key_event(key_event("3", NodeType::Ke, "11"));

        network.add_gene_association(
            GeneAssociation::new(ke_uri("1"), "TP53", Some("P04637".to_string())).unwrap(),
        );
        network.add_organ_association(
            OrganAssociation::from_uri(&ke_uri("2"), "http://aopwiki.org/organ/7", "Liver").unwrap(),
        );
        network.add_gene_expression_association(
            GeneExpressionAssociation {
                gene_id: "TP53".to_string(),
                anatomical_id: "UBERON_0002107".to_string(),
                anatomical_name: "liver".to_string(),
                expression_level: "90".to_string(),
                ..Default::default()
            }
            .validated()
            .unwrap(),
        );
        network
    }

    #[test]
    fn test_relationship_adds_key_events_and_aops() {
        let network = sample_network();
        assert_eq!(network.key_events().len(), 3);
        assert_eq!(network.relationships().len(), 1);
        assert_eq!(network.aop_ids(), vec!["10", "11"]);
        assert_eq!(network.ke_uris()[0], ke_uri("1"));
        assert_eq!(network.to_string(), "AopNetwork(3 KEs, 1 KERs, 2 AOPs)");
    }

    #[test]
    fn test_duplicate_relationship_merges_aops() {
        let mut network = sample_network();
        let mie = key_event("1", NodeType::Mie, "12");
        let ao = key_event("2", NodeType::Ao, "12");
        network.add_relationship(
            KeyEventRelationship::new("100", format!("{}100", KER_URI_PREFIX), mie, ao).unwrap(),
        );
        assert_eq!(network.relationships().len(), 1);
        assert_eq!(network.key_event(&ke_uri("1")).unwrap().aop_ids(), vec!["10", "12"]);
        assert_eq!(network.aop_info().len(), 3);
    }

    #[test]
    fn test_expression_organ_merges_with_organ_node() {
        let network = sample_network();
        let organs: Vec<_> = network
            .nodes()
            .filter(|n| n.is_instance_of(NodeType::Organ))
            .collect();
        assert_eq!(organs.len(), 1);
        assert_eq!(organs[0].id, "http://aopwiki.org/organ/7");

        let expression = network
            .edges()
            .find(|e| e.is_instance_of(EdgeType::ExpressionIn))
            .unwrap();
        assert_eq!(expression.target, "http://aopwiki.org/organ/7");
    }

    #[test]
    fn test_gene_and_organ_lookups() {
        let network = sample_network();
        assert_eq!(network.gene_ids(), vec!["TP53"]);
        assert_eq!(network.organ_names(), vec!["liver"]);
        assert_eq!(network.genes_for_ke(&ke_uri("1")).len(), 1);
        assert!(network.genes_for_ke(&ke_uri("2")).is_empty());
        assert!(network
            .compounds_for_aop("https://identifiers.org/aop/10")
            .is_empty());
    }

    #[test]
    fn test_organ_names_keep_case_variants() {
        let mut network = AopNetwork::new();
        for (uri, name) in [
            ("http://purl.obolibrary.org/obo/UBERON_0002107", "Liver"),
            ("http://purl.obolibrary.org/obo/UBERON_0002108", "liver"),
            ("http://purl.obolibrary.org/obo/UBERON_0002107", "Liver"),
        ] {
            network.add_organ_association(OrganAssociation::from_uri(&ke_uri("1"), uri, name).unwrap());
        }
        assert_eq!(network.organ_names(), vec!["Liver", "liver"]);
    }

    #[test]
    fn test_summary() {
        let summary = sample_network().summary();
        assert_eq!(summary.total_key_events, 3);
        assert_eq!(summary.mie_count, 1);
        assert_eq!(summary.ao_count, 1);
        assert_eq!(summary.ke_count, 1);
        assert_eq!(summary.ker_count, 1);
        assert_eq!(summary.gene_associations, 1);
        assert_eq!(summary.organ_associations, 1);
        assert_eq!(summary.gene_expression_associations, 1);
        assert_eq!(summary.total_aops, 2);
    }

    #[test]
    fn test_to_cytoscape_order_and_styles() {
        let network = sample_network();
        let doc = network.to_cytoscape(true);

        assert!(doc.elements[..3].iter().all(|e| e.is_node()));
        assert_eq!(doc.elements[0].type_str(), "mie");
        assert_eq!(doc.elements[3].type_str(), "ker");
        assert!(doc.style.is_some());
        assert_eq!(doc.layout.unwrap()["name"], "breadthfirst");

        let bare = network.to_cytoscape(false);
        assert!(bare.style.is_none() && bare.layout.is_none());
        assert_eq!(bare.elements.len(), doc.elements.len());
    }

    #[test]
    fn test_cytoscape_round_trip() {
        let original = sample_network();
        let doc = original.to_cytoscape(false);

        let mut loaded = AopNetwork::new();
        loaded.from_cytoscape_elements(&doc.elements);

        assert_eq!(loaded.key_events().len(), 3);
        assert_eq!(loaded.relationships().len(), 1);
        assert_eq!(loaded.relationships()[0].ker_id, "100");
        assert_eq!(loaded.aop_info().len(), 2);
        assert_eq!(loaded.gene_associations.len(), 1);
        assert_eq!(loaded.organ_associations.len(), 1);
        assert_eq!(loaded.gene_expression_associations.len(), 1);
        assert_eq!(loaded.to_cytoscape(false).elements.len(), doc.elements.len());
    }

    #[test]
    fn test_positions_are_kept() {
        let elements: Vec<Element> = serde_json::from_value(json!([
            {"data": {"id": ke_uri("5"), "label": "Five", "type": "ke"},
             "position": {"x": 10.0, "y": -4.5}}
        ]))
        .unwrap();

        let mut network = AopNetwork::new();
        network.from_cytoscape_elements(&elements);
        let doc = network.to_cytoscape(false);
        assert_eq!(doc.elements.len(), 1);
        assert_eq!(doc.elements[0].position, Some(Position { x: 10.0, y: -4.5 }));
    }

    #[test]
    fn test_ker_requires_known_key_events() {
        let elements: Vec<Element> = serde_json::from_value(json!([
            {"data": {"id": ke_uri("1"), "type": "mie"}},
            {"data": {"id": "e", "source": ke_uri("1"), "target": ke_uri("9"),
                      "type": "ker", "ker_label": "77"}}
        ]))
        .unwrap();

        let mut network = AopNetwork::new();
        network.from_cytoscape_elements(&elements);
        assert_eq!(network.key_events().len(), 1);
        assert!(network.relationships().is_empty());
        assert_eq!(network.key_events()[0].title, "1");
    }
}
