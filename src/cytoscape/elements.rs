//! Cytoscape graph elements.
//!
//! Elements are kept close to the Cytoscape.js JSON shape: a free-form
//! `data` object plus optional `group`, `classes` and `position`.

use crate::model::types::{EdgeType, NodeType};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// The `data` object of a Cytoscape element.
pub type Data = Map<String, Value>;

/// Keys that identify a node and are never overwritten by a merge.
const RESERVED_NODE_KEYS: [&str; 3] = ["id", "label", "type"];

/// Read a string field from element data, `""` when absent or not a string.
pub fn data_str<'a>(data: &'a Data, key: &str) -> &'a str {
    data.get(key).and_then(Value::as_str).unwrap_or("")
}

/// Read a field that may hold either a single string or a list of strings.
pub fn data_str_list(data: &Data, key: &str) -> Vec<String> {
    match data.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| v.as_str().unwrap_or_default().to_string())
            .collect(),
        Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Node position as stored by Cytoscape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A raw Cytoscape element (node or edge).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default)]
    pub data: Data,
    #[serde(
        default,
        skip_serializing_if = "String::is_empty",
        deserialize_with = "classes_from_json"
    )]
    pub classes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// Cytoscape accepts `classes` as a space-separated string or a list.
fn classes_from_json<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Classes {
        Text(String),
        List(Vec<String>),
        Missing(Option<()>),
    }

    Ok(match Classes::deserialize(deserializer)? {
        Classes::Text(s) => s,
        Classes::List(list) => list.join(" "),
        Classes::Missing(_) => String::new(),
    })
}

impl Element {
    /// Create a node element.
    pub fn node(data: Data, classes: impl Into<String>) -> Self {
        Self {
            group: Some("nodes".to_string()),
            data,
            classes: classes.into(),
            position: None,
        }
    }

    /// Create an edge element.
    pub fn edge(data: Data) -> Self {
        Self {
            group: Some("edges".to_string()),
            data,
            classes: String::new(),
            position: None,
        }
    }

    /// An explicit group wins; otherwise an element with both endpoints is an edge.
    pub fn is_edge(&self) -> bool {
        match self.group.as_deref() {
            Some("edges") => true,
            Some(_) => false,
            None => self.data.contains_key("source") && self.data.contains_key("target"),
        }
    }

    pub fn is_node(&self) -> bool {
        !self.is_edge()
    }

    pub fn str(&self, key: &str) -> &str {
        data_str(&self.data, key)
    }

    pub fn id(&self) -> &str {
        self.str("id")
    }

    pub fn type_str(&self) -> &str {
        self.str("type")
    }
}

/// Build a `Data` object from key/value pairs.
pub fn data_from<I, K>(pairs: I) -> Data
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

/// An edge in Cytoscape format.
#[derive(Debug, Clone, PartialEq)]
pub struct CytoscapeEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
    pub properties: Data,
}

impl CytoscapeEdge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        label: impl Into<String>,
        properties: Data,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            label: label.into(),
            properties,
        }
    }

    /// Create an edge from a Cytoscape element; `None` for nodes or dangling edges.
    pub fn from_element(element: &Element) -> Option<Self> {
        if !element.is_edge() {
            return None;
        }

        let source = element.str("source");
        let target = element.str("target");
        if source.is_empty() || target.is_empty() {
            return None;
        }

        let id = match element.id() {
            "" => format!("{}_{}", source, target),
            id => id.to_string(),
        };

        Some(Self::new(
            id,
            source,
            target,
            element.str("label"),
            element.data.clone(),
        ))
    }

    /// Flatten into Cytoscape `data`.
    pub fn to_data(&self) -> Data {
        let mut data = data_from([
            ("id", Value::from(self.id.as_str())),
            ("source", Value::from(self.source.as_str())),
            ("target", Value::from(self.target.as_str())),
            ("label", Value::from(self.label.as_str())),
        ]);
        for (k, v) in &self.properties {
            data.insert(k.clone(), v.clone());
        }
        // Endpoints may have been rewritten after a node merge.
        data.insert("source".to_string(), Value::from(self.source.as_str()));
        data.insert("target".to_string(), Value::from(self.target.as_str()));
        data
    }

    pub fn to_element(&self) -> Element {
        Element::edge(self.to_data())
    }

    pub fn edge_type(&self) -> &str {
        data_str(&self.properties, "type")
    }

    pub fn is_gene_relationship(&self) -> bool {
        matches!(self.label.as_str(), "translates to" | "part of")
    }

    pub fn merge_properties(&mut self, other: &Data) {
        for (k, v) in other {
            self.properties.insert(k.clone(), v.clone());
        }
    }

    /// Matches on the `type` field, or on the label for action edges.
    pub fn is_instance_of(&self, edge_type: EdgeType) -> bool {
        self.edge_type() == edge_type.as_str() || self.label == edge_type.as_str()
    }
}

/// A node in Cytoscape format.
#[derive(Debug, Clone, PartialEq)]
pub struct CytoscapeNode {
    pub id: String,
    pub label: String,
    pub node_type: String,
    pub classes: String,
    pub properties: Data,
}

impl CytoscapeNode {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        node_type: impl Into<String>,
        classes: impl Into<String>,
        properties: Data,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            node_type: node_type.into(),
            classes: classes.into(),
            properties,
        }
    }

    /// Create a node from a Cytoscape element; `None` for edges or id-less nodes.
    pub fn from_element(element: &Element) -> Option<Self> {
        if element.is_edge() || element.id().is_empty() {
            return None;
        }

        Some(Self::new(
            element.id(),
            element.str("label"),
            element.type_str(),
            element.classes.clone(),
            element.data.clone(),
        ))
    }

    pub fn to_data(&self) -> Data {
        let mut data = data_from([
            ("id", Value::from(self.id.as_str())),
            ("label", Value::from(self.label.as_str())),
            ("type", Value::from(self.node_type.as_str())),
        ]);
        for (k, v) in &self.properties {
            data.insert(k.clone(), v.clone());
        }
        data
    }

    pub fn to_element(&self) -> Element {
        Element::node(self.to_data(), self.classes.clone())
    }

    /// Merge extra properties, leaving identity keys alone.
    pub fn merge_properties(&mut self, other: &Data) {
        for (k, v) in other {
            if !RESERVED_NODE_KEYS.contains(&k.as_str()) {
                self.properties.insert(k.clone(), v.clone());
            }
        }
    }

    pub fn update_label(&mut self, new_label: &str) {
        if !new_label.is_empty() && new_label != self.label {
            self.label = new_label.to_string();
            self.properties
                .insert("label".to_string(), Value::from(new_label));
        }
    }

    pub fn is_instance_of(&self, node_type: NodeType) -> bool {
        self.node_type == node_type.as_str()
    }

    pub fn property(&self, key: &str) -> &str {
        data_str(&self.properties, key)
    }
}

/// Deduplicating node collection.
///
/// A node matching an existing one by id, or by case-insensitive label, is
/// merged into it. The discarded id is remembered as an alias so edges can
/// be pointed at the surviving node.
#[derive(Debug, Clone, Default)]
pub struct NodeSet {
    nodes: Vec<CytoscapeNode>,
    by_id: HashMap<String, usize>,
    by_label: HashMap<String, usize>,
    aliases: HashMap<String, String>,
}

impl NodeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or merge a node. Returns the id of the node that holds it.
    pub fn insert(&mut self, node: CytoscapeNode) -> String {
        let label_key = Self::label_key(&node);
        let existing = self.by_id.get(&node.id).copied().or_else(|| {
            label_key
                .as_ref()
                .and_then(|key| self.by_label.get(key).copied())
        });

        if let Some(idx) = existing {
            let kept = &mut self.nodes[idx];
            kept.merge_properties(&node.properties);
            if kept.id != node.id {
                debug!("Merging node {} into {}", node.id, kept.id);
                self.aliases.insert(node.id.clone(), kept.id.clone());
            }
            return kept.id.clone();
        }

        let idx = self.nodes.len();
        self.by_id.insert(node.id.clone(), idx);
        if let Some(key) = label_key {
            self.by_label.entry(key).or_insert(idx);
        }
        let id = node.id.clone();
        self.nodes.push(node);
        id
    }

    /// Key events are only ever matched by id.
    fn label_key(node: &CytoscapeNode) -> Option<String> {
        let is_key_event = NodeType::parse(&node.node_type).is_some_and(|t| t.is_key_event());
        if node.label.is_empty() || is_key_event {
            None
        } else {
            Some(node.label.to_lowercase())
        }
    }

    /// Map a node id to the id of the node it was merged into.
    pub fn resolve<'a>(&'a self, id: &'a str) -> &'a str {
        self.aliases.get(id).map(String::as_str).unwrap_or(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(self.resolve(id))
    }

    pub fn get(&self, id: &str) -> Option<&CytoscapeNode> {
        self.by_id.get(self.resolve(id)).map(|&i| &self.nodes[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &CytoscapeNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> HashSet<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    pub fn into_vec(self) -> Vec<CytoscapeNode> {
        self.nodes
    }
}

/// Edge collection deduplicated by id.
#[derive(Debug, Clone, Default)]
pub struct EdgeSet {
    edges: Vec<CytoscapeEdge>,
    ids: HashSet<String>,
}

impl EdgeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when an edge with the same id is already present.
    pub fn insert(&mut self, edge: CytoscapeEdge) -> bool {
        if !self.ids.insert(edge.id.clone()) {
            return false;
        }
        self.edges.push(edge);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &CytoscapeEdge> {
        self.edges.iter()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn into_vec(self) -> Vec<CytoscapeEdge> {
        self.edges
    }
}

/// A Cytoscape.js JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CytoscapeDocument {
    #[serde(default, deserialize_with = "elements_from_json")]
    pub elements: Vec<Element>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Value>,
}

/// Accept both the flat element list and the `{"nodes", "edges"}` form
/// written by Cytoscape desktop.
fn elements_from_json<'de, D>(deserializer: D) -> Result<Vec<Element>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Elements {
        Flat(Vec<Element>),
        Grouped {
            #[serde(default)]
            nodes: Vec<Element>,
            #[serde(default)]
            edges: Vec<Element>,
        },
    }

    Ok(match Elements::deserialize(deserializer)? {
        Elements::Flat(elements) => elements,
        Elements::Grouped { nodes, edges } => {
            let nodes = nodes.into_iter().map(|mut n| {
                n.group.get_or_insert_with(|| "nodes".to_string());
                n
            });
            let edges = edges.into_iter().map(|mut e| {
                e.group.get_or_insert_with(|| "edges".to_string());
                e
            });
            nodes.chain(edges).collect()
        }
    })
}
