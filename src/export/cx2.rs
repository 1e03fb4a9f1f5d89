//! NDEx CX2 export.
//!
//! CX2 is a JSON array of aspects. Nodes and edges get integer ids and keep
//! their Cytoscape data as attribute maps (`v`), minus the reserved keys.

use crate::model::network::AopNetwork;
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

const NODE_RESERVED: &[&str] = &["id"];
const EDGE_RESERVED: &[&str] = &["id", "source", "target"];

/// Options for [`to_cx2`].
#[derive(Debug, Clone)]
pub struct Cx2Options {
    pub name: Option<String>,
    pub description: Option<String>,
    pub include_styles: bool,
    pub generated_at: DateTime<Utc>,
}

impl Default for Cx2Options {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            include_styles: true,
            generated_at: Utc::now(),
        }
    }
}

/// CX2 data type name of an attribute value, or `None` for values that are
/// exported as strings.
fn cx2_type(value: &Value) -> Option<&'static str> {
    match value {
        Value::String(_) => Some("string"),
        Value::Bool(_) => Some("boolean"),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some("long"),
        Value::Number(_) => Some("double"),
        Value::Array(items) if items.is_empty() => Some("list_of_string"),
        Value::Array(items) => {
            let first = items.first().and_then(cx2_type)?;
            if items.iter().all(|v| cx2_type(v) == Some(first)) {
                match first {
                    "string" => Some("list_of_string"),
                    "boolean" => Some("list_of_boolean"),
                    "long" => Some("list_of_long"),
                    "double" => Some("list_of_double"),
                    _ => None,
                }
            } else {
                None
            }
        }
        _ => None,
    }
}

fn is_empty_list(value: &Value) -> bool {
    matches!(value, Value::Array(items) if items.is_empty())
}

/// Record the CX2 type of every attribute. Keys seen with more than one
/// type, or with values CX2 cannot type, are declared as strings.
fn declare(
    data: &Map<String, Value>,
    reserved: &[&str],
    declarations: &mut BTreeMap<String, &'static str>,
) {
    for (key, value) in data {
        if reserved.contains(&key.as_str()) || value.is_null() {
            continue;
        }
        let kind = cx2_type(value).unwrap_or("string");
        match declarations.get_mut(key) {
            None => {
                declarations.insert(key.clone(), kind);
            }
            Some(declared) if *declared == kind => {}
            // an empty list fits any list type
            Some(declared) if is_empty_list(value) && declared.starts_with("list_of_") => {}
            Some(declared) => *declared = "string",
        }
    }
}

/// Attribute map with reserved keys removed. Values declared as strings
/// are stringified.
fn attributes(
    data: &Map<String, Value>,
    reserved: &[&str],
    declarations: &BTreeMap<String, &'static str>,
) -> Map<String, Value> {
    data.iter()
        .filter(|(key, value)| !reserved.contains(&key.as_str()) && !value.is_null())
        .map(|(key, value)| {
            let value = match (declarations.get(key), value) {
                (Some(&"string"), Value::String(_)) => value.clone(),
                (Some(&"string"), other) => Value::String(other.to_string()),
                _ => value.clone(),
            };
            (key.clone(), value)
        })
        .collect()
}

fn declaration_map(declarations: &BTreeMap<String, &'static str>) -> Value {
    let map: Map<String, Value> = declarations
        .iter()
        .map(|(k, d)| (k.clone(), json!({ "d": d })))
        .collect();
    Value::Object(map)
}

/// Convert a network to a CX2 document.
pub fn to_cx2(network: &AopNetwork, options: &Cx2Options) -> Value {
    let document = network.to_cytoscape(options.include_styles);
    let (node_elements, edge_elements): (Vec<_>, Vec<_>) =
        document.elements.iter().partition(|e| e.is_node());

    let mut node_decls = BTreeMap::new();
    for element in &node_elements {
        declare(&element.data, NODE_RESERVED, &mut node_decls);
    }
    let mut ids: HashMap<&str, usize> = HashMap::new();
    let mut nodes = Vec::new();
    for element in &node_elements {
        let cx_id = nodes.len();
        ids.insert(element.id(), cx_id);

        let mut node = Map::new();
        node.insert("id".to_string(), json!(cx_id));
        if let Some(position) = element.position {
            node.insert("x".to_string(), json!(position.x));
            node.insert("y".to_string(), json!(position.y));
        }
        node.insert(
            "v".to_string(),
            Value::Object(attributes(&element.data, NODE_RESERVED, &node_decls)),
        );
        nodes.push(Value::Object(node));
    }

    let connected: Vec<_> = edge_elements
        .iter()
        .filter_map(|element| {
            match (ids.get(element.str("source")), ids.get(element.str("target"))) {
                (Some(&s), Some(&t)) => Some((element, s, t)),
                _ => {
                    debug!("Dropping edge {} with a missing endpoint", element.id());
                    None
                }
            }
        })
        .collect();
    let mut edge_decls = BTreeMap::new();
    for (element, _, _) in &connected {
        declare(&element.data, EDGE_RESERVED, &mut edge_decls);
    }
    let edges: Vec<Value> = connected
        .iter()
        .enumerate()
        .map(|(i, (element, s, t))| {
            json!({
                "id": i,
                "s": s,
                "t": t,
                "v": attributes(&element.data, EDGE_RESERVED, &edge_decls),
            })
        })
        .collect();

    let name = options
        .name
        .clone()
        .unwrap_or_else(|| format!("AOP Network ({} nodes)", nodes.len()));
    let mut network_attrs = Map::new();
    network_attrs.insert("name".to_string(), json!(name));
    if let Some(description) = &options.description {
        network_attrs.insert("description".to_string(), json!(description));
    }
    network_attrs.insert("total_nodes".to_string(), json!(nodes.len()));
    network_attrs.insert("total_edges".to_string(), json!(edges.len()));
    network_attrs.insert(
        "generated_at".to_string(),
        json!(options.generated_at.to_rfc3339()),
    );
    let mut network_decls = BTreeMap::new();
    declare(&network_attrs, &[], &mut network_decls);

    let visual_properties = document
        .style
        .as_ref()
        .map(|styles| json!({ "cytoscape_styles": styles }));

    let mut meta = vec![
        json!({"name": "attributeDeclarations", "elementCount": 1}),
        json!({"name": "networkAttributes", "elementCount": 1}),
        json!({"name": "nodes", "elementCount": nodes.len()}),
        json!({"name": "edges", "elementCount": edges.len()}),
    ];
    if visual_properties.is_some() {
        meta.push(json!({"name": "visualProperties", "elementCount": 1}));
    }

    info!("Created CX2 network: {} nodes, {} edges", nodes.len(), edges.len());

    let mut aspects = vec![
        json!({"CXVersion": "2.0", "hasFragments": false}),
        json!({ "metaData": meta }),
        json!({"attributeDeclarations": [{
            "networkAttributes": declaration_map(&network_decls),
            "nodes": declaration_map(&node_decls),
            "edges": declaration_map(&edge_decls),
        }]}),
        json!({ "networkAttributes": [network_attrs] }),
        json!({ "nodes": nodes }),
        json!({ "edges": edges }),
    ];
    if let Some(vp) = visual_properties {
        aspects.push(json!({ "visualProperties": [vp] }));
    }
    aspects.push(json!({"status": [{"error": "", "success": true}]}));

    Value::Array(aspects)
}
