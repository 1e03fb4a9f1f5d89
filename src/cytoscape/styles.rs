//! Default Cytoscape stylesheet and layout for AOP networks.

use crate::model::types::{EdgeType, NodeType};
use serde_json::{json, Value};

const TRANSITION_DURATION: &str = "0.3s";
const TRANSITION_TIMING: &str = "ease-out";

/// Holds the stylesheet served alongside network elements.
#[derive(Debug, Clone)]
pub struct StyleManager {
    styles: Vec<Value>,
}

impl Default for StyleManager {
    fn default() -> Self {
        Self::new()
    }
}

fn node_type_selector(node_type: NodeType, class: &str) -> String {
    format!("node[type='{}'], .{}", node_type, class)
}

/// Add the shared transition settings to a style block.
fn with_transition(mut style: Value, properties: &str) -> Value {
    if let Some(map) = style.as_object_mut() {
        map.insert("transition-property".to_string(), json!(properties));
        map.insert("transition-duration".to_string(), json!(TRANSITION_DURATION));
        map.insert("transition-timing-function".to_string(), json!(TRANSITION_TIMING));
    }
    style
}

fn rule(selector: impl Into<String>, style: Value) -> Value {
    json!({"selector": selector.into(), "style": style})
}

impl StyleManager {
    pub fn new() -> Self {
        Self {
            styles: Self::base_styles(),
        }
    }

    pub fn styles(&self) -> &[Value] {
        &self.styles
    }

    pub fn layout(&self) -> Value {
        json!({"name": "breadthfirst", "directed": true, "padding": 30})
    }

    fn base_styles() -> Vec<Value> {
        let action_selector = EdgeType::component_actions()
            .map(|a| format!("edge[label='{}']", a))
            .collect::<Vec<_>>()
            .join(", ");

        vec![
            rule(
                "node",
                with_transition(
                    json!({
                        "width": "350px",
                        "height": "350px",
                        "background-color": "#ffff99",
                        "label": "data(label)",
                        "text-wrap": "wrap",
                        "text-max-width": "235px",
                        "text-valign": "center",
                        "text-halign": "center",
                        "color": "#000",
                        "font-size": "40px",
                        "border-width": "2px",
                        "border-color": "#000"
                    }),
                    "width, height, font-size, text-max-width",
                ),
            ),
            rule(
                format!("node[type='{}']", NodeType::Mie),
                json!({"background-color": "#ccffcc"}),
            ),
            rule(
                format!("node[type='{}']", NodeType::Ao),
                json!({"background-color": "#ffe6e6"}),
            ),
            rule(
                format!("node[type='{}']", NodeType::Protein),
                json!({"background-color": "#ffff99"}),
            ),
            rule(
                format!("node[type='{}']", NodeType::Gene),
                json!({"background-color": "#ffcc99"}),
            ),
            rule(
                node_type_selector(NodeType::Chemical, "chemical-node"),
                with_transition(
                    json!({
                        "width": "270px",
                        "height": "200px",
                        "shape": "triangle",
                        "background-color": "#93d5f6",
                        "label": "data(label)",
                        "text-wrap": "wrap",
                        "text-max-width": "190px",
                        "text-valign": "top",
                        "text-halign": "center",
                        "color": "#000",
                        "font-size": "90px",
                        "border-width": 2,
                        "border-color": "#000",
                        "text-margin-y": 3
                    }),
                    "width, height, font-size, text-max-width",
                ),
            ),
            rule(
                format!("edge[type='{}'], edge[ker_label]", EdgeType::Ker),
                with_transition(
                    json!({
                        "curve-style": "unbundled-bezier",
                        "width": "40px",
                        "line-color": "#93d5f6",
                        "opacity": 1,
                        "target-arrow-shape": "triangle",
                        "target-arrow-color": "#93d5f6",
                        "label": "data(ker_label)",
                        "text-margin-y": 1,
                        "text-rotation": "autorotate",
                        "font-size": "40px",
                        "font-weight": "bold",
                        "color": "#000"
                    }),
                    "width, font-size",
                ),
            ),
            rule(
                node_type_selector(NodeType::Protein, "protein-node"),
                with_transition(
                    json!({
                        "shape": "round-rectangle",
                        "width": "400px",
                        "height": "200px",
                        "opacity": 1,
                        "label": "data(label)",
                        "background-color": "#e3f2fd",
                        "background-gradient-direction": "to-bottom-right",
                        "background-gradient-stop-colors": "#e3f2fd #bbdefb",
                        "text-valign": "center",
                        "text-halign": "center",
                        "color": "#0d47a1",
                        "font-size": "36px",
                        "font-weight": "600",
                        "font-family": "Arial, sans-serif",
                        "font-color": "#000000",
                        "text-wrap": "wrap",
                        "text-max-width": "180px",
                        "border-width": "2px",
                        "border-color": "#1976d2",
                        "border-style": "solid",
                        "box-shadow": "0px 4px 8px rgba(0,0,0,0.2)",
                        "padding": "4px"
                    }),
                    "font-size, width, height, border-width, box-shadow",
                ),
            ),
            rule(
                node_type_selector(NodeType::Gene, "gene-node"),
                with_transition(
                    json!({
                        "shape": "ellipse",
                        "width": "200px",
                        "height": "100px",
                        "background-opacity": 0,
                        "label": "data(label)",
                        "text-valign": "center",
                        "text-halign": "center",
                        "text-wrap": "wrap",
                        "text-max-width": "180px",
                        "color": "#000000",
                        "font-size": "45px",
                        "font-weight": "bold",
                        "border-width": 0,
                        "border-color": "transparent"
                    }),
                    "font-size, width, height, text-max-width",
                ),
            ),
            rule(
                "edge[label]",
                with_transition(
                    json!({
                        "label": "data(label)",
                        "text-rotation": "autorotate",
                        "text-margin-y": -15,
                        "font-size": "40px",
                        "curve-style": "unbundled-bezier"
                    }),
                    "font-size",
                ),
            ),
            rule(
                format!("edge[type='{}']", EdgeType::Interaction),
                with_transition(
                    json!({
                        "width": "40px",
                        "line-color": "#ceafc0",
                        "opacity": 1,
                        "target-arrow-shape": "triangle",
                        "target-arrow-color": "#ceafc0",
                        "text-margin-y": 1,
                        "text-rotation": "autorotate",
                        "font-size": "40px",
                        "font-weight": "bold",
                        "color": "#000"
                    }),
                    "width, font-size",
                ),
            ),
            rule(
                ".qspr-prediction-edge",
                with_transition(
                    json!({
                        "width": "35px",
                        "line-color": "#ff6b6b",
                        "opacity": 1,
                        "target-arrow-shape": "triangle",
                        "target-arrow-color": "#ff6b6b",
                        "text-margin-y": 1,
                        "text-rotation": "autorotate",
                        "font-size": "35px",
                        "font-weight": "bold",
                        "color": "#000",
                        "line-style": "dashed"
                    }),
                    "width, font-size",
                ),
            ),
            rule(
                ".bounding-box",
                with_transition(
                    json!({
                        "shape": "roundrectangle",
                        "background-opacity": 0.1,
                        "border-width": 2,
                        "border-color": "#000",
                        "label": "data(label)",
                        "text-valign": "top",
                        "text-halign": "center",
                        "font-size": "50px",
                        "text-wrap": "wrap",
                        "font-weight": "bold",
                        "text-max-width": "1400px"
                    }),
                    "font-size, text-max-width",
                ),
            ),
            rule(
                node_type_selector(NodeType::ComponentProcess, "process-node"),
                with_transition(
                    json!({
                        "shape": "roundrectangle",
                        "width": "320px",
                        "height": "140px",
                        "background-color": "#ffffff",
                        "border-width": "1px",
                        "border-color": "#000000",
                        "label": "data(label)",
                        "text-valign": "center",
                        "text-halign": "center",
                        "font-size": "32px",
                        "font-weight": "normal",
                        "color": "#2196f3",
                        "text-wrap": "wrap",
                        "text-max-width": "300px"
                    }),
                    "width, height, font-size, text-max-width, border-width",
                ),
            ),
            rule(
                node_type_selector(NodeType::ComponentObject, "object-node"),
                with_transition(
                    json!({
                        "shape": "roundrectangle",
                        "width": "280px",
                        "height": "280px",
                        "background-color": "#f3e5f5",
                        "border-width": "2px",
                        "border-color": "#9c27b0",
                        "label": "data(label)",
                        "text-valign": "center",
                        "text-halign": "center",
                        "font-size": "36px",
                        "font-weight": "bold",
                        "color": "#4a148c",
                        "text-wrap": "wrap",
                        "text-max-width": "260px"
                    }),
                    "width, height, font-size, text-max-width, border-width",
                ),
            ),
            rule(
                format!("edge[type='{}']", EdgeType::HasProcess),
                with_transition(
                    json!({
                        "curve-style": "bezier",
                        "width": "20px",
                        "line-color": "#4caf50",
                        "opacity": 1,
                        "target-arrow-shape": "triangle",
                        "target-arrow-color": "#4caf50",
                        "arrow-scale": 1.5,
                        "label": "data(label)",
                        "text-rotation": "autorotate",
                        "text-margin-y": "-5px",
                        "font-size": "30px",
                        "font-weight": "bold",
                        "color": "#2e7d32"
                    }),
                    "width, font-size, text-margin-y",
                ),
            ),
            rule(
                format!("edge[type='{}']", EdgeType::HasObject),
                with_transition(
                    json!({
                        "curve-style": "bezier",
                        "width": "20px",
                        "line-color": "#9c27b0",
                        "opacity": 1,
                        "target-arrow-shape": "triangle",
                        "target-arrow-color": "#9c27b0",
                        "arrow-scale": 1.2,
                        "line-style": "dashed",
                        "label": "data(label)",
                        "text-rotation": "autorotate",
                        "text-margin-y": "-5px",
                        "font-size": "26px",
                        "color": "#4a148c"
                    }),
                    "width, font-size, text-margin-y",
                ),
            ),
            rule(
                action_selector,
                with_transition(
                    json!({
                        "curve-style": "bezier",
                        "width": "20px",
                        "line-color": "#4caf50",
                        "opacity": 1,
                        "target-arrow-shape": "triangle",
                        "target-arrow-color": "#4caf50",
                        "arrow-scale": 1.8,
                        "label": "data(label)",
                        "text-rotation": "autorotate",
                        "text-margin-y": "-8px",
                        "font-size": "28px",
                        "font-weight": "bold",
                        "color": "#1b5e20",
                        "text-background-color": "#e8f5e8",
                        "text-background-opacity": 1,
                        "text-background-padding": "2px"
                    }),
                    "width, font-size, text-margin-y, text-background-padding",
                ),
            ),
            rule(
                node_type_selector(NodeType::Organ, "organ-node"),
                with_transition(
                    json!({
                        "shape": "round-rectangle",
                        "width": "150px",
                        "height": "150px",
                        "background-color": "#8e7cc3",
                        "border-width": "2px",
                        "border-color": "#6a5acd",
                        "label": "data(label)",
                        "text-valign": "center",
                        "text-halign": "center",
                        "font-size": "40px",
                        "font-weight": "bold",
                        "color": "#ffffff",
                        "text-outline-color": "#6a5acd",
                        "text-outline-width": 1,
                        "text-wrap": "wrap",
                        "text-max-width": "50px",
                        "padding": "8px",
                        "opacity": 1
                    }),
                    "width, height, font-size, text-max-width, border-width, padding",
                ),
            ),
            rule(
                node_type_selector(NodeType::Cell, "cell-node"),
                with_transition(
                    json!({
                        "shape": "octagon",
                        "width": "180px",
                        "height": "180px",
                        "background-color": "#9b59b6",
                        "border-width": "3px",
                        "border-color": "#7d3c98",
                        "label": "data(label)",
                        "text-valign": "center",
                        "text-halign": "center",
                        "font-size": "38px",
                        "font-weight": "bold",
                        "color": "#ffffff",
                        "text-outline-color": "#7d3c98",
                        "text-outline-width": 1,
                        "text-wrap": "wrap",
                        "text-max-width": "160px",
                        "padding": "6px",
                        "opacity": 1
                    }),
                    "width, height, font-size, text-max-width, border-width, padding",
                ),
            ),
            rule(
                node_type_selector(NodeType::Quality, "quality-node"),
                with_transition(
                    json!({
                        "shape": "diamond",
                        "width": "160px",
                        "height": "160px",
                        "background-color": "#f39c12",
                        "border-width": "2px",
                        "border-color": "#e67e22",
                        "label": "data(label)",
                        "text-valign": "center",
                        "text-halign": "center",
                        "font-size": "35px",
                        "font-weight": "bold",
                        "color": "#ffffff",
                        "text-outline-color": "#e67e22",
                        "text-outline-width": 1,
                        "text-wrap": "wrap",
                        "text-max-width": "140px",
                        "padding": "4px",
                        "opacity": 1
                    }),
                    "width, height, font-size, text-max-width, border-width, padding",
                ),
            ),
            rule(
                "node:selected",
                json!({
                    "border-width": "14px",
                    "border-color": "#1976d2",
                    "z-index": 9999
                }),
            ),
            rule(
                format!(
                    "edge[type='{}'], edge[type='{}']",
                    EdgeType::ASSOCIATED_WITH,
                    EdgeType::ExpressionIn
                ),
                with_transition(
                    json!({
                        "curve-style": "straight",
                        "width": "20px",
                        "line-color": "#b19cd9",
                        "opacity": 1,
                        "target-arrow-shape": "triangle",
                        "target-arrow-color": "#b19cd9",
                        "arrow-scale": 1.2,
                        "source-endpoint": "outside-to-node",
                        "target-endpoint": "outside-to-node"
                    }),
                    "width",
                ),
            ),
            rule(
                format!(
                    "edge[type='{}']:selected, edge[type='{}']:selected",
                    EdgeType::ASSOCIATED_WITH,
                    EdgeType::ExpressionIn
                ),
                json!({
                    "line-color": "#8e7cc3",
                    "target-arrow-color": "#8e7cc3",
                    "width": "3px",
                    "opacity": 1
                }),
            ),
        ]
    }
}
