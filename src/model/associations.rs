//! Evidence attached to key events and pathways.
//!
//! Every association knows how to render itself as Cytoscape elements and
//! how to recover itself from a list of elements, so a network written to
//! JSON can be loaded back without losing its evidence.

use crate::cytoscape::elements::{
    data_from, data_str, CytoscapeEdge, CytoscapeNode, Data, Element,
};
use crate::error::ModelError;
use crate::model::types::{id_from_uri, is_ke_uri, EdgeType, NodeType, ORGAN_CONTEXT_TYPE};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// An association that can be written to and read from Cytoscape elements.
pub trait Association: Sized {
    fn to_elements(&self) -> Vec<Element>;

    /// Recover all associations of this kind from a list of elements.
    fn from_elements(elements: &[Element]) -> Vec<Self>;

    fn nodes(&self) -> Vec<CytoscapeNode> {
        self.to_elements()
            .iter()
            .filter_map(CytoscapeNode::from_element)
            .collect()
    }

    fn edges(&self) -> Vec<CytoscapeEdge> {
        self.to_elements()
            .iter()
            .filter_map(CytoscapeEdge::from_element)
            .collect()
    }
}

/// Node data keyed by node id, restricted to the given types.
fn nodes_by_type<'a>(elements: &'a [Element], types: &[NodeType]) -> HashMap<&'a str, &'a Element> {
    elements
        .iter()
        .filter(|e| e.is_node())
        .filter(|e| types.iter().any(|t| e.type_str() == t.as_str()))
        .map(|e| (e.id(), e))
        .collect()
}

fn edges_by_type<'a>(elements: &'a [Element], edge_type: EdgeType) -> Vec<&'a Data> {
    elements
        .iter()
        .filter(|e| e.is_edge() && e.type_str() == edge_type.as_str())
        .map(|e| &e.data)
        .collect()
}

/// `data[key]` when present, otherwise `data[fallback]`.
fn str_or<'a>(data: &'a Data, key: &str, fallback: &str) -> &'a str {
    match data.get(key).and_then(Value::as_str) {
        Some(v) => v,
        None => data_str(data, fallback),
    }
}

fn edge_data(id: String, source: &str, target: &str, label: &str, edge_type: EdgeType) -> Data {
    data_from([
        ("id", Value::from(id)),
        ("source", Value::from(source)),
        ("target", Value::from(target)),
        ("label", Value::from(label)),
        ("type", Value::from(edge_type.as_str())),
    ])
}

/// A gene (and optionally its protein) linked to a key event.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneAssociation {
    pub ke_uri: String,
    pub gene_id: String,
    pub protein_id: Option<String>,
}

impl GeneAssociation {
    pub fn new(
        ke_uri: impl Into<String>,
        gene_id: impl Into<String>,
        protein_id: Option<String>,
    ) -> Result<Self, ModelError> {
        let assoc = Self {
            ke_uri: ke_uri.into(),
            gene_id: gene_id.into(),
            protein_id,
        };
        if assoc.ke_uri.is_empty() || assoc.gene_id.is_empty() {
            return Err(ModelError::MissingField("KE URI and gene ID"));
        }
        Ok(assoc)
    }

    /// The protein id, unless absent or the `NA` placeholder.
    pub fn protein(&self) -> Option<&str> {
        self.protein_id
            .as_deref()
            .filter(|p| !p.is_empty() && *p != "NA")
    }

    pub fn gene_node_id(&self) -> String {
        format!("gene_{}", self.gene_id)
    }
}

impl Association for GeneAssociation {
    fn to_elements(&self) -> Vec<Element> {
        let gene_node_id = self.gene_node_id();
        let mut elements = vec![Element::node(
            data_from([
                ("id", Value::from(gene_node_id.as_str())),
                ("label", Value::from(self.gene_id.as_str())),
                ("type", Value::from(NodeType::Gene.as_str())),
                ("gene_id", Value::from(self.gene_id.as_str())),
            ]),
            "gene-node",
        )];

        match self.protein() {
            Some(protein) => {
                let protein_node_id = format!("protein_{}", protein);
                elements.push(Element::node(
                    data_from([
                        ("id", Value::from(protein_node_id.as_str())),
                        ("label", Value::from(protein)),
                        ("type", Value::from(NodeType::Protein.as_str())),
                        ("protein_id", Value::from(protein)),
                    ]),
                    "protein-node",
                ));
                elements.push(Element::edge(edge_data(
                    format!("{}_{}", gene_node_id, protein_node_id),
                    &gene_node_id,
                    &protein_node_id,
                    "translates to",
                    EdgeType::TranslatesTo,
                )));
                elements.push(Element::edge(edge_data(
                    format!("{}_{}", protein_node_id, self.ke_uri),
                    &protein_node_id,
                    &self.ke_uri,
                    "part of",
                    EdgeType::PartOf,
                )));
            }
            None => {
                elements.push(Element::edge(edge_data(
                    format!("{}_{}", gene_node_id, self.ke_uri),
                    &gene_node_id,
                    &self.ke_uri,
                    "part of",
                    EdgeType::PartOf,
                )));
            }
        }

        elements
    }

    fn from_elements(elements: &[Element]) -> Vec<Self> {
        let genes = nodes_by_type(elements, &[NodeType::Gene]);
        let proteins = nodes_by_type(elements, &[NodeType::Protein]);

        let gene_of = |el: &Element| str_or(&el.data, "gene_id", "label").to_string();
        let protein_of = |el: &Element| str_or(&el.data, "protein_id", "label").to_string();

        let translations: Vec<(String, String)> = edges_by_type(elements, EdgeType::TranslatesTo)
            .into_iter()
            .filter_map(|edge| {
                let gene = *genes.get(data_str(edge, "source"))?;
                let protein = *proteins.get(data_str(edge, "target"))?;
                Some((gene_of(gene), protein_of(protein)))
            })
            .collect();

        let mut associations = Vec::new();
        for edge in edges_by_type(elements, EdgeType::PartOf) {
            let source = data_str(edge, "source");
            let target = data_str(edge, "target");
            if !is_ke_uri(target) {
                continue;
            }

            if let Some(&gene) = genes.get(source) {
                associations.extend(Self::new(target, gene_of(gene), None).ok());
            } else if let Some(&protein) = proteins.get(source) {
                let protein_id = protein_of(protein);
                if let Some((gene_id, _)) = translations.iter().find(|(_, p)| *p == protein_id) {
                    associations.extend(Self::new(target, gene_id.as_str(), Some(protein_id)).ok());
                }
            }
        }

        associations
    }
}

/// A component row for tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentRow {
    pub ke_id: String,
    pub ke_uri: String,
    pub ke_label: String,
    pub process_id: String,
    pub process_name: String,
    pub process_iri: String,
    pub object_id: String,
    pub object_name: String,
    pub object_iri: String,
    pub action: String,
    pub node_id: String,
}

/// A biological process (and optionally an object) described by a key event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComponentAssociation {
    pub ke_uri: String,
    pub ke_name: String,
    pub process: String,
    pub process_name: String,
    pub object: String,
    pub object_name: String,
    pub action: String,
    pub object_type: String,
}

impl ComponentAssociation {
    /// Validate a fully populated record.
    pub fn validated(self) -> Result<Self, ModelError> {
        if self.ke_uri.is_empty() || self.process.is_empty() {
            return Err(ModelError::MissingField("KE URI and process"));
        }
        Ok(self)
    }

    pub fn process_id(&self) -> &str {
        id_from_uri(&self.process)
    }

    pub fn object_id(&self) -> &str {
        id_from_uri(&self.object)
    }

    pub fn process_node_id(&self) -> String {
        format!("process_{}", self.process_id())
    }

    pub fn object_node_id(&self) -> String {
        format!("object_{}", self.object_id())
    }

    fn ke_prefix(&self) -> String {
        format!("aop.events_{}", id_from_uri(&self.ke_uri))
    }

    /// Classify the object node.
    ///
    /// AOP-Wiki types some objects inconsistently, so the identifier prefix
    /// is checked alongside the declared type.
    pub fn object_node_type(&self) -> NodeType {
        let oid = self.object_id();
        let has = |needles: &[&str]| needles.iter().any(|n| oid.contains(n));

        if self.object_type == ORGAN_CONTEXT_TYPE
            || self.object_type == NodeType::Organ.as_str()
            || has(&["FMA", "UBERON"])
        {
            NodeType::Organ
        } else if self.object_type.contains("CellTypeContext")
            || has(&["CL", "EFO"])
            || matches!(self.object_name.as_str(), "cell" | "mitochondrion")
        {
            NodeType::Cell
        } else if self.object.ends_with("PATO_0001241") || has(&["PR"]) {
            NodeType::Protein
        } else if has(&["GO"]) {
            NodeType::CellularComponent
        } else {
            NodeType::ComponentObject
        }
    }

    fn object_classes(node_type: NodeType) -> String {
        match node_type {
            NodeType::ComponentObject => node_type.as_str().to_string(),
            other => format!("{} {}", other, NodeType::ComponentObject),
        }
    }

    /// The KE to process edge label: the action if it is a known one.
    pub fn edge_label(&self) -> &str {
        if EdgeType::is_component_action(&self.action) {
            &self.action
        } else {
            EdgeType::HasProcess.as_str()
        }
    }

    pub fn to_table_entry(&self) -> ComponentRow {
        let or_na = |s: &str| if s.is_empty() { "N/A".to_string() } else { s.to_string() };
        let has_object = !self.object.is_empty();

        ComponentRow {
            ke_id: id_from_uri(&self.ke_uri).to_string(),
            ke_uri: self.ke_uri.clone(),
            ke_label: or_na(&self.ke_name),
            process_id: self.process_id().to_string(),
            process_name: self.process_name.clone(),
            process_iri: self.process.clone(),
            object_id: if has_object { self.object_id().to_string() } else { "N/A".to_string() },
            object_name: or_na(&self.object_name),
            object_iri: or_na(&self.object),
            action: or_na(&self.action),
            node_id: self.process_node_id(),
        }
    }
}

impl Association for ComponentAssociation {
    fn to_elements(&self) -> Vec<Element> {
        if self.process.is_empty() {
            return Vec::new();
        }

        let ke = self.ke_prefix();
        let process_node_id = self.process_node_id();
        let mut elements = vec![
            Element::node(
                data_from([
                    ("id", Value::from(process_node_id.as_str())),
                    ("label", Value::from(self.process_name.as_str())),
                    ("type", Value::from(NodeType::ComponentProcess.as_str())),
                    ("process_iri", Value::from(self.process.as_str())),
                    ("process_name", Value::from(self.process_name.as_str())),
                    ("process_id", Value::from(self.process_id())),
                ]),
                NodeType::ComponentProcess.as_str(),
            ),
            Element::edge(edge_data(
                format!("{}_{}", ke, process_node_id),
                &self.ke_uri,
                &process_node_id,
                self.edge_label(),
                EdgeType::HasProcess,
            )),
        ];

        if !self.object.is_empty() {
            let object_node_id = self.object_node_id();
            let node_type = self.object_node_type();
            elements.push(Element::node(
                data_from([
                    ("id", Value::from(object_node_id.as_str())),
                    ("label", Value::from(self.object_name.as_str())),
                    ("type", Value::from(node_type.as_str())),
                    ("object_iri", Value::from(self.object.as_str())),
                    ("object_name", Value::from(self.object_name.as_str())),
                    ("object_id", Value::from(self.object_id())),
                ]),
                Self::object_classes(node_type),
            ));
            elements.push(Element::edge(edge_data(
                format!("{}_{}", ke, object_node_id),
                &self.ke_uri,
                &object_node_id,
                EdgeType::Involves.as_str(),
                EdgeType::Involves,
            )));
        }

        elements
    }

    fn from_elements(elements: &[Element]) -> Vec<Self> {
        let processes = nodes_by_type(elements, &[NodeType::ComponentProcess]);
        let objects = nodes_by_type(
            elements,
            &[
                NodeType::ComponentObject,
                NodeType::Organ,
                NodeType::Cell,
                NodeType::Protein,
                NodeType::CellularComponent,
            ],
        );

        let mut ke_objects: HashMap<&str, &Element> = HashMap::new();
        for edge in edges_by_type(elements, EdgeType::Involves) {
            let source = data_str(edge, "source");
            if !is_ke_uri(source) {
                continue;
            }
            if let Some(&object) = objects.get(data_str(edge, "target")) {
                ke_objects.insert(source, object);
            }
        }

        let mut associations = Vec::new();
        for edge in edges_by_type(elements, EdgeType::HasProcess) {
            let source = data_str(edge, "source");
            let Some(process) = processes.get(data_str(edge, "target")) else {
                continue;
            };
            if !is_ke_uri(source) {
                continue;
            }

            let object = ke_objects.get(source).map(|o| &o.data);
            let object_field = |key: &str, fallback: &str| {
                object.map(|d| str_or(d, key, fallback)).unwrap_or("").to_string()
            };

            let assoc = ComponentAssociation {
                ke_uri: source.to_string(),
                ke_name: String::new(),
                process: data_str(&process.data, "process_iri").to_string(),
                process_name: str_or(&process.data, "process_name", "label").to_string(),
                object: object_field("object_iri", "object_iri"),
                object_name: object_field("object_name", "label"),
                action: data_str(edge, "label").to_string(),
                object_type: object_field("type", "type"),
            };
            associations.extend(assoc.validated().ok());
        }

        associations
    }
}

/// A chemical stressor of an AOP.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompoundAssociation {
    pub aop_uri: String,
    pub mie_uri: String,
    pub chemical_uri: String,
    pub chemical_label: String,
    pub pubchem_compound: String,
    pub compound_name: String,
    pub cas_id: Option<String>,
}

impl CompoundAssociation {
    pub fn validated(self) -> Result<Self, ModelError> {
        if self.aop_uri.is_empty() || self.chemical_uri.is_empty() {
            return Err(ModelError::MissingField("AOP URI and chemical URI"));
        }
        Ok(self)
    }

    pub fn pubchem_id(&self) -> &str {
        id_from_uri(&self.pubchem_compound)
    }

    pub fn node_id(&self) -> String {
        format!("chemical_{}", self.pubchem_id())
    }

    /// Compound name, falling back to the chemical label.
    pub fn display_name(&self) -> &str {
        if self.compound_name.is_empty() {
            &self.chemical_label
        } else {
            &self.compound_name
        }
    }
}

impl Association for CompoundAssociation {
    fn to_elements(&self) -> Vec<Element> {
        let node_id = self.node_id();
        let cas = self
            .cas_id
            .as_deref()
            .map(Value::from)
            .unwrap_or(Value::Null);

        let mut elements = vec![Element::node(
            data_from([
                ("id", Value::from(node_id.as_str())),
                ("label", Value::from(self.display_name())),
                ("type", Value::from(NodeType::Chemical.as_str())),
                ("pubchem_id", Value::from(self.pubchem_id())),
                ("cas_id", cas),
                ("chemical_label", Value::from(self.chemical_label.as_str())),
                ("compound_name", Value::from(self.compound_name.as_str())),
                ("pubchem_compound", Value::from(self.pubchem_compound.as_str())),
                ("aop_uri", Value::from(self.aop_uri.as_str())),
                ("chemical_uri", Value::from(self.chemical_uri.as_str())),
            ]),
            "chemical-node",
        )];

        if !self.mie_uri.is_empty() {
            let label = EdgeType::IsStressorOf.as_str();
            elements.push(Element::edge(edge_data(
                format!("{}_{}", node_id, self.mie_uri),
                &node_id,
                &self.mie_uri,
                label,
                EdgeType::IsStressorOf,
            )));
        }

        elements
    }

    fn from_elements(elements: &[Element]) -> Vec<Self> {
        let chemicals = nodes_by_type(elements, &[NodeType::Chemical]);

        edges_by_type(elements, EdgeType::IsStressorOf)
            .into_iter()
            .filter_map(|edge| {
                let target = data_str(edge, "target");
                if !is_ke_uri(target) {
                    return None;
                }
                let chem = &chemicals.get(data_str(edge, "source"))?.data;
                let aop_uri = data_str(chem, "aop_uri");
                if aop_uri.is_empty() {
                    return None;
                }

                CompoundAssociation {
                    aop_uri: aop_uri.to_string(),
                    mie_uri: target.to_string(),
                    chemical_uri: data_str(chem, "chemical_uri").to_string(),
                    chemical_label: str_or(chem, "chemical_label", "label").to_string(),
                    pubchem_compound: data_str(chem, "pubchem_compound").to_string(),
                    compound_name: str_or(chem, "compound_name", "label").to_string(),
                    cas_id: chem.get("cas_id").and_then(Value::as_str).map(str::to_string),
                }
                .validated()
                .ok()
            })
            .collect()
    }
}

/// Expression of a gene in an anatomical entity, as reported by Bgee.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeneExpressionAssociation {
    pub gene_id: String,
    pub anatomical_id: String,
    pub anatomical_name: String,
    pub expression_level: String,
    pub confidence_id: String,
    pub confidence_level_name: String,
    pub developmental_id: String,
    pub developmental_stage_name: String,
    pub expr: String,
}

impl GeneExpressionAssociation {
    pub fn validated(self) -> Result<Self, ModelError> {
        if self.gene_id.is_empty() || self.anatomical_id.is_empty() {
            return Err(ModelError::MissingField("Gene ID and anatomical ID"));
        }
        Ok(self)
    }

    pub fn edge_id(&self) -> String {
        format!("gene_{}_{}_expression", self.gene_id, self.anatomical_id)
    }
}

impl Association for GeneExpressionAssociation {
    fn to_elements(&self) -> Vec<Element> {
        let organ_node_id = self.anatomical_id.as_str();
        let gene_node_id = format!("gene_{}", self.gene_id);

        let mut edge = edge_data(
            self.edge_id(),
            &gene_node_id,
            organ_node_id,
            &format!("expressed in ({})", self.expression_level),
            EdgeType::ExpressionIn,
        );
        edge.insert(
            "expression_level".to_string(),
            Value::from(self.expression_level.as_str()),
        );
        edge.insert(
            "confidence_level".to_string(),
            Value::from(self.confidence_level_name.as_str()),
        );
        edge.insert(
            "developmental_stage".to_string(),
            Value::from(self.developmental_stage_name.as_str()),
        );

        vec![
            Element::node(
                data_from([
                    ("id", Value::from(organ_node_id)),
                    ("label", Value::from(self.anatomical_name.as_str())),
                    ("type", Value::from(NodeType::Organ.as_str())),
                    ("anatomical_id", Value::from(organ_node_id)),
                    ("anatomical_name", Value::from(self.anatomical_name.as_str())),
                ]),
                "organ-node",
            ),
            Element::edge(edge),
        ]
    }

    fn from_elements(elements: &[Element]) -> Vec<Self> {
        let genes = nodes_by_type(elements, &[NodeType::Gene]);
        let organs = nodes_by_type(elements, &[NodeType::Organ]);

        edges_by_type(elements, EdgeType::ExpressionIn)
            .into_iter()
            .filter_map(|edge| {
                let gene = &genes.get(data_str(edge, "source"))?.data;
                let organ = &organs.get(data_str(edge, "target"))?.data;

                GeneExpressionAssociation {
                    gene_id: str_or(gene, "gene_id", "label").to_string(),
                    anatomical_id: str_or(organ, "anatomical_id", "id").to_string(),
                    anatomical_name: str_or(organ, "anatomical_name", "label").to_string(),
                    expression_level: data_str(edge, "expression_level").to_string(),
                    confidence_level_name: data_str(edge, "confidence_level").to_string(),
                    developmental_stage_name: data_str(edge, "developmental_stage").to_string(),
                    ..Default::default()
                }
                .validated()
                .ok()
            })
            .collect()
    }
}

/// An organ context of a key event.
#[derive(Debug, Clone, PartialEq)]
pub struct OrganAssociation {
    pub ke_uri: String,
    pub organ: CytoscapeNode,
    pub edge: CytoscapeEdge,
}

impl OrganAssociation {
    pub fn new(
        ke_uri: impl Into<String>,
        organ: CytoscapeNode,
        edge: CytoscapeEdge,
    ) -> Result<Self, ModelError> {
        let ke_uri = ke_uri.into();
        if ke_uri.is_empty() {
            return Err(ModelError::MissingField("KE URI"));
        }
        Ok(Self { ke_uri, organ, edge })
    }

    /// Link a key event to an organ URI.
    pub fn from_uri(ke_uri: &str, organ_uri: &str, organ_name: &str) -> Result<Self, ModelError> {
        let label = if organ_name.is_empty() {
            id_from_uri(organ_uri)
        } else {
            organ_name
        };
        let organ = CytoscapeNode::new(
            organ_uri,
            label,
            NodeType::Organ.as_str(),
            "organ-node",
            data_from([
                ("anatomical_id", Value::from(organ_uri)),
                ("anatomical_name", Value::from(organ_name)),
            ]),
        );
        let edge = CytoscapeEdge::new(
            format!("{}_{}", ke_uri, organ_uri),
            ke_uri,
            organ_uri,
            EdgeType::ASSOCIATED_WITH.as_str(),
            data_from([("type", Value::from(EdgeType::ASSOCIATED_WITH.as_str()))]),
        );
        Self::new(ke_uri, organ, edge)
    }

    /// Organ name used for expression lookups.
    pub fn organ_name(&self) -> &str {
        match self.organ.property("anatomical_name") {
            "" => &self.organ.label,
            name => name,
        }
    }
}

impl Association for OrganAssociation {
    fn to_elements(&self) -> Vec<Element> {
        vec![self.organ.to_element(), self.edge.to_element()]
    }

    /// Organ-typed component objects also hang off `involves` edges; they
    /// carry an `object_iri` and belong to component associations instead.
    fn from_elements(elements: &[Element]) -> Vec<Self> {
        let organs = nodes_by_type(elements, &[NodeType::Organ]);

        elements
            .iter()
            .filter(|e| e.is_edge() && e.type_str() == EdgeType::ASSOCIATED_WITH.as_str())
            .filter_map(|edge_el| {
                let source = edge_el.str("source");
                if !is_ke_uri(source) {
                    return None;
                }
                let organ_el = organs.get(edge_el.str("target"))?;
                if organ_el.data.contains_key("object_iri") {
                    return None;
                }
                let organ = CytoscapeNode::from_element(organ_el)?;
                let edge = CytoscapeEdge::from_element(edge_el)?;
                Self::new(source, organ, edge).ok()
            })
            .collect()
    }
}
