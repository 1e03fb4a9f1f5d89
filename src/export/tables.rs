//! Tabular views of a network.
//!
//! Every table is a list of serializable rows, so they can be written as
//! JSON or rendered into the Markdown report.

use crate::model::aop::{AopInfo, KeyEvent};
use crate::model::associations::{ComponentAssociation, GeneExpressionAssociation, OrganAssociation};
use crate::model::network::AopNetwork;
use crate::model::types::NodeType;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, info, warn};

const NA: &str = "N/A";

fn or_na(value: &str) -> String {
    if value.is_empty() {
        NA.to_string()
    } else {
        value.to_string()
    }
}

/// One row per KER, then one per key event outside every KER.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AopRow {
    pub source_id: String,
    pub source_label: String,
    pub source_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ker_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curie: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
    pub aop_list: String,
    pub aop_titles: String,
    pub is_connected: bool,
}

/// Sorted `AOP:<id>` list and sorted titles of a set of AOPs.
fn aop_columns<'a>(aops: impl Iterator<Item = &'a AopInfo>, empty: &str) -> (String, String) {
    let mut ids = BTreeSet::new();
    let mut titles = BTreeSet::new();
    for aop in aops {
        ids.insert(format!("AOP:{}", aop.aop_id));
        titles.insert(aop.title.as_str());
    }
    if ids.is_empty() {
        return (empty.to_string(), empty.to_string());
    }
    (
        ids.into_iter().collect::<Vec<_>>().join(","),
        titles.into_iter().collect::<Vec<_>>().join("; "),
    )
}

pub fn aop_table(network: &AopNetwork) -> Vec<AopRow> {
    let mut rows = Vec::new();
    let mut connected = HashSet::new();

    for rel in network.relationships() {
        // the network's copy carries AOPs merged after the KER was stored
        let up = network.key_event(&rel.upstream.uri).unwrap_or(&rel.upstream);
        let down = network.key_event(&rel.downstream.uri).unwrap_or(&rel.downstream);
        connected.insert(up.uri.as_str());
        connected.insert(down.uri.as_str());

        let (aop_list, aop_titles) = aop_columns(
            up.associated_aops.iter().chain(&down.associated_aops),
            NA,
        );
        rows.push(AopRow {
            source_id: up.uri.clone(),
            source_label: up.title.clone(),
            source_type: up.ke_type.to_string(),
            ker_label: Some(rel.ker_id.clone()),
            curie: Some(format!("aop.relationships:{}", rel.ker_id)),
            target_id: Some(down.uri.clone()),
            target_label: Some(down.title.clone()),
            target_type: Some(down.ke_type.to_string()),
            aop_list,
            aop_titles,
            is_connected: true,
        });
    }

    for ke in network.key_events() {
        if connected.contains(ke.uri.as_str()) {
            continue;
        }
        let (aop_list, aop_titles) = aop_columns(ke.associated_aops.iter(), "");
        rows.push(AopRow {
            source_id: ke.uri.clone(),
            source_label: ke.title.clone(),
            source_type: ke.ke_type.to_string(),
            ker_label: None,
            curie: None,
            target_id: None,
            target_label: None,
            target_type: None,
            aop_list,
            aop_titles,
            is_connected: false,
        });
    }

    debug!("Built AOP table with {} rows", rows.len());
    rows
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionProcess {
    pub action: String,
    pub process_id: String,
    pub process_name: String,
    pub process_iri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganEntry {
    pub organ_id: String,
    pub organ_name: String,
    pub organ_iri: String,
}

/// Components and organs of one key event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentTableRow {
    pub ke_id: String,
    pub ke_number: String,
    pub ke_uri: String,
    pub ke_name: String,
    pub action_processes: Vec<ActionProcess>,
    pub organs: Vec<OrganEntry>,
    pub action_process_count: usize,
    pub organ_count: usize,
}

fn component_row(
    ke: &KeyEvent,
    components: &[&ComponentAssociation],
    organ_associations: &[&OrganAssociation],
) -> ComponentTableRow {
    let action_processes: Vec<ActionProcess> = components
        .iter()
        .map(|c| ActionProcess {
            action: if c.action.is_empty() {
                "has_process".to_string()
            } else {
                c.action.clone()
            },
            process_id: c.process_node_id(),
            process_name: c.process_name.clone(),
            process_iri: c.process.clone(),
        })
        .collect();

    let mut organs = Vec::new();
    let mut seen = HashSet::new();
    for c in components {
        if c.object.is_empty() || c.object_node_type() != NodeType::Organ {
            continue;
        }
        if seen.insert(c.object_id().to_string()) {
            organs.push(OrganEntry {
                organ_id: c.object_node_id(),
                organ_name: c.object_name.clone(),
                organ_iri: c.object.clone(),
            });
        }
    }
    for assoc in organ_associations {
        let organ = &assoc.organ;
        if seen.insert(organ.id.clone()) {
            let iri = match organ.property("anatomical_id") {
                "" => organ.id.as_str(),
                iri => iri,
            };
            organs.push(OrganEntry {
                organ_id: organ.id.clone(),
                organ_name: assoc.organ_name().to_string(),
                organ_iri: iri.to_string(),
            });
        }
    }

    ComponentTableRow {
        ke_id: format!("aop.events_{}", ke.ke_id),
        ke_number: ke.ke_id.clone(),
        ke_uri: ke.uri.clone(),
        ke_name: ke.title.clone(),
        action_process_count: action_processes.len(),
        organ_count: organs.len(),
        action_processes,
        organs,
    }
}

pub fn component_table(network: &AopNetwork) -> Vec<ComponentTableRow> {
    let mut components: HashMap<&str, Vec<&ComponentAssociation>> = HashMap::new();
    let mut organs: HashMap<&str, Vec<&OrganAssociation>> = HashMap::new();
    // first-seen order of associated KEs, used to report unknown ones
    let mut associated: Vec<&str> = Vec::new();

    for assoc in &network.component_associations {
        if !components.contains_key(assoc.ke_uri.as_str()) && !organs.contains_key(assoc.ke_uri.as_str()) {
            associated.push(&assoc.ke_uri);
        }
        components.entry(&assoc.ke_uri).or_default().push(assoc);
    }
    for assoc in &network.organ_associations {
        if !components.contains_key(assoc.ke_uri.as_str()) && !organs.contains_key(assoc.ke_uri.as_str()) {
            associated.push(&assoc.ke_uri);
        }
        organs.entry(&assoc.ke_uri).or_default().push(assoc);
    }

    for uri in &associated {
        if network.key_event(uri).is_none() {
            warn!("KE not found for URI: {}", uri);
        }
    }

    let rows: Vec<ComponentTableRow> = network
        .key_events()
        .iter()
        .filter(|ke| associated.contains(&ke.uri.as_str()))
        .map(|ke| {
            let c = components.get(ke.uri.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            let o = organs.get(ke.uri.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            component_row(ke, c, o)
        })
        .collect();

    info!("Built component table with {} entries", rows.len());
    rows
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompoundRow {
    pub compound_name: String,
    pub chemical_label: String,
    pub pubchem_id: String,
    pub pubchem_compound: String,
    pub cas_id: String,
    pub chemical_uri: String,
    pub smiles: String,
    pub node_id: String,
}

pub fn compound_table(network: &AopNetwork) -> Vec<CompoundRow> {
    let mut seen = HashSet::new();
    let rows: Vec<CompoundRow> = network
        .compound_associations
        .iter()
        .filter(|c| seen.insert(format!("{}_{}", c.display_name(), c.pubchem_id())))
        .map(|c| CompoundRow {
            compound_name: c.display_name().to_string(),
            chemical_label: c.chemical_label.clone(),
            pubchem_id: c.pubchem_id().to_string(),
            pubchem_compound: c.pubchem_compound.clone(),
            cas_id: c.cas_id.as_deref().map(or_na).unwrap_or_else(|| NA.to_string()),
            chemical_uri: c.chemical_uri.clone(),
            smiles: String::new(),
            node_id: c.node_id(),
        })
        .collect();

    info!("Built compound table with {} entries", rows.len());
    rows
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneRow {
    pub gene: String,
    pub protein: String,
    pub protein_id: String,
    pub gene_id: String,
    pub protein_node_id: String,
    pub expression_organs: String,
    pub expression_levels: String,
    pub expression_confidence: String,
    pub expression_ids: String,
}

pub fn gene_table(network: &AopNetwork) -> Vec<GeneRow> {
    // (gene, protein) pairs: gene associations first, then genes only seen in
    // expression results
    let mut pairs: Vec<(&str, Option<&str>)> = Vec::new();
    let mut seen_genes = HashSet::new();
    for assoc in &network.gene_associations {
        pairs.push((&assoc.gene_id, assoc.protein()));
        seen_genes.insert(assoc.gene_id.as_str());
    }
    for expr in &network.gene_expression_associations {
        if seen_genes.insert(expr.gene_id.as_str()) {
            pairs.push((&expr.gene_id, None));
        }
    }

    let mut seen_rows = HashSet::new();
    let mut rows = Vec::new();
    for (gene, protein) in pairs {
        let expressions: Vec<_> = network
            .gene_expression_associations
            .iter()
            .filter(|e| e.gene_id == gene)
            .collect();
        let joined = |f: fn(&GeneExpressionAssociation) -> &str| {
            if expressions.is_empty() {
                NA.to_string()
            } else {
                expressions.iter().map(|e| f(e)).collect::<Vec<_>>().join("; ")
            }
        };

        let row = GeneRow {
            gene: gene.to_string(),
            protein: or_na(protein.unwrap_or("")),
            protein_id: or_na(protein.unwrap_or("")),
            gene_id: format!("gene_{}", gene),
            protein_node_id: protein
                .map(|p| format!("protein_{}", p))
                .unwrap_or_else(|| NA.to_string()),
            expression_organs: joined(|e| &e.anatomical_name),
            expression_levels: joined(|e| &e.expression_level),
            expression_confidence: joined(|e| &e.confidence_level_name),
            expression_ids: joined(|e| if e.expr.is_empty() { NA } else { e.expr.as_str() }),
        };

        if seen_rows.insert(format!("{}_{}_{}", row.gene, row.protein, row.protein_id)) {
            rows.push(row);
        }
    }

    info!("Built gene table with {} entries", rows.len());
    rows
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneExpressionRow {
    pub gene_id: String,
    pub gene_label: String,
    pub organ: String,
    pub organ_id: String,
    pub expression_level: String,
    pub confidence: String,
    pub developmental_stage: String,
    pub expr_id: String,
}

pub fn gene_expression_table(network: &AopNetwork) -> Vec<GeneExpressionRow> {
    let mut seen = HashSet::new();
    let rows: Vec<GeneExpressionRow> = network
        .gene_expression_associations
        .iter()
        .filter(|e| seen.insert(format!("{}_{}", e.gene_id, e.anatomical_id)))
        .map(|e| GeneExpressionRow {
            gene_id: e.gene_id.clone(),
            gene_label: e.gene_id.clone(),
            organ: e.anatomical_name.clone(),
            organ_id: e.anatomical_id.clone(),
            expression_level: e.expression_level.clone(),
            confidence: e.confidence_level_name.clone(),
            developmental_stage: e.developmental_stage_name.clone(),
            expr_id: or_na(&e.expr),
        })
        .collect();

    info!("Built gene expression table with {} entries", rows.len());
    rows
}

/// All tables of a network, as written by `--format tables`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkTables {
    pub aop: Vec<AopRow>,
    pub components: Vec<ComponentTableRow>,
    pub compounds: Vec<CompoundRow>,
    pub genes: Vec<GeneRow>,
    pub gene_expression: Vec<GeneExpressionRow>,
}

impl NetworkTables {
    pub fn build(network: &AopNetwork) -> Self {
        Self {
            aop: aop_table(network),
            components: component_table(network),
            compounds: compound_table(network),
            genes: gene_table(network),
            gene_expression: gene_expression_table(network),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::aop::KeyEventRelationship;
    use crate::model::associations::{CompoundAssociation, GeneAssociation};
    use crate::model::types::id_from_uri;

    const MIE: &str = "https://identifiers.org/aop.events/1";
    const KE: &str = "https://identifiers.org/aop.events/2";
    const AO: &str = "https://identifiers.org/aop.events/3";

    fn key_event(uri: &str, title: &str, ke_type: NodeType, aops: &[(&str, &str)]) -> KeyEvent {
        let mut ke = KeyEvent::new(id_from_uri(uri), uri, title, ke_type).unwrap();
        for (id, title) in aops {
            ke.add_aop(AopInfo::new(*id, *title, format!("https://identifiers.org/aop/{}", id)).unwrap());
        }
        ke
    }

    fn network() -> AopNetwork {
        let mut network = AopNetwork::new();
        let mie = key_event(MIE, "Receptor binding", NodeType::Mie, &[("3", "Zeta"), ("1", "Alpha")]);
        let ke = key_event(KE, "Cell death", NodeType::Ke, &[("3", "Zeta")]);
        network.add_relationship(
            KeyEventRelationship::new("10", "https://identifiers.org/aop.relationships/10", mie, ke)
                .unwrap(),
        );
        network.add_key_event(key_event(AO, "Liver failure", NodeType::Ao, &[]));
        network
    }

    #[test]
    fn test_aop_table() {
        let rows = aop_table(&network());
        assert_eq!(rows.len(), 2);

        let ker = &rows[0];
        assert!(ker.is_connected);
        assert_eq!(ker.curie.as_deref(), Some("aop.relationships:10"));
        assert_eq!(ker.aop_list, "AOP:1,AOP:3");
        assert_eq!(ker.aop_titles, "Alpha; Zeta");
        assert_eq!(ker.target_type.as_deref(), Some("ke"));

        let lone = &rows[1];
        assert!(!lone.is_connected);
        assert_eq!(lone.source_id, AO);
        assert_eq!(lone.aop_list, "");

        let json = serde_json::to_value(lone).unwrap();
        assert!(json.get("target_id").is_none());
    }

    #[test]
    fn test_aop_table_uses_merged_key_event_aops() {
        let mut network = AopNetwork::new();
        for aop in ["10", "12"] {
            let up = key_event(MIE, "Receptor binding", NodeType::Mie, &[(aop, "Pathway")]);
            let down = key_event(KE, "Cell death", NodeType::Ke, &[(aop, "Pathway")]);
            network.add_relationship(
                KeyEventRelationship::new("100", "https://identifiers.org/aop.relationships/100", up, down)
                    .unwrap(),
            );
        }

        let rows = aop_table(&network);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].aop_list, "AOP:10,AOP:12");
        assert_eq!(network.key_event(MIE).unwrap().aop_ids(), vec!["10", "12"]);
    }

    #[test]
    fn test_component_table() {
        let mut network = network();
        network.add_component_association(ComponentAssociation {
            ke_uri: KE.to_string(),
            ke_name: "Cell death".to_string(),
            process: "http://purl.obolibrary.org/obo/GO_0008219".to_string(),
            process_name: "cell death".to_string(),
            object: "http://purl.obolibrary.org/obo/UBERON_0002107".to_string(),
            object_name: "liver".to_string(),
            action: String::new(),
            object_type: String::new(),
        });
        network.add_organ_association(
            OrganAssociation::from_uri(KE, "http://purl.obolibrary.org/obo/UBERON_0000955", "brain")
                .unwrap(),
        );
        network.add_organ_association(
            OrganAssociation::from_uri(
                "https://identifiers.org/aop.events/999",
                "http://purl.obolibrary.org/obo/UBERON_0000955",
                "brain",
            )
            .unwrap(),
        );

        let rows = component_table(&network);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.ke_id, "aop.events_2");
        assert_eq!(row.action_processes[0].action, "has_process");
        assert_eq!(row.action_processes[0].process_id, "process_GO_0008219");
        assert_eq!(row.organ_count, 2);
        assert_eq!(row.organs[0].organ_id, "object_UBERON_0002107");
        assert_eq!(row.organs[1].organ_name, "brain");
    }

    #[test]
    fn test_compound_table_dedupes() {
        let mut network = network();
        let compound = CompoundAssociation {
            aop_uri: "https://identifiers.org/aop/3".to_string(),
            mie_uri: MIE.to_string(),
            chemical_uri: "https://identifiers.org/aop.stressor/1".to_string(),
            chemical_label: "Aspirin".to_string(),
            pubchem_compound: "https://identifiers.org/pubchem.compound/2244".to_string(),
            compound_name: "Aspirin".to_string(),
            cas_id: None,
        };
        network.add_compound_association(compound.clone());
        network.add_compound_association(CompoundAssociation {
            aop_uri: "https://identifiers.org/aop/1".to_string(),
            ..compound
        });

        let rows = compound_table(&network);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cas_id, "N/A");
        assert_eq!(rows[0].node_id, "chemical_2244");
    }

    #[test]
    fn test_gene_tables() {
        let mut network = network();
        network.add_gene_association(
            GeneAssociation::new(KE, "TP53", Some("P04637".to_string())).unwrap(),
        );
        network.add_gene_association(GeneAssociation::new(MIE, "TP53", Some("P04637".to_string())).unwrap());
        network.add_gene_association(GeneAssociation::new(KE, "MDM2", None).unwrap());
        for (gene, organ) in [("TP53", "liver"), ("TP53", "brain"), ("BAX", "liver")] {
            network.add_gene_expression_association(GeneExpressionAssociation {
                gene_id: gene.to_string(),
                anatomical_id: format!("http://example.org/{}", organ),
                anatomical_name: organ.to_string(),
                expression_level: "50".to_string(),
                confidence_level_name: "high".to_string(),
                ..Default::default()
            });
        }

        let genes = gene_table(&network);
        assert_eq!(genes.len(), 3);
        assert_eq!(genes[0].protein_node_id, "protein_P04637");
        assert_eq!(genes[0].expression_organs, "liver; brain");
        assert_eq!(genes[0].expression_ids, "N/A; N/A");
        assert_eq!(genes[1].protein, "N/A");
        assert_eq!(genes[1].expression_levels, "N/A");
        assert_eq!(genes[2].gene, "BAX");

        let expression = gene_expression_table(&network);
        assert_eq!(expression.len(), 3);
        assert_eq!(expression[0].expr_id, "N/A");
    }
}
