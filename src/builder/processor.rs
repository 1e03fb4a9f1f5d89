//! Turn SPARQL result rows into domain records.

use crate::model::aop::{AopInfo, KeyEvent, KeyEventRelationship};
use crate::model::associations::{
    ComponentAssociation, CompoundAssociation, GeneAssociation, GeneExpressionAssociation,
    OrganAssociation,
};
use crate::model::types::{id_from_uri, NodeType};
use crate::query::results::Binding;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Key events, relationships and AOPs found in a pathway query result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedPathways {
    pub key_events: Vec<KeyEvent>,
    pub relationships: Vec<KeyEventRelationship>,
    pub aop_infos: Vec<AopInfo>,
}

/// Processes rows of the pathway query.
#[derive(Debug, Default)]
pub struct AopBindingProcessor {
    key_events: Vec<KeyEvent>,
    index: HashMap<String, usize>,
    aop_infos: Vec<AopInfo>,
    // (KER uri, upstream uri, downstream uri)
    ker_triples: Vec<(String, String, String)>,
}

impl AopBindingProcessor {
    pub fn process(bindings: &[Binding]) -> ProcessedPathways {
        let mut processor = Self::default();
        for binding in bindings {
            processor.process_row(binding);
        }
        processor.finish()
    }

    fn process_row(&mut self, binding: &Binding) {
        let aop = Self::aop_info(binding);
        if let Some(info) = &aop {
            if !self.aop_infos.contains(info) {
                self.aop_infos.push(info.clone());
            }
        }

        let mie_uri = binding.value("MIE");
        let ao_uri = binding.value("ao");
        self.key_event(binding, "MIE", "MIEtitle", NodeType::Mie, aop.as_ref());
        self.key_event(binding, "ao", "ao_title", NodeType::Ao, aop.as_ref());

        let upstream = binding.value("KE_upstream");
        let downstream = binding.value("KE_downstream");
        if !upstream.is_empty() && upstream != mie_uri && upstream != ao_uri {
            self.key_event(binding, "KE_upstream", "KE_upstream_title", NodeType::Ke, aop.as_ref());
        }
        if !downstream.is_empty() && downstream != mie_uri && downstream != ao_uri {
            self.key_event(
                binding,
                "KE_downstream",
                "KE_downstream_title",
                NodeType::Ke,
                aop.as_ref(),
            );
        }

        let ker = binding.value("KER");
        if !ker.is_empty() && !upstream.is_empty() && !downstream.is_empty() {
            let triple = (ker.to_string(), upstream.to_string(), downstream.to_string());
            if !self.ker_triples.contains(&triple) {
                self.ker_triples.push(triple);
            }
        }
    }

    fn aop_info(binding: &Binding) -> Option<AopInfo> {
        let uri = binding.value("aop");
        let title = binding.value("aop_title");
        if uri.is_empty() || title.is_empty() {
            return None;
        }
        AopInfo::from_uri(uri, title).ok()
    }

    fn key_event(
        &mut self,
        binding: &Binding,
        uri_key: &str,
        title_key: &str,
        ke_type: NodeType,
        aop: Option<&AopInfo>,
    ) {
        let uri = binding.value(uri_key);
        if uri.is_empty() {
            return;
        }

        if let Some(&idx) = self.index.get(uri) {
            if let Some(info) = aop {
                self.key_events[idx].add_aop(info.clone());
            }
            return;
        }

        let title = match binding.value(title_key) {
            "" => "NA",
            t => t,
        };
        match KeyEvent::new(id_from_uri(uri), uri, title, ke_type) {
            Ok(mut key_event) => {
                if let Some(info) = aop {
                    key_event.add_aop(info.clone());
                }
                self.index.insert(uri.to_string(), self.key_events.len());
                self.key_events.push(key_event);
            }
            Err(e) => warn!("Skipping key event {}: {}", uri, e),
        }
    }

    /// Relationships are built last so both ends carry every AOP seen.
    fn finish(self) -> ProcessedPathways {
        let mut relationships = Vec::new();
        for (ker_uri, upstream, downstream) in &self.ker_triples {
            let (Some(&up), Some(&down)) = (self.index.get(upstream), self.index.get(downstream))
            else {
                debug!("KER {} references an unknown key event", ker_uri);
                continue;
            };
            match KeyEventRelationship::new(
                id_from_uri(ker_uri),
                ker_uri.as_str(),
                self.key_events[up].clone(),
                self.key_events[down].clone(),
            ) {
                Ok(rel) => relationships.push(rel),
                Err(e) => warn!("Skipping KER {}: {}", ker_uri, e),
            }
        }

        ProcessedPathways {
            key_events: self.key_events,
            relationships,
            aop_infos: self.aop_infos,
        }
    }
}

/// Converts association query rows. Invalid rows are logged and dropped.
pub struct AssociationProcessor;

impl AssociationProcessor {
    pub fn genes(bindings: &[Binding], include_proteins: bool) -> Vec<GeneAssociation> {
        bindings
            .iter()
            .filter_map(|b| {
                let protein = include_proteins
                    .then(|| b.value("protein"))
                    .filter(|p| !p.is_empty())
                    .map(str::to_string);
                GeneAssociation::new(b.value("ke"), b.value("gene"), protein)
                    .map_err(|e| debug!("Skipping gene row: {}", e))
                    .ok()
            })
            .collect()
    }

    pub fn compounds(bindings: &[Binding]) -> Vec<CompoundAssociation> {
        bindings
            .iter()
            .filter(|b| !b.value("pubchem_compound").is_empty())
            .filter_map(|b| {
                let cid = b.value("cid");
                CompoundAssociation {
                    aop_uri: b.value("aop").to_string(),
                    mie_uri: b.value("mie").to_string(),
                    chemical_uri: b.value("chemical").to_string(),
                    chemical_label: b.value("compound_name").to_string(),
                    pubchem_compound: b.value("pubchem_compound").to_string(),
                    compound_name: b.value("compound_name").to_string(),
                    cas_id: (!cid.is_empty()).then(|| cid.to_string()),
                }
                .validated()
                .map_err(|e| debug!("Skipping compound row: {}", e))
                .ok()
            })
            .collect()
    }

    pub fn components(bindings: &[Binding]) -> Vec<ComponentAssociation> {
        bindings
            .iter()
            .filter(|b| !b.value("process").is_empty())
            .filter_map(|b| {
                let ke_name = match b.value("keTitle") {
                    "" => b.value("ke_name"),
                    title => title,
                };
                ComponentAssociation {
                    ke_uri: b.value("ke").to_string(),
                    ke_name: ke_name.to_string(),
                    process: b.value("process").to_string(),
                    process_name: b.value("processName").to_string(),
                    object: b.value("object").to_string(),
                    object_name: b.value("objectName").to_string(),
                    action: b.value("action").to_string(),
                    object_type: b.value("objectType").to_string(),
                }
                .validated()
                .map_err(|e| debug!("Skipping component row: {}", e))
                .ok()
            })
            .collect()
    }

    pub fn organs(bindings: &[Binding]) -> Vec<OrganAssociation> {
        bindings
            .iter()
            .filter(|b| !b.value("ke").is_empty() && !b.value("organ").is_empty())
            .filter_map(|b| {
                OrganAssociation::from_uri(b.value("ke"), b.value("organ"), b.value("organ_name"))
                    .map_err(|e| debug!("Skipping organ row: {}", e))
                    .ok()
            })
            .collect()
    }

    pub fn gene_expressions(bindings: &[Binding]) -> Vec<GeneExpressionAssociation> {
        let mut seen = HashSet::new();
        bindings
            .iter()
            .filter(|b| !b.value("gene_id").is_empty())
            .filter_map(|b| {
                GeneExpressionAssociation {
                    gene_id: b.value("gene_id").to_string(),
                    anatomical_id: b.value("anatomical_entity_id").to_string(),
                    anatomical_name: b.value("anatomical_entity_name").to_string(),
                    expression_level: b.value("expression_level").to_string(),
                    confidence_id: b.value("confidence_level_id").to_string(),
                    confidence_level_name: b.value("confidence_level_name").to_string(),
                    developmental_id: b.value("developmental_stage_id").to_string(),
                    developmental_stage_name: b.value("developmental_stage_name").to_string(),
                    expr: b.value("expr").to_string(),
                }
                .validated()
                .map_err(|e| warn!("Failed to process gene expression result: {}", e))
                .ok()
            })
            .filter(|a| seen.insert(a.expr.clone()) || a.expr.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AOP: &str = "https://identifiers.org/aop/3";
    const MIE: &str = "https://identifiers.org/aop.events/1";
    const KE: &str = "https://identifiers.org/aop.events/2";
    const AO: &str = "https://identifiers.org/aop.events/3";

    fn pathway_row(aop: &str, up: &str, down: &str, ker: &str) -> Binding {
        [
            ("aop", aop),
            ("aop_title", "Test pathway"),
            ("MIE", MIE),
            ("MIEtitle", "Receptor binding"),
            ("ao", AO),
            ("ao_title", "Liver failure"),
            ("KE_upstream", up),
            ("KE_upstream_title", ""),
            ("KE_downstream", down),
            ("KE_downstream_title", "Cell death"),
            ("KER", ker),
        ]
        .into_iter()
        .filter(|(_, v)| !v.is_empty())
        .collect()
    }

    #[test]
    fn test_process_pathway_rows() {
        let rows = vec![
            pathway_row(AOP, MIE, KE, "https://identifiers.org/aop.relationships/10"),
            pathway_row(AOP, KE, AO, "https://identifiers.org/aop.relationships/11"),
            pathway_row(
                "https://identifiers.org/aop/4",
                MIE,
                KE,
                "https://identifiers.org/aop.relationships/10",
            ),
        ];

        let processed = AopBindingProcessor::process(&rows);

        assert_eq!(processed.aop_infos.len(), 2);
        assert_eq!(processed.key_events.len(), 3);
        let types: Vec<NodeType> = processed.key_events.iter().map(|k| k.ke_type).collect();
        assert_eq!(types, vec![NodeType::Mie, NodeType::Ao, NodeType::Ke]);

        let ke = &processed.key_events[2];
        assert_eq!(ke.uri, KE);
        assert_eq!(ke.title, "Cell death");
        assert_eq!(ke.aop_ids(), vec!["3", "4"]);

        assert_eq!(processed.relationships.len(), 2);
        let first = &processed.relationships[0];
        assert_eq!(first.ker_id, "10");
        // built after all rows, so both AOPs are present
        assert_eq!(first.downstream.aop_ids(), vec!["3", "4"]);
    }

    #[test]
    fn test_missing_titles_become_na() {
        let row: Binding = [("MIE", MIE), ("ao", AO), ("ao_title", "Liver failure")]
            .into_iter()
            .collect();
        let processed = AopBindingProcessor::process(&[row]);
        assert_eq!(processed.key_events[0].title, "NA");
        assert!(processed.aop_infos.is_empty());
        assert!(processed.relationships.is_empty());
    }

    #[test]
    fn test_gene_rows() {
        let rows: Vec<Binding> = vec![
            [("ke", KE), ("gene", "TP53"), ("protein", "P04637")].into_iter().collect(),
            [("ke", KE), ("gene", "MDM2")].into_iter().collect(),
            [("ke", ""), ("gene", "BAX")].into_iter().collect(),
        ];

        let with = AssociationProcessor::genes(&rows, true);
        assert_eq!(with.len(), 2);
        assert_eq!(with[0].protein(), Some("P04637"));
        assert_eq!(with[1].protein_id, None);

        let without = AssociationProcessor::genes(&rows, false);
        assert!(without.iter().all(|g| g.protein_id.is_none()));
    }

    #[test]
    fn test_compound_rows_need_pubchem() {
        let rows: Vec<Binding> = vec![
            [
                ("aop", AOP),
                ("chemical", "https://identifiers.org/aop.stressor/1"),
                ("pubchem_compound", "https://identifiers.org/pubchem.compound/2244"),
                ("compound_name", "Aspirin"),
                ("cid", "50-78-2"),
                ("mie", MIE),
            ]
            .into_iter()
            .collect(),
            [("aop", AOP), ("chemical", "https://identifiers.org/aop.stressor/2")]
                .into_iter()
                .collect(),
        ];
        let compounds = AssociationProcessor::compounds(&rows);
        assert_eq!(compounds.len(), 1);
        assert_eq!(compounds[0].cas_id.as_deref(), Some("50-78-2"));
        assert_eq!(compounds[0].pubchem_id(), "2244");
    }

    #[test]
    fn test_component_rows_without_process_are_skipped() {
        let rows: Vec<Binding> = vec![
            [
                ("ke", KE),
                ("keTitle", "Cell death"),
                ("process", "http://purl.obolibrary.org/obo/GO_0008219"),
                ("processName", "cell death"),
                ("action", "increased"),
            ]
            .into_iter()
            .collect(),
            [("ke", KE), ("object", "http://purl.obolibrary.org/obo/CL_0000182")]
                .into_iter()
                .collect(),
        ];
        let components = AssociationProcessor::components(&rows);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].ke_name, "Cell death");
        assert_eq!(components[0].process_id(), "GO_0008219");
    }

    #[test]
    fn test_organ_rows() {
        let rows: Vec<Binding> = vec![
            [
                ("ke", KE),
                ("organ", "http://purl.obolibrary.org/obo/UBERON_0002107"),
                ("organ_name", "liver"),
            ]
            .into_iter()
            .collect(),
            [("ke", KE), ("organ", "http://purl.obolibrary.org/obo/UBERON_0000955")]
                .into_iter()
                .collect(),
        ];
        let organs = AssociationProcessor::organs(&rows);
        assert_eq!(organs.len(), 2);
        assert_eq!(organs[0].organ.id, "http://purl.obolibrary.org/obo/UBERON_0002107");
        assert_eq!(organs[0].organ_name(), "liver");
        assert_eq!(organs[1].organ.label, "UBERON_0000955");
        assert_eq!(organs[0].edge.source, KE);
    }

    #[test]
    fn test_gene_expression_rows() {
        let row = |expr: &str| -> Binding {
            [
                ("gene_id", "ENSG00000141510"),
                ("anatomical_entity_id", "http://purl.obolibrary.org/obo/UBERON_0002107"),
                ("anatomical_entity_name", "liver"),
                ("expression_level", "87.5"),
                ("confidence_level_name", "high confidence"),
                ("expr", expr),
            ]
            .into_iter()
            .collect()
        };
        let rows = vec![row("http://bgee.org/expr/1"), row("http://bgee.org/expr/1")];
        let expressions = AssociationProcessor::gene_expressions(&rows);
        assert_eq!(expressions.len(), 1);
        assert_eq!(expressions[0].expression_level, "87.5");
    }
}
