//! Markdown report generation.
//!
//! The report lists the network totals followed by every non-empty table.

use crate::export::tables::{
    AopRow, ComponentTableRow, CompoundRow, GeneExpressionRow, GeneRow, NetworkTables,
};
use crate::model::network::{AopNetwork, NetworkSummary};
use chrono::{DateTime, Utc};

/// Header information for a report.
#[derive(Debug, Clone)]
pub struct ReportMetadata {
    pub title: String,
    pub description: Option<String>,
    /// How the network was obtained, e.g. the identifier query or input file.
    pub source: String,
    pub generated_at: DateTime<Utc>,
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(network: &AopNetwork, metadata: &ReportMetadata) -> String {
    let tables = NetworkTables::build(network);
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", metadata.title));
    output.push_str(&generate_metadata_section(metadata));
    output.push_str(&generate_table_of_contents(&tables));
    output.push_str(&generate_summary_section(&network.summary()));
    output.push_str(&generate_pathway_section(&tables.aop));
    output.push_str(&generate_component_section(&tables.components));
    output.push_str(&generate_compound_section(&tables.compounds));
    output.push_str(&generate_gene_section(&tables.genes));
    output.push_str(&generate_expression_section(&tables.gene_expression));
    output.push_str(&generate_footer());

    output
}

/// Table cells may not contain pipes or line breaks.
fn cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

fn table_header(columns: &[&str]) -> String {
    let mut header = format!("| {} |\n", columns.join(" | "));
    header.push('|');
    for _ in columns {
        header.push_str(":---|");
    }
    header.push('\n');
    header
}

fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if let Some(description) = &metadata.description {
        section.push_str(&format!("- **Description:** {}\n", description));
    }
    section.push('\n');

    section
}

fn generate_table_of_contents(tables: &NetworkTables) -> String {
    let mut toc = String::new();

    toc.push_str("## Table of Contents\n\n");
    toc.push_str("- [Metadata](#metadata)\n");
    toc.push_str("- [Summary](#summary)\n");
    toc.push_str("- [Pathways](#pathways)\n");
    if !tables.components.is_empty() {
        toc.push_str("- [Key Event Components](#key-event-components)\n");
    }
    if !tables.compounds.is_empty() {
        toc.push_str("- [Compounds](#compounds)\n");
    }
    if !tables.genes.is_empty() {
        toc.push_str("- [Genes](#genes)\n");
    }
    if !tables.gene_expression.is_empty() {
        toc.push_str("- [Gene Expression](#gene-expression)\n");
    }
    toc.push('\n');

    toc
}

fn generate_summary_section(summary: &NetworkSummary) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| MIEs | KEs | AOs | KERs | AOPs |\n");
    section.push_str("|:---:|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} | {} |\n\n",
        summary.mie_count, summary.ke_count, summary.ao_count, summary.ker_count, summary.total_aops
    ));

    let associations = [
        ("Genes", summary.gene_associations),
        ("Gene expression", summary.gene_expression_associations),
        ("Compounds", summary.compound_associations),
        ("Components", summary.component_associations),
        ("Organs", summary.organ_associations),
    ];
    if associations.iter().any(|(_, n)| *n > 0) {
        section.push_str("### Associations\n\n");
        section.push_str("| Kind | Count |\n");
        section.push_str("|:---|:---:|\n");
        for (kind, count) in associations.iter().filter(|(_, n)| *n > 0) {
            section.push_str(&format!("| {} | {} |\n", kind, count));
        }
        section.push('\n');
    }

    section
}

fn generate_pathway_section(rows: &[AopRow]) -> String {
    let mut section = String::new();

    section.push_str("## Pathways\n\n");
    if rows.is_empty() {
        section.push_str("The network has no key events.\n\n");
        return section;
    }

    let (connected, isolated): (Vec<_>, Vec<_>) = rows.iter().partition(|r| r.is_connected);

    if !connected.is_empty() {
        section.push_str("### Key Event Relationships\n\n");
        section.push_str(&table_header(&["Upstream", "KER", "Downstream", "AOPs"]));
        for row in connected {
            section.push_str(&format!(
                "| {} ({}) | {} | {} ({}) | {} |\n",
                cell(&row.source_label),
                row.source_type,
                row.curie.as_deref().unwrap_or(""),
                cell(row.target_label.as_deref().unwrap_or("")),
                row.target_type.as_deref().unwrap_or(""),
                row.aop_list
            ));
        }
        section.push('\n');
    }

    if !isolated.is_empty() {
        section.push_str("### Unconnected Key Events\n\n");
        section.push_str(&table_header(&["Key Event", "Type", "AOPs"]));
        for row in isolated {
            section.push_str(&format!(
                "| {} | {} | {} |\n",
                cell(&row.source_label),
                row.source_type,
                row.aop_list
            ));
        }
        section.push('\n');
    }

    section
}

fn generate_component_section(rows: &[ComponentTableRow]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Key Event Components\n\n");
    section.push_str(&table_header(&["Key Event", "Processes", "Organs"]));
    for row in rows {
        let processes: Vec<String> = row
            .action_processes
            .iter()
            .map(|p| format!("{} {}", p.action, p.process_name))
            .collect();
        let organs: Vec<&str> = row.organs.iter().map(|o| o.organ_name.as_str()).collect();
        section.push_str(&format!(
            "| {} ({}) | {} | {} |\n",
            cell(&row.ke_name),
            row.ke_id,
            cell(&processes.join("; ")),
            cell(&organs.join("; "))
        ));
    }
    section.push('\n');

    section
}

fn generate_compound_section(rows: &[CompoundRow]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Compounds\n\n");
    section.push_str(&table_header(&["Compound", "PubChem", "CAS"]));
    for row in rows {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            cell(&row.compound_name),
            row.pubchem_id,
            row.cas_id
        ));
    }
    section.push('\n');

    section
}

fn generate_gene_section(rows: &[GeneRow]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Genes\n\n");
    section.push_str(&table_header(&["Gene", "Protein", "Expressed in"]));
    for row in rows {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            cell(&row.gene),
            cell(&row.protein),
            cell(&row.expression_organs)
        ));
    }
    section.push('\n');

    section
}

fn generate_expression_section(rows: &[GeneExpressionRow]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Gene Expression\n\n");
    section.push_str(&table_header(&["Gene", "Organ", "Level", "Confidence", "Stage"]));
    for row in rows {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            cell(&row.gene_label),
            cell(&row.organ),
            row.expression_level,
            cell(&row.confidence),
            cell(&row.developmental_stage)
        ));
    }
    section.push('\n');

    section
}

fn generate_footer() -> String {
    format!(
        "---\n\n*Report generated by aopnet {}*\n",
        env!("CARGO_PKG_VERSION")
    )
}
