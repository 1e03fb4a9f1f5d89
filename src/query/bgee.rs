//! SPARQL builder for the Bgee gene expression endpoint.

pub const SERVICE_NAME: &str = "Bgee";
pub const DEFAULT_ENDPOINT: &str = "https://www.bgee.org/sparql/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const HIGH: &str = "obo:CIO_0000029";
const MEDIUM: &str = "obo:CIO_0000031";
const LOW: &str = "obo:CIO_0000030";

/// Confidence levels accepted for a minimum score.
///
/// 80 and above keeps only high confidence calls, 50 adds medium, 20 adds
/// low. Anything lower (or no score) applies no filter.
pub fn confidence_levels(confidence: Option<u8>) -> &'static [&'static str] {
    match confidence {
        Some(c) if c >= 80 => &[HIGH],
        Some(c) if c >= 50 => &[HIGH, MEDIUM],
        Some(c) if c >= 20 => &[HIGH, MEDIUM, LOW],
        _ => &[],
    }
}

fn confidence_filter(confidence: Option<u8>) -> String {
    confidence_levels(confidence)
        .iter()
        .map(|level| format!("{{ ?expr genex:hasConfidenceLevel {level} . }}"))
        .collect::<Vec<_>>()
        .join(" UNION ")
}

/// Quote `value` as a SPARQL string literal.
fn sparql_literal(value: &str) -> String {
    let mut literal = String::with_capacity(value.len() + 2);
    literal.push('"');
    for c in value.chars() {
        match c {
            '\\' => literal.push_str("\\\\"),
            '"' => literal.push_str("\\\""),
            '\n' => literal.push_str("\\n"),
            '\r' => literal.push_str("\\r"),
            c => literal.push(c),
        }
    }
    literal.push('"');
    literal
}

/// Expression calls of `gene_ids` in anatomical entities named `organ_names`.
pub fn gene_expression_query<S: AsRef<str>, T: AsRef<str>>(
    gene_ids: &[S],
    organ_names: &[T],
    confidence: Option<u8>,
) -> String {
    let genes_clause = if gene_ids.is_empty() {
        String::new()
    } else {
        let genes: Vec<String> = gene_ids
            .iter()
            .map(|g| sparql_literal(g.as_ref().trim_matches('"')))
            .collect();
        format!("VALUES ?gene_id {{ {} }}", genes.join(" "))
    };

    let organs_clause = if organ_names.is_empty() {
        String::new()
    } else {
        let organs: Vec<String> = organ_names
            .iter()
            .map(|o| sparql_literal(o.as_ref().trim_matches('"')))
            .collect();
        format!("VALUES ?anatomical_entity_name {{ {} }}", organs.join(" "))
    };

    let confidence_clause = confidence_filter(confidence);

    format!(
        r#"PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
PREFIX orth: <http://purl.org/net/orth#>
PREFIX lscr: <http://purl.org/lscr#>
PREFIX genex: <http://purl.org/genex#>
PREFIX obo: <http://purl.obolibrary.org/obo/>
PREFIX dcterms: <http://purl.org/dc/terms/>
SELECT ?gene_idI ?gene_id ?anatomical_entity_id
?anatomical_entity_name ?developmental_stage_id
?developmental_stage_name ?expression_level ?confidence_level_id
?confidence_level_name ?expr
WHERE {{
  {genes_clause}
  {organs_clause}
  ?gene_idI a orth:Gene .
  ?gene_idI dcterms:identifier ?gene_id .
  ?expr genex:hasSequenceUnit ?gene_idI.
  ?expr a genex:Expression .
  {confidence_clause}
  ?expr genex:hasConfidenceLevel ?confidence_level_id .
  ?confidence_level_id rdfs:label ?confidence_level_label.
  BIND(str(?confidence_level_label) as ?confidence_level_name)
  ?expr genex:hasExpressionLevel ?expression_level .
  ?expr genex:hasExpressionCondition ?cond .
  ?cond genex:hasDevelopmentalStage ?developmental_stage_id.
  ?developmental_stage_id rdfs:label ?developmental_stage_name.
  ?cond genex:hasAnatomicalEntity ?anatomical_entity_id .
  ?anatomical_entity_id rdfs:label ?anatomical_entity_name.
}}"#
    )
}
