//! SPARQL query builders and transport.

pub mod aopwiki;
pub mod bgee;
pub mod client;
pub mod results;

pub use aopwiki::QueryType;
pub use client::{HttpSparqlClient, SparqlEndpoint};
pub use results::{Binding, SparqlResults};

/// Format URIs for a SPARQL `VALUES` clause. Already bracketed entries are
/// kept as they are.
pub fn format_uris<S: AsRef<str>>(uris: &[S]) -> String {
    uris.iter()
        .map(|u| {
            let u = u.as_ref();
            if u.starts_with('<') {
                u.to_string()
            } else {
                format!("<{}>", u)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
