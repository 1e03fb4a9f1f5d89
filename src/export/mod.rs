//! Network exporters: Cytoscape JSON, CX2, tables and Markdown.

pub mod cx2;
pub mod markdown;
pub mod tables;

pub use cx2::{to_cx2, Cx2Options};
pub use markdown::{generate_markdown_report, ReportMetadata};
pub use tables::NetworkTables;
