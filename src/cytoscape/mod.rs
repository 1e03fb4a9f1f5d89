//! Cytoscape.js element model, parser and stylesheet.

pub mod elements;
pub mod parser;
pub mod styles;

pub use elements::{CytoscapeDocument, CytoscapeEdge, CytoscapeNode, Data, Element, Position};
pub use parser::CytoscapeNetworkParser;
pub use styles::StyleManager;
