//! AOP network domain model.

pub mod aop;
pub mod associations;
pub mod network;
pub mod types;

pub use aop::{AopInfo, KeyEvent, KeyEventRelationship};
pub use associations::{
    Association, ComponentAssociation, CompoundAssociation, GeneAssociation,
    GeneExpressionAssociation, OrganAssociation,
};
pub use network::{AopNetwork, NetworkSummary};
pub use types::{DataSource, EdgeType, NodeType};
