//! Kindred Core - Genealogical relationship graph
//!
//! This crate provides the person and marriage model, the registry that
//! orchestrates parent-child and marriage edges, and the generation-bounded
//! queries that run over it.

pub mod error;
pub mod id;
pub mod limits;
pub mod marriage;
pub mod person;
pub mod policy;
pub mod query;
pub mod shared;
pub mod tree;

pub use error::{Error, Result};
pub use id::{IdGenerator, PersonId, SequentialIds, UlidIds};
pub use marriage::{MaritalStatus, Marriage};
pub use person::{Gender, Marriageability, Person, PersonView};
pub use policy::MarriagePolicy;
pub use query::{LineageDirection, LineageNode, RelativesQuery};
pub use shared::SharedFamilyTree;
pub use tree::FamilyTree;
