//! High-level Crosswalk API.
//!
//! [`KnowledgeBase`] ties the entity model, the graph store and the branch
//! manager together:
//!
//! - entity creation through the get-or-create protocol, into main or a branch
//! - retrieval of current mappings with bounded concurrent [`hydrate`]
//! - the [`Validator`] rule battery
//! - merges of reviewed branches
//!
//! ```no_run
//! use cw_sdk::KnowledgeBase;
//! use cw_store::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load("crosswalk.toml".as_ref())?;
//! let kb = KnowledgeBase::connect(&config)?;
//! let mappings = kb.retrieve_mappings("cw:NetCDFVariable", "cw:GribParameter", None)?;
//! println!("{} current mappings", mappings.len());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod hydrate;
pub mod repository;
pub mod validation;

pub use error::{SdkError, SdkResult};
pub use hydrate::{ensure_complete, hydrate};
pub use repository::KnowledgeBase;
pub use validation::{
    ambiguous_mappings, duplicate_mappings, merge_disjoint, FindingRow, Findings, Rule, Snapshot,
    Validator, AMBIGUOUS_MAPPINGS, DUPLICATE_MAPPINGS,
};
