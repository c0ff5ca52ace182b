pub mod diff;
pub mod etl;
pub mod identity;
pub mod manifest;
pub mod pipeline;
pub mod sequence;

pub use crate::domain::ports::{
    EnzymeResolver, Pipeline, ProteinSource, SequenceGenerator, Storage, StructureSource,
};
pub use crate::utils::error::Result;
