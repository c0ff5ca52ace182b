pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{
    cli::{LocalStorage, RunDirectory},
    IdentityStrategy, ZymeConfig,
};

pub use core::{
    etl::EtlEngine, identity::StaticLookup, pipeline::CandidatePipeline,
    sequence::CandidateGenerator,
};
pub use domain::model::{ArtifactManifest, LigandQuery, RunOutcome};
pub use utils::error::{Result, ZymeError};
