// Adapters layer: concrete clients for the external services the pipeline talks to.

pub mod alphafold;
pub mod generator;
pub mod http;
pub mod kegg;
pub mod pubchem;
pub mod uniprot;

pub use http::{HttpResponse, ResolverClient, RetryPolicy};
