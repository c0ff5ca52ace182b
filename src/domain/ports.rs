use crate::domain::model::{
    CandidateSet, EnzymeIdentity, LigandQuery, ProteinRecord, ResolvedTemplate, RunOutcome,
    StructureFile,
};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Removes an artifact written earlier in the same run. Missing files are not an error.
    fn remove_file(&self, path: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Ligand → template enzyme. `Ok(None)` is a normal "not found"; `Err` is a
/// service failure the caller can diagnose.
#[async_trait]
pub trait EnzymeResolver: Send + Sync {
    async fn resolve(&self, ligand: &LigandQuery) -> Result<Option<EnzymeIdentity>>;

    fn strategy_name(&self) -> &str;
}

#[async_trait]
pub trait ProteinSource: Send + Sync {
    async fn resolve(&self, enzyme: &EnzymeIdentity) -> Result<Option<ProteinRecord>>;
}

/// Downloads a 3-D structure for an accession into the run directory.
#[async_trait]
pub trait StructureSource: Send + Sync {
    async fn fetch(&self, accession_id: &str) -> Result<StructureFile>;
}

/// Downloads a 3-D structure of the ligand itself into the run directory.
#[async_trait]
pub trait LigandStructureSource: Send + Sync {
    async fn fetch(&self, ligand: &LigandQuery) -> Result<StructureFile>;
}

/// Generative backend: `count` raw completions for `seed`, each at most
/// `max_length` tokens.
#[async_trait]
pub trait SequenceGenerator: Send + Sync {
    async fn generate(&self, seed: &str, max_length: usize, count: usize) -> Result<Vec<String>>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<ResolvedTemplate>;
    async fn transform(&self, template: ResolvedTemplate) -> Result<CandidateSet>;
    async fn load(&self, result: CandidateSet) -> Result<RunOutcome>;
}
