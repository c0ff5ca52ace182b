use crate::adapters::alphafold::AlphaFoldFetcher;
use crate::adapters::generator::HttpSequenceGenerator;
use crate::adapters::http::ResolverClient;
use crate::adapters::pubchem::PubChemLigandFetcher;
use crate::adapters::uniprot::UniProtResolver;
use crate::config::cli::{LocalStorage, RunDirectory};
use crate::config::toml_config::ZymeConfig;
use crate::core::diff::find_mutations;
use crate::core::identity::build_identity_resolver;
use crate::core::manifest::{
    candidate_entry, mutation_entry, original_entry, original_key, ManifestBuilder,
    MANIFEST_FILENAME,
};
use crate::core::sequence::CandidateGenerator;
use crate::domain::model::{
    CandidateFailure, CandidateSet, LigandQuery, ManifestEntry, ResolvedTemplate, RunOutcome,
    ScoredCandidate,
};
use crate::domain::ports::{
    EnzymeResolver, LigandStructureSource, Pipeline, ProteinSource, Storage, StructureSource,
};
use crate::utils::error::{Result, Stage, ZymeError};
use async_trait::async_trait;
use std::path::PathBuf;

pub fn new_run_id() -> String {
    chrono::Local::now().format("run_%Y%m%d_%H%M%S").to_string()
}

/// Ligand → template enzyme → protein record → candidates → artifacts.
///
/// Identity and protein record are required stages: a miss ends the run with
/// `NotFound`. Structure downloads, generation and per-candidate writes only
/// degrade the result.
pub struct CandidatePipeline<S: Storage> {
    ligand: LigandQuery,
    output_dir: PathBuf,
    storage: S,
    identity: Box<dyn EnzymeResolver>,
    proteins: Box<dyn ProteinSource>,
    structures: Option<Box<dyn StructureSource>>,
    ligand_structures: Option<Box<dyn LigandStructureSource>>,
    generator: CandidateGenerator,
    count: usize,
    max_length: Option<usize>,
    run_id: String,
}

impl<S: Storage> CandidatePipeline<S> {
    pub fn new(
        ligand: LigandQuery,
        output_dir: impl Into<PathBuf>,
        storage: S,
        identity: Box<dyn EnzymeResolver>,
        proteins: Box<dyn ProteinSource>,
        generator: CandidateGenerator,
    ) -> Self {
        Self {
            ligand,
            output_dir: output_dir.into(),
            storage,
            identity,
            proteins,
            structures: None,
            ligand_structures: None,
            generator,
            count: 3,
            max_length: None,
            run_id: new_run_id(),
        }
    }

    pub fn with_structure_source(mut self, structures: Box<dyn StructureSource>) -> Self {
        self.structures = Some(structures);
        self
    }

    pub fn with_ligand_structure_source(
        mut self,
        ligand_structures: Box<dyn LigandStructureSource>,
    ) -> Self {
        self.ligand_structures = Some(ligand_structures);
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn with_max_length(mut self, max_length: Option<usize>) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }

    async fn write_entry(&self, entry: &ManifestEntry) -> Result<()> {
        self.storage
            .write_file(&entry.filename, entry.content.as_bytes())
            .await?;
        tracing::debug!("💾 Wrote {}", entry.filename);
        Ok(())
    }

    /// Writes the candidate FASTA and its mutation list as a pair. A FASTA left
    /// behind by a failed mutation write is removed again.
    async fn write_candidate(
        &self,
        fasta: &ManifestEntry,
        mutations: Option<&ManifestEntry>,
    ) -> Result<()> {
        self.write_entry(fasta).await?;
        let Some(mutations) = mutations else {
            return Ok(());
        };
        if let Err(e) = self.write_entry(mutations).await {
            if let Err(cleanup) = self.storage.remove_file(&fasta.filename).await {
                tracing::warn!("⚠️ Could not remove {}: {}", fasta.filename, cleanup);
            }
            return Err(e);
        }
        Ok(())
    }
}

impl CandidatePipeline<LocalStorage> {
    /// Wires the HTTP-backed resolvers described by `settings` into a pipeline
    /// writing under `run_dir`.
    pub fn from_config(settings: &ZymeConfig, ligand: LigandQuery, run_dir: &RunDirectory) -> Self {
        let client = ResolverClient::new(settings.http.retry_policy());
        let timeout = settings.http.timeout();

        let identity = build_identity_resolver(settings, client.clone());
        let proteins = UniProtResolver::new(client.clone(), &settings.protein.search_url, timeout)
            .with_query_hints(&settings.protein.query_hints);
        let backend = HttpSequenceGenerator::new(
            client.clone(),
            &settings.generator.endpoint,
            settings.generator.timeout(),
        )
        .with_api_token(settings.generator.api_token.clone());
        let generator = CandidateGenerator::new(Box::new(backend))
            .with_seed(&settings.generator.seed)
            .with_eos_marker(&settings.generator.eos_marker);

        let mut pipeline = Self::new(
            ligand,
            run_dir.path(),
            run_dir.storage(),
            identity,
            Box::new(proteins),
            generator,
        )
        .with_count(settings.run.count)
        .with_max_length(settings.run.max_length);

        if settings.structure.enabled {
            let fetcher = AlphaFoldFetcher::new(
                client.clone(),
                &settings.structure.alphafold_url,
                run_dir.storage(),
                timeout,
            );
            pipeline = pipeline.with_structure_source(Box::new(fetcher));
        }
        if settings.structure.ligand_enabled {
            let fetcher = PubChemLigandFetcher::new(
                client,
                &settings.structure.pubchem_url,
                run_dir.storage(),
                timeout,
            );
            pipeline = pipeline.with_ligand_structure_source(Box::new(fetcher));
        }
        pipeline
    }
}

#[async_trait]
impl<S: Storage> Pipeline for CandidatePipeline<S> {
    async fn extract(&self) -> Result<ResolvedTemplate> {
        tracing::info!(
            "🧭 Resolving enzyme for '{}' ({} strategy)",
            self.ligand,
            self.identity.strategy_name()
        );
        let enzyme = match self.identity.resolve(&self.ligand).await {
            Ok(enzyme) => enzyme,
            Err(e) if e.is_transient() => {
                tracing::warn!("⚠️ Enzyme identity unavailable: {}", e);
                return Err(ZymeError::unavailable(
                    Stage::EnzymeIdentity,
                    self.ligand.as_str(),
                    &e,
                ));
            }
            Err(e) => return Err(e),
        }
        .ok_or_else(|| ZymeError::not_found(Stage::EnzymeIdentity, self.ligand.as_str()))?;
        tracing::info!("✅ Template enzyme: {}", enzyme.name);

        let record = self
            .proteins
            .resolve(&enzyme)
            .await?
            .ok_or_else(|| ZymeError::not_found(Stage::ProteinRecord, enzyme.name.as_str()))?;
        tracing::info!(
            "✅ Reference {} ({} residues)",
            record.accession_id,
            record.reference_sequence.len()
        );

        let structure = match &self.structures {
            Some(source) => match source.fetch(&record.accession_id).await {
                Ok(structure) => Some(structure),
                Err(e) => {
                    tracing::warn!("⚠️ Structure download skipped: {}", e);
                    None
                }
            },
            None => None,
        };

        let ligand_structure = match &self.ligand_structures {
            Some(source) => match source.fetch(&self.ligand).await {
                Ok(structure) => Some(structure),
                Err(e) => {
                    tracing::warn!("⚠️ Ligand structure download skipped: {}", e);
                    None
                }
            },
            None => None,
        };

        Ok(ResolvedTemplate {
            ligand: self.ligand.clone(),
            enzyme,
            record,
            structure,
            ligand_structure,
        })
    }

    async fn transform(&self, template: ResolvedTemplate) -> Result<CandidateSet> {
        let reference = template.record.reference_sequence.as_str();
        let generated = self
            .generator
            .generate(reference, self.max_length, self.count)
            .await;

        if generated.is_empty() {
            tracing::warn!("⚠️ No candidates generated for {}", template.record.accession_id);
        }

        let mut candidates = Vec::with_capacity(generated.len());
        let mut failed = Vec::new();
        for candidate in generated {
            if candidate.cleaned_sequence.is_empty() {
                tracing::warn!("⚠️ {} is empty after cleaning", candidate.key());
                failed.push(CandidateFailure {
                    index: candidate.index,
                    reason: "no canonical residues after cleaning".to_string(),
                });
                continue;
            }

            let mutations = find_mutations(reference, &candidate.cleaned_sequence);
            tracing::info!("🧪 {}: {} mutations", candidate.key(), mutations.len());
            candidates.push(ScoredCandidate {
                candidate,
                mutations,
            });
        }

        Ok(CandidateSet {
            template,
            candidates,
            failed,
        })
    }

    async fn load(&self, result: CandidateSet) -> Result<RunOutcome> {
        let CandidateSet {
            template,
            candidates,
            mut failed,
        } = result;
        let ligand = &template.ligand;
        let record = &template.record;

        let mut builder = ManifestBuilder::new();
        let original = original_entry(ligand, record);
        builder.insert(original_key(ligand), original.clone())?;
        self.write_entry(&original).await?;

        let mut candidates_written = 0;
        for scored in &candidates {
            let candidate = &scored.candidate;
            let fasta = candidate_entry(ligand, record, candidate);
            let mutations = mutation_entry(record, candidate, &scored.mutations);

            match self.write_candidate(&fasta, mutations.as_ref()).await {
                Ok(()) => {
                    builder.insert(candidate.key(), fasta)?;
                    candidates_written += 1;
                }
                Err(e) => {
                    tracing::warn!("⚠️ Could not write {}: {}", candidate.key(), e);
                    failed.push(CandidateFailure {
                        index: candidate.index,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let manifest = builder.build();
        self.storage
            .write_file(MANIFEST_FILENAME, manifest.to_js()?.as_bytes())
            .await?;
        tracing::info!(
            "📦 Manifest with {} entries written to {}",
            manifest.len(),
            MANIFEST_FILENAME
        );

        failed.sort_by_key(|f| f.index);

        Ok(RunOutcome {
            run_id: self.run_id.clone(),
            ligand: template.ligand.clone(),
            enzyme: template.enzyme.clone(),
            record: template.record.clone(),
            structure: template.structure.clone(),
            ligand_structure: template.ligand_structure.clone(),
            candidates_written,
            failed_candidates: failed,
            manifest,
            manifest_path: self.output_dir.join(MANIFEST_FILENAME),
            output_dir: self.output_dir.clone(),
        })
    }
}
