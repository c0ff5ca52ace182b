use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Free-text ligand/substrate identifier, e.g. `PGA`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LigandQuery(String);

impl LigandQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Filesystem-safe form used for directory names, file names and the
    /// manifest key of the original sequence.
    pub fn slug(&self) -> String {
        self.0
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}

impl std::fmt::Display for LigandQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnzymeIdentity {
    pub name: String,
}

impl EnzymeIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProteinRecord {
    pub accession_id: String,
    pub reference_sequence: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSequence {
    /// 1-based generation index.
    pub index: usize,
    pub raw_text: String,
    pub cleaned_sequence: String,
}

impl CandidateSequence {
    pub fn key(&self) -> String {
        format!("candidate_{}", self.index)
    }
}

/// Single-position substitution, displayed as `A12G`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mutation {
    pub original_aa: char,
    pub position: usize,
    pub new_aa: char,
}

impl std::fmt::Display for Mutation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.original_aa, self.position, self.new_aa)
    }
}

/// Output of the extract stage.
#[derive(Debug, Clone)]
pub struct ResolvedTemplate {
    pub ligand: LigandQuery,
    pub enzyme: EnzymeIdentity,
    pub record: ProteinRecord,
    pub structure: Option<StructureFile>,
    pub ligand_structure: Option<StructureFile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureFile {
    pub filename: String,
    pub source_url: String,
}

#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub candidate: CandidateSequence,
    pub mutations: Vec<Mutation>,
}

/// Output of the transform stage.
#[derive(Debug, Clone)]
pub struct CandidateSet {
    pub template: ResolvedTemplate,
    pub candidates: Vec<ScoredCandidate>,
    pub failed: Vec<CandidateFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFailure {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub filename: String,
    pub content: String,
}

/// Ordered key → artifact map loaded by the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactManifest {
    entries: IndexMap<String, ManifestEntry>,
}

impl ArtifactManifest {
    pub fn entries(&self) -> &IndexMap<String, ManifestEntry> {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut IndexMap<String, ManifestEntry> {
        &mut self.entries
    }

    pub fn get(&self, key: &str) -> Option<&ManifestEntry> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Final report of one pipeline run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_id: String,
    pub ligand: LigandQuery,
    pub enzyme: EnzymeIdentity,
    pub record: ProteinRecord,
    pub structure: Option<StructureFile>,
    pub ligand_structure: Option<StructureFile>,
    pub candidates_written: usize,
    pub failed_candidates: Vec<CandidateFailure>,
    pub manifest: ArtifactManifest,
    pub manifest_path: PathBuf,
    pub output_dir: PathBuf,
}
