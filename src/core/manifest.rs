//! FASTA / mutation-list artifacts and the `candidate_data.js` manifest the
//! presentation layer loads.

use crate::core::diff::mutation_lines;
use crate::domain::model::{
    ArtifactManifest, CandidateSequence, LigandQuery, ManifestEntry, Mutation, ProteinRecord,
};
use crate::utils::error::{Result, ZymeError};

pub const MANIFEST_FILENAME: &str = "candidate_data.js";
const JS_PREFIX: &str = "window.candidates = ";
const JS_SUFFIX: &str = ";";
const CANDIDATE_KEY_PREFIX: &str = "candidate_";

pub fn fasta(header: &str, sequence: &str) -> String {
    format!(">{}\n{}\n", header, sequence)
}

/// Manifest key of the reference entry. A slug that already looks like a
/// candidate key is prefixed with `original_`, so the reference never shares a
/// namespace with `candidate_<n>`.
pub fn original_key(ligand: &LigandQuery) -> String {
    let slug = ligand.slug();
    if slug.starts_with(CANDIDATE_KEY_PREFIX) {
        format!("original_{}", slug)
    } else {
        slug
    }
}

pub fn original_entry(ligand: &LigandQuery, record: &ProteinRecord) -> ManifestEntry {
    ManifestEntry {
        filename: format!("{}.fasta", ligand.slug()),
        content: fasta(
            &format!("original|{}", record.accession_id),
            &record.reference_sequence,
        ),
    }
}

pub fn candidate_entry(
    ligand: &LigandQuery,
    record: &ProteinRecord,
    candidate: &CandidateSequence,
) -> ManifestEntry {
    ManifestEntry {
        filename: format!("candidate_{}_{}.fasta", candidate.index, ligand.slug()),
        content: fasta(
            &format!("candidate_{}|from_{}", candidate.index, record.accession_id),
            &candidate.cleaned_sequence,
        ),
    }
}

/// `None` when the candidate carries no substitutions.
pub fn mutation_entry(
    record: &ProteinRecord,
    candidate: &CandidateSequence,
    mutations: &[Mutation],
) -> Option<ManifestEntry> {
    if mutations.is_empty() {
        return None;
    }
    Some(ManifestEntry {
        filename: format!(
            "mutations_candidate_{}_{}.txt",
            candidate.index, record.accession_id
        ),
        content: mutation_lines(mutations),
    })
}

/// Single writer for the manifest; keys keep insertion order.
#[derive(Debug, Default)]
pub struct ManifestBuilder {
    manifest: ArtifactManifest,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, entry: ManifestEntry) -> Result<()> {
        let key = key.into();
        if self.manifest.get(&key).is_some() {
            return Err(ZymeError::ManifestError {
                message: format!("duplicate manifest key '{}'", key),
            });
        }
        self.manifest.entries_mut().insert(key, entry);
        Ok(())
    }

    pub fn build(self) -> ArtifactManifest {
        self.manifest
    }
}

impl ArtifactManifest {
    /// `window.candidates = {...};` with 2-space indented JSON.
    pub fn to_js(&self) -> Result<String> {
        let json = serde_json::to_string_pretty(self)?;
        Ok(format!("{}{}{}", JS_PREFIX, json, JS_SUFFIX))
    }

    pub fn from_js(text: &str) -> Result<Self> {
        let body = text
            .trim()
            .strip_prefix(JS_PREFIX)
            .and_then(|rest| rest.strip_suffix(JS_SUFFIX))
            .ok_or_else(|| ZymeError::ManifestError {
                message: format!("expected '{}...{}'", JS_PREFIX.trim_end(), JS_SUFFIX),
            })?;
        Ok(serde_json::from_str(body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ProteinRecord {
        ProteinRecord {
            accession_id: "Q840G9".to_string(),
            reference_sequence: "MKVLAAG".to_string(),
            display_name: "Dispersin B".to_string(),
        }
    }

    fn candidate(index: usize, cleaned: &str) -> CandidateSequence {
        CandidateSequence {
            index,
            raw_text: format!("<|endoftext|>{}", cleaned),
            cleaned_sequence: cleaned.to_string(),
        }
    }

    #[test]
    fn test_artifact_names_and_headers() {
        let ligand = LigandQuery::new("PGA");
        let original = original_entry(&ligand, &record());
        assert_eq!(original.filename, "PGA.fasta");
        assert_eq!(original.content, ">original|Q840G9\nMKVLAAG\n");

        let entry = candidate_entry(&ligand, &record(), &candidate(2, "MKVLGAG"));
        assert_eq!(entry.filename, "candidate_2_PGA.fasta");
        assert_eq!(entry.content, ">candidate_2|from_Q840G9\nMKVLGAG\n");
    }

    #[test]
    fn test_mutation_entry_omitted_without_mutations() {
        let cand = candidate(1, "MKVLAAG");
        assert!(mutation_entry(&record(), &cand, &[]).is_none());

        let mutations = crate::core::diff::find_mutations("MKVLAAG", "MRVLGAG");
        let entry = mutation_entry(&record(), &cand, &mutations).unwrap();
        assert_eq!(entry.filename, "mutations_candidate_1_Q840G9.txt");
        assert_eq!(entry.content, "K2R\nA5G");
    }

    #[test]
    fn test_original_key_stays_out_of_candidate_namespace() {
        assert_eq!(original_key(&LigandQuery::new("PGA")), "PGA");
        assert_eq!(original_key(&LigandQuery::new("candidate 1")), "original_candidate_1");
        assert_eq!(original_key(&LigandQuery::new("candidate_1")), "original_candidate_1");
        assert_eq!(
            original_key(&LigandQuery::new("original_candidate_1")),
            "original_candidate_1"
        );
    }

    #[test]
    fn test_duplicate_key_is_rejected() {
        let ligand = LigandQuery::new("PGA");
        let mut builder = ManifestBuilder::new();
        builder.insert("PGA", original_entry(&ligand, &record())).unwrap();

        let err = builder
            .insert("PGA", original_entry(&ligand, &record()))
            .unwrap_err();
        assert!(matches!(err, ZymeError::ManifestError { .. }));
    }

    #[test]
    fn test_js_round_trip_preserves_content_and_order() {
        let ligand = LigandQuery::new("PGA");
        let mut builder = ManifestBuilder::new();
        builder.insert(original_key(&ligand), original_entry(&ligand, &record())).unwrap();
        for (i, seq) in ["MKVLGAG", "MKV\"LA\\AG"].iter().enumerate() {
            let cand = candidate(i + 1, seq);
            builder
                .insert(cand.key(), candidate_entry(&ligand, &record(), &cand))
                .unwrap();
        }
        let manifest = builder.build();

        let js = manifest.to_js().unwrap();
        assert!(js.starts_with("window.candidates = {\n  \"PGA\": {"));
        assert!(js.ends_with("};"));

        let parsed = ArtifactManifest::from_js(&js).unwrap();
        assert_eq!(parsed, manifest);
        assert_eq!(
            parsed.keys().collect::<Vec<_>>(),
            vec!["PGA", "candidate_1", "candidate_2"]
        );
        assert_eq!(
            parsed.get("candidate_2").unwrap().content,
            ">candidate_2|from_Q840G9\nMKV\"LA\\AG\n"
        );
    }

    #[test]
    fn test_from_js_rejects_other_text() {
        assert!(ArtifactManifest::from_js("{}").is_err());
        assert!(ArtifactManifest::from_js("window.candidates = {").is_err());
    }
}
