//! UniProtKB search: reviewed query first, unrestricted query as fallback.
//!
//! Only the first result row is used. There is no ranking beyond the order
//! the search service returns; a better match further down the list is ignored.

use crate::adapters::http::ResolverClient;
use crate::domain::model::{EnzymeIdentity, ProteinRecord};
use crate::domain::ports::ProteinSource;
use crate::utils::error::{Result, ZymeError};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const STEP_PRIMARY: &str = "UniProt reviewed search";
const STEP_FALLBACK: &str = "UniProt fallback search";
const FIELDS: &str = "accession,id,protein_name,sequence";

pub fn default_query_hints() -> HashMap<String, String> {
    HashMap::from([
        (
            "dispersin b".to_string(),
            "(gene:dspB) AND (organism_id:714)".to_string(),
        ),
        (
            "dnas1_bovin".to_string(),
            "(gene:DNASE1) AND (organism_id:9913)".to_string(),
        ),
    ])
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

pub struct UniProtResolver {
    client: ResolverClient,
    search_url: String,
    timeout: Duration,
    query_hints: HashMap<String, String>,
}

impl UniProtResolver {
    pub fn new(client: ResolverClient, search_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            search_url: search_url.into(),
            timeout,
            query_hints: default_query_hints(),
        }
    }

    /// Merges per-enzyme query overrides (keys compared case-insensitively).
    pub fn with_query_hints(mut self, hints: &HashMap<String, String>) -> Self {
        for (name, query) in hints {
            self.query_hints.insert(name.to_lowercase(), query.clone());
        }
        self
    }

    pub fn primary_query(&self, enzyme_name: &str) -> String {
        let base = self
            .query_hints
            .get(&enzyme_name.to_lowercase())
            .cloned()
            .unwrap_or_else(|| name_query(enzyme_name));
        format!("{} AND (reviewed:true)", base)
    }

    pub fn fallback_query(&self, enzyme_name: &str) -> String {
        name_query(enzyme_name)
    }

    async fn search(
        &self,
        step: &str,
        query: &str,
        enzyme_name: &str,
    ) -> Result<Option<ProteinRecord>> {
        let params = [
            ("query", query),
            ("fields", FIELDS),
            ("format", "json"),
            ("size", "1"),
        ];
        let response = self
            .client
            .get(&self.search_url, &params, self.timeout)
            .await
            .map_err(|e| e.at_step(step))?;

        let parsed: SearchResponse = response.json(step)?;
        match parsed.results.first() {
            Some(entry) => parse_entry(entry, enzyme_name, step).map(Some),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ProteinSource for UniProtResolver {
    async fn resolve(&self, enzyme: &EnzymeIdentity) -> Result<Option<ProteinRecord>> {
        let primary = self.primary_query(&enzyme.name);
        tracing::info!("🔬 Querying UniProt with: {}", primary);

        match self.search(STEP_PRIMARY, &primary, &enzyme.name).await {
            Ok(Some(record)) => {
                tracing::info!(
                    "✅ Found UniProt entry: {} ({})",
                    record.accession_id,
                    record.display_name
                );
                return Ok(Some(record));
            }
            Ok(None) => tracing::info!("🔎 No reviewed entry for '{}'", enzyme.name),
            Err(e) => tracing::warn!("⚠️ {}", e),
        }

        let fallback = self.fallback_query(&enzyme.name);
        tracing::info!("🔬 Falling back to broader search: {}", fallback);

        match self.search(STEP_FALLBACK, &fallback, &enzyme.name).await {
            Ok(Some(record)) => {
                tracing::info!(
                    "✅ Found UniProt entry on fallback: {} ({})",
                    record.accession_id,
                    record.display_name
                );
                Ok(Some(record))
            }
            Ok(None) => {
                tracing::info!("🔎 No UniProt entry for '{}' even with fallback", enzyme.name);
                Ok(None)
            }
            Err(e) => {
                tracing::warn!("⚠️ {}", e);
                Ok(None)
            }
        }
    }
}

fn name_query(enzyme_name: &str) -> String {
    format!("(protein_name:\"{}\")", enzyme_name)
}

fn parse_entry(entry: &serde_json::Value, enzyme_name: &str, step: &str) -> Result<ProteinRecord> {
    let accession_id = entry["primaryAccession"]
        .as_str()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ZymeError::malformed(step, "results[0] has no primaryAccession"))?;
    let reference_sequence = entry["sequence"]["value"]
        .as_str()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ZymeError::malformed(step, "results[0] has no sequence.value"))?;
    let display_name = entry["proteinDescription"]["recommendedName"]["fullName"]["value"]
        .as_str()
        .unwrap_or(enzyme_name);

    Ok(ProteinRecord {
        accession_id: accession_id.to_string(),
        reference_sequence: reference_sequence.to_string(),
        display_name: display_name.to_string(),
    })
}
