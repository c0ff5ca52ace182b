//! PubChem PUG REST: ligand name → CID → 3-D SDF record.

use crate::adapters::http::ResolverClient;
use crate::domain::model::{LigandQuery, StructureFile};
use crate::domain::ports::{LigandStructureSource, Storage};
use crate::utils::error::{Result, ZymeError};
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

const STEP_LOOKUP: &str = "PubChem name lookup";
const STEP_DOWNLOAD: &str = "PubChem SDF download";

pub struct PubChemLigandFetcher<S: Storage> {
    client: ResolverClient,
    base_url: String,
    storage: S,
    timeout: Duration,
}

impl<S: Storage> PubChemLigandFetcher<S> {
    pub fn new(client: ResolverClient, base_url: impl Into<String>, storage: S, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            storage,
            timeout,
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<String> {
        let invalid = |reason: String| ZymeError::InvalidConfigValueError {
            field: "structure.pubchem_url".to_string(),
            value: self.base_url.clone(),
            reason,
        };
        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url.to_string())
    }

    async fn first_cid(&self, ligand: &LigandQuery) -> Result<u64> {
        let url = self.endpoint(&["compound", "name", ligand.as_str(), "cids", "JSON"])?;
        let response = self
            .client
            .get(&url, &[], self.timeout)
            .await
            .map_err(|e| e.at_step(STEP_LOOKUP))?;

        let body: serde_json::Value = response.json(STEP_LOOKUP)?;
        body["IdentifierList"]["CID"][0].as_u64().ok_or_else(|| {
            ZymeError::malformed(STEP_LOOKUP, format!("no CID listed for '{}'", ligand))
        })
    }
}

#[async_trait]
impl<S: Storage> LigandStructureSource for PubChemLigandFetcher<S> {
    async fn fetch(&self, ligand: &LigandQuery) -> Result<StructureFile> {
        tracing::info!("⚗️ Searching PubChem for '{}'", ligand);

        let cid = self.first_cid(ligand).await?;
        tracing::info!("⚗️ Found PubChem CID: {}", cid);

        let url = self.endpoint(&["compound", "cid", &cid.to_string(), "SDF"])?;
        let response = self
            .client
            .get(&url, &[("record_type", "3d")], self.timeout)
            .await
            .map_err(|e| e.at_step(STEP_DOWNLOAD))?;

        let filename = format!("{}_ligand.sdf", ligand.slug());
        self.storage
            .write_file(&filename, response.body.as_bytes())
            .await?;
        tracing::info!("✅ Saved ligand structure to {}", filename);

        Ok(StructureFile {
            filename,
            source_url: url,
        })
    }
}
