//! AlphaFold DB structure download keyed by UniProt accession.

use crate::adapters::http::ResolverClient;
use crate::domain::model::StructureFile;
use crate::domain::ports::{Storage, StructureSource};
use crate::utils::error::{Result, ZymeError};
use async_trait::async_trait;
use std::time::Duration;

const STEP_PREDICTION: &str = "AlphaFold prediction lookup";
const STEP_DOWNLOAD: &str = "AlphaFold PDB download";

pub struct AlphaFoldFetcher<S: Storage> {
    client: ResolverClient,
    api_url: String,
    storage: S,
    timeout: Duration,
    download_timeout: Duration,
}

impl<S: Storage> AlphaFoldFetcher<S> {
    pub fn new(client: ResolverClient, api_url: impl Into<String>, storage: S, timeout: Duration) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            storage,
            timeout,
            download_timeout: timeout.saturating_mul(2),
        }
    }

    async fn pdb_url(&self, accession_id: &str) -> Result<String> {
        let url = format!("{}/{}", self.api_url.trim_end_matches('/'), accession_id);
        let response = self
            .client
            .get(&url, &[], self.timeout)
            .await
            .map_err(|e| e.at_step(STEP_PREDICTION))?;

        let predictions: serde_json::Value = response.json(STEP_PREDICTION)?;
        predictions[0]["pdbUrl"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                ZymeError::malformed(
                    STEP_PREDICTION,
                    format!("no prediction with a pdbUrl for {}", accession_id),
                )
            })
    }
}

#[async_trait]
impl<S: Storage> StructureSource for AlphaFoldFetcher<S> {
    async fn fetch(&self, accession_id: &str) -> Result<StructureFile> {
        tracing::info!("🧊 Downloading AlphaFold structure for {}", accession_id);

        let pdb_url = self.pdb_url(accession_id).await?;
        tracing::debug!("🧊 Found PDB URL: {}", pdb_url);

        let response = self
            .client
            .get(&pdb_url, &[], self.download_timeout)
            .await
            .map_err(|e| e.at_step(STEP_DOWNLOAD))?;

        let filename = format!("{}_alphafold.pdb", accession_id);
        self.storage
            .write_file(&filename, response.body.as_bytes())
            .await?;
        tracing::info!("✅ Saved AlphaFold structure to {}", filename);

        Ok(StructureFile {
            filename,
            source_url: pdb_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::RetryPolicy;
    use crate::config::cli::LocalStorage;
    use httpmock::prelude::*;
    use tempfile::TempDir;

    fn client() -> ResolverClient {
        ResolverClient::new(RetryPolicy {
            max_retries: 0,
            ..RetryPolicy::default()
        })
    }

    #[tokio::test]
    async fn test_fetch_writes_pdb_into_storage() {
        let server = MockServer::start();
        let pdb_url = server.url("/files/AF-Q840G9-F1-model_v4.pdb");
        let lookup = server.mock(|when, then| {
            when.method(GET).path("/api/prediction/Q840G9");
            then.status(200)
                .json_body(serde_json::json!([{"entryId": "AF-Q840G9-F1", "pdbUrl": pdb_url}]));
        });
        let download = server.mock(|when, then| {
            when.method(GET).path("/files/AF-Q840G9-F1-model_v4.pdb");
            then.status(200).body("HEADER    HYDROLASE\nEND\n");
        });

        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().to_string_lossy().to_string());
        let fetcher = AlphaFoldFetcher::new(
            client(),
            server.url("/api/prediction"),
            storage,
            Duration::from_secs(5),
        );

        let structure = fetcher.fetch("Q840G9").await.unwrap();

        lookup.assert();
        download.assert();
        assert_eq!(structure.filename, "Q840G9_alphafold.pdb");
        let written = std::fs::read_to_string(dir.path().join("Q840G9_alphafold.pdb")).unwrap();
        assert_eq!(written, "HEADER    HYDROLASE\nEND\n");
    }

    #[tokio::test]
    async fn test_missing_prediction_is_malformed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/prediction/P00000");
            then.status(200).json_body(serde_json::json!([]));
        });

        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().to_string_lossy().to_string());
        let fetcher = AlphaFoldFetcher::new(
            client(),
            server.url("/api/prediction"),
            storage,
            Duration::from_secs(5),
        );

        let err = fetcher.fetch("P00000").await.unwrap_err();
        assert!(matches!(err, ZymeError::MalformedResponse { .. }));
    }
}
