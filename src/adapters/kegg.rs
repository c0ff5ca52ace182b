//! Four-hop KEGG REST chain: ligand name → compound → reaction → EC number → enzyme name.
//!
//! Every hop takes the first row of the previous response. An empty body ends
//! the chain with `Ok(None)`.

use crate::adapters::http::ResolverClient;
use crate::domain::model::{EnzymeIdentity, LigandQuery};
use crate::domain::ports::EnzymeResolver;
use crate::utils::error::{Result, ZymeError};
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

const STEP_COMPOUND: &str = "KEGG compound search";
const STEP_REACTION: &str = "KEGG reaction link";
const STEP_ENZYME: &str = "KEGG enzyme link";
const STEP_ENTRY: &str = "KEGG enzyme entry";

pub struct KeggChainResolver {
    client: ResolverClient,
    base_url: String,
    timeout: Duration,
    step_delay: Duration,
}

impl KeggChainResolver {
    pub fn new(client: ResolverClient, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            timeout,
            step_delay: Duration::from_millis(100),
        }
    }

    /// Pause between dependent hops.
    pub fn with_step_delay(mut self, step_delay: Duration) -> Self {
        self.step_delay = step_delay;
        self
    }

    fn endpoint(&self, segments: &[&str]) -> Result<String> {
        let mut url = Url::parse(&self.base_url).map_err(|e| ZymeError::InvalidConfigValueError {
            field: "identity.kegg_base_url".to_string(),
            value: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        url.path_segments_mut()
            .map_err(|_| ZymeError::InvalidConfigValueError {
                field: "identity.kegg_base_url".to_string(),
                value: self.base_url.clone(),
                reason: "URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url.to_string())
    }

    /// Body of one hop, or `None` when KEGG answered with an empty body.
    async fn fetch(&self, step: &str, segments: &[&str]) -> Result<Option<String>> {
        let url = self.endpoint(segments)?;
        let response = self
            .client
            .get(&url, &[], self.timeout)
            .await
            .map_err(|e| e.at_step(step))?;

        if response.body.trim().is_empty() {
            tracing::info!("🔎 {}: no result for '{}'", step, segments.last().unwrap_or(&""));
            return Ok(None);
        }
        Ok(Some(response.body))
    }

    async fn pause(&self) {
        if !self.step_delay.is_zero() {
            tokio::time::sleep(self.step_delay).await;
        }
    }
}

#[async_trait]
impl EnzymeResolver for KeggChainResolver {
    async fn resolve(&self, ligand: &LigandQuery) -> Result<Option<EnzymeIdentity>> {
        tracing::info!("🧬 Querying KEGG for ligand '{}'", ligand);

        let Some(body) = self
            .fetch(STEP_COMPOUND, &["find", "compound", ligand.as_str()])
            .await?
        else {
            return Ok(None);
        };
        let compound_id = first_row_field(&body, 0, STEP_COMPOUND)?;
        tracing::info!("🧬 Found KEGG compound: {}", compound_id);
        self.pause().await;

        let Some(body) = self
            .fetch(STEP_REACTION, &["link", "reaction", &compound_id])
            .await?
        else {
            return Ok(None);
        };
        let reaction_id = first_row_field(&body, 1, STEP_REACTION)?;
        tracing::info!("🧬 Found associated reaction: {}", reaction_id);
        self.pause().await;

        let Some(body) = self
            .fetch(STEP_ENZYME, &["link", "enzyme", &reaction_id])
            .await?
        else {
            return Ok(None);
        };
        let ec_number = first_row_field(&body, 1, STEP_ENZYME)?;
        tracing::info!("🧬 Found EC number: {}", ec_number);
        self.pause().await;

        let Some(body) = self.fetch(STEP_ENTRY, &["get", &ec_number]).await? else {
            return Ok(None);
        };

        match extract_name_field(&body) {
            Some(name) => {
                tracing::info!("✅ Found template enzyme: {}", name);
                Ok(Some(EnzymeIdentity::new(name)))
            }
            None => {
                tracing::info!("🔎 {}: no NAME field for {}", STEP_ENTRY, ec_number);
                Ok(None)
            }
        }
    }

    fn strategy_name(&self) -> &str {
        "kegg"
    }
}

/// Tab-delimited field `index` of the first line.
pub fn first_row_field(body: &str, index: usize, step: &str) -> Result<String> {
    let first_line = body.lines().next().unwrap_or_default();
    first_line
        .split('\t')
        .nth(index)
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            ZymeError::malformed(step, format!("first row has no field {}", index + 1))
        })
}

/// Value of the first line tagged `NAME`, cut at the first `;`.
pub fn extract_name_field(entry: &str) -> Option<String> {
    entry
        .lines()
        .find(|line| line.split_whitespace().next() == Some("NAME"))
        .map(|line| {
            let value = line.trim_start().trim_start_matches("NAME").trim();
            value.split(';').next().unwrap_or_default().trim().to_string()
        })
        .filter(|name| !name.is_empty())
}
