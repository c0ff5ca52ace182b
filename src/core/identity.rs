use crate::adapters::http::ResolverClient;
use crate::adapters::kegg::KeggChainResolver;
use crate::config::toml_config::{IdentityStrategy, ZymeConfig};
use crate::domain::model::{EnzymeIdentity, LigandQuery};
use crate::domain::ports::EnzymeResolver;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// Placeholder ligand → enzyme table. Keys are lower-case.
pub fn default_table() -> HashMap<String, String> {
    [
        ("pga", "Dispersin B"),
        ("beta(1,6)-linked n-acetylglucosamine", "Dispersin B"),
        ("poly-n-acetylglucosamine", "Dispersin B"),
        ("dna", "DNAS1_BOVIN"),
        ("protein", "Proteinase K"),
    ]
    .into_iter()
    .map(|(ligand, enzyme)| (ligand.to_string(), enzyme.to_string()))
    .collect()
}

/// Case-insensitive exact match against a fixed table.
#[derive(Debug, Clone)]
pub struct StaticLookup {
    table: HashMap<String, String>,
}

impl StaticLookup {
    pub fn new(table: HashMap<String, String>) -> Self {
        Self {
            table: table
                .into_iter()
                .map(|(ligand, enzyme)| (ligand.to_lowercase(), enzyme))
                .collect(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(default_table())
    }

    /// Merges extra rows over the current table; later rows win.
    pub fn extend(mut self, extra: &HashMap<String, String>) -> Self {
        for (ligand, enzyme) in extra {
            self.table.insert(ligand.to_lowercase(), enzyme.clone());
        }
        self
    }

    pub fn lookup(&self, ligand: &str) -> Option<&str> {
        self.table.get(&ligand.to_lowercase()).map(String::as_str)
    }
}

impl Default for StaticLookup {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[async_trait]
impl EnzymeResolver for StaticLookup {
    async fn resolve(&self, ligand: &LigandQuery) -> Result<Option<EnzymeIdentity>> {
        match self.lookup(ligand.as_str()) {
            Some(enzyme) => {
                tracing::info!("🧭 Static lookup: '{}' → {}", ligand, enzyme);
                Ok(Some(EnzymeIdentity::new(enzyme)))
            }
            None => {
                tracing::info!("🔎 '{}' is not in the static lookup table", ligand);
                Ok(None)
            }
        }
    }

    fn strategy_name(&self) -> &str {
        "static"
    }
}

/// Builds the configured identity strategy once per run.
pub fn build_identity_resolver(
    config: &ZymeConfig,
    client: ResolverClient,
) -> Box<dyn EnzymeResolver> {
    match config.identity.strategy {
        IdentityStrategy::Static => {
            Box::new(StaticLookup::with_defaults().extend(&config.identity.table))
        }
        IdentityStrategy::Kegg => Box::new(
            KeggChainResolver::new(client, &config.identity.kegg_base_url, config.http.timeout())
                .with_step_delay(Duration::from_millis(config.identity.step_delay_ms)),
        ),
    }
}
