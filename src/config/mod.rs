pub mod cli;
pub mod toml_config;

pub use toml_config::{IdentityStrategy, ZymeConfig};

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_non_empty_string, validate_positive_number, Validate};
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "zymeflow")]
#[command(about = "Generate enzyme candidates for a ligand and write a browsable artifact set")]
pub struct CliConfig {
    /// Ligand or substrate name, e.g. PGA
    #[arg(long)]
    pub ligand: String,

    #[arg(long, help = "Number of candidates to generate")]
    pub count: Option<usize>,

    #[arg(long, help = "Maximum candidate length (defaults to the reference length)")]
    pub max_length: Option<usize>,

    #[arg(long, help = "TOML configuration file")]
    pub config: Option<String>,

    #[arg(long)]
    pub output_root: Option<String>,

    #[arg(long, value_enum, help = "Ligand → enzyme resolution strategy")]
    pub strategy: Option<IdentityStrategy>,

    #[arg(long, help = "Skip the AlphaFold and PubChem structure downloads")]
    pub no_structure: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log per-stage timing and memory usage")]
    pub monitor: bool,

    #[arg(long, help = "Emit JSON log lines")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Loads the TOML file (or defaults) and applies flag overrides on top.
    pub fn resolve_settings(&self) -> Result<ZymeConfig> {
        let mut settings = match &self.config {
            Some(path) => ZymeConfig::from_file(path)?,
            None => ZymeConfig::default(),
        };
        self.apply_overrides(&mut settings);
        Ok(settings)
    }

    pub fn apply_overrides(&self, settings: &mut ZymeConfig) {
        if let Some(count) = self.count {
            settings.run.count = count;
        }
        if let Some(max_length) = self.max_length {
            settings.run.max_length = Some(max_length);
        }
        if let Some(root) = &self.output_root {
            settings.run.output_root = root.clone();
        }
        if let Some(strategy) = self.strategy {
            settings.identity.strategy = strategy;
        }
        if self.no_structure {
            settings.structure.enabled = false;
            settings.structure.ligand_enabled = false;
        }
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("ligand", &self.ligand)?;
        if let Some(count) = self.count {
            validate_positive_number("count", count, 1)?;
        }
        if let Some(max_length) = self.max_length {
            validate_positive_number("max_length", max_length, 1)?;
        }
        Ok(())
    }
}
