use crate::adapters::http::RetryPolicy;
use crate::utils::error::{Result, ZymeError};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_range,
    validate_retry_statuses, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Full pipeline configuration. Every section and field has a default, so an
/// empty file (or no file) yields a runnable configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ZymeConfig {
    pub run: RunConfig,
    pub http: HttpConfig,
    pub identity: IdentityConfig,
    pub protein: ProteinConfig,
    pub structure: StructureConfig,
    pub generator: GeneratorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub output_root: String,
    pub count: usize,
    pub max_length: Option<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            output_root: "static".to_string(),
            count: 3,
            max_length: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub backoff_base_ms: u64,
    pub retry_statuses: Vec<u16>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            timeout_seconds: 30,
            retry_attempts: policy.max_retries,
            backoff_base_ms: policy.backoff_base.as_millis() as u64,
            retry_statuses: policy.retry_statuses,
        }
    }
}

impl HttpConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.retry_attempts,
            backoff_base: Duration::from_millis(self.backoff_base_ms),
            retry_statuses: self.retry_statuses.clone(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum IdentityStrategy {
    #[default]
    Static,
    Kegg,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub strategy: IdentityStrategy,
    pub kegg_base_url: String,
    pub step_delay_ms: u64,
    /// Extra ligand → enzyme rows merged over the built-in table.
    pub table: HashMap<String, String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            strategy: IdentityStrategy::Static,
            kegg_base_url: "https://rest.kegg.jp".to_string(),
            step_delay_ms: 100,
            table: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProteinConfig {
    pub search_url: String,
    /// Enzyme name → UniProt query replacing `(protein_name:"...")` in the reviewed search.
    pub query_hints: HashMap<String, String>,
}

impl Default for ProteinConfig {
    fn default() -> Self {
        Self {
            search_url: "https://rest.uniprot.org/uniprotkb/search".to_string(),
            query_hints: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureConfig {
    pub enabled: bool,
    pub alphafold_url: String,
    /// PubChem 3-D SDF download for the ligand itself.
    pub ligand_enabled: bool,
    pub pubchem_url: String,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            alphafold_url: "https://alphafold.ebi.ac.uk/api/prediction".to_string(),
            ligand_enabled: true,
            pubchem_url: "https://pubchem.ncbi.nlm.nih.gov/rest/pug".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub endpoint: String,
    pub api_token: Option<String>,
    pub seed: String,
    pub eos_marker: String,
    pub timeout_seconds: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api-inference.huggingface.co/models/AI4PD/ZymCTRL".to_string(),
            api_token: None,
            seed: "<|endoftext|>".to_string(),
            eos_marker: "<|endoftext|>".to_string(),
            timeout_seconds: 120,
        }
    }
}

impl GeneratorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl ZymeConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ZymeError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ZymeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${HF_TOKEN})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ZymeError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        Ok(re
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_path("run.output_root", &self.run.output_root)?;
        validate_positive_number("run.count", self.run.count, 1)?;
        if let Some(max_length) = self.run.max_length {
            validate_positive_number("run.max_length", max_length, 1)?;
        }

        validate_range("http.timeout_seconds", self.http.timeout_seconds, 1, 600)?;
        validate_range("http.retry_attempts", self.http.retry_attempts, 0, 10)?;
        validate_retry_statuses("http.retry_statuses", &self.http.retry_statuses)?;

        if self.identity.strategy == IdentityStrategy::Kegg {
            validate_url("identity.kegg_base_url", &self.identity.kegg_base_url)?;
        }
        for (ligand, enzyme) in &self.identity.table {
            validate_non_empty_string("identity.table", ligand)?;
            validate_non_empty_string(&format!("identity.table.{}", ligand), enzyme)?;
        }

        validate_url("protein.search_url", &self.protein.search_url)?;
        if self.structure.enabled {
            validate_url("structure.alphafold_url", &self.structure.alphafold_url)?;
        }
        if self.structure.ligand_enabled {
            validate_url("structure.pubchem_url", &self.structure.pubchem_url)?;
        }

        validate_url("generator.endpoint", &self.generator.endpoint)?;
        validate_non_empty_string("generator.seed", &self.generator.seed)?;
        validate_range("generator.timeout_seconds", self.generator.timeout_seconds, 1, 3600)?;

        Ok(())
    }
}

impl Validate for ZymeConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config = ZymeConfig::from_toml_str("").unwrap();
        assert_eq!(config.run.output_root, "static");
        assert_eq!(config.run.count, 3);
        assert_eq!(config.identity.strategy, IdentityStrategy::Static);
        assert_eq!(config.http.retry_statuses, vec![500, 502, 503, 504]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[run]
output_root = "./runs"
count = 5
max_length = 120

[http]
timeout_seconds = 10
retry_attempts = 2

[identity]
strategy = "kegg"
kegg_base_url = "https://rest.kegg.jp"

[identity.table]
chitin = "Chitinase A"

[protein.query_hints]
"chitinase a" = "(gene:chiA) AND (organism_id:562)"

[structure]
enabled = false
ligand_enabled = false
"#;

        let config = ZymeConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.run.output_root, "./runs");
        assert_eq!(config.run.max_length, Some(120));
        assert_eq!(config.identity.strategy, IdentityStrategy::Kegg);
        assert_eq!(config.identity.table.get("chitin").unwrap(), "Chitinase A");
        assert!(!config.structure.enabled);
        assert!(!config.structure.ligand_enabled);
        assert_eq!(config.http.retry_policy().max_retries, 2);
        assert_eq!(config.http.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("ZYMEFLOW_TEST_TOKEN", "hf_secret");

        let toml_content = r#"
[generator]
api_token = "${ZYMEFLOW_TEST_TOKEN}"
"#;

        let config = ZymeConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.generator.api_token.as_deref(), Some("hf_secret"));

        std::env::remove_var("ZYMEFLOW_TEST_TOKEN");
    }

    #[test]
    fn test_config_validation_rejects_bad_values() {
        let bad_url = ZymeConfig::from_toml_str("[protein]\nsearch_url = \"invalid-url\"\n").unwrap();
        assert!(bad_url.validate().is_err());

        let zero_count = ZymeConfig::from_toml_str("[run]\ncount = 0\n").unwrap();
        assert!(zero_count.validate().is_err());

        let retry_4xx = ZymeConfig::from_toml_str("[http]\nretry_statuses = [429]\n").unwrap();
        assert!(retry_4xx.validate().is_err());
    }

    #[test]
    fn test_config_validation_enforces_paths_and_ranges() {
        let empty_root = ZymeConfig::from_toml_str("[run]\noutput_root = \"\"\n").unwrap();
        assert!(empty_root.validate().is_err());

        let too_many_retries = ZymeConfig::from_toml_str("[http]\nretry_attempts = 11\n").unwrap();
        assert!(too_many_retries.validate().is_err());

        let slow_http = ZymeConfig::from_toml_str("[http]\ntimeout_seconds = 601\n").unwrap();
        assert!(slow_http.validate().is_err());

        let hour_generator =
            ZymeConfig::from_toml_str("[generator]\ntimeout_seconds = 3600\n").unwrap();
        assert!(hour_generator.validate().is_ok());

        let slow_generator =
            ZymeConfig::from_toml_str("[generator]\ntimeout_seconds = 3601\n").unwrap();
        assert!(slow_generator.validate().is_err());
    }

    #[test]
    fn test_disabled_ligand_structure_skips_pubchem_url_check() {
        let bad = "[structure]\npubchem_url = \"not a url\"\n";
        assert!(ZymeConfig::from_toml_str(bad).unwrap().validate().is_err());

        let disabled = format!("{}ligand_enabled = false\n", bad);
        assert!(ZymeConfig::from_toml_str(&disabled).unwrap().validate().is_ok());
    }

    #[test]
    fn test_example_config_is_valid() {
        let config =
            ZymeConfig::from_toml_str(include_str!("../../zymeflow.example.toml")).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.identity.table.get("chitin").unwrap(), "Chitinase A");
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[run]\noutput_root = \"./from-file\"\n")
            .unwrap();

        let config = ZymeConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.run.output_root, "./from-file");
    }
}
