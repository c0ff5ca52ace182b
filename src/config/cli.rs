use crate::domain::model::LigandQuery;
use crate::domain::ports::Storage;
use crate::utils::error::{Result, ZymeError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }

    async fn remove_file(&self, path: &str) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);
        match fs::remove_file(full_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ZymeError::IoError(e)),
        }
    }
}

/// Per-ligand output directory `<output_root>/<slug>_pdb_files`.
///
/// A directory that already exists means the ligand was processed before;
/// claiming it fails with `AlreadyProcessed` and nothing is overwritten.
#[derive(Debug, Clone)]
pub struct RunDirectory {
    path: PathBuf,
}

impl RunDirectory {
    pub fn path_for(output_root: impl AsRef<Path>, ligand: &LigandQuery) -> PathBuf {
        output_root
            .as_ref()
            .join(format!("{}_pdb_files", ligand.slug()))
    }

    pub fn claim(output_root: impl AsRef<Path>, ligand: &LigandQuery) -> Result<Self> {
        let output_root = output_root.as_ref();
        fs::create_dir_all(output_root)?;

        let path = Self::path_for(output_root, ligand);
        match fs::create_dir(&path) {
            Ok(()) => {
                tracing::info!("📁 Created output directory {}", path.display());
                Ok(Self { path })
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(ZymeError::AlreadyProcessed {
                path: path.display().to_string(),
            }),
            Err(e) => Err(ZymeError::IoError(e)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn storage(&self) -> LocalStorage {
        LocalStorage::new(self.path.to_string_lossy().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_local_storage_write_and_remove() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().to_string_lossy().to_string());

        storage.write_file("nested/PGA.fasta", b">original|Q840G9\nMKV").await.unwrap();
        let data = fs::read(dir.path().join("nested/PGA.fasta")).unwrap();
        assert_eq!(data, b">original|Q840G9\nMKV");

        storage.remove_file("nested/PGA.fasta").await.unwrap();
        assert!(!dir.path().join("nested/PGA.fasta").exists());
        // already gone
        storage.remove_file("nested/PGA.fasta").await.unwrap();
    }

    #[test]
    fn test_claim_creates_slugged_directory() {
        let root = TempDir::new().unwrap();
        let run_dir = RunDirectory::claim(root.path(), &LigandQuery::new("PGA")).unwrap();

        assert!(run_dir.path().is_dir());
        assert_eq!(run_dir.path(), root.path().join("PGA_pdb_files"));
    }

    #[test]
    fn test_claim_refuses_existing_directory() {
        let root = TempDir::new().unwrap();
        let existing = root.path().join("PGA_pdb_files");
        fs::create_dir(&existing).unwrap();
        fs::write(existing.join("PGA.fasta"), "keep me").unwrap();

        let err = RunDirectory::claim(root.path(), &LigandQuery::new("PGA")).unwrap_err();

        assert!(matches!(err, ZymeError::AlreadyProcessed { .. }));
        assert_eq!(fs::read_to_string(existing.join("PGA.fasta")).unwrap(), "keep me");
    }

    #[test]
    fn test_claim_creates_missing_output_root() {
        let root = TempDir::new().unwrap();
        let nested = root.path().join("static");

        let run_dir = RunDirectory::claim(&nested, &LigandQuery::new("dna")).unwrap();
        assert!(run_dir.path().ends_with("dna_pdb_files"));
    }
}
