// Champion vault: archived champion sources plus the current-best strategy

use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GauntletError, Result};
use crate::sandbox::source_for;

/// Decision function written as the current best when none exists yet
pub const DEFAULT_BEST_STRATEGY: &str = "food_seeker";

/// Storage for crowned strategy sources
pub trait ChampionVault {
    /// Whether an archived file with this name still exists
    fn contains(&self, file: &str) -> bool;
    fn read(&self, file: &str) -> Result<String>;
    /// Archives `source` for a champion and returns the file name used
    fn archive(&mut self, name: &str, generation: u64, source: &str) -> Result<String>;
    fn read_best(&self) -> Result<String>;
    fn write_best(&mut self, source: &str) -> Result<()>;
    /// Label for the current best when no leaderboard entry names it
    fn best_label(&self) -> String;
}

/// Keeps only `[A-Za-z0-9_.() -]`, trims, then turns spaces into underscores
pub fn sanitize_name(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '(' | ')' | ' ' | '-'))
        .collect();
    kept.trim().replace(' ', "_")
}

/// `{sanitized}_Gen{g}.{ext}`, with `UnnamedChampion_Gen{g}` standing in for an empty name
pub fn archive_file_name(name: &str, generation: u64, extension: &str) -> String {
    let mut safe = sanitize_name(name);
    if safe.is_empty() {
        safe = format!("UnnamedChampion_Gen{}", generation);
    }
    format!("{}_Gen{}.{}", safe, generation, extension)
}

/// A directory of archived champions and a separate best-strategy file
pub struct DirectoryVault {
    dir: PathBuf,
    best_file: PathBuf,
    extension: String,
}

impl DirectoryVault {
    /// Creates the champions directory and a default best file as needed
    pub fn open<D: Into<PathBuf>, B: Into<PathBuf>>(
        dir: D,
        best_file: B,
        extension: &str,
    ) -> Result<Self> {
        let dir = dir.into();
        let best_file = best_file.into();

        if !dir.exists() {
            fs::create_dir_all(&dir)?;
            info!("Created champions directory: {}", dir.display());
        }
        if !best_file.exists() {
            info!(
                "Best strategy file '{}' not found. Creating a default.",
                best_file.display()
            );
            fs::write(&best_file, source_for(DEFAULT_BEST_STRATEGY))?;
        }

        Ok(DirectoryVault {
            dir,
            best_file,
            extension: extension.trim_start_matches('.').to_string(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn best_file(&self) -> &Path {
        &self.best_file
    }
}

impl ChampionVault for DirectoryVault {
    fn contains(&self, file: &str) -> bool {
        self.dir.join(file).is_file()
    }

    fn read(&self, file: &str) -> Result<String> {
        let path = self.dir.join(file);
        fs::read_to_string(&path).map_err(|e| {
            GauntletError::StrategyLoad(format!("reading {}: {}", path.display(), e))
        })
    }

    fn archive(&mut self, name: &str, generation: u64, source: &str) -> Result<String> {
        let file = archive_file_name(name, generation, &self.extension);
        let path = self.dir.join(&file);
        fs::write(&path, source).map_err(|e| {
            GauntletError::Persistence(format!("archiving to {}: {}", path.display(), e))
        })?;
        info!("Archived new champion's source to: {}", path.display());
        Ok(file)
    }

    fn read_best(&self) -> Result<String> {
        fs::read_to_string(&self.best_file).map_err(|e| {
            GauntletError::StrategyLoad(format!("reading {}: {}", self.best_file.display(), e))
        })
    }

    fn write_best(&mut self, source: &str) -> Result<()> {
        fs::write(&self.best_file, source).map_err(|e| {
            GauntletError::Persistence(format!(
                "updating {}: {}",
                self.best_file.display(),
                e
            ))
        })
    }

    fn best_label(&self) -> String {
        let stem = self
            .best_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("InitialChampion_{}", stem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_and_underscores() {
        assert_eq!(sanitize_name("  Viper (v2) <fast>!  "), "Viper_(v2)_fast");
        assert_eq!(sanitize_name("a-b.c_d"), "a-b.c_d");
        assert_eq!(sanitize_name("日本"), "");
    }

    #[test]
    fn test_archive_file_name() {
        assert_eq!(archive_file_name("Cobra King", 4, "toml"), "Cobra_King_Gen4.toml");
        assert_eq!(
            archive_file_name("???", 7, "toml"),
            "UnnamedChampion_Gen7_Gen7.toml"
        );
    }

    #[test]
    fn test_open_creates_directory_and_default_best() {
        let dir = tempfile::tempdir().unwrap();
        let vault = DirectoryVault::open(
            dir.path().join("past_champions"),
            dir.path().join("best_snake_logic.toml"),
            "toml",
        )
        .unwrap();
        assert!(vault.dir().is_dir());
        assert_eq!(vault.read_best().unwrap(), source_for(DEFAULT_BEST_STRATEGY));
        assert_eq!(vault.best_label(), "InitialChampion_best_snake_logic");
    }

    #[test]
    fn test_open_keeps_existing_best() {
        let dir = tempfile::tempdir().unwrap();
        let best = dir.path().join("best.toml");
        fs::write(&best, source_for("cautious")).unwrap();
        let vault = DirectoryVault::open(dir.path().join("champs"), &best, "toml").unwrap();
        assert_eq!(vault.read_best().unwrap(), source_for("cautious"));
    }

    #[test]
    fn test_archive_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let mut vault =
            DirectoryVault::open(dir.path().join("champs"), dir.path().join("best.toml"), ".toml")
                .unwrap();
        let file = vault.archive("Rattler", 3, &source_for("cautious")).unwrap();
        assert_eq!(file, "Rattler_Gen3.toml");
        assert!(vault.contains(&file));
        assert_eq!(vault.read(&file).unwrap(), source_for("cautious"));
        assert!(!vault.contains("Nobody_Gen1.toml"));
    }
}
