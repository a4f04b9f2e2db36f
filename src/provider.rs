// Challenger providers
//
// A provider hands the controller one challenger per generation. The file-backed
// provider re-reads a hand-edited source file each time.

use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GauntletError, Result};
use crate::sandbox::source_for;
use crate::series::Contestant;

/// Decision function written when the challenger file does not exist yet
pub const PLACEHOLDER_STRATEGY: &str = "random";

pub trait StrategyProvider {
    /// Produces this generation's challenger; `champion_source` is the current best
    fn next_challenger(
        &mut self,
        generation: u64,
        champion_source: Option<&str>,
    ) -> Result<Contestant>;

    /// File name recorded on the leaderboard when archiving fails
    fn origin(&self) -> String;
}

pub struct FileChallengerProvider {
    path: PathBuf,
    default_name: String,
}

impl FileChallengerProvider {
    /// Writes a random-mover placeholder when `path` is missing
    pub fn new<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            info!(
                "Challenger file '{}' not found. Creating a default placeholder.",
                path.display()
            );
            fs::write(&path, source_for(PLACEHOLDER_STRATEGY))?;
        }
        Ok(FileChallengerProvider {
            path,
            default_name: "DefaultChallenger".to_string(),
        })
    }

    /// Name prefix used when the file has no usable stem
    pub fn with_default_name(mut self, name: &str) -> Self {
        self.default_name = name.to_string();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl StrategyProvider for FileChallengerProvider {
    fn next_challenger(
        &mut self,
        generation: u64,
        _champion_source: Option<&str>,
    ) -> Result<Contestant> {
        let source = fs::read_to_string(&self.path).map_err(|e| {
            GauntletError::ChallengerUnavailable(format!("{}: {}", self.path.display(), e))
        })?;
        let stem = self.stem();
        let name = if stem.is_empty() {
            format!("{}_Gen{}", self.default_name, generation)
        } else {
            format!("ManualChallenger_{}_Gen{}", stem, generation)
        };
        info!("Using manual challenger '{}' from '{}'", name, self.path.display());
        Ok(Contestant::new(name, source))
    }

    fn origin(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
