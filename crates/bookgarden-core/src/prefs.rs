use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DEFAULT_YEARLY_GOAL: u32 = 12;

/// User preferences persisted across runs.
///
/// Passed explicitly to whatever needs it — there is no process-wide
/// singleton. The store imposes no range constraint on the goal; the CLI
/// validates before calling.
pub trait PreferenceStore {
    /// Target number of books to harvest this calendar year. Defaults to 12.
    fn yearly_goal(&self) -> u32;

    fn set_yearly_goal(&mut self, goal: u32) -> Result<()>;

    /// One-way flag, flipped after the first goal-setting flow.
    fn onboarding_completed(&self) -> bool;

    fn set_onboarding_completed(&mut self, completed: bool) -> Result<()>;
}

// ─── Persisted values ───────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub yearly_goal: u32,
    pub onboarding_completed: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            yearly_goal: DEFAULT_YEARLY_GOAL,
            onboarding_completed: false,
        }
    }
}

// ─── TOML-backed store ──────────────────────────────────────

/// Preference store backed by a TOML file under the garden directory.
/// Unreadable or missing files read as defaults; writes are last-write-wins.
pub struct TomlPreferences {
    path: PathBuf,
    values: Preferences,
}

impl TomlPreferences {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = Self::read(&path).unwrap_or_default();
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(path: &Path) -> Option<Preferences> {
        let contents = std::fs::read_to_string(path).ok()?;
        toml::from_str(&contents).ok()
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, toml_str)?;
        Ok(())
    }
}

impl PreferenceStore for TomlPreferences {
    fn yearly_goal(&self) -> u32 {
        self.values.yearly_goal
    }

    fn set_yearly_goal(&mut self, goal: u32) -> Result<()> {
        self.values.yearly_goal = goal;
        self.persist()
    }

    fn onboarding_completed(&self) -> bool {
        self.values.onboarding_completed
    }

    fn set_onboarding_completed(&mut self, completed: bool) -> Result<()> {
        self.values.onboarding_completed = completed;
        self.persist()
    }
}

// ─── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fresh_store_has_defaults() {
        let dir = TempDir::new().unwrap();
        let prefs = TomlPreferences::open(dir.path().join("preferences.toml"));
        assert_eq!(prefs.yearly_goal(), 12);
        assert!(!prefs.onboarding_completed());
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.toml");

        let mut prefs = TomlPreferences::open(&path);
        prefs.set_yearly_goal(24).unwrap();
        prefs.set_onboarding_completed(true).unwrap();

        let reopened = TomlPreferences::open(&path);
        assert_eq!(reopened.yearly_goal(), 24);
        assert!(reopened.onboarding_completed());
    }

    #[test]
    fn test_corrupt_file_reads_as_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.toml");
        std::fs::write(&path, "not valid toml [[[").unwrap();

        let prefs = TomlPreferences::open(&path);
        assert_eq!(prefs.yearly_goal(), 12);
        assert!(!prefs.onboarding_completed());
    }

    #[test]
    fn test_set_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("preferences.toml");

        let mut prefs = TomlPreferences::open(&path);
        prefs.set_yearly_goal(50).unwrap();
        assert!(path.exists());
    }
}
