//! Files under the data directory: RON configuration and the library catalog.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shelf_core::{AdvancedSettings, ViewPreferences};
use shelf_logging::{shelf_info, shelf_warn};
use shelf_store::{ensure_dir, read_optional, AtomicFileWriter, LibrarySnapshot};

const SETTINGS_FILE: &str = "settings.ron";
const VIEW_PREFS_FILE: &str = "view_prefs.ron";
const LIBRARY_FILE: &str = "library.ron";
const DATABASE_FILE: &str = "shelf.db";
const LOG_FILE: &str = "mangashelf.log";

#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Uses `explicit` when given, else the platform's local data directory.
    pub fn resolve(explicit: Option<PathBuf>) -> Result<Self> {
        let root = match explicit {
            Some(dir) => dir,
            None => dirs::data_local_dir()
                .ok_or_else(|| anyhow!("no local data directory on this platform; pass --data-dir"))?
                .join("mangashelf"),
        };
        ensure_dir(&root).with_context(|| format!("preparing data directory {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn database(&self) -> PathBuf {
        self.root.join(DATABASE_FILE)
    }

    pub fn log_file(&self) -> PathBuf {
        self.root.join(LOG_FILE)
    }

    /// Parent of `covers/` and `custom_covers/`.
    pub fn cover_root(&self) -> PathBuf {
        self.root.join("cache")
    }

    pub fn chapter_cache(&self) -> PathBuf {
        self.root.join("cache").join("chapters")
    }

    pub fn downloads(&self) -> PathBuf {
        self.root.join("downloads")
    }

    /// Strict: the caller decides how to fall back.
    pub fn load_settings(&self) -> Result<AdvancedSettings> {
        Ok(self.load(SETTINGS_FILE)?.unwrap_or_default())
    }

    pub fn save_settings(&self, settings: &AdvancedSettings) -> Result<()> {
        self.save(SETTINGS_FILE, settings)
    }

    pub fn load_view_prefs(&self) -> ViewPreferences {
        match self.load(VIEW_PREFS_FILE) {
            Ok(prefs) => prefs.unwrap_or_default(),
            Err(err) => {
                shelf_warn!("Ignoring saved view preferences: {:#}", err);
                ViewPreferences::default()
            }
        }
    }

    pub fn save_view_prefs(&self, prefs: &ViewPreferences) -> Result<()> {
        self.save(VIEW_PREFS_FILE, prefs)
    }

    /// Unlike the other files, a catalog that fails to parse is an error.
    pub fn load_library(&self) -> Result<LibrarySnapshot> {
        Ok(self.load(LIBRARY_FILE)?.unwrap_or_default())
    }

    pub fn save_library(&self, library: &LibrarySnapshot) -> Result<()> {
        self.save(LIBRARY_FILE, library)
    }

    fn load<T: DeserializeOwned>(&self, filename: &str) -> Result<Option<T>> {
        let path = self.root.join(filename);
        let Some(content) = read_optional(&self.root, filename)
            .with_context(|| format!("reading {}", path.display()))?
        else {
            return Ok(None);
        };
        let value = ron::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        shelf_info!("Loaded {}", path.display());
        Ok(Some(value))
    }

    fn save<T: Serialize>(&self, filename: &str, value: &T) -> Result<()> {
        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(value, pretty)
            .with_context(|| format!("serializing {filename}"))?;
        AtomicFileWriter::new(self.root.clone())
            .write(filename, &content)
            .with_context(|| format!("writing {}", self.root.join(filename).display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shelf_core::{DohProvider, GroupByMode};
    use tempfile::TempDir;

    fn data_dir(temp: &TempDir) -> DataDir {
        DataDir::resolve(Some(temp.path().join("data"))).unwrap()
    }

    #[test]
    fn missing_files_give_defaults() {
        let temp = TempDir::new().unwrap();
        let data = data_dir(&temp);
        assert_eq!(data.load_settings().unwrap(), AdvancedSettings::default());
        assert_eq!(data.load_view_prefs(), ViewPreferences::default());
        assert_eq!(data.load_library().unwrap(), LibrarySnapshot::default());
    }

    #[test]
    fn settings_round_trip() {
        let temp = TempDir::new().unwrap();
        let data = data_dir(&temp);
        let settings = AdvancedSettings {
            verbose_logging: true,
            doh_provider: DohProvider::Quad9,
            ..AdvancedSettings::default()
        };
        data.save_settings(&settings).unwrap();
        assert_eq!(data.load_settings().unwrap(), settings);
    }

    #[test]
    fn partial_settings_file_fills_in_defaults() {
        let temp = TempDir::new().unwrap();
        let data = data_dir(&temp);
        std::fs::write(data.root().join(SETTINGS_FILE), "(verbose_logging: true)").unwrap();

        let settings = data.load_settings().unwrap();
        assert!(settings.verbose_logging);
        assert_eq!(settings.user_agent, AdvancedSettings::default().user_agent);
    }

    #[test]
    fn corrupt_view_prefs_fall_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        let data = data_dir(&temp);
        std::fs::write(data.root().join(VIEW_PREFS_FILE), "not ron at all").unwrap();
        assert_eq!(data.load_view_prefs(), ViewPreferences::default());

        let prefs = ViewPreferences {
            group_by_mode: GroupByMode::BySource,
            ..ViewPreferences::default()
        };
        data.save_view_prefs(&prefs).unwrap();
        assert_eq!(data.load_view_prefs(), prefs);
    }

    #[test]
    fn corrupt_library_is_an_error() {
        let temp = TempDir::new().unwrap();
        let data = data_dir(&temp);
        std::fs::write(data.root().join(LIBRARY_FILE), "(library: [oops").unwrap();
        assert!(data.load_library().is_err());
    }
}
