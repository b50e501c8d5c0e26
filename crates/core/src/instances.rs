use crate::error::{Result, WpImportError};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Saved credentials for one WriteFreely instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Instance {
    /// Instance address as the user typed it.
    pub url: String,
    /// Access token from a previous sign-in.
    pub token: String,
}

/// Named instances stored in an INI file.
///
/// ```ini
/// ; comments start with a semicolon
/// [pencil]
/// url=https://pencil.writefree.ly
/// token=00000000-0000-0000-0000-000000000000
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceStore {
    instances: BTreeMap<String, Instance>,
}

impl InstanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// `<config dir>/wp-import/instances.ini`
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("wp-import").join("instances.ini"))
            .ok_or_else(|| WpImportError::ConfigError("Cannot determine the user config directory".to_string()))
    }

    /// Load a store from disk. A missing file yields an empty store.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no instances file");
            return Ok(Self::new());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| WpImportError::ConfigError(format!("Cannot open file {}: {}", path.display(), e)))?;
        Self::parse_string(&content)
    }

    /// Parse INI text
    pub fn parse_string(content: &str) -> Result<Self> {
        let mut store = Self::new();
        let mut section: Option<String> = None;
        let mut line_number = 0;

        for line in content.lines() {
            line_number += 1;
            let line = line.trim();

            if line.is_empty() || line.starts_with(';') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[') {
                let name = name.strip_suffix(']').ok_or_else(|| malformed(line_number, "unterminated section"))?;
                store.instances.entry(name.to_string()).or_default();
                section = Some(name.to_string());
                continue;
            }

            let Some(name) = section.as_ref() else {
                return Err(malformed(line_number, "key outside of a section"));
            };
            let (key, value) = line.split_once('=').ok_or_else(|| malformed(line_number, "expected key=value"))?;

            let instance = store.instances.entry(name.clone()).or_default();
            match key.trim() {
                "url" => instance.url = value.trim().to_string(),
                "token" => instance.token = value.trim().to_string(),
                other => return Err(malformed(line_number, &format!("unknown key '{}'", other))),
            }
        }

        Ok(store)
    }

    pub fn get(&self, name: &str) -> Option<&Instance> {
        self.instances.get(name)
    }

    /// Adds or replaces the instance called `name`.
    pub fn insert(&mut self, name: impl Into<String>, instance: Instance) {
        self.instances.insert(name.into(), instance);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.instances.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn to_ini_string(&self) -> String {
        let mut out = String::new();
        for (name, instance) in &self.instances {
            if !out.is_empty() {
                out.push('\n');
            }
            let _ = writeln!(out, "[{}]", name);
            let _ = writeln!(out, "url={}", instance.url);
            let _ = writeln!(out, "token={}", instance.token);
        }
        out
    }

    /// Write the store to `path`, creating parent directories.
    ///
    /// On Unix the file is readable by the owner only since it holds tokens.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_ini_string())?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!(path = %path.display(), count = self.instances.len(), "saved instances");
        Ok(())
    }
}

fn malformed(line_number: usize, reason: &str) -> WpImportError {
    WpImportError::ConfigError(format!("Malformed ini file at line {}: {}", line_number, reason))
}
