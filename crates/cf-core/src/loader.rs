//! Profile discovery: a directory of `*.json` files or the bundled set.
//!
//! A file that fails to read or parse does not stop the others from
//! loading. Its error is kept as a warning and loading only fails when
//! nothing usable was found.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use cf_engine::render;
use cf_protocol::{ProfileFile, ProfileVariant};
use thiserror::Error;

const BUNDLED: &[(&str, &str)] = &[
    ("certutil", include_str!("../profiles/certutil.json")),
    ("curl", include_str!("../profiles/curl.json")),
    ("powershell", include_str!("../profiles/powershell.json")),
];

/// Platform key for variants that do not name one.
pub const OTHER_PLATFORM: &str = "other";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid profile {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no profiles found in {0}")]
    Empty(PathBuf),
    #[error("unknown executable {0:?}")]
    UnknownExecutable(String),
    #[error("profile {0:?} has no variants")]
    NoVariants(String),
}

/// Loaded profiles plus the per-file problems met on the way.
#[derive(Debug, Default)]
pub struct ProfileSet {
    files: Vec<ProfileFile>,
    pub warnings: Vec<LoadError>,
}

impl ProfileSet {
    pub fn from_files(mut files: Vec<ProfileFile>) -> Self {
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            files,
            warnings: Vec::new(),
        }
    }

    /// The profiles compiled into the binary.
    pub fn bundled() -> Result<Self, LoadError> {
        let files = BUNDLED
            .iter()
            .map(|(name, text)| {
                parse_profile(name, text).map_err(|source| LoadError::Parse {
                    path: PathBuf::from(format!("<bundled>/{name}.json")),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_files(files))
    }

    /// Every `*.json` file directly inside `dir`, sorted by name.
    pub fn load_dir(dir: &Path) -> Result<Self, LoadError> {
        let io_err = |source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(io_err)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut files = Vec::new();
        let mut warnings = Vec::new();
        for path in paths {
            match load_file(&path) {
                Ok(file) => files.push(file),
                Err(e) => warnings.push(e),
            }
        }

        if files.is_empty() {
            return Err(LoadError::Empty(dir.to_path_buf()));
        }
        let mut set = Self::from_files(files);
        set.warnings = warnings;
        Ok(set)
    }

    pub fn files(&self) -> &[ProfileFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Lowercased profile name and every variant alias -> index in `files()`.
    pub fn index_by_name(&self) -> BTreeMap<String, usize> {
        let mut index = BTreeMap::new();
        for (i, file) in self.files.iter().enumerate() {
            index.entry(file.name.to_lowercase()).or_insert(i);
            for alias in file.variants.iter().flat_map(|v| &v.alias) {
                index.entry(alias.to_lowercase()).or_insert(i);
            }
        }
        index
    }

    /// Find a profile by name or alias, ignoring case. `certutil.exe`
    /// also finds a `certutil` profile without that alias.
    pub fn find(&self, executable: &str) -> Result<&ProfileFile, LoadError> {
        let index = self.index_by_name();
        let key = executable.to_lowercase();
        index
            .get(&key)
            .or_else(|| key.strip_suffix(".exe").and_then(|stem| index.get(stem)))
            .map(|&i| &self.files[i])
            .ok_or_else(|| LoadError::UnknownExecutable(executable.to_string()))
    }

    /// Platform -> profiles with at least one variant for it. A file
    /// appears once under each platform its variants name.
    pub fn group_by_platform(&self) -> BTreeMap<String, Vec<&ProfileFile>> {
        let mut groups: BTreeMap<String, Vec<&ProfileFile>> = BTreeMap::new();
        for file in &self.files {
            let mut platforms: Vec<String> = file
                .variants
                .iter()
                .map(|v| platform_key(&v.platform))
                .collect();
            platforms.sort();
            platforms.dedup();
            for platform in platforms {
                groups.entry(platform).or_default().push(file);
            }
        }
        groups
    }
}

fn platform_key(platform: &str) -> String {
    if platform.trim().is_empty() {
        OTHER_PLATFORM.to_string()
    } else {
        platform.trim().to_lowercase()
    }
}

/// Parse one profile file. `name` becomes the profile's name.
pub fn parse_profile(name: &str, text: &str) -> Result<ProfileFile, serde_json::Error> {
    let mut file: ProfileFile = serde_json::from_str(text)?;
    file.name = name.to_string();
    Ok(file)
}

fn load_file(path: &Path) -> Result<ProfileFile, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    parse_profile(&name, &text).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// The variant's command template as a command line.
pub fn template_command(variant: &ProfileVariant) -> String {
    render(&variant.template_tokens())
}
