#![deny(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};

use clif_model::category::normalize_category_key;
use clif_model::{CategoryTable, ClinicalDomain, Crosswalk};
use tracing::{debug, info, warn};

use crate::csv::categories::parse_category_csv;
use crate::csv::crosswalk::parse_crosswalk_csv;
use crate::error::StandardsError;
use crate::hash::sha256_hex;
use crate::manifest::{
    MANIFEST_FILE, MANIFEST_SCHEMA, MANIFEST_SCHEMA_VERSION, Manifest, ManifestFile, Pins,
};

pub const CROSSWALK_ROLE: &str = "concept_crosswalk";
/// Optional role pinning an upstream concept dictionary inside the bundle.
pub const CONCEPT_DICT_ROLE: &str = "concept_dict";

const ALLOWED_KINDS: &[&str] = &["csv", "json", "toml", "other"];

fn required_roles() -> Vec<&'static str> {
    let mut roles: Vec<&'static str> = ClinicalDomain::ALL
        .iter()
        .map(ClinicalDomain::standards_role)
        .collect();
    roles.push(CROSSWALK_ROLE);
    roles
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct VerifySummary {
    pub standards_dir: PathBuf,
    pub manifest_pins: Pins,
    pub file_count: usize,
    /// Category count per domain.
    pub category_counts: BTreeMap<ClinicalDomain, usize>,
    pub crosswalk_entries: usize,
    pub crosswalk_linked: usize,
    /// Crosswalk rows naming a category no definition table has.
    pub orphan_crosswalk: Vec<String>,
    /// Categories without any crosswalk row.
    pub uncrosswalked: Vec<String>,
}

/// The verified standards bundle: category definitions plus crosswalk.
#[derive(Debug, Clone)]
pub struct StandardsRegistry {
    pub root: PathBuf,
    pub manifest: Manifest,
    pub files: Vec<ManifestFile>,
    pub tables: BTreeMap<ClinicalDomain, CategoryTable>,
    pub crosswalk: Crosswalk,
}

impl StandardsRegistry {
    pub fn verify_and_load(standards_dir: &Path) -> Result<(Self, VerifySummary), StandardsError> {
        let manifest = load_manifest(&standards_dir.join(MANIFEST_FILE))?;

        validate_manifest(&manifest, standards_dir)?;

        let mut files = manifest.files.clone();
        files.sort_by(|a, b| a.path.cmp(&b.path));

        for file in &files {
            verify_file(standards_dir, file)?;
        }

        let mut tables = BTreeMap::new();
        for domain in ClinicalDomain::ALL {
            let path = resolve_role_path(standards_dir, &files, domain.standards_role())?;
            let table = parse_category_csv(&path, domain)?;
            debug!(
                domain = %domain,
                categories = table.len(),
                path = %path.display(),
                "loaded category definitions"
            );
            tables.insert(domain, table);
        }

        let crosswalk =
            parse_crosswalk_csv(&resolve_role_path(standards_dir, &files, CROSSWALK_ROLE)?)?;

        let (orphan_crosswalk, uncrosswalked) = crosswalk_gaps(&tables, &crosswalk);
        for category in &orphan_crosswalk {
            warn!(category = %category, "crosswalk entry has no category definition");
        }

        let summary = VerifySummary {
            standards_dir: standards_dir.to_path_buf(),
            manifest_pins: manifest.pins.clone(),
            file_count: files.len(),
            category_counts: tables
                .iter()
                .map(|(domain, table)| (*domain, table.len()))
                .collect(),
            crosswalk_entries: crosswalk.len(),
            crosswalk_linked: crosswalk.iter().filter(|e| e.concept.is_some()).count(),
            orphan_crosswalk,
            uncrosswalked,
        };
        info!(
            standards_dir = %standards_dir.display(),
            files = summary.file_count,
            crosswalk_entries = summary.crosswalk_entries,
            "standards bundle verified"
        );

        Ok((
            Self {
                root: standards_dir.to_path_buf(),
                manifest,
                files,
                tables,
                crosswalk,
            },
            summary,
        ))
    }

    pub fn table(&self, domain: ClinicalDomain) -> Option<&CategoryTable> {
        self.tables.get(&domain)
    }

    /// Path of the concept dictionary pinned in the bundle, if any.
    pub fn concept_dict_path(&self) -> Option<PathBuf> {
        self.manifest
            .file_for_role(CONCEPT_DICT_ROLE)
            .map(|f| self.root.join(&f.path))
    }
}

fn crosswalk_gaps(
    tables: &BTreeMap<ClinicalDomain, CategoryTable>,
    crosswalk: &Crosswalk,
) -> (Vec<String>, Vec<String>) {
    let mut defined = BTreeSet::new();
    let mut uncrosswalked = Vec::new();
    for table in tables.values() {
        for category in &table.categories {
            defined.insert(category.lookup_key());
            if crosswalk.entry(&category.name).is_none() {
                uncrosswalked.push(category.name.clone());
            }
        }
    }
    let orphans = crosswalk
        .iter()
        .filter(|entry| !defined.contains(&normalize_category_key(&entry.category)))
        .map(|entry| entry.category.clone())
        .collect();
    (orphans, uncrosswalked)
}

fn load_manifest(path: &Path) -> Result<Manifest, StandardsError> {
    let contents = std::fs::read_to_string(path).map_err(|e| StandardsError::io(path, e))?;
    toml::from_str(&contents).map_err(|e| StandardsError::Toml {
        path: path.to_path_buf(),
        source: e,
    })
}

fn validate_manifest(manifest: &Manifest, standards_dir: &Path) -> Result<(), StandardsError> {
    if manifest.manifest.schema != MANIFEST_SCHEMA {
        return Err(StandardsError::InvalidManifest {
            message: format!("unsupported schema: {}", manifest.manifest.schema),
        });
    }
    if manifest.manifest.schema_version != MANIFEST_SCHEMA_VERSION {
        return Err(StandardsError::InvalidManifest {
            message: format!(
                "unsupported schema_version: {}",
                manifest.manifest.schema_version
            ),
        });
    }

    let mut roles: BTreeSet<&str> = BTreeSet::new();
    let mut manifest_paths: BTreeSet<PathBuf> = BTreeSet::new();

    for file in &manifest.files {
        if !roles.insert(file.role.as_str()) {
            return Err(StandardsError::DuplicateRole {
                role: file.role.clone(),
            });
        }

        if !ALLOWED_KINDS.contains(&file.kind.as_str()) {
            return Err(StandardsError::InvalidManifest {
                message: format!("unsupported kind '{}' for {}", file.kind, file.path),
            });
        }

        validate_sha(&file.sha256, &file.path)?;

        let path = validate_path(&file.path)?;
        manifest_paths.insert(normalize_path(&path));
    }

    for role in required_roles() {
        if !roles.contains(role) {
            return Err(StandardsError::MissingRole {
                role: role.to_string(),
            });
        }
    }

    for path in list_files_under(standards_dir)? {
        if path == Path::new(MANIFEST_FILE) {
            continue;
        }
        if !manifest_paths.contains(&normalize_path(&path)) {
            return Err(StandardsError::UnexpectedFile {
                path: standards_dir.join(path),
            });
        }
    }

    Ok(())
}

fn verify_file(standards_dir: &Path, file: &ManifestFile) -> Result<(), StandardsError> {
    let full_path = standards_dir.join(&file.path);
    let bytes = std::fs::read(&full_path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StandardsError::MissingFile {
                path: full_path.clone(),
            }
        } else {
            StandardsError::io(full_path.clone(), e)
        }
    })?;

    let actual = sha256_hex(&bytes);
    let expected = file.sha256.to_ascii_lowercase();
    if actual != expected {
        return Err(StandardsError::Sha256Mismatch {
            path: full_path,
            expected,
            actual,
        });
    }
    Ok(())
}

fn resolve_role_path(
    standards_dir: &Path,
    files: &[ManifestFile],
    role: &str,
) -> Result<PathBuf, StandardsError> {
    let f = files
        .iter()
        .find(|f| f.role == role)
        .ok_or_else(|| StandardsError::MissingRole {
            role: role.to_string(),
        })?;
    Ok(standards_dir.join(&f.path))
}

fn validate_sha(sha: &str, path: &str) -> Result<(), StandardsError> {
    if sha.len() != 64 || !sha.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(StandardsError::InvalidSha256 {
            path: PathBuf::from(path),
            message: "sha256 must be 64 hex characters".to_string(),
        });
    }
    Ok(())
}

fn validate_path(path: &str) -> Result<PathBuf, StandardsError> {
    if path.contains('\\') {
        return Err(StandardsError::InvalidPath {
            path: PathBuf::from(path),
            message: "manifest path must use '/' separators".to_string(),
        });
    }

    let p = PathBuf::from(path);
    if p.is_absolute() {
        return Err(StandardsError::InvalidPath {
            path: p,
            message: "manifest path must be relative".to_string(),
        });
    }

    if p.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(StandardsError::InvalidPath {
            path: p,
            message: "manifest path must not traverse out of standards/".to_string(),
        });
    }

    Ok(p)
}

fn list_files_under(root: &Path) -> Result<BTreeSet<PathBuf>, StandardsError> {
    let mut stack = vec![root.to_path_buf()];
    let mut files = BTreeSet::new();

    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir).map_err(|e| StandardsError::io(&dir, e))? {
            let entry = entry.map_err(|e| StandardsError::io(&dir, e))?;
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.is_file() {
                let rel = path
                    .strip_prefix(root)
                    .map_err(|e| StandardsError::InvalidPath {
                        path: path.clone(),
                        message: format!("failed to relativize path: {e}"),
                    })?
                    .to_path_buf();
                files.insert(rel);
            }
        }
    }

    Ok(files)
}

fn normalize_path(p: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for c in p.components() {
        match c {
            Component::CurDir => {}
            _ => out.push(c.as_os_str()),
        }
    }
    out
}
