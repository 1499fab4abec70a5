//! Batch rewrite of the `file_path` prefix inside `transforms*.json` files.
//!
//! Each original is moved aside to `backup_<name>` once; every run reads from
//! that backup, so repeated runs give the same result.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use log::{debug, error, info};
use regex::Regex;
use serde_json::Value;

use crate::document::{TransformsDocument, FILE_PATH_KEY};

pub const DEFAULT_TARGET: &str = "./data/my_object/";
pub const BACKUP_PREFIX: &str = "backup_";
const TRANSFORMS_PATTERN: &str = r"^transforms.*\.json$";

#[derive(Debug, Clone)]
pub struct RewriteOptions {
    pub input_dir: PathBuf,
    pub target: String,
    pub replacement: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Modified { path: PathBuf, frames: usize },
    Unchanged { path: PathBuf },
    Failed { path: PathBuf, error: String },
}

impl FileOutcome {
    pub fn is_modified(&self) -> bool {
        matches!(self, FileOutcome::Modified { .. })
    }
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOutcome::Modified { path, frames } => {
                write!(f, "modified {} ({frames} frame(s))", path.display())
            }
            FileOutcome::Unchanged { path } => {
                write!(f, "no matching paths in {}", path.display())
            }
            FileOutcome::Failed { path, error } => {
                write!(f, "failed on {}: {error}", path.display())
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct RewriteReport {
    pub files_found: usize,
    pub outcomes: Vec<FileOutcome>,
}

impl RewriteReport {
    pub fn files_modified(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_modified()).count()
    }

    pub fn files_failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::Failed { .. }))
            .count()
    }
}

/// Direct children of `dir` named `transforms*.json`, sorted by name.
pub fn find_transforms_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let re = Regex::new(TRANSFORMS_PATTERN)?;
    let mut found = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        if name.to_str().is_some_and(|n| re.is_match(n)) {
            found.push(entry.path());
        }
    }
    found.sort();
    Ok(found)
}

pub fn backup_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{BACKUP_PREFIX}{name}"))
}

/// Replace the first `target` in every frame's `file_path`.
/// Returns the number of frames changed. A `file_path` that is not a string,
/// or a frame that is a bare number/bool/null, is an error.
pub fn rewrite_frames(
    doc: &mut TransformsDocument,
    target: &str,
    replacement: &str,
) -> Result<usize> {
    let Some(frames) = doc.frames_mut() else {
        return Ok(0);
    };

    let mut changed = 0;
    for (i, frame) in frames.iter_mut().enumerate() {
        let file_path = match frame {
            Value::Object(obj) => match obj.get_mut(FILE_PATH_KEY) {
                Some(Value::String(file_path)) => file_path,
                Some(other) => bail!("frame {i}: '{FILE_PATH_KEY}' is not a string ({other})"),
                None => continue,
            },
            // no 'file_path' key to look up
            Value::Array(_) | Value::String(_) => continue,
            other => bail!("frame {i} is not an object ({other})"),
        };
        if file_path.contains(target) {
            *file_path = file_path.replacen(target, replacement, 1);
            debug!("rewrote path: {file_path}");
            changed += 1;
        }
    }
    Ok(changed)
}

/// Back up (once), rewrite from the backup, and write the original name
/// back only if something changed. Errors are folded into the outcome.
pub fn rewrite_file(path: &Path, target: &str, replacement: &str) -> FileOutcome {
    match try_rewrite_file(path, target, replacement) {
        Ok(0) => {
            debug!("no matching paths in {}", path.display());
            FileOutcome::Unchanged { path: path.to_path_buf() }
        }
        Ok(frames) => {
            debug!("modified {} ({frames} frame(s))", path.display());
            FileOutcome::Modified { path: path.to_path_buf(), frames }
        }
        Err(e) => {
            error!("error processing {}: {e:#}", path.display());
            FileOutcome::Failed { path: path.to_path_buf(), error: format!("{e:#}") }
        }
    }
}

fn try_rewrite_file(path: &Path, target: &str, replacement: &str) -> Result<usize> {
    let backup = backup_path_for(path);
    if backup.exists() {
        debug!("reusing existing backup {}", backup.display());
    } else {
        fs::rename(path, &backup).with_context(|| {
            format!("moving {} to {}", path.display(), backup.display())
        })?;
        debug!("backed up {} -> {}", path.display(), backup.display());
    }

    let mut doc = TransformsDocument::load(&backup)?;
    let changed = rewrite_frames(&mut doc, target, replacement)
        .with_context(|| format!("rewriting {}", backup.display()))?;
    if changed > 0 {
        doc.save(path)?;
    }
    Ok(changed)
}

pub fn rewrite_directory(opts: &RewriteOptions) -> Result<RewriteReport> {
    let dir = &opts.input_dir;
    if !dir.exists() {
        bail!("directory does not exist: {}", dir.display());
    }
    if !dir.is_dir() {
        bail!("not a directory: {}", dir.display());
    }

    let files = find_transforms_files(dir)?;
    if files.is_empty() {
        debug!("no transforms*.json files found in {}", dir.display());
        return Ok(RewriteReport::default());
    }
    info!("found {} JSON file(s) to process", files.len());

    let outcomes: Vec<FileOutcome> = files
        .iter()
        .map(|p| rewrite_file(p, &opts.target, &opts.replacement))
        .collect();

    let report = RewriteReport { files_found: files.len(), outcomes };
    debug!(
        "done: modified {} of {} file(s), {} failed",
        report.files_modified(),
        report.files_found,
        report.files_failed()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(v: Value) -> TransformsDocument {
        TransformsDocument::from_value(v).unwrap()
    }

    #[test]
    fn replaces_only_first_occurrence() {
        let mut d = doc(json!({"frames": [
            {"file_path": "./data/my_object/data/my_object/img.png"}
        ]}));
        assert_eq!(rewrite_frames(&mut d, DEFAULT_TARGET, "").unwrap(), 1);
        assert_eq!(d.frames().unwrap()[0]["file_path"], "data/my_object/img.png");
    }

    #[test]
    fn leaves_non_matching_frames_alone() {
        let mut d = doc(json!({"frames": [
            {"file_path": "images/r_0.png", "transform_matrix": [[1, 0], [0, 1]]},
            {"file_path": "./data/my_object/images/r_1.png"}
        ]}));
        let before = d.frames().unwrap()[0].clone();
        assert_eq!(rewrite_frames(&mut d, DEFAULT_TARGET, "scene/").unwrap(), 1);
        assert_eq!(d.frames().unwrap()[0], before);
        assert_eq!(d.frames().unwrap()[1]["file_path"], "scene/images/r_1.png");
    }

    #[test]
    fn odd_shapes_are_no_ops() {
        let mut no_frames = doc(json!({"fl_x": 500}));
        assert_eq!(rewrite_frames(&mut no_frames, DEFAULT_TARGET, "").unwrap(), 0);

        let mut frames_not_list = doc(json!({"frames": "nope"}));
        assert_eq!(rewrite_frames(&mut frames_not_list, DEFAULT_TARGET, "").unwrap(), 0);

        let mut weird = doc(json!({"frames": [
            "./data/my_object/a.png",
            ["./data/my_object/a.png"],
            {"other": "./data/my_object/a.png"}
        ]}));
        assert_eq!(rewrite_frames(&mut weird, DEFAULT_TARGET, "").unwrap(), 0);
    }

    #[test]
    fn non_string_file_path_is_an_error() {
        let mut d = doc(json!({"frames": [
            {"file_path": "./data/my_object/a.png"},
            {"file_path": 3}
        ]}));
        let err = rewrite_frames(&mut d, DEFAULT_TARGET, "").unwrap_err();
        assert!(err.to_string().contains("frame 1"));
    }

    #[test]
    fn scalar_frame_is_an_error() {
        for bad in [json!(7), json!(null), json!(true)] {
            let mut d = doc(json!({"frames": [bad]}));
            assert!(rewrite_frames(&mut d, DEFAULT_TARGET, "").is_err());
        }
    }

    #[test]
    fn backup_name_sits_next_to_original() {
        let p = Path::new("/tmp/scene/transforms_train.json");
        assert_eq!(
            backup_path_for(p),
            PathBuf::from("/tmp/scene/backup_transforms_train.json")
        );
    }

    #[test]
    fn pattern_matches_transforms_files_only() {
        let re = Regex::new(TRANSFORMS_PATTERN).unwrap();
        assert!(re.is_match("transforms.json"));
        assert!(re.is_match("transforms_val.json"));
        assert!(!re.is_match("backup_transforms.json"));
        assert!(!re.is_match("transforms.json.bak"));
        assert!(!re.is_match("split_summary.json"));
    }
}
