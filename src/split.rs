//! Random train/val/test split of a transforms document's frames.

use std::{
    fs::create_dir_all,
    path::{self, Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use log::info;
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{write_json_pretty, TransformsDocument};

pub const DEFAULT_TRAIN_RATIO: f64 = 0.7;
pub const DEFAULT_VAL_RATIO: f64 = 0.15;
pub const SUMMARY_FILE: &str = "split_summary.json";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitRatios {
    pub train: f64,
    pub val: f64,
    pub test: f64,
}

impl SplitRatios {
    pub fn new(train: f64, val: f64) -> Result<Self> {
        for (name, r) in [("train", train), ("val", val)] {
            if !(0.0..=1.0).contains(&r) {
                bail!("{name} ratio must be between 0 and 1 (got {r})");
            }
        }
        let test = 1.0 - train - val;
        if test < 0.0 {
            bail!("train + val ratios must not exceed 1 (got {train} + {val})");
        }
        Ok(Self { train, val, test })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitSizes {
    pub train: usize,
    pub val: usize,
    pub test: usize,
}

impl SplitSizes {
    /// Train and val are truncated; test takes whatever is left.
    pub fn compute(total: usize, ratios: &SplitRatios) -> Self {
        let train = ((total as f64 * ratios.train) as usize).min(total);
        let val = ((total as f64 * ratios.val) as usize).min(total - train);
        Self { train, val, test: total - train - val }
    }

    pub fn total(&self) -> usize {
        self.train + self.val + self.test
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub train: Vec<Value>,
    pub val: Vec<Value>,
    pub test: Vec<Value>,
}

/// Shuffle `frames` and cut it into contiguous train, val, test spans.
pub fn partition<R: Rng + ?Sized>(
    mut frames: Vec<Value>,
    ratios: &SplitRatios,
    rng: &mut R,
) -> Partition {
    frames.shuffle(rng);
    let sizes = SplitSizes::compute(frames.len(), ratios);

    let test = frames.split_off(sizes.train + sizes.val);
    let val = frames.split_off(sizes.train);
    Partition { train: frames, val, test }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputPaths {
    pub train: PathBuf,
    pub val: PathBuf,
    pub test: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitSummary {
    pub total_frames: usize,
    pub train_frames: usize,
    pub val_frames: usize,
    pub test_frames: usize,
    pub train_ratio: f64,
    pub val_ratio: f64,
    pub test_ratio: f64,
    pub output_paths: OutputPaths,
}

impl SplitSummary {
    pub fn percent(&self, count: usize) -> f64 {
        if self.total_frames == 0 {
            0.0
        } else {
            count as f64 * 100.0 / self.total_frames as f64
        }
    }
}

pub fn subset_file_name(subset: &str) -> String {
    format!("transforms_{subset}.json")
}

/// Load `input`, split its frames and write the three subset documents plus
/// `split_summary.json` into `output_dir`.
pub fn split_document<R: Rng + ?Sized>(
    input: &Path,
    output_dir: &Path,
    ratios: &SplitRatios,
    rng: &mut R,
) -> Result<SplitSummary> {
    let doc = TransformsDocument::load(input)?;
    let frames = doc
        .require_frames()
        .with_context(|| format!("in {}", input.display()))?
        .clone();
    let total = frames.len();
    info!("loaded {total} frame(s) from {}", input.display());

    let Partition { train, val, test } = partition(frames, ratios, rng);
    let (n_train, n_val, n_test) = (train.len(), val.len(), test.len());

    create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;

    let save_subset = |name: &str, frames: Vec<Value>| -> Result<PathBuf> {
        let out = output_dir.join(subset_file_name(name));
        doc.with_frames(frames).save(&out)?;
        info!("wrote {name} subset to {}", out.display());
        path::absolute(&out).with_context(|| format!("resolving {}", out.display()))
    };
    let output_paths = OutputPaths {
        train: save_subset("train", train)?,
        val: save_subset("val", val)?,
        test: save_subset("test", test)?,
    };

    let summary = SplitSummary {
        total_frames: total,
        train_frames: n_train,
        val_frames: n_val,
        test_frames: n_test,
        train_ratio: ratios.train,
        val_ratio: ratios.val,
        test_ratio: ratios.test,
        output_paths,
    };
    write_json_pretty(&output_dir.join(SUMMARY_FILE), &summary)?;
    info!("split {total} frame(s): train={n_train} val={n_val} test={n_test}");

    Ok(summary)
}
