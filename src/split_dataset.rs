/*
cargo run --bin split_dataset -- \
    --input_json data/my_object/transforms.json \
    --output_dir data/my_object/splits \
    --train_ratio 0.7 --val_ratio 0.15
*/

use std::path::{self, PathBuf};

use anyhow::{bail, Result};
use clap::Parser;
use log::info;
use rand::thread_rng;

use transforms_prep::{
    logging,
    split::{split_document, SplitRatios, DEFAULT_TRAIN_RATIO, DEFAULT_VAL_RATIO, SUMMARY_FILE},
};

// Split a transforms JSON into train/val/test documents
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    // Input transforms JSON (must contain "frames")
    #[arg(long = "input_json", alias = "input-json")]
    input_json: PathBuf,

    // Where transforms_{train,val,test}.json and split_summary.json go
    #[arg(long = "output_dir", alias = "output-dir")]
    output_dir: PathBuf,

    #[arg(long = "train_ratio", alias = "train-ratio", allow_negative_numbers = true, default_value_t = DEFAULT_TRAIN_RATIO)]
    train_ratio: f64,

    #[arg(long = "val_ratio", alias = "val-ratio", allow_negative_numbers = true, default_value_t = DEFAULT_VAL_RATIO)]
    val_ratio: f64,

    // Also write a timestamped log file here
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // validate before touching anything
    let ratios = SplitRatios::new(args.train_ratio, args.val_ratio)?;
    if !args.input_json.exists() {
        bail!("input file does not exist: {}", args.input_json.display());
    }
    let input = path::absolute(&args.input_json)?;
    let output_dir = path::absolute(&args.output_dir)?;

    logging::init("split_dataset", args.log_dir.as_deref(), args.verbose)?;
    info!(
        "ratios - train: {}, val: {}, test: {}",
        ratios.train, ratios.val, ratios.test
    );

    let summary = split_document(&input, &output_dir, &ratios, &mut thread_rng())?;

    println!("Split complete");
    println!("Total frames: {}", summary.total_frames);
    for (name, count) in [
        ("Train", summary.train_frames),
        ("Val", summary.val_frames),
        ("Test", summary.test_frames),
    ] {
        println!("{name:<5}: {count} frames ({:.1}%)", summary.percent(count));
    }
    println!("Summary saved to {}", output_dir.join(SUMMARY_FILE).display());
    Ok(())
}
