/*
cargo run --bin rewrite_paths -- \
    --input_dir data/my_object \
    --target_string ./data/my_object/

originals are kept as data/my_object/backup_transforms*.json
*/

use std::path::{self, PathBuf};

use anyhow::Result;
use clap::Parser;

use transforms_prep::{
    logging,
    rewrite::{rewrite_directory, FileOutcome, RewriteOptions, BACKUP_PREFIX, DEFAULT_TARGET},
};

// Strip (or swap) a path prefix in every frame of transforms*.json files
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    // Directory containing the transforms*.json files
    #[arg(long = "input_dir", alias = "input-dir")]
    input_dir: PathBuf,

    // Prefix to look for inside each frame's file_path
    #[arg(long = "target_string", alias = "target-string", default_value = DEFAULT_TARGET)]
    target_string: String,

    // What to put in its place (removed when empty)
    #[arg(long, default_value = "")]
    replacement: String,

    // Also write a timestamped log file here
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init("rewrite_paths", args.log_dir.as_deref(), args.verbose)?;

    let opts = RewriteOptions {
        input_dir: path::absolute(&args.input_dir)?,
        target: args.target_string,
        replacement: args.replacement,
    };
    let report = rewrite_directory(&opts)?;

    if report.files_found == 0 {
        println!("No transforms*.json files found in {}", opts.input_dir.display());
        return Ok(());
    }

    // failures were already logged to stderr
    for outcome in &report.outcomes {
        if !matches!(outcome, FileOutcome::Failed { .. }) {
            println!("• {outcome}");
        }
    }
    println!(
        "Done: modified {} of {} JSON file(s), {} failed",
        report.files_modified(),
        report.files_found,
        report.files_failed()
    );
    println!("Originals backed up as {BACKUP_PREFIX}transforms*.json");
    Ok(())
}
