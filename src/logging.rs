use std::{
    fs::{create_dir_all, File},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::Local;
use simplelog::{
    ColorChoice, CombinedLogger, Config as LogConfig, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};

/// Terminal logging, plus a timestamped file under `log_dir` when given.
/// Returns the log file path, if any.
pub fn init(tool: &str, log_dir: Option<&Path>, verbose: bool) -> Result<Option<PathBuf>> {
    let term_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        term_level,
        LogConfig::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];

    let log_path = match log_dir {
        Some(dir) => {
            create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
            let ts = Local::now().format("%Y%m%d_%H%M%S");
            let path = dir.join(format!("{tool}_{ts}.log"));
            let file = File::create(&path)
                .with_context(|| format!("creating {}", path.display()))?;
            loggers.push(WriteLogger::new(LevelFilter::Info, LogConfig::default(), file));
            Some(path)
        }
        None => None,
    };

    CombinedLogger::init(loggers)?;
    Ok(log_path)
}
