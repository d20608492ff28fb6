use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::Path,
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    import::{ProgressSink, Stage},
    info, warning,
};

/// Terminal progress for an import, optionally mirrored into a plain-text log file.
///
/// Log lines look like `2024-03-01 12:00:00 - INFO - Loaded 250 records.`
pub struct ConsoleSink {
    bar: Mutex<Option<ProgressBar>>,
    log_file: Option<Mutex<File>>,
    log_failed: AtomicBool,
}

impl ConsoleSink {
    pub fn new(log_path: Option<&Path>) -> std::io::Result<Self> {
        let log_file = match log_path {
            Some(path) => Some(Mutex::new(
                OpenOptions::new().create(true).append(true).open(path)?,
            )),
            None => None,
        };

        Ok(Self {
            bar: Mutex::new(None),
            log_file,
            log_failed: AtomicBool::new(false),
        })
    }

    /// Appends one line to the log file. The first failed write is reported on
    /// the terminal; the import itself carries on.
    fn log(&self, level: &str, message: &str) {
        let Some(file) = &self.log_file else {
            return;
        };

        let written = match file.lock() {
            Ok(mut file) => writeln!(
                file,
                "{} - {} - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                level,
                message
            ),
            Err(_) => Err(std::io::Error::other("log file lock poisoned")),
        };

        if let Err(e) = written {
            if !self.log_failed.swap(true, Ordering::SeqCst) {
                self.print(|| warning!("Cannot write to the log file: {}", e));
            }
        }
    }

    /// Prints without tearing an active progress bar.
    fn print(&self, f: impl FnOnce()) {
        let bar = self.bar.lock().ok().and_then(|b| b.clone());
        match bar {
            Some(bar) => bar.suspend(f),
            None => f(),
        }
    }
}

fn bar_style(stage: Stage) -> ProgressStyle {
    let template = match stage {
        Stage::Resolve => "{spinner:.blue} Resolving tracks [{bar:30.cyan/blue}] {pos}/{len}",
        Stage::Upload => "{spinner:.blue} Uploading batches [{bar:30.cyan/blue}] {pos}/{len}",
        _ => "{spinner:.blue} {msg}",
    };

    ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
}

impl ProgressSink for ConsoleSink {
    fn stage_started(&self, stage: Stage, total: usize) {
        self.log("DEBUG", &format!("{} started ({} items)", stage, total));
        if !matches!(stage, Stage::Resolve | Stage::Upload) {
            return;
        }

        let bar = ProgressBar::new(total as u64);
        bar.set_style(bar_style(stage));
        bar.enable_steady_tick(Duration::from_millis(100));
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(previous) = slot.replace(bar) {
                previous.finish_and_clear();
            }
        }
    }

    fn advance(&self, _stage: Stage) {
        if let Ok(slot) = self.bar.lock() {
            if let Some(bar) = slot.as_ref() {
                bar.inc(1);
            }
        }
    }

    fn stage_finished(&self, stage: Stage) {
        self.log("DEBUG", &format!("{} finished", stage));
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(bar) = slot.take() {
                bar.finish_and_clear();
            }
        }
    }

    fn info(&self, message: &str) {
        self.log("INFO", message);
        self.print(|| info!("{}", message));
    }

    fn warn(&self, stage: Stage, message: &str) {
        self.log("WARNING", &format!("[{}] {}", stage, message));
        self.print(|| warning!("{}", message));
    }
}
