//! Logging and progress UI for the bulk commands.
//!
//! [`Notifier`] puts `log` text output and `indicatif` progress behind one
//! verbosity switch:
//! - [`VerbosityLevel::Quiet`] → only warnings as text; `info` drives a spinner and
//!   each command gets a progress bar.
//! - [`VerbosityLevel::Info`]/[`VerbosityLevel::Debug`]/[`VerbosityLevel::Trace`] →
//!   standard logs, progress as periodic `info` lines.
//!
//! Results meant for the user (saved files, load responses, new tags) go through
//! [`Notifier::report`], which writes to stdout without tearing the progress bars.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::LevelFilter;
use std::cell::RefCell;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VerbosityLevel {
    Quiet = 0, // Progress bars, warnings only
    Info = 1,
    Debug = 2,
    Trace = 3,
}

impl From<u8> for VerbosityLevel {
    fn from(level: u8) -> Self {
        match level {
            0 => VerbosityLevel::Quiet,
            1 => VerbosityLevel::Info,
            2 => VerbosityLevel::Debug,
            _ => VerbosityLevel::Trace,
        }
    }
}

impl VerbosityLevel {
    pub fn to_log_level(self) -> LevelFilter {
        match self {
            VerbosityLevel::Quiet => LevelFilter::Warn,
            VerbosityLevel::Info => LevelFilter::Info,
            VerbosityLevel::Debug => LevelFilter::Debug,
            VerbosityLevel::Trace => LevelFilter::Trace,
        }
    }
}

pub struct Notifier {
    verbosity: VerbosityLevel,
    multi_progress: Option<MultiProgress>,
    spinner: RefCell<Option<ProgressBar>>,
}

impl Notifier {
    pub fn new(verbosity_level: u8) -> Self {
        let verbosity = VerbosityLevel::from(verbosity_level);
        let multi_progress = if verbosity == VerbosityLevel::Quiet {
            Some(MultiProgress::new())
        } else {
            None
        };

        Self {
            verbosity,
            multi_progress,
            spinner: RefCell::new(None),
        }
    }

    pub fn info(&self, message: &str) {
        match &self.multi_progress {
            Some(multi_progress) => {
                let mut spinner = self.spinner.borrow_mut();
                let spinner = spinner.get_or_insert_with(|| {
                    let bar = multi_progress.add(ProgressBar::new_spinner());
                    if let Ok(style) =
                        ProgressStyle::default_spinner().template("{spinner:.green} {msg}")
                    {
                        bar.set_style(style);
                    }
                    bar.enable_steady_tick(Duration::from_millis(100));
                    bar
                });
                spinner.set_message(message.to_string());
            }
            None => log::info!("{}", message),
        }
    }

    pub fn debug(&self, message: &str) {
        log::debug!("{}", message);
    }

    pub fn warn(&self, message: &str) {
        log::warn!("{}", message);
    }

    /// Prints a user-facing result line on stdout.
    pub fn report(&self, line: &str) {
        match &self.multi_progress {
            Some(multi_progress) => {
                if multi_progress.println(line).is_err() {
                    println!("{}", line);
                }
            }
            None => println!("{}", line),
        }
    }

    /// Adds a progress bar over `length` items (Quiet mode only).
    pub fn create_progress_bar(&self, length: u64, message: &str) -> Option<ProgressBar> {
        let multi_progress = self.multi_progress.as_ref()?;
        let style = ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos:>4}/{len:4} {msg}",
            )
            .ok()?
            .progress_chars("=> ");

        let progress_bar = multi_progress.add(ProgressBar::new(length));
        progress_bar.set_style(style);
        progress_bar.set_message(message.to_string());
        Some(progress_bar)
    }

    /// Textual progress for the non-Quiet modes.
    pub fn progress(&self, current: u64, total: u64, message: &str) {
        if self.verbosity != VerbosityLevel::Quiet {
            log::info!("{}: {}/{}", message, current, total);
        }
    }

    /// Stops the Quiet-mode spinner, if one was started.
    pub fn finish(&self) {
        if let Some(spinner) = self.spinner.borrow_mut().take() {
            spinner.finish_and_clear();
        }
    }

    pub fn verbosity_level(&self) -> VerbosityLevel {
        self.verbosity
    }
}
