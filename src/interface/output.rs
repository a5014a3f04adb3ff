use crate::error::Diagnostics;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warning,
    Info,
    Debug,
    Verbose,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Verbose => write!(f, "VERBOSE"),
        }
    }
}

/// Level-filtered console logger; errors and warnings go to stderr.
#[derive(Debug, Clone, Default)]
pub struct Logger {
    verbose: bool,
    debug: bool,
}

impl Logger {
    pub fn new(verbose: bool, debug: bool) -> Self {
        Self { verbose, debug }
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        match level {
            LogLevel::Error | LogLevel::Warning | LogLevel::Info => true,
            LogLevel::Debug => self.debug || self.verbose,
            LogLevel::Verbose => self.verbose,
        }
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        if !self.should_log(level) {
            return;
        }
        let icon = match level {
            LogLevel::Error => "❌",
            LogLevel::Warning => "⚠️",
            LogLevel::Info => "",
            LogLevel::Debug => "🔍",
            LogLevel::Verbose => "💬",
        };
        let line = if icon.is_empty() {
            message.to_string()
        } else {
            format!("{} {}", icon, message)
        };
        match level {
            LogLevel::Error | LogLevel::Warning => eprintln!("{}", line),
            _ => println!("{}", line),
        }
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    pub fn warning(&self, message: &str) {
        self.log(LogLevel::Warning, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn verbose(&self, message: &str) {
        self.log(LogLevel::Verbose, message);
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// One error line per diagnostic
    pub fn diagnostics(&self, diagnostics: &Diagnostics) {
        for error in diagnostics {
            self.error(&error.to_string());
        }
    }
}

/// Pipeline stage reporting: a spinner normally, step lines in verbose mode
pub struct ProgressReporter {
    logger: Logger,
    progress_bar: Option<ProgressBar>,
    current_step: usize,
    total_steps: usize,
    step_name: String,
}

impl ProgressReporter {
    pub fn new(logger: Logger, total_steps: usize) -> Self {
        let progress_bar = if !logger.is_verbose() {
            let pb = ProgressBar::new_spinner();
            let style = ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
            pb.set_style(style);
            pb.enable_steady_tick(Duration::from_millis(100));
            Some(pb)
        } else {
            None
        };

        Self {
            logger,
            progress_bar,
            current_step: 0,
            total_steps,
            step_name: String::new(),
        }
    }

    pub fn start_step(&mut self, step_name: &str) {
        self.current_step += 1;
        self.step_name = step_name.to_string();

        if self.logger.is_verbose() {
            let progress = if self.total_steps > 0 {
                format!(" ({}/{})", self.current_step, self.total_steps)
            } else {
                String::new()
            };
            self.logger.info(&format!("🚀 {}{}", step_name, progress));
        } else if let Some(ref pb) = self.progress_bar {
            pb.set_message(format!(
                "{} ({}/{})",
                step_name, self.current_step, self.total_steps
            ));
        }
    }

    pub fn complete_step(&mut self, message: Option<&str>) {
        if self.logger.is_verbose() {
            match message {
                Some(msg) => self.logger.info(&format!("✅ {} - {}", self.step_name, msg)),
                None => self.logger.info(&format!("✅ {}", self.step_name)),
            }
        }
    }

    pub fn fail_step(&mut self, error: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }
        self.logger
            .error(&format!("Failed {}: {}", self.step_name, error));
    }

    pub fn update_progress(&self, message: &str) {
        self.logger.verbose(message);
    }

    pub fn finish(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }
    }
}
