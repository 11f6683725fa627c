//! Logging and output control
//!
//! [`Logger`] is the single sink for user-visible output. Progress lines are
//! dropped in quiet mode; command results (`result`, `field`, `list`, `row`)
//! are always written to stdout so they survive `--quiet` and pipes.

use std::time::Duration;

const KIB: f64 = 1024.0;
const MIB: f64 = KIB * 1024.0;
const GIB: f64 = MIB * 1024.0;

#[derive(Debug, Clone, Default)]
pub struct Logger {
    pub verbose: bool,
    pub quiet: bool,
}

impl Logger {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            quiet: false,
        }
    }

    pub fn new_quiet() -> Self {
        Self {
            verbose: false,
            quiet: true,
        }
    }

    /// Request-level diagnostics
    pub fn verbose(&self, message: &str) {
        if self.verbose && !self.quiet {
            println!("📝 {}", message);
        }
    }

    /// Indented verbose line, used for HTTP traffic
    pub fn detail(&self, message: &str) {
        if self.verbose && !self.quiet {
            println!("   {}", message);
        }
    }

    pub fn step(&self, message: &str) {
        if !self.quiet {
            println!("▶️  {}", message);
        }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("✅ {}", message);
        }
    }

    pub fn error(&self, message: &str) {
        eprintln!("❌ ERROR: {}", message);
    }

    pub fn result(&self, line: &str) {
        println!("{}", line);
    }

    /// Aligned `key: value` result line
    pub fn field(&self, key: &str, value: &str) {
        println!("  {:<14} {}", format!("{}:", key), value);
    }

    /// Titled, numbered list; bare items in quiet mode so output can be piped
    pub fn list(&self, title: &str, items: &[String]) {
        if self.quiet {
            for item in items {
                println!("{}", item);
            }
            return;
        }

        println!("--- {} ({}) ---", title, items.len());
        for (i, item) in items.iter().enumerate() {
            println!("  {}. {}", i + 1, item);
        }
        if items.is_empty() {
            println!("  (none)");
        }
    }

    /// One row of a registry status table
    pub fn row(&self, name: &str, status: &str, url: &str, note: &str) {
        println!("{:<24} {:<9} {} ({})", name, status, url, note);
    }

    /// Byte count in binary units; negative sizes are shown as given
    pub fn format_size(&self, bytes: i64) -> String {
        let value = bytes as f64;
        match value.abs() {
            v if v < KIB => format!("{} B", bytes),
            v if v < MIB => format!("{:.1} KB", value / KIB),
            v if v < GIB => format!("{:.1} MB", value / MIB),
            _ => format!("{:.1} GB", value / GIB),
        }
    }

    pub fn format_duration(&self, duration: Duration) -> String {
        let millis = duration.as_millis();
        if millis < 1000 {
            format!("{}ms", millis)
        } else if duration.as_secs() < 60 {
            format!("{:.1}s", duration.as_secs_f64())
        } else {
            let secs = duration.as_secs();
            format!("{}m{}s", secs / 60, secs % 60)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_size_picks_unit() {
        let logger = Logger::new_quiet();
        assert_eq!(logger.format_size(512), "512 B");
        assert_eq!(logger.format_size(2048), "2.0 KB");
        assert_eq!(logger.format_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(logger.format_size(3 * 1024 * 1024 * 1024), "3.0 GB");
        assert_eq!(logger.format_size(-10), "-10 B");
    }

    #[test]
    fn format_duration_scales() {
        let logger = Logger::default();
        assert_eq!(logger.format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(logger.format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(logger.format_duration(Duration::from_secs(125)), "2m5s");
    }

    #[test]
    fn quiet_logger_is_never_verbose() {
        let logger = Logger::new_quiet();
        assert!(logger.quiet);
        assert!(!logger.verbose);
        assert!(!Logger::new(true).quiet);
    }
}
