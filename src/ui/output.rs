use crate::compare::ComparisonStats;
use crate::error::{FollowDiffError, UserFriendlyError};
use crate::search::FilteredView;
use console::{style, Emoji, Term};
use serde_json;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static MAGNIFIER: Emoji = Emoji("🔍 ", "> ");
static CHART: Emoji = Emoji("📊 ", "* ");

/// In Plain mode stdout carries only result identifiers; every other line
/// goes to stderr so the list can be piped.
pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    // Core messaging methods
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Success, message),
            OutputMode::Json => self.print_json_message("success", message),
            OutputMode::Plain => eprintln!("SUCCESS: {}", message),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => eprintln!("WARNING: {}", message),
            }
        }
    }

    /// One-line status, the equivalent of a status bar update.
    pub fn status(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("status", message),
                OutputMode::Plain => eprintln!("STATUS: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => eprintln!("INFO: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", MAGNIFIER, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => eprintln!("STARTING: {}", operation),
            }
        }
    }

    // User-friendly error handling
    pub fn print_user_friendly_error(&self, error: &FollowDiffError) {
        let user_message = error.user_message();
        self.error(&user_message);

        if let Some(suggestion) = error.suggestion() {
            if self.quiet {
                return;
            }
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        println!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    eprintln!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    pub fn print_statistics(&self, stats: &ComparisonStats) {
        match self.mode {
            OutputMode::Human => {
                if self.quiet {
                    return;
                }
                self.print_header("Statistics");
                let value = |n: usize| {
                    if self.use_colors {
                        style(n).cyan().bold().to_string()
                    } else {
                        n.to_string()
                    }
                };
                println!("  Followers: {}", value(stats.followers));
                println!("  Following: {}", value(stats.following));
                println!("  Mutuals:   {}", value(stats.mutuals));
                println!("  {}: {}", stats.mode.name(), value(stats.results));
            }
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "statistics",
                    "mode": stats.mode.name(),
                    "followers": stats.followers,
                    "following": stats.following,
                    "mutuals": stats.mutuals,
                    "results": stats.results,
                }));
            }
            OutputMode::Plain => {
                if self.quiet {
                    return;
                }
                eprintln!("Followers: {}", stats.followers);
                eprintln!("Following: {}", stats.following);
                eprintln!("Mutuals: {}", stats.mutuals);
                eprintln!("{}: {}", stats.mode.name(), stats.results);
            }
        }
    }

    /// Print the displayed results. Plain mode prints bare identifiers so
    /// the output can be piped.
    pub fn print_results(&self, view: &FilteredView<'_>) {
        match self.mode {
            OutputMode::Human => {
                if view.is_empty() {
                    if !self.quiet {
                        println!("  (no results)");
                    }
                    return;
                }
                let width = view.len().to_string().len();
                for (position, identifier) in view.iter().enumerate() {
                    if self.use_colors {
                        println!(
                            "  {} {}",
                            style(format!("{:>width$}", position + 1, width = width)).dim(),
                            identifier
                        );
                    } else {
                        println!("  {:>width$} {}", position + 1, identifier, width = width);
                    }
                }
            }
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "results",
                    "count": view.len(),
                    "entries": view.as_slice(),
                }));
            }
            OutputMode::Plain => {
                for identifier in view.iter() {
                    println!("{}", identifier);
                }
            }
        }
    }

    // Specialized output methods
    pub fn print_header(&self, title: &str) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                println!();
                if self.use_colors {
                    println!("{} {}", CHART, style(title).bold().cyan());
                } else {
                    println!("=== {} ===", title);
                }
            }
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "header",
                    "title": title
                }));
            }
            OutputMode::Plain => {
                eprintln!("=== {} ===", title);
            }
        }
    }

    // Private helper methods
    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        #[allow(clippy::type_complexity)]
        let (emoji, color_fn): (Emoji, Box<dyn Fn(&str) -> console::StyledObject<&str>>) =
            match msg_type {
                MessageType::Success => (CHECKMARK, Box::new(|msg| style(msg).green().bold())),
                MessageType::Error => (CROSS, Box::new(|msg| style(msg).red().bold())),
                MessageType::Warning => (WARNING, Box::new(|msg| style(msg).yellow().bold())),
                MessageType::Info => (INFO, Box::new(|msg| style(msg).cyan())),
            };

        if self.use_colors {
            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, color_fn(message)),
                _ => println!("{}{}", emoji, color_fn(message)),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}
