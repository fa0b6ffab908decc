use clap::Parser;
use followdiff::{Cli, FollowDiff, FollowDiffError, OutputFormatter, OutputMode, UserFriendlyError};
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let exit_code = run().await;
    process::exit(exit_code);
}

async fn run() -> i32 {
    // Parse CLI arguments
    let cli = Cli::parse();
    setup_logging(cli.verbosity_level());

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    // Create FollowDiff instance
    let mut app = match FollowDiff::from_cli(&cli) {
        Ok(app) => app,
        Err(e) => {
            print_startup_error(&e);
            return exit_code(&e);
        }
    };

    if cli.interactive {
        let stdin = std::io::stdin();
        return match followdiff::ui::run_shell(&mut app, stdin.lock()).await {
            Ok(()) => 0,
            Err(e) => {
                app.handle_error(&e);
                exit_code(&e)
            }
        };
    }

    match run_once(&mut app, &cli).await {
        Ok(code) => code,
        Err(e) => {
            app.handle_error(&e);
            exit_code(&e)
        }
    }
}

/// Compare, then apply the search and any result actions from the command
/// line, and return the exit code. A bad search pattern is reported and the
/// unfiltered list is used for the actions; it still decides the exit code.
async fn run_once(app: &mut FollowDiff, cli: &Cli) -> followdiff::Result<i32> {
    let summary = app.compare().await?;

    let mut search_error = None;
    match cli.search {
        Some(ref query) => {
            if let Err(e) = app.search(query, cli.regex) {
                app.handle_error(&e);
                app.render_results();
                search_error = Some(e);
            }
        }
        None => app.render_results(),
    }

    if let Some(ref path) = cli.export {
        app.export(path)?;
    }
    if cli.copy {
        app.copy_visible(&[])?;
    }
    if let Some(ref identifier) = cli.open {
        app.open_profile(identifier)?;
    }

    if let Some(ref e) = search_error {
        return Ok(exit_code(e));
    }
    if summary.file_errors + app.selection_errors() > 0 {
        Ok(2) // Success with warnings
    } else {
        Ok(0) // Success
    }
}

fn exit_code(error: &FollowDiffError) -> i32 {
    match error {
        FollowDiffError::Cancelled => 130, // Interrupted (SIGINT)
        FollowDiffError::MissingInput { .. } => 3,
        FollowDiffError::InvalidPattern { .. } => 4,
        FollowDiffError::Io { .. } | FollowDiffError::Parse { .. } => 5,
        FollowDiffError::Config { .. } => 6,
        _ => 1, // General error
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| followdiff::config::DEFAULT_CONFIG_FILE.to_string());

    match FollowDiff::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  followdiff --config {}", config_path);
            println!("\nEdit the file to customize settings for your needs.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            exit_code(&e)
        }
    }
}

fn print_startup_error(error: &FollowDiffError) {
    // Create a basic formatter for startup errors
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

/// Diagnostics go to stderr. `RUST_LOG` wins over the `-v` count.
fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("followdiff={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_generate_config_command() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let cli = Cli::try_parse_from([
            "followdiff",
            "--generate-config",
            "--config",
            config_path.to_str().unwrap(),
        ])
        .unwrap();

        let exit_code = handle_generate_config(&cli);
        assert_eq!(exit_code, 0);
        assert!(config_path.exists());

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[Paths]"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(&FollowDiffError::Cancelled), 130);
        assert_eq!(exit_code(&FollowDiffError::MissingInput { which: "followers" }), 3);
        assert_eq!(
            exit_code(&FollowDiffError::InvalidPattern {
                pattern: "(".to_string(),
                message: "unclosed group".to_string(),
            }),
            4
        );
        assert_eq!(
            exit_code(&FollowDiffError::io(
                "out.txt",
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied")
            )),
            5
        );
        assert_eq!(exit_code(&FollowDiffError::NoResults), 1);
    }
}
