//! Line-oriented interactive session over stdin.

use crate::compare::Mode;
use crate::error::{FollowDiffError, Result};
use crate::FollowDiff;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::debug;

const HELP: &str = "\
Commands:
  followers <path>        select the followers export
  following <path>        select the following export
  whitelist <path>        load a whitelist (one username per line)
  mode <unfollowers|fans> choose what to compute
  compare                 run the comparison
  search [query]          filter the results (empty query clears)
  regex <on|off>          treat search queries as regular expressions
  list                    show the displayed results
  stats                   show counts from the last comparison
  copy [N...]             copy displayed usernames (all, or by number)
  open <N|username>       open a profile in the browser
  export <path>           write all results (.csv adds a header)
  help                    show this help
  quit                    leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Followers(PathBuf),
    Following(PathBuf),
    Whitelist(PathBuf),
    Mode(Mode),
    Compare,
    Search(String),
    Regex(bool),
    List,
    Stats,
    Copy(Vec<usize>),
    Open(String),
    Export(PathBuf),
    Help,
    Quit,
}

impl ShellCommand {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> std::result::Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        let path = |command: &str| -> std::result::Result<PathBuf, String> {
            if rest.is_empty() {
                Err(format!("Usage: {} <path>", command))
            } else {
                Ok(PathBuf::from(rest))
            }
        };

        let command = match name.to_ascii_lowercase().as_str() {
            "followers" => ShellCommand::Followers(path("followers")?),
            "following" => ShellCommand::Following(path("following")?),
            "whitelist" => ShellCommand::Whitelist(path("whitelist")?),
            "export" => ShellCommand::Export(path("export")?),
            "mode" => ShellCommand::Mode(rest.parse().map_err(|_| "Usage: mode <unfollowers|fans>".to_string())?),
            "compare" => ShellCommand::Compare,
            "search" => ShellCommand::Search(rest.to_string()),
            "regex" => match rest.to_ascii_lowercase().as_str() {
                "on" => ShellCommand::Regex(true),
                "off" => ShellCommand::Regex(false),
                _ => return Err("Usage: regex <on|off>".to_string()),
            },
            "list" | "ls" => ShellCommand::List,
            "stats" => ShellCommand::Stats,
            "copy" => ShellCommand::Copy(
                rest.split_whitespace()
                    .map(|n| n.parse::<usize>().map_err(|_| format!("Not a result number: {}", n)))
                    .collect::<std::result::Result<_, _>>()?,
            ),
            "open" => {
                if rest.is_empty() {
                    return Err("Usage: open <N|username>".to_string());
                }
                ShellCommand::Open(rest.to_string())
            }
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" | "q" => ShellCommand::Quit,
            other => return Err(format!("Unknown command '{}'. Type 'help' for a list.", other)),
        };

        Ok(Some(command))
    }
}

/// Search settings carried between commands.
#[derive(Debug, Default)]
struct ShellState {
    query: String,
    use_regex: bool,
}

/// Read commands from `input` until `quit`, end of input, or Ctrl+C.
pub async fn run_shell<R: BufRead>(app: &mut FollowDiff, mut input: R) -> Result<()> {
    let mut state = ShellState::default();
    let mut line = String::new();

    app.output_formatter()
        .status("Interactive mode. Type 'help' for commands.");

    loop {
        if !app.is_running() {
            return Err(FollowDiffError::Cancelled);
        }

        print!("followdiff> ");
        std::io::stdout().flush().ok();

        line.clear();
        let read = input
            .read_line(&mut line)
            .map_err(|e| FollowDiffError::io("<stdin>", e))?;
        if read == 0 {
            println!();
            return Ok(());
        }
        if !app.is_running() {
            return Err(FollowDiffError::Cancelled);
        }

        let command = match ShellCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(usage) => {
                app.output_formatter().error(&usage);
                continue;
            }
        };
        debug!(action = "command", component = "shell", command = ?command, "Shell command");

        if command == ShellCommand::Quit {
            return Ok(());
        }

        match execute(app, &mut state, command).await {
            Ok(()) => {}
            Err(FollowDiffError::Cancelled) => return Err(FollowDiffError::Cancelled),
            Err(e) => app.handle_error(&e),
        }
    }
}

async fn execute(app: &mut FollowDiff, state: &mut ShellState, command: ShellCommand) -> Result<()> {
    match command {
        ShellCommand::Followers(path) => app.select_followers(path),
        ShellCommand::Following(path) => app.select_following(path),
        ShellCommand::Whitelist(path) => app.select_whitelist(path).map(|_| ()),
        ShellCommand::Mode(mode) => {
            app.set_mode(mode);
            app.output_formatter().status(&format!("Mode: {}", mode));
            Ok(())
        }
        ShellCommand::Compare => {
            app.compare().await?;
            // Keep the active search across comparisons.
            if state.query.is_empty() {
                app.render_results();
            } else {
                app.search(&state.query, state.use_regex)?;
            }
            Ok(())
        }
        ShellCommand::Search(query) => {
            app.search(&query, state.use_regex)?;
            state.query = query;
            Ok(())
        }
        ShellCommand::Regex(enabled) => {
            let previous = state.use_regex;
            state.use_regex = enabled;
            app.output_formatter()
                .status(&format!("Regex search {}", if enabled { "on" } else { "off" }));
            if !state.query.is_empty() && previous != enabled {
                app.search(&state.query, enabled)?;
            }
            Ok(())
        }
        ShellCommand::List => {
            match app.session().results() {
                Some(_) => app.render_results(),
                None => app.output_formatter().status("No comparison yet. Run 'compare' first."),
            }
            Ok(())
        }
        ShellCommand::Stats => {
            app.print_stats();
            Ok(())
        }
        ShellCommand::Copy(positions) => app.copy_visible(&positions).map(|_| ()),
        ShellCommand::Open(target) => match target.parse::<usize>() {
            Ok(position) => app.open_visible(position).map(|_| ()),
            Err(_) => app.open_profile(&target).map(|_| ()),
        },
        ShellCommand::Export(path) => app.export(path).map(|_| ()),
        ShellCommand::Help => {
            println!("{}", HELP);
            Ok(())
        }
        ShellCommand::Quit => Ok(()),
    }
}
