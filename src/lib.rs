pub mod accounts;
pub mod cli;
pub mod compare;
pub mod config;
pub mod error;
pub mod exporter;
pub mod extractor;
pub mod search;
pub mod session;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, ModeArg, OutputFormat};
pub use config::{CliOverrides, Config, OutputConfig, PathsConfig, ProfileConfig};
pub use error::{FollowDiffError, Result, UserFriendlyError};

// Core functionality re-exports
pub use accounts::{AccountSet, Identifier, Whitelist};
pub use compare::{
    compare, Comparison, ComparisonOutcome, ComparisonRequest, ComparisonStats, ComparisonWorker,
    Mode, PendingComparison,
};
pub use exporter::{auto_save_file_name, ExportFormat};
pub use extractor::{AccountExtractor, Extraction, SourceFormat};
pub use search::{filter, FilteredView, ResultStore};
pub use session::Session;
pub use ui::{GracefulShutdown, Launcher, OutputFormatter, OutputMode, ProgressManager, SystemLauncher};

use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// What a finished comparison produced, for exit-code decisions.
#[derive(Debug, Clone)]
pub struct CompareSummary {
    pub stats: ComparisonStats,
    pub file_errors: usize,
    pub elapsed: Duration,
    pub auto_saved: Option<PathBuf>,
}

/// Main library interface: owns the session and talks to the user.
pub struct FollowDiff {
    /// What gets written back to `config_path`: file selections only.
    stored: Config,
    /// `stored` plus this run's overrides.
    config: Config,
    config_path: PathBuf,
    selection_errors: usize,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
    session: Session,
    worker: ComparisonWorker,
    launcher: Box<dyn Launcher>,
}

impl FollowDiff {
    /// Create a new FollowDiff instance. `overrides` apply to this run only
    /// and never reach the saved configuration.
    pub fn new(
        stored: Config,
        overrides: &CliOverrides,
        config_path: PathBuf,
        output_mode: OutputMode,
        verbose: u8,
        quiet: bool,
    ) -> Result<Self> {
        let config = stored.effective(overrides)?;
        let shutdown = GracefulShutdown::new()?;
        Self::build(stored, config, config_path, output_mode, verbose, quiet, shutdown)
    }

    /// Create a new FollowDiff instance for testing (no signal handler conflicts)
    pub fn new_for_test(config: Config, config_path: PathBuf) -> Result<Self> {
        Self::build(
            config.clone(),
            config,
            config_path,
            OutputMode::Plain,
            0,
            true,
            GracefulShutdown::new_for_test(),
        )
    }

    fn build(
        stored: Config,
        config: Config,
        config_path: PathBuf,
        output_mode: OutputMode,
        verbose: u8,
        quiet: bool,
        shutdown: GracefulShutdown,
    ) -> Result<Self> {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);
        let worker = ComparisonWorker::new(AccountExtractor::new(&config.profile.host)?);

        let mut session = Session::from_paths(&config.paths);
        if let Some(path) = config.paths.whitelist() {
            // A remembered whitelist that no longer loads is not fatal.
            if let Err(e) = session.select_whitelist(&path) {
                warn!(action = "restore_whitelist", component = "session", file_path = ?path, error = %e, "Remembered whitelist could not be loaded");
            }
        }

        Ok(Self {
            stored,
            config,
            config_path,
            selection_errors: 0,
            output_formatter,
            progress_manager,
            shutdown,
            session,
            worker,
            launcher: Box::new(SystemLauncher::new()),
        })
    }

    /// Create FollowDiff instance from CLI arguments. Files named on the
    /// command line are selected (and remembered) right away. A file that
    /// can't be selected is reported and counted, not fatal: the previous
    /// selection stays and a failed whitelist leaves none active.
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let stored = cli_args.load_config()?;
        let config_path = Config::resolve_path(cli_args.config.as_deref());
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        let mut app = Self::new(
            stored,
            &cli_args.create_cli_overrides(),
            config_path,
            output_mode,
            cli_args.verbose,
            cli_args.quiet,
        )?;
        app.set_mode(cli_args.mode.into());

        if let Some(ref path) = cli_args.followers {
            let result = app.select_followers(path);
            app.note_selection(result);
        }
        if let Some(ref path) = cli_args.following {
            let result = app.select_following(path);
            app.note_selection(result);
        }
        if let Some(ref path) = cli_args.whitelist {
            let result = app.select_whitelist(path).map(|_| ());
            app.note_selection(result);
        }

        Ok(app)
    }

    fn note_selection(&mut self, result: Result<()>) {
        if let Err(e) = result {
            warn!(action = "select", component = "session", error = %e, "Selection failed");
            self.selection_errors += 1;
            self.handle_error(&e);
        }
    }

    /// Files named on the command line that could not be selected.
    pub fn selection_errors(&self) -> usize {
        self.selection_errors
    }

    /// Replace the side-effect backend used by open and copy.
    pub fn with_launcher(mut self, launcher: Box<dyn Launcher>) -> Self {
        self.launcher = launcher;
        self
    }

    pub fn select_followers<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.session.select_followers(path)?;
        self.stored.record_followers(path);
        self.config.record_followers(path);
        self.persist_config();
        self.output_formatter.info(&format!("Followers file: {}", path.display()));
        Ok(())
    }

    pub fn select_following<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.session.select_following(path)?;
        self.stored.record_following(path);
        self.config.record_following(path);
        self.persist_config();
        self.output_formatter.info(&format!("Following file: {}", path.display()));
        Ok(())
    }

    /// Load a whitelist; on failure the active whitelist is emptied.
    pub fn select_whitelist<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let path = path.as_ref();
        let count = self.session.select_whitelist(path)?;
        self.stored.record_whitelist(path);
        self.config.record_whitelist(path);
        self.persist_config();
        self.output_formatter
            .status(&format!("Loaded {} whitelisted account(s)", count));
        Ok(count)
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if self.session.mode() != mode {
            debug!(action = "set_mode", component = "session", mode = mode.name(), "Comparison mode changed");
        }
        self.session.set_mode(mode);
    }

    fn persist_config(&self) {
        if let Err(e) = self.stored.save_to_file(&self.config_path) {
            warn!(action = "save_config", component = "config", file_path = ?self.config_path, error = %e, "Failed to persist selections");
            self.output_formatter.warning(&e.user_message());
        }
    }

    /// Run a comparison in the background and wait for it with a spinner.
    /// Statistics are shown and the results auto-saved; rendering the list
    /// is left to the caller so a search can be applied first.
    pub async fn compare(&mut self) -> Result<CompareSummary> {
        self.shutdown.check_shutdown()?;
        let request = self.session.comparison_request()?;

        self.output_formatter
            .start_operation(&format!("Comparing ({})", request.mode));
        let pending = self.worker.start(request)?;
        let spinner = self.progress_manager.create_spinner("Comparing...");

        let shutdown = &self.shutdown;
        let outcome = match pending
            .wait(compare::POLL_INTERVAL, || shutdown.check_shutdown())
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                spinner.finish_and_clear();
                return Err(e);
            }
        };

        ui::progress::finish_progress_with_summary(&spinner, "Comparison finished", outcome.elapsed);

        let elapsed = outcome.elapsed;
        let file_errors = outcome.errors().count();
        self.progress_manager.suspend(|| {
            for error in outcome.errors() {
                self.output_formatter.print_user_friendly_error(error);
            }
        });

        let stats = self.session.install(outcome);
        info!(action = "compare", component = "session", mode = stats.mode.name(), results = stats.results, file_errors, "Comparison installed");

        self.output_formatter.print_statistics(&stats);
        let auto_saved = self.auto_save();

        Ok(CompareSummary {
            stats,
            file_errors,
            elapsed,
            auto_saved,
        })
    }

    fn auto_save(&self) -> Option<PathBuf> {
        if !self.config.output.auto_save {
            return None;
        }
        let results = self.session.results().filter(|results| !results.is_empty())?;

        let date = chrono::Local::now().date_naive();
        match exporter::auto_save(results.entries(), results.mode(), &self.config.output.auto_save_dir, date) {
            Ok(path) => {
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.display().to_string());
                self.output_formatter.status(&format!("Auto-saved to {}", name));
                Some(path)
            }
            Err(e) => {
                self.output_formatter.warning(&format!("Auto-save failed: {}", e.user_message()));
                None
            }
        }
    }

    /// Print the currently displayed results.
    pub fn render_results(&self) {
        if let Some(results) = self.session.results() {
            self.output_formatter.print_results(&results.view());
        }
    }

    /// Re-filter and re-render the displayed results. An invalid pattern
    /// returns before anything is printed, so the previous view stays on
    /// screen.
    pub fn search(&mut self, query: &str, use_regex: bool) -> Result<usize> {
        let count = self.session.search(query, use_regex)?;
        self.render_results();
        self.output_formatter
            .status(&format!("Search complete — {} result(s)", count));
        Ok(count)
    }

    /// Write the full, unfiltered result list.
    pub fn export<P: AsRef<Path>>(&self, path: P) -> Result<ExportFormat> {
        let path = path.as_ref();
        let results = self
            .session
            .results()
            .filter(|results| !results.is_empty())
            .ok_or(FollowDiffError::NoResults)?;

        let format = exporter::export(results.entries(), path)?;
        self.output_formatter.success(&format!(
            "Exported {} result(s) to {}",
            results.len(),
            path.display()
        ));
        Ok(format)
    }

    pub fn open_profile(&self, identifier: &str) -> Result<Url> {
        let url = ui::desktop::profile_url(self.worker.extractor().host(), identifier)?;
        self.launcher.open_url(&url)?;
        self.output_formatter.status(&format!("Opened {}", url));
        Ok(url)
    }

    /// Open the profile at a 1-based position in the displayed results.
    pub fn open_visible(&self, position: usize) -> Result<Url> {
        let identifier = self.visible_at(position)?.to_string();
        self.open_profile(&identifier)
    }

    /// Copy displayed identifiers, one per line. With no positions the
    /// whole view is copied; positions are 1-based.
    pub fn copy_visible(&self, positions: &[usize]) -> Result<usize> {
        let selected: Vec<&str> = if positions.is_empty() {
            self.session
                .results()
                .map(|results| results.view().iter().collect())
                .unwrap_or_default()
        } else {
            positions
                .iter()
                .map(|&position| self.visible_at(position))
                .collect::<Result<_>>()?
        };

        if selected.is_empty() {
            self.output_formatter.status("Nothing to copy");
            return Ok(0);
        }

        self.launcher.copy_text(&selected.join("\n"))?;
        self.output_formatter
            .status(&format!("Copied {} username(s)", selected.len()));
        Ok(selected.len())
    }

    fn visible_at(&self, position: usize) -> Result<&str> {
        position
            .checked_sub(1)
            .and_then(|index| self.session.results().and_then(|results| results.visible(index)))
            .ok_or_else(|| FollowDiffError::InvalidIdentifier {
                identifier: position.to_string(),
            })
    }

    pub fn print_stats(&self) -> ComparisonStats {
        let stats = self.session.stats();
        self.output_formatter.print_statistics(&stats);
        stats
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let output_path = output_path.as_ref();
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path, sample_config)
            .map_err(|e| FollowDiffError::io(output_path, e))?;
        Ok(())
    }

    /// The configuration in effect for this run, overrides included.
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Get output formatter reference
    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Get progress manager reference
    pub fn progress_manager(&self) -> &ProgressManager {
        &self.progress_manager
    }

    /// Check if shutdown has been requested
    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    /// Request graceful shutdown
    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &FollowDiffError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Get version information
pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
