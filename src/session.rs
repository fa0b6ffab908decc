use crate::accounts::{AccountSet, Whitelist};
use crate::compare::{ComparisonOutcome, ComparisonRequest, ComparisonStats, Mode};
use crate::config::PathsConfig;
use crate::error::{FollowDiffError, Result};
use crate::extractor::load_whitelist;
use crate::search::ResultStore;
use std::path::{Path, PathBuf};

/// State of one comparison run, kept until the next one replaces it.
#[derive(Debug, Clone)]
pub struct ComparisonSnapshot {
    pub followers: AccountSet,
    pub following: AccountSet,
    pub stats: ComparisonStats,
    pub results: ResultStore,
}

/// Everything the user has selected and the latest comparison.
#[derive(Debug, Default)]
pub struct Session {
    followers_file: Option<PathBuf>,
    following_file: Option<PathBuf>,
    whitelist_file: Option<PathBuf>,
    whitelist: Whitelist,
    mode: Mode,
    last: Option<ComparisonSnapshot>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore the remembered file locations. The whitelist itself is not
    /// read here; see [`Session::select_whitelist`].
    pub fn from_paths(paths: &PathsConfig) -> Self {
        Self {
            followers_file: paths.followers(),
            following_file: paths.following(),
            whitelist_file: paths.whitelist(),
            ..Self::default()
        }
    }

    pub fn followers_file(&self) -> Option<&Path> {
        self.followers_file.as_deref()
    }

    pub fn following_file(&self) -> Option<&Path> {
        self.following_file.as_deref()
    }

    pub fn whitelist_file(&self) -> Option<&Path> {
        self.whitelist_file.as_deref()
    }

    pub fn select_followers<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.followers_file = Some(existing_file(path.as_ref())?);
        Ok(())
    }

    pub fn select_following<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.following_file = Some(existing_file(path.as_ref())?);
        Ok(())
    }

    /// Load a new whitelist, replacing the current one. On failure the
    /// whitelist is emptied.
    pub fn select_whitelist<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let path = path.as_ref();
        match load_whitelist(path) {
            Ok(whitelist) => {
                self.whitelist = whitelist;
                self.whitelist_file = Some(path.to_path_buf());
                Ok(self.whitelist.len())
            }
            Err(e) => {
                self.whitelist = Whitelist::new();
                Err(e)
            }
        }
    }

    pub fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn comparison_request(&self) -> Result<ComparisonRequest> {
        let followers = self
            .followers_file
            .clone()
            .ok_or(FollowDiffError::MissingInput { which: "followers" })?;
        let following = self
            .following_file
            .clone()
            .ok_or(FollowDiffError::MissingInput { which: "following" })?;

        Ok(ComparisonRequest {
            followers,
            following,
            mode: self.mode,
            whitelist: self.whitelist.clone(),
        })
    }

    /// Replace the previous comparison with `outcome`.
    pub fn install(&mut self, outcome: ComparisonOutcome) -> ComparisonStats {
        let stats = outcome.stats();
        let results = ResultStore::new(outcome.comparison.mode, outcome.comparison.results);

        self.last = Some(ComparisonSnapshot {
            followers: outcome.followers.into_accounts(),
            following: outcome.following.into_accounts(),
            stats,
            results,
        });
        stats
    }

    pub fn last(&self) -> Option<&ComparisonSnapshot> {
        self.last.as_ref()
    }

    pub fn stats(&self) -> ComparisonStats {
        self.last
            .as_ref()
            .map(|snapshot| snapshot.stats)
            .unwrap_or(ComparisonStats {
                mode: self.mode,
                ..ComparisonStats::default()
            })
    }

    pub fn results(&self) -> Option<&ResultStore> {
        self.last.as_ref().map(|snapshot| &snapshot.results)
    }

    pub fn results_mut(&mut self) -> Option<&mut ResultStore> {
        self.last.as_mut().map(|snapshot| &mut snapshot.results)
    }

    /// Re-filter the displayed results. Before any comparison there is
    /// nothing to show, but the query is still validated.
    pub fn search(&mut self, query: &str, use_regex: bool) -> Result<usize> {
        match self.results_mut() {
            Some(results) => results.apply_filter(query, use_regex),
            None => crate::search::Matcher::new(query, use_regex).map(|_| 0),
        }
    }
}

fn existing_file(path: &Path) -> Result<PathBuf> {
    if path.is_file() {
        Ok(path.to_path_buf())
    } else {
        Err(FollowDiffError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        ))
    }
}
