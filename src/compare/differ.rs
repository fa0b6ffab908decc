use crate::accounts::{AccountSet, Identifier, Whitelist};
use crate::error::{FollowDiffError, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Which direction of the follow relationship to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Mode {
    /// Accounts you follow that do not follow you back.
    #[default]
    Unfollowers,
    /// Accounts that follow you that you do not follow back.
    Fans,
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Unfollowers => "Unfollowers",
            Mode::Fans => "Fans",
        }
    }

    /// Lowercased name, used for auto-save file names.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Mode::Unfollowers => "unfollowers",
            Mode::Fans => "fans",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = FollowDiffError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "unfollowers" => Ok(Mode::Unfollowers),
            "fans" => Ok(Mode::Fans),
            other => Err(FollowDiffError::Config {
                message: format!("Unknown mode '{}' (expected unfollowers or fans)", other),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub mode: Mode,
    /// Sorted ascending, whitelist already removed.
    pub results: Vec<Identifier>,
    pub mutuals: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ComparisonStats {
    pub mode: Mode,
    pub followers: usize,
    pub following: usize,
    pub mutuals: usize,
    pub results: usize,
}

pub fn compare(
    followers: &AccountSet,
    following: &AccountSet,
    mode: Mode,
    whitelist: &Whitelist,
) -> Comparison {
    let (source, other) = match mode {
        Mode::Unfollowers => (following, followers),
        Mode::Fans => (followers, following),
    };

    let mut results: Vec<Identifier> = source
        .difference(other, whitelist)
        .map(str::to_string)
        .collect();
    results.sort_unstable();

    Comparison {
        mode,
        results,
        mutuals: followers.intersection_count(following),
    }
}

impl Comparison {
    pub fn stats(&self, followers: usize, following: usize) -> ComparisonStats {
        ComparisonStats {
            mode: self.mode,
            followers,
            following,
            mutuals: self.mutuals,
            results: self.results.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[&str]) -> AccountSet {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_unfollowers_and_fans() {
        let followers = set(&["a", "b", "c"]);
        let following = set(&["b", "c", "d"]);
        let whitelist = set(&["d"]);

        let unfollowers = compare(&followers, &following, Mode::Unfollowers, &whitelist);
        assert!(unfollowers.results.is_empty());
        assert_eq!(unfollowers.mutuals, 2);

        let fans = compare(&followers, &following, Mode::Fans, &whitelist);
        assert_eq!(fans.results, vec!["a"]);
        assert_eq!(fans.mutuals, 2);
    }

    #[test]
    fn test_empty_whitelist_gives_plain_difference() {
        let followers = set(&["zoe", "amy", "kim"]);
        let following = set(&["kim", "bob", "Ann", "yan"]);
        let none = Whitelist::new();

        let unfollowers = compare(&followers, &following, Mode::Unfollowers, &none);
        assert_eq!(unfollowers.results, vec!["Ann", "bob", "yan"]);

        let mut resorted = unfollowers.results.clone();
        resorted.sort();
        assert_eq!(resorted, unfollowers.results);

        let fans = compare(&followers, &following, Mode::Fans, &none);
        assert_eq!(fans.results, vec!["amy", "zoe"]);
    }

    #[test]
    fn test_whitelist_is_monotonic() {
        let followers = set(&["a"]);
        let following = set(&["a", "b", "c", "d", "e"]);
        let whitelists = [set(&[]), set(&["b"]), set(&["b", "c"]), set(&["b", "c", "x", "e"])];

        let mut previous = usize::MAX;
        for whitelist in &whitelists {
            let result = compare(&followers, &following, Mode::Unfollowers, whitelist);
            assert!(result.results.len() <= previous);
            for excluded in whitelist.iter() {
                assert!(!result.results.iter().any(|id| id == excluded));
            }
            previous = result.results.len();
        }
    }

    #[test]
    fn test_comparison_is_case_sensitive() {
        let followers = set(&["Alice"]);
        let following = set(&["alice"]);
        let result = compare(&followers, &following, Mode::Unfollowers, &Whitelist::new());
        assert_eq!(result.results, vec!["alice"]);
        assert_eq!(result.mutuals, 0);
    }

    #[test]
    fn test_stats() {
        let followers = set(&["a", "b", "c"]);
        let following = set(&["b", "c", "d"]);
        let comparison = compare(&followers, &following, Mode::Unfollowers, &Whitelist::new());
        let stats = comparison.stats(followers.len(), following.len());

        assert_eq!(stats.followers, 3);
        assert_eq!(stats.following, 3);
        assert_eq!(stats.mutuals, 2);
        assert_eq!(stats.results, 1);
        assert_eq!(stats.mode, Mode::Unfollowers);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Unfollowers".parse::<Mode>().unwrap(), Mode::Unfollowers);
        assert_eq!(" fans ".parse::<Mode>().unwrap(), Mode::Fans);
        assert!("friends".parse::<Mode>().is_err());
        assert_eq!(Mode::Fans.file_stem(), "fans");
        assert_eq!(Mode::default().to_string(), "Unfollowers");
    }
}
