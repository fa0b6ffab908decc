use crate::accounts::AccountSet;
use crate::error::{FollowDiffError, Result};
use regex::Regex;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

pub const DEFAULT_PROFILE_HOST: &str = "instagram.com";

const FOLLOWING_KEY: &str = "relationships_following";
const FOLLOWERS_KEY: &str = "relationships_followers";
const RECORD_LIST_KEY: &str = "string_list_data";
const RECORD_VALUE_KEY: &str = "value";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Html,
}

impl SourceFormat {
    /// Anything without a `.json` extension is scanned as markup.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SourceFormat::Json,
            _ => SourceFormat::Html,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SourceFormat::Json => "JSON",
            SourceFormat::Html => "HTML",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractedAccounts {
    pub accounts: AccountSet,
    pub format: SourceFormat,
    pub skipped_records: usize,
}

/// Outcome of extracting one file: either the accounts or the reason the
/// whole file was rejected.
#[derive(Debug)]
pub struct Extraction {
    source: PathBuf,
    outcome: Result<ExtractedAccounts>,
}

impl Extraction {
    pub fn new(source: PathBuf, outcome: Result<ExtractedAccounts>) -> Self {
        Self { source, outcome }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn accounts(&self) -> Option<&AccountSet> {
        self.outcome.as_ref().ok().map(|extracted| &extracted.accounts)
    }

    pub fn skipped_records(&self) -> usize {
        self.outcome
            .as_ref()
            .map(|extracted| extracted.skipped_records)
            .unwrap_or(0)
    }

    pub fn error(&self) -> Option<&FollowDiffError> {
        self.outcome.as_ref().err()
    }

    /// Number of accounts found; a failed file counts as empty.
    pub fn len(&self) -> usize {
        self.accounts().map(AccountSet::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_accounts(self) -> AccountSet {
        self.outcome
            .map(|extracted| extracted.accounts)
            .unwrap_or_default()
    }
}

pub struct AccountExtractor {
    host: String,
    profile_link: Regex,
}

impl AccountExtractor {
    pub fn new(host: &str) -> Result<Self> {
        let host = host.trim().trim_start_matches("www.").trim_end_matches('/');
        if host.is_empty() {
            return Err(FollowDiffError::Config {
                message: "Profile host must not be empty".to_string(),
            });
        }

        let pattern = format!(
            r#"href="https://www\.{}/(?:_u/)?([^"/]+)[/"]"#,
            regex::escape(host)
        );
        let profile_link = Regex::new(&pattern).map_err(|e| FollowDiffError::Config {
            message: format!("Invalid profile host '{}': {}", host, e),
        })?;

        Ok(Self {
            host: host.to_string(),
            profile_link,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Extract a file, keeping a top-level failure as the outcome instead of
    /// propagating it.
    pub fn extract_file<P: AsRef<Path>>(&self, path: P) -> Extraction {
        let path = path.as_ref();
        let outcome = self.extract(path);
        if let Err(ref e) = outcome {
            warn!(action = "extract", component = "extractor", file_path = ?path, error = %e, "Extraction failed, using empty set");
        }
        Extraction::new(path.to_path_buf(), outcome)
    }

    pub fn extract<P: AsRef<Path>>(&self, path: P) -> Result<ExtractedAccounts> {
        let path = path.as_ref();
        let start_time = Instant::now();
        let format = SourceFormat::from_path(path);

        let content = fs::read_to_string(path).map_err(|e| FollowDiffError::io(path, e))?;

        let extracted = match format {
            SourceFormat::Json => self.parse_json(path, &content)?,
            SourceFormat::Html => {
                let accounts = self.parse_markup(&content);
                if accounts.is_empty() {
                    warn!(action = "extract", component = "markup", file_path = ?path, host = %self.host, "No profile links found");
                }
                ExtractedAccounts {
                    accounts,
                    format,
                    skipped_records: 0,
                }
            }
        };

        info!(
            action = "extracted",
            component = "extractor",
            file_path = ?path,
            format = format.name(),
            account_count = extracted.accounts.len(),
            skipped_records = extracted.skipped_records,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Extracted accounts"
        );

        Ok(extracted)
    }

    pub fn parse_json(&self, path: &Path, content: &str) -> Result<ExtractedAccounts> {
        let document: Value = serde_json::from_str(content)
            .map_err(|e| FollowDiffError::parse(path, format!("Invalid JSON: {}", e)))?;

        let records = match &document {
            Value::Array(records) => records,
            Value::Object(map) if map.contains_key(FOLLOWING_KEY) => {
                record_list(path, map.get(FOLLOWING_KEY), FOLLOWING_KEY)?
            }
            Value::Object(map) if map.contains_key(FOLLOWERS_KEY) => {
                record_list(path, map.get(FOLLOWERS_KEY), FOLLOWERS_KEY)?
            }
            _ => return Err(FollowDiffError::parse(path, "Unknown JSON structure")),
        };

        let mut accounts = AccountSet::new();
        let mut skipped_records = 0;
        for record in records {
            match record_identifier(record) {
                Some(identifier) => {
                    accounts.insert(identifier);
                }
                None => skipped_records += 1,
            }
        }

        if skipped_records > 0 {
            debug!(action = "skip", component = "json_records", file_path = ?path, skipped_records, "Skipped records without an identifier");
        }

        Ok(ExtractedAccounts {
            accounts,
            format: SourceFormat::Json,
            skipped_records,
        })
    }

    pub fn parse_markup(&self, content: &str) -> AccountSet {
        self.profile_link
            .captures_iter(content)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

fn record_list<'a>(path: &Path, value: Option<&'a Value>, key: &str) -> Result<&'a Vec<Value>> {
    match value {
        Some(Value::Array(records)) => Ok(records),
        _ => Err(FollowDiffError::parse(
            path,
            format!("'{}' is not a list of records", key),
        )),
    }
}

fn record_identifier(record: &Value) -> Option<&str> {
    record
        .get(RECORD_LIST_KEY)?
        .as_array()?
        .first()?
        .get(RECORD_VALUE_KEY)?
        .as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn extractor() -> AccountExtractor {
        AccountExtractor::new(DEFAULT_PROFILE_HOST).unwrap()
    }

    fn sorted(set: &AccountSet) -> Vec<String> {
        set.sorted()
    }

    #[test]
    fn test_source_format_detection() {
        assert_eq!(SourceFormat::from_path(Path::new("followers_1.json")), SourceFormat::Json);
        assert_eq!(SourceFormat::from_path(Path::new("following.JSON")), SourceFormat::Json);
        assert_eq!(SourceFormat::from_path(Path::new("followers_1.html")), SourceFormat::Html);
        assert_eq!(SourceFormat::from_path(Path::new("following")), SourceFormat::Html);
    }

    #[test]
    fn test_json_following_mapping() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "following.json",
            r#"{"relationships_following": [{"string_list_data":[{"value":"x"}]}, {"string_list_data":[{"value":"y"}]}]}"#,
        );

        let extracted = extractor().extract(&path).unwrap();
        assert_eq!(sorted(&extracted.accounts), vec!["x", "y"]);
        assert_eq!(extracted.format, SourceFormat::Json);
        assert_eq!(extracted.skipped_records, 0);
    }

    #[test]
    fn test_json_followers_mapping() {
        let extractor = extractor();
        let content = r#"{"relationships_followers": [
            {"string_list_data": [{"href": "https://www.instagram.com/a", "value": "a", "timestamp": 1}]}
        ]}"#;
        let extracted = extractor.parse_json(Path::new("f.json"), content).unwrap();
        assert_eq!(sorted(&extracted.accounts), vec!["a"]);
    }

    #[test]
    fn test_json_flat_list() {
        let extractor = extractor();
        let content = r#"[
            {"title": "", "string_list_data": [{"value": "carol"}]},
            {"title": "", "string_list_data": [{"value": "dave"}, {"value": "ignored"}]},
            {"title": "", "string_list_data": [{"value": "carol"}]}
        ]"#;
        let extracted = extractor.parse_json(Path::new("followers_1.json"), content).unwrap();
        assert_eq!(sorted(&extracted.accounts), vec!["carol", "dave"]);
    }

    #[test]
    fn test_flat_list_takes_priority_over_keys() {
        let extractor = extractor();
        let content = r#"{"relationships_following": [{"string_list_data":[{"value":"first"}]}],
                          "relationships_followers": [{"string_list_data":[{"value":"second"}]}]}"#;
        let extracted = extractor.parse_json(Path::new("both.json"), content).unwrap();
        assert_eq!(sorted(&extracted.accounts), vec!["first"]);
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let extractor = extractor();
        let content = r#"[
            {"string_list_data": [{"value": "kept"}]},
            {"title": "no list"},
            {"string_list_data": []},
            {"string_list_data": [{"href": "no value"}]},
            {"string_list_data": [{"value": 42}]},
            "not even an object"
        ]"#;
        let extracted = extractor.parse_json(Path::new("x.json"), content).unwrap();
        assert_eq!(sorted(&extracted.accounts), vec!["kept"]);
        assert_eq!(extracted.skipped_records, 5);
    }

    #[test]
    fn test_unknown_json_structure() {
        let dir = TempDir::new().unwrap();
        let extractor = extractor();

        for content in [r#""just a string""#, r#"{"something_else": []}"#, "42"] {
            let path = write_file(&dir, "odd.json", content);
            let extraction = extractor.extract_file(&path);
            assert!(!extraction.is_ok());
            assert!(extraction.is_empty());
            match extraction.error() {
                Some(FollowDiffError::Parse { message, .. }) => {
                    assert_eq!(message, "Unknown JSON structure")
                }
                other => panic!("expected parse error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_key_with_non_list_value() {
        let extractor = extractor();
        let result = extractor.parse_json(
            Path::new("x.json"),
            r#"{"relationships_following": "oops"}"#,
        );
        assert!(matches!(result, Err(FollowDiffError::Parse { .. })));
    }

    #[test]
    fn test_invalid_json() {
        let extractor = extractor();
        let result = extractor.parse_json(Path::new("x.json"), "{not json");
        match result {
            Err(FollowDiffError::Parse { message, .. }) => assert!(message.starts_with("Invalid JSON")),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_markup_extraction() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "followers_1.html",
            r#"<div><a target="_blank" href="https://www.instagram.com/_u/alice/">alice</a></div>
               <div><a target="_blank" href="https://www.instagram.com/bob/">bob</a></div>
               <div><a href="https://www.instagram.com/bob">bob again</a></div>
               <div><a href="https://www.example.com/mallory/">elsewhere</a></div>"#,
        );

        let extracted = extractor().extract(&path).unwrap();
        assert_eq!(sorted(&extracted.accounts), vec!["alice", "bob"]);
        assert_eq!(extracted.format, SourceFormat::Html);
    }

    #[test]
    fn test_markup_custom_host() {
        let extractor = AccountExtractor::new("www.example.com/").unwrap();
        assert_eq!(extractor.host(), "example.com");
        let accounts = extractor.parse_markup(
            r#"<a href="https://www.example.com/mallory/">m</a><a href="https://www.instagram.com/alice/">a</a>"#,
        );
        assert_eq!(sorted(&accounts), vec!["mallory"]);
    }

    #[test]
    fn test_markup_without_links_is_empty() {
        let extractor = extractor();
        assert!(extractor.parse_markup("<html><body>nothing</body></html>").is_empty());
        assert!(extractor
            .parse_markup(r#"<a href="https://www.instagram.com/">home</a>"#)
            .is_empty());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let extraction = extractor().extract_file(dir.path().join("absent.html"));
        assert!(matches!(extraction.error(), Some(FollowDiffError::Io { .. })));
        assert_eq!(extraction.len(), 0);
    }

    #[test]
    fn test_empty_host_rejected() {
        assert!(matches!(
            AccountExtractor::new("  "),
            Err(FollowDiffError::Config { .. })
        ));
    }
}
