pub mod account_extractor;
pub mod whitelist;

pub use account_extractor::{AccountExtractor, ExtractedAccounts, Extraction, SourceFormat, DEFAULT_PROFILE_HOST};
pub use whitelist::{load_whitelist, parse_whitelist};
