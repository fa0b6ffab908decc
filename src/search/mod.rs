pub mod filter;
pub mod result_store;

pub use filter::{filter, FilteredView, Matcher};
pub use result_store::ResultStore;
