pub mod result_writer;

pub use result_writer::{auto_save, auto_save_file_name, export, write_results, ExportFormat, CSV_HEADER};
