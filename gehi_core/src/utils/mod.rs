mod error_chain;
mod file_name;

pub use error_chain::format_error_chain;
pub use file_name::sanitize_file_name;
