mod extract;
mod harvest;
mod init;

pub use extract::{extract_files, OutputFormat};
pub use harvest::harvest_pages;
pub use init::init_config;
