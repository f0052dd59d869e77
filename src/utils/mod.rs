/// Candidate file discovery and in-place file helpers
pub mod file_utils;
/// Shared cache for regexes compiled from configuration
pub mod filter;
/// Table building for result summaries
pub mod tables;
