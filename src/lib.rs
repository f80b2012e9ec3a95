pub mod analysis;
pub mod browser;
pub mod config;
pub mod error;
pub mod fetch;
pub mod output;
pub mod provider;
pub mod scoring;
pub mod stderr_buffer;
pub mod tui;

pub use error::AnalysisError;

// Process exit codes
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_NETWORK: i32 = 2;
pub const EXIT_CONFIG: i32 = 4;
pub const EXIT_ANALYSIS: i32 = 5;
