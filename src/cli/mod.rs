pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, Commands, DetectArgs, GenerateArgs, HealthArgs, PromptArgs};
pub use output::{GenerateReport, OutputFormat, OutputFormatter};
