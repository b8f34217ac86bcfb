use dockgen::cli::commands::{CliArgs, Commands};
use dockgen::cli::handlers::{handle_detect, handle_generate, handle_health, handle_prompt};
use dockgen::util::logging::{config_from_env, init_logging, parse_level};
use dockgen::VERSION;

use clap::Parser;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("dockgen v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Detect(detect_args) => handle_detect(detect_args).await,
        Commands::Prompt(prompt_args) => handle_prompt(prompt_args).await,
        Commands::Generate(generate_args) => handle_generate(generate_args).await,
        Commands::Health(health_args) => handle_health(health_args).await,
    };

    std::process::exit(exit_code);
}

/// `--log-level` wins over `-v`/`-q`, which win over `DOCKGEN_LOG_LEVEL`
fn init_logging_from_args(args: &CliArgs) {
    let mut config = config_from_env();
    if let Some(level_str) = &args.log_level {
        config.level = parse_level(level_str);
    } else if args.verbose {
        config.level = Level::DEBUG;
    } else if args.quiet {
        config.level = Level::ERROR;
    }
    init_logging(config);
}
