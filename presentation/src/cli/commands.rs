//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use polyllm_domain::OutputFormat;
use std::path::PathBuf;

/// Output format selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    /// Model results, every consensus section and the full analytics report
    Full,
    /// Only the synthesis and the analytics summary
    Synthesis,
    /// Enriched analytics as JSON
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Full => OutputFormat::Full,
            OutputFormatArg::Synthesis => OutputFormat::Synthesis,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

/// CLI arguments for polyllm
#[derive(Parser, Debug)]
#[command(name = "polyllm")]
#[command(author, version, about = "Ask several LLMs, negotiate a consensus, score the agreement")]
#[command(long_about = r#"
polyllm sends one prompt to several models in parallel, has a consensus model
reconcile their answers section by section, then converts the result into
scored agreement analytics.

Configuration files are loaded from (lowest to highest priority):
1. ~/.config/polyllm/config.toml     Global config
2. ./polyllm.toml or ./.polyllm.toml Project-level config
3. --config <path>                   Explicit config file
4. OPENROUTER_API_KEY and POLYLLM_* environment variables

Example:
  polyllm ask "Is Rust a good fit for CLI tools?"
  polyllm ask -m openai/gpt-4.1 -m x-ai/grok-3-beta -o full "Compare async runtimes"
  polyllm repair conversion.json
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Also write diagnostics to this file
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the full pipeline for one prompt
    Ask(AskArgs),
    /// Score hand-corrected conversion output without calling a model
    Repair(RepairArgs),
    /// List the model catalog and codenames
    Models,
}

#[derive(Args, Debug)]
pub struct AskArgs {
    /// The prompt sent to every model
    pub prompt: String,

    /// Models to query (can be specified multiple times)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Vec<String>,

    /// Model that runs the consensus conversation
    #[arg(long, value_name = "MODEL")]
    pub consensus_model: Option<String>,

    /// Model that converts the consensus into JSON
    #[arg(long, value_name = "MODEL")]
    pub json_model: Option<String>,

    /// Stop after the consensus document
    #[arg(long)]
    pub skip_analytics: bool,

    /// Output format (defaults to the config file, then synthesis)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormatArg>,
}

#[derive(Args, Debug)]
pub struct RepairArgs {
    /// File holding the edited conversion output
    pub file: PathBuf,

    /// Prompt to show in the report header
    #[arg(long)]
    pub prompt: Option<String>,

    /// Output format (defaults to the config file, then synthesis)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormatArg>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ask() {
        let cli = Cli::parse_from([
            "polyllm",
            "-vv",
            "ask",
            "-m",
            "openai/gpt-4.1",
            "-m",
            "x-ai/grok-3-beta",
            "--json-model",
            "openai/gpt-4.1",
            "-o",
            "json",
            "Why?",
        ]);
        assert_eq!(cli.verbose, 2);
        let Some(Command::Ask(args)) = cli.command else {
            panic!("expected ask");
        };
        assert_eq!(args.prompt, "Why?");
        assert_eq!(args.model.len(), 2);
        assert_eq!(args.json_model.as_deref(), Some("openai/gpt-4.1"));
        assert_eq!(args.output, Some(OutputFormatArg::Json));
        assert!(!args.skip_analytics);
    }

    #[test]
    fn test_parse_repair_with_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["polyllm", "repair", "fixed.json", "--no-config", "-q"]);
        assert!(cli.no_config);
        assert!(cli.quiet);
        let Some(Command::Repair(args)) = cli.command else {
            panic!("expected repair");
        };
        assert_eq!(args.file, PathBuf::from("fixed.json"));
        assert!(args.output.is_none());
    }

    #[test]
    fn test_output_arg_maps_to_domain() {
        assert_eq!(OutputFormat::from(OutputFormatArg::Full), OutputFormat::Full);
    }
}
