//! CLI entrypoint for polyllm
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::{CommandFactory, Parser};
use polyllm_application::{
    ChatGateway, ConversationLogger, ConvertAnalyticsUseCase,
    NoConversationLogger, NoProgress, PipelineError, QueryModelsUseCase, QueryProgressNotifier,
    RunConsensusUseCase, RunPipelineInput, RunPipelineUseCase, analyze_text,
};
use polyllm_domain::{
    ConfigIssue, ConsensusSection, ExtractionStage, OutputFormat, UserPrompt, has_errors,
};
use polyllm_infrastructure::{
    ConfigLoader, FileConfig, JsonlConversationLogger, OpenRouterGateway,
    load_consensus_template, load_conversion_template,
};
use polyllm_presentation::{
    AskArgs, Cli, Command, ConsoleFormatter, ConsolePresenter, OutputConfig, ProgressReporter,
    RepairArgs, SimpleProgress,
};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_tracing(cli.verbose, cli.log_file.as_deref())?;

    info!("Starting polyllm");

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    match cli.command {
        Some(Command::Ask(args)) => ask(args, &config, cli.quiet).await,
        Some(Command::Repair(args)) => repair(args, &config, cli.quiet),
        Some(Command::Models) => {
            println!("{}", ConsoleFormatter::format_models(&config.models.catalog()));
            Ok(())
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

/// Console diagnostics go to stderr so stdout stays clean for `-o json`.
fn init_tracing(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = if verbose == 0 {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let name = path
                .file_name()
                .ok_or_else(|| anyhow!("--log-file must name a file: {}", path.display()))?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Print every issue; fail if any is an error.
fn report_issues(issues: &[ConfigIssue]) -> Result<()> {
    for issue in issues {
        if issue.is_error() {
            eprintln!("{}", issue);
        } else {
            warn!("{}", issue.message);
        }
    }
    if has_errors(issues) {
        bail!("Invalid configuration");
    }
    Ok(())
}

fn conversation_logger(config: &FileConfig) -> Arc<dyn ConversationLogger> {
    let Some(path) = &config.logging.conversation_log else {
        return Arc::new(NoConversationLogger);
    };
    match JsonlConversationLogger::open(path) {
        Ok(logger) => {
            info!("Conversation log: {}", logger.path().display());
            Arc::new(logger)
        }
        Err(e) => {
            warn!("Conversation log disabled ({}): {}", path.display(), e);
            Arc::new(NoConversationLogger)
        }
    }
}

/// Cancel the token on the first Ctrl-C.
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling in-flight requests");
            trigger.cancel();
        }
    });
    token
}

async fn ask(args: AskArgs, config: &FileConfig, quiet: bool) -> Result<()> {
    report_issues(&config.validate_for_requests())?;

    let output = OutputConfig::resolve(
        args.output.map(Into::into),
        config.output.format,
        config.output.color,
        quiet,
    );
    output.apply_color();

    let catalog = config.models.catalog();
    let models = config.models.selected_models(&catalog, &args.model);
    let consensus_model = match &args.consensus_model {
        Some(id) => catalog.resolve(id),
        None => config.models.consensus_model(&catalog),
    };
    let conversion_model = match &args.json_model {
        Some(id) => catalog.resolve(id),
        None => config.models.conversion_model(&catalog),
    };
    let prompt = UserPrompt::new(args.prompt)?;

    // === Dependency Injection ===
    let gateway: Arc<dyn ChatGateway> = Arc::new(OpenRouterGateway::new(config.api.settings()?)?);
    let logger = conversation_logger(config);
    let cancellation = cancel_on_ctrl_c();
    let generation = config.generation.to_params();
    let run = config.run_params();

    let query = QueryModelsUseCase::new(gateway.clone())
        .with_generation_params(generation)
        .with_run_params(run.clone())
        .with_cancellation(cancellation.clone())
        .with_conversation_logger(logger.clone());

    let consensus = RunConsensusUseCase::new(gateway.clone())
        .with_template(load_consensus_template(config.prompts.consensus.as_deref())?)
        .with_generation_params(generation)
        .with_run_params(run.clone())
        .with_cancellation(cancellation.clone())
        .with_conversation_logger(logger.clone());

    let mut conversion = ConvertAnalyticsUseCase::new(gateway)
        .with_generation_params(generation)
        .with_run_params(run)
        .with_cancellation(cancellation)
        .with_conversation_logger(logger);
    if let Some(template) = load_conversion_template(config.prompts.conversion.as_deref())? {
        conversion = conversion.with_standard_template(template);
    }

    let pipeline = RunPipelineUseCase::new(query, consensus, conversion);

    let mut input = RunPipelineInput::new(
        prompt.clone(),
        models.clone(),
        consensus_model,
        conversion_model,
    );
    if args.skip_analytics {
        input = input.without_analytics();
    }

    if output.format != OutputFormat::Json {
        println!("{}", ConsoleFormatter::format_header(prompt.content(), &models));
    }

    let progress: Box<dyn QueryProgressNotifier> = if output.show_progress {
        Box::new(ProgressReporter::new().with_responses(output.format == OutputFormat::Full))
    } else if output.format == OutputFormat::Full {
        Box::new(SimpleProgress)
    } else {
        Box::new(NoProgress)
    };
    let presenter = ConsolePresenter::new(output);

    match pipeline.execute(input, progress.as_ref(), &presenter).await {
        Ok(session) => {
            if args.skip_analytics
                && output.format == OutputFormat::Json
                && let Some(document) = session.consensus()
            {
                let json = serde_json::json!({
                    "prompt": document.prompt(),
                    "consensus": document.revealed_text(),
                });
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
            Ok(())
        }
        Err(e) => {
            report_pipeline_failure(&e);
            Err(e.into())
        }
    }
}

/// Tell the user what survived a failed run.
fn report_pipeline_failure(error: &PipelineError) {
    if error.is_cancelled() {
        eprintln!("Cancelled.");
    }
    let Some(session) = error.session() else {
        return;
    };

    if let Some(document) = session.consensus() {
        eprintln!(
            "{} of {} consensus sections completed.",
            document.sections().len(),
            ConsensusSection::ALL.len()
        );
    }
    if let Some(raw) = session.conversion_raw() {
        eprintln!(
            "The conversion output could not be scored. Save the text below to a file, \
             fix it, then run `polyllm repair <file>`:\n"
        );
        eprintln!("{}", raw);
    }
}

fn repair(args: RepairArgs, config: &FileConfig, quiet: bool) -> Result<()> {
    report_issues(&config.validate())?;

    let output = OutputConfig::resolve(
        args.output.map(Into::into),
        config.output.format,
        config.output.color,
        quiet,
    );
    output.apply_color();

    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Cannot read {}", args.file.display()))?;
    let outcome = analyze_text(&raw)?;
    if outcome.stage != ExtractionStage::Direct {
        info!("JSON recovered at stage {:?}", outcome.stage);
    }

    let presenter = ConsolePresenter::new(output);
    println!(
        "{}",
        presenter.render_analytics(&outcome.analytics, args.prompt.as_deref().unwrap_or(""))
    );
    Ok(())
}
