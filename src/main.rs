use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use pipedeck::catalog::{
    ManualApprovalOperation, OperationOutput, OperationRequest, PipelineStatusOperation,
    UiOperation,
};
use pipedeck::config::{DEFAULT_PROFILE, GatewayConfig};
use pipedeck::gateway::aws_cli::DEFAULT_AWS_CLI;
use pipedeck::logging::{LogTarget, init_tracing};
use pipedeck::output::{OutputFormat, write_approvals, write_statuses};
use pipedeck::{
    AwsCliGateway, Catalog, InteractiveSession, available_regions, list_available_profiles,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "pipedeck",
    version,
    about = "Terminal navigator for reviewing and acting on cloud delivery pipelines",
    long_about = None
)]
struct Cli {
    /// Path or name of the AWS CLI executable
    #[arg(long, global = true, env = "PIPEDECK_AWS_CLI", default_value = DEFAULT_AWS_CLI)]
    aws_cli: String,

    /// Append logs to this file (the navigator logs nowhere otherwise)
    #[arg(long, global = true, env = "PIPEDECK_LOG_FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List manual approvals waiting for a decision
    Approvals(ReportArgs),
    /// Show the stage status of every pipeline
    Status(ReportArgs),
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
struct ReportArgs {
    /// AWS profile to use
    #[arg(short, long, env = "AWS_PROFILE", default_value = DEFAULT_PROFILE)]
    profile: String,

    /// AWS region, e.g. us-east-1
    #[arg(short, long, env = "AWS_REGION")]
    region: String,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            let target = match cli.log_file {
                Some(path) => LogTarget::File(path),
                None => LogTarget::Disabled,
            };
            init_tracing(target)?;
            run_interactive(&cli.aws_cli)
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "pipedeck", &mut io::stdout());
            Ok(())
        }
        Some(Commands::Approvals(args)) => {
            init_tracing(report_log_target(cli.log_file))?;
            run_report(
                &cli.aws_cli,
                &args,
                &ManualApprovalOperation,
                OperationRequest::ListApprovals,
            )
        }
        Some(Commands::Status(args)) => {
            init_tracing(report_log_target(cli.log_file))?;
            run_report(
                &cli.aws_cli,
                &args,
                &PipelineStatusOperation,
                OperationRequest::ListPipelines,
            )
        }
    }
}

fn report_log_target(log_file: Option<PathBuf>) -> LogTarget {
    log_file.map(LogTarget::File).unwrap_or(LogTarget::Stderr)
}

fn run_interactive(aws_cli: &str) -> Result<()> {
    let profiles = list_available_profiles().unwrap_or_else(|err| {
        tracing::warn!(error = %format!("{err:#}"), "could not read AWS profiles");
        Vec::new()
    });
    tracing::debug!(count = profiles.len(), "profiles discovered");

    let session = InteractiveSession::new(
        Arc::new(Catalog::builtin()),
        Arc::new(AwsCliGateway::new(aws_cli)),
        profiles,
        available_regions(),
    );
    session.run()
}

fn run_report(
    aws_cli: &str,
    args: &ReportArgs,
    operation: &dyn UiOperation,
    request: OperationRequest,
) -> Result<()> {
    let config = GatewayConfig::new(Some(&args.profile), Some(&args.region))?;
    let gateway = AwsCliGateway::new(aws_cli);
    let output = operation.execute(&gateway, &config, &request)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let use_color = !args.no_color;

    match output {
        OperationOutput::Approvals(approvals) => {
            write_approvals(&mut handle, &approvals, args.format, use_color)
        }
        OperationOutput::Pipelines(pipelines) => {
            write_statuses(&mut handle, &pipelines, args.format, use_color)
        }
        other => anyhow::bail!("unexpected report output: {other:?}"),
    }
}
