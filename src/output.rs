//! Report formatting for the non-interactive subcommands.

use crate::gateway::{
    ApprovalAction, PipelineSnapshot, STATUS_FAILED, STATUS_IN_PROGRESS, STATUS_SUCCEEDED,
};
use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use std::io::Write;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    #[value(name = "jsonl")]
    JsonL,
}

pub fn format_timestamp(timestamp: Option<DateTime<Utc>>) -> String {
    timestamp
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn colored_status(status: &str) -> ColoredString {
    match status {
        STATUS_IN_PROGRESS => status.bright_blue(),
        STATUS_SUCCEEDED => status.bright_green(),
        STATUS_FAILED => status.bright_red(),
        _ => status.yellow(),
    }
}

pub fn format_approval(action: &ApprovalAction, use_color: bool) -> String {
    if use_color {
        format!(
            "{} {} {} {}",
            action.pipeline_name.bright_green(),
            action.stage_name.bright_yellow(),
            action.action_name.bold(),
            "awaiting decision".dimmed()
        )
    } else {
        format!(
            "{} {} {} awaiting decision",
            action.pipeline_name, action.stage_name, action.action_name
        )
    }
}

pub fn format_pipeline(snapshot: &PipelineSnapshot, use_color: bool) -> String {
    let overall = snapshot.overall_status();
    let updated = format_timestamp(snapshot.last_updated());
    let mut text = if use_color {
        format!(
            "{} {} {}",
            snapshot.name.bright_green().bold(),
            colored_status(overall),
            updated.bright_blue()
        )
    } else {
        format!("{} {} {}", snapshot.name, overall, updated)
    };

    for stage in &snapshot.stages {
        let updated = format_timestamp(stage.last_updated);
        let line = if use_color {
            format!(
                "\n  {} {} {}",
                stage.name,
                colored_status(&stage.status),
                updated.dimmed()
            )
        } else {
            format!("\n  {} {} {}", stage.name, stage.status, updated)
        };
        text.push_str(&line);
    }
    text
}

pub fn write_approvals(
    out: &mut impl Write,
    approvals: &[ApprovalAction],
    format: OutputFormat,
    use_color: bool,
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            if approvals.is_empty() {
                writeln!(out, "No approvals are waiting for a decision.")?;
            } else {
                writeln!(out, "{} pending approvals:\n", approvals.len())?;
                for action in approvals {
                    writeln!(out, "{}", format_approval(action, use_color))?;
                }
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "approvals": approvals,
                "count": approvals.len(),
            });
            serde_json::to_writer_pretty(&mut *out, &output)?;
            writeln!(out)?;
        }
        OutputFormat::JsonL => {
            for action in approvals {
                serde_json::to_writer(&mut *out, action)?;
                writeln!(out)?;
            }
        }
    }
    Ok(())
}

pub fn write_statuses(
    out: &mut impl Write,
    pipelines: &[PipelineSnapshot],
    format: OutputFormat,
    use_color: bool,
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            if pipelines.is_empty() {
                writeln!(out, "No pipelines found.")?;
            } else {
                for snapshot in pipelines {
                    writeln!(out, "{}", format_pipeline(snapshot, use_color))?;
                }
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "pipelines": pipelines
                    .iter()
                    .map(|p| serde_json::json!({
                        "name": p.name,
                        "status": p.overall_status(),
                        "last_updated": p.last_updated(),
                        "stages": p.stages,
                    }))
                    .collect::<Vec<_>>(),
                "count": pipelines.len(),
            });
            serde_json::to_writer_pretty(&mut *out, &output)?;
            writeln!(out)?;
        }
        OutputFormat::JsonL => {
            for snapshot in pipelines {
                serde_json::to_writer(&mut *out, snapshot)?;
                writeln!(out)?;
            }
        }
    }
    Ok(())
}
