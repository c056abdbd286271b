use std::io::Write;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use crate::config::StaticConfigValues;
use crate::global;

#[derive(Parser, Debug)]
#[command(
    name = "staticcfg",
    version,
    about = "Inspect static configuration flags",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Print the effective configuration (framework defaults + SCFG_* env)
    Show {
        /// Print one JSON object instead of text
        #[arg(long)]
        json: bool,
        /// Ignore SCFG_* env variables
        #[arg(long)]
        no_env: bool,
    },
    /// Print framework defaults
    Defaults {
        #[arg(long)]
        json: bool,
    },
    /// List fields the environment changes relative to the defaults
    Diff,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    run_cmd(cli.cmd, &mut std::io::stdout().lock())
}

/// Execute one command, writing its output to `out`.
pub fn run_cmd(cmd: Cmd, out: &mut impl Write) -> Result<()> {
    match cmd {
        Cmd::Show { json, no_env } => {
            if no_env {
                global::reset();
            } else {
                let applied = global::init_from_env();
                info!("applied env configuration: {}", applied);
            }
            print_values(out, &global::snapshot(), json)
        }
        Cmd::Defaults { json } => print_values(out, &StaticConfigValues::framework_defaults(), json),
        Cmd::Diff => {
            let changed = StaticConfigValues::from_env().diff(&StaticConfigValues::framework_defaults());
            if changed.is_empty() {
                writeln!(out, "no overrides")?;
            }
            for name in changed {
                writeln!(out, "{}", name)?;
            }
            Ok(())
        }
    }
}

fn print_values(out: &mut impl Write, v: &StaticConfigValues, json: bool) -> Result<()> {
    if json {
        let s = v.to_json_pretty().context("serialize configuration")?;
        writeln!(out, "{}", s)?;
        return Ok(());
    }
    writeln!(out, "case_sensitive                       = {}", v.case_sensitive)?;
    writeln!(out, "disable_error_traces                 = {}", v.disable_error_traces)?;
    writeln!(
        out,
        "disable_method_not_allowed_responses = {}",
        v.disable_method_not_allowed_responses
    )?;
    writeln!(out, "enable_head_routing                  = {}", v.enable_head_routing)?;
    writeln!(out, "enable_request_tracing               = {}", v.enable_request_tracing)?;
    writeln!(
        out,
        "request_query_form_multipart_limit   = {}",
        v.request_query_form_multipart_limit
    )?;
    Ok(())
}
