use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::Result;
use clap::Parser;

use staticcfg::cli::{run_cmd, Cli, Cmd};
use staticcfg::consts::ALL_ENV_VARS;
use staticcfg::{global, StaticConfigContext, StaticConfigValues};

// SCFG_* variables are process-wide; tests that read or write them take this lock.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn env_lock() -> MutexGuard<'static, ()> {
    let guard = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    for key in ALL_ENV_VARS {
        std::env::remove_var(key);
    }
    guard
}

fn run_to_string(cmd: Cmd) -> Result<String> {
    let mut out = Vec::new();
    run_cmd(cmd, &mut out)?;
    Ok(String::from_utf8(out)?)
}

#[test]
fn parses_subcommands() {
    let cli = Cli::try_parse_from(["staticcfg", "show", "--json", "--no-env"]).unwrap();
    assert!(matches!(cli.cmd, Cmd::Show { json: true, no_env: true }));

    let cli = Cli::try_parse_from(["staticcfg", "defaults"]).unwrap();
    assert!(matches!(cli.cmd, Cmd::Defaults { json: false }));

    assert!(Cli::try_parse_from(["staticcfg", "bogus"]).is_err());
}

#[test]
fn defaults_json_roundtrips() -> Result<()> {
    let s = run_to_string(Cmd::Defaults { json: true })?;
    let v: StaticConfigValues = serde_json::from_str(&s)?;
    assert_eq!(v, StaticConfigValues::framework_defaults());
    Ok(())
}

#[test]
fn show_without_env_resets_and_prints_text() -> Result<()> {
    let outer = StaticConfigContext::open(|c| c.case_sensitive = true);

    let s = run_to_string(Cmd::Show { json: false, no_env: true })?;
    assert_eq!(global::snapshot(), StaticConfigValues::framework_defaults());
    assert!(s.contains("case_sensitive                       = false"), "{s}");
    assert!(s.contains("request_query_form_multipart_limit   = 1000"), "{s}");
    assert_eq!(s.lines().count(), 6);

    outer.close();
    Ok(())
}

#[test]
fn diff_reports_env_overrides() -> Result<()> {
    let _env = env_lock();
    assert_eq!(run_to_string(Cmd::Diff)?, "no overrides\n");

    std::env::set_var("SCFG_ENABLE_HEAD_ROUTING", "1");
    let s = run_to_string(Cmd::Diff);
    std::env::remove_var("SCFG_ENABLE_HEAD_ROUTING");
    assert_eq!(s?, "enable_head_routing\n");
    Ok(())
}

#[test]
fn show_applies_env_to_global_store() -> Result<()> {
    let _env = env_lock();
    let outer = StaticConfigContext::with_values(StaticConfigValues::zeroed());

    std::env::set_var("SCFG_CASE_SENSITIVE", "yes");
    let s = run_to_string(Cmd::Show { json: false, no_env: false });
    std::env::remove_var("SCFG_CASE_SENSITIVE");
    let s = s?;

    assert!(s.contains("case_sensitive                       = true"), "{s}");
    assert!(s.contains("disable_error_traces                 = true"), "{s}");
    assert!(s.contains("request_query_form_multipart_limit   = 1000"), "{s}");
    assert_eq!(
        global::snapshot(),
        StaticConfigValues::framework_defaults().with_case_sensitive(true)
    );

    outer.close();
    Ok(())
}
