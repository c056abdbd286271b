//! Value bag for the static (process-wide) configuration flags.
//!
//! `StaticConfigValues` is a plain copyable value:
//! - `Default` is the all-zero bag (what an override callback starts from).
//! - `framework_defaults()` is what the global store holds at process start.
//! - `from_env()` = framework defaults + SCFG_* env overrides.
//!
//! Code that does not want to depend on globals can take a `StaticConfigValues`
//! by parameter; `global::snapshot()` produces one.

use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::consts::*;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StaticConfigValues {
    /// Route matching is case sensitive.
    /// Env: SCFG_CASE_SENSITIVE (default false)
    pub case_sensitive: bool,

    /// Hide error traces from error responses.
    /// Env: SCFG_DISABLE_ERROR_TRACES (default true)
    pub disable_error_traces: bool,

    /// Answer with 404 instead of 405 when only the method does not match.
    /// Env: SCFG_DISABLE_METHOD_NOT_ALLOWED (default false)
    pub disable_method_not_allowed_responses: bool,

    /// Route HEAD requests explicitly instead of falling back to GET.
    /// Env: SCFG_ENABLE_HEAD_ROUTING (default false)
    pub enable_head_routing: bool,

    /// Keep per-request diagnostic traces.
    /// Env: SCFG_ENABLE_REQUEST_TRACING (default false)
    pub enable_request_tracing: bool,

    /// Max number of query/form/multipart parameters per request.
    /// Env: SCFG_MULTIPART_LIMIT (default 1000)
    pub request_query_form_multipart_limit: i32,
}

impl StaticConfigValues {
    /// Field names in declaration order (same names as the JSON keys).
    pub const FIELD_NAMES: [&'static str; 6] = [
        "case_sensitive",
        "disable_error_traces",
        "disable_method_not_allowed_responses",
        "enable_head_routing",
        "enable_request_tracing",
        "request_query_form_multipart_limit",
    ];

    /// Blank bag: every flag false, limit 0.
    pub fn zeroed() -> Self {
        Self::default()
    }

    pub fn framework_defaults() -> Self {
        Self {
            case_sensitive: DEFAULT_CASE_SENSITIVE,
            disable_error_traces: DEFAULT_DISABLE_ERROR_TRACES,
            disable_method_not_allowed_responses: DEFAULT_DISABLE_METHOD_NOT_ALLOWED,
            enable_head_routing: DEFAULT_ENABLE_HEAD_ROUTING,
            enable_request_tracing: DEFAULT_ENABLE_REQUEST_TRACING,
            request_query_form_multipart_limit: DEFAULT_MULTIPART_LIMIT,
        }
    }

    /// Framework defaults overridden by SCFG_* env variables.
    /// Malformed values are logged and ignored.
    pub fn from_env() -> Self {
        Self::framework_defaults().overlay_env()
    }

    /// Apply SCFG_* env variables on top of `self`.
    pub fn overlay_env(mut self) -> Self {
        env_bool(ENV_CASE_SENSITIVE, &mut self.case_sensitive);
        env_bool(ENV_DISABLE_ERROR_TRACES, &mut self.disable_error_traces);
        env_bool(
            ENV_DISABLE_METHOD_NOT_ALLOWED,
            &mut self.disable_method_not_allowed_responses,
        );
        env_bool(ENV_ENABLE_HEAD_ROUTING, &mut self.enable_head_routing);
        env_bool(ENV_ENABLE_REQUEST_TRACING, &mut self.enable_request_tracing);

        if let Ok(v) = std::env::var(ENV_MULTIPART_LIMIT) {
            match v.trim().parse::<i32>() {
                Ok(n) => self.request_query_form_multipart_limit = n,
                Err(e) => warn!("{}: ignoring value {:?}: {}", ENV_MULTIPART_LIMIT, v, e),
            }
        }

        self
    }

    // Fluent setters (builder-style).

    pub fn with_case_sensitive(mut self, on: bool) -> Self {
        self.case_sensitive = on;
        self
    }

    pub fn with_disable_error_traces(mut self, on: bool) -> Self {
        self.disable_error_traces = on;
        self
    }

    pub fn with_disable_method_not_allowed_responses(mut self, on: bool) -> Self {
        self.disable_method_not_allowed_responses = on;
        self
    }

    pub fn with_enable_head_routing(mut self, on: bool) -> Self {
        self.enable_head_routing = on;
        self
    }

    pub fn with_enable_request_tracing(mut self, on: bool) -> Self {
        self.enable_request_tracing = on;
        self
    }

    pub fn with_request_query_form_multipart_limit(mut self, limit: i32) -> Self {
        self.request_query_form_multipart_limit = limit;
        self
    }

    /// Finish the builder and obtain the values.
    pub fn build(self) -> Self {
        self
    }

    /// Names of the fields whose values differ between `self` and `other`.
    pub fn diff(&self, other: &StaticConfigValues) -> Vec<&'static str> {
        let flags = [
            self.case_sensitive != other.case_sensitive,
            self.disable_error_traces != other.disable_error_traces,
            self.disable_method_not_allowed_responses != other.disable_method_not_allowed_responses,
            self.enable_head_routing != other.enable_head_routing,
            self.enable_request_tracing != other.enable_request_tracing,
            self.request_query_form_multipart_limit != other.request_query_form_multipart_limit,
        ];
        Self::FIELD_NAMES
            .iter()
            .zip(flags)
            .filter_map(|(name, changed)| changed.then_some(*name))
            .collect()
    }

    pub fn to_json_pretty(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// "1|true|on|yes" => true, "0|false|off|no" => false, anything else is ignored.
pub fn parse_bool_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

fn env_bool(name: &str, slot: &mut bool) {
    if let Ok(v) = std::env::var(name) {
        match parse_bool_flag(&v) {
            Some(b) => *slot = b,
            None => warn!("{}: ignoring non-boolean value {:?}", name, v),
        }
    }
}

impl fmt::Display for StaticConfigValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StaticConfigValues {{ \
             case_sensitive: {}, \
             disable_error_traces: {}, \
             disable_method_not_allowed_responses: {}, \
             enable_head_routing: {}, \
             enable_request_tracing: {}, \
             request_query_form_multipart_limit: {} \
             }}",
            self.case_sensitive,
            self.disable_error_traces,
            self.disable_method_not_allowed_responses,
            self.enable_head_routing,
            self.enable_request_tracing,
            self.request_query_form_multipart_limit,
        )
    }
}
