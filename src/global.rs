//! Process-wide static configuration store.
//!
//! One atomic per field (Relaxed). Reads/writes of a single field
//! never race; a multi-field `apply` is not atomic for other threads. Tests that
//! need a consistent view go through `context::StaticConfigContext`, which
//! serializes scopes across threads.
//!
//! Initial values are the framework defaults (see `consts`).

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use log::debug;

use crate::config::StaticConfigValues;
use crate::consts::*;

static CASE_SENSITIVE: AtomicBool = AtomicBool::new(DEFAULT_CASE_SENSITIVE);
static DISABLE_ERROR_TRACES: AtomicBool = AtomicBool::new(DEFAULT_DISABLE_ERROR_TRACES);
static DISABLE_METHOD_NOT_ALLOWED: AtomicBool =
    AtomicBool::new(DEFAULT_DISABLE_METHOD_NOT_ALLOWED);
static ENABLE_HEAD_ROUTING: AtomicBool = AtomicBool::new(DEFAULT_ENABLE_HEAD_ROUTING);
static ENABLE_REQUEST_TRACING: AtomicBool = AtomicBool::new(DEFAULT_ENABLE_REQUEST_TRACING);
static MULTIPART_LIMIT: AtomicI32 = AtomicI32::new(DEFAULT_MULTIPART_LIMIT);

// ----- Getters -----
pub fn case_sensitive() -> bool {
    CASE_SENSITIVE.load(Ordering::Relaxed)
}
pub fn disable_error_traces() -> bool {
    DISABLE_ERROR_TRACES.load(Ordering::Relaxed)
}
pub fn disable_method_not_allowed_responses() -> bool {
    DISABLE_METHOD_NOT_ALLOWED.load(Ordering::Relaxed)
}
pub fn enable_head_routing() -> bool {
    ENABLE_HEAD_ROUTING.load(Ordering::Relaxed)
}
pub fn enable_request_tracing() -> bool {
    ENABLE_REQUEST_TRACING.load(Ordering::Relaxed)
}
pub fn request_query_form_multipart_limit() -> i32 {
    MULTIPART_LIMIT.load(Ordering::Relaxed)
}

// ----- Setters -----
pub fn set_case_sensitive(on: bool) {
    CASE_SENSITIVE.store(on, Ordering::Relaxed);
}
pub fn set_disable_error_traces(on: bool) {
    DISABLE_ERROR_TRACES.store(on, Ordering::Relaxed);
}
pub fn set_disable_method_not_allowed_responses(on: bool) {
    DISABLE_METHOD_NOT_ALLOWED.store(on, Ordering::Relaxed);
}
pub fn set_enable_head_routing(on: bool) {
    ENABLE_HEAD_ROUTING.store(on, Ordering::Relaxed);
}
pub fn set_enable_request_tracing(on: bool) {
    ENABLE_REQUEST_TRACING.store(on, Ordering::Relaxed);
}
pub fn set_request_query_form_multipart_limit(limit: i32) {
    MULTIPART_LIMIT.store(limit, Ordering::Relaxed);
}

// ----- Snapshot / Apply / Reset -----

/// Capture all six fields.
pub fn snapshot() -> StaticConfigValues {
    StaticConfigValues {
        case_sensitive: case_sensitive(),
        disable_error_traces: disable_error_traces(),
        disable_method_not_allowed_responses: disable_method_not_allowed_responses(),
        enable_head_routing: enable_head_routing(),
        enable_request_tracing: enable_request_tracing(),
        request_query_form_multipart_limit: request_query_form_multipart_limit(),
    }
}

/// Overwrite all six fields (no merging).
pub fn apply(values: &StaticConfigValues) {
    set_case_sensitive(values.case_sensitive);
    set_disable_error_traces(values.disable_error_traces);
    set_disable_method_not_allowed_responses(values.disable_method_not_allowed_responses);
    set_enable_head_routing(values.enable_head_routing);
    set_enable_request_tracing(values.enable_request_tracing);
    set_request_query_form_multipart_limit(values.request_query_form_multipart_limit);
}

/// Back to framework defaults.
pub fn reset() {
    apply(&StaticConfigValues::framework_defaults());
}

/// Apply `StaticConfigValues::from_env()` and return what was applied.
pub fn init_from_env() -> StaticConfigValues {
    let values = StaticConfigValues::from_env();
    let changed = values.diff(&snapshot());
    if !changed.is_empty() {
        debug!("init_from_env: changed {:?}", changed);
    }
    apply(&values);
    values
}
