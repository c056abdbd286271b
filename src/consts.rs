//! Env variable names and framework default values.

// ----- ENV -----
pub const ENV_CASE_SENSITIVE: &str = "SCFG_CASE_SENSITIVE";
pub const ENV_DISABLE_ERROR_TRACES: &str = "SCFG_DISABLE_ERROR_TRACES";
pub const ENV_DISABLE_METHOD_NOT_ALLOWED: &str = "SCFG_DISABLE_METHOD_NOT_ALLOWED";
pub const ENV_ENABLE_HEAD_ROUTING: &str = "SCFG_ENABLE_HEAD_ROUTING";
pub const ENV_ENABLE_REQUEST_TRACING: &str = "SCFG_ENABLE_REQUEST_TRACING";
pub const ENV_MULTIPART_LIMIT: &str = "SCFG_MULTIPART_LIMIT";

/// All env variables read by `StaticConfigValues::from_env`, in field order.
pub const ALL_ENV_VARS: [&str; 6] = [
    ENV_CASE_SENSITIVE,
    ENV_DISABLE_ERROR_TRACES,
    ENV_DISABLE_METHOD_NOT_ALLOWED,
    ENV_ENABLE_HEAD_ROUTING,
    ENV_ENABLE_REQUEST_TRACING,
    ENV_MULTIPART_LIMIT,
];

// ----- Framework defaults (values at process start) -----
pub const DEFAULT_CASE_SENSITIVE: bool = false;
// error traces stay hidden until explicitly enabled
pub const DEFAULT_DISABLE_ERROR_TRACES: bool = true;
pub const DEFAULT_DISABLE_METHOD_NOT_ALLOWED: bool = false;
pub const DEFAULT_ENABLE_HEAD_ROUTING: bool = false;
pub const DEFAULT_ENABLE_REQUEST_TRACING: bool = false;
/// Max number of query/form/multipart parameters accepted per request.
pub const DEFAULT_MULTIPART_LIMIT: i32 = 1000;
