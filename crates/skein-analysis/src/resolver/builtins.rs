//! Node.js builtin module detection.

/// Builtin module names, sorted for binary search. Subpath builtins that
/// ship with Node (`fs/promises` and friends) are listed explicitly.
pub const NODE_BUILTINS: &[&str] = &[
    "assert",
    "assert/strict",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "dns/promises",
    "domain",
    "events",
    "fs",
    "fs/promises",
    "http",
    "http2",
    "https",
    "inspector",
    "inspector/promises",
    "module",
    "net",
    "os",
    "path",
    "path/posix",
    "path/win32",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "readline/promises",
    "repl",
    "stream",
    "stream/consumers",
    "stream/promises",
    "stream/web",
    "string_decoder",
    "timers",
    "timers/promises",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "util/types",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// Return the bare builtin name when `specifier` (with or without the
/// `node:` prefix) names a builtin module.
pub fn builtin_name<'a>(specifier: &'a str, extra: &'a [String]) -> Option<&'a str> {
    let bare = specifier.strip_prefix("node:").unwrap_or(specifier);
    if NODE_BUILTINS.binary_search(&bare).is_ok() {
        return Some(bare);
    }
    extra.iter().find(|e| e.as_str() == bare).map(|e| e.as_str())
}
