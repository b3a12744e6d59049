use thiserror::Error;

/// Errors raised while a source opens or reads from a track.
///
/// `FileNotFound` and `PipelineFailed` are kept distinct so callers that care
/// (e.g. a resolver deciding whether to retry) don't have to string-match
/// `details`.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("local file not found: {0}")]
    FileNotFound(String),

    #[error("pipeline failed: {child} exited with {code}")]
    PipelineFailed { child: &'static str, code: i32 },

    #[error("decoder process error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while a sink forwards bytes downstream.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("write to downstream failed: {0}")]
    Write(#[from] std::io::Error),

    #[error("sink is closed")]
    Closed,
}

/// Errors a resolver raises that are *not* swallowed into an empty result.
///
/// Fetcher failures and cache misses are not errors — they produce an empty
/// track list and a logged warning. This
/// type exists for resolver-internal programming errors (a malformed cache
/// key, a resolver misconfigured with no fetcher path) that should surface.
#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("resolver misconfigured: {0}")]
    Misconfigured(String),
}

/// Errors a cache backend may raise; always caught at the call site, logged,
/// and treated as a cache miss/no-op.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),
}

/// Fatal configuration errors that prevent startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required path is empty: {0}")]
    EmptyPath(&'static str),

    #[error("failed to load configuration: {0}")]
    Load(#[from] figment::Error),
}

/// Umbrella error for code that needs to return any of the above through one
/// type (mainly test helpers and glue code, not the component APIs
/// themselves, which each use their own narrow error type).
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Sink(#[from] SinkError),
    #[error(transparent)]
    Resolver(#[from] ResolverError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
