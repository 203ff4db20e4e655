use extism_shim_common::Handle;
use thiserror::Error;

/// A primitive call the arena cannot honour.
///
/// Through [`crate::ArenaHost`] these are logged and the guest sees the sentinel, through the
/// wasmer imports they trap the guest.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ArenaError {
    #[error("{len} bytes at address {addr} are outside of the arena")]
    OutOfBounds { addr: u64, len: u64 },

    #[error("{len} bytes at input offset {offset} are outside of the input")]
    InputOutOfBounds { offset: u64, len: u64 },

    #[error("allocating {requested} bytes would grow the arena past {limit} bytes")]
    OutOfMemory { requested: u64, limit: u64 },

    #[error("no block is allocated at handle {0}")]
    UnknownHandle(Handle),

    #[error("invalid utf-8 key: {0}")]
    Key(String),

    #[error("malformed http request: {0}")]
    HttpRequest(String),

    #[error("http requests are not allowed by this host")]
    NoHttpHandler,
}

/// Everything that can go wrong loading or calling a plugin.
#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Arena(#[from] ArenaError),

    #[error("manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[cfg(feature = "wasmer_sys")]
    #[error(transparent)]
    Compile(#[from] wasmer::CompileError),

    #[cfg(feature = "wasmer_sys")]
    #[error(transparent)]
    Instantiate(#[from] Box<wasmer::InstantiationError>),

    #[cfg(feature = "wasmer_sys")]
    #[error(transparent)]
    Export(#[from] wasmer::ExportError),

    #[cfg(feature = "wasmer_sys")]
    #[error(transparent)]
    Runtime(#[from] wasmer::RuntimeError),

    /// the guest reported a failure with `error_set`
    #[error("plugin error: {0}")]
    Guest(String),

    /// the guest returned a non-zero code without setting an error
    #[error("plugin returned exit code {0}")]
    ExitCode(i32),
}
