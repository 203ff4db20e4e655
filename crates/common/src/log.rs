use crate::primitives::HostPrimitives;
use crate::Handle;
use serde::Deserialize;
use serde::Serialize;

/// The four severities the host accepts guest log lines at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// hand a message handle to the host primitive for this severity
    pub fn send<H: HostPrimitives + ?Sized>(&self, host: &H, message: Handle) {
        match self {
            LogLevel::Debug => host.log_debug(message),
            LogLevel::Info => host.log_info(message),
            LogLevel::Warn => host.log_warn(message),
            LogLevel::Error => host.log_error(message),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        write!(f, "{}", s)
    }
}
