use thiserror::Error;

/// Everything that can go wrong on the guest side of the boundary.
///
/// Host primitive failures are deliberately absent: the host signals those with sentinels
/// and the caller decides what a zero handle means.
#[derive(Debug, Error)]
pub enum ShimError {
    /// bytes coming back from the host were expected to be utf-8 and weren't
    #[error("invalid utf-8 in host bytes: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("msgpack: {0}")]
    MsgPack(String),

    /// a guest buffer is shorter than the block being copied into it
    #[error("buffer of {buffer} bytes cannot hold a block of {block} bytes")]
    BufferTooSmall { buffer: u64, block: u64 },

    /// more bytes were written to a block than it was allocated with
    #[error("{data} bytes do not fit in a block of {block} bytes")]
    BlockOverflow { data: u64, block: u64 },

    /// a host reported length that does not fit the guest's address space
    #[error("host length {0} does not fit in guest memory")]
    TooLarge(u64),

    #[error("no internal call registered as `{0}`")]
    UnknownCall(String),

    #[error("internal call `{name}` expected {expected}")]
    BadArguments { name: String, expected: &'static str },

    /// application level failure raised by an entry point body
    #[error("{0}")]
    Plugin(String),
}

impl ShimError {
    pub fn plugin(message: impl Into<String>) -> Self {
        ShimError::Plugin(message.into())
    }
}

impl From<holochain_serialized_bytes::SerializedBytesError> for ShimError {
    fn from(e: holochain_serialized_bytes::SerializedBytesError) -> Self {
        ShimError::MsgPack(format!("{:?}", e))
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn plugin_error_displays_bare_message() {
        assert_eq!("oh no!", ShimError::plugin("oh no!").to_string());
    }

    #[test]
    fn utf8_errors_convert() {
        let e: ShimError = String::from_utf8(vec![0xff, 0xfe]).unwrap_err().into();
        assert!(matches!(e, ShimError::Utf8(_)));
    }
}
