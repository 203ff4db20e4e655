pub mod abi;
pub mod block;
pub mod buffer;
pub mod error;
pub mod http;
pub mod log;
pub mod primitives;
pub mod transfer;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use abi::HostFn;
pub use abi::ImportNamespace;
pub use block::MemoryBlock;
pub use buffer::WordBuffer;
pub use error::ShimError;
pub use http::HttpRequest;
pub use http::HttpResponse;
pub use log::LogLevel;
pub use primitives::HostPrimitives;

/// opaque identifier for a host managed memory region
///
/// handles are never process addresses, they only mean something when passed back to the host.
/// this workspace uses the flat address convention: a handle is the base address of its region
/// in the host arena and the host accepts `handle + offset` as a single already summed address.
///
/// zero is the host's sentinel for "no handle" (e.g. a missing config key).
pub type Handle = u64;

/// lengths and offsets cross the boundary as u64 regardless of the guest's pointer width
pub type Len = u64;

/// number of bytes moved by a single word sized primitive call
pub const WORD_BYTES: usize = std::mem::size_of::<u64>();

pub mod prelude {
    pub use crate::block::MemoryBlock;
    pub use crate::buffer::WordBuffer;
    pub use crate::error::ShimError;
    pub use crate::http::HttpRequest;
    pub use crate::http::HttpResponse;
    pub use crate::log::LogLevel;
    pub use crate::primitives::HostPrimitives;
    pub use crate::transfer;
    pub use crate::Handle;
    pub use crate::Len;
}
