pub mod arena;
pub mod error;
pub mod host;
pub mod manifest;

#[cfg(feature = "wasmer_sys")]
pub mod env;
#[cfg(feature = "wasmer_sys")]
pub mod import;
#[cfg(feature = "wasmer_sys")]
pub mod plugin;

pub use arena::CallStats;
pub use arena::HttpHandler;
pub use arena::MemoryArena;
pub use error::ArenaError;
pub use error::HostError;
pub use host::ArenaHost;
pub use manifest::Manifest;

#[cfg(feature = "wasmer_sys")]
pub use plugin::Plugin;

pub mod prelude {
    pub use crate::arena::CallStats;
    pub use crate::arena::MemoryArena;
    pub use crate::error::ArenaError;
    pub use crate::error::HostError;
    pub use crate::host::ArenaHost;
    pub use crate::manifest::Manifest;
    #[cfg(feature = "wasmer_sys")]
    pub use crate::plugin::Plugin;
    pub use extism_shim_common::prelude::*;
    pub use extism_shim_common::HostFn;
    pub use extism_shim_common::ImportNamespace;
}
