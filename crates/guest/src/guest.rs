pub extern crate holochain_serialized_bytes;

pub mod bridge;
pub mod export;
pub mod imports;
pub mod pdk;
pub mod runtime;

pub use extism_shim_common::*;

pub use bridge::Arg;
pub use bridge::CallRegistry;
pub use bridge::Ret;
pub use export::run_export;
#[cfg(target_arch = "wasm32")]
pub use imports::WasmHost;
pub use pdk::Pdk;
pub use runtime::initialize;
pub use runtime::RuntimeGuard;
pub use runtime::RUNTIME;

/// the import family this build links against
#[cfg(feature = "legacy_env")]
pub const NAMESPACE: ImportNamespace = ImportNamespace::Legacy;
#[cfg(not(feature = "legacy_env"))]
pub const NAMESPACE: ImportNamespace = ImportNamespace::HostEnv;

pub mod prelude {
    pub use crate::bridge::Arg;
    pub use crate::bridge::CallRegistry;
    pub use crate::bridge::Ret;
    pub use crate::export::run_export;
    #[cfg(target_arch = "wasm32")]
    pub use crate::imports::WasmHost;
    pub use crate::pdk::Pdk;
    pub use crate::plugin_fn;
    pub use crate::runtime::RUNTIME;
    pub use extism_shim_common::prelude::*;
}
