//! Raw imports of the host primitives and the zero sized host that calls them.
//!
//! Both protocol families are declared from one macro so that there is a single binding table,
//! the `legacy_env` feature only changes the module and name prefix it is expanded with.
//! Must stay in sync with [`extism_shim_common::HostFn::base_name`].
#[cfg(target_arch = "wasm32")]
use extism_shim_common::prelude::*;

#[cfg(target_arch = "wasm32")]
macro_rules! host_imports {
    ( $module:literal, $prefix:literal ) => {
        #[link(wasm_import_module = $module)]
        extern "C" {
            #[link_name = concat!($prefix, "input_length")]
            pub fn input_length() -> u64;
            #[link_name = concat!($prefix, "length")]
            pub fn length(handle: u64) -> u64;
            #[link_name = concat!($prefix, "alloc")]
            pub fn alloc(size: u64) -> u64;
            #[link_name = concat!($prefix, "free")]
            pub fn free(handle: u64);
            #[link_name = concat!($prefix, "load_u8")]
            pub fn load_u8(addr: u64) -> u8;
            #[link_name = concat!($prefix, "load_u64")]
            pub fn load_u64(addr: u64) -> u64;
            #[link_name = concat!($prefix, "store_u8")]
            pub fn store_u8(addr: u64, value: u8);
            #[link_name = concat!($prefix, "store_u64")]
            pub fn store_u64(addr: u64, value: u64);
            #[link_name = concat!($prefix, "input_load_u8")]
            pub fn input_load_u8(offset: u64) -> u8;
            #[link_name = concat!($prefix, "input_load_u64")]
            pub fn input_load_u64(offset: u64) -> u64;
            #[link_name = concat!($prefix, "output_set")]
            pub fn output_set(handle: u64, length: u64);
            #[link_name = concat!($prefix, "error_set")]
            pub fn error_set(handle: u64);
            #[link_name = concat!($prefix, "config_get")]
            pub fn config_get(key: u64) -> u64;
            #[link_name = concat!($prefix, "var_get")]
            pub fn var_get(key: u64) -> u64;
            #[link_name = concat!($prefix, "var_set")]
            pub fn var_set(key: u64, value: u64);
            #[link_name = concat!($prefix, "http_request")]
            pub fn http_request(request: u64, body: u64) -> u64;
            #[link_name = concat!($prefix, "http_status_code")]
            pub fn http_status_code() -> i32;
            #[link_name = concat!($prefix, "log_info")]
            pub fn log_info(message: u64);
            #[link_name = concat!($prefix, "log_debug")]
            pub fn log_debug(message: u64);
            #[link_name = concat!($prefix, "log_warn")]
            pub fn log_warn(message: u64);
            #[link_name = concat!($prefix, "log_error")]
            pub fn log_error(message: u64);
        }
    };
}

#[cfg(all(target_arch = "wasm32", feature = "legacy_env"))]
mod raw {
    host_imports!("env", "extism_");
}

#[cfg(all(target_arch = "wasm32", not(feature = "legacy_env")))]
mod raw {
    host_imports!("extism:host/env", "");
}

/// The host this guest was instantiated by, reached through wasm imports.
#[cfg(target_arch = "wasm32")]
#[derive(Clone, Copy, Debug, Default)]
pub struct WasmHost;

// imported host functions are always unsafe to call, the host owns their behaviour
#[cfg(target_arch = "wasm32")]
impl HostPrimitives for WasmHost {
    fn input_length(&self) -> Len {
        unsafe { raw::input_length() }
    }

    fn length(&self, handle: Handle) -> Len {
        unsafe { raw::length(handle) }
    }

    fn alloc(&self, size: Len) -> Handle {
        unsafe { raw::alloc(size) }
    }

    fn free(&self, handle: Handle) {
        unsafe { raw::free(handle) }
    }

    fn load_u8(&self, addr: u64) -> u8 {
        unsafe { raw::load_u8(addr) }
    }

    fn load_u64(&self, addr: u64) -> u64 {
        unsafe { raw::load_u64(addr) }
    }

    fn store_u8(&self, addr: u64, value: u8) {
        unsafe { raw::store_u8(addr, value) }
    }

    fn store_u64(&self, addr: u64, value: u64) {
        unsafe { raw::store_u64(addr, value) }
    }

    fn input_load_u8(&self, offset: u64) -> u8 {
        unsafe { raw::input_load_u8(offset) }
    }

    fn input_load_u64(&self, offset: u64) -> u64 {
        unsafe { raw::input_load_u64(offset) }
    }

    fn output_set(&self, handle: Handle, length: Len) {
        unsafe { raw::output_set(handle, length) }
    }

    fn error_set(&self, handle: Handle) {
        unsafe { raw::error_set(handle) }
    }

    fn config_get(&self, key: Handle) -> Handle {
        unsafe { raw::config_get(key) }
    }

    fn var_get(&self, key: Handle) -> Handle {
        unsafe { raw::var_get(key) }
    }

    fn var_set(&self, key: Handle, value: Handle) {
        unsafe { raw::var_set(key, value) }
    }

    fn http_request(&self, request: Handle, body: Handle) -> Handle {
        unsafe { raw::http_request(request, body) }
    }

    fn http_status_code(&self) -> i32 {
        unsafe { raw::http_status_code() }
    }

    fn log_info(&self, message: Handle) {
        unsafe { raw::log_info(message) }
    }

    fn log_debug(&self, message: Handle) {
        unsafe { raw::log_debug(message) }
    }

    fn log_warn(&self, message: Handle) {
        unsafe { raw::log_warn(message) }
    }

    fn log_error(&self, message: Handle) {
        unsafe { raw::log_error(message) }
    }
}
