use crate::arena::CallStats;
use crate::arena::MemoryArena;
use crate::error::ArenaError;
use extism_shim_common::prelude::*;
use extism_shim_common::HostFn;
use parking_lot::Mutex;
use parking_lot::MutexGuard;
use std::sync::Arc;

/// A shared handle to a [`MemoryArena`] that guest code can call into directly.
///
/// Primitives have no error channel, so a failing call is logged and the guest gets the zero
/// sentinel (or nothing happens for primitives without a return value).
#[derive(Clone, Default)]
pub struct ArenaHost(Arc<Mutex<MemoryArena>>);

impl std::fmt::Debug for ArenaHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ArenaHost").field(&*self.0.lock()).finish()
    }
}

impl From<MemoryArena> for ArenaHost {
    fn from(arena: MemoryArena) -> Self {
        Self(Arc::new(Mutex::new(arena)))
    }
}

impl ArenaHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Must not be held across a call into the guest.
    pub fn lock(&self) -> MutexGuard<'_, MemoryArena> {
        self.0.lock()
    }

    pub fn set_input(&self, input: Vec<u8>) {
        self.lock().set_input(input)
    }

    pub fn output(&self) -> Option<Vec<u8>> {
        self.lock().output().map(<[u8]>::to_vec)
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error().map(str::to_string)
    }

    pub fn set_config(&self, key: impl Into<String>, value: impl Into<String>) {
        self.lock().set_config(key, value)
    }

    pub fn var(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().var(key).map(<[u8]>::to_vec)
    }

    pub fn set_http_handler<F>(&self, handler: F)
    where
        F: FnMut(&HttpRequest, &[u8]) -> (u16, Vec<u8>) + Send + 'static,
    {
        self.lock().set_http_handler(handler)
    }

    pub fn logs(&self) -> Vec<(LogLevel, String)> {
        self.lock().logs().to_vec()
    }

    pub fn live_blocks(&self) -> usize {
        self.lock().live_blocks()
    }

    pub fn stats(&self) -> CallStats {
        self.lock().stats()
    }

    pub fn reset_stats(&self) {
        self.lock().reset_stats()
    }
}

fn or_sentinel<T: Default>(f: HostFn, result: Result<T, ArenaError>) -> T {
    result.unwrap_or_else(|e| {
        tracing::error!(primitive = f.base_name(), error = %e);
        T::default()
    })
}

impl HostPrimitives for ArenaHost {
    fn input_length(&self) -> Len {
        self.lock().input_length()
    }

    fn length(&self, handle: Handle) -> Len {
        self.lock().length(handle)
    }

    fn alloc(&self, size: Len) -> Handle {
        or_sentinel(HostFn::Alloc, self.lock().alloc(size))
    }

    fn free(&self, handle: Handle) {
        self.lock().free(handle)
    }

    fn load_u8(&self, addr: u64) -> u8 {
        or_sentinel(HostFn::LoadU8, self.lock().load_u8(addr))
    }

    fn load_u64(&self, addr: u64) -> u64 {
        or_sentinel(HostFn::LoadU64, self.lock().load_u64(addr))
    }

    fn store_u8(&self, addr: u64, value: u8) {
        or_sentinel(HostFn::StoreU8, self.lock().store_u8(addr, value))
    }

    fn store_u64(&self, addr: u64, value: u64) {
        or_sentinel(HostFn::StoreU64, self.lock().store_u64(addr, value))
    }

    fn input_load_u8(&self, offset: u64) -> u8 {
        or_sentinel(HostFn::InputLoadU8, self.lock().input_load_u8(offset))
    }

    fn input_load_u64(&self, offset: u64) -> u64 {
        or_sentinel(HostFn::InputLoadU64, self.lock().input_load_u64(offset))
    }

    fn output_set(&self, handle: Handle, length: Len) {
        or_sentinel(HostFn::OutputSet, self.lock().output_set(handle, length))
    }

    fn error_set(&self, handle: Handle) {
        or_sentinel(HostFn::ErrorSet, self.lock().error_set(handle))
    }

    fn config_get(&self, key: Handle) -> Handle {
        or_sentinel(HostFn::ConfigGet, self.lock().config_get(key))
    }

    fn var_get(&self, key: Handle) -> Handle {
        or_sentinel(HostFn::VarGet, self.lock().var_get(key))
    }

    fn var_set(&self, key: Handle, value: Handle) {
        or_sentinel(HostFn::VarSet, self.lock().var_set(key, value))
    }

    fn http_request(&self, request: Handle, body: Handle) -> Handle {
        or_sentinel(HostFn::HttpRequest, self.lock().http_request(request, body))
    }

    fn http_status_code(&self) -> i32 {
        self.lock().http_status_code()
    }

    fn log_info(&self, message: Handle) {
        or_sentinel(HostFn::LogInfo, self.lock().log(LogLevel::Info, message))
    }

    fn log_debug(&self, message: Handle) {
        or_sentinel(HostFn::LogDebug, self.lock().log(LogLevel::Debug, message))
    }

    fn log_warn(&self, message: Handle) {
        or_sentinel(HostFn::LogWarn, self.lock().log(LogLevel::Warn, message))
    }

    fn log_error(&self, message: Handle) {
        or_sentinel(HostFn::LogError, self.lock().log(LogLevel::Error, message))
    }
}
