//! The arena exposed as wasm imports.
//!
//! Bytes cross the boundary as i32 (`u32` here) and are truncated back to `u8`. A failing
//! primitive traps the guest with the [`ArenaError`] as the trap's user error.
use crate::arena::MemoryArena;
use crate::env::Env;
use crate::error::ArenaError;
use extism_shim_common::prelude::*;
use extism_shim_common::HostFn;
use extism_shim_common::ImportNamespace;
use wasmer::AsStoreMut;
use wasmer::Function;
use wasmer::FunctionEnv;
use wasmer::FunctionEnvMut;
use wasmer::Imports;
use wasmer::RuntimeError;

fn with_arena<T>(
    env: &FunctionEnvMut<Env>,
    f: HostFn,
    call: impl FnOnce(&mut MemoryArena) -> Result<T, ArenaError>,
) -> Result<T, RuntimeError> {
    let mut arena = env.data().arena.lock();
    call(&mut arena).map_err(|e| {
        tracing::error!(primitive = f.base_name(), error = %e, "trapping guest");
        RuntimeError::user(Box::new(e))
    })
}

pub fn input_length(env: FunctionEnvMut<Env>) -> u64 {
    env.data().arena.lock().input_length()
}

pub fn length(env: FunctionEnvMut<Env>, handle: u64) -> u64 {
    env.data().arena.lock().length(handle)
}

pub fn alloc(env: FunctionEnvMut<Env>, size: u64) -> Result<u64, RuntimeError> {
    with_arena(&env, HostFn::Alloc, |a| a.alloc(size))
}

pub fn free(env: FunctionEnvMut<Env>, handle: u64) {
    env.data().arena.lock().free(handle)
}

pub fn load_u8(env: FunctionEnvMut<Env>, addr: u64) -> Result<u32, RuntimeError> {
    with_arena(&env, HostFn::LoadU8, |a| a.load_u8(addr)).map(u32::from)
}

pub fn load_u64(env: FunctionEnvMut<Env>, addr: u64) -> Result<u64, RuntimeError> {
    with_arena(&env, HostFn::LoadU64, |a| a.load_u64(addr))
}

pub fn store_u8(env: FunctionEnvMut<Env>, addr: u64, value: u32) -> Result<(), RuntimeError> {
    with_arena(&env, HostFn::StoreU8, |a| a.store_u8(addr, value as u8))
}

pub fn store_u64(env: FunctionEnvMut<Env>, addr: u64, value: u64) -> Result<(), RuntimeError> {
    with_arena(&env, HostFn::StoreU64, |a| a.store_u64(addr, value))
}

pub fn input_load_u8(env: FunctionEnvMut<Env>, offset: u64) -> Result<u32, RuntimeError> {
    with_arena(&env, HostFn::InputLoadU8, |a| a.input_load_u8(offset)).map(u32::from)
}

pub fn input_load_u64(env: FunctionEnvMut<Env>, offset: u64) -> Result<u64, RuntimeError> {
    with_arena(&env, HostFn::InputLoadU64, |a| a.input_load_u64(offset))
}

pub fn output_set(env: FunctionEnvMut<Env>, handle: u64, length: u64) -> Result<(), RuntimeError> {
    with_arena(&env, HostFn::OutputSet, |a| a.output_set(handle, length))
}

pub fn error_set(env: FunctionEnvMut<Env>, handle: u64) -> Result<(), RuntimeError> {
    with_arena(&env, HostFn::ErrorSet, |a| a.error_set(handle))
}

pub fn config_get(env: FunctionEnvMut<Env>, key: u64) -> Result<u64, RuntimeError> {
    with_arena(&env, HostFn::ConfigGet, |a| a.config_get(key))
}

pub fn var_get(env: FunctionEnvMut<Env>, key: u64) -> Result<u64, RuntimeError> {
    with_arena(&env, HostFn::VarGet, |a| a.var_get(key))
}

pub fn var_set(env: FunctionEnvMut<Env>, key: u64, value: u64) -> Result<(), RuntimeError> {
    with_arena(&env, HostFn::VarSet, |a| a.var_set(key, value))
}

pub fn http_request(
    env: FunctionEnvMut<Env>,
    request: u64,
    body: u64,
) -> Result<u64, RuntimeError> {
    with_arena(&env, HostFn::HttpRequest, |a| a.http_request(request, body))
}

pub fn http_status_code(env: FunctionEnvMut<Env>) -> i32 {
    env.data().arena.lock().http_status_code()
}

pub fn log_info(env: FunctionEnvMut<Env>, message: u64) -> Result<(), RuntimeError> {
    with_arena(&env, HostFn::LogInfo, |a| a.log(LogLevel::Info, message))
}

pub fn log_debug(env: FunctionEnvMut<Env>, message: u64) -> Result<(), RuntimeError> {
    with_arena(&env, HostFn::LogDebug, |a| a.log(LogLevel::Debug, message))
}

pub fn log_warn(env: FunctionEnvMut<Env>, message: u64) -> Result<(), RuntimeError> {
    with_arena(&env, HostFn::LogWarn, |a| a.log(LogLevel::Warn, message))
}

pub fn log_error(env: FunctionEnvMut<Env>, message: u64) -> Result<(), RuntimeError> {
    with_arena(&env, HostFn::LogError, |a| a.log(LogLevel::Error, message))
}

fn function(store: &mut impl AsStoreMut, env: &FunctionEnv<Env>, f: HostFn) -> Function {
    match f {
        HostFn::InputLength => Function::new_typed_with_env(store, env, input_length),
        HostFn::Length => Function::new_typed_with_env(store, env, length),
        HostFn::Alloc => Function::new_typed_with_env(store, env, alloc),
        HostFn::Free => Function::new_typed_with_env(store, env, free),
        HostFn::LoadU8 => Function::new_typed_with_env(store, env, load_u8),
        HostFn::LoadU64 => Function::new_typed_with_env(store, env, load_u64),
        HostFn::StoreU8 => Function::new_typed_with_env(store, env, store_u8),
        HostFn::StoreU64 => Function::new_typed_with_env(store, env, store_u64),
        HostFn::InputLoadU8 => Function::new_typed_with_env(store, env, input_load_u8),
        HostFn::InputLoadU64 => Function::new_typed_with_env(store, env, input_load_u64),
        HostFn::OutputSet => Function::new_typed_with_env(store, env, output_set),
        HostFn::ErrorSet => Function::new_typed_with_env(store, env, error_set),
        HostFn::ConfigGet => Function::new_typed_with_env(store, env, config_get),
        HostFn::VarGet => Function::new_typed_with_env(store, env, var_get),
        HostFn::VarSet => Function::new_typed_with_env(store, env, var_set),
        HostFn::HttpRequest => Function::new_typed_with_env(store, env, http_request),
        HostFn::HttpStatusCode => Function::new_typed_with_env(store, env, http_status_code),
        HostFn::LogInfo => Function::new_typed_with_env(store, env, log_info),
        HostFn::LogDebug => Function::new_typed_with_env(store, env, log_debug),
        HostFn::LogWarn => Function::new_typed_with_env(store, env, log_warn),
        HostFn::LogError => Function::new_typed_with_env(store, env, log_error),
    }
}

/// Every primitive registered under the namespace's module and names.
pub fn imports(
    store: &mut impl AsStoreMut,
    env: &FunctionEnv<Env>,
    namespace: ImportNamespace,
) -> Imports {
    let mut imports = Imports::new();
    for f in HostFn::ALL {
        imports.define(
            namespace.module(),
            &namespace.import_name(f),
            function(store, env, f),
        );
    }
    imports
}
