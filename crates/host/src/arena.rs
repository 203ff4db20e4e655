//! Host side semantics of every primitive over one flat, growable arena.
//!
//! Handles are flat addresses into the arena. Allocation only ever bumps, freed memory is
//! forgotten but not reused, so a stale handle can never alias a newer block.
use crate::error::ArenaError;
use extism_shim_common::prelude::*;
use extism_shim_common::HostFn;
use std::collections::BTreeMap;
use std::ops::Range;

/// Answers the guest's http requests, returns the status and response body.
pub type HttpHandler = Box<dyn FnMut(&HttpRequest, &[u8]) -> (u16, Vec<u8>) + Send>;

/// How many times the guest called each primitive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallStats {
    pub input_length: u64,
    pub length: u64,
    pub alloc: u64,
    pub free: u64,
    pub load_u8: u64,
    pub load_u64: u64,
    pub store_u8: u64,
    pub store_u64: u64,
    pub input_load_u8: u64,
    pub input_load_u64: u64,
    pub output_set: u64,
    pub error_set: u64,
    pub config_get: u64,
    pub var_get: u64,
    pub var_set: u64,
    pub http_request: u64,
    pub http_status_code: u64,
    pub log_info: u64,
    pub log_debug: u64,
    pub log_warn: u64,
    pub log_error: u64,
}

impl CallStats {
    fn counter(&mut self, f: HostFn) -> &mut u64 {
        match f {
            HostFn::InputLength => &mut self.input_length,
            HostFn::Length => &mut self.length,
            HostFn::Alloc => &mut self.alloc,
            HostFn::Free => &mut self.free,
            HostFn::LoadU8 => &mut self.load_u8,
            HostFn::LoadU64 => &mut self.load_u64,
            HostFn::StoreU8 => &mut self.store_u8,
            HostFn::StoreU64 => &mut self.store_u64,
            HostFn::InputLoadU8 => &mut self.input_load_u8,
            HostFn::InputLoadU64 => &mut self.input_load_u64,
            HostFn::OutputSet => &mut self.output_set,
            HostFn::ErrorSet => &mut self.error_set,
            HostFn::ConfigGet => &mut self.config_get,
            HostFn::VarGet => &mut self.var_get,
            HostFn::VarSet => &mut self.var_set,
            HostFn::HttpRequest => &mut self.http_request,
            HostFn::HttpStatusCode => &mut self.http_status_code,
            HostFn::LogInfo => &mut self.log_info,
            HostFn::LogDebug => &mut self.log_debug,
            HostFn::LogWarn => &mut self.log_warn,
            HostFn::LogError => &mut self.log_error,
        }
    }

    pub fn record(&mut self, f: HostFn) {
        *self.counter(f) += 1;
    }

    pub fn get(&self, f: HostFn) -> u64 {
        let mut stats = *self;
        *stats.counter(f)
    }

    pub fn total(&self) -> u64 {
        HostFn::ALL.iter().map(|f| self.get(*f)).sum()
    }

    /// the load and store calls, i.e. everything the transfer engine issues
    pub fn transfers(&self) -> u64 {
        self.load_u8
            + self.load_u64
            + self.store_u8
            + self.store_u64
            + self.input_load_u8
            + self.input_load_u64
    }
}

fn log_fn(level: LogLevel) -> HostFn {
    match level {
        LogLevel::Debug => HostFn::LogDebug,
        LogLevel::Info => HostFn::LogInfo,
        LogLevel::Warn => HostFn::LogWarn,
        LogLevel::Error => HostFn::LogError,
    }
}

pub struct MemoryArena {
    memory: Vec<u8>,
    blocks: BTreeMap<Handle, Len>,
    limit: Option<u64>,
    input: Vec<u8>,
    output: Option<Vec<u8>>,
    error: Option<String>,
    config: BTreeMap<String, String>,
    vars: BTreeMap<String, Vec<u8>>,
    logs: Vec<(LogLevel, String)>,
    http: Option<HttpHandler>,
    http_status: i32,
    stats: CallStats,
}

impl std::fmt::Debug for MemoryArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryArena")
            .field("memory", &self.memory.len())
            .field("blocks", &self.blocks.len())
            .field("limit", &self.limit)
            .field("input", &self.input.len())
            .field("config", &self.config)
            .field("vars", &self.vars.keys().collect::<Vec<_>>())
            .field("http", &self.http.is_some())
            .field("stats", &self.stats)
            .finish()
    }
}

impl Default for MemoryArena {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryArena {
    pub fn new() -> Self {
        Self {
            // address 0 is never handed out, it is the sentinel
            memory: vec![0],
            blocks: BTreeMap::new(),
            limit: None,
            input: Vec::new(),
            output: None,
            error: None,
            config: BTreeMap::new(),
            vars: BTreeMap::new(),
            logs: Vec::new(),
            http: None,
            http_status: 0,
            stats: CallStats::default(),
        }
    }

    /// cap the total arena size in bytes
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_config(mut self, config: BTreeMap<String, String>) -> Self {
        self.config = config;
        self
    }

    pub fn set_config(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.config.insert(key.into(), value.into());
    }

    pub fn set_http_handler<F>(&mut self, handler: F)
    where
        F: FnMut(&HttpRequest, &[u8]) -> (u16, Vec<u8>) + Send + 'static,
    {
        self.http = Some(Box::new(handler));
    }

    pub fn set_input(&mut self, input: Vec<u8>) {
        self.input = input;
    }

    /// reset everything scoped to a single call, vars and config survive
    pub fn begin_call(&mut self, input: Vec<u8>) {
        self.input = input;
        self.output = None;
        self.error = None;
        self.http_status = 0;
    }

    pub fn input(&self) -> &[u8] {
        &self.input
    }

    pub fn output(&self) -> Option<&[u8]> {
        self.output.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn var(&self, key: &str) -> Option<&[u8]> {
        self.vars.get(key).map(Vec::as_slice)
    }

    pub fn logs(&self) -> &[(LogLevel, String)] {
        &self.logs
    }

    pub fn stats(&self) -> CallStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = CallStats::default();
    }

    /// number of blocks allocated and not yet freed
    pub fn live_blocks(&self) -> usize {
        self.blocks.len()
    }

    pub fn memory_len(&self) -> usize {
        self.memory.len()
    }

    fn range(&self, addr: u64, len: u64) -> Result<Range<usize>, ArenaError> {
        match addr.checked_add(len) {
            Some(end) if end <= self.memory.len() as u64 => Ok(addr as usize..end as usize),
            _ => Err(ArenaError::OutOfBounds { addr, len }),
        }
    }

    fn input_range(&self, offset: u64, len: u64) -> Result<Range<usize>, ArenaError> {
        match offset.checked_add(len) {
            Some(end) if end <= self.input.len() as u64 => Ok(offset as usize..end as usize),
            _ => Err(ArenaError::InputOutOfBounds { offset, len }),
        }
    }

    fn allocate(&mut self, size: Len) -> Result<Handle, ArenaError> {
        let handle = self.memory.len() as u64;
        // zero sized blocks still take a byte so every handle is distinct
        let end = handle
            .checked_add(size.max(1))
            .ok_or(ArenaError::OutOfMemory {
                requested: size,
                limit: u64::MAX,
            })?;
        if let Some(limit) = self.limit {
            if end > limit {
                return Err(ArenaError::OutOfMemory {
                    requested: size,
                    limit,
                });
            }
        }
        self.memory.resize(end as usize, 0);
        self.blocks.insert(handle, size);
        Ok(handle)
    }

    fn allocate_bytes(&mut self, bytes: &[u8]) -> Result<Handle, ArenaError> {
        let handle = self.allocate(bytes.len() as Len)?;
        let range = self.range(handle, bytes.len() as u64)?;
        self.memory[range].copy_from_slice(bytes);
        Ok(handle)
    }

    /// the bytes of a live block
    pub fn block(&self, handle: Handle) -> Result<&[u8], ArenaError> {
        let len = self
            .blocks
            .get(&handle)
            .copied()
            .ok_or(ArenaError::UnknownHandle(handle))?;
        Ok(&self.memory[self.range(handle, len)?])
    }

    fn key(&self, handle: Handle) -> Result<String, ArenaError> {
        String::from_utf8(self.block(handle)?.to_vec()).map_err(|e| ArenaError::Key(e.to_string()))
    }

    pub fn input_length(&mut self) -> Len {
        self.stats.record(HostFn::InputLength);
        self.input.len() as Len
    }

    /// zero for anything that is not a live block
    pub fn length(&mut self, handle: Handle) -> Len {
        self.stats.record(HostFn::Length);
        self.blocks.get(&handle).copied().unwrap_or(0)
    }

    pub fn alloc(&mut self, size: Len) -> Result<Handle, ArenaError> {
        self.stats.record(HostFn::Alloc);
        self.allocate(size)
    }

    pub fn free(&mut self, handle: Handle) {
        self.stats.record(HostFn::Free);
        self.blocks.remove(&handle);
    }

    pub fn load_u8(&mut self, addr: u64) -> Result<u8, ArenaError> {
        self.stats.record(HostFn::LoadU8);
        let range = self.range(addr, 1)?;
        Ok(self.memory[range.start])
    }

    pub fn load_u64(&mut self, addr: u64) -> Result<u64, ArenaError> {
        self.stats.record(HostFn::LoadU64);
        let range = self.range(addr, WORD)?;
        let mut word = [0; WORD as usize];
        word.copy_from_slice(&self.memory[range]);
        Ok(u64::from_le_bytes(word))
    }

    pub fn store_u8(&mut self, addr: u64, value: u8) -> Result<(), ArenaError> {
        self.stats.record(HostFn::StoreU8);
        let range = self.range(addr, 1)?;
        self.memory[range.start] = value;
        Ok(())
    }

    pub fn store_u64(&mut self, addr: u64, value: u64) -> Result<(), ArenaError> {
        self.stats.record(HostFn::StoreU64);
        let range = self.range(addr, WORD)?;
        self.memory[range].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn input_load_u8(&mut self, offset: u64) -> Result<u8, ArenaError> {
        self.stats.record(HostFn::InputLoadU8);
        let range = self.input_range(offset, 1)?;
        Ok(self.input[range.start])
    }

    pub fn input_load_u64(&mut self, offset: u64) -> Result<u64, ArenaError> {
        self.stats.record(HostFn::InputLoadU64);
        let range = self.input_range(offset, WORD)?;
        let mut word = [0; WORD as usize];
        word.copy_from_slice(&self.input[range]);
        Ok(u64::from_le_bytes(word))
    }

    /// the output is copied out immediately, the guest may free the block afterwards
    pub fn output_set(&mut self, handle: Handle, length: Len) -> Result<(), ArenaError> {
        self.stats.record(HostFn::OutputSet);
        let range = self.range(handle, length)?;
        self.output = Some(self.memory[range].to_vec());
        Ok(())
    }

    /// a zero handle clears the error
    pub fn error_set(&mut self, handle: Handle) -> Result<(), ArenaError> {
        self.stats.record(HostFn::ErrorSet);
        self.error = match handle {
            0 => None,
            handle => Some(String::from_utf8_lossy(self.block(handle)?).into_owned()),
        };
        Ok(())
    }

    /// a fresh block holding the value, or zero when the key is not configured
    pub fn config_get(&mut self, key: Handle) -> Result<Handle, ArenaError> {
        self.stats.record(HostFn::ConfigGet);
        let key = self.key(key)?;
        match self.config.get(&key).cloned() {
            Some(value) => self.allocate_bytes(value.as_bytes()),
            None => Ok(0),
        }
    }

    /// a fresh block holding the value, or zero when the var is not set
    pub fn var_get(&mut self, key: Handle) -> Result<Handle, ArenaError> {
        self.stats.record(HostFn::VarGet);
        let key = self.key(key)?;
        match self.vars.get(&key).cloned() {
            Some(value) => self.allocate_bytes(&value),
            None => Ok(0),
        }
    }

    /// copies the value block, a zero value removes the var
    pub fn var_set(&mut self, key: Handle, value: Handle) -> Result<(), ArenaError> {
        self.stats.record(HostFn::VarSet);
        let key = self.key(key)?;
        if value == 0 {
            self.vars.remove(&key);
        } else {
            let value = self.block(value)?.to_vec();
            self.vars.insert(key, value);
        }
        Ok(())
    }

    pub fn http_request(&mut self, request: Handle, body: Handle) -> Result<Handle, ArenaError> {
        self.stats.record(HostFn::HttpRequest);
        self.http_status = 0;

        let request = HttpRequest::from_json(self.block(request)?)
            .map_err(|e| ArenaError::HttpRequest(e.to_string()))?;
        let body = match body {
            0 => Vec::new(),
            body => self.block(body)?.to_vec(),
        };
        let handler = self.http.as_mut().ok_or(ArenaError::NoHttpHandler)?;
        let (status, response) = handler(&request, &body);
        tracing::debug!(url = %request.url, method = %request.method, status, "http request");

        self.http_status = status.into();
        if response.is_empty() {
            return Ok(0);
        }
        self.allocate_bytes(&response)
    }

    pub fn http_status_code(&mut self) -> i32 {
        self.stats.record(HostFn::HttpStatusCode);
        self.http_status
    }

    /// record the message and forward it to tracing
    pub fn log(&mut self, level: LogLevel, message: Handle) -> Result<(), ArenaError> {
        self.stats.record(log_fn(level));
        let message = String::from_utf8_lossy(self.block(message)?).into_owned();
        match level {
            LogLevel::Debug => tracing::debug!(target: "extism_shim_host::guest", "{}", message),
            LogLevel::Info => tracing::info!(target: "extism_shim_host::guest", "{}", message),
            LogLevel::Warn => tracing::warn!(target: "extism_shim_host::guest", "{}", message),
            LogLevel::Error => tracing::error!(target: "extism_shim_host::guest", "{}", message),
        }
        self.logs.push((level, message));
        Ok(())
    }
}

const WORD: u64 = extism_shim_common::WORD_BYTES as u64;
