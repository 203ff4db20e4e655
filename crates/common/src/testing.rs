//! A test double host that records every primitive call.
//!
//! Memory is one flat growable vector addressed directly by flat address, so any address the
//! tests care about can be made valid with [`RecordingHost::reserve`]. Config, vars and HTTP are
//! recorded but always answer with the zero handle.
use crate::log::LogLevel;
use crate::primitives::HostPrimitives;
use crate::Handle;
use crate::Len;
use std::cell::Cell;
use std::cell::RefCell;
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    InputLength,
    Length(Handle),
    Alloc(Len),
    Free(Handle),
    LoadU8(u64),
    LoadU64(u64),
    StoreU8(u64, u8),
    StoreU64(u64, u64),
    InputLoadU8(u64),
    InputLoadU64(u64),
    OutputSet(Handle, Len),
    ErrorSet(Handle),
    ConfigGet(Handle),
    VarGet(Handle),
    VarSet(Handle, Handle),
    HttpRequest(Handle, Handle),
    HttpStatusCode,
    Log(LogLevel, Handle),
}

impl Call {
    /// true for the load/store primitives the transfer engine drives
    pub fn is_transfer(&self) -> bool {
        matches!(
            self,
            Call::LoadU8(_)
                | Call::LoadU64(_)
                | Call::StoreU8(..)
                | Call::StoreU64(..)
                | Call::InputLoadU8(_)
                | Call::InputLoadU64(_)
        )
    }
}

pub struct RecordingHost {
    memory: RefCell<Vec<u8>>,
    input: Vec<u8>,
    next: Cell<u64>,
    blocks: RefCell<BTreeMap<Handle, Len>>,
    calls: RefCell<Vec<Call>>,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self::with_input(Vec::new())
    }
}

impl RecordingHost {
    /// allocations start here so that zero stays the sentinel
    pub const FIRST_HANDLE: Handle = 8;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(input: Vec<u8>) -> Self {
        Self {
            memory: RefCell::new(vec![0; Self::FIRST_HANDLE as usize]),
            input,
            next: Cell::new(Self::FIRST_HANDLE),
            blocks: RefCell::new(BTreeMap::new()),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// make every address below `end` valid
    pub fn reserve(&self, end: u64) {
        let mut memory = self.memory.borrow_mut();
        if memory.len() < end as usize {
            memory.resize(end as usize, 0);
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn transfer_calls(&self) -> usize {
        self.calls.borrow().iter().filter(|c| c.is_transfer()).count()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn bytes(&self, addr: u64, len: Len) -> Vec<u8> {
        self.memory.borrow()[addr as usize..(addr + len) as usize].to_vec()
    }

    /// the handle and length last published with `output_set`
    pub fn output(&self) -> Option<(Handle, Len)> {
        self.calls.borrow().iter().rev().find_map(|c| match c {
            Call::OutputSet(handle, len) => Some((*handle, *len)),
            _ => None,
        })
    }

    /// the handle last published with `error_set`
    pub fn error(&self) -> Option<Handle> {
        self.calls.borrow().iter().rev().find_map(|c| match c {
            Call::ErrorSet(handle) => Some(*handle),
            _ => None,
        })
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl HostPrimitives for RecordingHost {
    fn input_length(&self) -> Len {
        self.record(Call::InputLength);
        self.input.len() as Len
    }

    fn length(&self, handle: Handle) -> Len {
        self.record(Call::Length(handle));
        self.blocks.borrow().get(&handle).copied().unwrap_or(0)
    }

    fn alloc(&self, size: Len) -> Handle {
        self.record(Call::Alloc(size));
        let handle = self.next.get();
        self.next.set(handle + size.max(1));
        self.reserve(handle + size);
        self.blocks.borrow_mut().insert(handle, size);
        handle
    }

    fn free(&self, handle: Handle) {
        self.record(Call::Free(handle));
        self.blocks.borrow_mut().remove(&handle);
    }

    fn load_u8(&self, addr: u64) -> u8 {
        self.record(Call::LoadU8(addr));
        self.memory.borrow()[addr as usize]
    }

    fn load_u64(&self, addr: u64) -> u64 {
        self.record(Call::LoadU64(addr));
        let mut word = [0; 8];
        word.copy_from_slice(&self.memory.borrow()[addr as usize..addr as usize + 8]);
        u64::from_le_bytes(word)
    }

    fn store_u8(&self, addr: u64, value: u8) {
        self.record(Call::StoreU8(addr, value));
        self.memory.borrow_mut()[addr as usize] = value;
    }

    fn store_u64(&self, addr: u64, value: u64) {
        self.record(Call::StoreU64(addr, value));
        self.memory.borrow_mut()[addr as usize..addr as usize + 8]
            .copy_from_slice(&value.to_le_bytes());
    }

    fn input_load_u8(&self, offset: u64) -> u8 {
        self.record(Call::InputLoadU8(offset));
        self.input[offset as usize]
    }

    fn input_load_u64(&self, offset: u64) -> u64 {
        self.record(Call::InputLoadU64(offset));
        let mut word = [0; 8];
        word.copy_from_slice(&self.input[offset as usize..offset as usize + 8]);
        u64::from_le_bytes(word)
    }

    fn output_set(&self, handle: Handle, length: Len) {
        self.record(Call::OutputSet(handle, length));
    }

    fn error_set(&self, handle: Handle) {
        self.record(Call::ErrorSet(handle));
    }

    fn config_get(&self, key: Handle) -> Handle {
        self.record(Call::ConfigGet(key));
        0
    }

    fn var_get(&self, key: Handle) -> Handle {
        self.record(Call::VarGet(key));
        0
    }

    fn var_set(&self, key: Handle, value: Handle) {
        self.record(Call::VarSet(key, value));
    }

    fn http_request(&self, request: Handle, body: Handle) -> Handle {
        self.record(Call::HttpRequest(request, body));
        0
    }

    fn http_status_code(&self) -> i32 {
        self.record(Call::HttpStatusCode);
        0
    }

    fn log_info(&self, message: Handle) {
        self.record(Call::Log(LogLevel::Info, message));
    }

    fn log_debug(&self, message: Handle) {
        self.record(Call::Log(LogLevel::Debug, message));
    }

    fn log_warn(&self, message: Handle) {
        self.record(Call::Log(LogLevel::Warn, message));
    }

    fn log_error(&self, message: Handle) {
        self.record(Call::Log(LogLevel::Error, message));
    }
}
