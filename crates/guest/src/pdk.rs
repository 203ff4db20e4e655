use extism_shim_common::block::byte_len;
use extism_shim_common::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// The plugin facing api: everything an entry point does with its host goes through here.
///
/// Generic over the host so the same plugin logic runs against [`crate::WasmHost`] inside a
/// sandbox and against any in-process host natively.
#[derive(Clone, Debug, Default)]
pub struct Pdk<H> {
    host: H,
}

impl<H: HostPrimitives> Pdk<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// the whole input of the current call
    pub fn input(&self) -> Result<Vec<u8>, ShimError> {
        let len = byte_len(self.host.input_length())?;
        if len == 0 {
            return Ok(Vec::new());
        }
        let mut bytes = vec![0; len];
        transfer::read_input(&self.host, &mut bytes);
        Ok(bytes)
    }

    /// the whole input of the current call in word aligned storage
    pub fn input_words(&self) -> Result<WordBuffer, ShimError> {
        let len = byte_len(self.host.input_length())?;
        let mut buffer = WordBuffer::zeroed(len);
        transfer::read_input(&self.host, buffer.as_bytes_mut());
        Ok(buffer)
    }

    pub fn input_string(&self) -> Result<String, ShimError> {
        Ok(String::from_utf8(self.input()?)?)
    }

    pub fn input_json<T: DeserializeOwned>(&self) -> Result<T, ShimError> {
        Ok(serde_json::from_slice(&self.input()?)?)
    }

    pub fn input_msgpack<T: DeserializeOwned + std::fmt::Debug>(&self) -> Result<T, ShimError> {
        Ok(holochain_serialized_bytes::decode(&self.input()?)?)
    }

    /// copy `bytes` into a new host allocation, nothing is allocated for empty input
    pub fn allocate(&self, bytes: &[u8]) -> MemoryBlock {
        MemoryBlock::alloc_bytes(&self.host, bytes)
    }

    /// copy `bytes` into a fresh host block, always allocating even for empty data
    fn publish(&self, bytes: &[u8]) -> MemoryBlock {
        let block = MemoryBlock::alloc(&self.host, bytes.len() as Len);
        transfer::write_region(&self.host, block.offset(), bytes);
        block
    }

    pub fn set_output(&self, bytes: &[u8]) {
        let block = self.publish(bytes);
        self.host.output_set(block.offset(), block.len());
    }

    /// publish a block that already lives on the host without copying it
    pub fn set_output_block(&self, block: MemoryBlock) {
        self.host.output_set(block.offset(), block.len());
    }

    pub fn set_output_string(&self, s: &str) {
        self.set_output(s.as_bytes())
    }

    pub fn set_output_json<T: Serialize>(&self, value: &T) -> Result<(), ShimError> {
        self.set_output(&serde_json::to_vec(value)?);
        Ok(())
    }

    pub fn set_output_msgpack<T: Serialize + std::fmt::Debug>(
        &self,
        value: &T,
    ) -> Result<(), ShimError> {
        self.set_output(&holochain_serialized_bytes::encode(value)?);
        Ok(())
    }

    /// report the call as failed with a message the host can show
    pub fn set_error(&self, message: &str) {
        let block = self.publish(message.as_bytes());
        self.host.error_set(block.offset());
    }

    /// run `f` with the key copied to the host, freeing the key afterwards
    fn with_key<R>(&self, key: &str, f: impl FnOnce(Handle) -> R) -> R {
        let key_block = self.publish(key.as_bytes());
        let r = f(key_block.offset());
        self.host.free(key_block.offset());
        r
    }

    /// the handle returned by a lookup, None for the zero sentinel or an empty block
    fn found(&self, handle: Handle) -> Option<MemoryBlock> {
        if handle == 0 {
            return None;
        }
        let block = MemoryBlock::find(&self.host, handle);
        if block.is_empty() {
            // an empty block is still a live handle
            self.host.free(handle);
            return None;
        }
        Some(block)
    }

    pub fn config(&self, key: &str) -> Result<Option<String>, ShimError> {
        let handle = self.with_key(key, |k| self.host.config_get(k));
        match self.found(handle) {
            Some(block) => {
                let value = block.to_string(&self.host);
                block.free(&self.host);
                Ok(Some(value?))
            }
            None => Ok(None),
        }
    }

    /// the var's block, owned by the caller from here on
    pub fn var(&self, key: &str) -> Option<MemoryBlock> {
        let handle = self.with_key(key, |k| self.host.var_get(k));
        self.found(handle)
    }

    pub fn var_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, ShimError> {
        match self.var(key) {
            Some(block) => {
                let bytes = block.to_vec(&self.host);
                block.free(&self.host);
                Ok(Some(bytes?))
            }
            None => Ok(None),
        }
    }

    /// an empty value removes the var
    pub fn set_var(&self, key: &str, value: &[u8]) {
        let block = self.allocate(value);
        self.set_var_block(key, block);
        block.free(&self.host);
    }

    pub fn set_var_block(&self, key: &str, value: MemoryBlock) {
        self.with_key(key, |k| self.host.var_set(k, value.offset()))
    }

    pub fn remove_var(&self, key: &str) {
        self.with_key(key, |k| self.host.var_set(k, 0))
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        let block = self.publish(message.as_bytes());
        level.send(&self.host, block.offset());
        block.free(&self.host);
    }

    /// send a request through the host, the response body stays on the host until read
    pub fn http_request(
        &self,
        request: &HttpRequest,
        body: Option<&[u8]>,
    ) -> Result<HttpResponse, ShimError> {
        let request_block = self.publish(&request.to_json()?);
        let body_block = body.map_or(MemoryBlock::EMPTY, |b| self.allocate(b));

        let handle = self
            .host
            .http_request(request_block.offset(), body_block.offset());
        let status = self.host.http_status_code();

        request_block.free(&self.host);
        body_block.free(&self.host);

        Ok(HttpResponse {
            status: u16::try_from(status).unwrap_or(0),
            body: self.found(handle).unwrap_or(MemoryBlock::EMPTY),
        })
    }
}
