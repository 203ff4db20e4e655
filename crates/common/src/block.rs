use crate::error::ShimError;
use crate::primitives::HostPrimitives;
use crate::transfer;
use crate::Handle;
use crate::Len;

/// a host reported length as a guest buffer size
pub fn byte_len(len: Len) -> Result<usize, ShimError> {
    usize::try_from(len).map_err(|_| ShimError::TooLarge(len))
}

/// A region of host memory as seen from the guest: where it starts and how long it is.
///
/// A block is a plain value, copying it does not copy host memory and dropping it does not
/// free anything. Whoever allocated the handle decides when to call [`MemoryBlock::free`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MemoryBlock {
    offset: Handle,
    length: Len,
}

impl MemoryBlock {
    pub const EMPTY: MemoryBlock = MemoryBlock {
        offset: 0,
        length: 0,
    };

    pub fn new(offset: Handle, length: Len) -> Self {
        Self { offset, length }
    }

    pub fn offset(&self) -> Handle {
        self.offset
    }

    pub fn len(&self) -> Len {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// ask the host how long the region behind `offset` is
    pub fn find<H: HostPrimitives + ?Sized>(host: &H, offset: Handle) -> Self {
        Self::new(offset, host.length(offset))
    }

    pub fn alloc<H: HostPrimitives + ?Sized>(host: &H, length: Len) -> Self {
        Self::new(host.alloc(length), length)
    }

    /// allocate a block exactly as long as `bytes` and copy them in
    ///
    /// empty input allocates nothing and returns [`MemoryBlock::EMPTY`]
    pub fn alloc_bytes<H: HostPrimitives + ?Sized>(host: &H, bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return Self::EMPTY;
        }
        let block = Self::alloc(host, bytes.len() as Len);
        transfer::write_region(host, block.offset, bytes);
        block
    }

    /// copy the whole block into the front of `buffer`
    pub fn read_into<H: HostPrimitives + ?Sized>(
        &self,
        host: &H,
        buffer: &mut [u8],
    ) -> Result<(), ShimError> {
        if (buffer.len() as Len) < self.length {
            return Err(ShimError::BufferTooSmall {
                buffer: buffer.len() as u64,
                block: self.length,
            });
        }
        let len = byte_len(self.length)?;
        transfer::read_region(host, self.offset, &mut buffer[..len]);
        Ok(())
    }

    pub fn to_vec<H: HostPrimitives + ?Sized>(&self, host: &H) -> Result<Vec<u8>, ShimError> {
        let mut bytes = vec![0; byte_len(self.length)?];
        transfer::read_region(host, self.offset, &mut bytes);
        Ok(bytes)
    }

    pub fn to_string<H: HostPrimitives + ?Sized>(&self, host: &H) -> Result<String, ShimError> {
        Ok(String::from_utf8(self.to_vec(host)?)?)
    }

    /// copy `bytes` to the start of the block
    pub fn write<H: HostPrimitives + ?Sized>(&self, host: &H, bytes: &[u8]) -> Result<(), ShimError> {
        if bytes.len() as Len > self.length {
            return Err(ShimError::BlockOverflow {
                data: bytes.len() as u64,
                block: self.length,
            });
        }
        transfer::write_region(host, self.offset, bytes);
        Ok(())
    }

    /// hand the region back to the host
    ///
    /// the zero handle is never freed, a zero length block behind a real handle is
    pub fn free<H: HostPrimitives + ?Sized>(self, host: &H) {
        if self.offset != 0 {
            host.free(self.offset);
        }
    }
}

impl From<MemoryBlock> for (Handle, Len) {
    fn from(block: MemoryBlock) -> Self {
        (block.offset, block.length)
    }
}
