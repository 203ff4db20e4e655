use byte_slice_cast::AsByteSlice;
use byte_slice_cast::AsMutByteSlice;

/// Guest side byte storage that is always 8 byte aligned.
///
/// Backed by a `Vec<u64>` so that the byte view handed to the transfer engine can always be
/// reinterpreted as words without a runtime alignment miss. Only the first `len` bytes are
/// visible, the tail of the final word is padding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WordBuffer {
    words: Vec<u64>,
    len: usize,
}

impl WordBuffer {
    pub fn zeroed(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(crate::WORD_BYTES)],
            len,
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut buffer = Self::zeroed(bytes.len());
        buffer.as_bytes_mut().copy_from_slice(bytes);
        buffer
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.words[..].as_byte_slice()[..self.len]
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        let len = self.len;
        &mut self.words[..].as_mut_byte_slice()[..len]
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl From<&[u8]> for WordBuffer {
    fn from(bytes: &[u8]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl AsRef<[u8]> for WordBuffer {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}
