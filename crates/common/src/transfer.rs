//! Bulk byte transfer between guest buffers and host regions.
//!
//! The host only offers single byte and single word primitives, and every primitive call is a
//! full round trip across the sandbox boundary. Moving `n` bytes therefore costs `n / 8` word
//! calls for the bulk of the range plus at most 7 byte calls for the remainder:
//!
//! ```text
//! offset: 0       8       16  19
//!         [ u64  ][ u64  ][u8][u8][u8]
//! ```
//!
//! Words are always ascending and always little endian, which is the byte order of wasm linear
//! memory. The guest buffer is only reinterpreted as `[u64]` when that view is proven aligned;
//! a misaligned buffer takes the `from_le_bytes`/`to_le_bytes` path instead, which issues the
//! identical sequence of host calls. Use a [`crate::WordBuffer`] to always hit the aligned path.
//!
//! Nothing here checks the range against the size of the host region, that is the host's job.
use crate::primitives::HostPrimitives;
use crate::WORD_BYTES;
use byte_slice_cast::AsMutSliceOf;
use byte_slice_cast::AsSliceOf;

/// bytes covered by whole words, the rest goes byte by byte
fn word_span(len: usize) -> usize {
    len - len % WORD_BYTES
}

fn at(base: u64, i: u64) -> u64 {
    base.wrapping_add(i)
}

/// fill `dest` from a source addressed relative to its own start
fn fill<W, B>(dest: &mut [u8], mut load_word: W, mut load_byte: B)
where
    W: FnMut(u64) -> u64,
    B: FnMut(u64) -> u8,
{
    let span = word_span(dest.len());
    let (head, tail) = dest.split_at_mut(span);

    match head.as_mut_slice_of::<u64>() {
        Ok(words) => {
            for (i, word) in words.iter_mut().enumerate() {
                *word = load_word((i * WORD_BYTES) as u64).to_le();
            }
        }
        Err(_) => {
            for (i, chunk) in head.chunks_exact_mut(WORD_BYTES).enumerate() {
                chunk.copy_from_slice(&load_word((i * WORD_BYTES) as u64).to_le_bytes());
            }
        }
    }

    for (i, byte) in tail.iter_mut().enumerate() {
        *byte = load_byte((span + i) as u64);
    }
}

/// push `src` to a sink addressed relative to its own start
fn drain<W, B>(src: &[u8], mut store_word: W, mut store_byte: B)
where
    W: FnMut(u64, u64),
    B: FnMut(u64, u8),
{
    let span = word_span(src.len());
    let (head, tail) = src.split_at(span);

    match head.as_slice_of::<u64>() {
        Ok(words) => {
            for (i, word) in words.iter().enumerate() {
                store_word((i * WORD_BYTES) as u64, u64::from_le(*word));
            }
        }
        Err(_) => {
            for (i, chunk) in head.chunks_exact(WORD_BYTES).enumerate() {
                let mut word = [0; WORD_BYTES];
                word.copy_from_slice(chunk);
                store_word((i * WORD_BYTES) as u64, u64::from_le_bytes(word));
            }
        }
    }

    for (i, byte) in tail.iter().enumerate() {
        store_byte((span + i) as u64, *byte);
    }
}

/// copy `dest.len()` bytes of host memory starting at the flat address `addr` into `dest`
pub fn read_region<H: HostPrimitives + ?Sized>(host: &H, addr: u64, dest: &mut [u8]) {
    fill(
        dest,
        |i| host.load_u64(at(addr, i)),
        |i| host.load_u8(at(addr, i)),
    )
}

/// copy the first `dest.len()` bytes of the current call's input into `dest`
pub fn read_input<H: HostPrimitives + ?Sized>(host: &H, dest: &mut [u8]) {
    fill(dest, |i| host.input_load_u64(i), |i| host.input_load_u8(i))
}

/// copy all of `src` into host memory starting at the flat address `addr`
pub fn write_region<H: HostPrimitives + ?Sized>(host: &H, addr: u64, src: &[u8]) {
    drain(
        src,
        |i, word| host.store_u64(at(addr, i), word),
        |i, byte| host.store_u8(at(addr, i), byte),
    )
}
