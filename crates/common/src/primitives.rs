use crate::Handle;
use crate::Len;

/// Every single unit operation the host environment supplies to a guest.
///
/// Implementations are straight pass-throughs to the host: no buffering, no validation, no
/// retries. Failures are whatever the host's own return convention says (a zero handle from
/// `config_get` or `var_get` means "not found") and are never interpreted at this layer.
///
/// Addresses passed to `load_*`/`store_*` are flat: `handle + offset`, already summed.
/// Offsets passed to `input_load_*` are relative to the start of the call's input.
pub trait HostPrimitives {
    fn input_length(&self) -> Len;
    fn length(&self, handle: Handle) -> Len;

    fn alloc(&self, size: Len) -> Handle;
    fn free(&self, handle: Handle);

    fn load_u8(&self, addr: u64) -> u8;
    fn load_u64(&self, addr: u64) -> u64;
    fn store_u8(&self, addr: u64, value: u8);
    fn store_u64(&self, addr: u64, value: u64);

    fn input_load_u8(&self, offset: u64) -> u8;
    fn input_load_u64(&self, offset: u64) -> u64;

    fn output_set(&self, handle: Handle, length: Len);
    fn error_set(&self, handle: Handle);

    fn config_get(&self, key: Handle) -> Handle;
    fn var_get(&self, key: Handle) -> Handle;
    fn var_set(&self, key: Handle, value: Handle);

    fn http_request(&self, request: Handle, body: Handle) -> Handle;
    fn http_status_code(&self) -> i32;

    fn log_info(&self, message: Handle);
    fn log_debug(&self, message: Handle);
    fn log_warn(&self, message: Handle);
    fn log_error(&self, message: Handle);
}

macro_rules! forward {
    ( $( fn $name:ident(&self $(, $arg:ident: $ty:ty)* ) $( -> $ret:ty )?; )* ) => {
        impl<H: HostPrimitives + ?Sized> HostPrimitives for &H {
            $(
                fn $name(&self $(, $arg: $ty)*) $( -> $ret )? {
                    (**self).$name($($arg),*)
                }
            )*
        }
    };
}

forward! {
    fn input_length(&self) -> Len;
    fn length(&self, handle: Handle) -> Len;
    fn alloc(&self, size: Len) -> Handle;
    fn free(&self, handle: Handle);
    fn load_u8(&self, addr: u64) -> u8;
    fn load_u64(&self, addr: u64) -> u64;
    fn store_u8(&self, addr: u64, value: u8);
    fn store_u64(&self, addr: u64, value: u64);
    fn input_load_u8(&self, offset: u64) -> u8;
    fn input_load_u64(&self, offset: u64) -> u64;
    fn output_set(&self, handle: Handle, length: Len);
    fn error_set(&self, handle: Handle);
    fn config_get(&self, key: Handle) -> Handle;
    fn var_get(&self, key: Handle) -> Handle;
    fn var_set(&self, key: Handle, value: Handle);
    fn http_request(&self, request: Handle, body: Handle) -> Handle;
    fn http_status_code(&self) -> i32;
    fn log_info(&self, message: Handle);
    fn log_debug(&self, message: Handle);
    fn log_warn(&self, message: Handle);
    fn log_error(&self, message: Handle);
}
