use crate::pdk::Pdk;
use extism_shim_common::prelude::*;
use std::any::Any;
use std::panic::catch_unwind;
use std::panic::AssertUnwindSafe;

/// code returned to the host when an entry point failed and published an error
pub const FAILURE: i32 = 1;

/// Run the body of an exported entry point.
///
/// `Ok(code)` is returned to the host unchanged. An `Err` or a panic is published with
/// `error_set` and the host sees [`FAILURE`], nothing unwinds across the export.
pub fn run_export<H, F>(host: H, name: &str, f: F) -> i32
where
    H: HostPrimitives,
    F: FnOnce(&Pdk<H>) -> Result<i32, ShimError>,
{
    let pdk = Pdk::new(host);
    tracing::trace!(export = name, "enter");

    let message = match catch_unwind(AssertUnwindSafe(|| f(&pdk))) {
        Ok(Ok(code)) => {
            tracing::trace!(export = name, code, "exit");
            return code;
        }
        Ok(Err(e)) => e.to_string(),
        Err(panic) => panic_message(panic.as_ref()),
    };

    tracing::error!(export = name, %message);
    pdk.set_error(&message);
    FAILURE
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "entry point panicked".to_string()
    }
}

/// Export plugin functions to the host.
///
/// Each `export => path` pair emits an `extern "C" fn() -> i32` exported as `export` that
/// initializes the runtime once and calls `path(&Pdk<WasmHost>)` through [`run_export`]. The
/// exports only exist on wasm32 so the same functions can be called natively with any other
/// host, and may share the export's name.
///
/// ```ignore
/// fn count_vowels<H: HostPrimitives>(pdk: &Pdk<H>) -> Result<i32, ShimError> { .. }
///
/// plugin_fn!(count_vowels => count_vowels);
/// ```
#[macro_export]
macro_rules! plugin_fn {
    ( $( $export:ident => $f:path ),* $(,)? ) => {
        $(
            #[cfg(target_arch = "wasm32")]
            const _: () = {
                #[export_name = stringify!($export)]
                pub extern "C" fn export() -> i32 {
                    $crate::runtime::initialize();
                    $crate::export::run_export($crate::WasmHost, stringify!($export), |pdk| $f(pdk))
                }
            };
        )*
    };
}
