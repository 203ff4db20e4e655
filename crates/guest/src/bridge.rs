//! Name based dispatch into the host primitives and the transfer engine.
//!
//! A runtime embedded in the guest looks operations up by symbolic name instead of linking
//! against them. The table is an explicit map built once, there is no implicit registration.
use extism_shim_common::prelude::*;
use extism_shim_common::HostFn;
use std::collections::HashMap;

/// prefix the embedded runtime expects in front of every internal call name
pub const BRIDGE_PREFIX: &str = "extism_";

/// An argument as passed by the embedded runtime.
#[derive(Debug)]
pub enum Arg<'a> {
    U8(u8),
    U64(u64),
    Bytes(&'a [u8]),
    BytesMut(&'a mut [u8]),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ret {
    Unit,
    U8(u8),
    U64(u64),
    I32(i32),
}

impl From<()> for Ret {
    fn from(_: ()) -> Self {
        Ret::Unit
    }
}

impl From<u8> for Ret {
    fn from(v: u8) -> Self {
        Ret::U8(v)
    }
}

impl From<u64> for Ret {
    fn from(v: u64) -> Self {
        Ret::U64(v)
    }
}

impl From<i32> for Ret {
    fn from(v: i32) -> Self {
        Ret::I32(v)
    }
}

/// Internal calls get the host and their arguments, a bad argument shape is reported as the
/// shape that was expected.
pub type InternalCall<H> = fn(&H, &mut [Arg<'_>]) -> Result<Ret, &'static str>;

pub struct CallRegistry<H> {
    calls: HashMap<String, InternalCall<H>>,
}

impl<H> Default for CallRegistry<H> {
    fn default() -> Self {
        Self {
            calls: HashMap::new(),
        }
    }
}

impl<H> std::fmt::Debug for CallRegistry<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.calls.keys().collect();
        names.sort();
        f.debug_struct("CallRegistry").field("calls", &names).finish()
    }
}

impl<H: HostPrimitives> CallRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// every host primitive plus `load`, `load_input` and `store`, each behind `prefix`
    pub fn with_primitives(prefix: &str) -> Self {
        let mut registry = Self::new();
        for f in HostFn::ALL {
            registry.register(format!("{}{}", prefix, f.base_name()), primitive::<H>(f));
        }
        registry.register(format!("{}load", prefix), load::<H>);
        registry.register(format!("{}load_input", prefix), load_input::<H>);
        registry.register(format!("{}store", prefix), store::<H>);
        registry
    }

    /// Returns true if the name was already registered.
    /// Registering a name again replaces the entry, there is never more than one per name.
    pub fn register(&mut self, name: impl Into<String>, call: InternalCall<H>) -> bool {
        let name = name.into();
        let present = self.calls.insert(name.clone(), call).is_some();
        if present {
            tracing::debug!(%name, "internal call registered again");
        }
        present
    }

    pub fn contains(&self, name: &str) -> bool {
        self.calls.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.calls.keys().map(String::as_str)
    }

    pub fn dispatch(&self, host: &H, name: &str, args: &mut [Arg<'_>]) -> Result<Ret, ShimError> {
        let call = self
            .calls
            .get(name)
            .ok_or_else(|| ShimError::UnknownCall(name.to_string()))?;
        call(host, args).map_err(|expected| ShimError::BadArguments {
            name: name.to_string(),
            expected,
        })
    }
}

macro_rules! primitives {
    ( $( $variant:ident => $name:ident( $( $arg:ident: $kind:ident ),* ) $expected:literal; )* ) => {
        $(
            fn $name<H: HostPrimitives>(host: &H, args: &mut [Arg<'_>]) -> Result<Ret, &'static str> {
                match args {
                    [ $( Arg::$kind($arg) ),* ] => Ok(Ret::from(host.$name( $( *$arg ),* ))),
                    _ => Err($expected),
                }
            }
        )*

        fn primitive<H: HostPrimitives>(f: HostFn) -> InternalCall<H> {
            match f {
                $( HostFn::$variant => $name::<H>, )*
            }
        }
    };
}

primitives! {
    InputLength => input_length() "no arguments";
    Length => length(handle: U64) "(handle)";
    Alloc => alloc(size: U64) "(size)";
    Free => free(handle: U64) "(handle)";
    LoadU8 => load_u8(addr: U64) "(addr)";
    LoadU64 => load_u64(addr: U64) "(addr)";
    StoreU8 => store_u8(addr: U64, value: U8) "(addr, u8)";
    StoreU64 => store_u64(addr: U64, value: U64) "(addr, u64)";
    InputLoadU8 => input_load_u8(offset: U64) "(offset)";
    InputLoadU64 => input_load_u64(offset: U64) "(offset)";
    OutputSet => output_set(handle: U64, length: U64) "(handle, length)";
    ErrorSet => error_set(handle: U64) "(handle)";
    ConfigGet => config_get(key: U64) "(key)";
    VarGet => var_get(key: U64) "(key)";
    VarSet => var_set(key: U64, value: U64) "(key, value)";
    HttpRequest => http_request(request: U64, body: U64) "(request, body)";
    HttpStatusCode => http_status_code() "no arguments";
    LogInfo => log_info(message: U64) "(message)";
    LogDebug => log_debug(message: U64) "(message)";
    LogWarn => log_warn(message: U64) "(message)";
    LogError => log_error(message: U64) "(message)";
}

fn load<H: HostPrimitives>(host: &H, args: &mut [Arg<'_>]) -> Result<Ret, &'static str> {
    match args {
        [Arg::U64(addr), Arg::BytesMut(dest)] => {
            transfer::read_region(host, *addr, dest);
            Ok(Ret::Unit)
        }
        _ => Err("(addr, mutable bytes)"),
    }
}

fn load_input<H: HostPrimitives>(host: &H, args: &mut [Arg<'_>]) -> Result<Ret, &'static str> {
    match args {
        [Arg::BytesMut(dest)] => {
            transfer::read_input(host, dest);
            Ok(Ret::Unit)
        }
        _ => Err("(mutable bytes)"),
    }
}

fn store<H: HostPrimitives>(host: &H, args: &mut [Arg<'_>]) -> Result<Ret, &'static str> {
    match args {
        [Arg::U64(addr), Arg::Bytes(src)] => {
            transfer::write_region(host, *addr, src);
            Ok(Ret::Unit)
        }
        _ => Err("(addr, bytes)"),
    }
}

/// the process wide table for the imported host, built on first use
#[cfg(target_arch = "wasm32")]
pub fn bridge() -> &'static CallRegistry<crate::WasmHost> {
    static BRIDGE: once_cell::sync::OnceCell<CallRegistry<crate::WasmHost>> =
        once_cell::sync::OnceCell::new();
    BRIDGE.get_or_init(|| CallRegistry::with_primitives(BRIDGE_PREFIX))
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use extism_shim_common::testing::Call;
    use extism_shim_common::testing::RecordingHost;
    use extism_shim_host::ArenaHost;

    fn answer<H: HostPrimitives>(_: &H, args: &mut [Arg<'_>]) -> Result<Ret, &'static str> {
        match args {
            [] => Ok(Ret::U64(42)),
            _ => Err("no arguments"),
        }
    }

    #[test]
    fn every_primitive_is_registered() {
        let registry = CallRegistry::<RecordingHost>::with_primitives(BRIDGE_PREFIX);

        assert_eq!(HostFn::ALL.len() + 3, registry.len());
        for f in HostFn::ALL {
            assert!(registry.contains(&format!("extism_{}", f.base_name())));
        }
        assert!(registry.contains("extism_load"));
        assert!(registry.contains("extism_load_input"));
        assert!(registry.contains("extism_store"));
    }

    #[test]
    fn double_registration_is_harmless() {
        let mut registry = CallRegistry::<RecordingHost>::new();
        let host = RecordingHost::new();

        assert!(!registry.register("answer", answer::<RecordingHost>));
        let first = registry.dispatch(&host, "answer", &mut []).unwrap();

        assert!(registry.register("answer", answer::<RecordingHost>));
        assert_eq!(1, registry.len());
        assert_eq!(first, registry.dispatch(&host, "answer", &mut []).unwrap());
    }

    #[test]
    fn dispatch_passes_through() {
        let registry = CallRegistry::<RecordingHost>::with_primitives("");
        let host = RecordingHost::new();

        let handle = match registry.dispatch(&host, "alloc", &mut [Arg::U64(16)]) {
            Ok(Ret::U64(handle)) => handle,
            other => panic!("unexpected {:?}", other),
        };
        registry
            .dispatch(&host, "store_u8", &mut [Arg::U64(handle), Arg::U8(9)])
            .unwrap();
        assert_eq!(
            Ret::U8(9),
            registry
                .dispatch(&host, "load_u8", &mut [Arg::U64(handle)])
                .unwrap()
        );
        assert_eq!(
            Ret::I32(0),
            registry.dispatch(&host, "http_status_code", &mut []).unwrap()
        );
        assert_eq!(
            vec![
                Call::Alloc(16),
                Call::StoreU8(handle, 9),
                Call::LoadU8(handle),
                Call::HttpStatusCode
            ],
            host.calls()
        );
    }

    #[test]
    fn transfer_calls_through_bridge() {
        let registry = CallRegistry::<ArenaHost>::with_primitives(BRIDGE_PREFIX);
        let host = ArenaHost::new();
        host.set_input((1..=10).collect());

        let mut input = [0; 10];
        registry
            .dispatch(&host, "extism_load_input", &mut [Arg::BytesMut(&mut input)])
            .unwrap();
        assert_eq!([1, 2, 3, 4, 5, 6, 7, 8, 9, 10], input);

        let handle = match registry.dispatch(&host, "extism_alloc", &mut [Arg::U64(10)]) {
            Ok(Ret::U64(handle)) => handle,
            other => panic!("unexpected {:?}", other),
        };
        registry
            .dispatch(
                &host,
                "extism_store",
                &mut [Arg::U64(handle), Arg::Bytes(&input)],
            )
            .unwrap();

        let mut back = [0; 10];
        registry
            .dispatch(
                &host,
                "extism_load",
                &mut [Arg::U64(handle), Arg::BytesMut(&mut back)],
            )
            .unwrap();
        assert_eq!(input, back);
    }

    #[test]
    fn unknown_and_malformed_calls() {
        let registry = CallRegistry::<RecordingHost>::with_primitives(BRIDGE_PREFIX);
        let host = RecordingHost::new();

        assert!(matches!(
            registry.dispatch(&host, "extism_nope", &mut []),
            Err(ShimError::UnknownCall(name)) if name == "extism_nope"
        ));
        assert!(matches!(
            registry.dispatch(&host, "extism_store_u64", &mut [Arg::U64(8)]),
            Err(ShimError::BadArguments { expected: "(addr, u64)", .. })
        ));
        assert!(matches!(
            registry.dispatch(&host, "extism_load", &mut [Arg::U64(8), Arg::Bytes(&[])]),
            Err(ShimError::BadArguments { .. })
        ));
        // nothing reached the host
        assert!(host.calls().is_empty());
    }
}
