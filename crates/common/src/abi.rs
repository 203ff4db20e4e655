use serde::Deserialize;
use serde::Serialize;
use std::borrow::Cow;

/// Every host primitive that crosses the import boundary.
///
/// Both historical protocol families import the same set of functions, they only differ in
/// the wasm import module and whether the function names carry a prefix. Guests and hosts
/// derive concrete import names from this single table via [`ImportNamespace`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HostFn {
    InputLength,
    Length,
    Alloc,
    Free,
    LoadU8,
    LoadU64,
    StoreU8,
    StoreU64,
    InputLoadU8,
    InputLoadU64,
    OutputSet,
    ErrorSet,
    ConfigGet,
    VarGet,
    VarSet,
    HttpRequest,
    HttpStatusCode,
    LogInfo,
    LogDebug,
    LogWarn,
    LogError,
}

impl HostFn {
    pub const ALL: [HostFn; 21] = [
        HostFn::InputLength,
        HostFn::Length,
        HostFn::Alloc,
        HostFn::Free,
        HostFn::LoadU8,
        HostFn::LoadU64,
        HostFn::StoreU8,
        HostFn::StoreU64,
        HostFn::InputLoadU8,
        HostFn::InputLoadU64,
        HostFn::OutputSet,
        HostFn::ErrorSet,
        HostFn::ConfigGet,
        HostFn::VarGet,
        HostFn::VarSet,
        HostFn::HttpRequest,
        HostFn::HttpStatusCode,
        HostFn::LogInfo,
        HostFn::LogDebug,
        HostFn::LogWarn,
        HostFn::LogError,
    ];

    /// unprefixed name, as imported by the `extism:host/env` family
    pub fn base_name(&self) -> &'static str {
        match self {
            HostFn::InputLength => "input_length",
            HostFn::Length => "length",
            HostFn::Alloc => "alloc",
            HostFn::Free => "free",
            HostFn::LoadU8 => "load_u8",
            HostFn::LoadU64 => "load_u64",
            HostFn::StoreU8 => "store_u8",
            HostFn::StoreU64 => "store_u64",
            HostFn::InputLoadU8 => "input_load_u8",
            HostFn::InputLoadU64 => "input_load_u64",
            HostFn::OutputSet => "output_set",
            HostFn::ErrorSet => "error_set",
            HostFn::ConfigGet => "config_get",
            HostFn::VarGet => "var_get",
            HostFn::VarSet => "var_set",
            HostFn::HttpRequest => "http_request",
            HostFn::HttpStatusCode => "http_status_code",
            HostFn::LogInfo => "log_info",
            HostFn::LogDebug => "log_debug",
            HostFn::LogWarn => "log_warn",
            HostFn::LogError => "log_error",
        }
    }

    pub fn from_base_name(name: &str) -> Option<HostFn> {
        HostFn::ALL.into_iter().find(|f| f.base_name() == name)
    }
}

/// Which protocol family a guest imports its primitives from.
///
/// The two families are not wire compatible with each other, a guest is built against exactly
/// one of them and the host must register its functions under the same one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportNamespace {
    /// `env` module with `extism_` prefixed names
    Legacy,
    /// `extism:host/env` module with bare names
    #[default]
    HostEnv,
}

impl ImportNamespace {
    pub const LEGACY_MODULE: &'static str = "env";
    pub const LEGACY_PREFIX: &'static str = "extism_";
    pub const HOST_ENV_MODULE: &'static str = "extism:host/env";

    pub fn module(&self) -> &'static str {
        match self {
            ImportNamespace::Legacy => Self::LEGACY_MODULE,
            ImportNamespace::HostEnv => Self::HOST_ENV_MODULE,
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            ImportNamespace::Legacy => Self::LEGACY_PREFIX,
            ImportNamespace::HostEnv => "",
        }
    }

    pub fn import_name(&self, f: HostFn) -> Cow<'static, str> {
        match self.prefix() {
            "" => Cow::Borrowed(f.base_name()),
            prefix => Cow::Owned(format!("{}{}", prefix, f.base_name())),
        }
    }

    /// inverse of `import_name`, None if the name is not part of this family
    pub fn resolve(&self, import_name: &str) -> Option<HostFn> {
        import_name
            .strip_prefix(self.prefix())
            .and_then(HostFn::from_base_name)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn legacy_names_are_prefixed() {
        let ns = ImportNamespace::Legacy;
        assert_eq!("env", ns.module());
        assert_eq!("extism_load_u64", ns.import_name(HostFn::LoadU64));
        assert_eq!("extism_input_length", ns.import_name(HostFn::InputLength));
    }

    #[test]
    fn host_env_names_are_bare() {
        let ns = ImportNamespace::HostEnv;
        assert_eq!("extism:host/env", ns.module());
        assert_eq!("store_u8", ns.import_name(HostFn::StoreU8));
        assert_eq!("log_error", ns.import_name(HostFn::LogError));
    }

    #[test]
    fn names_resolve_back_within_their_family() {
        for ns in [ImportNamespace::Legacy, ImportNamespace::HostEnv] {
            for f in HostFn::ALL {
                assert_eq!(Some(f), ns.resolve(&ns.import_name(f)));
            }
        }
        assert_eq!(None, ImportNamespace::Legacy.resolve("load_u8"));
        assert_eq!(None, ImportNamespace::HostEnv.resolve("extism_load_u8"));
    }

    #[test]
    fn base_names_are_unique() {
        let mut names: Vec<&str> = HostFn::ALL.iter().map(HostFn::base_name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(HostFn::ALL.len(), names.len());
    }

    #[test]
    fn namespace_deserializes_from_snake_case() {
        let ns: ImportNamespace = serde_json::from_str("\"legacy\"").unwrap();
        assert_eq!(ImportNamespace::Legacy, ns);
        let ns: ImportNamespace = serde_json::from_str("\"host_env\"").unwrap();
        assert_eq!(ImportNamespace::HostEnv, ns);
    }
}
