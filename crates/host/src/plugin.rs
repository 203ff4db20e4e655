use crate::env::Env;
use crate::error::HostError;
use crate::host::ArenaHost;
use crate::import::imports;
use crate::manifest::Manifest;
use extism_shim_common::ImportNamespace;
use wasmer::FunctionEnv;
use wasmer::Instance;
use wasmer::Module;
use wasmer::Store;

/// A compiled and instantiated guest with its arena.
pub struct Plugin {
    store: Store,
    instance: Instance,
    arena: ArenaHost,
    namespace: ImportNamespace,
}

impl std::fmt::Debug for Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("arena", &self.arena)
            .field("namespace", &self.namespace)
            .finish()
    }
}

impl Plugin {
    /// `wasm` may be a binary module or, with wasmer's default features, wat text.
    pub fn new(wasm: impl AsRef<[u8]>, manifest: Manifest) -> Result<Self, HostError> {
        let mut store = Store::default();
        let module = Module::new(&store, wasm)?;

        let arena = ArenaHost::from(manifest.arena());
        let env = FunctionEnv::new(&mut store, Env::new(arena.clone()));
        let imports = imports(&mut store, &env, manifest.namespace);
        let instance = Instance::new(&mut store, &module, &imports).map_err(Box::new)?;

        tracing::debug!(namespace = ?manifest.namespace, "plugin instantiated");
        Ok(Self {
            store,
            instance,
            arena,
            namespace: manifest.namespace,
        })
    }

    pub fn arena(&self) -> &ArenaHost {
        &self.arena
    }

    pub fn namespace(&self) -> ImportNamespace {
        self.namespace
    }

    pub fn function_exists(&self, name: &str) -> bool {
        self.instance
            .exports
            .get_typed_function::<(), i32>(&self.store, name)
            .is_ok()
    }

    /// Call an entry point with `input` and return its output.
    ///
    /// Input, output and error are scoped to the call, vars persist between calls.
    pub fn call(&mut self, name: &str, input: impl AsRef<[u8]>) -> Result<Vec<u8>, HostError> {
        self.arena.lock().begin_call(input.as_ref().to_vec());

        let export = self
            .instance
            .exports
            .get_typed_function::<(), i32>(&self.store, name)?;
        let code = export.call(&mut self.store)?;

        let arena = self.arena.lock();
        if let Some(message) = arena.error() {
            tracing::debug!(export = name, code, %message, "plugin reported an error");
            return Err(HostError::Guest(message.to_string()));
        }
        if code != 0 {
            return Err(HostError::ExitCode(code));
        }
        Ok(arena.output().map(<[u8]>::to_vec).unwrap_or_default())
    }
}
