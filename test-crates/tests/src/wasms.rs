use extism_shim_host::prelude::*;

/// The kitchen sink guest as built for each import family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TestWasm {
    KitchenSink,
    KitchenSinkLegacy,
}

impl TestWasm {
    pub const ALL: [TestWasm; 2] = [TestWasm::KitchenSink, TestWasm::KitchenSinkLegacy];

    pub fn bytes(&self) -> &'static [u8] {
        match self {
            TestWasm::KitchenSink => include_bytes!(concat!(
                env!("OUT_DIR"),
                "/host_env/wasm32-unknown-unknown/release/test_wasm_kitchen_sink.wasm"
            )),
            TestWasm::KitchenSinkLegacy => include_bytes!(concat!(
                env!("OUT_DIR"),
                "/legacy_env/wasm32-unknown-unknown/release/test_wasm_kitchen_sink.wasm"
            )),
        }
    }

    /// the import family the guest was linked against
    pub fn namespace(&self) -> ImportNamespace {
        match self {
            TestWasm::KitchenSink => ImportNamespace::HostEnv,
            TestWasm::KitchenSinkLegacy => ImportNamespace::Legacy,
        }
    }

    /// instantiate with `manifest`, its namespace replaced by the guest's own
    pub fn plugin(&self, manifest: Manifest) -> Result<Plugin, HostError> {
        Plugin::new(self.bytes(), manifest.with_namespace(self.namespace()))
    }
}
