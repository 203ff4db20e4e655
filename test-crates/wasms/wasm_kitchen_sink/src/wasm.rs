use extism_shim_guest::block::byte_len;
use extism_shim_guest::prelude::*;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct VowelCount {
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Concat {
    pub parts: Vec<String>,
    #[serde(default)]
    pub separator: String,
}

pub fn count_vowels<H: HostPrimitives>(pdk: &Pdk<H>) -> Result<i32, ShimError> {
    let count = pdk
        .input_string()?
        .chars()
        .filter(|c| "aeiouAEIOU".contains(*c))
        .count();
    pdk.set_output_json(&VowelCount { count })?;
    Ok(0)
}

/// input length as a little endian u64, read through the word aligned path
pub fn len<H: HostPrimitives>(pdk: &Pdk<H>) -> Result<i32, ShimError> {
    let input = pdk.input_words()?;
    pdk.set_output(&(input.len() as u64).to_le_bytes());
    Ok(0)
}

pub fn concat<H: HostPrimitives>(pdk: &Pdk<H>) -> Result<i32, ShimError> {
    let concat: Concat = pdk.input_json()?;
    pdk.set_output_string(&concat.parts.join(&concat.separator));
    Ok(0)
}

/// bumps a counter kept in a var and outputs the new value
pub fn counter<H: HostPrimitives>(pdk: &Pdk<H>) -> Result<i32, ShimError> {
    let count = match pdk.var_bytes("count")? {
        Some(bytes) => {
            let bytes: [u8; 4] = bytes
                .try_into()
                .map_err(|_| ShimError::plugin("count var is not 4 bytes"))?;
            u32::from_le_bytes(bytes) + 1
        }
        None => 1,
    };
    pdk.set_var("count", &count.to_le_bytes());
    pdk.set_output_string(&count.to_string());
    Ok(0)
}

pub fn greeter<H: HostPrimitives>(pdk: &Pdk<H>) -> Result<i32, ShimError> {
    let name = pdk
        .config("name")?
        .ok_or_else(|| ShimError::plugin("Expected 'name' in the configs."))?;
    pdk.log(LogLevel::Info, &format!("greeting {}", name));
    pdk.set_output_string(&format!("Hello, {}!", name));
    Ok(0)
}

pub fn throw<H: HostPrimitives>(pdk: &Pdk<H>) -> Result<i32, ShimError> {
    let input = pdk.input_string()?;
    if input.is_empty() {
        panic!("nothing to throw");
    }
    Err(ShimError::plugin(input))
}

/// echoes the input, reaching the host only through internal calls looked up by name
pub fn bridged<H: HostPrimitives>(
    calls: &CallRegistry<H>,
    pdk: &Pdk<H>,
) -> Result<i32, ShimError> {
    let len = match calls.dispatch(pdk.host(), "extism_input_length", &mut [])? {
        Ret::U64(len) => byte_len(len)?,
        other => {
            return Err(ShimError::plugin(format!(
                "input length came back as {:?}",
                other
            )))
        }
    };
    let mut input = vec![0; len];
    calls.dispatch(pdk.host(), "extism_load_input", &mut [Arg::BytesMut(&mut input)])?;
    pdk.set_output(&input);
    Ok(0)
}

#[cfg(target_arch = "wasm32")]
fn bridged_export(pdk: &Pdk<WasmHost>) -> Result<i32, ShimError> {
    if !RUNTIME.is_initialized() {
        return Err(ShimError::plugin("runtime not initialized"));
    }
    bridged(extism_shim_guest::bridge::bridge(), pdk)
}

plugin_fn!(
    count_vowels => count_vowels,
    len => len,
    concat => concat,
    counter => counter,
    greeter => greeter,
    throw => throw,
    bridged => bridged_export,
);
