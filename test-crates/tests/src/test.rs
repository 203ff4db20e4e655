pub mod wasms;

#[cfg(test)]
pub mod tests {
    use crate::wasms::TestWasm;
    use extism_shim_host::prelude::*;

    fn plugin(wasm: TestWasm) -> Plugin {
        wasm.plugin(Manifest::default()).unwrap()
    }

    #[test]
    fn count_vowels() {
        for wasm in TestWasm::ALL {
            let mut plugin = plugin(wasm);
            assert!(plugin.function_exists("count_vowels"));

            assert_eq!(
                br#"{"count":3}"#.to_vec(),
                plugin.call("count_vowels", "Hello World!").unwrap()
            );
            assert_eq!(
                br#"{"count":0}"#.to_vec(),
                plugin.call("count_vowels", "").unwrap()
            );
        }
    }

    #[test]
    fn len_takes_word_path() {
        for wasm in TestWasm::ALL {
            let mut plugin = plugin(wasm);
            plugin.arena().reset_stats();

            assert_eq!(
                13_u64.to_le_bytes().to_vec(),
                plugin.call("len", "0123456789abc").unwrap()
            );

            // one word and five tail bytes in, one word out
            let stats = plugin.arena().stats();
            assert_eq!(1, stats.get(HostFn::InputLoadU64));
            assert_eq!(5, stats.get(HostFn::InputLoadU8));
            assert_eq!(1, stats.get(HostFn::StoreU64));
            assert_eq!(0, stats.get(HostFn::StoreU8));
        }
    }

    #[test]
    fn concat_json() {
        for wasm in TestWasm::ALL {
            let mut plugin = plugin(wasm);

            assert_eq!(
                b"hello, world!".to_vec(),
                plugin
                    .call("concat", r#"{"parts":["hello","world!"],"separator":", "}"#)
                    .unwrap()
            );
        }
    }

    #[test]
    fn counter_keeps_var_between_calls() {
        for wasm in TestWasm::ALL {
            let mut plugin = plugin(wasm);

            for expected in ["1", "2", "3"] {
                assert_eq!(
                    expected.as_bytes().to_vec(),
                    plugin.call("counter", "").unwrap()
                );
            }
            assert_eq!(Some(3_u32.to_le_bytes().to_vec()), plugin.arena().var("count"));
        }
    }

    #[test]
    fn greeter_reads_config_and_logs() {
        for wasm in TestWasm::ALL {
            let mut plugin = wasm
                .plugin(Manifest::default().with_config("name", "Benjamin"))
                .unwrap();

            assert_eq!(
                b"Hello, Benjamin!".to_vec(),
                plugin.call("greeter", "").unwrap()
            );
            assert_eq!(
                vec![(LogLevel::Info, "greeting Benjamin".to_string())],
                plugin.arena().logs()
            );
        }
    }

    #[test]
    fn missing_config_is_guest_error() {
        for wasm in TestWasm::ALL {
            let mut plugin = plugin(wasm);

            match plugin.call("greeter", "") {
                Err(HostError::Guest(message)) => {
                    assert_eq!("Expected 'name' in the configs.", message)
                }
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn throw_sets_error() {
        for wasm in TestWasm::ALL {
            let mut plugin = plugin(wasm);

            match plugin.call("throw", "oh no!") {
                Err(HostError::Guest(message)) => assert_eq!("oh no!", message),
                other => panic!("unexpected {:?}", other),
            }
            // the error is scoped to the failing call
            assert_eq!(
                br#"{"count":2}"#.to_vec(),
                plugin.call("count_vowels", "oh no!").unwrap()
            );
        }
    }

    #[test]
    fn panic_traps_the_guest() {
        for wasm in TestWasm::ALL {
            let mut plugin = plugin(wasm);

            assert!(plugin.call("throw", "").is_err());
        }
    }

    #[test]
    fn bridge_is_ready_on_first_call() {
        for wasm in TestWasm::ALL {
            let mut plugin = plugin(wasm);

            assert_eq!(
                b"through the bridge".to_vec(),
                plugin.call("bridged", "through the bridge").unwrap()
            );
            assert_eq!(b"again".to_vec(), plugin.call("bridged", "again").unwrap());
        }
    }

    #[test]
    fn wrong_namespace_fails_to_instantiate() {
        for wasm in TestWasm::ALL {
            let other = match wasm.namespace() {
                ImportNamespace::HostEnv => ImportNamespace::Legacy,
                ImportNamespace::Legacy => ImportNamespace::HostEnv,
            };
            let result = Plugin::new(wasm.bytes(), Manifest::default().with_namespace(other));

            assert!(matches!(result, Err(HostError::Instantiate(_))));
        }
    }
}
