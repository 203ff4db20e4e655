use extism_shim_host::prelude::*;

/// A hand written guest importing every primitive it uses from `module` with `prefix`.
fn guest(namespace: ImportNamespace) -> String {
    let module = namespace.module();
    let p = namespace.prefix();
    format!(
        r#"
(module
  (import "{module}" "{p}input_length" (func $input_length (result i64)))
  (import "{module}" "{p}length" (func $length (param i64) (result i64)))
  (import "{module}" "{p}alloc" (func $alloc (param i64) (result i64)))
  (import "{module}" "{p}input_load_u8" (func $input_load_u8 (param i64) (result i32)))
  (import "{module}" "{p}load_u8" (func $load_u8 (param i64) (result i32)))
  (import "{module}" "{p}load_u64" (func $load_u64 (param i64) (result i64)))
  (import "{module}" "{p}store_u8" (func $store_u8 (param i64 i32)))
  (import "{module}" "{p}output_set" (func $output_set (param i64 i64)))
  (import "{module}" "{p}error_set" (func $error_set (param i64)))
  (import "{module}" "{p}config_get" (func $config_get (param i64) (result i64)))
  (import "{module}" "{p}var_get" (func $var_get (param i64) (result i64)))
  (import "{module}" "{p}var_set" (func $var_set (param i64 i64)))
  (import "{module}" "{p}log_warn" (func $log_warn (param i64)))

  ;; copy the whole input into a fresh block
  (func $copy_input (result i64)
    (local $len i64) (local $handle i64) (local $i i64)
    (local.set $len (call $input_length))
    (local.set $handle (call $alloc (local.get $len)))
    (block $done
      (loop $copy
        (br_if $done (i64.ge_u (local.get $i) (local.get $len)))
        (call $store_u8
          (i64.add (local.get $handle) (local.get $i))
          (call $input_load_u8 (local.get $i)))
        (local.set $i (i64.add (local.get $i) (i64.const 1)))
        (br $copy)))
    (local.get $handle))

  (func (export "echo") (result i32)
    (local $handle i64)
    (local.set $handle (call $copy_input))
    (call $output_set (local.get $handle) (call $length (local.get $handle)))
    (i32.const 0))

  (func (export "shout") (result i32)
    (call $log_warn (call $copy_input))
    (i32.const 0))

  (func (export "fail") (result i32)
    (local $h i64)
    (local.set $h (call $alloc (i64.const 4)))
    (call $store_u8 (local.get $h) (i32.const 0x6e))
    (call $store_u8 (i64.add (local.get $h) (i64.const 1)) (i32.const 0x6f))
    (call $store_u8 (i64.add (local.get $h) (i64.const 2)) (i32.const 0x70))
    (call $store_u8 (i64.add (local.get $h) (i64.const 3)) (i32.const 0x65))
    (call $error_set (local.get $h))
    (i32.const 1))

  (func (export "exit_three") (result i32)
    (i32.const 3))

  (func (export "out_of_bounds") (result i32)
    (drop (call $load_u64 (i64.const -1)))
    (i32.const 0))

  (func (export "count") (result i32)
    (local $key i64) (local $old i64) (local $value i64) (local $n i32)
    (local.set $key (call $alloc (i64.const 1)))
    (call $store_u8 (local.get $key) (i32.const 0x6e))
    (local.set $old (call $var_get (local.get $key)))
    (local.set $n
      (if (result i32) (i64.eqz (local.get $old))
        (then (i32.const 1))
        (else (i32.add (call $load_u8 (local.get $old)) (i32.const 1)))))
    (local.set $value (call $alloc (i64.const 1)))
    (call $store_u8 (local.get $value) (local.get $n))
    (call $var_set (local.get $key) (local.get $value))
    (call $output_set (local.get $value) (i64.const 1))
    (i32.const 0))

  (func (export "greet") (result i32)
    (local $key i64) (local $value i64)
    (local.set $key (call $alloc (i64.const 4)))
    (call $store_u8 (local.get $key) (i32.const 0x6e))
    (call $store_u8 (i64.add (local.get $key) (i64.const 1)) (i32.const 0x61))
    (call $store_u8 (i64.add (local.get $key) (i64.const 2)) (i32.const 0x6d))
    (call $store_u8 (i64.add (local.get $key) (i64.const 3)) (i32.const 0x65))
    (local.set $value (call $config_get (local.get $key)))
    (call $output_set (local.get $value) (call $length (local.get $value)))
    (i32.const 0))
)
"#
    )
}

fn plugin(namespace: ImportNamespace) -> Plugin {
    Plugin::new(
        guest(namespace),
        Manifest::default()
            .with_namespace(namespace)
            .with_config("name", "John"),
    )
    .unwrap()
}

const NAMESPACES: [ImportNamespace; 2] = [ImportNamespace::Legacy, ImportNamespace::HostEnv];

#[test]
fn echo_round_trip() {
    for namespace in NAMESPACES {
        let mut plugin = plugin(namespace);

        assert_eq!(b"hello world!".to_vec(), plugin.call("echo", "hello world!").unwrap());
        assert_eq!(Vec::<u8>::new(), plugin.call("echo", "").unwrap());
    }
}

#[test]
fn guest_error_is_reported() {
    for namespace in NAMESPACES {
        let mut plugin = plugin(namespace);

        match plugin.call("fail", "") {
            Err(HostError::Guest(message)) => assert_eq!("nope", message),
            other => panic!("unexpected {:?}", other),
        }
        // the error does not leak into the next call
        assert_eq!(b"ok".to_vec(), plugin.call("echo", "ok").unwrap());
    }
}

#[test]
fn bare_exit_code() {
    let mut plugin = plugin(ImportNamespace::HostEnv);

    assert!(matches!(plugin.call("exit_three", ""), Err(HostError::ExitCode(3))));
}

#[test]
fn failing_primitive_traps() {
    let mut plugin = plugin(ImportNamespace::HostEnv);

    assert!(matches!(
        plugin.call("out_of_bounds", ""),
        Err(HostError::Runtime(_))
    ));
}

#[test]
fn vars_persist_between_calls() {
    for namespace in NAMESPACES {
        let mut plugin = plugin(namespace);

        assert_eq!(vec![1], plugin.call("count", "").unwrap());
        assert_eq!(vec![2], plugin.call("count", "").unwrap());
        assert_eq!(vec![3], plugin.call("count", "").unwrap());
        assert_eq!(Some(vec![3]), plugin.arena().var("n"));
    }
}

#[test]
fn config_reaches_guest() {
    for namespace in NAMESPACES {
        let mut plugin = plugin(namespace);

        assert_eq!(b"John".to_vec(), plugin.call("greet", "").unwrap());
    }
}

#[test]
fn guest_logs_are_recorded() {
    let mut plugin = plugin(ImportNamespace::Legacy);

    plugin.call("shout", "careful").unwrap();

    assert_eq!(
        vec![(LogLevel::Warn, "careful".to_string())],
        plugin.arena().logs()
    );
}

#[test]
fn call_stats_are_counted() {
    let mut plugin = plugin(ImportNamespace::HostEnv);
    plugin.arena().reset_stats();

    plugin.call("echo", "0123456789").unwrap();

    let stats = plugin.arena().stats();
    assert_eq!(1, stats.input_length);
    assert_eq!(10, stats.input_load_u8);
    assert_eq!(10, stats.store_u8);
    assert_eq!(1, stats.output_set);
}

#[test]
fn missing_export() {
    let mut plugin = plugin(ImportNamespace::HostEnv);

    assert!(plugin.function_exists("echo"));
    assert!(!plugin.function_exists("nope"));
    assert!(matches!(plugin.call("nope", ""), Err(HostError::Export(_))));
}

#[test]
fn namespace_mismatch_fails_to_instantiate() {
    let result = Plugin::new(
        guest(ImportNamespace::Legacy),
        Manifest::default().with_namespace(ImportNamespace::HostEnv),
    );

    assert!(matches!(result, Err(HostError::Instantiate(_))));
}

#[test]
fn memory_limit_traps_alloc() {
    let mut plugin = Plugin::new(
        guest(ImportNamespace::HostEnv),
        Manifest::default().with_memory_max(8),
    )
    .unwrap();

    assert!(matches!(
        plugin.call("echo", "more than eight bytes"),
        Err(HostError::Runtime(_))
    ));
}

#[test]
fn bad_wasm_fails_to_compile() {
    assert!(matches!(
        Plugin::new("(module (func", Manifest::default()),
        Err(HostError::Compile(_))
    ));
}
