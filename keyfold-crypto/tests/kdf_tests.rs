use keyfold_crypto::{
    derive_master_key, derive_subkeys, CryptoError, KdfParams, Salt, KEY_SIZE, SALT_SIZE,
};

#[test]
fn production_params_are_deterministic() {
    // {memory: 65536 KiB, iterations: 3, parallelism: 4, output: 32}
    let params = KdfParams::default();
    assert_eq!(params.memory_kib, 65536);
    assert_eq!(params.iterations, 3);
    assert_eq!(params.parallelism, 4);
    assert_eq!(params.output_len, KEY_SIZE);

    let salt = Salt::from_bytes(*b"fixed-salt-16byt");

    let k1 = derive_master_key("CorrectHorse1!", &salt, &params).unwrap();
    let k2 = derive_master_key("CorrectHorse1!", &salt, &params).unwrap();

    assert_eq!(k1.as_bytes().len(), KEY_SIZE);
    assert_eq!(k1.as_bytes(), k2.as_bytes());
}

#[test]
fn memory_below_floor_is_config_error() {
    let params = KdfParams {
        memory_kib: 4096,
        ..KdfParams::default()
    };
    let salt = Salt::from_bytes([0u8; SALT_SIZE]);
    assert!(matches!(
        derive_master_key("pw", &salt, &params),
        Err(CryptoError::Config(_))
    ));
}

#[test]
fn subkeys_from_derived_master_are_stable() {
    let params = KdfParams {
        memory_kib: 8192,
        iterations: 1,
        parallelism: 1,
        ..KdfParams::default()
    };
    let salt = Salt::from_bytes([3u8; SALT_SIZE]);

    let master = derive_master_key("pw", &salt, &params).unwrap();
    let a = derive_subkeys(&master);
    let b = derive_subkeys(&master);

    assert_eq!(a.encryption.as_bytes(), b.encryption.as_bytes());
    assert_eq!(a.mac.as_bytes(), b.mac.as_bytes());
    assert_ne!(a.encryption.as_bytes(), a.mac.as_bytes());
}
