use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use keyfold_crypto::{cipher, CryptoError, EncryptionKey, KEY_SIZE};

fn key() -> EncryptionKey {
    EncryptionKey::from_bytes([0x42u8; KEY_SIZE])
}

fn other_key() -> EncryptionKey {
    EncryptionKey::from_bytes([0x43u8; KEY_SIZE])
}

#[test]
fn encrypt_decrypt_roundtrip() {
    let blob = cipher::encrypt(&key(), b"attack at dawn").unwrap();
    let plaintext = cipher::decrypt(&key(), &blob).unwrap();
    assert_eq!(plaintext, b"attack at dawn");
}

#[test]
fn empty_plaintext_roundtrip() {
    let blob = cipher::encrypt(&key(), b"").unwrap();
    assert_eq!(cipher::decrypt(&key(), &blob).unwrap(), b"");
}

#[test]
fn large_plaintext_roundtrip() {
    let data = vec![0xCDu8; 1 << 16];
    let blob = cipher::encrypt(&key(), &data).unwrap();
    assert_eq!(cipher::decrypt(&key(), &blob).unwrap(), data);
}

#[test]
fn wrong_key_fails_authentication() {
    let blob = cipher::encrypt(&key(), b"secret").unwrap();
    assert!(matches!(
        cipher::decrypt(&other_key(), &blob),
        Err(CryptoError::Authentication)
    ));
}

#[test]
fn fresh_nonce_per_call() {
    let a = cipher::encrypt(&key(), b"same plaintext").unwrap();
    let b = cipher::encrypt(&key(), b"same plaintext").unwrap();
    assert_ne!(a, b);
    // Both still decrypt back to the original
    assert_eq!(cipher::decrypt(&key(), &a).unwrap(), b"same plaintext");
    assert_eq!(cipher::decrypt(&key(), &b).unwrap(), b"same plaintext");
}

#[test]
fn every_payload_bit_flip_is_detected() {
    let blob = cipher::encrypt(&key(), b"hi").unwrap();
    let packed = URL_SAFE_NO_PAD.decode(&blob).unwrap();

    // Skip the 2-byte version header — flips there are version rejections,
    // covered separately below.
    for byte_index in 2..packed.len() {
        for bit in 0..8 {
            let mut corrupted = packed.clone();
            corrupted[byte_index] ^= 1 << bit;
            let reencoded = URL_SAFE_NO_PAD.encode(&corrupted);
            assert!(
                matches!(
                    cipher::decrypt(&key(), &reencoded),
                    Err(CryptoError::Authentication)
                ),
                "flip of bit {bit} in byte {byte_index} went undetected"
            );
        }
    }
}

#[test]
fn corrupting_last_byte_raises_authentication() {
    let blob = cipher::encrypt(&key(), b"hello").unwrap();
    let mut packed = URL_SAFE_NO_PAD.decode(&blob).unwrap();
    *packed.last_mut().unwrap() ^= 0xFF;
    let corrupted = URL_SAFE_NO_PAD.encode(&packed);

    assert!(matches!(
        cipher::decrypt(&key(), &corrupted),
        Err(CryptoError::Authentication)
    ));
}

#[test]
fn unsupported_version_refused_before_decryption() {
    // Take a valid blob and rewrite only the version field; the ciphertext
    // portion stays well-formed.
    let blob = cipher::encrypt(&key(), b"payload").unwrap();
    let mut packed = URL_SAFE_NO_PAD.decode(&blob).unwrap();
    packed[0..2].copy_from_slice(&7u16.to_be_bytes());
    let versioned = URL_SAFE_NO_PAD.encode(&packed);

    assert!(matches!(
        cipher::decrypt(&key(), &versioned),
        Err(CryptoError::UnsupportedVersion(7))
    ));
}

#[test]
fn invalid_base64_is_malformed() {
    assert!(matches!(
        cipher::decrypt(&key(), "not!base64url%"),
        Err(CryptoError::Malformed(_))
    ));
}

#[test]
fn truncated_blob_is_malformed() {
    // Version header alone, no nonce or tag
    let short = URL_SAFE_NO_PAD.encode(1u16.to_be_bytes());
    assert!(matches!(
        cipher::decrypt(&key(), &short),
        Err(CryptoError::Malformed(_))
    ));

    let single_byte = URL_SAFE_NO_PAD.encode([0u8]);
    assert!(matches!(
        cipher::decrypt(&key(), &single_byte),
        Err(CryptoError::Malformed(_))
    ));
}

#[test]
fn wire_layout_is_version_nonce_payload() {
    let blob = cipher::encrypt(&key(), b"xyz").unwrap();
    let packed = URL_SAFE_NO_PAD.decode(&blob).unwrap();

    assert_eq!(&packed[0..2], &cipher::BLOB_VERSION.to_be_bytes());
    assert_eq!(
        packed.len(),
        2 + cipher::NONCE_SIZE + 3 + cipher::TAG_SIZE
    );
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn roundtrip_always_recovers_plaintext(
            plaintext in proptest::collection::vec(any::<u8>(), 0..512),
            key_bytes in any::<[u8; 32]>(),
        ) {
            let key = EncryptionKey::from_bytes(key_bytes);
            let blob = cipher::encrypt(&key, &plaintext).unwrap();
            prop_assert_eq!(cipher::decrypt(&key, &blob).unwrap(), plaintext);
        }
    }
}
