//! Właściwości kontraktu wspólne dla wszystkich managerów

use std::sync::{Arc, Once};

use alfa_keymanager::keys::{
    AesGcmKeyFormat, AesGcmKeyManager, Ed25519KeyFormat, Ed25519PrivateKeyManager,
    Ed25519PublicKeyManager, HmacKeyFormat, HmacKeyManager, X25519HybridKeyFormat,
    X25519HybridPrivateKeyManager, X25519HybridPublicKeyManager, XChaCha20Poly1305KeyFormat,
    XChaCha20Poly1305KeyManager,
};
use alfa_keymanager::keys::{Ed25519PrivateKey, X25519HybridPrivateKey};
use alfa_keymanager::{
    templates, Aead, HybridDecrypt, HybridEncrypt, Key, KeyData, KeyFactory, KeyFormat, KeyManager,
    KeyManagerError, KeyMaterialType, KeyProto, Mac, Primitive, PrimitiveType, PrivateKeyFactory,
    PublicKeySign, PublicKeyVerify,
};

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

const FOREIGN_TYPE: &str = "type.example.com/some.other.Key";

fn assert_supports_only_own<P: ?Sized + Primitive>(manager: &dyn KeyManager<P>, all_types: &[String]) {
    let own = manager.key_type();
    assert!(manager.does_support(own));
    for other in all_types.iter().filter(|t| t.as_str() != own) {
        assert!(!manager.does_support(other), "{} claims {}", own, other);
    }
    assert!(!manager.does_support(FOREIGN_TYPE));
    assert!(!manager.does_support(""));
    assert_eq!(manager.version(), 0);
}

#[test]
fn test_does_support_only_own_type() {
    init_tracing();
    let aes = AesGcmKeyManager::key_manager();
    let xchacha = XChaCha20Poly1305KeyManager::key_manager();
    let hmac = HmacKeyManager::key_manager();
    let ed_private = Ed25519PrivateKeyManager::key_manager();
    let ed_public = Ed25519PublicKeyManager::key_manager();
    let hybrid_private = X25519HybridPrivateKeyManager::key_manager();
    let hybrid_public = X25519HybridPublicKeyManager::key_manager();

    let all_types: Vec<String> = [
        aes.key_type(),
        xchacha.key_type(),
        hmac.key_type(),
        ed_private.key_type(),
        ed_public.key_type(),
        hybrid_private.key_type(),
        hybrid_public.key_type(),
    ]
    .iter()
    .map(|t| t.to_string())
    .collect();

    let mut distinct = all_types.clone();
    distinct.sort();
    distinct.dedup();
    assert_eq!(distinct.len(), 7);

    assert_supports_only_own::<dyn Aead>(&aes, &all_types);
    assert_supports_only_own::<dyn Aead>(&xchacha, &all_types);
    assert_supports_only_own::<dyn Mac>(&hmac, &all_types);
    assert_supports_only_own::<dyn PublicKeySign>(&ed_private, &all_types);
    assert_supports_only_own::<dyn PublicKeyVerify>(&ed_public, &all_types);
    assert_supports_only_own::<dyn HybridDecrypt>(&hybrid_private, &all_types);
    assert_supports_only_own::<dyn HybridEncrypt>(&hybrid_public, &all_types);

    assert_eq!(hmac.primitive_type(), PrimitiveType::Mac);
    assert_eq!(hybrid_public.primitive_type(), PrimitiveType::HybridEncrypt);
}

#[test]
fn test_foreign_key_data_unsupported() {
    init_tracing();
    let manager = AesGcmKeyManager::key_manager();
    let data = KeyData::new(FOREIGN_TYPE, vec![1, 2, 3], KeyMaterialType::Symmetric);

    match manager.primitive(PrimitiveType::Aead, Key::Tagged(&data)) {
        Err(KeyManagerError::UnsupportedKeyType { expected, got }) => {
            assert_eq!(expected, manager.key_type());
            assert_eq!(got, FOREIGN_TYPE);
        }
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("foreign key accepted"),
    }
}

#[test]
fn test_typed_key_of_other_type_unsupported() {
    let hmac_key = HmacKeyManager::key_manager()
        .new_typed_key(&HmacKeyFormat::default())
        .unwrap();
    let aes = AesGcmKeyManager::key_manager();
    assert!(matches!(
        aes.primitive(PrimitiveType::Aead, Key::Typed(&hmac_key)),
        Err(KeyManagerError::UnsupportedKeyType { .. })
    ));
}

#[test]
fn test_key_data_roundtrip_reproduces_bytes() {
    let manager = XChaCha20Poly1305KeyManager::key_manager();
    let data = manager
        .new_key_data(&XChaCha20Poly1305KeyFormat::default().encode().unwrap())
        .unwrap();

    let first = manager.primitive(PrimitiveType::Aead, Key::Tagged(&data)).unwrap();
    let ct = first.encrypt(b"payload", b"ad").unwrap();

    let reloaded = KeyData::new(data.type_url.clone(), data.value.clone(), data.key_material_type);
    let second = manager.primitive(PrimitiveType::Aead, Key::Tagged(&reloaded)).unwrap();
    assert_eq!(second.decrypt(&ct, b"ad").unwrap(), b"payload");
}

#[test]
fn test_new_key_encoding_is_stable() {
    let manager = AesGcmKeyManager::key_manager();
    let key = manager.new_key(KeyFormat::Typed(&AesGcmKeyFormat::aes256())).unwrap();
    let bytes = key.encode_to_vec().unwrap();

    let decoded = alfa_keymanager::keys::AesGcmKey::decode(&bytes).unwrap();
    assert_eq!(decoded.encode().unwrap(), bytes);
    assert_eq!(key.type_url(), manager.key_type());
}

#[test]
fn test_malformed_and_truncated_bytes_rejected() {
    init_tracing();
    let manager = HmacKeyManager::key_manager();
    let data = manager
        .new_key_data(&HmacKeyFormat::default().encode().unwrap())
        .unwrap();

    let truncated = KeyData::new(
        data.type_url.clone(),
        data.value[..data.value.len() / 2].to_vec(),
        KeyMaterialType::Symmetric,
    );
    assert!(matches!(
        manager.primitive(PrimitiveType::Mac, Key::Tagged(&truncated)),
        Err(KeyManagerError::InvalidKey(_))
    ));

    let garbage = KeyData::new(data.type_url.clone(), vec![0xff; 40], KeyMaterialType::Symmetric);
    assert!(matches!(
        manager.primitive(PrimitiveType::Mac, Key::Tagged(&garbage)),
        Err(KeyManagerError::InvalidKey(_))
    ));

    assert!(matches!(
        manager.new_key_data(b"{not json"),
        Err(KeyManagerError::Deserialization(_))
    ));
}

#[test]
fn test_wrong_material_type_rejected() {
    let manager = AesGcmKeyManager::key_manager();
    let mut data = manager
        .new_key_data(&AesGcmKeyFormat::aes128().encode().unwrap())
        .unwrap();
    data.key_material_type = KeyMaterialType::AsymmetricPublic;
    assert!(matches!(
        manager.primitive(PrimitiveType::Aead, Key::Tagged(&data)),
        Err(KeyManagerError::InvalidKey(_))
    ));
}

#[test]
fn test_unknown_fields_rejected() {
    let manager = AesGcmKeyManager::key_manager();
    let format = br#"{"key_size":32,"version":0,"extra":true}"#;
    assert!(manager.new_key_data(format).is_err());
}

#[test]
fn test_future_format_version_rejected() {
    init_tracing();
    let aes = AesGcmKeyManager::key_manager();
    assert!(matches!(
        aes.new_key_data(br#"{"key_size":32,"version":1}"#),
        Err(KeyManagerError::InvalidFormat(_))
    ));

    let future = br#"{"version":7}"#;
    assert!(matches!(
        XChaCha20Poly1305KeyManager::key_manager().new_key_data(future),
        Err(KeyManagerError::InvalidFormat(_))
    ));
    assert!(matches!(
        Ed25519PrivateKeyManager::key_manager().new_key_data(future),
        Err(KeyManagerError::InvalidFormat(_))
    ));

    let mut hybrid_format = X25519HybridKeyFormat::default();
    hybrid_format.version = 1;
    assert!(matches!(
        X25519HybridPrivateKeyManager::key_manager().new_key(KeyFormat::Typed(&hybrid_format)),
        Err(KeyManagerError::InvalidFormat(_))
    ));
}

#[test]
fn test_future_private_key_version_is_invalid_key() {
    init_tracing();
    let ed = Ed25519PrivateKeyManager::key_manager();
    let mut ed_key = ed.new_typed_key(&Ed25519KeyFormat::default()).unwrap();
    ed_key.version = 1;
    assert!(matches!(
        ed.public_key_data(&ed_key.encode().unwrap()),
        Err(KeyManagerError::InvalidKey(_))
    ));
    assert!(matches!(
        ed.primitive(PrimitiveType::PublicKeySign, Key::Typed(&ed_key)),
        Err(KeyManagerError::InvalidKey(_))
    ));

    let hybrid = X25519HybridPrivateKeyManager::key_manager();
    let mut hybrid_key = hybrid.new_typed_key(&X25519HybridKeyFormat::default()).unwrap();
    hybrid_key.public_key.version = 2;
    let serialized = hybrid_key.encode().unwrap();
    assert!(matches!(
        hybrid.public_key_data(&serialized),
        Err(KeyManagerError::InvalidKey(_))
    ));

    let decoded = X25519HybridPrivateKey::decode(&serialized).unwrap();
    assert_eq!(decoded.public_key.version, 2);
    let ed_decoded = Ed25519PrivateKey::decode(&ed_key.encode().unwrap()).unwrap();
    assert_eq!(ed_decoded.version, 1);
}

#[test]
fn test_factory_availability() {
    assert!(AesGcmKeyManager::key_manager().key_factory().is_some());
    assert!(AesGcmKeyManager::key_manager().private_key_factory().is_none());
    assert!(Ed25519PrivateKeyManager::key_manager().private_key_factory().is_some());
    assert!(Ed25519PublicKeyManager::key_manager().key_factory().is_none());
    assert!(X25519HybridPublicKeyManager::key_manager().key_factory().is_none());
}

#[test]
fn test_new_key_and_new_key_data_agree() {
    let manager = Ed25519PrivateKeyManager::key_manager();
    let format = Ed25519KeyFormat::default();

    let typed = manager.new_key(KeyFormat::Typed(&format)).unwrap();
    let data = manager.new_key_data(&format.encode().unwrap()).unwrap();
    assert_eq!(typed.type_url(), data.type_url);
    assert_eq!(data.key_material_type, KeyMaterialType::AsymmetricPrivate);
}

#[test]
fn test_sign_verify_across_managers() {
    let private_manager = Ed25519PrivateKeyManager::key_manager();
    let template = templates::ed25519().unwrap();
    let private_data = private_manager.new_key_data(&template.value).unwrap();
    let factory = private_manager.private_key_factory().unwrap();
    let public_data = factory.public_key_data(&private_data.value).unwrap();

    let signer: Box<dyn PublicKeySign> = private_manager
        .primitive(PrimitiveType::PublicKeySign, Key::Tagged(&private_data))
        .unwrap();
    let verifier: Box<dyn PublicKeyVerify> = Ed25519PublicKeyManager::key_manager()
        .primitive(PrimitiveType::PublicKeyVerify, Key::Tagged(&public_data))
        .unwrap();

    let sig = signer.sign(b"ALFA").unwrap();
    verifier.verify(&sig, b"ALFA").unwrap();
    assert!(matches!(
        verifier.verify(&sig, b"ALFB"),
        Err(KeyManagerError::AuthFailed)
    ));

    // klucz prywatny nie przejdzie przez managera kluczy publicznych
    assert!(Ed25519PublicKeyManager::key_manager()
        .primitive(PrimitiveType::PublicKeyVerify, Key::Tagged(&private_data))
        .is_err());
}

#[test]
fn test_hybrid_across_managers() {
    let private_manager = X25519HybridPrivateKeyManager::key_manager();
    let format = X25519HybridKeyFormat::default();
    let private_data = private_manager.new_key_data(&format.encode().unwrap()).unwrap();
    let public_data = private_manager
        .private_key_factory()
        .unwrap()
        .public_key_data(&private_data.value)
        .unwrap();

    let enc = X25519HybridPublicKeyManager::key_manager()
        .primitive(PrimitiveType::HybridEncrypt, Key::Tagged(&public_data))
        .unwrap();
    let dec = private_manager
        .primitive(PrimitiveType::HybridDecrypt, Key::Tagged(&private_data))
        .unwrap();

    let ct = enc.encrypt(b"tajne", b"ctx").unwrap();
    assert_eq!(dec.decrypt(&ct, b"ctx").unwrap(), b"tajne");
    assert!(matches!(dec.decrypt(&ct[..40], b"ctx"), Err(KeyManagerError::AuthFailed)));
}

#[test]
fn test_hmac_known_tag_via_key_data() {
    // RFC 4231, przypadek 1 (klucz 20 B)
    let key = alfa_keymanager::keys::HmacKey {
        version: 0,
        params: alfa_keymanager::keys::HmacParams::new(alfa_keymanager::keys::HashType::Sha256, 32),
        key_value: vec![0x0b; 20],
    };
    let data = KeyData::from_message(&key, KeyMaterialType::Symmetric).unwrap();
    let mac: Box<dyn Mac> = HmacKeyManager::key_manager()
        .primitive(PrimitiveType::Mac, Key::Tagged(&data))
        .unwrap();
    assert_eq!(
        hex::encode(mac.compute_mac(b"Hi There").unwrap()),
        "b0344c61d8db38535ca8afceaf0bf12b881dc200c9833da726e9376c2e32cff7"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_use_of_one_manager() {
    init_tracing();
    let manager = Arc::new(AesGcmKeyManager::key_manager());
    let data = Arc::new(
        manager
            .new_key_data(&templates::aes256_gcm().unwrap().value)
            .unwrap(),
    );

    let mut handles = Vec::new();
    for i in 0..16u8 {
        let manager = Arc::clone(&manager);
        let data = Arc::clone(&data);
        handles.push(tokio::spawn(async move {
            let aead: Box<dyn Aead> = manager
                .primitive(PrimitiveType::Aead, Key::Tagged(data.as_ref()))
                .unwrap();
            let ct = aead.encrypt(&[i; 32], &[i]).unwrap();
            assert_eq!(aead.decrypt(&ct, &[i]).unwrap(), vec![i; 32]);

            let fresh = manager
                .new_key_data(&AesGcmKeyFormat::aes128().encode().unwrap())
                .unwrap();
            fresh.value.clone()
        }));
    }

    let mut generated = Vec::new();
    for handle in handles {
        generated.push(handle.await.unwrap());
    }
    generated.sort();
    generated.dedup();
    assert_eq!(generated.len(), 16);
}
