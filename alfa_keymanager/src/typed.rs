//! Typowana warstwa managerów i adaptery do kontraktów z wymazanym typem
//!
//! Każdy typ klucza implementuje [`KeyTypeManager`] (i opcjonalnie
//! [`KeyTypeFactory`] / [`PrivateKeyTypeManager`]). Adaptery
//! [`OutputOnlyKeyManager`], [`KeyManagerImpl`] i [`PrivateKeyManagerImpl`]
//! wystawiają go jako `KeyManager<P>` z jedną ścieżką walidacji i jedną
//! ścieżką generowania.

use crate::codec::{KeyProto, Message};
use crate::error::{KeyManagerError, Result};
use crate::key_data::{Key, KeyData, KeyFormat, KeyMaterialType};
use crate::manager::{KeyFactory, KeyManager, PrivateKeyFactory};
use crate::primitive::{Primitive, PrimitiveType};

/// Typ klucza: walidacja materiału i budowa prymitywu
pub trait KeyTypeManager: Send + Sync + 'static {
    type Key: KeyProto;
    type Primitive: ?Sized + Primitive;

    /// Najwyższa wersja klucza obsługiwana przez managera
    const VERSION: u32;
    const MATERIAL_TYPE: KeyMaterialType;

    fn validate_key(&self, key: &Self::Key) -> Result<()>;
    fn create_primitive(&self, key: &Self::Key) -> Result<Box<Self::Primitive>>;
}

/// Typ klucza z lokalnym generowaniem
pub trait KeyTypeFactory: KeyTypeManager {
    type Format: KeyProto;

    fn validate_format(&self, format: &Self::Format) -> Result<()>;
    /// Wywoływane wyłącznie ze zwalidowanym formatem
    fn create_key(&self, format: &Self::Format) -> Result<Self::Key>;
}

/// Typ klucza prywatnego z kluczem publicznym
pub trait PrivateKeyTypeManager: KeyTypeFactory {
    type PublicKey: KeyProto;

    /// Wywoływane wyłącznie ze zwalidowanym kluczem prywatnym
    fn public_key(&self, private_key: &Self::Key) -> Result<Self::PublicKey>;
}

/// Odrzuca klucze nowsze niż manager
pub fn validate_version(candidate: u32, max_expected: u32) -> Result<()> {
    if candidate > max_expected {
        return Err(KeyManagerError::UnsupportedVersion {
            supported: max_expected,
            got: candidate,
        });
    }
    Ok(())
}

/// Walidacja materiału; zbyt nowa wersja to na tej granicy zwykły `InvalidKey`
fn check_key<M: KeyTypeManager>(manager: &M, key: &M::Key) -> Result<()> {
    manager.validate_key(key).map_err(|e| match e {
        KeyManagerError::UnsupportedVersion { .. } => KeyManagerError::InvalidKey(e.to_string()),
        other => other,
    })
}

/// Normalizuje klucz (typowany lub KeyData) do struktury i waliduje go
fn resolve_key<M: KeyTypeManager>(manager: &M, key: Key<'_>) -> Result<M::Key> {
    let expected = <M::Key as KeyProto>::TYPE_URL;
    let got = key.type_url();
    if got != expected {
        tracing::warn!("Key type mismatch: expected {}, got {}", expected, got);
        return Err(KeyManagerError::UnsupportedKeyType {
            expected: expected.to_string(),
            got: got.to_string(),
        });
    }

    let parsed = match key {
        Key::Typed(message) => message.downcast_ref::<M::Key>().cloned().ok_or_else(|| {
            KeyManagerError::InvalidKey(format!("typed key is not a {}", expected))
        })?,
        Key::Tagged(key_data) => {
            if key_data.key_material_type != M::MATERIAL_TYPE {
                tracing::warn!(
                    "Rejected {}: material type {} (expected {})",
                    expected,
                    key_data.key_material_type.as_str(),
                    M::MATERIAL_TYPE.as_str()
                );
                return Err(KeyManagerError::InvalidKey(format!(
                    "key material type {} does not match {}",
                    key_data.key_material_type.as_str(),
                    M::MATERIAL_TYPE.as_str()
                )));
            }
            <M::Key as KeyProto>::decode(&key_data.value)
                .map_err(|e| KeyManagerError::InvalidKey(e.to_string()))?
        }
    };

    if let Err(e) = check_key(manager, &parsed) {
        tracing::warn!("Rejected {}: {}", expected, e);
        return Err(e);
    }
    Ok(parsed)
}

fn build_primitive<M: KeyTypeManager>(
    manager: &M,
    requested: PrimitiveType,
    key: Key<'_>,
) -> Result<Box<M::Primitive>> {
    let key = resolve_key(manager, key)?;

    let supported = <M::Primitive as Primitive>::PRIMITIVE_TYPE;
    if requested != supported {
        return Err(KeyManagerError::UnsupportedPrimitive { supported, requested });
    }

    let primitive = manager.create_primitive(&key)?;
    tracing::debug!("Constructed {} primitive for {}", supported, <M::Key as KeyProto>::TYPE_URL);
    Ok(primitive)
}

/// Jedyna ścieżka generowania - `new_key_data` też przez nią przechodzi
fn generate<M: KeyTypeFactory>(manager: &M, key_format: KeyFormat<'_>) -> Result<M::Key> {
    let expected = <M::Format as KeyProto>::TYPE_URL;
    let format = match key_format {
        KeyFormat::Typed(message) => {
            if message.type_url() != expected {
                return Err(KeyManagerError::InvalidFormat(format!(
                    "expected {}, got {}",
                    expected,
                    message.type_url()
                )));
            }
            message
                .downcast_ref::<M::Format>()
                .cloned()
                .ok_or_else(|| KeyManagerError::InvalidFormat(format!("not a {}", expected)))?
        }
        KeyFormat::Serialized(bytes) => <M::Format as KeyProto>::decode(bytes)?,
    };

    if let Err(e) = manager.validate_format(&format) {
        tracing::warn!("Rejected key format {}: {}", expected, e);
        return Err(e);
    }

    let key = manager.create_key(&format)?;
    check_key(manager, &key)?;
    tracing::debug!("Generated new {} key", <M::Key as KeyProto>::TYPE_URL);
    Ok(key)
}

fn generate_key_data<M: KeyTypeFactory>(manager: &M, serialized_key_format: &[u8]) -> Result<KeyData> {
    let key = generate(manager, KeyFormat::Serialized(serialized_key_format))?;
    KeyData::from_message(&key, M::MATERIAL_TYPE)
}

/// Wspólna część `KeyManager<P>` dla adapterów; akcesory fabryk podaje wywołujący
macro_rules! key_manager_impl {
    ($adapter:ident<M: $bound:ident> { $($factories:tt)* }) => {
        impl<M: $bound> KeyManager<M::Primitive> for $adapter<M> {
            fn primitive(
                &self,
                primitive_type: PrimitiveType,
                key: Key<'_>,
            ) -> Result<Box<M::Primitive>> {
                build_primitive(&self.manager, primitive_type, key)
            }

            fn does_support(&self, key_type: &str) -> bool {
                key_type == <M::Key as KeyProto>::TYPE_URL
            }

            fn key_type(&self) -> &str {
                <M::Key as KeyProto>::TYPE_URL
            }

            fn primitive_type(&self) -> PrimitiveType {
                <M::Primitive as Primitive>::PRIMITIVE_TYPE
            }

            fn version(&self) -> u32 {
                M::VERSION
            }

            $($factories)*
        }
    };
}

/// Manager bez lokalnego generowania (np. klucze publiczne)
pub struct OutputOnlyKeyManager<M: KeyTypeManager> {
    manager: M,
}

impl<M: KeyTypeManager> OutputOnlyKeyManager<M> {
    pub fn new(manager: M) -> Self {
        Self { manager }
    }

    pub fn inner(&self) -> &M {
        &self.manager
    }
}

key_manager_impl!(OutputOnlyKeyManager<M: KeyTypeManager> {
    fn key_factory(&self) -> Option<&dyn KeyFactory> {
        None
    }

    fn private_key_factory(&self) -> Option<&dyn PrivateKeyFactory> {
        None
    }
});

/// Manager z fabryką kluczy (klucze symetryczne)
pub struct KeyManagerImpl<M: KeyTypeFactory> {
    manager: M,
}

impl<M: KeyTypeFactory> KeyManagerImpl<M> {
    pub fn new(manager: M) -> Self {
        Self { manager }
    }

    pub fn inner(&self) -> &M {
        &self.manager
    }

    /// Generowanie bez wymazywania typu
    pub fn new_typed_key(&self, format: &M::Format) -> Result<M::Key> {
        generate(&self.manager, KeyFormat::Typed(format))
    }
}

impl<M: KeyTypeFactory> KeyFactory for KeyManagerImpl<M> {
    fn new_key(&self, key_format: KeyFormat<'_>) -> Result<Box<dyn Message>> {
        Ok(Box::new(generate(&self.manager, key_format)?))
    }

    fn new_key_data(&self, serialized_key_format: &[u8]) -> Result<KeyData> {
        generate_key_data(&self.manager, serialized_key_format)
    }
}

key_manager_impl!(KeyManagerImpl<M: KeyTypeFactory> {
    fn key_factory(&self) -> Option<&dyn KeyFactory> {
        Some(self)
    }

    fn private_key_factory(&self) -> Option<&dyn PrivateKeyFactory> {
        None
    }
});

/// Manager kluczy prywatnych z PrivateKeyFactory
pub struct PrivateKeyManagerImpl<M: PrivateKeyTypeManager> {
    manager: M,
}

impl<M: PrivateKeyTypeManager> PrivateKeyManagerImpl<M> {
    pub fn new(manager: M) -> Self {
        Self { manager }
    }

    pub fn inner(&self) -> &M {
        &self.manager
    }

    pub fn new_typed_key(&self, format: &M::Format) -> Result<M::Key> {
        generate(&self.manager, KeyFormat::Typed(format))
    }

    /// Klucz publiczny bez wymazywania typu
    pub fn typed_public_key(&self, private_key: &M::Key) -> Result<M::PublicKey> {
        check_key(&self.manager, private_key)?;
        self.manager.public_key(private_key)
    }
}

impl<M: PrivateKeyTypeManager> KeyFactory for PrivateKeyManagerImpl<M> {
    fn new_key(&self, key_format: KeyFormat<'_>) -> Result<Box<dyn Message>> {
        Ok(Box::new(generate(&self.manager, key_format)?))
    }

    fn new_key_data(&self, serialized_key_format: &[u8]) -> Result<KeyData> {
        generate_key_data(&self.manager, serialized_key_format)
    }
}

impl<M: PrivateKeyTypeManager> PrivateKeyFactory for PrivateKeyManagerImpl<M> {
    fn public_key_data(&self, serialized_private_key: &[u8]) -> Result<KeyData> {
        let type_url = <M::Key as KeyProto>::TYPE_URL;
        let private_key = <M::Key as KeyProto>::decode(serialized_private_key)
            .map_err(|e| KeyManagerError::InvalidKey(e.to_string()))?;

        if let Err(e) = check_key(&self.manager, &private_key) {
            tracing::warn!("Rejected {} for public key extraction: {}", type_url, e);
            return Err(e);
        }

        let public_key = self.manager.public_key(&private_key)?;
        KeyData::from_message(&public_key, KeyMaterialType::AsymmetricPublic)
    }
}

key_manager_impl!(PrivateKeyManagerImpl<M: PrivateKeyTypeManager> {
    fn key_factory(&self) -> Option<&dyn KeyFactory> {
        Some(self)
    }

    fn private_key_factory(&self) -> Option<&dyn PrivateKeyFactory> {
        Some(self)
    }
});
