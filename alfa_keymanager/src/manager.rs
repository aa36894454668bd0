//! Kontrakty: KeyFactory, PrivateKeyFactory, KeyManager<P>
//!
//! Implementacje są bezstanowe i współdzielone między wątkami. Cały materiał
//! klucza przechodzi przez argumenty i wartości zwracane.

use crate::codec::Message;
use crate::error::Result;
use crate::key_data::{Key, KeyData, KeyFormat};
use crate::primitive::{Primitive, PrimitiveType};

/// Generowanie nowych kluczy jednego typu
pub trait KeyFactory: Send + Sync {
    /// Generuje nowy losowy klucz zgodny z `key_format`.
    ///
    /// Format jest w pełni walidowany przed losowaniem materiału.
    fn new_key(&self, key_format: KeyFormat<'_>) -> Result<Box<dyn Message>>;

    /// Jak `new_key`, ale zwraca klucz jako KeyData z typem i przeznaczeniem.
    fn new_key_data(&self, serialized_key_format: &[u8]) -> Result<KeyData>;
}

/// Fabryka kluczy prywatnych (schematy asymetryczne)
pub trait PrivateKeyFactory: KeyFactory {
    /// Wyciąga klucz publiczny z zserializowanego klucza prywatnego.
    ///
    /// Deterministyczne, bez losowości. Odrzuca wejście, którego nie da się
    /// zdekodować albo którego materiał jest niespójny z typem.
    fn public_key_data(&self, serialized_private_key: &[u8]) -> Result<KeyData>;
}

/// Manager jednego typu klucza, budujący prymitywy `P`
pub trait KeyManager<P: ?Sized + Primitive>: Send + Sync {
    /// Waliduje klucz i konstruuje prymityw.
    ///
    /// Kolejność: typ klucza, zgodność z `key_type()`, dekodowanie i
    /// walidacja materiału, dopiero potem konstrukcja.
    fn primitive(&self, primitive_type: PrimitiveType, key: Key<'_>) -> Result<Box<P>>;

    fn does_support(&self, key_type: &str) -> bool;

    fn key_type(&self) -> &str;

    fn primitive_type(&self) -> PrimitiveType;

    fn version(&self) -> u32;

    /// `None` dla typów tylko-wyjściowych (klucze publiczne, zdalne)
    fn key_factory(&self) -> Option<&dyn KeyFactory>;

    /// `Some` tylko dla managerów kluczy prywatnych
    fn private_key_factory(&self) -> Option<&dyn PrivateKeyFactory>;
}
