//! Kodowanie wiadomości kluczy i formatów (kanoniczny JSON)

use std::any::Any;
use std::fmt;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{KeyManagerError, Result};

/// Schemat wiadomości (klucz lub format klucza) z globalnym identyfikatorem
pub trait KeyProto:
    Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static
{
    /// Globalna nazwa schematu
    const TYPE_URL: &'static str;

    fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| KeyManagerError::Serialization(e.to_string()))
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| {
            KeyManagerError::Deserialization(format!("{}: {}", Self::TYPE_URL, e))
        })
    }
}

/// Wiadomość z wymazanym typem - forma "typed" na granicy API
pub trait Message: fmt::Debug + Send + Sync {
    fn type_url(&self) -> &'static str;
    fn encode_to_vec(&self) -> Result<Vec<u8>>;
    fn as_any(&self) -> &dyn Any;
}

impl<T: KeyProto> Message for T {
    fn type_url(&self) -> &'static str {
        T::TYPE_URL
    }

    fn encode_to_vec(&self) -> Result<Vec<u8>> {
        self.encode()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<'a> dyn Message + 'a {
    pub fn downcast_ref<T: KeyProto>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn is<T: KeyProto>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

/// Pola bajtowe jako base64 (STANDARD)
pub(crate) mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Probe {
        version: u32,
        #[serde(with = "base64_bytes")]
        value: Vec<u8>,
    }

    impl KeyProto for Probe {
        const TYPE_URL: &'static str = "type.alfa.dev/test.Probe";
    }

    #[test]
    fn test_bytes_as_base64() {
        let probe = Probe { version: 0, value: vec![0xde, 0xad, 0xbe, 0xef] };
        let encoded = probe.encode().unwrap();
        assert_eq!(
            std::str::from_utf8(&encoded).unwrap(),
            r#"{"version":0,"value":"3q2+7w=="}"#
        );
        assert_eq!(Probe::decode(&encoded).unwrap(), probe);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let err = Probe::decode(br#"{"version":0,"value":"","extra":1}"#).unwrap_err();
        assert!(matches!(err, KeyManagerError::Deserialization(_)));
    }

    #[test]
    fn test_bad_base64_rejected() {
        assert!(Probe::decode(br#"{"version":0,"value":"!!!"}"#).is_err());
    }

    #[test]
    fn test_message_downcast() {
        let probe = Probe { version: 1, value: vec![1] };
        let msg: &dyn Message = &probe;
        assert_eq!(msg.type_url(), Probe::TYPE_URL);
        assert!(msg.is::<Probe>());
        assert_eq!(msg.downcast_ref::<Probe>(), Some(&probe));
    }
}
