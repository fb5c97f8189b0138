use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

macro_rules! impl_bytes_type {
    ($iden: ident, $encode: expr, $decode: expr) => {
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $iden(pub Vec<u8>);

        impl $iden {
            pub fn as_slice(&self) -> &[u8] {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            pub fn to_hex(&self) -> String {
                hex::encode(&self.0)
            }
        }

        impl From<Vec<u8>> for $iden {
            fn from(v: Vec<u8>) -> Self {
                Self(v)
            }
        }

        impl From<&[u8]> for $iden {
            fn from(v: &[u8]) -> Self {
                Self(v.to_vec())
            }
        }

        impl From<$iden> for Vec<u8> {
            fn from(v: $iden) -> Vec<u8> {
                v.0
            }
        }

        impl Serialize for $iden {
            fn serialize<S>(
                &self,
                serializer: S,
            ) -> Result<<S as Serializer>::Ok, <S as Serializer>::Error>
            where
                S: Serializer,
            {
                serializer.serialize_str(&$encode(&self.0))
            }
        }

        impl<'de> Deserialize<'de> for $iden {
            fn deserialize<D>(deserializer: D) -> Result<Self, <D as Deserializer<'de>>::Error>
            where
                D: Deserializer<'de>,
            {
                // nil byte slices arrive as null
                let s: Option<String> = Deserialize::deserialize(deserializer)?;
                let Some(s) = s else {
                    return Ok(Self::default());
                };
                Ok(Self(
                    $decode(&s).map_err(|err| serde::de::Error::custom(err.to_string()))?,
                ))
            }
        }
    };
}

fn encode_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

fn decode_base64(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    base64::engine::general_purpose::STANDARD.decode(s)
}

// Hashes, addresses and topics travel hex encoded
impl_bytes_type!(HexVecU8, hex::encode, hex::decode);
// Free-form payloads (data fields, attributes, uris) travel base64 encoded
impl_bytes_type!(Base64VecU8, encode_base64, decode_base64);

impl Base64VecU8 {
    pub fn to_base64(&self) -> String {
        encode_base64(&self.0)
    }

    pub fn as_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }
}

pub fn encode_base64_str(bytes: &[u8]) -> String {
    encode_base64(bytes)
}
