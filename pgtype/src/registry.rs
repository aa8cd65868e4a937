//! Codec lookup by type oid.
//!
//! The query layer only knows the oid and format of a column or parameter,
//! [`Registry`] dispatch it to the typed value codec and hand back a [`Value`].
//!
//! # Example
//!
//! ```
//! use pgtype::{Registry, Value, postgres::{PgFormat, oid}, types::Int4Array};
//!
//! let registry = Registry::new();
//! let value = registry.decode(oid::INT4_ARRAY, PgFormat::Text, Some(b"{1,NULL,3}")).unwrap();
//!
//! let Value::Int4Array(array) = &value else { unreachable!() };
//! assert_eq!(array.elements.len(), 3);
//!
//! let mut buf = bytes::BytesMut::new();
//! registry.encode(oid::INT4_ARRAY, PgFormat::Text, &value, &mut buf).unwrap();
//! assert_eq!(&buf[..], b"{1,NULL,3}");
//! # let _: Option<&Int4Array> = value.get();
//! ```
use bytes::BytesMut;
use std::collections::HashMap;

use crate::{
    Status,
    postgres::{Oid, PgFormat, PgType, oid},
    types::{
        Bool, BoolArray, Date, DateArray, Int2, Int2Array, Int4, Int4Array, Int8, Int8Array,
        IsNull, PgValue, Text, TextArray, Timestamp, TimestampArray, Timestamptz,
        TimestamptzArray, WireError,
    },
};

/// A typed value of any registered type.
pub trait Variant: PgValue {
    /// Wrap into [`Value`].
    fn into_value(self) -> Value;

    /// Returns the inner value if `value` is this variant.
    fn from_value(value: &Value) -> Option<&Self>;
}

macro_rules! values {
    ($($name:ident,)*) => {
        /// Typed value of every builtin type.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Value {
            $($name($name),)*
        }

        impl Value {
            /// Oid of the inner value.
            pub fn oid(&self) -> Oid {
                match self {
                    $(Self::$name(_) => $name::OID,)*
                }
            }

            /// Status of the inner value.
            pub fn status(&self) -> Status {
                match self {
                    $(Self::$name(v) => v.status(),)*
                }
            }
        }

        $(
            impl Variant for $name {
                fn into_value(self) -> Value {
                    Value::$name(self)
                }

                fn from_value(value: &Value) -> Option<&Self> {
                    match value {
                        Value::$name(v) => Some(v),
                        _ => None,
                    }
                }
            }

            impl From<$name> for Value {
                fn from(value: $name) -> Self {
                    Value::$name(value)
                }
            }
        )*

        impl Registry {
            fn builtin(&mut self) {
                $(self.register(Codec::of::<$name>());)*
            }
        }
    };
}

values! {
    Bool,
    Int2,
    Int4,
    Int8,
    Text,
    Date,
    Timestamp,
    Timestamptz,
    BoolArray,
    Int2Array,
    Int4Array,
    Int8Array,
    TextArray,
    DateArray,
    TimestampArray,
    TimestamptzArray,
}

impl Value {
    /// Returns the inner value if it is `T`.
    pub fn get<T: Variant>(&self) -> Option<&T> {
        T::from_value(self)
    }
}

type Decoder = fn(Option<&[u8]>) -> Result<Value, WireError>;
type Encoder = fn(&Value, &mut BytesMut) -> Result<IsNull, WireError>;

/// Binary and text codec of one type oid.
#[derive(Clone, Copy)]
pub struct Codec {
    oid: Oid,
    name: &'static str,
    decode_binary: Decoder,
    decode_text: Decoder,
    encode_binary: Encoder,
    encode_text: Encoder,
}

impl Codec {
    /// Codec of a typed value.
    pub fn of<T: Variant>() -> Self {
        Self {
            oid: T::OID,
            name: T::NAME,
            decode_binary: |src| T::decode_binary(src).map(T::into_value),
            decode_text: |src| T::decode_text(src).map(T::into_value),
            encode_binary: |value, buf| match T::from_value(value) {
                Some(value) => value.encode_binary(buf),
                None => Err(WireError::TypeMismatch { oid: T::OID, found: value.oid() }),
            },
            encode_text: |value, buf| match T::from_value(value) {
                Some(value) => value.encode_text(buf),
                None => Err(WireError::TypeMismatch { oid: T::OID, found: value.oid() }),
            },
        }
    }

    /// Serve another oid with the same wire format, e.g. `varchar` as `text`.
    pub fn with_oid(self, oid: Oid, name: &'static str) -> Self {
        Self { oid, name, ..self }
    }

    pub fn oid(&self) -> Oid {
        self.oid
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn decode(&self, format: PgFormat, src: Option<&[u8]>) -> Result<Value, WireError> {
        match format {
            PgFormat::Binary => (self.decode_binary)(src),
            PgFormat::Text => (self.decode_text)(src),
        }
    }

    pub fn encode(&self, format: PgFormat, value: &Value, buf: &mut BytesMut) -> Result<IsNull, WireError> {
        match format {
            PgFormat::Binary => (self.encode_binary)(value, buf),
            PgFormat::Text => (self.encode_text)(value, buf),
        }
    }
}

impl std::fmt::Debug for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Codec")
            .field("oid", &self.oid)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Map of type oid to [`Codec`].
#[derive(Debug, Clone)]
pub struct Registry {
    codecs: HashMap<Oid, Codec>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create registry with every builtin type.
    pub fn new() -> Self {
        let mut me = Self { codecs: HashMap::new() };
        me.builtin();
        me.register(Codec::of::<Text>().with_oid(oid::VARCHAR, "varchar"));
        me
    }

    /// Register a codec, replacing the codec previously registered for the same oid.
    pub fn register(&mut self, codec: Codec) {
        self.codecs.insert(codec.oid, codec);
    }

    pub fn get(&self, oid: Oid) -> Option<&Codec> {
        self.codecs.get(&oid)
    }

    fn codec(&self, oid: Oid) -> Result<&Codec, WireError> {
        self.get(oid).ok_or(WireError::UnknownOid { oid })
    }

    /// Decode a value of type `oid`, [`None`] is SQL `NULL`.
    pub fn decode(&self, oid: Oid, format: PgFormat, src: Option<&[u8]>) -> Result<Value, WireError> {
        self.codec(oid)?.decode(format, src)
    }

    /// Encode `value` as type `oid`.
    pub fn encode(
        &self,
        oid: Oid,
        format: PgFormat,
        value: &Value,
        buf: &mut BytesMut,
    ) -> Result<IsNull, WireError> {
        self.codec(oid)?.encode(format, value, buf)
    }
}
