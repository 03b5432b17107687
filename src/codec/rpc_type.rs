use crate::{codec::RpcError, constants::ANY_TYPE_NAME};
use bitcode::{Decode, Encode};
use std::borrow::Cow;

/// A typed value in transit: the wire name of its concrete type plus its
/// bitcode payload.
///
/// Envelopes carry params and results as `Value`s, which keeps them opaque
/// to the codec while still letting each end check the concrete type
/// against what it expects before decoding the payload.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Value {
    pub type_name: String,
    pub payload: Vec<u8>,
}

impl Value {
    pub fn of<T: RpcType>(value: &T) -> Result<Self, RpcError> {
        value.to_value()
    }

    /// Whether this value could be bound into a `T` destination.
    pub fn is<T: RpcType>(&self) -> bool {
        T::assignable_from(self)
    }
}

/// Types that can travel as params or results.
///
/// The wire name returned by [`RpcType::type_name`] is what the
/// assignability check compares, so two types sharing a name are treated as
/// the same type. Primitives, `String`, `()`, `Vec<T>` and `Option<T>` are
/// implemented here; user types that derive bitcode's `Encode` and `Decode`
/// are registered with [`rpc_type!`](crate::rpc_type).
pub trait RpcType: Sized {
    fn type_name() -> Cow<'static, str>;

    fn encode_payload(&self) -> Result<Vec<u8>, RpcError>;

    fn decode_payload(bytes: &[u8]) -> Result<Self, RpcError>;

    fn to_value(&self) -> Result<Value, RpcError> {
        Ok(Value {
            type_name: Self::type_name().into_owned(),
            payload: self.encode_payload()?,
        })
    }

    fn assignable_from(value: &Value) -> bool {
        value.type_name == Self::type_name()
    }

    /// Decodes `value` without checking assignability; callers check first.
    fn from_value(value: Value) -> Result<Self, RpcError> {
        Self::decode_payload(&value.payload)
    }
}

pub fn encode_bitcode<T: Encode + ?Sized>(value: &T) -> Vec<u8> {
    bitcode::encode(value)
}

pub fn decode_bitcode<T>(bytes: &[u8]) -> Result<T, RpcError>
where
    T: for<'de> Decode<'de>,
{
    bitcode::decode::<T>(bytes).map_err(RpcError::decode)
}

/// Registers one or more types as [`RpcType`]s, naming each after its Rust
/// type as written.
///
/// The wire name is the type's tokens at the call site, so
/// `rpc_type!(geometry::Point)` names it `geometry::Point`, not `Point`.
/// Both ends must register a type under the same spelling, since
/// assignability compares names exactly.
///
/// ```rust
/// use bitcode::{Decode, Encode};
///
/// #[derive(Encode, Decode, Default)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// bitrpc::rpc_type!(Point);
///
/// use bitrpc::RpcType;
/// assert_eq!(Point::type_name(), "Point");
/// ```
#[macro_export]
macro_rules! rpc_type {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::codec::RpcType for $ty {
                fn type_name() -> ::std::borrow::Cow<'static, str> {
                    ::std::borrow::Cow::Borrowed(stringify!($ty))
                }

                fn encode_payload(&self) -> ::std::result::Result<::std::vec::Vec<u8>, $crate::codec::RpcError> {
                    Ok($crate::codec::encode_bitcode(self))
                }

                fn decode_payload(bytes: &[u8]) -> ::std::result::Result<Self, $crate::codec::RpcError> {
                    $crate::codec::decode_bitcode(bytes)
                }
            }
        )+
    };
}

rpc_type!(
    bool, char, i8, i16, i32, i64, i128, u8, u16, u32, u64, u128, f32, f64, String
);

impl RpcType for () {
    fn type_name() -> Cow<'static, str> {
        Cow::Borrowed("()")
    }

    fn encode_payload(&self) -> Result<Vec<u8>, RpcError> {
        Ok(Vec::new())
    }

    fn decode_payload(bytes: &[u8]) -> Result<Self, RpcError> {
        if bytes.is_empty() {
            Ok(())
        } else {
            Err(RpcError::decode(format!(
                "unexpected {} payload bytes for ()",
                bytes.len()
            )))
        }
    }
}

impl<T> RpcType for Vec<T>
where
    T: RpcType + Encode + for<'de> Decode<'de>,
{
    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("Vec<{}>", T::type_name()))
    }

    fn encode_payload(&self) -> Result<Vec<u8>, RpcError> {
        Ok(encode_bitcode(self))
    }

    fn decode_payload(bytes: &[u8]) -> Result<Self, RpcError> {
        decode_bitcode(bytes)
    }
}

impl<T> RpcType for Option<T>
where
    T: RpcType + Encode + for<'de> Decode<'de>,
{
    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("Option<{}>", T::type_name()))
    }

    fn encode_payload(&self) -> Result<Vec<u8>, RpcError> {
        Ok(encode_bitcode(self))
    }

    fn decode_payload(bytes: &[u8]) -> Result<Self, RpcError> {
        decode_bitcode(bytes)
    }
}

// `Value` is the dynamic destination: it accepts any type and forwards the
// sender's type name and payload untouched.
impl RpcType for Value {
    fn type_name() -> Cow<'static, str> {
        Cow::Borrowed(ANY_TYPE_NAME)
    }

    fn encode_payload(&self) -> Result<Vec<u8>, RpcError> {
        Ok(encode_bitcode(self))
    }

    fn decode_payload(bytes: &[u8]) -> Result<Self, RpcError> {
        decode_bitcode(bytes)
    }

    fn to_value(&self) -> Result<Value, RpcError> {
        Ok(self.clone())
    }

    fn assignable_from(_value: &Value) -> bool {
        true
    }

    fn from_value(value: Value) -> Result<Self, RpcError> {
        Ok(value)
    }
}
