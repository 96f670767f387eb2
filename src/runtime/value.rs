//! Runtime value representation
//!
//! Every datum the dispatcher touches is a [`Value`]: constants embedded in
//! instructions, locals, operand stack slots, arguments and results. Values
//! are small and `Copy`; nothing in a value borrows from the run's arena, so
//! a result always outlives the run that produced it.

use super::native::{NativeFn, NativeFunction};
use super::RuntimeError;
use fhex::ToHex;
use std::fmt;

/// Type code of the `Undefined` singleton.
pub const UDT_UNDEFINED: u16 = 0;

/// Type code reserved for native-function handles.
pub const UDT_NATIVE_FUNCTION: u16 = 1;

/// First type code available to clients for their own user-defined values.
pub const UDT_USER: u16 = 2;

/// Runtime representation of VM values
///
/// Equality is structural. Doubles compare by bit pattern, so a `NaN` equals
/// the same `NaN` and `0.0` differs from `-0.0`. Native functions compare by
/// code address.
#[derive(Debug, Clone, Copy)]
pub enum Value {
    Null,
    Undefined,
    Integer(i64),
    Double(f64),
    NativeFunction(NativeFunction),
    UserDefined(UserDefined),
}

/// Discriminant of a [`Value`], used for variant queries and error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Undefined,
    Integer,
    Double,
    NativeFunction,
    UserDefined,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Undefined => "undefined",
            ValueKind::Integer => "integer",
            ValueKind::Double => "double",
            ValueKind::NativeFunction => "native function",
            ValueKind::UserDefined => "user-defined",
        };
        f.write_str(name)
    }
}

/// A client-tagged opaque payload.
///
/// The tag is always `>= UDT_USER`; lower codes belong to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserDefined {
    tag: u16,
    data: u64,
}

impl UserDefined {
    pub fn tag(&self) -> u16 {
        self.tag
    }

    pub fn data(&self) -> u64 {
        self.data
    }
}

impl Value {
    /// The null singleton
    pub const NULL: Value = Value::Null;

    /// The undefined singleton
    pub const UNDEFINED: Value = Value::Undefined;

    /// Wrap a native function so it can travel through the operand stack
    pub fn native(function: NativeFn) -> Self {
        Value::NativeFunction(NativeFunction::new(function))
    }

    /// Create a user-defined value with the given type code and payload
    ///
    /// # Errors
    /// Returns `ReservedTag` if `tag` is one of the codes owned by the engine
    pub fn user_defined(tag: u16, data: u64) -> Result<Self, RuntimeError> {
        if tag < UDT_USER {
            return Err(RuntimeError::ReservedTag(tag));
        }
        Ok(Value::UserDefined(UserDefined { tag, data }))
    }

    /// Get the variant of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Undefined => ValueKind::Undefined,
            Value::Integer(_) => ValueKind::Integer,
            Value::Double(_) => ValueKind::Double,
            Value::NativeFunction(_) => ValueKind::NativeFunction,
            Value::UserDefined(_) => ValueKind::UserDefined,
        }
    }

    /// Type code for the values that live in the user-defined code space
    ///
    /// `Undefined` and native functions report their reserved codes; null
    /// and numbers are not user-defined and report `None`.
    pub fn udt_code(&self) -> Option<u16> {
        match self {
            Value::Undefined => Some(UDT_UNDEFINED),
            Value::NativeFunction(_) => Some(UDT_NATIVE_FUNCTION),
            Value::UserDefined(udt) => Some(udt.tag),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_native_function(&self) -> bool {
        matches!(self, Value::NativeFunction(_))
    }

    /// Convert to integer, returning None if wrong variant
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Convert to double, returning None if wrong variant
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Extract the integer payload
    ///
    /// # Errors
    /// Returns `TypeMismatch` if this is not an `Integer`
    pub fn try_integer(&self) -> Result<i64, RuntimeError> {
        self.as_integer().ok_or_else(|| self.mismatch(ValueKind::Integer))
    }

    /// Extract the double payload
    ///
    /// # Errors
    /// Returns `TypeMismatch` if this is not a `Double`
    pub fn try_double(&self) -> Result<f64, RuntimeError> {
        self.as_double().ok_or_else(|| self.mismatch(ValueKind::Double))
    }

    /// Checked downcast to a native-function handle
    ///
    /// # Errors
    /// Returns `TypeMismatch` unless the value carries the native-function tag
    pub fn try_native_function(&self) -> Result<NativeFunction, RuntimeError> {
        match self {
            Value::NativeFunction(function) => Ok(*function),
            _ => Err(self.mismatch(ValueKind::NativeFunction)),
        }
    }

    /// Extract the user-defined payload
    ///
    /// # Errors
    /// Returns `TypeMismatch` if this is not a `UserDefined` value
    pub fn try_user_defined(&self) -> Result<UserDefined, RuntimeError> {
        match self {
            Value::UserDefined(udt) => Ok(*udt),
            _ => Err(self.mismatch(ValueKind::UserDefined)),
        }
    }

    fn mismatch(&self, expected: ValueKind) -> RuntimeError {
        RuntimeError::TypeMismatch {
            expected,
            actual: self.kind(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) | (Value::Undefined, Value::Undefined) => true,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::NativeFunction(a), Value::NativeFunction(b)) => a == b,
            (Value::UserDefined(a), Value::UserDefined(b)) => a == b,
            _ => false,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<NativeFunction> for Value {
    fn from(function: NativeFunction) -> Self {
        Value::NativeFunction(function)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Undefined => write!(f, "undefined"),
            Value::Integer(v) => write!(f, "int:{v}"),
            Value::Double(v) => write!(f, "double:{}", v.to_hex()),
            Value::NativeFunction(function) => write!(f, "native:{:#x}", function.addr()),
            Value::UserDefined(udt) => write!(f, "udt{}:{:#x}", udt.tag, udt.data),
        }
    }
}
