//! IR operands.
//!
//! A [`Value`] is either empty, an immediate, or a reference to the
//! instruction that produces it. References are plain [`InstRef`] handles
//! into the owning block's pool; use counting is done by the block when a
//! reference is stored into an argument slot, never by the handle itself.

use super::types::Type;
use crate::a32::types::{ExtReg, Reg};

/// Handle to an instruction in its block's pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstRef(u32);

impl InstRef {
    pub(crate) fn new(slot: usize) -> Self {
        assert!(slot < u32::MAX as usize, "instruction pool exhausted");
        Self(slot as u32)
    }

    /// Pool slot. Stable for the life of the block, independent of list order.
    pub fn slot(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Value {
    #[default]
    Empty,
    Inst(InstRef),
    U1(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    A32Reg(Reg),
    A32ExtReg(ExtReg),
}

impl Value {
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    pub fn is_immediate(&self) -> bool {
        !matches!(self, Value::Empty | Value::Inst(_))
    }

    pub fn inst(&self) -> Option<InstRef> {
        match *self {
            Value::Inst(inst) => Some(inst),
            _ => None,
        }
    }

    /// Type of an empty slot or immediate. `None` for instruction references,
    /// whose type depends on the producing instruction.
    pub fn immediate_type(&self) -> Option<Type> {
        match self {
            Value::Empty => Some(Type::Void),
            Value::Inst(_) => None,
            Value::U1(_) => Some(Type::U1),
            Value::U8(_) => Some(Type::U8),
            Value::U16(_) => Some(Type::U16),
            Value::U32(_) => Some(Type::U32),
            Value::U64(_) => Some(Type::U64),
            Value::A32Reg(_) => Some(Type::A32Reg),
            Value::A32ExtReg(_) => Some(Type::A32ExtReg),
        }
    }

    pub fn as_u1(&self) -> Option<bool> {
        match *self {
            Value::U1(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> Option<u8> {
        match *self {
            Value::U8(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match *self {
            Value::U32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::U64(v) => Some(v),
            _ => None,
        }
    }
}

impl From<InstRef> for Value {
    fn from(inst: InstRef) -> Self {
        Value::Inst(inst)
    }
}

macro_rules! typed_values {
    ($($name:ident => $ty:ident;)*) => {
        $(
            #[doc = concat!("A [`Value`] statically known to be of type `", stringify!($ty), "`.")]
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            pub struct $name(Value);

            impl $name {
                pub const TYPE: Type = Type::$ty;

                /// Wrap `value` without checking its type.
                pub fn new(value: Value) -> Self {
                    Self(value)
                }

                pub fn value(self) -> Value {
                    self.0
                }
            }

            impl From<$name> for Value {
                fn from(typed: $name) -> Value {
                    typed.0
                }
            }
        )*
    };
}

typed_values! {
    U1 => U1;
    U8 => U8;
    U16 => U16;
    U32 => U32;
    U64 => U64;
    F32 => F32;
    F64 => F64;
}

/// Result of an operation together with its carry-out pseudo-operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultAndCarry<T> {
    pub result: T,
    pub carry: U1,
}

/// Result of an operation together with its carry and overflow pseudo-operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultAndCarryAndOverflow<T> {
    pub result: T,
    pub carry: U1,
    pub overflow: U1,
}
