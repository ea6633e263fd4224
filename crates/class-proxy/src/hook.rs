//! The fixed set of operator hooks ("dunder" methods) the runtime dispatches implicitly.
//!
//! Proxy synthesis enumerates exactly this set, so the forwarding table of a proxy
//! type never depends on introspecting a live value.

use strum::{Display, EnumCount, EnumIter, EnumString, IntoStaticStr};

/// An operator hook recognized by the runtime.
///
/// The strum serialization of each variant is the dunder name under which a class
/// defines the hook (e.g. `Hook::Lt` <-> `"__lt__"`). Variant order is significant:
/// [`HookTable`](crate::proxy::HookTable) indexes its entries by discriminant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, IntoStaticStr, EnumIter, EnumCount,
)]
pub enum Hook {
    // ==========================
    // Rich comparisons
    #[strum(serialize = "__eq__")]
    Eq,
    #[strum(serialize = "__ne__")]
    Ne,
    #[strum(serialize = "__lt__")]
    Lt,
    #[strum(serialize = "__le__")]
    Le,
    #[strum(serialize = "__gt__")]
    Gt,
    #[strum(serialize = "__ge__")]
    Ge,

    // ==========================
    // Conversions
    #[strum(serialize = "__str__")]
    Str,
    #[strum(serialize = "__repr__")]
    Repr,
    #[strum(serialize = "__bool__")]
    Bool,
    #[strum(serialize = "__hash__")]
    Hash,

    // ==========================
    // Container protocol
    #[strum(serialize = "__len__")]
    Len,
    #[strum(serialize = "__getitem__")]
    GetItem,
    #[strum(serialize = "__setitem__")]
    SetItem,
    #[strum(serialize = "__delitem__")]
    DelItem,
    #[strum(serialize = "__contains__")]
    Contains,
    #[strum(serialize = "__iter__")]
    Iter,

    // ==========================
    // Arithmetic
    #[strum(serialize = "__add__")]
    Add,
    #[strum(serialize = "__sub__")]
    Sub,
    #[strum(serialize = "__mul__")]
    Mul,
    #[strum(serialize = "__truediv__")]
    TrueDiv,
    #[strum(serialize = "__floordiv__")]
    FloorDiv,
    #[strum(serialize = "__mod__")]
    Mod,

    // ==========================
    // Reflected arithmetic
    #[strum(serialize = "__radd__")]
    RAdd,
    #[strum(serialize = "__rsub__")]
    RSub,
    #[strum(serialize = "__rmul__")]
    RMul,
    #[strum(serialize = "__rtruediv__")]
    RTrueDiv,
    #[strum(serialize = "__rfloordiv__")]
    RFloorDiv,
    #[strum(serialize = "__rmod__")]
    RMod,

    // ==========================
    // In-place arithmetic
    #[strum(serialize = "__iadd__")]
    IAdd,
    #[strum(serialize = "__isub__")]
    ISub,
    #[strum(serialize = "__imul__")]
    IMul,
    #[strum(serialize = "__itruediv__")]
    ITrueDiv,
    #[strum(serialize = "__ifloordiv__")]
    IFloorDiv,
    #[strum(serialize = "__imod__")]
    IMod,

    // ==========================
    // Unary
    #[strum(serialize = "__neg__")]
    Neg,
    #[strum(serialize = "__pos__")]
    Pos,
    #[strum(serialize = "__abs__")]
    Abs,

    #[strum(serialize = "__call__")]
    Call,
}

impl Hook {
    /// The dunder name classes use to define this hook.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Parses a dunder name, returning `None` for names outside the hook set.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        name.parse().ok()
    }

    /// Whether the hook takes a second operand that should be unwrapped when
    /// it is a proxy of a compatible type.
    #[must_use]
    pub fn takes_operand(self) -> bool {
        matches!(
            self,
            Self::Eq
                | Self::Ne
                | Self::Lt
                | Self::Le
                | Self::Gt
                | Self::Ge
                | Self::Add
                | Self::Sub
                | Self::Mul
                | Self::TrueDiv
                | Self::FloorDiv
                | Self::Mod
                | Self::RAdd
                | Self::RSub
                | Self::RMul
                | Self::RTrueDiv
                | Self::RFloorDiv
                | Self::RMod
                | Self::IAdd
                | Self::ISub
                | Self::IMul
                | Self::ITrueDiv
                | Self::IFloorDiv
                | Self::IMod
        )
    }
}

/// Binary arithmetic operators and the hooks implementing them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    TrueDiv,
    FloorDiv,
    Mod,
}

impl BinaryOp {
    /// The forward hook, e.g. `__add__`.
    #[must_use]
    pub fn hook(self) -> Hook {
        match self {
            Self::Add => Hook::Add,
            Self::Sub => Hook::Sub,
            Self::Mul => Hook::Mul,
            Self::TrueDiv => Hook::TrueDiv,
            Self::FloorDiv => Hook::FloorDiv,
            Self::Mod => Hook::Mod,
        }
    }

    /// The reflected hook tried on the right operand, e.g. `__radd__`.
    #[must_use]
    pub fn reflected(self) -> Hook {
        match self {
            Self::Add => Hook::RAdd,
            Self::Sub => Hook::RSub,
            Self::Mul => Hook::RMul,
            Self::TrueDiv => Hook::RTrueDiv,
            Self::FloorDiv => Hook::RFloorDiv,
            Self::Mod => Hook::RMod,
        }
    }

    /// The in-place hook, e.g. `__iadd__`.
    #[must_use]
    pub fn inplace(self) -> Hook {
        match self {
            Self::Add => Hook::IAdd,
            Self::Sub => Hook::ISub,
            Self::Mul => Hook::IMul,
            Self::TrueDiv => Hook::ITrueDiv,
            Self::FloorDiv => Hook::IFloorDiv,
            Self::Mod => Hook::IMod,
        }
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::TrueDiv => "/",
            Self::FloorDiv => "//",
            Self::Mod => "%",
        }
    }

    #[must_use]
    pub fn inplace_symbol(self) -> &'static str {
        match self {
            Self::Add => "+=",
            Self::Sub => "-=",
            Self::Mul => "*=",
            Self::TrueDiv => "/=",
            Self::FloorDiv => "//=",
            Self::Mod => "%=",
        }
    }
}

/// Rich comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    #[must_use]
    pub fn hook(self) -> Hook {
        match self {
            Self::Eq => Hook::Eq,
            Self::Ne => Hook::Ne,
            Self::Lt => Hook::Lt,
            Self::Le => Hook::Le,
            Self::Gt => Hook::Gt,
            Self::Ge => Hook::Ge,
        }
    }

    /// The hook tried on the right operand with swapped arguments (`a < b` -> `b > a`).
    #[must_use]
    pub fn reflected(self) -> Hook {
        match self {
            Self::Eq => Hook::Eq,
            Self::Ne => Hook::Ne,
            Self::Lt => Hook::Gt,
            Self::Le => Hook::Ge,
            Self::Gt => Hook::Lt,
            Self::Ge => Hook::Le,
        }
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    /// Whether an [`Ordering`](std::cmp::Ordering) satisfies this operator.
    #[must_use]
    pub fn matches(self, ordering: std::cmp::Ordering) -> bool {
        match self {
            Self::Eq => ordering.is_eq(),
            Self::Ne => ordering.is_ne(),
            Self::Lt => ordering.is_lt(),
            Self::Le => ordering.is_le(),
            Self::Gt => ordering.is_gt(),
            Self::Ge => ordering.is_ge(),
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Pos,
    Abs,
}

impl UnaryOp {
    #[must_use]
    pub fn hook(self) -> Hook {
        match self {
            Self::Neg => Hook::Neg,
            Self::Pos => Hook::Pos,
            Self::Abs => Hook::Abs,
        }
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Pos => "+",
            Self::Abs => "abs()",
        }
    }
}
