//! Runtime errors raised by the object model and the proxy resolution engine.
//!
//! Errors are modelled after Python exceptions: every error carries an [`ExcType`]
//! so generic callers can match on the kind (`AttributeError`, `TypeError`, ...)
//! regardless of whether the failing value was a plain value or a proxy.

use std::fmt::{self, Write};

use strum::{Display, EnumString, IntoStaticStr};

/// Result type alias for operations that can produce a runtime error.
pub type RunResult<T> = Result<T, RunError>;

/// Exception kinds raised by the runtime.
///
/// Uses strum derives for automatic `Display`, `FromStr`, and `Into<&'static str>` implementations.
/// The string representation matches the variant name exactly (e.g., `TypeError` -> "TypeError").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum ExcType {
    /// Base class of every exception kind below.
    Exception,

    // --- ArithmeticError hierarchy ---
    ArithmeticError,
    OverflowError,
    ZeroDivisionError,

    // --- LookupError hierarchy ---
    LookupError,
    IndexError,
    KeyError,

    AttributeError,
    RuntimeError,
    StopIteration,
    TypeError,
    ValueError,
}

impl ExcType {
    /// Checks if this exception type is a subclass of another exception type.
    ///
    /// Returns true if `self` would be caught by `except handler_type:`.
    #[must_use]
    pub fn is_subclass_of(self, handler_type: Self) -> bool {
        if self == handler_type {
            return true;
        }
        match handler_type {
            Self::Exception => true,
            Self::LookupError => matches!(self, Self::KeyError | Self::IndexError),
            Self::ArithmeticError => matches!(self, Self::ZeroDivisionError | Self::OverflowError),
            _ => false,
        }
    }

    /// Creates an AttributeError for an attribute that a single type does not define.
    #[must_use]
    pub(crate) fn attribute_error(type_name: impl Into<String>, attr: &str) -> RunError {
        let type_name = type_name.into();
        RunError::AttributeNotFound(AttributeNotFound {
            attr: attr.to_owned(),
            owner: type_name.clone(),
            searched: vec![type_name],
        })
    }

    /// Creates an AttributeError for attribute assignment on types that don't support it.
    #[must_use]
    pub(crate) fn attribute_error_no_setattr(type_name: &str, attr_name: &str) -> RunError {
        SimpleException::new_msg(
            Self::AttributeError,
            format!("'{type_name}' object attribute '{attr_name}' is read-only"),
        )
        .into()
    }

    #[must_use]
    pub(crate) fn type_error(msg: impl fmt::Display) -> RunError {
        SimpleException::new_msg(Self::TypeError, msg.to_string()).into()
    }

    #[must_use]
    pub(crate) fn value_error(msg: impl fmt::Display) -> RunError {
        SimpleException::new_msg(Self::ValueError, msg.to_string()).into()
    }

    #[must_use]
    pub(crate) fn index_error(msg: impl fmt::Display) -> RunError {
        SimpleException::new_msg(Self::IndexError, msg.to_string()).into()
    }

    #[must_use]
    pub(crate) fn zero_division(msg: &str) -> RunError {
        SimpleException::new_msg(Self::ZeroDivisionError, msg.to_owned()).into()
    }

    #[must_use]
    pub(crate) fn overflow_error(op: &str) -> RunError {
        SimpleException::new_msg(Self::OverflowError, format!("integer overflow in {op}")).into()
    }

    #[must_use]
    pub(crate) fn stop_iteration() -> RunError {
        SimpleException::new(Self::StopIteration).into()
    }

    /// Creates a TypeError for a call with the wrong number of arguments.
    ///
    /// Matches CPython's format: `{name}() takes {expected} positional argument(s) but {actual} were given`
    #[must_use]
    pub(crate) fn type_error_arg_count(name: &str, expected: usize, actual: usize) -> RunError {
        let plural = if expected == 1 { "" } else { "s" };
        let verb = if actual == 1 { "was" } else { "were" };
        Self::type_error(format!(
            "{name}() takes {expected} positional argument{plural} but {actual} {verb} given"
        ))
    }

    #[must_use]
    pub(crate) fn type_error_no_args(name: &str) -> RunError {
        Self::type_error(format!("{name}() takes no arguments"))
    }

    /// Creates a TypeError for unsupported binary operations.
    ///
    /// Uses CPython's format: `unsupported operand type(s) for {op}: '{left}' and '{right}'`
    #[must_use]
    pub(crate) fn binary_type_error(op: &str, lhs_type: &str, rhs_type: &str) -> RunError {
        Self::type_error(format!(
            "unsupported operand type(s) for {op}: '{lhs_type}' and '{rhs_type}'"
        ))
    }

    /// Creates a TypeError for unsupported ordering comparisons.
    #[must_use]
    pub(crate) fn compare_type_error(op: &str, lhs_type: &str, rhs_type: &str) -> RunError {
        Self::type_error(format!(
            "'{op}' not supported between instances of '{lhs_type}' and '{rhs_type}'"
        ))
    }

    /// Creates a TypeError for unsupported unary operations.
    ///
    /// Uses CPython's format: `bad operand type for unary {op}: '{type}'`
    #[must_use]
    pub(crate) fn unary_type_error(op: &str, value_type: &str) -> RunError {
        Self::type_error(format!("bad operand type for unary {op}: '{value_type}'"))
    }

    #[must_use]
    pub(crate) fn type_error_not_callable(type_name: &str) -> RunError {
        Self::type_error(format!("'{type_name}' object is not callable"))
    }

    #[must_use]
    pub(crate) fn type_error_not_iterable(type_name: &str) -> RunError {
        Self::type_error(format!("'{type_name}' object is not iterable"))
    }

    #[must_use]
    pub(crate) fn type_error_no_len(type_name: &str) -> RunError {
        Self::type_error(format!("object of type '{type_name}' has no len()"))
    }

    #[must_use]
    pub(crate) fn type_error_not_subscriptable(type_name: &str) -> RunError {
        Self::type_error(format!("'{type_name}' object is not subscriptable"))
    }

    #[must_use]
    pub(crate) fn type_error_no_item_assignment(type_name: &str) -> RunError {
        Self::type_error(format!("'{type_name}' object does not support item assignment"))
    }

    #[must_use]
    pub(crate) fn type_error_no_item_deletion(type_name: &str) -> RunError {
        Self::type_error(format!("'{type_name}' object doesn't support item deletion"))
    }

    #[must_use]
    pub(crate) fn type_error_unhashable(type_name: &str) -> RunError {
        Self::type_error(format!("unhashable type: '{type_name}'"))
    }

    /// Creates a TypeError for a conversion hook that returned the wrong type,
    /// e.g. `__str__ returned non-string (type int)`.
    #[must_use]
    pub(crate) fn type_error_hook_result(hook: &str, expected: &str, actual: &str) -> RunError {
        Self::type_error(format!("{hook} returned non-{expected} (type {actual})"))
    }

    /// Creates the TypeError raised when a proxy type is handed a value of the wrong type.
    #[must_use]
    pub(crate) fn type_error_cannot_wrap(proxy_name: &str, value_repr: &str, value_type: &str) -> RunError {
        Self::type_error(format!(
            "type '{proxy_name}' cannot wrap object {value_repr} with type '{value_type}'"
        ))
    }
}

/// A runtime exception with a type and an optional message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleException {
    exc_type: ExcType,
    arg: Option<String>,
}

impl SimpleException {
    #[must_use]
    pub fn new(exc_type: ExcType) -> Self {
        Self { exc_type, arg: None }
    }

    #[must_use]
    pub fn new_msg(exc_type: ExcType, arg: impl Into<String>) -> Self {
        Self {
            exc_type,
            arg: Some(arg.into()),
        }
    }

    #[must_use]
    pub fn exc_type(&self) -> ExcType {
        self.exc_type
    }

    #[must_use]
    pub fn arg(&self) -> Option<&str> {
        self.arg.as_deref()
    }
}

impl fmt::Display for SimpleException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.arg {
            Some(arg) => write!(f, "{}: {arg}", self.exc_type),
            None => write!(f, "{}", self.exc_type),
        }
    }
}

/// Raised when neither lookup tier defines a requested attribute.
///
/// `owner` is the type the lookup was performed on (the proxy type for proxies)
/// and `searched` lists every type consulted, in lookup order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeNotFound {
    attr: String,
    owner: String,
    searched: Vec<String>,
}

impl AttributeNotFound {
    #[must_use]
    pub(crate) fn new(attr: &str, owner: impl Into<String>, searched: Vec<String>) -> Self {
        Self {
            attr: attr.to_owned(),
            owner: owner.into(),
            searched,
        }
    }

    /// The attribute name that could not be resolved.
    #[must_use]
    pub fn attr(&self) -> &str {
        &self.attr
    }

    /// The type the lookup was performed on.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Names of the types searched, in lookup order.
    #[must_use]
    pub fn searched(&self) -> &[String] {
        &self.searched
    }
}

impl fmt::Display for AttributeNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' object has no attribute '{}'", self.owner, self.attr)?;
        if self.searched.len() > 1 {
            f.write_str(" (searched ")?;
            for (i, name) in self.searched.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "'{name}'")?;
            }
            f.write_char(')')?;
        }
        Ok(())
    }
}

/// Error produced by any runtime operation.
///
/// Errors raised by user-supplied methods travel through the runtime untouched,
/// so a caller always sees exactly the error the failing code returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    /// A plain exception (type plus message).
    Exc(SimpleException),
    /// Attribute lookup failed on every tier searched.
    AttributeNotFound(AttributeNotFound),
}

impl RunError {
    /// The exception kind of this error.
    #[must_use]
    pub fn exc_type(&self) -> ExcType {
        match self {
            Self::Exc(exc) => exc.exc_type(),
            Self::AttributeNotFound(_) => ExcType::AttributeError,
        }
    }

    /// Returns true if this error would be caught by a handler for `exc_type`.
    #[must_use]
    pub fn is(&self, exc_type: ExcType) -> bool {
        self.exc_type().is_subclass_of(exc_type)
    }

    /// The error message, without the exception type prefix.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Exc(exc) => exc.arg().unwrap_or_default().to_owned(),
            Self::AttributeNotFound(err) => err.to_string(),
        }
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exc(exc) => write!(f, "{exc}"),
            Self::AttributeNotFound(err) => write!(f, "AttributeError: {err}"),
        }
    }
}

impl std::error::Error for RunError {}

impl From<SimpleException> for RunError {
    fn from(exc: SimpleException) -> Self {
        Self::Exc(exc)
    }
}

impl From<AttributeNotFound> for RunError {
    fn from(err: AttributeNotFound) -> Self {
        Self::AttributeNotFound(err)
    }
}
