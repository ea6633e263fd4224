//! The dynamic value type every runtime operation works on.
//!
//! Immediate values (`None`, booleans, numbers) are stored inline; everything else
//! is reference counted with [`Arc`], so cloning a `Value` never copies the object
//! behind it and [`Value::is`] gives Python's identity semantics.

use std::{collections::VecDeque, fmt::Write, sync::Arc};

use parking_lot::{Mutex, RwLock};

use crate::{
    class::{BoundMethod, Class, Function, Instance},
    exception::{ExcType, RunResult},
    proxy::{ProxyInstance, ProxyType},
    types::builtins,
};

/// A runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    /// The `None` singleton.
    None,
    /// Returned by binary and comparison hooks that do not support the other operand.
    NotImplemented,
    Bool(bool),
    /// 64-bit signed integer; arithmetic overflow raises `OverflowError`.
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    List(Arc<List>),
    Iter(Arc<ValueIter>),
    /// An instance of a user-defined [`Class`].
    Instance(Arc<Instance>),
    Class(Arc<Class>),
    /// An instance of a synthesized proxy type.
    Proxy(Arc<ProxyInstance>),
    ProxyType(Arc<ProxyType>),
    Function(Arc<Function>),
    BoundMethod(Arc<BoundMethod>),
}

impl Value {
    /// Creates a string value.
    #[must_use]
    pub fn str(s: impl Into<Arc<str>>) -> Self {
        Self::Str(s.into())
    }

    /// Creates a list value owning `items`.
    #[must_use]
    pub fn list(items: Vec<Self>) -> Self {
        Self::List(Arc::new(List::new(items)))
    }

    /// Creates an iterator that yields `items` in order.
    #[must_use]
    pub fn iterator(items: impl IntoIterator<Item = Self>) -> Self {
        Self::Iter(Arc::new(ValueIter::new(items)))
    }

    /// Identity comparison (Python's `is`).
    ///
    /// Immediates are identical when their values are; reference values only when
    /// they point at the same object.
    #[must_use]
    pub fn is(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) | (Self::NotImplemented, Self::NotImplemented) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Str(a), Self::Str(b)) => Arc::ptr_eq(a, b),
            (Self::List(a), Self::List(b)) => Arc::ptr_eq(a, b),
            (Self::Iter(a), Self::Iter(b)) => Arc::ptr_eq(a, b),
            (Self::Instance(a), Self::Instance(b)) => Arc::ptr_eq(a, b),
            (Self::Class(a), Self::Class(b)) => Arc::ptr_eq(a, b),
            (Self::Proxy(a), Self::Proxy(b)) => Arc::ptr_eq(a, b),
            (Self::ProxyType(a), Self::ProxyType(b)) => Arc::ptr_eq(a, b),
            (Self::Function(a), Self::Function(b)) => Arc::ptr_eq(a, b),
            (Self::BoundMethod(a), Self::BoundMethod(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// A number identifying this object for identity hashing and default reprs.
    #[must_use]
    pub fn identity(&self) -> usize {
        match self {
            Self::None => 0x10,
            Self::NotImplemented => 0x20,
            Self::Bool(b) => 0x30 + usize::from(*b),
            Self::Int(i) => *i as usize,
            Self::Float(f) => f.to_bits() as usize,
            Self::Str(s) => Arc::as_ptr(s).cast::<u8>() as usize,
            Self::List(l) => Arc::as_ptr(l) as usize,
            Self::Iter(i) => Arc::as_ptr(i) as usize,
            Self::Instance(i) => Arc::as_ptr(i) as usize,
            Self::Class(c) => Arc::as_ptr(c) as usize,
            Self::Proxy(p) => Arc::as_ptr(p) as usize,
            Self::ProxyType(t) => Arc::as_ptr(t) as usize,
            Self::Function(f) => Arc::as_ptr(f) as usize,
            Self::BoundMethod(m) => Arc::as_ptr(m) as usize,
        }
    }

    /// The class of this value.
    ///
    /// Proxies report the shell class of their proxy type, named like the proxy
    /// type itself (e.g. `Provenance[int]`).
    #[must_use]
    pub fn class(&self) -> Arc<Class> {
        let builtins = builtins();
        match self {
            Self::None => builtins.none_type.clone(),
            Self::NotImplemented => builtins.not_implemented_type.clone(),
            Self::Bool(_) => builtins.bool.clone(),
            Self::Int(_) => builtins.int.clone(),
            Self::Float(_) => builtins.float.clone(),
            Self::Str(_) => builtins.str.clone(),
            Self::List(_) => builtins.list.clone(),
            Self::Iter(_) => builtins.iterator.clone(),
            Self::Instance(instance) => instance.class().clone(),
            Self::Class(_) | Self::ProxyType(_) => builtins.type_.clone(),
            Self::Proxy(proxy) => proxy.proxy_type().shell().clone(),
            Self::Function(_) => builtins.function.clone(),
            Self::BoundMethod(_) => builtins.method.clone(),
        }
    }

    /// The name of this value's class, used in error messages.
    #[must_use]
    pub fn type_name(&self) -> String {
        self.class().name().to_owned()
    }

    /// Python's `isinstance(value, class)`.
    #[must_use]
    pub fn is_instance(&self, class: &Class) -> bool {
        self.class().is_subclass_of(class)
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    #[must_use]
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented)
    }

    /// The integer value of an `Int` or `Bool`.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// The numeric value of an `Int`, `Bool` or `Float`.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            Self::Bool(b) => Some(f64::from(u8::from(*b))),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Looks up an attribute, binding methods to this value.
    ///
    /// Instances consult their own attributes before their class; proxies run the
    /// two-tier proxy chain; every other value resolves through its class.
    pub fn get_attr(&self, name: &str) -> RunResult<Self> {
        match self {
            Self::Proxy(proxy) => proxy.get_attr(name),
            Self::ProxyType(proxy_type) => proxy_type.class_attr(name),
            Self::Class(class) => class.class_attr(name),
            Self::Instance(instance) => {
                if let Some(value) = instance.attr(name) {
                    return Ok(value);
                }
                self.class_member(name)
            }
            _ => self.class_member(name),
        }
    }

    fn class_member(&self, name: &str) -> RunResult<Self> {
        let class = self.class();
        match class.lookup(name) {
            Some(member) => member.bind(self),
            None => Err(ExcType::attribute_error(class.name(), name)),
        }
    }

    /// Whether `get_attr(name)` would find something, without running property getters.
    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        match self {
            Self::Proxy(proxy) => proxy.has_attr(name),
            Self::ProxyType(proxy_type) => proxy_type.class_attr(name).is_ok(),
            Self::Class(class) => class.class_attr(name).is_ok(),
            Self::Instance(instance) if instance.attr(name).is_some() => true,
            _ => self.class().lookup(name).is_some(),
        }
    }

    /// Sets an attribute. Only instances and proxies carry writable attributes.
    pub fn set_attr(&self, name: &str, value: Self) -> RunResult<()> {
        match self {
            Self::Instance(instance) => {
                instance.set_attr(name, value);
                Ok(())
            }
            Self::Proxy(proxy) => proxy.set_attr(name, value),
            _ => Err(ExcType::attribute_error_no_setattr(&self.type_name(), name)),
        }
    }

    /// Deletes an attribute.
    pub fn del_attr(&self, name: &str) -> RunResult<()> {
        match self {
            Self::Instance(instance) => match instance.remove_attr(name) {
                Some(_) => Ok(()),
                None => Err(ExcType::attribute_error(self.type_name(), name)),
            },
            Self::Proxy(proxy) => proxy.del_attr(name),
            _ => Err(ExcType::attribute_error_no_setattr(&self.type_name(), name)),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s.into())
    }
}

impl From<Vec<Self>> for Value {
    fn from(items: Vec<Self>) -> Self {
        Self::list(items)
    }
}

impl From<Arc<Class>> for Value {
    fn from(class: Arc<Class>) -> Self {
        Self::Class(class)
    }
}

impl From<Arc<ProxyType>> for Value {
    fn from(proxy_type: Arc<ProxyType>) -> Self {
        Self::ProxyType(proxy_type)
    }
}

/// A mutable list. Contents are guarded by a lock so lists can be shared across threads.
#[derive(Debug, Default)]
pub struct List {
    items: RwLock<Vec<Value>>,
}

impl List {
    #[must_use]
    pub fn new(items: Vec<Value>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// A copy of the current contents.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Value> {
        self.items.read().clone()
    }

    pub fn push(&self, value: Value) {
        self.items.write().push(value);
    }

    pub(crate) fn extend(&self, values: Vec<Value>) {
        self.items.write().extend(values);
    }

    pub(crate) fn get(&self, index: i64) -> RunResult<Value> {
        let items = self.items.read();
        let index = normalize_index(index, items.len()).ok_or_else(|| ExcType::index_error("list index out of range"))?;
        Ok(items[index].clone())
    }

    pub(crate) fn set(&self, index: i64, value: Value) -> RunResult<()> {
        let mut items = self.items.write();
        let index = normalize_index(index, items.len())
            .ok_or_else(|| ExcType::index_error("list assignment index out of range"))?;
        items[index] = value;
        Ok(())
    }

    pub(crate) fn remove(&self, index: i64) -> RunResult<Value> {
        let mut items = self.items.write();
        let index = normalize_index(index, items.len())
            .ok_or_else(|| ExcType::index_error("list index out of range"))?;
        Ok(items.remove(index))
    }
}

/// Resolves a possibly negative index against a sequence length.
pub(crate) fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let index = if index < 0 { index + len } else { index };
    if (0..len).contains(&index) {
        usize::try_from(index).ok()
    } else {
        None
    }
}

/// A one-shot iterator over a fixed sequence of values.
#[derive(Debug, Default)]
pub struct ValueIter {
    remaining: Mutex<VecDeque<Value>>,
}

impl ValueIter {
    #[must_use]
    pub fn new(items: impl IntoIterator<Item = Value>) -> Self {
        Self {
            remaining: Mutex::new(items.into_iter().collect()),
        }
    }

    /// Advances the iterator, returning `None` once exhausted.
    #[must_use]
    pub fn next_value(&self) -> Option<Value> {
        self.remaining.lock().pop_front()
    }

    /// Drains every remaining item.
    #[must_use]
    pub fn drain(&self) -> Vec<Value> {
        self.remaining.lock().drain(..).collect()
    }
}

/// Formats a float the way Python's `repr(float)` does.
pub(crate) fn float_repr(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_owned();
    }
    let mut buffer = ryu::Buffer::new();
    let formatted = buffer.format_finite(value);
    let Some((mantissa, exponent)) = formatted.split_once('e') else {
        // ryu stays decimal down to 1e-5, Python only down to 1e-4
        if value != 0.0 && value.abs() < 1e-4 {
            return small_decimal_to_scientific(formatted);
        }
        return formatted.to_owned();
    };
    // ryu writes `1e16` / `1e-7`, Python writes `1e+16` / `1e-07`
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    let mantissa = mantissa.strip_suffix(".0").unwrap_or(mantissa);
    format!("{mantissa}e{sign}{digits:0>2}")
}

/// Rewrites `0.000015` as `1.5e-05`.
fn small_decimal_to_scientific(formatted: &str) -> String {
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let fraction = unsigned.strip_prefix("0.").unwrap_or(unsigned);
    let digits = fraction.trim_start_matches('0');
    let exponent = fraction.len() - digits.len() + 1;
    match (digits.get(..1), digits.get(1..)) {
        (Some(first), Some("")) => format!("{sign}{first}e-{exponent:02}"),
        (Some(first), Some(rest)) => format!("{sign}{first}.{rest}e-{exponent:02}"),
        _ => formatted.to_owned(),
    }
}

/// Formats a string the way Python's `repr(str)` does.
pub(crate) fn str_repr(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_repr_matches_python() {
        assert_eq!(float_repr(1.0), "1.0");
        assert_eq!(float_repr(0.1), "0.1");
        assert_eq!(float_repr(-2.5), "-2.5");
        assert_eq!(float_repr(1e16), "1e+16");
        assert_eq!(float_repr(1e-7), "1e-07");
        assert_eq!(float_repr(0.0001), "0.0001");
        assert_eq!(float_repr(1e-5), "1e-05");
        assert_eq!(float_repr(-1.5e-5), "-1.5e-05");
        assert_eq!(float_repr(2.25e-5), "2.25e-05");
        assert_eq!(float_repr(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn str_repr_picks_quotes() {
        assert_eq!(str_repr("hello"), "'hello'");
        assert_eq!(str_repr("it's"), "\"it's\"");
        assert_eq!(str_repr("a\nb"), "'a\\nb'");
    }

    #[test]
    fn negative_indexes_count_from_the_end() {
        assert_eq!(normalize_index(-1, 3), Some(2));
        assert_eq!(normalize_index(3, 3), None);
        assert_eq!(normalize_index(-4, 3), None);
    }

    #[test]
    fn identity_of_immediates_and_references() {
        let s = Value::str("x");
        assert!(s.is(&s.clone()));
        assert!(!s.is(&Value::str("x")));
        assert!(Value::Int(3).is(&Value::Int(3)));
        assert!(!Value::Int(1).is(&Value::Bool(true)));
    }
}
