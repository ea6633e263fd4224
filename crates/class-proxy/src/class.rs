//! Classes, instances and native callables.
//!
//! `Class` is the runtime's type descriptor: a name, an optional base class and an
//! ordered namespace of [`Member`]s. `Instance` is an object created by calling a
//! class, holding its own attribute map.
//!
//! # Attribute Access
//!
//! - Instance attributes are checked first, then the class MRO
//! - Methods found on the class are bound to the receiver they were looked up on
//! - Operator hooks are looked up on the class only, never on instance attributes

use std::{
    fmt,
    iter,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use ahash::AHashSet;
use indexmap::IndexMap;
use parking_lot::RwLock;
use smallvec::SmallVec;

use crate::{
    exception::{ExcType, RunResult},
    protocol,
    types::builtins,
    value::Value,
};

/// Source of unique class ids. Ids are never reused.
static NEXT_CLASS_UID: AtomicU64 = AtomicU64::new(1);

/// Signature of every native callable: positional arguments in, value out.
///
/// Methods receive their receiver as `args[0]`.
pub type NativeFn = dyn Fn(&[Value]) -> RunResult<Value> + Send + Sync;

/// A named native function.
pub struct Function {
    name: String,
    func: Box<NativeFn>,
}

impl Function {
    #[must_use]
    pub fn new(name: impl Into<String>, func: impl Fn(&[Value]) -> RunResult<Value> + Send + Sync + 'static) -> Self {
        Self {
            name: name.into(),
            func: Box::new(func),
        }
    }

    /// Creates a method: a function whose first argument is split off as the receiver.
    #[must_use]
    pub fn method(
        name: impl Into<String>,
        func: impl Fn(&Value, &[Value]) -> RunResult<Value> + Send + Sync + 'static,
    ) -> Self {
        let name = name.into();
        let err_name = name.clone();
        Self::new(name, move |args: &[Value]| match args.split_first() {
            Some((receiver, rest)) => func(receiver, rest),
            None => Err(ExcType::type_error(format!(
                "{err_name}() missing required argument: 'self'"
            ))),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[Value]) -> RunResult<Value> {
        (self.func)(args)
    }

    /// Calls the function with `receiver` prepended to `args`.
    pub fn call_method(&self, receiver: &Value, args: &[Value]) -> RunResult<Value> {
        let mut full: SmallVec<[Value; 4]> = SmallVec::with_capacity(args.len() + 1);
        full.push(receiver.clone());
        full.extend(args.iter().cloned());
        (self.func)(&full)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function").field("name", &self.name).finish_non_exhaustive()
    }
}

/// A method bound to the value it was looked up on.
#[derive(Debug)]
pub struct BoundMethod {
    receiver: Value,
    func: Arc<Function>,
}

impl BoundMethod {
    #[must_use]
    pub fn new(receiver: Value, func: Arc<Function>) -> Self {
        Self { receiver, func }
    }

    #[must_use]
    pub fn receiver(&self) -> &Value {
        &self.receiver
    }

    #[must_use]
    pub fn func(&self) -> &Arc<Function> {
        &self.func
    }

    pub fn call(&self, args: &[Value]) -> RunResult<Value> {
        self.func.call_method(&self.receiver, args)
    }
}

/// A class namespace entry.
#[derive(Debug, Clone)]
pub enum Member {
    /// A class constant, returned as-is.
    Const(Value),
    /// A method, bound to the receiver on instance access.
    Method(Arc<Function>),
    /// A function returned unbound on every access.
    StaticMethod(Arc<Function>),
    /// A computed attribute: the getter runs with the receiver on instance access.
    Property(Arc<Function>),
}

impl Member {
    /// Resolves this member for access through `receiver`.
    pub fn bind(&self, receiver: &Value) -> RunResult<Value> {
        match self {
            Self::Const(value) => Ok(value.clone()),
            Self::Method(func) => Ok(Value::BoundMethod(Arc::new(BoundMethod::new(
                receiver.clone(),
                func.clone(),
            )))),
            Self::StaticMethod(func) => Ok(Value::Function(func.clone())),
            Self::Property(getter) => getter.call(std::slice::from_ref(receiver)),
        }
    }

    /// Resolves this member for access through the class itself.
    #[must_use]
    pub fn unbound(&self) -> Value {
        match self {
            Self::Const(value) => value.clone(),
            Self::Method(func) | Self::StaticMethod(func) | Self::Property(func) => Value::Function(func.clone()),
        }
    }

    /// Whether this entry is the `None` marker a class uses to switch a hook off
    /// (the way `list` sets `__hash__ = None`).
    #[must_use]
    pub fn is_disabled_hook(&self) -> bool {
        matches!(self, Self::Const(Value::None))
    }
}

/// A class: the runtime's type descriptor.
///
/// Classes are immutable once built and shared as `Arc<Class>`.
#[derive(Debug)]
pub struct Class {
    name: String,
    /// Unique id, used for identity checks and cache keys.
    uid: u64,
    base: Option<Arc<Class>>,
    namespace: IndexMap<String, Member>,
    /// Native constructor used instead of instance creation (builtin types only).
    constructor: Option<Arc<Function>>,
}

impl Class {
    /// Starts building a class that derives from `object`.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder::new(name)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn uid(&self) -> u64 {
        self.uid
    }

    #[must_use]
    pub fn base(&self) -> Option<&Arc<Self>> {
        self.base.as_ref()
    }

    /// Method resolution order: this class, then its base chain up to `object`.
    pub fn mro(&self) -> impl Iterator<Item = &Self> {
        iter::successors(Some(self), |class| class.base.as_deref())
    }

    /// Members defined directly on this class, in definition order.
    pub fn own_members(&self) -> impl Iterator<Item = (&str, &Member)> {
        self.namespace.iter().map(|(name, member)| (name.as_str(), member))
    }

    /// Finds `name` along the MRO.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Member> {
        self.mro().find_map(|class| class.namespace.get(name))
    }

    /// Finds `name` along the MRO, ignoring classes for which `skip` returns true.
    #[must_use]
    pub fn lookup_where(&self, name: &str, skip: impl Fn(&Self) -> bool) -> Option<&Member> {
        self.mro()
            .filter(|class| !skip(class))
            .find_map(|class| class.namespace.get(name))
    }

    #[must_use]
    pub fn is_subclass_of(&self, other: &Self) -> bool {
        self.mro().any(|class| class.uid == other.uid)
    }

    /// Class-level attribute access (`Foo.x`): members are returned unbound.
    pub fn class_attr(&self, name: &str) -> RunResult<Value> {
        if name == "__name__" {
            return Ok(Value::str(self.name.as_str()));
        }
        match self.lookup(name) {
            Some(member) => Ok(member.unbound()),
            None => Err(ExcType::attribute_error(self.name.as_str(), name)),
        }
    }

    /// Calls the class: runs the native constructor for builtin types, otherwise
    /// creates an instance and runs `__init__`.
    pub fn call(self: &Arc<Self>, args: &[Value]) -> RunResult<Value> {
        match &self.constructor {
            Some(constructor) => constructor.call(args),
            None => self.instantiate(args).map(Value::Instance),
        }
    }

    /// Creates an instance and runs `__init__` with `args`.
    ///
    /// A class without an initializer accepts no arguments. Errors raised by the
    /// initializer are returned unchanged.
    pub fn instantiate(self: &Arc<Self>, args: &[Value]) -> RunResult<Arc<Instance>> {
        let instance = Arc::new(Instance::new(self.clone()));
        let receiver = Value::Instance(instance.clone());
        match self.lookup("__init__") {
            Some(Member::Method(init)) => {
                init.call_method(&receiver, args)?;
            }
            Some(member) => {
                let init = member.bind(&receiver)?;
                protocol::call(&init, args)?;
            }
            None if args.is_empty() => {}
            None => return Err(ExcType::type_error_no_args(&self.name)),
        }
        Ok(instance)
    }
}

/// Uids of the classes two hierarchies share at their root (at least `object`).
///
/// Compares both MROs from the root down and stops at the first divergence.
#[must_use]
pub fn common_ancestors(left: &Class, right: &Class) -> AHashSet<u64> {
    let mut left_mro: Vec<&Class> = left.mro().collect();
    let mut right_mro: Vec<&Class> = right.mro().collect();
    left_mro.reverse();
    right_mro.reverse();
    left_mro
        .iter()
        .zip(&right_mro)
        .take_while(|(l, r)| l.uid == r.uid)
        .map(|(l, _)| l.uid)
        .collect()
}

enum BaseSpec {
    Object,
    Root,
    Explicit(Arc<Class>),
}

/// Builder for [`Class`].
///
/// ```
/// use class_proxy::{Class, Value};
///
/// let point = Class::builder("Point")
///     .constant("dimensions", 2)
///     .init(|this, args| {
///         this.set_attr("x", args[0].clone())?;
///         this.set_attr("y", args[1].clone())
///     })
///     .method("norm1", |this, _| {
///         let x = this.get_attr("x")?.as_int().unwrap_or_default();
///         let y = this.get_attr("y")?.as_int().unwrap_or_default();
///         Ok(Value::Int(x.abs() + y.abs()))
///     })
///     .build();
/// let p = point.call(&[Value::Int(3), Value::Int(-4)]).unwrap();
/// assert_eq!(class_proxy::protocol::call_method(&p, "norm1", &[]).unwrap().as_int(), Some(7));
/// ```
pub struct ClassBuilder {
    name: String,
    base: BaseSpec,
    namespace: IndexMap<String, Member>,
    constructor: Option<Arc<Function>>,
}

impl ClassBuilder {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: BaseSpec::Object,
            namespace: IndexMap::new(),
            constructor: None,
        }
    }

    /// Sets the base class (defaults to `object`).
    #[must_use]
    pub fn base(mut self, base: &Arc<Class>) -> Self {
        self.base = BaseSpec::Explicit(base.clone());
        self
    }

    /// Builds a class without any base; only `object` itself is built this way.
    #[must_use]
    pub(crate) fn root(mut self) -> Self {
        self.base = BaseSpec::Root;
        self
    }

    #[must_use]
    pub fn member(mut self, name: impl Into<String>, member: Member) -> Self {
        self.namespace.insert(name.into(), member);
        self
    }

    #[must_use]
    pub fn constant(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.member(name, Member::Const(value.into()))
    }

    /// Adds a method. The closure receives the receiver and the remaining arguments.
    #[must_use]
    pub fn method(
        self,
        name: impl Into<String>,
        func: impl Fn(&Value, &[Value]) -> RunResult<Value> + Send + Sync + 'static,
    ) -> Self {
        let name = name.into();
        let func = Function::method(name.clone(), func);
        self.member(name, Member::Method(Arc::new(func)))
    }

    #[must_use]
    pub fn static_method(
        self,
        name: impl Into<String>,
        func: impl Fn(&[Value]) -> RunResult<Value> + Send + Sync + 'static,
    ) -> Self {
        let name = name.into();
        let func = Function::new(name.clone(), func);
        self.member(name, Member::StaticMethod(Arc::new(func)))
    }

    #[must_use]
    pub fn property(
        self,
        name: impl Into<String>,
        getter: impl Fn(&Value) -> RunResult<Value> + Send + Sync + 'static,
    ) -> Self {
        let name = name.into();
        let func = Function::method(name.clone(), move |this, _| getter(this));
        self.member(name, Member::Property(Arc::new(func)))
    }

    /// Adds `__init__`, run on every instantiation with the constructor arguments.
    #[must_use]
    pub fn init(self, func: impl Fn(&Value, &[Value]) -> RunResult<()> + Send + Sync + 'static) -> Self {
        self.method("__init__", move |this, args| func(this, args).map(|()| Value::None))
    }

    /// Installs a native constructor, replacing instance creation.
    #[must_use]
    pub(crate) fn constructor(
        mut self,
        func: impl Fn(&[Value]) -> RunResult<Value> + Send + Sync + 'static,
    ) -> Self {
        self.constructor = Some(Arc::new(Function::new(self.name.clone(), func)));
        self
    }

    #[must_use]
    pub fn build(self) -> Arc<Class> {
        let base = match self.base {
            BaseSpec::Object => Some(builtins().object.clone()),
            BaseSpec::Root => None,
            BaseSpec::Explicit(base) => Some(base),
        };
        Arc::new(Class {
            name: self.name,
            uid: NEXT_CLASS_UID.fetch_add(1, Ordering::Relaxed),
            base,
            namespace: self.namespace,
            constructor: self.constructor,
        })
    }
}

/// An instance of a user-defined class.
#[derive(Debug)]
pub struct Instance {
    class: Arc<Class>,
    attrs: RwLock<IndexMap<String, Value>>,
}

impl Instance {
    #[must_use]
    pub fn new(class: Arc<Class>) -> Self {
        Self {
            class,
            attrs: RwLock::new(IndexMap::new()),
        }
    }

    #[must_use]
    pub fn class(&self) -> &Arc<Class> {
        &self.class
    }

    /// The instance's own attribute `name`, ignoring the class.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<Value> {
        self.attrs.read().get(name).cloned()
    }

    pub fn set_attr(&self, name: &str, value: Value) {
        self.attrs.write().insert(name.to_owned(), value);
    }

    pub fn remove_attr(&self, name: &str) -> Option<Value> {
        self.attrs.write().shift_remove(name)
    }

    /// Names of the instance's own attributes, in assignment order.
    #[must_use]
    pub fn attr_names(&self) -> Vec<String> {
        self.attrs.read().keys().cloned().collect()
    }
}
