//! Builtin classes.
//!
//! Every non-instance [`Value`](crate::Value) variant has a builtin class whose
//! namespace defines its operator hooks natively. The classes are built once, on
//! first use, and shared for the life of the process.

use std::sync::{Arc, LazyLock};

use crate::class::Class;

mod float;
mod int;
mod list;
mod object;
mod str;

/// The builtin class objects.
#[derive(Debug)]
pub struct Builtins {
    pub object: Arc<Class>,
    pub none_type: Arc<Class>,
    pub not_implemented_type: Arc<Class>,
    pub type_: Arc<Class>,
    pub function: Arc<Class>,
    pub method: Arc<Class>,
    pub iterator: Arc<Class>,
    pub int: Arc<Class>,
    /// Subclass of `int`.
    pub bool: Arc<Class>,
    pub float: Arc<Class>,
    pub str: Arc<Class>,
    pub list: Arc<Class>,
}

static BUILTINS: LazyLock<Builtins> = LazyLock::new(Builtins::new);

/// Returns the builtin classes.
#[must_use]
pub fn builtins() -> &'static Builtins {
    &BUILTINS
}

impl Builtins {
    /// Builds every builtin class.
    ///
    /// Everything here must pass its base explicitly: the default base of
    /// [`ClassBuilder`](crate::ClassBuilder) reads `BUILTINS`, which is still
    /// being initialized.
    fn new() -> Self {
        let object = object::object_class();
        let int = int::int_class(&object);
        Self {
            none_type: object::none_type_class(&object),
            not_implemented_type: object::not_implemented_type_class(&object),
            type_: object::type_class(&object),
            function: object::function_class(&object),
            method: object::method_class(&object),
            iterator: object::iterator_class(&object),
            bool: int::bool_class(&int),
            float: float::float_class(&object),
            str: str::str_class(&object),
            list: list::list_class(&object),
            int,
            object,
        }
    }
}
