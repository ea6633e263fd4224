#![doc = include_str!("../../../README.md")]
#![expect(clippy::cast_possible_truncation, reason = "identity hashes fold pointer-sized values")]
#![expect(clippy::cast_sign_loss, reason = "identities reinterpret integer bits")]
#![expect(clippy::cast_possible_wrap, reason = "wrap behavior mirrors CPython identity hashing")]

mod args;
mod class;
mod exception;
mod hook;
mod options;
pub mod protocol;
mod proxy;
mod py_hash;
mod registry;
mod tracer;
pub mod types;
mod value;

pub use crate::{
    class::{BoundMethod, Class, ClassBuilder, Function, Instance, Member, NativeFn, common_ancestors},
    exception::{AttributeNotFound, ExcType, RunError, RunResult, SimpleException},
    hook::{BinaryOp, CompareOp, Hook, UnaryOp},
    options::ProxyOptions,
    proxy::{HookSource, HookTable, ProxyInstance, ProxyType, instance, synthesize, synthesize_with, unwrap},
    registry::{ProxyRegistry, make_proxy_factory},
    tracer::{NoopTracer, RecordingTracer, ResolutionTracer, StderrTracer, Tier, TraceEvent},
    value::{List, Value, ValueIter},
};
