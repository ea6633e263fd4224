//! Positional argument checking for native functions.

use crate::{
    exception::{ExcType, RunResult},
    value::Value,
};

/// Checks that exactly `N` arguments were passed and returns them as an array.
///
/// ```ignore
/// let [other] = expect_args("__add__", args)?;
/// ```
pub(crate) fn expect_args<'a, const N: usize>(name: &str, args: &'a [Value]) -> RunResult<&'a [Value; N]> {
    args.try_into()
        .map_err(|_| ExcType::type_error_arg_count(name, N, args.len()))
}

/// Checks that at most one argument was passed and returns it.
pub(crate) fn optional_arg<'a>(name: &str, args: &'a [Value]) -> RunResult<Option<&'a Value>> {
    match args {
        [] => Ok(None),
        [arg] => Ok(Some(arg)),
        _ => Err(ExcType::type_error(format!(
            "{name}() takes at most 1 argument ({} given)",
            args.len()
        ))),
    }
}
