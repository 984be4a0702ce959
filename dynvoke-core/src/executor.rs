//! # Invoker & Result Encoder
//!
//! The outer pipeline of a dynamic call:
//!
//! ```text
//! START → ARITY_CHECK → COERCE → INVOKE → ENCODE → result string
//!              │            │        │
//!              └────────────┴────────┴──→ diagnostic string
//! ```
//!
//! [`try_execute`] is the `Result`-shaped computation; [`execute`] is the
//! public boundary that collapses every fault into a string, so no error
//! ever crosses to the caller. Callers distinguish success from failure by
//! probing for [`INVOCATION_ERROR_PREFIX`] (or the fixed arity message),
//! never by catching anything.
use crate::coerce::coerce_arguments;
use crate::descriptor::MethodDescriptor;
use crate::encode::encode;
use crate::error::Fault;
use serde_json::Value;
use std::any::Any;
use tracing::{error, warn};

/// Fixed prefix of every invocation-failure result ("interface invocation
/// exception"). Wire-compatible with existing consumers; not translated.
pub const INVOCATION_ERROR_PREFIX: &str = "调用接口异常\r\n";

/// Fixed result for a call whose parameter array does not match the declared
/// parameter count. Wire-compatible with existing consumers; not translated.
pub const ARITY_MISMATCH_MESSAGE: &str = "参数错误，出入的参数个数与接口不匹配";

/// Executes `method` on `target` with the loosely-typed `input` array and
/// returns the canonical JSON encoding of the result, or a diagnostic
/// string on any failure. Never panics on bad input, never returns an error.
pub fn execute(target: &dyn Any, method: &MethodDescriptor, input: Option<&[Value]>) -> String {
    match try_execute(target, method, input) {
        Ok(body) => body,
        Err(fault @ Fault::ArityMismatch { .. }) => {
            warn!(
                target_type = method.target_type(),
                method = method.name(),
                params = ?input,
                %fault,
                "parameter array does not match the declared parameter count"
            );
            ARITY_MISMATCH_MESSAGE.to_owned()
        }
        Err(fault) => {
            error!(
                target_type = method.target_type(),
                method = method.name(),
                params = ?input,
                %fault,
                "interface invocation failed"
            );
            format!("{INVOCATION_ERROR_PREFIX}{}", format_stack_trace(&fault))
        }
    }
}

/// The same pipeline as [`execute`], with the fault still structured.
pub fn try_execute(
    target: &dyn Any,
    method: &MethodDescriptor,
    input: Option<&[Value]>,
) -> Result<String, Fault> {
    let args = coerce_arguments(method.params(), input)?;
    let value = method.invoke(target, args)?;
    Ok(encode(&value))
}

/// Renders a fault as its full textual trace: the fault's own description
/// followed by one `Caused by:` line per link in its source chain.
pub fn format_stack_trace(error: &dyn std::error::Error) -> String {
    let mut trace = error.to_string();
    let mut cause = error.source();
    while let Some(err) = cause {
        trace.push_str("\nCaused by: ");
        trace.push_str(&err.to_string());
        cause = err.source();
    }
    trace
}
