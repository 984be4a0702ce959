//! # Dynvoke Core
//!
//! `dynvoke-core` is the invocation engine behind the Dynvoke service console. It executes a
//! method on a live service object from an array of loosely-typed JSON values, without
//! compile-time knowledge of the call site: the values are coerced to the method's declared
//! parameter types, the method is invoked, and the return value is rendered as canonical JSON
//! text. On any failure the call yields a human-readable diagnostic string instead; the
//! string result is the only channel by which success or failure reaches the caller.
//!
//! ## Key Components
//!
//! * **[`MethodDescriptor`]:** Static metadata for one callable member of a target object:
//!   its name, the resolved coercion category of each parameter, and a type-erased invocation
//!   shim. Built once at registration time via [`MethodDescriptor::builder`].
//! * **[`execute`]:** The single entry point consumed by external dispatch layers. Always
//!   returns a string; no error ever crosses this boundary.
//! * **[`ServiceRegistry`]:** An in-process name → (target, methods) map for callers that
//!   resolve methods by name.
//!
//! ## Internal components
//!
//! We've decided to expose the individual pipeline stages as public modules, so callers with
//! their own dispatch glue can reuse them directly:
//!
//! * **[`coerce`]:** Converts each positional JSON value into the declared argument type.
//! * **[`encode`]:** The canonical JSON writer (sorted fields, single-quoted strings,
//!   explicit nulls).
//! * **[`executor`]:** The outer pipeline and the fixed diagnostic strings.
//!
//! ## Result contract
//!
//! Success is a canonical JSON text; failure is either the fixed arity-mismatch message or
//! [`INVOCATION_ERROR_PREFIX`] followed by the fault's trace. Callers probe the prefix to
//! tell the two apart. The internal pipeline is `Result`-shaped ([`try_execute`]) so tests
//! can assert on the structured [`Fault`] instead of string content.
pub mod coerce;
pub mod descriptor;
pub mod encode;
pub mod error;
pub mod executor;
pub mod registry;

pub use descriptor::{ArgSlot, Args, EnumArg, MethodDescriptor, ParamSpec, ScalarKind};
pub use error::{ArgBindError, Fault, InvocationError};
pub use executor::{
    ARITY_MISMATCH_MESSAGE, INVOCATION_ERROR_PREFIX, execute, format_stack_trace, try_execute,
};
pub use registry::{LookupError, ServiceRegistry};

/// Type alias for the standard boxed error used in generic bounds.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
