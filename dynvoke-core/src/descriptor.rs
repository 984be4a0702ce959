//! # Method Descriptors
//!
//! This module is the static "reflection" surface of the crate. A
//! [`MethodDescriptor`] carries everything the executor needs to know about a
//! callable member of a target object: its name, the ordered coercion
//! categories of its parameters, and a type-erased invocation shim built at
//! registration time.
//!
//! ## How it works
//!
//! 1. **Registration**: the service author builds a descriptor once, through
//!    [`MethodDescriptor::builder`]. Each [`ParamSpec`] resolves the parameter's
//!    coercion category up front, so no type inspection happens per call.
//! 2. **Invocation**: the executor hands the shim the target as `&dyn Any`
//!    plus the coerced [`Args`]. The shim downcasts the target to the concrete
//!    service type captured by the builder and unpacks each argument slot.
use crate::error::{ArgBindError, InvocationError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// One coerced argument slot. `None` marks a slot the coercer deliberately
/// left unset; the value only materializes as an error when a handler asks
/// for it.
pub type ArgSlot = Option<Box<dyn Any + Send>>;

/// The ordered, coerced argument array handed to an invocation shim.
///
/// Handlers unpack it positionally with [`Args::take`] (required parameters)
/// or [`Args::take_opt`] (parameters that tolerate an unset slot).
pub struct Args {
    slots: Vec<ArgSlot>,
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field(
                "slots",
                &self
                    .slots
                    .iter()
                    .map(|slot| if slot.is_some() { "set" } else { "unset" })
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Args {
    pub(crate) fn new(slots: Vec<ArgSlot>) -> Self {
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Removes and downcasts the argument at `index`, failing if the slot is
    /// unset or holds a different type.
    pub fn take<T: 'static>(&mut self, index: usize) -> Result<T, ArgBindError> {
        match self.take_opt(index)? {
            Some(value) => Ok(value),
            None => Err(ArgBindError::Unset { index }),
        }
    }

    /// Like [`Args::take`], but maps an unset slot to `None` instead of an
    /// error.
    pub fn take_opt<T: 'static>(&mut self, index: usize) -> Result<Option<T>, ArgBindError> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(ArgBindError::OutOfBounds { index })?;
        match slot.take() {
            None => Ok(None),
            Some(boxed) => boxed
                .downcast::<T>()
                .map(|value| Some(*value))
                .map_err(|_| ArgBindError::TypeMismatch {
                    index,
                    expected: std::any::type_name::<T>(),
                }),
        }
    }
}

/// The closed set of scalar parameter types the coercer understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Char,
    String,
    /// Coerced into a [`time::OffsetDateTime`] from Unix milliseconds or an
    /// RFC 3339 string.
    DateTime,
}

/// Implemented by enums that can appear as declared parameter types.
///
/// `MEMBERS` lists the wire names in declaration order, so a member's index
/// in the slice is its ordinal.
pub trait EnumArg: Sized + Send + 'static {
    const MEMBERS: &'static [&'static str];

    fn from_ordinal(ordinal: usize) -> Option<Self>;

    fn from_name(name: &str) -> Option<Self> {
        Self::MEMBERS
            .iter()
            .position(|member| *member == name)
            .and_then(Self::from_ordinal)
    }
}

fn enum_by_name<E: EnumArg>(name: &str) -> Option<Box<dyn Any + Send>> {
    E::from_name(name).map(|member| Box::new(member) as Box<dyn Any + Send>)
}

fn enum_by_ordinal<E: EnumArg>(ordinal: usize) -> Option<Box<dyn Any + Send>> {
    E::from_ordinal(ordinal).map(|member| Box::new(member) as Box<dyn Any + Send>)
}

/// Monomorphized constructors for one enum parameter type, resolved when the
/// descriptor is built.
#[derive(Clone, Copy)]
pub struct EnumBinder {
    members: &'static [&'static str],
    by_name: fn(&str) -> Option<Box<dyn Any + Send>>,
    by_ordinal: fn(usize) -> Option<Box<dyn Any + Send>>,
}

impl EnumBinder {
    /// Declared member names, in ordinal order.
    pub fn members(&self) -> &'static [&'static str] {
        self.members
    }

    pub(crate) fn by_name(&self, name: &str) -> Option<Box<dyn Any + Send>> {
        (self.by_name)(name)
    }

    pub(crate) fn by_ordinal(&self, ordinal: usize) -> Option<Box<dyn Any + Send>> {
        (self.by_ordinal)(ordinal)
    }
}

impl fmt::Debug for EnumBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumBinder")
            .field("members", &self.members)
            .finish_non_exhaustive()
    }
}

fn bind_struct<S>(value: serde_json::Value) -> Result<Box<dyn Any + Send>, serde_json::Error>
where
    S: DeserializeOwned + Send + 'static,
{
    serde_json::from_value::<S>(value).map(|bound| Box::new(bound) as Box<dyn Any + Send>)
}

/// Monomorphized serde binding for one structured parameter type.
#[derive(Clone, Copy)]
pub struct StructBinder {
    type_name: &'static str,
    bind: fn(serde_json::Value) -> Result<Box<dyn Any + Send>, serde_json::Error>,
}

impl StructBinder {
    /// Name of the declared parameter type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn bind(
        &self,
        value: serde_json::Value,
    ) -> Result<Box<dyn Any + Send>, serde_json::Error> {
        (self.bind)(value)
    }
}

impl fmt::Debug for StructBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructBinder")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// The coercion category of one declared parameter, resolved at registration.
#[derive(Clone, Debug)]
pub enum ParamSpec {
    Scalar(ScalarKind),
    Enum(EnumBinder),
    Struct(StructBinder),
    /// A declared type the coercer has no rule for. Its slot is always left
    /// unset, deferring any resulting error to the invocation itself.
    Unsupported,
}

impl ParamSpec {
    pub fn scalar(kind: ScalarKind) -> Self {
        ParamSpec::Scalar(kind)
    }

    pub fn enumeration<E: EnumArg>() -> Self {
        ParamSpec::Enum(EnumBinder {
            members: E::MEMBERS,
            by_name: enum_by_name::<E>,
            by_ordinal: enum_by_ordinal::<E>,
        })
    }

    pub fn structure<S>() -> Self
    where
        S: DeserializeOwned + Send + 'static,
    {
        ParamSpec::Struct(StructBinder {
            type_name: std::any::type_name::<S>(),
            bind: bind_struct::<S>,
        })
    }
}

type HandlerFn =
    Arc<dyn Fn(&dyn Any, Args) -> Result<serde_json::Value, InvocationError> + Send + Sync>;

/// Static metadata plus invocation shim for one callable member of a target
/// object. Immutable once built; cloning is cheap.
#[derive(Clone)]
pub struct MethodDescriptor {
    name: String,
    target_type: &'static str,
    params: Vec<ParamSpec>,
    handler: HandlerFn,
}

impl MethodDescriptor {
    pub fn builder(name: impl Into<String>) -> MethodDescriptorBuilder {
        MethodDescriptorBuilder {
            name: name.into(),
            params: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `std::any::type_name` of the concrete service type the shim expects.
    pub fn target_type(&self) -> &'static str {
        self.target_type
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    pub(crate) fn invoke(
        &self,
        target: &dyn Any,
        args: Args,
    ) -> Result<serde_json::Value, InvocationError> {
        (self.handler)(target, args)
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("target_type", &self.target_type)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

pub struct MethodDescriptorBuilder {
    name: String,
    params: Vec<ParamSpec>,
}

impl MethodDescriptorBuilder {
    /// Appends the next positional parameter.
    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.params.push(spec);
        self
    }

    /// Attaches the invocation shim and finishes the descriptor.
    ///
    /// The closure receives the concrete target and the coerced [`Args`];
    /// its typed return value is serialized by the executor's canonical
    /// encoder. The concrete error type `E` is recorded so failures keep
    /// their type name in diagnostic traces.
    pub fn handler<T, R, E, F>(self, f: F) -> MethodDescriptor
    where
        T: Send + Sync + 'static,
        R: Serialize,
        E: std::error::Error + Send + Sync + 'static,
        F: Fn(&T, Args) -> Result<R, E> + Send + Sync + 'static,
    {
        let handler: HandlerFn = Arc::new(move |target: &dyn Any, args: Args| {
            let target = target.downcast_ref::<T>().ok_or_else(|| {
                InvocationError::from_typed(ArgBindError::TargetMismatch {
                    expected: std::any::type_name::<T>(),
                })
            })?;
            let returned = f(target, args).map_err(InvocationError::from_typed)?;
            serde_json::to_value(returned).map_err(InvocationError::from_typed)
        });
        MethodDescriptor {
            name: self.name,
            target_type: std::any::type_name::<T>(),
            params: self.params,
            handler,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_downcasts_in_position() {
        let mut args = Args::new(vec![Some(Box::new(7_i32)), Some(Box::new("x".to_owned()))]);
        assert_eq!(args.take::<i32>(0).unwrap(), 7);
        assert_eq!(args.take::<String>(1).unwrap(), "x");
    }

    #[test]
    fn take_reports_unset_and_mistyped_slots() {
        let mut args = Args::new(vec![None, Some(Box::new(1_u8))]);
        assert!(matches!(
            args.take::<i32>(0),
            Err(ArgBindError::Unset { index: 0 })
        ));
        assert!(matches!(
            args.take::<i32>(1),
            Err(ArgBindError::TypeMismatch { index: 1, .. })
        ));
        assert!(matches!(
            args.take::<i32>(5),
            Err(ArgBindError::OutOfBounds { index: 5 })
        ));
    }

    #[test]
    fn take_opt_maps_unset_to_none() {
        let mut args = Args::new(vec![None]);
        assert_eq!(args.take_opt::<i32>(0).unwrap(), None);
    }

    #[test]
    fn handler_rejects_a_foreign_target() {
        struct Calculator;
        struct Clock;

        let descriptor = MethodDescriptor::builder("now").handler(
            |_target: &Calculator, _args: Args| -> Result<i32, ArgBindError> { Ok(0) },
        );

        let clock = Clock;
        let err = descriptor
            .invoke(&clock, Args::new(Vec::new()))
            .unwrap_err();
        assert!(err.type_name().ends_with("ArgBindError"));
    }
}
