//! # Sample Service
//!
//! **INTERNAL USE ONLY**: This crate exists solely to provide a service implementation and
//! method descriptors for integration testing `dynvoke-core`.
//! It is not intended for production use.
use dynvoke_core::{Args, EnumArg, MethodDescriptor, ParamSpec, ScalarKind};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error(transparent)]
    BadArgument(#[from] dynvoke_core::ArgBindError),
    #[error("the sample service is closed")]
    Closed,
}

/// Account lifecycle states, in wire order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Active,
    Suspended,
    Closed,
}

impl EnumArg for Status {
    const MEMBERS: &'static [&'static str] = &["ACTIVE", "SUSPENDED", "CLOSED"];

    fn from_ordinal(ordinal: usize) -> Option<Self> {
        match ordinal {
            0 => Some(Status::Active),
            1 => Some(Status::Suspended),
            2 => Some(Status::Closed),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: String,
    pub age: u32,
    pub email: Option<String>,
}

/// A small service whose methods cover every coercion category. Counts its
/// invocations so tests can verify that a failed precondition never reaches
/// the method.
#[derive(Debug, Default)]
pub struct SampleService {
    calls: AtomicUsize,
}

impl SampleService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    pub fn add(&self, a: i32, b: i32) -> i32 {
        self.record();
        a + b
    }

    pub fn set_state(&self, status: Option<Status>) -> Option<Status> {
        self.record();
        status
    }

    pub fn create_profile(&self, profile: Profile) -> Profile {
        self.record();
        profile
    }

    pub fn ping(&self) -> &'static str {
        self.record();
        "pong"
    }

    pub fn reset(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }

    pub fn always_fail(&self) -> Result<(), SampleError> {
        self.record();
        Err(SampleError::Closed)
    }
}

/// Descriptors for every method of [`SampleService`], as a registration
/// layer would build them.
pub fn descriptors() -> Vec<MethodDescriptor> {
    vec![
        MethodDescriptor::builder("add")
            .param(ParamSpec::scalar(ScalarKind::I32))
            .param(ParamSpec::scalar(ScalarKind::I32))
            .handler(
                |service: &SampleService, mut args: Args| -> Result<i32, SampleError> {
                    let a = args.take::<i32>(0)?;
                    let b = args.take::<i32>(1)?;
                    Ok(service.add(a, b))
                },
            ),
        MethodDescriptor::builder("set_state")
            .param(ParamSpec::enumeration::<Status>())
            .handler(
                |service: &SampleService, mut args: Args| -> Result<Option<Status>, SampleError> {
                    let status = args.take_opt::<Status>(0)?;
                    Ok(service.set_state(status))
                },
            ),
        MethodDescriptor::builder("create_profile")
            .param(ParamSpec::structure::<Profile>())
            .handler(
                |service: &SampleService, mut args: Args| -> Result<Profile, SampleError> {
                    let profile = args.take::<Profile>(0)?;
                    Ok(service.create_profile(profile))
                },
            ),
        MethodDescriptor::builder("ping").handler(
            |service: &SampleService, _args: Args| -> Result<&'static str, SampleError> {
                Ok(service.ping())
            },
        ),
        MethodDescriptor::builder("reset").handler(
            |service: &SampleService, _args: Args| -> Result<(), SampleError> {
                service.reset();
                Ok(())
            },
        ),
        MethodDescriptor::builder("always_fail").handler(
            |service: &SampleService, _args: Args| -> Result<(), SampleError> {
                service.always_fail()?;
                Ok(())
            },
        ),
    ]
}
