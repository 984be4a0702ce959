//! # Service Registry
//!
//! Maps service names to live target instances and their method
//! descriptors, and is the in-process caller of [`crate::executor::execute`].
//! Only the lookup can fail; once a descriptor is found the invocation
//! pipeline always yields a string.
use crate::descriptor::MethodDescriptor;
use crate::executor::execute;
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;

/// Errors that can occur when resolving a call target.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Service '{0}' not found")]
    ServiceNotFound(String),
    #[error("Method '{0}' not found")]
    MethodNotFound(String),
}

#[derive(Default)]
pub struct ServiceRegistry {
    services: HashMap<String, RegisteredService>,
}

struct RegisteredService {
    target: Box<dyn Any + Send + Sync>,
    methods: HashMap<String, MethodDescriptor>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a target instance together with its method descriptors.
    /// Re-registering the same name replaces the previous entry.
    pub fn register<T>(&mut self, name: impl Into<String>, target: T, methods: Vec<MethodDescriptor>)
    where
        T: Any + Send + Sync,
    {
        let methods = methods
            .into_iter()
            .map(|method| (method.name().to_owned(), method))
            .collect();
        self.services.insert(
            name.into(),
            RegisteredService {
                target: Box::new(target),
                methods,
            },
        );
    }

    /// Names of all registered services.
    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    /// Descriptors of a registered service, if present.
    pub fn methods(&self, service: &str) -> Option<impl Iterator<Item = &MethodDescriptor>> {
        self.services.get(service).map(|entry| entry.methods.values())
    }

    /// Resolves the target and descriptor, then runs the invocation pipeline.
    pub fn call(
        &self,
        service: &str,
        method: &str,
        input: Option<&[Value]>,
    ) -> Result<String, LookupError> {
        let entry = self
            .services
            .get(service)
            .ok_or_else(|| LookupError::ServiceNotFound(service.to_owned()))?;
        let descriptor = entry
            .methods
            .get(method)
            .ok_or_else(|| LookupError::MethodNotFound(method.to_owned()))?;
        let target: &dyn Any = entry.target.as_ref();
        Ok(execute(target, descriptor, input))
    }
}
