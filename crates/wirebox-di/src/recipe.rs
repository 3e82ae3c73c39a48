//! Construction recipes
//!
//! A recipe is the registered means of producing a service: either an
//! existing instance or a factory tagged with its declared return type.

use std::fmt;
use std::sync::Arc;

use crate::container::Container;
use crate::value::{normalize_type, ServiceRef, TypeName, Value};
use crate::{DIError, DIResult};

/// Factory callback. Receives the registry and any extra arguments passed to
/// `create_service`.
pub type FactoryFn = Arc<dyn Fn(&Container, &[Value]) -> DIResult<Value> + Send + Sync>;

/// Where a factory came from; only used to describe failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactorySource {
    /// Registered at runtime through `add_service`.
    Closure,
    /// Supplied by the compiled service definitions.
    Method(String),
}

impl FactorySource {
    /// Conventional method name for a compiled service.
    pub fn method_for(service: &str) -> Self {
        let ident: String = service
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
            .collect();
        FactorySource::Method(format!("create_service_{}", ident))
    }
}

impl fmt::Display for FactorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactorySource::Closure => write!(f, "factory closure"),
            FactorySource::Method(method) => write!(f, "method {}()", method),
        }
    }
}

/// A factory and the type it declares to return.
#[derive(Clone)]
pub struct Factory {
    return_type: TypeName,
    source: FactorySource,
    call: FactoryFn,
}

impl Factory {
    pub fn new<F>(return_type: &str, source: FactorySource, call: F) -> Self
    where
        F: Fn(&Container, &[Value]) -> DIResult<Value> + Send + Sync + 'static,
    {
        Self {
            return_type: normalize_type(return_type),
            source,
            call: Arc::new(call),
        }
    }

    pub fn return_type(&self) -> &str {
        &self.return_type
    }

    pub fn source(&self) -> &FactorySource {
        &self.source
    }

    pub(crate) fn invoke(&self, container: &Container, args: &[Value]) -> DIResult<Value> {
        (self.call)(container, args)
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("return_type", &self.return_type)
            .field("source", &self.source)
            .finish()
    }
}

/// Instance or factory.
#[derive(Debug, Clone)]
pub enum Recipe {
    Instance(ServiceRef),
    Factory(Factory),
}

impl Recipe {
    /// Wrap a runtime closure declaring `return_type`.
    pub fn closure<F>(return_type: &str, call: F) -> Self
    where
        F: Fn(&Container, &[Value]) -> DIResult<Value> + Send + Sync + 'static,
    {
        Recipe::Factory(Factory::new(return_type, FactorySource::Closure, call))
    }

    /// Runtime type of the instance, or declared return type of the factory.
    pub fn type_name(&self) -> &str {
        match self {
            Recipe::Instance(service) => service.type_name(),
            Recipe::Factory(factory) => factory.return_type(),
        }
    }

    /// Convert an arbitrary value, rejecting anything that is not an object.
    pub fn from_value(name: &str, value: Value) -> DIResult<Self> {
        match value {
            Value::Service(service) => Ok(Recipe::Instance(service)),
            other => Err(DIError::InvalidArgument {
                message: format!(
                    "Service '{}' must be an object or a factory, {} given.",
                    name,
                    other.describe()
                ),
            }),
        }
    }
}

impl From<ServiceRef> for Recipe {
    fn from(service: ServiceRef) -> Self {
        Recipe::Instance(service)
    }
}

impl From<Factory> for Recipe {
    fn from(factory: Factory) -> Self {
        Recipe::Factory(factory)
    }
}
