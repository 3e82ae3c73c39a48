//! Dynamic values flowing through recipes and argument binding
//!
//! Recipes, constructors and callables exchange [`Value`]s. Only a
//! [`Value::Service`] counts as an object; everything else is a scalar,
//! a list or `Null`.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Fully-qualified type identifier as used by the type index.
pub type TypeName = String;

/// Normalize a requested type name.
///
/// Strips surrounding whitespace and a single leading namespace separator
/// (`::` or `\`). Type identity stays case-sensitive.
pub fn normalize_type(type_name: &str) -> TypeName {
    let trimmed = type_name.trim();
    let stripped = trimmed
        .strip_prefix("::")
        .or_else(|| trimmed.strip_prefix('\\'))
        .unwrap_or(trimmed);
    stripped.to_string()
}

/// A type-erased, shared service instance tagged with its runtime type.
#[derive(Clone)]
pub struct ServiceRef {
    type_name: TypeName,
    instance: Arc<dyn Any + Send + Sync>,
}

impl ServiceRef {
    /// Wrap an instance, using the Rust type path as its runtime type.
    pub fn new<T: Send + Sync + 'static>(instance: T) -> Self {
        Self::from_arc(Arc::new(instance))
    }

    /// Wrap an already shared instance, using the Rust type path as its runtime type.
    pub fn from_arc<T: Send + Sync + 'static>(instance: Arc<T>) -> Self {
        Self {
            type_name: std::any::type_name::<T>().to_string(),
            instance: instance as Arc<dyn Any + Send + Sync>,
        }
    }

    /// Wrap an instance under an explicit logical type name.
    pub fn with_type<T: Send + Sync + 'static>(type_name: impl AsRef<str>, instance: T) -> Self {
        Self {
            type_name: normalize_type(type_name.as_ref()),
            instance: Arc::new(instance) as Arc<dyn Any + Send + Sync>,
        }
    }

    /// Runtime type of the wrapped instance.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Borrow the instance as `T`.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.instance.downcast_ref::<T>()
    }

    /// Get a shared handle to the instance as `T`.
    pub fn downcast<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.instance.clone().downcast::<T>().ok()
    }

    /// Identity comparison; two refs are equal only if they share the instance.
    pub fn ptr_eq(a: &ServiceRef, b: &ServiceRef) -> bool {
        Arc::ptr_eq(&a.instance, &b.instance)
    }
}

impl fmt::Debug for ServiceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRef")
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// A value produced by a recipe or passed as an argument.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Scalar(serde_json::Value),
    Service(ServiceRef),
    List(Vec<Value>),
}

impl Value {
    /// Whether the value is an object (a service instance).
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Service(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_service(&self) -> Option<&ServiceRef> {
        match self {
            Value::Service(service) => Some(service),
            _ => None,
        }
    }

    pub fn into_service(self) -> Option<ServiceRef> {
        match self {
            Value::Service(service) => Some(service),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Shortcut for `as_service` followed by a downcast.
    pub fn downcast<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.as_service().and_then(ServiceRef::downcast::<T>)
    }

    /// Short description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Scalar(scalar) => format!("scalar {}", scalar),
            Value::Service(service) => format!("instance of {}", service.type_name()),
            Value::List(items) => format!("list of {} values", items.len()),
        }
    }
}

impl From<ServiceRef> for Value {
    fn from(service: ServiceRef) -> Self {
        Value::Service(service)
    }
}

impl From<serde_json::Value> for Value {
    fn from(scalar: serde_json::Value) -> Self {
        match scalar {
            serde_json::Value::Null => Value::Null,
            other => Value::Scalar(other),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(serde_json::Value::String(s.to_string()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(serde_json::Value::String(s))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Scalar(serde_json::Value::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Scalar(serde_json::Value::Bool(b))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}
