//! Runtime service registry for Wirebox
//!
//! This crate stores named and typed service recipes, instantiates services
//! lazily on first request and caches them for the lifetime of the
//! container. Dependencies are resolved by name or by type (autowiring)
//! against a precompiled type index, and construction cycles are detected
//! instead of recursing forever.
//!
//! ## Quick Start
//!
//! ```rust
//! use wirebox_di::{ContainerBuilder, ServiceRef};
//!
//! struct Logger;
//!
//! let container = ContainerBuilder::new()
//!     .factory("logger", "Logger", |_, _| Ok(ServiceRef::with_type("Logger", Logger).into()))
//!     .build()
//!     .unwrap();
//!
//! let first = container.get_service("logger").unwrap();
//! let second = container.get_by_type("Logger", true).unwrap().unwrap();
//! assert!(ServiceRef::ptr_eq(&first, &second));
//! ```
//!
//! See [`usage`] module for detailed usage examples.

pub mod binder;
pub mod builder;
pub mod config;
pub mod container;
mod dispatch;
pub mod provider;
pub mod recipe;
pub mod registration;
pub mod types;
pub mod usage;
pub mod value;
pub mod wiring;

/// Errors that can occur during registry operations
#[derive(Debug, thiserror::Error)]
pub enum DIError {
    #[error("Service '{name}' not found.")]
    ServiceNotFound { name: String },

    #[error("Service of type {type_name} not found. {hint}")]
    ServiceTypeNotFound { type_name: String, hint: String },

    #[error("Multiple services of type {type_name} found: {}.", .candidates.join(", "))]
    AmbiguousServiceType {
        type_name: String,
        candidates: Vec<String>,
    },

    #[error("Service '{name}' already exists.")]
    ServiceAlreadyExists { name: String },

    #[error("Circular reference detected for services: {}.", .chain.join(", "))]
    CircularReference { chain: Vec<String> },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Missing parameter '{key}'.")]
    MissingParameter { key: String },

    #[error("Service creation failed: {message}")]
    ServiceCreation { message: String },

    #[error("Unable to create service '{name}', value returned by {source_desc} is not object ({given} given).")]
    UnexpectedValue {
        name: String,
        source_desc: String,
        given: String,
    },

    #[error("Service '{name}' is {actual}, not {expected}.")]
    TypeMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ::config::ConfigError),

    #[error("Invalid manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error(transparent)]
    Recipe(#[from] anyhow::Error),
}

pub type DIResult<T> = Result<T, DIError>;

/// Broad category of a [`DIError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown name or type, or an ambiguous type.
    MissingService,
    /// Service already created, or a construction cycle.
    State,
    /// Malformed input to a registry call.
    Argument,
    /// Autowiring could not bind a parameter, or a class cannot be built.
    ServiceCreation,
    /// A recipe produced something other than what was required.
    Value,
    /// A recipe failed with its own error.
    Recipe,
    Configuration,
}

impl DIError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DIError::ServiceNotFound { .. }
            | DIError::ServiceTypeNotFound { .. }
            | DIError::AmbiguousServiceType { .. } => ErrorKind::MissingService,
            DIError::ServiceAlreadyExists { .. } | DIError::CircularReference { .. } => {
                ErrorKind::State
            }
            DIError::InvalidArgument { .. } | DIError::MissingParameter { .. } => {
                ErrorKind::Argument
            }
            DIError::ServiceCreation { .. } => ErrorKind::ServiceCreation,
            DIError::UnexpectedValue { .. } | DIError::TypeMismatch { .. } => ErrorKind::Value,
            DIError::Recipe(_) => ErrorKind::Recipe,
            DIError::Configuration(_) | DIError::Manifest(_) => ErrorKind::Configuration,
        }
    }
}

/// Convenience macro for registering compiled factories on a builder
#[macro_export]
macro_rules! register_service {
    ($builder:expr, $name:expr, $service_type:expr, $factory:expr) => {
        $builder.factory($name, $service_type, $factory)
    };
}

/// Convenience macro for resolving typed services
///
/// `resolve_service!(container, "logger" => Logger)` fetches by name,
/// `resolve_service!(container, type "Logger" => Logger)` by type.
#[macro_export]
macro_rules! resolve_service {
    ($container:expr, type $type_name:expr => $service_type:ty) => {
        $container.get_by_type_typed::<$service_type>($type_name)
    };
    ($container:expr, $name:expr => $service_type:ty) => {
        $container.get_typed::<$service_type>($name)
    };
}

pub use binder::{autowire_arguments, Arguments, Callable, ClassDescriptor, ParamKind, Parameter, ServiceLocator};
pub use builder::{ContainerBuilder, ContainerManifest, ServiceDefinition};
pub use config::{Parameters, ParametersLoader};
pub use container::Container;
pub use provider::{ServiceProvider, ServiceProviderRegistry};
pub use recipe::{Factory, FactorySource, Recipe};
pub use registration::{register_discovered_modules, ServiceModule};
pub use types::TypeHierarchy;
pub use value::{normalize_type, ServiceRef, TypeName, Value};
pub use wiring::{TagIndex, TypeIndex, WiringTier};
