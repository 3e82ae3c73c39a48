//! # Wirebox DI Usage Guide
//!
//! The container resolves services by name or by type. Everything it knows
//! is fixed when the container is built, except instances, which are created
//! on demand.
//!
//! ## Registering Services
//!
//! ```rust
//! use wirebox_di::{ContainerBuilder, ServiceDefinition, ServiceRef};
//!
//! struct SmtpMailer;
//! struct NullMailer;
//!
//! let container = ContainerBuilder::new()
//!     .extends("SmtpMailer", "Mailer")
//!     .extends("NullMailer", "Mailer")
//!     .factory("mailer", "SmtpMailer", |_, _| {
//!         Ok(ServiceRef::with_type("SmtpMailer", SmtpMailer).into())
//!     })
//!     // found by type queries, never autowired
//!     .define(ServiceDefinition::new("mailer.null", ServiceRef::with_type("NullMailer", NullMailer)).excluded())
//!     .alias("mail", "mailer")
//!     .build()
//!     .unwrap();
//!
//! assert!(container.get_by_type("Mailer", true).is_ok());
//! assert_eq!(container.find_by_type("Mailer"), vec!["mailer", "mailer.null"]);
//! ```
//!
//! ## Autowiring Constructors
//!
//! ```rust
//! use wirebox_di::{Arguments, ClassDescriptor, ContainerBuilder, Parameter, ServiceRef};
//!
//! struct Logger;
//! struct Newsletter {
//!     has_logger: bool,
//! }
//!
//! let container = ContainerBuilder::new()
//!     .factory("logger", "Logger", |_, _| Ok(ServiceRef::with_type("Logger", Logger).into()))
//!     .build()
//!     .unwrap();
//!
//! let class = ClassDescriptor::new(
//!     "Newsletter",
//!     vec![Parameter::service("logger", "Logger"), Parameter::service("cache", "Cache").nullable()],
//!     |args| {
//!         Ok(ServiceRef::with_type("Newsletter", Newsletter { has_logger: args[0].is_object() }))
//!     },
//! );
//!
//! let newsletter = container.create_instance(&class, Arguments::new()).unwrap();
//! assert!(newsletter.downcast_ref::<Newsletter>().unwrap().has_logger);
//! ```
//!
//! ## Factories Depending On Other Services
//!
//! A factory receives the container and may request other services. Asking
//! for a service that is still being built fails with a circular reference
//! error instead of recursing.
//!
//! ```rust
//! use wirebox_di::{ContainerBuilder, ErrorKind};
//!
//! let container = ContainerBuilder::new()
//!     .factory("a", "A", |c, _| c.get_service("b").map(Into::into))
//!     .factory("b", "B", |c, _| c.get_service("a").map(Into::into))
//!     .build()
//!     .unwrap();
//!
//! let err = container.get_service("a").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::State);
//! ```
//!
//! ## Loading Parameters
//!
//! ```rust,no_run
//! use wirebox_di::{ContainerBuilder, ParametersLoader};
//!
//! let parameters = ParametersLoader::new()
//!     .with_path("config/parameters.toml")
//!     .with_env_prefix("APP")
//!     .load()
//!     .unwrap();
//!
//! let container = ContainerBuilder::new().parameters(parameters).build().unwrap();
//! let debug = container.parameters().get_as::<bool>("debug").unwrap_or(false);
//! ```
