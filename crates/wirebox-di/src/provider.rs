//! Service Provider trait for grouping registrations
//!
//! A `ServiceProvider` contributes a related set of service definitions to a
//! [`ContainerBuilder`] and may check the finished container afterwards.
//!
//! ## Usage
//!
//! ```rust
//! use wirebox_di::{
//!     Container, ContainerBuilder, DIResult, ServiceProvider, ServiceProviderRegistry, ServiceRef,
//! };
//!
//! struct Mailer;
//! struct MailProvider;
//!
//! impl ServiceProvider for MailProvider {
//!     fn name(&self) -> &'static str {
//!         "mail"
//!     }
//!
//!     fn register(&self, builder: ContainerBuilder) -> DIResult<ContainerBuilder> {
//!         Ok(builder.factory("mailer", "Mailer", |_, _| {
//!             Ok(ServiceRef::with_type("Mailer", Mailer).into())
//!         }))
//!     }
//! }
//!
//! let mut registry = ServiceProviderRegistry::new();
//! registry.add(MailProvider);
//! let container = registry.build(ContainerBuilder::new()).unwrap();
//! assert!(container.has_service("mailer"));
//! ```

use std::sync::Arc;

use crate::{Container, ContainerBuilder, DIResult};

/// Trait for types that contribute services to a container.
pub trait ServiceProvider: Send + Sync {
    /// Returns the name of this service provider.
    ///
    /// Used for logging and debugging.
    fn name(&self) -> &'static str;

    /// Returns the priority of this service provider.
    ///
    /// Lower values are registered first. Default is 100.
    fn priority(&self) -> u32 {
        100
    }

    /// Add this provider's definitions to the builder.
    fn register(&self, builder: ContainerBuilder) -> DIResult<ContainerBuilder>;

    /// Optional: validate the built container.
    ///
    /// Called after all providers have registered their services.
    #[allow(unused_variables)]
    fn validate(&self, container: &Container) -> DIResult<()> {
        Ok(())
    }
}

/// Registry for managing service providers.
///
/// Applies providers in priority order and validates the result.
pub struct ServiceProviderRegistry {
    providers: Vec<Arc<dyn ServiceProvider>>,
}

impl ServiceProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Add a service provider to the registry.
    pub fn add<P: ServiceProvider + 'static>(&mut self, provider: P) -> &mut Self {
        self.providers.push(Arc::new(provider));
        self
    }

    /// Add a shared service provider to the registry.
    pub fn add_shared(&mut self, provider: Arc<dyn ServiceProvider>) -> &mut Self {
        self.providers.push(provider);
        self
    }

    /// Get the number of registered providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Provider names in registration order.
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.sorted().iter().map(|p| p.name()).collect()
    }

    /// Run every provider against the builder, lowest priority value first.
    pub fn register_all(&self, mut builder: ContainerBuilder) -> DIResult<ContainerBuilder> {
        let sorted = self.sorted();
        tracing::info!("Registering {} service providers", sorted.len());

        for provider in sorted {
            tracing::debug!(
                "Registering provider '{}' (priority: {})",
                provider.name(),
                provider.priority()
            );
            builder = provider.register(builder)?;
        }
        Ok(builder)
    }

    /// Register everything, build the container and validate it.
    pub fn build(&self, builder: ContainerBuilder) -> DIResult<Container> {
        let container = self.register_all(builder)?.build()?;
        for provider in &self.providers {
            provider.validate(&container)?;
        }
        tracing::info!("All service providers registered successfully");
        Ok(container)
    }

    // stable sort keeps insertion order for equal priorities
    fn sorted(&self) -> Vec<&Arc<dyn ServiceProvider>> {
        let mut sorted: Vec<_> = self.providers.iter().collect();
        sorted.sort_by_key(|p| p.priority());
        sorted
    }
}

impl Default for ServiceProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
