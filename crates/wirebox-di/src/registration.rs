//! Auto-discovery of service modules using the inventory crate
//!
//! Crates linked into the final binary can contribute definitions without
//! being named by the application. Each one submits a [`ServiceModule`];
//! [`register_discovered_modules`] applies all of them to a builder.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wirebox_di::{ContainerBuilder, DIResult, ServiceModule, ServiceRef};
//!
//! fn register_storage(builder: ContainerBuilder) -> DIResult<ContainerBuilder> {
//!     Ok(builder.factory("storage", "Storage", |_, _| {
//!         Ok(ServiceRef::with_type("Storage", Storage::default()).into())
//!     }))
//! }
//!
//! inventory::submit! {
//!     ServiceModule::new("storage", register_storage)
//! }
//! ```

use crate::{ContainerBuilder, DIResult};
use tracing::{debug, info};

/// A link-time registered group of service definitions.
pub struct ServiceModule {
    /// Name of the module (e.g., "storage", "mail")
    pub name: &'static str,

    /// Adds the module's definitions to a builder
    pub register_fn: fn(ContainerBuilder) -> DIResult<ContainerBuilder>,

    /// Priority for registration order (lower = earlier, default = 100)
    pub priority: u32,
}

impl ServiceModule {
    /// Create a new module with default priority
    pub const fn new(
        name: &'static str,
        register_fn: fn(ContainerBuilder) -> DIResult<ContainerBuilder>,
    ) -> Self {
        Self {
            name,
            register_fn,
            priority: 100,
        }
    }

    /// Create a new module with custom priority
    pub const fn with_priority(
        name: &'static str,
        register_fn: fn(ContainerBuilder) -> DIResult<ContainerBuilder>,
        priority: u32,
    ) -> Self {
        Self {
            name,
            register_fn,
            priority,
        }
    }
}

inventory::collect!(ServiceModule);

/// Apply every discovered module to the builder, in priority order.
pub fn register_discovered_modules(mut builder: ContainerBuilder) -> DIResult<ContainerBuilder> {
    let mut modules: Vec<&ServiceModule> = inventory::iter::<ServiceModule>().collect();
    // stable sort keeps link order for equal priorities
    modules.sort_by_key(|m| m.priority);

    info!("Discovered {} service modules via inventory", modules.len());

    for module in modules {
        debug!(
            "Registering module '{}' (priority: {})",
            module.name, module.priority
        );
        builder = (module.register_fn)(builder)?;
    }
    Ok(builder)
}

/// List all discovered module names.
///
/// Useful for debugging and diagnostics.
pub fn list_discovered_modules() -> Vec<&'static str> {
    inventory::iter::<ServiceModule>()
        .map(|m| m.name)
        .collect()
}
