//! The service registry
//!
//! [`Container`] owns instantiated services, factories, aliases and the
//! service type map. The type and tag indexes are fixed when the container
//! is built. Services are created lazily on first request and cached for the
//! container's lifetime.
//!
//! Construction is serialized by a reentrant lock: nested requests made by a
//! factory on the same thread re-enter it, while other threads wait and then
//! find the instance already cached.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::{ReentrantMutex, RwLock};
use tracing::{debug, trace};

use crate::binder::{autowire_arguments, Arguments, Callable, ClassDescriptor, ServiceLocator};
use crate::config::Parameters;
use crate::dispatch::{self, InFlightChain};
use crate::recipe::{Factory, Recipe};
use crate::types::TypeHierarchy;
use crate::value::{normalize_type, ServiceRef, TypeName, Value};
use crate::wiring::{TagIndex, TypeIndex};
use crate::{DIError, DIResult};

/// Service names must be non-empty.
pub(crate) fn check_service_name(name: &str) -> DIResult<()> {
    if name.is_empty() {
        return Err(DIError::InvalidArgument {
            message: "Service name must be a non-empty string.".to_string(),
        });
    }
    Ok(())
}

#[derive(Default)]
pub(crate) struct RegistryState {
    pub(crate) factories: HashMap<String, Factory>,
    pub(crate) instances: HashMap<String, ServiceRef>,
    pub(crate) types: HashMap<String, TypeName>,
    pub(crate) aliases: HashMap<String, String>,
}

impl RegistryState {
    fn canonical(&self, name: &str) -> String {
        self.aliases
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    pub(crate) fn knows(&self, name: &str) -> bool {
        self.factories.contains_key(name) || self.instances.contains_key(name)
    }

    pub(crate) fn insert_alias(&mut self, alias: &str, target: &str) -> DIResult<()> {
        if alias.is_empty() || target.is_empty() {
            return Err(DIError::InvalidArgument {
                message: "Alias and target must be non-empty strings.".to_string(),
            });
        }
        let target = self.canonical(target);
        if target == alias {
            return Err(DIError::InvalidArgument {
                message: format!("Alias '{}' cannot refer to itself.", alias),
            });
        }
        if self.knows(alias) {
            return Err(DIError::InvalidArgument {
                message: format!("Alias '{}' conflicts with an existing service.", alias),
            });
        }
        // keep every alias one hop away from its service
        for existing in self.aliases.values_mut() {
            if existing == alias {
                *existing = target.clone();
            }
        }
        self.aliases.insert(alias.to_string(), target);
        Ok(())
    }
}

/// Runtime service registry.
pub struct Container {
    parameters: Parameters,
    hierarchy: TypeHierarchy,
    wiring: TypeIndex,
    tags: TagIndex,
    state: RwLock<RegistryState>,
    construction: ReentrantMutex<InFlightChain>,
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container").finish_non_exhaustive()
    }
}

impl Container {
    /// Create an empty container with no parameters.
    pub fn new() -> Self {
        Self::with_parameters(Parameters::default())
    }

    pub fn with_parameters(parameters: Parameters) -> Self {
        Self::from_parts(
            parameters,
            TypeHierarchy::default(),
            TypeIndex::default(),
            TagIndex::default(),
            RegistryState::default(),
        )
    }

    pub(crate) fn from_parts(
        parameters: Parameters,
        hierarchy: TypeHierarchy,
        wiring: TypeIndex,
        tags: TagIndex,
        state: RegistryState,
    ) -> Self {
        Self {
            parameters,
            hierarchy,
            wiring,
            tags,
            state: RwLock::new(state),
            construction: ReentrantMutex::new(InFlightChain::default()),
        }
    }

    /// User parameters supplied at construction.
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// A single parameter; fails if it is missing.
    pub fn parameter(&self, key: &str) -> DIResult<&serde_json::Value> {
        self.parameters.require(key)
    }

    pub fn hierarchy(&self) -> &TypeHierarchy {
        &self.hierarchy
    }

    /// Register an instance or a factory under `name`.
    ///
    /// An instance is cached immediately. A closure replaces any existing
    /// factory. When the name already has a factory, the new recipe's type
    /// must be compatible with the declared one.
    pub fn add_service(&self, name: &str, recipe: impl Into<Recipe>) -> DIResult<()> {
        let recipe = recipe.into();
        check_service_name(name)?;

        let mut state = self.state.write();
        let name = state.canonical(name);
        if state.instances.contains_key(&name) {
            return Err(DIError::ServiceAlreadyExists { name });
        }

        let concrete = normalize_type(recipe.type_name());
        if let Some(factory) = state.factories.get(&name) {
            let expected = state
                .types
                .get(&name)
                .cloned()
                .unwrap_or_else(|| factory.return_type().to_string());
            if !self.hierarchy.is_subtype(&concrete, &expected) {
                return Err(DIError::InvalidArgument {
                    message: format!(
                        "Service '{}' must be instance of {}, {} given.",
                        name, expected, concrete
                    ),
                });
            }
        }

        state.types.insert(name.clone(), concrete.clone());
        match recipe {
            Recipe::Instance(service) => {
                state.instances.insert(name.clone(), service);
            }
            Recipe::Factory(factory) => {
                state.factories.insert(name.clone(), factory);
            }
        }
        debug!("Registered service '{}' as {}", name, concrete);
        Ok(())
    }

    /// Register an arbitrary value, rejecting anything that is not an object.
    pub fn add_value(&self, name: &str, value: Value) -> DIResult<()> {
        let recipe = Recipe::from_value(name, value)?;
        self.add_service(name, recipe)
    }

    /// Add an alias. Chains are flattened so lookup is always a single hop.
    pub fn add_alias(&self, alias: &str, target: &str) -> DIResult<()> {
        self.state.write().insert_alias(alias, target)?;
        debug!("Registered alias '{}' -> '{}'", alias, target);
        Ok(())
    }

    /// Evict the cached instance; factories and types stay registered.
    pub fn remove_service(&self, name: &str) {
        let mut state = self.state.write();
        let name = state.canonical(name);
        if state.instances.remove(&name).is_some() {
            debug!("Removed instance of service '{}'", name);
        }
    }

    /// Get the shared instance of a service, creating it on first request.
    pub fn get_service(&self, name: &str) -> DIResult<ServiceRef> {
        let name = self.canonical(name);
        if let Some(service) = self.cached(&name) {
            trace!("Service '{}' served from cache", name);
            return Ok(service);
        }

        let chain = self.construction.lock();
        // another thread may have finished it while we waited
        if let Some(service) = self.cached(&name) {
            return Ok(service);
        }
        let service = self.construct(&chain, &name, &[])?;
        self.state
            .write()
            .instances
            .insert(name.clone(), service.clone());
        debug!("Service '{}' created and cached", name);
        Ok(service)
    }

    /// Get a service and downcast it to `T`.
    pub fn get_typed<T: Send + Sync + 'static>(&self, name: &str) -> DIResult<Arc<T>> {
        let service = self.get_service(name)?;
        service.downcast::<T>().ok_or_else(|| DIError::TypeMismatch {
            name: name.to_string(),
            expected: std::any::type_name::<T>().to_string(),
            actual: service.type_name().to_string(),
        })
    }

    /// Build a fresh, uncached instance from the service's factory.
    pub fn create_service(&self, name: &str, args: &[Value]) -> DIResult<ServiceRef> {
        let name = self.canonical(name);
        let chain = self.construction.lock();
        self.construct(&chain, &name, args)
    }

    /// Declared or registered type of a service, without instantiating it.
    pub fn get_service_type(&self, name: &str) -> DIResult<TypeName> {
        let state = self.state.read();
        let name = state.canonical(name);
        if let Some(type_name) = state.types.get(&name) {
            return Ok(type_name.clone());
        }
        state
            .factories
            .get(&name)
            .map(|factory| factory.return_type().to_string())
            .ok_or(DIError::ServiceNotFound { name })
    }

    pub fn has_service(&self, name: &str) -> bool {
        let state = self.state.read();
        let name = state.canonical(name);
        state.knows(&name)
    }

    /// Whether the service has a cached instance.
    pub fn is_created(&self, name: &str) -> DIResult<bool> {
        let state = self.state.read();
        let name = state.canonical(name);
        if !state.knows(&name) {
            return Err(DIError::ServiceNotFound { name });
        }
        Ok(state.instances.contains_key(&name))
    }

    /// Get the single autowired service of a type.
    ///
    /// Zero candidates yields `Ok(None)` unless `throw_if_missing` is set.
    /// Several candidates always fail, whatever the flag says.
    pub fn get_by_type(&self, type_name: &str, throw_if_missing: bool) -> DIResult<Option<ServiceRef>> {
        let type_name = normalize_type(type_name);
        let names = self.wiring.autowired(&type_name);
        match names {
            [name] => self.get_service(name).map(Some),
            [] if throw_if_missing => Err(self.missing_type(&type_name)),
            [] => Ok(None),
            _ => {
                let mut candidates = names.to_vec();
                candidates.sort();
                Err(DIError::AmbiguousServiceType {
                    type_name,
                    candidates,
                })
            }
        }
    }

    /// Get the single autowired service of a type and downcast it to `T`.
    pub fn get_by_type_typed<T: Send + Sync + 'static>(&self, type_name: &str) -> DIResult<Arc<T>> {
        let service = self
            .get_by_type(type_name, true)?
            .ok_or_else(|| self.missing_type(&normalize_type(type_name)))?;
        service.downcast::<T>().ok_or_else(|| DIError::TypeMismatch {
            name: type_name.to_string(),
            expected: std::any::type_name::<T>().to_string(),
            actual: service.type_name().to_string(),
        })
    }

    /// Primary followed by secondary candidates, in index order.
    pub fn find_autowired(&self, type_name: &str) -> Vec<String> {
        self.wiring.candidates(type_name)
    }

    /// Every service registered under a type, sorted by name.
    pub fn find_by_type(&self, type_name: &str) -> Vec<String> {
        let mut names = self.wiring.candidates(type_name);
        names.sort();
        names.dedup();
        names
    }

    /// Services carrying `tag`, with their attributes.
    pub fn find_by_tag(&self, tag: &str) -> BTreeMap<String, serde_json::Value> {
        self.tags.find(tag)
    }

    /// Instantiate a class, autowiring its constructor.
    pub fn create_instance(&self, class: &ClassDescriptor, args: Arguments) -> DIResult<ServiceRef> {
        debug!("Creating instance of {}", class.type_name());
        class.instantiate(args, self)
    }

    /// Call a function, autowiring whatever `args` leaves out.
    pub fn call_method(&self, callable: &Callable, args: Arguments) -> DIResult<Value> {
        let function = format!("{}()", callable.name());
        let bound = autowire_arguments(&function, callable.params(), args, self)?;
        callable.call(bound)
    }

    /// Number of known services (factories and instances).
    pub fn service_count(&self) -> usize {
        self.service_names().len()
    }

    /// Names of all known services, sorted.
    pub fn service_names(&self) -> Vec<String> {
        let state = self.state.read();
        let mut names: Vec<String> = state
            .factories
            .keys()
            .chain(state.instances.keys())
            .cloned()
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Number of cached instances.
    pub fn created_count(&self) -> usize {
        self.state.read().instances.len()
    }

    fn canonical(&self, name: &str) -> String {
        self.state.read().canonical(name)
    }

    fn cached(&self, name: &str) -> Option<ServiceRef> {
        self.state.read().instances.get(name).cloned()
    }

    fn construct(&self, chain: &InFlightChain, name: &str, args: &[Value]) -> DIResult<ServiceRef> {
        let factory = self.state.read().factories.get(name).cloned();
        let factory = factory.ok_or_else(|| DIError::ServiceNotFound {
            name: name.to_string(),
        })?;
        dispatch::run_factory(self, chain, name, &factory, args)
    }

    fn missing_type(&self, type_name: &str) -> DIError {
        let excluded = self.wiring.excluded(type_name);
        let hint = if !excluded.is_empty() {
            let mut names = excluded.to_vec();
            names.sort();
            format!("It is not autowired; candidates excluded from autowiring: {}.", names.join(", "))
        } else if !self.hierarchy.is_empty() && !self.hierarchy.contains(type_name) {
            "Check the type name because the type is unknown.".to_string()
        } else {
            "Did you register it?".to_string()
        };
        DIError::ServiceTypeNotFound {
            type_name: type_name.to_string(),
            hint,
        }
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceLocator for Container {
    fn autowired_candidates(&self, type_name: &str) -> Vec<String> {
        self.wiring.autowired(type_name).to_vec()
    }

    fn all_candidates(&self, type_name: &str) -> Vec<String> {
        self.find_autowired(type_name)
    }

    fn locate(&self, name: &str) -> DIResult<ServiceRef> {
        self.get_service(name)
    }
}
