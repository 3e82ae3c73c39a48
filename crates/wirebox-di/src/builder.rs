//! Container assembly
//!
//! [`ContainerBuilder`] collects service definitions, aliases, tags, the type
//! hierarchy and parameters, then freezes them into a [`Container`]. The
//! type index is populated here, once, for every ancestor of every service.
//!
//! A [`ContainerManifest`] carries the same data as plain serde values so a
//! precompiled configuration can be loaded from JSON.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Parameters;
use crate::container::{check_service_name, Container, RegistryState};
use crate::recipe::{Factory, FactorySource, Recipe};
use crate::types::TypeHierarchy;
use crate::value::{normalize_type, ServiceRef, TypeName, Value};
use crate::wiring::{TagIndex, TypeIndex, WiringTier};
use crate::{DIError, DIResult};

/// Precompiled registry data, without recipes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerManifest {
    /// Service name → declared type.
    pub types: HashMap<String, TypeName>,
    pub wiring: TypeIndex,
    pub tags: TagIndex,
    pub aliases: HashMap<String, String>,
    pub hierarchy: TypeHierarchy,
}

impl ContainerManifest {
    pub fn from_json(json: &str) -> DIResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// One service to register.
#[derive(Debug, Clone)]
pub struct ServiceDefinition {
    pub name: String,
    pub recipe: Recipe,
    pub tier: WiringTier,
    pub tags: Vec<(String, serde_json::Value)>,
}

impl ServiceDefinition {
    pub fn new(name: &str, recipe: impl Into<Recipe>) -> Self {
        Self {
            name: name.to_string(),
            recipe: recipe.into(),
            tier: WiringTier::Primary,
            tags: Vec::new(),
        }
    }

    /// Keep the service out of autowiring; it stays discoverable by type.
    pub fn excluded(mut self) -> Self {
        self.tier = WiringTier::Secondary;
        self
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.tags.push((tag.to_string(), serde_json::Value::Bool(true)));
        self
    }

    pub fn tag_with(mut self, tag: &str, attribute: serde_json::Value) -> Self {
        self.tags.push((tag.to_string(), attribute));
        self
    }
}

/// Builder pattern for configuring the container
pub struct ContainerBuilder {
    parameters: Parameters,
    manifest: ContainerManifest,
    definitions: Vec<ServiceDefinition>,
    aliases: Vec<(String, String)>,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self {
            parameters: Parameters::default(),
            manifest: ContainerManifest::default(),
            definitions: Vec::new(),
            aliases: Vec::new(),
        }
    }

    pub fn parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Merge precompiled data. Wiring from the manifest is used as given.
    pub fn manifest(mut self, manifest: ContainerManifest) -> Self {
        let ContainerManifest {
            types,
            wiring,
            tags,
            aliases,
            hierarchy,
        } = manifest;
        self.manifest.types.extend(types);
        self.manifest.wiring.merge(wiring);
        self.manifest.tags.merge(tags);
        self.manifest.aliases.extend(aliases);
        self.manifest.hierarchy.merge(hierarchy);
        self
    }

    /// Declare that `type_name` extends or implements `supertype`.
    pub fn extends(mut self, type_name: &str, supertype: &str) -> Self {
        self.manifest.hierarchy.extend(type_name, supertype);
        self
    }

    pub fn define(mut self, definition: ServiceDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    /// Register a compiled factory for `name`.
    pub fn factory<F>(self, name: &str, return_type: &str, factory: F) -> Self
    where
        F: Fn(&Container, &[Value]) -> DIResult<Value> + Send + Sync + 'static,
    {
        let factory = Factory::new(return_type, FactorySource::method_for(name), factory);
        self.define(ServiceDefinition::new(name, factory))
    }

    /// Register an existing instance under `name`.
    pub fn instance(self, name: &str, service: ServiceRef) -> Self {
        self.define(ServiceDefinition::new(name, service))
    }

    pub fn alias(mut self, alias: &str, target: &str) -> Self {
        self.aliases.push((alias.to_string(), target.to_string()));
        self
    }

    pub fn tag(mut self, tag: &str, service: &str) -> Self {
        self.manifest.tags.tag(tag, service);
        self
    }

    pub fn definition_count(&self) -> usize {
        self.definitions.len()
    }

    /// Freeze everything into a container.
    pub fn build(self) -> DIResult<Container> {
        let ContainerBuilder {
            parameters,
            manifest,
            definitions,
            aliases,
        } = self;
        let ContainerManifest {
            types,
            mut wiring,
            mut tags,
            aliases: manifest_aliases,
            hierarchy,
        } = manifest;

        let mut state = RegistryState::default();
        state.types = types
            .into_iter()
            .map(|(name, ty)| (name, normalize_type(&ty)))
            .collect();

        for definition in definitions {
            let ServiceDefinition {
                name,
                recipe,
                tier,
                tags: service_tags,
            } = definition;
            check_service_name(&name)?;
            if state.knows(&name) {
                return Err(DIError::ServiceAlreadyExists { name });
            }
            let type_name = normalize_type(recipe.type_name());
            wiring.insert_with_ancestors(&hierarchy, &type_name, &name, tier);
            for (tag, attribute) in service_tags {
                tags.tag_with(&tag, &name, attribute);
            }
            state.types.insert(name.clone(), type_name);
            match recipe {
                Recipe::Instance(service) => {
                    state.instances.insert(name.clone(), service);
                }
                Recipe::Factory(factory) => {
                    state.factories.insert(name.clone(), factory);
                }
            }
            debug!("Defined service '{}'", name);
        }

        let mut sorted_aliases: Vec<(String, String)> = manifest_aliases.into_iter().collect();
        sorted_aliases.sort();
        for (alias, target) in sorted_aliases.into_iter().chain(aliases) {
            state.insert_alias(&alias, &target)?;
        }

        info!(
            "Built container with {} services, {} aliases and {} indexed types",
            state.factories.len() + state.instances.len(),
            state.aliases.len(),
            wiring.type_count()
        );
        Ok(Container::from_parts(parameters, hierarchy, wiring, tags, state))
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
