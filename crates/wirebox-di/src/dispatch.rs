//! Construction dispatch
//!
//! Runs a factory with cycle detection and validates what it produced.
//! The in-flight chain records every service currently under construction
//! in insertion order; [`InFlight`] removes its entry on drop so the chain is
//! clean after both success and failure.

use std::cell::RefCell;

use tracing::{debug, warn};

use crate::container::Container;
use crate::recipe::Factory;
use crate::value::{ServiceRef, Value};
use crate::{DIError, DIResult};

/// Names currently under construction, oldest first.
pub(crate) type InFlightChain = RefCell<Vec<String>>;

/// Membership of one service in the in-flight chain.
pub(crate) struct InFlight<'a> {
    chain: &'a InFlightChain,
    name: String,
}

impl<'a> InFlight<'a> {
    /// Enter the chain, failing if the service is already being built.
    pub(crate) fn enter(chain: &'a InFlightChain, name: &str) -> DIResult<Self> {
        let mut names = chain.borrow_mut();
        if names.iter().any(|n| n == name) {
            warn!("Circular reference detected while creating '{}'", name);
            return Err(DIError::CircularReference {
                chain: names.clone(),
            });
        }
        names.push(name.to_string());
        Ok(Self {
            chain,
            name: name.to_string(),
        })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut names = self.chain.borrow_mut();
        if let Some(pos) = names.iter().rposition(|n| n == &self.name) {
            names.remove(pos);
        }
    }
}

/// Invoke `factory` for `name` and require an object back.
///
/// The chain borrow is released before the factory runs, so the factory may
/// re-enter the registry.
pub(crate) fn run_factory(
    container: &Container,
    chain: &InFlightChain,
    name: &str,
    factory: &Factory,
    args: &[Value],
) -> DIResult<ServiceRef> {
    let produced = {
        let _in_flight = InFlight::enter(chain, name)?;
        debug!("Creating service '{}' via {}", name, factory.source());
        factory.invoke(container, args)?
    };

    match produced {
        Value::Service(service) => Ok(service),
        other => Err(DIError::UnexpectedValue {
            name: name.to_string(),
            source_desc: factory.source().to_string(),
            given: other.describe(),
        }),
    }
}
