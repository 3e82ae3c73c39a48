//! Parameter binding with autowiring
//!
//! Turns a parameter list plus caller-supplied arguments into the ordered
//! argument vector a constructor or callable expects. Parameters the caller
//! leaves out are filled from the registry when their declared type names a
//! service, or from their default otherwise.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::value::{normalize_type, ServiceRef, TypeName, Value};
use crate::{DIError, DIResult};

/// Declared type of a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKind {
    /// A single service of the given type.
    Service(TypeName),
    /// Every service indexed under the given type, primary and secondary.
    ServiceList(TypeName),
    /// A builtin scalar type such as `int` or `string`.
    Scalar(String),
    Untyped,
}

/// One parameter of a constructor or callable.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub kind: ParamKind,
    pub nullable: bool,
    pub default: Option<Value>,
    pub variadic: bool,
}

impl Parameter {
    fn with_kind(name: &str, kind: ParamKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            nullable: false,
            default: None,
            variadic: false,
        }
    }

    pub fn service(name: &str, type_name: &str) -> Self {
        Self::with_kind(name, ParamKind::Service(normalize_type(type_name)))
    }

    pub fn service_list(name: &str, type_name: &str) -> Self {
        Self::with_kind(name, ParamKind::ServiceList(normalize_type(type_name)))
    }

    pub fn scalar(name: &str, type_name: &str) -> Self {
        Self::with_kind(name, ParamKind::Scalar(type_name.to_string()))
    }

    pub fn untyped(name: &str) -> Self {
        Self::with_kind(name, ParamKind::Untyped)
    }

    /// Trailing parameter absorbing leftover positional arguments.
    pub fn variadic(name: &str) -> Self {
        Self {
            variadic: true,
            ..Self::with_kind(name, ParamKind::Untyped)
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    fn type_label(&self) -> &str {
        match &self.kind {
            ParamKind::Service(ty) | ParamKind::ServiceList(ty) | ParamKind::Scalar(ty) => ty,
            ParamKind::Untyped => "mixed",
        }
    }
}

/// Caller-supplied arguments, by position and by name.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    pub positional: Vec<Value>,
    pub named: HashMap<String, Value>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.named.insert(name.to_string(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(positional: Vec<Value>) -> Self {
        Self {
            positional,
            named: HashMap::new(),
        }
    }
}

/// The registry as seen by the binder.
pub trait ServiceLocator {
    /// Primary candidates for a type.
    fn autowired_candidates(&self, type_name: &str) -> Vec<String>;

    /// Primary and secondary candidates for a type, primary first.
    fn all_candidates(&self, type_name: &str) -> Vec<String>;

    /// Fetch (and lazily build) a service by name.
    fn locate(&self, name: &str) -> DIResult<ServiceRef>;
}

/// Invocation callback for constructors and callables.
pub type Invoker<R> = Arc<dyn Fn(Vec<Value>) -> DIResult<R> + Send + Sync>;

/// A function or method that can be called with autowired arguments.
#[derive(Clone)]
pub struct Callable {
    name: String,
    params: Vec<Parameter>,
    invoke: Invoker<Value>,
}

impl Callable {
    pub fn new<F>(name: &str, params: Vec<Parameter>, invoke: F) -> Self
    where
        F: Fn(Vec<Value>) -> DIResult<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            params,
            invoke: Arc::new(invoke),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    pub(crate) fn call(&self, args: Vec<Value>) -> DIResult<Value> {
        (self.invoke)(args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish()
    }
}

#[derive(Clone)]
enum ClassKind {
    Abstract,
    Plain(Invoker<ServiceRef>),
    Constructor {
        params: Vec<Parameter>,
        construct: Invoker<ServiceRef>,
    },
}

/// Describes how to instantiate a class for `create_instance`.
#[derive(Clone)]
pub struct ClassDescriptor {
    type_name: TypeName,
    kind: ClassKind,
}

impl ClassDescriptor {
    /// A class whose constructor takes `params`.
    pub fn new<F>(type_name: &str, params: Vec<Parameter>, construct: F) -> Self
    where
        F: Fn(Vec<Value>) -> DIResult<ServiceRef> + Send + Sync + 'static,
    {
        Self {
            type_name: normalize_type(type_name),
            kind: ClassKind::Constructor {
                params,
                construct: Arc::new(construct),
            },
        }
    }

    /// A class with no constructor at all.
    pub fn without_constructor<F>(type_name: &str, construct: F) -> Self
    where
        F: Fn() -> DIResult<ServiceRef> + Send + Sync + 'static,
    {
        Self {
            type_name: normalize_type(type_name),
            kind: ClassKind::Plain(Arc::new(move |_: Vec<Value>| construct())),
        }
    }

    /// An abstract class or interface; never instantiable.
    pub fn abstract_type(type_name: &str) -> Self {
        Self {
            type_name: normalize_type(type_name),
            kind: ClassKind::Abstract,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub(crate) fn instantiate(
        &self,
        args: Arguments,
        locator: &impl ServiceLocator,
    ) -> DIResult<ServiceRef> {
        match &self.kind {
            ClassKind::Abstract => Err(DIError::ServiceCreation {
                message: format!("Class {} is not instantiable.", self.type_name),
            }),
            ClassKind::Plain(construct) => {
                if !args.is_empty() {
                    return Err(DIError::ServiceCreation {
                        message: format!(
                            "Unable to pass arguments, class {} has no constructor.",
                            self.type_name
                        ),
                    });
                }
                construct(Vec::new())
            }
            ClassKind::Constructor { params, construct } => {
                let function = format!("{}::new()", self.type_name);
                let bound = autowire_arguments(&function, params, args, locator)?;
                construct(bound)
            }
        }
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            ClassKind::Abstract => "abstract",
            ClassKind::Plain(_) => "plain",
            ClassKind::Constructor { .. } => "constructor",
        };
        f.debug_struct("ClassDescriptor")
            .field("type_name", &self.type_name)
            .field("kind", &kind)
            .finish()
    }
}

/// Bind `args` to `params`, autowiring whatever the caller left out.
///
/// `function` only labels error messages.
pub fn autowire_arguments(
    function: &str,
    params: &[Parameter],
    args: Arguments,
    locator: &impl ServiceLocator,
) -> DIResult<Vec<Value>> {
    let Arguments { positional, mut named } = args;
    let mut positional = positional.into_iter();
    let mut bound = Vec::with_capacity(params.len());

    for param in params {
        if param.variadic {
            bound.extend(positional.by_ref());
            if let Some(value) = named.remove(&param.name) {
                bound.push(value);
            }
            break;
        }
        if let Some(value) = positional.next() {
            bound.push(value);
            continue;
        }
        if let Some(value) = named.remove(&param.name) {
            bound.push(value);
            continue;
        }
        bound.push(autowire_parameter(function, param, locator)?);
    }

    let leftover_positional = positional.count();
    if leftover_positional > 0 || !named.is_empty() {
        let mut unknown: Vec<String> = named.into_keys().map(|k| format!("${}", k)).collect();
        unknown.sort();
        let detail = if unknown.is_empty() {
            format!("{} extra positional", leftover_positional)
        } else {
            unknown.join(", ")
        };
        return Err(DIError::ServiceCreation {
            message: format!(
                "Unable to pass specified arguments to {} ({}).",
                function, detail
            ),
        });
    }

    Ok(bound)
}

fn autowire_parameter(
    function: &str,
    param: &Parameter,
    locator: &impl ServiceLocator,
) -> DIResult<Value> {
    match &param.kind {
        ParamKind::Service(type_name) => {
            let mut candidates = locator.autowired_candidates(type_name);
            match candidates.len() {
                1 => {
                    trace!("Autowiring ${} in {} with '{}'", param.name, function, candidates[0]);
                    locator.locate(&candidates[0]).map(Value::Service)
                }
                0 => {
                    if let Some(default) = &param.default {
                        Ok(default.clone())
                    } else if param.nullable {
                        Ok(Value::Null)
                    } else {
                        Err(DIError::ServiceCreation {
                            message: format!(
                                "Service of type {} required by ${} in {} not found.",
                                type_name, param.name, function
                            ),
                        })
                    }
                }
                _ => {
                    candidates.sort();
                    Err(DIError::ServiceCreation {
                        message: format!(
                            "Multiple services of type {} found: {} (required by ${} in {}).",
                            type_name,
                            candidates.join(", "),
                            param.name,
                            function
                        ),
                    })
                }
            }
        }
        ParamKind::ServiceList(type_name) => {
            let services = locator
                .all_candidates(type_name)
                .iter()
                .map(|name| locator.locate(name).map(Value::Service))
                .collect::<DIResult<Vec<_>>>()?;
            Ok(Value::List(services))
        }
        ParamKind::Scalar(_) | ParamKind::Untyped => {
            param.default.clone().ok_or_else(|| DIError::ServiceCreation {
                message: format!(
                    "Parameter ${} in {} has no service type ({}) or default value, so its value must be specified.",
                    param.name,
                    function,
                    param.type_label()
                ),
            })
        }
    }
}
