//! Unit tests for the registry core: caching, eviction and aliases
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use wirebox_di::*;

#[derive(Debug, PartialEq)]
struct TestService {
    value: i32,
}

fn counting_builder(counter: Arc<AtomicUsize>) -> ContainerBuilder {
    ContainerBuilder::new().factory("test", "TestService", move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(ServiceRef::with_type("TestService", TestService { value: 42 }).into())
    })
}

#[test]
fn test_get_service_returns_cached_instance() {
    let counter = Arc::new(AtomicUsize::new(0));
    let container = counting_builder(counter.clone()).build().unwrap();

    assert!(!container.is_created("test").unwrap());
    let service1 = container.get_service("test").unwrap();
    let service2 = container.get_service("test").unwrap();

    assert!(ServiceRef::ptr_eq(&service1, &service2));
    assert!(container.is_created("test").unwrap());
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn test_create_service_is_never_cached() {
    let counter = Arc::new(AtomicUsize::new(0));
    let container = counting_builder(counter.clone()).build().unwrap();

    let service1 = container.create_service("test", &[]).unwrap();
    let service2 = container.create_service("test", &[]).unwrap();

    assert!(!ServiceRef::ptr_eq(&service1, &service2));
    assert!(!container.is_created("test").unwrap());
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[test]
fn test_service_not_found() {
    let container = Container::new();

    let result = container.get_service("missing");
    assert!(matches!(result, Err(DIError::ServiceNotFound { .. })));
    assert!(matches!(
        container.create_service("missing", &[]),
        Err(DIError::ServiceNotFound { .. })
    ));
    assert!(matches!(
        container.get_service_type("missing"),
        Err(DIError::ServiceNotFound { .. })
    ));
}

#[test]
fn test_remove_service_forces_recreation() {
    let counter = Arc::new(AtomicUsize::new(0));
    let container = counting_builder(counter.clone()).build().unwrap();

    let first = container.get_service("test").unwrap();
    container.remove_service("test");
    assert!(!container.is_created("test").unwrap());
    assert!(container.has_service("test"));

    let second = container.get_service("test").unwrap();
    assert!(!ServiceRef::ptr_eq(&first, &second));
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[test]
fn test_alias_is_transparent() {
    let container = Container::new();
    let instance = ServiceRef::with_type("TestService", TestService { value: 1 });
    container.add_service("x", instance.clone()).unwrap();
    container.add_alias("y", "x").unwrap();

    let via_alias = container.get_service("y").unwrap();
    let direct = container.get_service("x").unwrap();
    assert!(ServiceRef::ptr_eq(&via_alias, &direct));
    assert!(ServiceRef::ptr_eq(&via_alias, &instance));
    assert_eq!(container.get_service_type("y").unwrap(), "TestService");

    // no factory behind "x", so eviction through the alias makes it unknown
    container.remove_service("y");
    assert!(matches!(
        container.get_service("x"),
        Err(DIError::ServiceNotFound { .. })
    ));
}

#[test]
fn test_alias_eviction_recreates_from_factory() {
    let counter = Arc::new(AtomicUsize::new(0));
    let container = counting_builder(counter.clone())
        .alias("t", "test")
        .build()
        .unwrap();

    let first = container.get_service("t").unwrap();
    container.remove_service("t");
    let second = container.get_service("test").unwrap();

    assert!(!ServiceRef::ptr_eq(&first, &second));
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[test]
fn test_adding_through_alias_hits_canonical_name() {
    let container = ContainerBuilder::new()
        .instance("x", ServiceRef::with_type("TestService", TestService { value: 1 }))
        .alias("y", "x")
        .build()
        .unwrap();

    let err = container
        .add_service("y", ServiceRef::with_type("TestService", TestService { value: 2 }))
        .unwrap_err();
    assert!(matches!(err, DIError::ServiceAlreadyExists { ref name } if name == "x"));
}

#[test]
fn test_closure_replaces_compiled_factory() {
    let counter = Arc::new(AtomicUsize::new(0));
    let container = counting_builder(counter.clone()).build().unwrap();

    container
        .add_service(
            "test",
            Recipe::closure("TestService", |_, _| {
                Ok(ServiceRef::with_type("TestService", TestService { value: 7 }).into())
            }),
        )
        .unwrap();

    let service = resolve_service!(container, "test" => TestService).unwrap();
    assert_eq!(service.value, 7);
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[test]
fn test_typed_lookup_reports_mismatch() {
    let container = ContainerBuilder::new()
        .instance("test", ServiceRef::with_type("TestService", TestService { value: 1 }))
        .build()
        .unwrap();

    let err = container.get_typed::<String>("test").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Value);
}

#[test]
fn test_service_names_and_counts() {
    let container = counting_builder(Arc::new(AtomicUsize::new(0)))
        .instance("other", ServiceRef::with_type("TestService", TestService { value: 3 }))
        .build()
        .unwrap();

    assert_eq!(container.service_names(), vec!["other", "test"]);
    assert_eq!(container.service_count(), 2);
    assert_eq!(container.created_count(), 1);
}

#[test]
fn test_parameters_are_read_only_configuration() {
    let parameters = Parameters::from_json(serde_json::json!({ "greeting": "hello" })).unwrap();
    let container = ContainerBuilder::new()
        .parameters(parameters)
        .factory("greeter", "Greeter", |c, _| {
            let greeting = c.parameters().get_as::<String>("greeting")?;
            Ok(ServiceRef::with_type("Greeter", greeting).into())
        })
        .build()
        .unwrap();

    let greeter = container.get_service("greeter").unwrap();
    assert_eq!(greeter.downcast_ref::<String>().unwrap(), "hello");
    assert!(matches!(
        container.parameter("missing"),
        Err(DIError::MissingParameter { .. })
    ));
}
