//! Performance benchmarks for the service registry

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wirebox_di::{Arguments, ClassDescriptor, Container, ContainerBuilder, Parameter, ServiceRef};

/// Simple test service for benchmarking
#[derive(Debug, Clone)]
struct TestService {
    id: u32,
    data: Vec<u8>,
}

impl TestService {
    fn new(id: u32) -> Self {
        Self {
            id,
            data: vec![0; 1024], // 1KB of data
        }
    }
}

fn populated_builder(services: u32) -> ContainerBuilder {
    let mut builder = ContainerBuilder::new().extends("TestService", "Service");
    for id in 0..services {
        builder = builder.factory(&format!("service.{}", id), "TestService", move |_, _| {
            Ok(ServiceRef::with_type("TestService", TestService::new(id)).into())
        });
    }
    builder.factory("logger", "Logger", |_, _| {
        Ok(ServiceRef::with_type("Logger", TestService::new(0)).into())
    })
}

fn benchmark_container_build(c: &mut Criterion) {
    c.bench_function("build_container_100_services", |b| {
        b.iter(|| black_box(populated_builder(black_box(100)).build()))
    });
}

fn benchmark_service_resolution(c: &mut Criterion) {
    let container = populated_builder(100).build().unwrap();
    container.get_service("service.42").unwrap();

    c.bench_function("get_cached_service", |b| {
        b.iter(|| black_box(container.get_service(black_box("service.42"))))
    });

    c.bench_function("create_uncached_service", |b| {
        b.iter(|| black_box(container.create_service(black_box("service.7"), &[])))
    });

    c.bench_function("get_service_by_type", |b| {
        b.iter(|| black_box(container.get_by_type(black_box("Logger"), true)))
    });

    c.bench_function("find_by_type_100_candidates", |b| {
        b.iter(|| black_box(container.find_by_type(black_box("Service"))))
    });
}

fn benchmark_first_resolution(c: &mut Criterion) {
    c.bench_function("get_service_after_eviction", |b| {
        let container = populated_builder(1).build().unwrap();
        b.iter(|| {
            container.remove_service("service.0");
            black_box(container.get_service("service.0"))
        })
    });
}

fn benchmark_autowiring(c: &mut Criterion) {
    let container = populated_builder(10).build().unwrap();
    let class = ClassDescriptor::new(
        "Report",
        vec![
            Parameter::service("logger", "Logger"),
            Parameter::service_list("services", "Service"),
            Parameter::scalar("title", "string").with_default("report"),
        ],
        |args| Ok(ServiceRef::with_type("Report", args.len())),
    );

    c.bench_function("create_instance_autowired", |b| {
        b.iter(|| black_box(container.create_instance(&class, Arguments::new())))
    });
}

fn benchmark_concurrent_access(c: &mut Criterion) {
    use std::sync::Arc;
    use std::thread;

    let container: Arc<Container> = Arc::new(populated_builder(10).build().unwrap());

    c.bench_function("concurrent_cached_resolution", |b| {
        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|i| {
                    let container = container.clone();
                    thread::spawn(move || {
                        let name = format!("service.{}", i);
                        black_box(container.get_service(&name).map(|s| {
                            s.downcast_ref::<TestService>()
                                .map(|t| t.id + t.data.len() as u32)
                        }))
                    })
                })
                .collect();

            for handle in handles {
                let _ = handle.join();
            }
        })
    });
}

criterion_group!(
    benches,
    benchmark_container_build,
    benchmark_service_resolution,
    benchmark_first_resolution,
    benchmark_autowiring,
    benchmark_concurrent_access
);
criterion_main!(benches);
