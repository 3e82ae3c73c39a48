//! End-to-end scenarios across the public registry surface

use std::io::Write;
use std::sync::Once;

use wirebox_di::*;

static INIT: Once = Once::new();

fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

struct Logger {
    channel: String,
}

struct Mailer;

struct Newsletter {
    mailer: ServiceRef,
}

#[test]
fn scenario_logger_is_shared() {
    init_logging();
    let container = ContainerBuilder::new()
        .factory("logger", "Logger", |_, _| {
            Ok(ServiceRef::with_type("Logger", Logger { channel: "app".to_string() }).into())
        })
        .build()
        .unwrap();

    let first = container.get_service("logger").unwrap();
    let second = container.get_service("logger").unwrap();
    assert!(ServiceRef::ptr_eq(&first, &second));
    assert_eq!(first.downcast_ref::<Logger>().unwrap().channel, "app");
}

#[test]
fn scenario_mutual_dependency_fails_with_state_error() {
    init_logging();
    let container = ContainerBuilder::new()
        .factory("a", "A", |c, _| c.get_service("b").map(Into::into))
        .factory("b", "B", |c, _| c.get_service("a").map(Into::into))
        .build()
        .unwrap();

    let err = container.get_service("a").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::State);
    let message = err.to_string();
    assert!(message.contains("a"));
    assert!(message.contains("b"));
}

#[test]
fn scenario_ambiguous_type_always_fails() {
    init_logging();
    let container = ContainerBuilder::new()
        .instance("mailer.transactional", ServiceRef::with_type("Mailer", Mailer))
        .instance("mailer.bulk", ServiceRef::with_type("Mailer", Mailer))
        .build()
        .unwrap();

    for throw_if_missing in [true, false] {
        let err = container.get_by_type("Mailer", throw_if_missing).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingService);
        assert!(err.to_string().contains("mailer.bulk, mailer.transactional"));
    }
}

#[test]
fn scenario_create_instance_wires_sole_candidate() {
    init_logging();
    let container = ContainerBuilder::new()
        .factory("mailer", "Mailer", |_, _| Ok(ServiceRef::with_type("Mailer", Mailer).into()))
        .build()
        .unwrap();
    let class = ClassDescriptor::new(
        "Newsletter",
        vec![Parameter::service("mailer", "Mailer")],
        |args| {
            let mailer = args[0]
                .as_service()
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("mailer was not wired"))?;
            Ok(ServiceRef::with_type("Newsletter", Newsletter { mailer }))
        },
    );

    let first = container.create_instance(&class, Arguments::new()).unwrap();
    let second = container.create_instance(&class, Arguments::new()).unwrap();
    assert!(!ServiceRef::ptr_eq(&first, &second));

    let mailer = container.get_service("mailer").unwrap();
    let newsletter = first.downcast_ref::<Newsletter>().unwrap();
    assert!(ServiceRef::ptr_eq(&newsletter.mailer, &mailer));
}

#[test]
fn scenario_parameters_file_and_manifest() {
    init_logging();
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "channel = \"audit\"").unwrap();

    let parameters = ParametersLoader::new()
        .with_path(file.path())
        .with_env_prefix("WIREBOX_E2E_UNSET")
        .load()
        .unwrap();

    let manifest = ContainerManifest::from_json(
        r#"{
            "types": { "logger": "Logger" },
            "wiring": { "Logger": { "primary": ["logger"] } },
            "aliases": { "log": "logger" }
        }"#,
    )
    .unwrap();

    let container = ContainerBuilder::new()
        .parameters(parameters)
        .manifest(manifest)
        .factory("logger", "Logger", |c, _| {
            let channel = c.parameters().get_as::<String>("channel")?;
            Ok(ServiceRef::with_type("Logger", Logger { channel }).into())
        })
        .build()
        .unwrap();

    let logger = resolve_service!(container, type "Logger" => Logger).unwrap();
    assert_eq!(logger.channel, "audit");
    let via_alias = container.get_service("log").unwrap();
    assert_eq!(via_alias.downcast_ref::<Logger>().unwrap().channel, "audit");
}
