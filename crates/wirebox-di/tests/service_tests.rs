//! Tests for lookup by type and by tag

use serde_json::json;
use wirebox_di::*;

struct SmtpMailer;
struct ApiMailer;
struct NullMailer;

fn mail_container() -> Container {
    ContainerBuilder::new()
        .extends("SmtpMailer", "Mailer")
        .extends("ApiMailer", "Mailer")
        .extends("NullMailer", "Mailer")
        .extends("Mailer", "Transport")
        .factory("mailer.smtp", "SmtpMailer", |_, _| {
            Ok(ServiceRef::with_type("SmtpMailer", SmtpMailer).into())
        })
        .factory("mailer.api", "ApiMailer", |_, _| {
            Ok(ServiceRef::with_type("ApiMailer", ApiMailer).into())
        })
        .define(
            ServiceDefinition::new("mailer.null", ServiceRef::with_type("NullMailer", NullMailer))
                .excluded(),
        )
        .build()
        .unwrap()
}

#[test]
fn test_get_by_type_with_single_candidate() {
    let container = mail_container();

    let smtp = container.get_by_type("SmtpMailer", true).unwrap().unwrap();
    let by_name = container.get_service("mailer.smtp").unwrap();
    assert!(ServiceRef::ptr_eq(&smtp, &by_name));

    let typed = resolve_service!(container, type "::SmtpMailer" => SmtpMailer);
    assert!(typed.is_ok());
}

#[test]
fn test_ambiguous_type_always_fails() {
    let container = mail_container();
    // requesting one of them by name does not break the tie
    container.get_service("mailer.smtp").unwrap();

    for throw_if_missing in [true, false] {
        match container.get_by_type("Mailer", throw_if_missing) {
            Err(DIError::AmbiguousServiceType { type_name, candidates }) => {
                assert_eq!(type_name, "Mailer");
                assert_eq!(candidates, vec!["mailer.api", "mailer.smtp"]);
            }
            other => panic!("expected ambiguity error, got {:?}", other),
        }
    }

    let err = container.get_by_type("Transport", false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingService);
    assert!(err.to_string().contains("mailer.api, mailer.smtp"));
}

#[test]
fn test_missing_type_respects_flag() {
    let container = mail_container();

    assert!(container.get_by_type("Cache", false).unwrap().is_none());
    let err = container.get_by_type("Cache", true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingService);
    assert!(err.to_string().contains("unknown"));
}

#[test]
fn test_excluded_service_is_not_autowired() {
    let container = mail_container();

    assert!(container.get_by_type("NullMailer", false).unwrap().is_none());
    let err = container.get_by_type("NullMailer", true).unwrap_err();
    assert!(err.to_string().contains("not autowired"));
    assert!(err.to_string().contains("mailer.null"));
}

#[test]
fn test_find_autowired_lists_primary_then_secondary() {
    let container = mail_container();

    assert_eq!(
        container.find_autowired("Mailer"),
        vec!["mailer.smtp", "mailer.api", "mailer.null"]
    );
    assert_eq!(container.find_autowired("NullMailer"), vec!["mailer.null"]);
    assert!(container.find_autowired("Cache").is_empty());
}

#[test]
fn test_find_by_type_is_sorted_and_side_effect_free() {
    let container = mail_container();

    assert_eq!(
        container.find_by_type("Transport"),
        vec!["mailer.api", "mailer.null", "mailer.smtp"]
    );
    assert!(!container.is_created("mailer.api").unwrap());
    assert!(!container.is_created("mailer.smtp").unwrap());
}

#[test]
fn test_find_by_tag() {
    let container = ContainerBuilder::new()
        .define(
            ServiceDefinition::new("cmd.migrate", ServiceRef::with_type("Command", SmtpMailer))
                .tag("console.command"),
        )
        .define(
            ServiceDefinition::new("cmd.seed", ServiceRef::with_type("Command", ApiMailer))
                .tag_with("console.command", json!({ "name": "seed" })),
        )
        .tag("console.command", "cmd.external")
        .build()
        .unwrap();

    let commands = container.find_by_tag("console.command");
    assert_eq!(commands.len(), 3);
    assert_eq!(commands["cmd.migrate"], json!(true));
    assert_eq!(commands["cmd.seed"], json!({ "name": "seed" }));
    assert!(container.find_by_tag("event.listener").is_empty());
}

#[test]
fn test_replacement_instance_must_fit_declared_type() {
    let container = mail_container();

    let err = container
        .add_service("mailer.api", ServiceRef::with_type("NullMailer", NullMailer))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Argument);

    // a subtype of the declared type is accepted
    let container = ContainerBuilder::new()
        .extends("SmtpMailer", "Mailer")
        .factory("mailer", "Mailer", |_, _| {
            Ok(ServiceRef::with_type("SmtpMailer", SmtpMailer).into())
        })
        .build()
        .unwrap();
    container
        .add_service("mailer", ServiceRef::with_type("SmtpMailer", SmtpMailer))
        .unwrap();
    assert_eq!(container.get_service_type("mailer").unwrap(), "SmtpMailer");
}
