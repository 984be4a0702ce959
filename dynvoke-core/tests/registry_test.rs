use dynvoke_core::{LookupError, ServiceRegistry};
use sample_service::{SampleService, descriptors};
use serde_json::json;

fn registry() -> ServiceRegistry {
    let mut registry = ServiceRegistry::new();
    registry.register("SampleService", SampleService::new(), descriptors());
    registry
}

#[test]
fn call_resolves_and_invokes() {
    let registry = registry();
    let input = [json!(2), json!(3)];

    let result = registry.call("SampleService", "add", Some(&input)).unwrap();

    assert_eq!(result, "5");
}

#[test]
fn unknown_service_is_a_lookup_error() {
    let registry = registry();

    let err = registry.call("GhostService", "add", None).unwrap_err();

    assert!(matches!(err, LookupError::ServiceNotFound(name) if name == "GhostService"));
}

#[test]
fn unknown_method_is_a_lookup_error() {
    let registry = registry();

    let err = registry.call("SampleService", "subtract", None).unwrap_err();

    assert!(matches!(err, LookupError::MethodNotFound(name) if name == "subtract"));
}

#[test]
fn registered_services_and_methods_are_listed() {
    let registry = registry();

    let services: Vec<&str> = registry.services().collect();
    assert_eq!(services, ["SampleService"]);

    let mut methods: Vec<String> = registry
        .methods("SampleService")
        .expect("service is registered")
        .map(|method| method.name().to_owned())
        .collect();
    methods.sort_unstable();
    assert_eq!(
        methods,
        ["add", "always_fail", "create_profile", "ping", "reset", "set_state"]
    );
    assert!(registry.methods("GhostService").is_none());
}

#[test]
fn reregistering_replaces_the_previous_entry() {
    let mut registry = registry();
    registry.register("SampleService", SampleService::new(), Vec::new());

    let err = registry.call("SampleService", "add", None).unwrap_err();

    assert!(matches!(err, LookupError::MethodNotFound(_)));
}
