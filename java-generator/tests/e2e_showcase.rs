use std::collections::{HashMap, HashSet};
use std::path::Path;

use java_generator::{GenerateError, GeneratorConfig, generate_java_from_proto, generate_java_from_protos};

const SHOWCASE: &str = "tests/resources/showcase.proto";
const CLASSES: &str = "src/main/java/com/google/showcase/v1beta1";
const SAMPLES: &str = "samples/snippets/generated/main/java/com/google/showcase/v1beta1/samples";

fn generate_showcase() -> HashMap<String, String> {
    generate_java_from_proto(Path::new(SHOWCASE))
        .expect("generation should succeed")
        .into_iter()
        .collect()
}

fn file<'a>(files: &'a HashMap<String, String>, path: &str) -> &'a str {
    files
        .get(path)
        .unwrap_or_else(|| panic!("missing generated file: {path}"))
}

#[test]
fn e2e_generate_showcase_proto() {
    let files = generate_showcase();

    let expected_classes = [
        format!("{CLASSES}/EchoClient.java"),
        format!("{CLASSES}/EchoSettings.java"),
        format!("{CLASSES}/stub/EchoStub.java"),
        format!("{CLASSES}/IdentityClient.java"),
        format!("{CLASSES}/IdentitySettings.java"),
        format!("{CLASSES}/stub/IdentityStub.java"),
    ];
    for path in &expected_classes {
        assert!(files.contains_key(path), "missing generated file: {path}");
    }

    let samples = files.keys().filter(|p| p.starts_with(SAMPLES)).count();
    // Echo: 3 + 1 + 0 + 1 + 1 + 2 + 1, Identity: 3 + 3 + 3 + 1 + 3
    assert_eq!(samples, 22);
    assert_eq!(files.len(), expected_classes.len() + samples, "unexpected extra files");

    for (path, src) in &files {
        assert!(src.contains("package com.google.showcase.v1beta1"), "{path} missing package");
    }
}

#[test]
fn simple_method_surface_and_sample() {
    let files = generate_showcase();
    let client = file(&files, &format!("{CLASSES}/EchoClient.java"));
    assert!(client.contains("  public final EchoResponse echo(EchoRequest request) {\n"));
    assert!(client.contains("  public final UnaryCallable<EchoRequest, EchoResponse> echoCallable() {\n"));

    let sample = file(&files, &format!("{SAMPLES}/echoclient/echo/SyncEchoEchorequest.java"));
    assert!(sample.contains("// [START showcase_v1beta1_generated_echoclient_echo_echorequest_sync]\n"));
    assert!(sample.contains("      EchoRequest request =\n"));
    assert!(sample.contains("      EchoResponse response = echoClient.echo(request);\n"));
}

#[test]
fn paged_sample_iterates_without_response() {
    let files = generate_showcase();
    let sample = file(
        &files,
        &format!("{SAMPLES}/echoclient/pagedexpand/SyncPagedExpandPagedexpandrequestiterateall.java"),
    );
    assert!(sample.contains("for (EchoResponse element : echoClient.pagedExpand(request).iterateAll()) {"));
    assert!(!sample.contains("response ="));

    let users = file(
        &files,
        &format!("{SAMPLES}/identityclient/listusers/SyncListUsersListusersrequestiterateall.java"),
    );
    assert!(users.contains("              .setParent(ProjectName.of(\"[PROJECT]\").toString())\n"));
    assert!(users.contains("      for (User element : identityClient.listUsers(request).iterateAll()) {\n"));
}

#[test]
fn long_running_sample_blocks_and_assigns() {
    let files = generate_showcase();
    let client = file(&files, &format!("{CLASSES}/EchoClient.java"));
    assert!(client.contains(
        "  public final OperationFuture<WaitResponse, WaitMetadata> waitAsync(WaitRequest request) {\n"
    ));

    let sample = file(&files, &format!("{SAMPLES}/echoclient/wait/SyncWaitWaitrequestget.java"));
    assert!(sample.contains("      WaitResponse response = echoClient.waitAsync(request).get();\n"));
}

#[test]
fn resource_parent_yields_typed_and_string_overloads() {
    let files = generate_showcase();
    let client = file(&files, &format!("{CLASSES}/IdentityClient.java"));
    assert!(client.contains(
        "  public final OperationFuture<Empty, PurgeUsersMetadata> purgeUsersAsync(ProjectName parent) {\n"
    ));
    assert!(client.contains(
        "  public final OperationFuture<Empty, PurgeUsersMetadata> purgeUsersAsync(String parent) {\n"
    ));
    assert_eq!(client.matches("    return purgeUsersAsync(request);\n").count(), 2);
    assert!(client.contains("  public final User createUser(ProjectName parent, User user) {\n"));
    assert!(client.contains("  public final User createUser(String parent, User user) {\n"));

    let typed = file(
        &files,
        &format!("{SAMPLES}/identityclient/purgeusers/SyncPurgeUsersProjectnameget.java"),
    );
    assert!(typed.contains("      ProjectName parent = ProjectName.of(\"[PROJECT]\");\n"));
}

#[test]
fn void_outputs_never_bind_a_response() {
    let files = generate_showcase();
    let client = file(&files, &format!("{CLASSES}/IdentityClient.java"));
    assert!(client.contains(
        "  public final void deleteUser(UserName name) {\n\
         \x20   DeleteUserRequest request =\n"
    ));
    assert!(client.contains("    deleteUser(request);\n"));
    assert!(!client.contains("return deleteUser("));

    let delete = file(
        &files,
        &format!("{SAMPLES}/identityclient/deleteuser/SyncDeleteUserUsername.java"),
    );
    assert!(delete.contains("      identityClient.deleteUser(name);\n"));
    assert!(!delete.contains("response"));

    let purge = file(
        &files,
        &format!("{SAMPLES}/identityclient/purgeusers/SyncPurgeUsersPurgeusersrequestget.java"),
    );
    assert!(purge.contains("      identityClient.purgeUsersAsync(request).get();\n"));

    let block = file(&files, &format!("{SAMPLES}/echoclient/block/SyncBlockBlockrequest.java"));
    assert!(block.contains("      echoClient.block(request);\n"));
}

#[test]
fn region_tags_are_unique() {
    let files = generate_showcase();
    let mut tags = HashSet::new();
    for src in files.values() {
        for line in src.lines() {
            if let Some(tag) = line.strip_prefix("// [START ") {
                assert!(tags.insert(tag.to_string()), "duplicate region tag {tag}");
            }
        }
    }
    assert_eq!(tags.len(), 22);
}

#[test]
fn generation_is_deterministic() {
    let first = generate_java_from_proto(Path::new(SHOWCASE)).unwrap();
    let second = generate_java_from_proto(Path::new(SHOWCASE)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn configuration_changes_naming() {
    let config = GeneratorConfig::from_toml_str(
        r#"
        parallel = false

        [naming]
        client_suffix = "ServiceClient"

        [header]
        enabled = false
        "#,
    )
    .unwrap();
    let files: HashMap<String, String> = generate_java_from_protos(&[SHOWCASE], &config)
        .unwrap()
        .into_iter()
        .collect();
    assert!(files.contains_key(&format!("{CLASSES}/EchoServiceClient.java")));
    let sample = file(
        &files,
        &format!("{SAMPLES}/echoserviceclient/block/SyncBlockBlockrequest.java"),
    );
    assert!(sample.starts_with("package com.google.showcase.v1beta1.samples;\n"));
    assert!(sample.contains("try (EchoServiceClient echoServiceClient = EchoServiceClient.create()) {"));
}

#[test]
fn missing_proto_is_a_parse_error() {
    let err = generate_java_from_proto(Path::new("tests/resources/absent.proto")).unwrap_err();
    assert!(matches!(err, GenerateError::Parse(_)));
}
