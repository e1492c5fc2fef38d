//! Java client-library generator.
//!
//! Proto files are parsed and normalized into a [`parser::descriptor::Api`],
//! every service is composed into client, settings and stub classes plus one
//! runnable sample per method call shape, and the resulting ASTs are printed
//! to Java source text.

pub mod ast;
pub mod classifier;
pub mod composer;
pub mod config;
pub mod error;
pub mod naming;
pub mod printer;

use std::collections::HashSet;
use std::path::Path;
use std::thread;

use parser::descriptor::{Api, Service};
use parser::parse_proto_file;

use crate::ast::ClassDefinition;
use crate::composer::ServiceContext;
use crate::composer::sample::{self, Sample};

pub use crate::config::GeneratorConfig;
pub use crate::error::GenerateError;

const CLASS_ROOT: &str = "src/main/java";
const SAMPLE_ROOT: &str = "samples/snippets/generated/main/java";

/// A composed production class.
#[derive(Debug, Clone)]
pub struct GapicClass {
    pub service: String,
    pub class: ClassDefinition,
}

/// A method sample together with its executable class form.
#[derive(Debug, Clone)]
pub struct GeneratedSample {
    pub service: String,
    pub sample: Sample,
    pub class: ClassDefinition,
}

#[derive(Debug, Clone, Default)]
pub struct GeneratedOutput {
    pub classes: Vec<GapicClass>,
    pub samples: Vec<GeneratedSample>,
}

impl GeneratedOutput {
    fn append(&mut self, other: GeneratedOutput) {
        self.classes.extend(other.classes);
        self.samples.extend(other.samples);
    }
}

/// Compose every service of `api`.
///
/// Services are independent, so with `config.parallel` each one is composed
/// on its own scoped thread; results are merged in declaration order either
/// way.
pub fn generate(api: &Api, config: &GeneratorConfig) -> Result<GeneratedOutput, GenerateError> {
    let services = api.services();
    let per_service: Vec<Result<GeneratedOutput, GenerateError>> =
        if config.parallel && services.len() > 1 {
            thread::scope(|scope| {
                let handles: Vec<_> = services
                    .iter()
                    .map(|service| scope.spawn(move || compose_service(api, config, service)))
                    .collect();
                handles
                    .into_iter()
                    .map(|handle| {
                        handle
                            .join()
                            .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                    })
                    .collect()
            })
        } else {
            services
                .iter()
                .map(|service| compose_service(api, config, service))
                .collect()
        };

    let mut output = GeneratedOutput::default();
    for result in per_service {
        output.append(result?);
    }

    let mut tags = HashSet::new();
    for generated in &output.samples {
        let tag = generated.sample.region_tag.generate();
        if !tags.insert(tag.clone()) {
            return Err(GenerateError::DuplicateRegionTag(tag));
        }
    }

    tracing::info!(
        services = services.len(),
        classes = output.classes.len(),
        samples = output.samples.len(),
        "generation finished"
    );
    Ok(output)
}

fn compose_service(
    api: &Api,
    config: &GeneratorConfig,
    service: &Service,
) -> Result<GeneratedOutput, GenerateError> {
    let ctx = ServiceContext::new(api, config, service)?;
    let classes = [
        composer::client::compose_client(&ctx)?,
        composer::settings::compose_settings(&ctx)?,
        composer::stub::compose_stub(&ctx)?,
    ]
    .into_iter()
    .map(|class| GapicClass {
        service: service.name.clone(),
        class,
    })
    .collect();

    let mut samples = Vec::new();
    for cm in &ctx.methods {
        for sample in sample::compose_samples(&ctx, cm)? {
            tracing::debug!(
                service = %service.name,
                method = %cm.method.name,
                shape = cm.shape.as_str(),
                region_tag = %sample.region_tag.generate(),
                "composed sample"
            );
            let class = sample::sample_class(&ctx, &sample);
            samples.push(GeneratedSample {
                service: service.name.clone(),
                sample,
                class,
            });
        }
    }
    Ok(GeneratedOutput { classes, samples })
}

/// Print every class and sample as `(relative path, source text)`: per
/// service client, settings and stub, then all samples in method order.
pub fn print_output(
    output: &GeneratedOutput,
    config: &GeneratorConfig,
) -> Result<Vec<(String, String)>, GenerateError> {
    let mut files = Vec::with_capacity(output.classes.len() + output.samples.len());
    for gapic in &output.classes {
        let path = format!(
            "{CLASS_ROOT}/{}/{}.java",
            package_path(&gapic.class.package),
            gapic.class.name
        );
        files.push((path, printer::print_class(&gapic.class, &config.format)?));
    }
    for generated in &output.samples {
        let tag = &generated.sample.region_tag;
        let path = format!(
            "{SAMPLE_ROOT}/{}/{}/{}/{}.java",
            package_path(&generated.class.package),
            tag.service_name.to_lowercase(),
            tag.rpc_name.to_lowercase(),
            generated.class.name
        );
        files.push((path, printer::print_class(&generated.class, &config.format)?));
    }
    Ok(files)
}

fn package_path(package: &str) -> String {
    package.replace('.', "/")
}

/// Parse one `.proto` file and generate with the default configuration.
pub fn generate_java_from_proto<P: AsRef<Path>>(
    proto_path: P,
) -> Result<Vec<(String, String)>, GenerateError> {
    generate_java_from_protos(&[proto_path], &GeneratorConfig::default())
}

/// Parse and normalize several `.proto` files together, then generate.
pub fn generate_java_from_protos<P: AsRef<Path>>(
    proto_paths: &[P],
    config: &GeneratorConfig,
) -> Result<Vec<(String, String)>, GenerateError> {
    let models = proto_paths
        .iter()
        .map(parse_proto_file)
        .collect::<Result<Vec<_>, _>>()?;
    let api = Api::build(&models, &config.build_options())?;
    let output = generate(&api, config)?;
    print_output(&output, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::test_support::echo_api;

    #[test]
    fn output_order_is_client_settings_stub_then_samples() {
        let api = echo_api();
        let config = GeneratorConfig::default();
        let output = generate(&api, &config).unwrap();
        let names: Vec<&str> = output.classes.iter().map(|c| c.class.name.as_str()).collect();
        assert_eq!(names, vec!["EchoClient", "EchoSettings", "EchoStub"]);

        let files = print_output(&output, &config).unwrap();
        assert_eq!(files[0].0, "src/main/java/com/google/showcase/v1beta1/EchoClient.java");
        assert_eq!(files[2].0, "src/main/java/com/google/showcase/v1beta1/stub/EchoStub.java");
        assert_eq!(
            files[3].0,
            "samples/snippets/generated/main/java/com/google/showcase/v1beta1/samples/\
             echoclient/echo/SyncEchoEchorequest.java"
        );
    }

    fn build_api(protos: &[&str]) -> Api {
        let models: Vec<_> = protos
            .iter()
            .map(|text| parser::parse_proto_str(text).unwrap())
            .collect();
        Api::build(&models, &Default::default()).unwrap()
    }

    #[test]
    fn colliding_sample_suffixes_abort_the_run() {
        // Both overloads are legal Java, but the two `Thing` types share a
        // simple name and so a disambiguation suffix.
        let api = build_api(&[
            r#"
            syntax = "proto3";
            package demo.v1;
            service Demo {
              rpc Get(Req) returns (Thing) {
                option (google.api.method_signature) = "local";
                option (google.api.method_signature) = "remote";
              }
            }
            message Thing { string id = 1; }
            message Req {
              Thing local = 1;
              .other.v1.Thing remote = 2;
            }
            "#,
            r#"
            syntax = "proto3";
            package other.v1;
            message Thing { string id = 1; }
            "#,
        ]);
        let err = generate(&api, &GeneratorConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::DuplicateRegionTag(ref tag) if tag == "demo_v1_generated_democlient_get_thing_sync"
        ));
    }

    #[test]
    fn reserved_method_names_are_escaped_in_samples() {
        let api = build_api(&[r#"
            syntax = "proto3";
            package demo.v1;
            service Demo {
              rpc Import(Req) returns (Req);
            }
            message Req { string package = 1; }
            "#]);
        let config = GeneratorConfig::default();
        let files = print_output(&generate(&api, &config).unwrap(), &config).unwrap();
        let (path, sample) = &files[3];
        assert!(path.ends_with("/democlient/import/SyncImportReq.java"), "{path}");
        assert!(sample.contains("      Req response = demoClient.import_(request);\n"));
    }

    #[test]
    fn sequential_and_parallel_runs_agree() {
        let api = echo_api();
        let parallel = GeneratorConfig::default();
        let sequential = GeneratorConfig {
            parallel: false,
            ..GeneratorConfig::default()
        };
        let a = print_output(&generate(&api, &parallel).unwrap(), &parallel).unwrap();
        let b = print_output(&generate(&api, &sequential).unwrap(), &sequential).unwrap();
        assert_eq!(a, b);
    }
}
