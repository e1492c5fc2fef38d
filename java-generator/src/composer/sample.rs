//! Usage samples, one per method call shape.
//!
//! Every sample constructs the client with its zero-argument factory inside
//! a try-with-resources block and performs a single call. Unary shapes get a
//! sample for the request-object call and one per convenience overload.

use crate::ast::{ClassDefinition, Expr, MethodDefinition, Statement, TypeNode, Variable, known};
use crate::classifier::MethodShape;
use crate::error::GenerateError;
use crate::naming;

use super::region_tag::RegionTag;
use super::signature::{self, Overload};
use super::{ClassifiedMethod, ServiceContext, default_value};

const GENERATED_NOTICE: &str = "\
This snippet has been automatically generated and should be regarded as a code template only.
It will require modifications to work:
- It may require correct/in-range values for request initialization.
- It may require specifying regional endpoints when creating the service client as shown in
https://cloud.google.com/java/docs/setup#configure_endpoints_for_the_client_library";

const ELEMENT_COMMENT: &str = "doThingsWith(element);";
const STREAM_COMMENT: &str = "Do something when a response is received.";

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Statements of the sample method, starting with the try block.
    pub body: Vec<Statement>,
    pub region_tag: RegionTag,
}

/// All samples for one method, default request sample first.
pub fn compose_samples(
    ctx: &ServiceContext<'_>,
    cm: &ClassifiedMethod<'_>,
) -> Result<Vec<Sample>, GenerateError> {
    let method = cm.method;
    let client = Variable::new(ctx.client_variable_name(), TypeNode::Declared(ctx.client_type()));
    let input = ctx.message(&method.input_type)?;
    let request_type = ctx.message_type(&method.input_type)?;
    let request = Variable::new("request", request_type.clone());
    let request_decl = Expr::declare(request.clone(), default_value::request_value(ctx, input)?);

    let mut samples = Vec::new();
    match &cm.shape {
        MethodShape::ClientStreaming => {
            tracing::debug!(method = %method.name, "no sample for client-streaming method");
        }
        MethodShape::ServerStreaming => {
            let response_type = ctx.message_type(&method.output_type)?;
            let stream = Variable::new("stream", known::server_stream(response_type.clone()));
            let body = vec![
                Statement::expr(request_decl),
                Statement::expr(Expr::declare(
                    stream.clone(),
                    Expr::call(callable(&client, cm), "call", vec![Expr::var(&request)]),
                )),
                response_loop(response_type, &stream),
            ];
            samples.push(sample(ctx, &client, cm, body, "Callable"));
        }
        MethodShape::BidiStreaming => {
            let response_type = ctx.message_type(&method.output_type)?;
            let stream = Variable::new(
                "bidiStream",
                known::bidi_stream(request_type, response_type.clone()),
            );
            let body = vec![
                Statement::expr(Expr::declare(
                    stream.clone(),
                    Expr::call(callable(&client, cm), "call", vec![]),
                )),
                Statement::expr(request_decl),
                Statement::expr(Expr::call(Expr::var(&stream), "send", vec![Expr::var(&request)])),
                response_loop(response_type, &stream),
            ];
            samples.push(sample(ctx, &client, cm, body, "Callable"));
        }
        MethodShape::Simple | MethodShape::Paginated(_) | MethodShape::LongRunning(_) => {
            let (mut body, suffix) = unary_call(ctx, &client, cm, std::slice::from_ref(&request))?;
            body.insert(0, Statement::expr(request_decl));
            samples.push(sample(ctx, &client, cm, body, &suffix));

            for overload in signature::overloads(ctx, method)? {
                if let Some(s) = overload_sample(ctx, &client, cm, &overload)? {
                    samples.push(s);
                }
            }
        }
    }
    Ok(samples)
}

fn overload_sample(
    ctx: &ServiceContext<'_>,
    client: &Variable,
    cm: &ClassifiedMethod<'_>,
    overload: &Overload,
) -> Result<Option<Sample>, GenerateError> {
    let input = ctx.message(&cm.method.input_type)?;
    let mut body = Vec::new();
    for arg in &overload.args {
        let Some(value) = default_value::arg_value(ctx, input, arg)? else {
            tracing::debug!(
                method = %cm.method.name,
                arg = %arg.variable.name,
                "no example value for argument; skipping overload sample"
            );
            return Ok(None);
        };
        body.push(Statement::expr(Expr::declare(arg.variable.clone(), value)));
    }
    let (call, suffix) = unary_call(ctx, client, cm, &overload.params())?;
    body.extend(call);
    Ok(Some(sample(ctx, client, cm, body, &suffix)))
}

/// The shape-specific call and the disambiguation suffix it implies.
fn unary_call(
    ctx: &ServiceContext<'_>,
    client: &Variable,
    cm: &ClassifiedMethod<'_>,
    args: &[Variable],
) -> Result<(Vec<Statement>, String), GenerateError> {
    let method = cm.method;
    let mut suffix: String = args.iter().map(|a| disambiguation_name(&a.ty)).collect();
    let arg_exprs: Vec<Expr> = args.iter().map(Expr::var).collect();
    let java_name = cm.java_name();
    let method_name = cm.method_name();

    let statements = match &cm.shape {
        MethodShape::Paginated(pagination) => {
            let element = Variable::new("element", ctx.element_type(&pagination.element)?);
            let iterate_all = Expr::call(
                Expr::call(Expr::var(client), method_name, arg_exprs),
                "iterateAll",
                vec![],
            );
            suffix.push_str("IterateAll");
            vec![Statement::For {
                variable: element,
                collection: iterate_all,
                body: vec![Statement::comment(ELEMENT_COMMENT)],
            }]
        }
        MethodShape::LongRunning(lro) => {
            let get = Expr::call(
                Expr::call(Expr::var(client), format!("{java_name}Async"), arg_exprs),
                "get",
                vec![],
            );
            suffix.push_str("Get");
            vec![response_statement(ctx, &lro.response_type, get)?]
        }
        _ => {
            let call = Expr::call(Expr::var(client), method_name, arg_exprs);
            vec![response_statement(ctx, &method.output_type, call)?]
        }
    };
    Ok((statements, suffix))
}

/// `Resp response = <call>;`, or the bare call for the void message.
fn response_statement(
    ctx: &ServiceContext<'_>,
    output: &str,
    call: Expr,
) -> Result<Statement, GenerateError> {
    if ctx.is_void(output) {
        return Ok(Statement::expr(call));
    }
    let ty = ctx.message_type(output)?;
    let response = Variable::new("response", ty.clone());
    Ok(Statement::expr(Expr::declare(response, call.returning(ty))))
}

fn callable(client: &Variable, cm: &ClassifiedMethod<'_>) -> Expr {
    Expr::call(Expr::var(client), format!("{}Callable", cm.java_name()), vec![])
}

fn response_loop(response_type: TypeNode, stream: &Variable) -> Statement {
    Statement::For {
        variable: Variable::new("response", response_type),
        collection: Expr::var(stream),
        body: vec![Statement::comment(STREAM_COMMENT)],
    }
}

fn sample(
    ctx: &ServiceContext<'_>,
    client: &Variable,
    cm: &ClassifiedMethod<'_>,
    body: Vec<Statement>,
    suffix: &str,
) -> Sample {
    let create = Expr::call_static(ctx.client_type(), "create", vec![]);
    Sample {
        body: vec![Statement::Try {
            resources: vec![Expr::declare(client.clone(), create)],
            body,
        }],
        region_tag: RegionTag::new(
            &ctx.service.proto_package,
            ctx.client_name(),
            &cm.method.name,
            suffix,
        ),
    }
}

/// Capitalized primitive keyword or declared simple name.
fn disambiguation_name(ty: &TypeNode) -> String {
    match ty {
        TypeNode::Primitive(kind) => naming::upper_camel(kind.keyword()),
        TypeNode::Declared(r) | TypeNode::Generic(r, _) => naming::upper_camel(&r.name),
        TypeNode::Array(inner) => format!("{}Array", disambiguation_name(inner)),
    }
}

/// `Sync<Rpc><Suffix>`: the suffix is lowercased, then capitalized.
pub fn sample_class_name(tag: &RegionTag) -> String {
    format!(
        "Sync{}{}",
        tag.rpc_name,
        naming::upper_camel(&tag.overload_disambiguation.to_lowercase())
    )
}

/// Executable form: a class with `main` delegating to a static method
/// holding the sample body, wrapped in region-tag comments.
pub fn sample_class(ctx: &ServiceContext<'_>, sample: &Sample) -> ClassDefinition {
    let name = sample_class_name(&sample.region_tag);
    let method_name = naming::lower_camel(&name);

    let mut main = MethodDefinition::new("main", TypeNode::VOID);
    main.is_static = true;
    main.params = vec![Variable::new(
        "args",
        TypeNode::Array(Box::new(known::string())),
    )];
    main.throws = vec![known::exception()];
    main.body = vec![Statement::expr(Expr::call_local(&method_name, vec![]))];

    let mut run = MethodDefinition::new(method_name, TypeNode::VOID);
    run.is_static = true;
    run.throws = vec![known::exception()];
    run.body = std::iter::once(Statement::comment(GENERATED_NOTICE))
        .chain(sample.body.iter().cloned())
        .collect();

    ClassDefinition {
        file_header: ctx.config.header.lines(),
        region_tag: Some(sample.region_tag.generate()),
        methods: vec![main, run],
        ..ClassDefinition::new(ctx.samples_package(), name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::test_support::echo_api;
    use crate::config::GeneratorConfig;
    use crate::printer::print_class;

    fn samples_for(name: &str) -> Vec<(String, String)> {
        let api = echo_api();
        let config = GeneratorConfig::default();
        let ctx = ServiceContext::new(&api, &config, &api.services()[0]).unwrap();
        let cm = ctx.methods.iter().find(|m| m.method.name == name).unwrap();
        compose_samples(&ctx, cm)
            .unwrap()
            .iter()
            .map(|s| {
                let class = sample_class(&ctx, s);
                (s.region_tag.generate(), print_class(&class, &config.format).unwrap())
            })
            .collect()
    }

    #[test]
    fn simple_sample_assigns_response() {
        let samples = samples_for("Echo");
        let (tag, text) = &samples[0];
        assert_eq!(tag, "showcase_v1beta1_generated_echoclient_echo_echorequest_sync");
        assert!(text.contains("public class SyncEchoEchorequest {"));
        assert!(text.contains(
            "    try (EchoClient echoClient = EchoClient.create()) {\n\
             \x20     EchoRequest request =\n\
             \x20         EchoRequest.newBuilder()\n\
             \x20             .setContent(\"content951530617\")\n\
             \x20             .setSeverity(Severity.forNumber(0))\n\
             \x20             .build();\n\
             \x20     EchoResponse response = echoClient.echo(request);\n\
             \x20   }\n"
        ));
        // request object plus two convenience overloads
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[1].0, "showcase_v1beta1_generated_echoclient_echo_string_sync");
        assert_eq!(
            samples[2].0,
            "showcase_v1beta1_generated_echoclient_echo_stringseverity_sync"
        );
    }

    #[test]
    fn void_output_has_no_response_variable() {
        let samples = samples_for("Block");
        let text = &samples[0].1;
        assert!(text.contains("      echoClient.block(request);\n"));
        assert!(!text.contains("response"));
    }

    #[test]
    fn paged_sample_loops_over_iterate_all() {
        let samples = samples_for("PagedExpand");
        assert_eq!(samples.len(), 1);
        let (tag, text) = &samples[0];
        assert_eq!(
            tag,
            "showcase_v1beta1_generated_echoclient_pagedexpand_pagedexpandrequestiterateall_sync"
        );
        assert!(text.contains(
            "      for (EchoResponse element : echoClient.pagedExpand(request).iterateAll()) {\n\
             \x20       // doThingsWith(element);\n\
             \x20     }\n"
        ));
        assert!(!text.contains("response ="));
    }

    #[test]
    fn long_running_sample_blocks_on_future() {
        let samples = samples_for("Wait");
        let tags: Vec<&str> = samples.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(
            tags,
            vec![
                "showcase_v1beta1_generated_echoclient_wait_waitrequestget_sync",
                "showcase_v1beta1_generated_echoclient_wait_durationget_sync",
            ]
        );
        assert!(samples[0].1.contains("      WaitResponse response = echoClient.waitAsync(request).get();\n"));
        assert!(samples[1].1.contains("      Duration ttl = Duration.newBuilder().build();\n"));
        assert!(samples[1].1.contains("import com.google.protobuf.Duration;\n"));
    }

    #[test]
    fn resource_overloads_sample_typed_and_string_forms() {
        let samples = samples_for("GetFoobar");
        let tags: Vec<&str> = samples.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(
            tags,
            vec![
                "showcase_v1beta1_generated_echoclient_getfoobar_getfoobarrequest_sync",
                "showcase_v1beta1_generated_echoclient_getfoobar_foobarname_sync",
                "showcase_v1beta1_generated_echoclient_getfoobar_string_sync",
            ]
        );
        assert!(samples[1].1.contains("      FoobarName name = FoobarName.of(\"[PROJECT]\", \"[FOOBAR]\");\n"));
        assert!(samples[2].1.contains(
            "      String name = FoobarName.of(\"[PROJECT]\", \"[FOOBAR]\").toString();\n"
        ));
    }

    #[test]
    fn streaming_samples_use_callables() {
        let server = samples_for("Expand");
        assert_eq!(server[0].0, "showcase_v1beta1_generated_echoclient_expand_callable_sync");
        assert!(server[0].1.contains(
            "      ServerStream<EchoResponse> stream = echoClient.expandCallable().call(request);\n"
        ));

        let bidi = samples_for("Chat");
        assert!(bidi[0].1.contains(
            "      BidiStream<EchoRequest, EchoResponse> bidiStream = echoClient.chatCallable().call();\n"
        ));
        assert!(bidi[0].1.contains("      bidiStream.send(request);\n"));
        assert!(bidi[0].1.contains("      for (EchoResponse response : bidiStream) {\n"));

        assert!(samples_for("Collect").is_empty());
    }

    #[test]
    fn executable_form_matches_snippet_layout() {
        let samples = samples_for("Block");
        let text = &samples[0].1;
        assert!(text.starts_with("/*\n * Copyright 2022 Google LLC\n *\n"));
        assert!(text.contains(
            "package com.google.showcase.v1beta1.samples;\n\
             \n\
             // [START showcase_v1beta1_generated_echoclient_block_blockrequest_sync]\n\
             import com.google.showcase.v1beta1.BlockRequest;\n\
             import com.google.showcase.v1beta1.EchoClient;\n\
             import java.util.HashMap;\n\
             \n\
             public class SyncBlockBlockrequest {\n\
             \n\
             \x20 public static void main(String[] args) throws Exception {\n\
             \x20   syncBlockBlockrequest();\n\
             \x20 }\n\
             \n\
             \x20 public static void syncBlockBlockrequest() throws Exception {\n\
             \x20   // This snippet has been automatically generated and should be regarded as a code template only.\n"
        ));
        assert!(text.ends_with("}\n// [END showcase_v1beta1_generated_echoclient_block_blockrequest_sync]\n"));
    }
}
