//! Transport stub: the capability surface the client facade delegates to.

use crate::ast::{Annotation, ClassDefinition, MethodDefinition, TypeNode, known};
use crate::classifier::MethodShape;
use crate::error::GenerateError;

use super::{ClassifiedMethod, ServiceContext};

/// One callable accessor shared by the stub and the client facade.
#[derive(Debug, Clone, PartialEq)]
pub struct CallableAccessor {
    pub name: String,
    pub ty: TypeNode,
}

/// Callable accessors for a method, in declaration order: the
/// shape-specific one first, then the plain unary callable when the shape
/// wraps one.
pub fn callable_accessors(
    ctx: &ServiceContext<'_>,
    cm: &ClassifiedMethod<'_>,
) -> Result<Vec<CallableAccessor>, GenerateError> {
    let method = cm.method;
    let name = cm.java_name();
    let request = ctx.message_type(&method.input_type)?;
    let response = ctx.message_type(&method.output_type)?;
    let accessor = |suffix: &str, ty: TypeNode| CallableAccessor {
        name: format!("{name}{suffix}"),
        ty,
    };

    let accessors = match &cm.shape {
        MethodShape::Simple => vec![accessor("Callable", known::unary_callable(request, response))],
        MethodShape::Paginated(_) => {
            let paged = TypeNode::Declared(ctx.paged_class(method, "PagedResponse"));
            vec![
                accessor("PagedCallable", known::unary_callable(request.clone(), paged)),
                accessor("Callable", known::unary_callable(request, response)),
            ]
        }
        MethodShape::LongRunning(lro) => vec![
            accessor(
                "OperationCallable",
                known::operation_callable(
                    request.clone(),
                    ctx.message_type(&lro.response_type)?,
                    ctx.message_type(&lro.metadata_type)?,
                ),
            ),
            accessor("Callable", known::unary_callable(request, response)),
        ],
        MethodShape::ServerStreaming => vec![accessor(
            "Callable",
            known::server_streaming_callable(request, response),
        )],
        MethodShape::ClientStreaming => vec![accessor(
            "Callable",
            known::client_streaming_callable(request, response),
        )],
        MethodShape::BidiStreaming => vec![accessor(
            "Callable",
            known::bidi_streaming_callable(request, response),
        )],
    };
    Ok(accessors)
}

fn abstract_method(name: impl Into<String>, ty: TypeNode) -> MethodDefinition {
    MethodDefinition {
        is_abstract: true,
        ..MethodDefinition::new(name, ty)
    }
}

/// `public abstract class <Service>Stub implements BackgroundResource`.
pub fn compose_stub(ctx: &ServiceContext<'_>) -> Result<ClassDefinition, GenerateError> {
    let mut methods = vec![abstract_method("getOperationsStub", known::operations_stub())];
    for cm in &ctx.methods {
        for accessor in callable_accessors(ctx, cm)? {
            methods.push(abstract_method(accessor.name, accessor.ty));
        }
    }
    let mut close = abstract_method("close", TypeNode::VOID);
    close.annotations.push(Annotation::marker(known::override_annotation()));
    methods.push(close);

    let class = ClassDefinition {
        annotations: vec![ctx.generated_annotation()],
        is_abstract: true,
        implements: vec![known::background_resource()],
        methods,
        ..ClassDefinition::new(ctx.stub_package(), ctx.stub_name())
    };
    tracing::debug!(service = %ctx.service.name, class = %class.name, "composed stub");
    Ok(class)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::test_support::echo_api;
    use crate::config::GeneratorConfig;
    use crate::printer::print_class;

    fn stub_text() -> String {
        let api = echo_api();
        let config = GeneratorConfig::default();
        let ctx = ServiceContext::new(&api, &config, &api.services()[0]).unwrap();
        print_class(&compose_stub(&ctx).unwrap(), &config.format).unwrap()
    }

    #[test]
    fn stub_lives_in_stub_package_and_is_abstract() {
        let text = stub_text();
        assert!(text.starts_with("package com.google.showcase.v1beta1.stub;\n"));
        assert!(text.contains(
            "@Generated(\"by gapic-generator-java\")\n\
             public abstract class EchoStub implements BackgroundResource {\n\
             \n\
             \x20 public abstract OperationsStub getOperationsStub();\n"
        ));
        assert!(text.ends_with("  @Override\n  public abstract void close();\n}\n"));
    }

    #[test]
    fn accessors_are_typed_by_shape() {
        let text = stub_text();
        for line in [
            "  public abstract UnaryCallable<EchoRequest, EchoResponse> echoCallable();\n",
            "  public abstract ServerStreamingCallable<ExpandRequest, EchoResponse> expandCallable();\n",
            "  public abstract ClientStreamingCallable<EchoRequest, EchoResponse> collectCallable();\n",
            "  public abstract BidiStreamingCallable<EchoRequest, EchoResponse> chatCallable();\n",
            "  public abstract UnaryCallable<PagedExpandRequest, PagedExpandResponse> pagedExpandCallable();\n",
            "  public abstract OperationCallable<WaitRequest, WaitResponse, WaitMetadata>\n      waitOperationCallable();\n",
            "  public abstract UnaryCallable<WaitRequest, Operation> waitCallable();\n",
            "  public abstract UnaryCallable<BlockRequest, Empty> blockCallable();\n",
        ] {
            assert!(text.contains(line), "missing {line:?} in\n{text}");
        }
        assert!(text.contains("import com.google.showcase.v1beta1.EchoClient;\n"));
        assert!(text.contains(
            "UnaryCallable<PagedExpandRequest, EchoClient.PagedExpandPagedResponse>\n      \
             pagedExpandPagedCallable();\n"
        ));
    }
}
