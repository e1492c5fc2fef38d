//! Client facade `<Service>Client`.
//!
//! Layout follows the published gapic clients: fields, factories,
//! constructors, getters, then per method its convenience overloads, the
//! canonical request-object call and the callable accessors. Paged methods
//! add three nested wrapper classes at the end.

use crate::ast::{
    Annotation, BuilderChain, ClassDefinition, Expr, FieldDecl, Literal, MethodDefinition, Scope,
    Statement, TypeNode, TypeRef, Variable, known,
};
use crate::classifier::{MethodShape, Pagination};
use crate::error::GenerateError;

use super::signature::{self, Overload};
use super::stub::callable_accessors;
use super::{ClassifiedMethod, ServiceContext};

const STUB_BETA_NOTICE: &str =
    "A restructuring of stub classes is planned, so this may break in the future";

pub fn compose_client(ctx: &ServiceContext<'_>) -> Result<ClassDefinition, GenerateError> {
    let client_type = ctx.client_type();
    let settings = Variable::new("settings", TypeNode::Declared(ctx.settings_type()));
    let stub = Variable::new("stub", TypeNode::Declared(ctx.stub_type()));
    let operations_client_ref = TypeRef::new(known::LONGRUNNING, "OperationsClient");
    let operations_client = Variable::new(
        "operationsClient",
        TypeNode::Declared(operations_client_ref.clone()),
    );

    let fields = [&settings, &stub, &operations_client]
        .into_iter()
        .map(|v| FieldDecl::private_final(v.clone()))
        .collect();

    let mut methods = factories(ctx, &client_type, &settings, &stub);

    // Both constructors build the operations client from the stub.
    let init_operations = Statement::expr(Expr::assign_field(
        &operations_client,
        Expr::call_static(
            operations_client_ref,
            "create",
            vec![Expr::call(Expr::this_field(&stub), "getOperationsStub", vec![])],
        ),
    ));
    let mut from_settings = MethodDefinition::constructor(&client_type.name);
    from_settings.scope = Scope::Protected;
    from_settings.params = vec![settings.clone()];
    from_settings.throws = vec![known::io_exception()];
    from_settings.body = vec![
        Statement::expr(Expr::assign_field(&settings, Expr::var(&settings))),
        Statement::expr(Expr::assign_field(
            &stub,
            Expr::call(Expr::var(&settings), "createStub", vec![]),
        )),
        init_operations.clone(),
    ];
    let mut from_stub = MethodDefinition::constructor(&client_type.name);
    from_stub.annotations = vec![beta_stub_annotation()];
    from_stub.scope = Scope::Protected;
    from_stub.params = vec![stub.clone()];
    from_stub.body = vec![
        Statement::expr(Expr::assign_field(&settings, Expr::null())),
        Statement::expr(Expr::assign_field(&stub, Expr::var(&stub))),
        init_operations,
    ];
    methods.push(from_settings);
    methods.push(from_stub);

    methods.push(getter("getStub", &stub, false));
    methods.push(getter("getSettings", &settings, true));
    methods.push(getter("getOperationsClient", &operations_client, true));

    let mut nested = Vec::new();
    for cm in &ctx.methods {
        methods.extend(method_surface(ctx, cm, &stub)?);
        if let MethodShape::Paginated(pagination) = &cm.shape {
            nested.extend(paged_classes(ctx, cm, pagination)?);
        }
    }
    methods.extend(background_resource_methods(&stub));

    let class = ClassDefinition {
        annotations: vec![ctx.generated_annotation()],
        implements: vec![known::background_resource()],
        fields,
        methods,
        nested,
        ..ClassDefinition::new(ctx.package(), &client_type.name)
    };
    tracing::debug!(service = %ctx.service.name, class = %class.name, "composed client");
    Ok(class)
}

fn beta_stub_annotation() -> Annotation {
    Annotation::with_value(known::beta_api_annotation(), STUB_BETA_NOTICE)
}

fn factories(
    ctx: &ServiceContext<'_>,
    client_type: &TypeRef,
    settings: &Variable,
    stub: &Variable,
) -> Vec<MethodDefinition> {
    let client = TypeNode::Declared(client_type.clone());
    let factory = |params: Vec<Variable>, body: Expr| MethodDefinition {
        is_static: true,
        is_final: true,
        params,
        body: vec![Statement::Return(body)],
        ..MethodDefinition::new("create", client.clone())
    };

    let mut default = factory(
        vec![],
        Expr::call_local(
            "create",
            vec![Expr::Builder(BuilderChain {
                ty: ctx.settings_type(),
                calls: Vec::new(),
            })],
        ),
    );
    default.throws = vec![known::io_exception()];

    let mut with_settings = factory(
        vec![settings.clone()],
        Expr::new_object(client.clone(), vec![Expr::var(settings)]),
    );
    with_settings.throws = vec![known::io_exception()];

    let mut with_stub = factory(
        vec![stub.clone()],
        Expr::new_object(client.clone(), vec![Expr::var(stub)]),
    );
    with_stub.annotations = vec![beta_stub_annotation()];

    vec![default, with_settings, with_stub]
}

fn getter(name: &str, field: &Variable, is_final: bool) -> MethodDefinition {
    MethodDefinition {
        is_final,
        body: vec![Statement::Return(Expr::var(field))],
        ..MethodDefinition::new(name, field.ty.clone())
    }
}

/// `public final <ty> <name>() { return stub.<name>(); }`.
fn delegate_callable(name: String, ty: TypeNode, stub: &Variable) -> MethodDefinition {
    MethodDefinition {
        is_final: true,
        body: vec![Statement::Return(Expr::call(Expr::var(stub), &name, vec![]))],
        ..MethodDefinition::new(name, ty)
    }
}

/// Everything the facade exposes for one method.
fn method_surface(
    ctx: &ServiceContext<'_>,
    cm: &ClassifiedMethod<'_>,
    stub: &Variable,
) -> Result<Vec<MethodDefinition>, GenerateError> {
    let method = cm.method;
    let java_name = cm.java_name();
    let method_name = cm.method_name();
    let request_ref = ctx.message_ref(&method.input_type)?;
    let request = Variable::new("request", TypeNode::Declared(request_ref.clone()));

    // (call name, return type, callable it goes through, invocation on the callable)
    let canonical = match &cm.shape {
        MethodShape::Simple => {
            let ty = if ctx.is_void(&method.output_type) {
                TypeNode::VOID
            } else {
                ctx.message_type(&method.output_type)?
            };
            Some((method_name, ty, format!("{java_name}Callable"), "call"))
        }
        MethodShape::Paginated(_) => Some((
            method_name,
            TypeNode::Declared(ctx.paged_class(method, "PagedResponse")),
            format!("{java_name}PagedCallable"),
            "call",
        )),
        MethodShape::LongRunning(lro) => Some((
            format!("{java_name}Async"),
            known::operation_future(
                ctx.message_type(&lro.response_type)?,
                ctx.message_type(&lro.metadata_type)?,
            ),
            format!("{java_name}OperationCallable"),
            "futureCall",
        )),
        MethodShape::ServerStreaming
        | MethodShape::ClientStreaming
        | MethodShape::BidiStreaming => None,
    };

    let mut methods = Vec::new();
    if let Some((name, return_type, callable, invoke)) = canonical {
        for overload in signature::overloads(ctx, method)? {
            methods.push(overload_method(
                &name,
                &return_type,
                &request,
                &request_ref,
                &overload,
            ));
        }

        let call = Expr::call(
            Expr::call_local(callable, vec![]),
            invoke,
            vec![Expr::var(&request)],
        );
        let body = if return_type.is_void() {
            Statement::expr(call)
        } else {
            Statement::Return(call)
        };
        methods.push(MethodDefinition {
            is_final: true,
            params: vec![request.clone()],
            body: vec![body],
            ..MethodDefinition::new(name, return_type)
        });
    }

    for accessor in callable_accessors(ctx, cm)? {
        methods.push(delegate_callable(accessor.name, accessor.ty, stub));
    }
    Ok(methods)
}

/// Builds the request from the arguments and forwards to the canonical call.
fn overload_method(
    name: &str,
    return_type: &TypeNode,
    request: &Variable,
    request_ref: &TypeRef,
    overload: &Overload,
) -> MethodDefinition {
    let forward = Expr::call_local(name, vec![Expr::var(request)]);
    let forward = if return_type.is_void() {
        Statement::expr(forward)
    } else {
        Statement::Return(forward)
    };
    MethodDefinition {
        is_final: true,
        params: overload.params(),
        body: vec![
            Statement::expr(Expr::declare(
                request.clone(),
                overload.request_builder(request_ref.clone()),
            )),
            forward,
        ],
        ..MethodDefinition::new(name, return_type.clone())
    }
}

fn background_resource_methods(stub: &Variable) -> Vec<MethodDefinition> {
    let duration = Variable::new("duration", TypeNode::LONG);
    let unit = Variable::new("unit", known::time_unit());
    let delegate = |name: &str, returns: TypeNode, params: Vec<Variable>| {
        let call = Expr::call(
            Expr::var(stub),
            name,
            params.iter().map(Expr::var).collect(),
        );
        let body = if returns.is_void() {
            Statement::expr(call)
        } else {
            Statement::Return(call)
        };
        MethodDefinition {
            annotations: vec![Annotation::marker(known::override_annotation())],
            params,
            body: vec![body],
            ..MethodDefinition::new(name, returns)
        }
    };

    let mut close = delegate("close", TypeNode::VOID, vec![]);
    close.is_final = true;
    let mut await_termination =
        delegate("awaitTermination", TypeNode::BOOLEAN, vec![duration, unit]);
    await_termination.throws = vec![known::interrupted_exception()];

    vec![
        close,
        delegate("shutdown", TypeNode::VOID, vec![]),
        delegate("isShutdown", TypeNode::BOOLEAN, vec![]),
        delegate("isTerminated", TypeNode::BOOLEAN, vec![]),
        delegate("shutdownNow", TypeNode::VOID, vec![]),
        await_termination,
    ]
}

/// `<M>PagedResponse`, `<M>Page` and `<M>FixedSizeCollection`.
fn paged_classes(
    ctx: &ServiceContext<'_>,
    cm: &ClassifiedMethod<'_>,
    pagination: &Pagination,
) -> Result<Vec<ClassDefinition>, GenerateError> {
    let method = cm.method;
    let request = ctx.message_type(&method.input_type)?;
    let response = ctx.message_type(&method.output_type)?;
    let element = ctx.element_type(&pagination.element)?.boxed();
    let paged_response = ctx.paged_class(method, "PagedResponse");
    let page = ctx.paged_class(method, "Page");
    let collection = ctx.paged_class(method, "FixedSizeCollection");
    let page_type = TypeNode::Declared(page.clone());
    let collection_type = TypeNode::Declared(collection.clone());
    let type_args = vec![
        request.clone(),
        response.clone(),
        element.clone(),
        page_type.clone(),
        collection_type.clone(),
    ];
    let nested = |r: &TypeRef, extends: TypeNode, methods: Vec<MethodDefinition>| ClassDefinition {
        is_static: true,
        extends: Some(extends),
        methods,
        ..ClassDefinition::new(ctx.package(), &r.name)
    };
    let super_call = |args: Vec<Expr>| Statement::expr(Expr::call_local("super", args));

    // PagedResponse
    let page_var = Variable::new("page", page_type.clone());
    let mut response_ctor = MethodDefinition::constructor(&paged_response.name);
    response_ctor.params = vec![page_var.clone()];
    response_ctor.body = vec![super_call(vec![
        Expr::var(&page_var),
        Expr::call_static(collection.clone(), "createEmptyCollection", vec![]),
    ])];
    let response_class = nested(
        &paged_response,
        known::abstract_paged_list_response(type_args.clone()),
        vec![response_ctor],
    );

    // Page
    let context = Variable::new(
        "context",
        known::page_context(request.clone(), response.clone(), element.clone()),
    );
    let response_var = Variable::new("response", response.clone());
    let page_params = vec![context.clone(), response_var.clone()];
    let page_args = || vec![Expr::var(&context), Expr::var(&response_var)];

    let mut page_ctor = MethodDefinition::constructor(&page.name);
    page_ctor.scope = Scope::Private;
    page_ctor.params = page_params.clone();
    page_ctor.body = vec![super_call(page_args())];

    let empty_page = MethodDefinition {
        scope: Scope::Private,
        is_static: true,
        body: vec![Statement::Return(Expr::new_object(
            page_type.clone(),
            vec![Expr::null(), Expr::null()],
        ))],
        ..MethodDefinition::new("createEmptyPage", page_type.clone())
    };
    let create_page = MethodDefinition {
        annotations: vec![Annotation::marker(known::override_annotation())],
        scope: Scope::Protected,
        params: page_params,
        body: vec![Statement::Return(Expr::new_object(page_type.clone(), page_args()))],
        ..MethodDefinition::new("createPage", page_type.clone())
    };
    let page_class = nested(
        &page,
        known::abstract_page(vec![request, response, element, page_type.clone()]),
        vec![page_ctor, empty_page, create_page],
    );

    // FixedSizeCollection
    let pages = Variable::new("pages", known::list(page_type));
    let size = Variable::new("collectionSize", TypeNode::INT);
    let collection_params = vec![pages.clone(), size.clone()];
    let collection_args = || vec![Expr::var(&pages), Expr::var(&size)];

    let mut collection_ctor = MethodDefinition::constructor(&collection.name);
    collection_ctor.scope = Scope::Private;
    collection_ctor.params = collection_params.clone();
    collection_ctor.body = vec![super_call(collection_args())];

    let empty_collection = MethodDefinition {
        scope: Scope::Private,
        is_static: true,
        body: vec![Statement::Return(Expr::new_object(
            collection_type.clone(),
            vec![Expr::null(), Expr::Literal(Literal::Int(0))],
        ))],
        ..MethodDefinition::new("createEmptyCollection", collection_type.clone())
    };
    let create_collection = MethodDefinition {
        annotations: vec![Annotation::marker(known::override_annotation())],
        scope: Scope::Protected,
        params: collection_params,
        body: vec![Statement::Return(Expr::new_object(
            collection_type.clone(),
            collection_args(),
        ))],
        ..MethodDefinition::new("createCollection", collection_type)
    };
    let collection_class = nested(
        &collection,
        known::abstract_fixed_size_collection(type_args),
        vec![collection_ctor, empty_collection, create_collection],
    );

    Ok(vec![response_class, page_class, collection_class])
}
