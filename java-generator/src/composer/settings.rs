//! Settings `<Service>Settings` and its nested `Builder`.
//!
//! One retry group per method, in method order. Construction never looks at
//! the method shape.

use crate::ast::{
    ClassDefinition, Expr, FieldDecl, Literal, MethodDefinition, Scope, Statement, TypeNode,
    TypeRef, Variable, known,
};
use crate::error::GenerateError;
use crate::naming;

use super::ServiceContext;

fn retry_settings_name(method: &str) -> String {
    format!("{}RetrySettings", naming::lower_camel(method))
}

/// `host[:port]`; hosts declared without a port get the TLS default.
fn default_endpoint(host: &str) -> String {
    if host.contains(':') {
        host.to_string()
    } else {
        format!("{host}:443")
    }
}

pub fn compose_settings(ctx: &ServiceContext<'_>) -> Result<ClassDefinition, GenerateError> {
    let settings_type = ctx.settings_type();
    let stub_settings_type = ctx.stub_settings_type();
    let builder_ref = TypeRef::nested(ctx.package(), vec![settings_type.name.clone()], "Builder");
    let builder_type = TypeNode::Declared(builder_ref.clone());

    let stub_settings = Variable::new("stubSettings", TypeNode::Declared(stub_settings_type.clone()));
    let retry_fields: Vec<Variable> = ctx
        .methods
        .iter()
        .map(|cm| {
            Variable::new(
                retry_settings_name(&cm.method.name),
                TypeNode::Declared(known::retry_settings()),
            )
        })
        .collect();

    let mut fields = vec![FieldDecl::private_final(stub_settings.clone())];
    fields.extend(retry_fields.iter().cloned().map(FieldDecl::private_final));

    // protected <Service>Settings(Builder settingsBuilder)
    let settings_builder = Variable::new("settingsBuilder", builder_type.clone());
    let mut constructor = MethodDefinition::constructor(&settings_type.name);
    constructor.scope = Scope::Protected;
    constructor.params = vec![settings_builder.clone()];
    constructor.body.push(Statement::expr(Expr::assign_field(
        &stub_settings,
        Expr::call(
            Expr::call(Expr::var(&settings_builder), "getStubSettingsBuilder", vec![]),
            "build",
            vec![],
        ),
    )));
    for field in &retry_fields {
        constructor.body.push(Statement::expr(Expr::assign_field(
            field,
            Expr::call(
                Expr::call(Expr::var(&settings_builder), &field.name, vec![]),
                "build",
                vec![],
            ),
        )));
    }

    let mut methods = vec![constructor];
    for field in &retry_fields {
        methods.push(MethodDefinition {
            body: vec![Statement::Return(Expr::var(field))],
            ..MethodDefinition::new(&field.name, field.ty.clone())
        });
    }
    methods.push(MethodDefinition {
        is_final: true,
        body: vec![Statement::Return(Expr::var(&stub_settings))],
        ..MethodDefinition::new("getStubSettings", stub_settings.ty.clone())
    });
    if let Some(host) = &ctx.service.default_host {
        methods.push(MethodDefinition {
            is_static: true,
            body: vec![Statement::Return(Expr::string(default_endpoint(host)))],
            ..MethodDefinition::new("getDefaultEndpoint", known::string())
        });
    }
    methods.push(MethodDefinition {
        throws: vec![known::io_exception()],
        body: vec![Statement::Return(Expr::call(
            Expr::var(&stub_settings),
            "createStub",
            vec![],
        ))],
        ..MethodDefinition::new("createStub", TypeNode::Declared(ctx.stub_type()))
    });
    methods.push(MethodDefinition {
        is_static: true,
        body: vec![Statement::Return(Expr::new_object(builder_type.clone(), vec![]))],
        ..MethodDefinition::new("newBuilder", builder_type.clone())
    });
    methods.push(MethodDefinition {
        body: vec![Statement::Return(Expr::new_object(
            builder_type.clone(),
            vec![Expr::This],
        ))],
        ..MethodDefinition::new("toBuilder", builder_type.clone())
    });

    let builder = compose_builder(
        ctx,
        &builder_ref,
        &settings_type,
        &stub_settings_type,
        &stub_settings,
        &retry_fields,
    );

    let class = ClassDefinition {
        annotations: vec![ctx.generated_annotation()],
        fields,
        methods,
        nested: vec![builder],
        ..ClassDefinition::new(ctx.package(), &settings_type.name)
    };
    tracing::debug!(service = %ctx.service.name, class = %class.name, "composed settings");
    Ok(class)
}

fn compose_builder(
    ctx: &ServiceContext<'_>,
    builder_ref: &TypeRef,
    settings_type: &TypeRef,
    stub_settings_type: &TypeRef,
    stub_settings: &Variable,
    retry_fields: &[Variable],
) -> ClassDefinition {
    let stub_settings_builder = TypeRef::nested(
        &stub_settings_type.package,
        vec![stub_settings_type.name.clone()],
        "Builder",
    );
    let builder_stub = Variable::new("stubSettings", TypeNode::Declared(stub_settings_builder));
    let builder_retries: Vec<Variable> = retry_fields
        .iter()
        .map(|f| Variable::new(&f.name, known::retry_settings_builder()))
        .collect();

    let mut fields = vec![FieldDecl::private_final(builder_stub.clone())];
    fields.extend(builder_retries.iter().cloned().map(FieldDecl::private_final));

    // Fresh builder: defaults from configuration.
    let total_timeout = Expr::call_static(
        known::duration(),
        "ofMillis",
        vec![Expr::Literal(Literal::Long(
            i64::try_from(ctx.config.settings.default_total_timeout_millis).unwrap_or(i64::MAX),
        ))],
    );
    let mut fresh = MethodDefinition::constructor(&builder_ref.name);
    fresh.scope = Scope::Protected;
    fresh.body.push(Statement::expr(Expr::assign_field(
        &builder_stub,
        Expr::call_static(stub_settings_type.clone(), "newBuilder", vec![]),
    )));
    for field in &builder_retries {
        fresh.body.push(Statement::expr(Expr::assign_field(
            field,
            Expr::call(
                Expr::call_static(known::retry_settings(), "newBuilder", vec![]),
                "setTotalTimeout",
                vec![total_timeout.clone()],
            ),
        )));
    }

    // Copying builder: starts from an existing settings object.
    let source = Variable::new("settings", TypeNode::Declared(settings_type.clone()));
    let mut copy = MethodDefinition::constructor(&builder_ref.name);
    copy.scope = Scope::Protected;
    copy.params = vec![source.clone()];
    copy.body.push(Statement::expr(Expr::assign_field(
        &builder_stub,
        Expr::call(Expr::field_of(Expr::var(&source), stub_settings), "toBuilder", vec![]),
    )));
    for (field, settings_field) in builder_retries.iter().zip(retry_fields) {
        copy.body.push(Statement::expr(Expr::assign_field(
            field,
            Expr::call(Expr::field_of(Expr::var(&source), settings_field), "toBuilder", vec![]),
        )));
    }

    let mut methods = vec![fresh, copy];
    methods.push(MethodDefinition {
        body: vec![Statement::Return(Expr::var(&builder_stub))],
        ..MethodDefinition::new("getStubSettingsBuilder", builder_stub.ty.clone())
    });
    for field in &builder_retries {
        methods.push(MethodDefinition {
            body: vec![Statement::Return(Expr::var(field))],
            ..MethodDefinition::new(&field.name, field.ty.clone())
        });
    }
    methods.push(MethodDefinition {
        body: vec![Statement::Return(Expr::new_object(
            TypeNode::Declared(settings_type.clone()),
            vec![Expr::This],
        ))],
        ..MethodDefinition::new("build", TypeNode::Declared(settings_type.clone()))
    });

    ClassDefinition {
        is_static: true,
        fields,
        methods,
        ..ClassDefinition::new(ctx.package(), &builder_ref.name)
    }
}
