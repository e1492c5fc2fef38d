//! Deterministic example values for fields and messages.
//!
//! Only the top-level request is populated field by field. Nested messages
//! get an empty builder and collections an empty container, so recursion
//! stops after one level.

use std::collections::HashSet;

use parser::ScalarType;
use parser::descriptor::{Field, FieldKind, Message, ResourceName};

use crate::ast::{BuilderChain, Expr, Literal, TypeRef, known};
use crate::error::GenerateError;
use crate::naming::{self, java_hash_code};

use super::ServiceContext;
use super::signature::{ArgForm, MethodArg, ResourceArg};

/// `Request.newBuilder().setA(..)...build()` with every field populated.
/// Only the first member of each `oneof` is set.
pub fn request_value(ctx: &ServiceContext<'_>, message: &Message) -> Result<Expr, GenerateError> {
    let mut seen_oneofs = HashSet::new();
    let mut calls = Vec::new();
    for field in &message.fields {
        if let Some(group) = &field.oneof {
            if !seen_oneofs.insert(group.as_str()) {
                continue;
            }
        }
        let call = if let Some(key) = field.map_key {
            let value = ctx.element_type(&field.kind)?;
            (
                naming::putter_all(&field.name),
                Expr::new_object(known::hash_map(super::scalar_type(key), value), vec![]),
            )
        } else if field.is_repeated {
            let element = ctx.element_type(&field.kind)?;
            (
                naming::adder_all(&field.name),
                Expr::new_object(known::array_list(element), vec![]),
            )
        } else {
            (naming::setter(&field.name), field_value(ctx, field)?)
        };
        calls.push(call);
    }
    Ok(Expr::Builder(BuilderChain {
        ty: ctx.message_ref(&message.full_name)?,
        calls,
    }))
}

/// Example value for one singular field.
pub fn field_value(ctx: &ServiceContext<'_>, field: &Field) -> Result<Expr, GenerateError> {
    match &field.kind {
        FieldKind::Scalar(ScalarType::String) => {
            let resource = field
                .resource_reference
                .as_ref()
                .filter(|r| !r.is_wildcard())
                .and_then(|r| ctx.api.resource_name(&r.resource_type));
            Ok(match resource {
                Some(resource) => {
                    Expr::call(resource_name_value(ctx, resource), "toString", vec![])
                }
                None => string_value(&field.name),
            })
        }
        FieldKind::Scalar(s) => Ok(scalar_value(*s, &field.name)),
        FieldKind::Enum(full_name) => Ok(Expr::call_static(
            ctx.enum_ref(full_name)?,
            "forNumber",
            vec![Expr::Literal(Literal::Int(0))],
        )),
        FieldKind::Message(full_name) => Ok(message_value(ctx.message_ref(full_name)?)),
    }
}

/// `Type.newBuilder().build()`.
pub fn message_value(ty: TypeRef) -> Expr {
    Expr::Builder(BuilderChain {
        ty,
        calls: Vec::new(),
    })
}

/// `FoobarName.of("[PROJECT]", "[FOOBAR]")`.
pub fn resource_name_value(ctx: &ServiceContext<'_>, resource: &ResourceName) -> Expr {
    let args = resource
        .variables()
        .iter()
        .map(|v| Expr::string(format!("[{}]", v.to_uppercase())))
        .collect();
    Expr::call_static(ctx.resource_ref(resource), "of", args)
}

/// `"<lowerCamelName><hash>"`.
pub fn string_value(field_name: &str) -> Expr {
    let name = naming::lower_camel(field_name);
    let hash = java_hash_code(&name);
    Expr::string(format!("{name}{hash}"))
}

fn scalar_value(s: ScalarType, field_name: &str) -> Expr {
    let hash = java_hash_code(field_name);
    let literal = match s {
        ScalarType::Bool => Literal::Bool(true),
        ScalarType::Float => Literal::Float(f64::from(hash)),
        ScalarType::Double => Literal::Double(f64::from(hash)),
        ScalarType::Int64
        | ScalarType::Uint64
        | ScalarType::Sint64
        | ScalarType::Fixed64
        | ScalarType::Sfixed64 => Literal::Long(i64::from(hash)),
        ScalarType::Int32
        | ScalarType::Uint32
        | ScalarType::Sint32
        | ScalarType::Fixed32
        | ScalarType::Sfixed32 => Literal::Int(i64::from(hash)),
        ScalarType::String => return string_value(field_name),
        ScalarType::Bytes => {
            return Expr::StaticField {
                owner: known::byte_string(),
                name: "EMPTY".to_string(),
            };
        }
    };
    Expr::Literal(literal)
}

/// Value for a convenience-overload argument in a sample, or `None` when
/// no concrete value can be produced.
pub fn arg_value(
    ctx: &ServiceContext<'_>,
    message: &Message,
    arg: &MethodArg,
) -> Result<Option<Expr>, GenerateError> {
    let field = message.field(&arg.field).ok_or_else(|| GenerateError::MissingField {
        message: message.full_name.clone(),
        field: arg.field.clone(),
    })?;
    let value = match &arg.form {
        ArgForm::Resource(ResourceArg::Typed(resource_type)) => ctx
            .api
            .resource_name(resource_type)
            .map(|r| resource_name_value(ctx, r)),
        // Any concrete resource satisfies the interface; take the first one.
        ArgForm::Resource(ResourceArg::Any) => ctx
            .api
            .resource_names()
            .next()
            .map(|r| resource_name_value(ctx, r)),
        ArgForm::Repeated => Some(Expr::new_object(
            known::array_list(ctx.element_type(&field.kind)?),
            vec![],
        )),
        ArgForm::Map => {
            let key = field.map_key.map(super::scalar_type).ok_or_else(|| {
                GenerateError::UnresolvedType(format!("map key of {}", field.name))
            })?;
            Some(Expr::new_object(
                known::hash_map(key, ctx.element_type(&field.kind)?),
                vec![],
            ))
        }
        ArgForm::Plain => Some(field_value(ctx, field)?),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ClassDefinition, MethodDefinition, Statement, TypeNode, Variable};
    use crate::composer::test_support::echo_api;
    use crate::config::{FormatConfig, GeneratorConfig};
    use crate::printer::print_class;

    /// Print `<decl> value = <expr>;` and return the statement text.
    fn render(expr: Expr) -> String {
        let mut class = ClassDefinition::new("com.google.showcase.v1beta1", "Holder");
        let mut method = MethodDefinition::new("hold", TypeNode::VOID);
        method.body.push(Statement::expr(Expr::declare(
            Variable::new("value", known::object()),
            expr,
        )));
        class.methods.push(method);
        let text = print_class(&class, &FormatConfig { column_limit: 1000, ..FormatConfig::default() })
            .unwrap();
        let line = text.lines().find(|l| l.contains("Object value = ")).unwrap();
        line.trim()
            .trim_start_matches("Object value = ")
            .trim_end_matches(';')
            .to_string()
    }

    fn request_text(name: &str) -> String {
        let api = echo_api();
        let config = GeneratorConfig::default();
        let ctx = ServiceContext::new(&api, &config, &api.services()[0]).unwrap();
        let message = ctx.message(&format!("google.showcase.v1beta1.{name}")).unwrap();
        render(request_value(&ctx, message).unwrap())
    }

    #[test]
    fn strings_use_camel_name_and_hash() {
        assert_eq!(render(string_value("upload_id")), "\"uploadId1563990780\"");
    }

    #[test]
    fn only_first_oneof_member_is_set() {
        assert_eq!(
            request_text("EchoRequest"),
            "EchoRequest.newBuilder().setContent(\"content951530617\").setSeverity(Severity.forNumber(0)).build()"
        );
    }

    #[test]
    fn nested_messages_and_collections_stay_shallow() {
        assert_eq!(
            request_text("WaitRequest"),
            "WaitRequest.newBuilder().setTtl(Duration.newBuilder().build()).build()"
        );
        assert_eq!(
            request_text("BlockRequest"),
            "BlockRequest.newBuilder().setDelayMillis(2002891906L).putAllLabels(new HashMap<String, String>()).build()"
        );
        assert_eq!(
            request_text("PagedExpandResponse"),
            "PagedExpandResponse.newBuilder().addAllResponses(new ArrayList<EchoResponse>()).setNextPageToken(\"nextPageToken-1386094857\").build()"
        );
    }

    #[test]
    fn resource_fields_format_the_pattern() {
        assert_eq!(
            request_text("GetFoobarRequest"),
            "GetFoobarRequest.newBuilder().setName(FoobarName.of(\"[PROJECT]\", \"[FOOBAR]\").toString()).build()"
        );
    }

    #[test]
    fn scalar_kinds_get_distinct_literals() {
        assert_eq!(render(scalar_value(ScalarType::Int32, "page_size")), "883849137");
        assert_eq!(render(scalar_value(ScalarType::Float, "page_size")), "883849137F");
        assert_eq!(render(scalar_value(ScalarType::Double, "page_size")), "883849137D");
        assert_eq!(render(scalar_value(ScalarType::Bool, "page_size")), "true");
        assert_eq!(render(scalar_value(ScalarType::Bytes, "page_size")), "ByteString.EMPTY");
    }
}
