//! Convenience overload shapes derived from method signatures.
//!
//! Each declared signature expands into one overload per combination of
//! argument forms: a resource-referencing field yields a typed resource-name
//! argument and then a raw `String` one. Overloads whose erased Java
//! parameter types repeat an earlier overload of the same method are
//! dropped, since Java would reject them as clashing.

use std::collections::HashSet;

use parser::descriptor::{Field, Message, Method};

use crate::ast::{BuilderChain, Expr, TypeNode, Variable, known};
use crate::error::GenerateError;
use crate::naming;

use super::ServiceContext;

#[derive(Debug, Clone, PartialEq)]
pub enum ArgForm {
    /// Field value passed as is.
    Plain,
    Repeated,
    Map,
    /// Typed resource name; the field receives its `toString()`.
    Resource(ResourceArg),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResourceArg {
    /// A generated `<Resource>Name` class.
    Typed(String),
    /// Any resource, through the gax `ResourceName` interface.
    Any,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodArg {
    /// Proto field name the argument populates.
    pub field: String,
    pub variable: Variable,
    pub form: ArgForm,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Overload {
    pub args: Vec<MethodArg>,
}

impl Overload {
    pub fn params(&self) -> Vec<Variable> {
        self.args.iter().map(|a| a.variable.clone()).collect()
    }

    /// `Request.newBuilder().setA(a)...build()` from the arguments.
    pub fn request_builder(&self, request: crate::ast::TypeRef) -> Expr {
        let calls = self
            .args
            .iter()
            .map(|arg| {
                let value = Expr::var(&arg.variable);
                match &arg.form {
                    ArgForm::Plain => (naming::setter(&arg.field), value),
                    ArgForm::Repeated => (naming::adder_all(&arg.field), value),
                    ArgForm::Map => (naming::putter_all(&arg.field), value),
                    ArgForm::Resource(_) => (
                        naming::setter(&arg.field),
                        Expr::null_safe_to_string(&arg.variable),
                    ),
                }
            })
            .collect();
        Expr::Builder(BuilderChain { ty: request, calls })
    }
}

/// All convenience overloads of `method`, in declaration order.
pub fn overloads(ctx: &ServiceContext<'_>, method: &Method) -> Result<Vec<Overload>, GenerateError> {
    let input = ctx.message(&method.input_type)?;

    let mut signatures = method.signatures.clone();
    if signatures.is_empty()
        && !input.fields.is_empty()
        && input.fields.iter().all(|f| f.resource_reference.is_some())
    {
        signatures.push(input.fields.iter().map(|f| f.name.clone()).collect());
    }

    let mut seen: HashSet<Vec<TypeNode>> = HashSet::new();
    let mut out = Vec::new();
    for signature in &signatures {
        for overload in expand(ctx, input, signature)? {
            let key: Vec<TypeNode> = overload.args.iter().map(|a| a.variable.ty.erasure()).collect();
            if seen.insert(key) {
                out.push(overload);
            } else {
                tracing::debug!(
                    method = %method.name,
                    signature = ?signature,
                    "dropping overload with duplicate parameter types"
                );
            }
        }
    }
    Ok(out)
}

fn expand(
    ctx: &ServiceContext<'_>,
    input: &Message,
    signature: &[String],
) -> Result<Vec<Overload>, GenerateError> {
    let mut overloads = vec![Overload::default()];
    for name in signature {
        let field = input.field(name).ok_or_else(|| GenerateError::MissingField {
            message: input.full_name.clone(),
            field: name.clone(),
        })?;
        let forms = arg_forms(ctx, field)?;
        overloads = overloads
            .into_iter()
            .flat_map(|prefix| {
                forms.iter().map(move |arg| {
                    let mut next = prefix.clone();
                    next.args.push(arg.clone());
                    next
                })
            })
            .collect();
    }
    Ok(overloads)
}

fn arg_forms(ctx: &ServiceContext<'_>, field: &Field) -> Result<Vec<MethodArg>, GenerateError> {
    let name = naming::java_identifier(&field.name);
    let arg = |ty: TypeNode, form: ArgForm| MethodArg {
        field: field.name.clone(),
        variable: Variable::new(name.clone(), ty),
        form,
    };

    if field.is_map() {
        return Ok(vec![arg(ctx.field_type(field)?, ArgForm::Map)]);
    }
    if field.is_repeated {
        return Ok(vec![arg(ctx.field_type(field)?, ArgForm::Repeated)]);
    }

    let plain = arg(ctx.field_type(field)?, ArgForm::Plain);
    let Some(reference) = &field.resource_reference else {
        return Ok(vec![plain]);
    };
    if reference.is_wildcard() {
        return Ok(vec![
            arg(known::resource_name(), ArgForm::Resource(ResourceArg::Any)),
            plain,
        ]);
    }
    match ctx.api.resource_name(&reference.resource_type) {
        Some(resource) => Ok(vec![
            arg(
                TypeNode::Declared(ctx.resource_ref(resource)),
                ArgForm::Resource(ResourceArg::Typed(resource.resource_type.clone())),
            ),
            plain,
        ]),
        None => Ok(vec![plain]),
    }
}
