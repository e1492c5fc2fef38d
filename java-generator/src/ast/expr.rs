use super::types::{TypeNode, TypeRef};

/// An identifier with its declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub ty: TypeNode,
}

impl Variable {
    pub fn new(name: impl Into<String>, ty: TypeNode) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableExpr {
    pub variable: Variable,
    /// Declarations print their type in front of the name.
    pub is_decl: bool,
    pub qualifier: Option<Box<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Receiver {
    /// Unqualified call, e.g. `create(settings)` or `super(page)`.
    None,
    Expr(Box<Expr>),
    Static(TypeRef),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodInvocation {
    pub receiver: Receiver,
    pub name: String,
    pub args: Vec<Expr>,
    /// Result type of the call. Not printed.
    pub return_type: Option<TypeNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub target: VariableExpr,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Long(i64),
    Float(f64),
    Double(f64),
    String(String),
}

/// `Type.newBuilder().setA(a).addAllB(b).build()`.
#[derive(Debug, Clone, PartialEq)]
pub struct BuilderChain {
    pub ty: TypeRef,
    pub calls: Vec<(String, Expr)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationalOp {
    Equal,
    NotEqual,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Variable(VariableExpr),
    Invoke(MethodInvocation),
    Assign(Box<Assignment>),
    Literal(Literal),
    Builder(BuilderChain),
    New { ty: TypeNode, args: Vec<Expr> },
    StaticField { owner: TypeRef, name: String },
    Ternary {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Relational {
        lhs: Box<Expr>,
        op: RelationalOp,
        rhs: Box<Expr>,
    },
    This,
}

impl Expr {
    /// Reference to a variable already in scope.
    pub fn var(variable: &Variable) -> Self {
        Expr::Variable(VariableExpr {
            variable: variable.clone(),
            is_decl: false,
            qualifier: None,
        })
    }

    /// `this.<field>`.
    pub fn this_field(variable: &Variable) -> Self {
        Self::field_of(Expr::This, variable)
    }

    /// `<owner>.<field>`.
    pub fn field_of(owner: Expr, field: &Variable) -> Self {
        Expr::Variable(VariableExpr {
            variable: field.clone(),
            is_decl: false,
            qualifier: Some(Box::new(owner)),
        })
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expr::Literal(Literal::String(value.into()))
    }

    pub fn null() -> Self {
        Expr::Literal(Literal::Null)
    }

    pub fn call(receiver: Expr, name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Invoke(MethodInvocation {
            receiver: Receiver::Expr(Box::new(receiver)),
            name: name.into(),
            args,
            return_type: None,
        })
    }

    pub fn call_static(owner: TypeRef, name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Invoke(MethodInvocation {
            receiver: Receiver::Static(owner),
            name: name.into(),
            args,
            return_type: None,
        })
    }

    pub fn call_local(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Invoke(MethodInvocation {
            receiver: Receiver::None,
            name: name.into(),
            args,
            return_type: None,
        })
    }

    pub fn new_object(ty: TypeNode, args: Vec<Expr>) -> Self {
        Expr::New { ty, args }
    }

    /// Attach a result type to an invocation; no-op for other nodes.
    pub fn returning(self, ty: TypeNode) -> Self {
        match self {
            Expr::Invoke(mut m) => {
                m.return_type = Some(ty);
                Expr::Invoke(m)
            }
            other => other,
        }
    }

    /// `<variable> = <value>`, declaring the variable.
    pub fn declare(variable: Variable, value: Expr) -> Self {
        Expr::Assign(Box::new(Assignment {
            target: VariableExpr {
                variable,
                is_decl: true,
                qualifier: None,
            },
            value,
        }))
    }

    /// `this.<field> = <value>`.
    pub fn assign_field(field: &Variable, value: Expr) -> Self {
        Expr::Assign(Box::new(Assignment {
            target: VariableExpr {
                variable: field.clone(),
                is_decl: false,
                qualifier: Some(Box::new(Expr::This)),
            },
            value,
        }))
    }

    /// `x == null ? null : x.toString()`.
    pub fn null_safe_to_string(variable: &Variable) -> Self {
        Expr::Ternary {
            condition: Box::new(Expr::Relational {
                lhs: Box::new(Expr::var(variable)),
                op: RelationalOp::Equal,
                rhs: Box::new(Expr::null()),
            }),
            then: Box::new(Expr::null()),
            otherwise: Box::new(Expr::call(Expr::var(variable), "toString", vec![])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::types::known;

    #[test]
    fn returning_only_touches_invocations() {
        let call = Expr::call_local("build", vec![]).returning(known::string());
        let Expr::Invoke(m) = call else {
            panic!("expected invocation");
        };
        assert_eq!(m.return_type, Some(known::string()));
        assert_eq!(Expr::This.returning(known::string()), Expr::This);
    }
}
