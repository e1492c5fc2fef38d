use super::expr::{Expr, Variable};

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expr(Expr),
    Return(Expr),
    /// `for (<Type> <var> : <collection>) { ... }`
    For {
        variable: Variable,
        collection: Expr,
        body: Vec<Statement>,
    },
    /// try-with-resources; every resource is a declaring assignment.
    Try {
        resources: Vec<Expr>,
        body: Vec<Statement>,
    },
    /// One `//` line per text line.
    Comment(String),
}

impl Statement {
    pub fn expr(expr: Expr) -> Self {
        Statement::Expr(expr)
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Statement::Comment(text.into())
    }
}
