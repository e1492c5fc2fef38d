//! Java source AST.
//!
//! A closed set of node kinds. Composers build a tree once and hand it to
//! the printer; nothing mutates a node after it has been composed.

mod decl;
mod expr;
mod stmt;
mod types;

pub use decl::{Annotation, ClassDefinition, FieldDecl, MethodDefinition, Scope};
pub use expr::{
    Assignment, BuilderChain, Expr, Literal, MethodInvocation, Receiver, RelationalOp, Variable,
    VariableExpr,
};
pub use stmt::Statement;
pub use types::{PrimitiveKind, TypeNode, TypeRef, known};
