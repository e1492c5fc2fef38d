use super::expr::{Expr, Variable};
use super::stmt::Statement;
use super::types::{TypeNode, TypeRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    Public,
    Protected,
    Private,
    PackagePrivate,
}

impl Scope {
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            Scope::Public => Some("public"),
            Scope::Protected => Some("protected"),
            Scope::Private => Some("private"),
            Scope::PackagePrivate => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub ty: TypeRef,
    /// Single string argument, e.g. `@Generated("by ...")`.
    pub value: Option<String>,
}

impl Annotation {
    pub fn marker(ty: TypeRef) -> Self {
        Self { ty, value: None }
    }

    pub fn with_value(ty: TypeRef, value: impl Into<String>) -> Self {
        Self {
            ty,
            value: Some(value.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub scope: Scope,
    pub is_static: bool,
    pub is_final: bool,
    pub variable: Variable,
    pub initializer: Option<Expr>,
}

impl FieldDecl {
    pub fn private_final(variable: Variable) -> Self {
        Self {
            scope: Scope::Private,
            is_static: false,
            is_final: true,
            variable,
            initializer: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDefinition {
    pub annotations: Vec<Annotation>,
    pub scope: Scope,
    pub is_static: bool,
    pub is_final: bool,
    pub is_abstract: bool,
    /// Constructors print no return type; `name` is the class name.
    pub is_constructor: bool,
    pub return_type: TypeNode,
    pub name: String,
    pub params: Vec<Variable>,
    pub throws: Vec<TypeRef>,
    pub body: Vec<Statement>,
}

impl MethodDefinition {
    pub fn new(name: impl Into<String>, return_type: TypeNode) -> Self {
        Self {
            annotations: Vec::new(),
            scope: Scope::Public,
            is_static: false,
            is_final: false,
            is_abstract: false,
            is_constructor: false,
            return_type,
            name: name.into(),
            params: Vec::new(),
            throws: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn constructor(class_name: impl Into<String>) -> Self {
        Self {
            is_constructor: true,
            ..Self::new(class_name, TypeNode::VOID)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassDefinition {
    /// Block comment lines printed above the package statement.
    pub file_header: Vec<String>,
    pub package: String,
    /// When set, `// [START tag]` / `// [END tag]` wrap imports through class.
    pub region_tag: Option<String>,
    pub annotations: Vec<Annotation>,
    pub scope: Scope,
    pub is_static: bool,
    pub is_final: bool,
    pub is_abstract: bool,
    pub name: String,
    pub extends: Option<TypeNode>,
    pub implements: Vec<TypeNode>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDefinition>,
    pub nested: Vec<ClassDefinition>,
}

impl ClassDefinition {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Reference to this class as a type.
    pub fn type_ref(&self) -> TypeRef {
        TypeRef::new(&self.package, &self.name)
    }
}
