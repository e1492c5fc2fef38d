//! Type nodes: primitives, references to declared classes, and generic
//! instantiations. Every declared reference carries its package so the
//! printer can resolve imports without guessing.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    Void,
}

impl PrimitiveKind {
    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Void => "void",
        }
    }
}

/// A class, interface, or enum declared somewhere with a known package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef {
    pub package: String,
    /// Enclosing classes, outermost first. Empty for top-level types.
    pub enclosing: Vec<String>,
    pub name: String,
}

impl TypeRef {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            enclosing: Vec::new(),
            name: name.into(),
        }
    }

    pub fn nested(
        package: impl Into<String>,
        enclosing: Vec<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            package: package.into(),
            enclosing,
            name: name.into(),
        }
    }

    /// Name of the top-level class that owns this type.
    pub fn top_level_name(&self) -> &str {
        self.enclosing.first().unwrap_or(&self.name)
    }

    /// Qualified name of the top-level class, which is what gets imported.
    pub fn import_name(&self) -> String {
        qualify(&self.package, self.top_level_name())
    }

    /// Dotted name relative to the package, e.g. `Outer.Inner`.
    pub fn relative_name(&self) -> String {
        let mut parts: Vec<&str> = self.enclosing.iter().map(String::as_str).collect();
        parts.push(&self.name);
        parts.join(".")
    }

    pub fn full_name(&self) -> String {
        qualify(&self.package, &self.relative_name())
    }

    pub fn is_java_lang(&self) -> bool {
        self.package == "java.lang"
    }
}

fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{package}.{name}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeNode {
    Primitive(PrimitiveKind),
    Declared(TypeRef),
    Generic(TypeRef, Vec<TypeNode>),
    Array(Box<TypeNode>),
}

impl TypeNode {
    pub const VOID: TypeNode = TypeNode::Primitive(PrimitiveKind::Void);
    pub const INT: TypeNode = TypeNode::Primitive(PrimitiveKind::Int);
    pub const LONG: TypeNode = TypeNode::Primitive(PrimitiveKind::Long);
    pub const BOOLEAN: TypeNode = TypeNode::Primitive(PrimitiveKind::Boolean);

    pub fn declared(package: &str, name: &str) -> Self {
        TypeNode::Declared(TypeRef::new(package, name))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeNode::Primitive(PrimitiveKind::Void))
    }

    /// The type as the JVM sees it for overload resolution: generic
    /// arguments dropped, `List<String>` and `List<Long>` both become `List`.
    pub fn erasure(&self) -> TypeNode {
        match self {
            TypeNode::Generic(r, _) => TypeNode::Declared(r.clone()),
            TypeNode::Array(inner) => TypeNode::Array(Box::new(inner.erasure())),
            TypeNode::Primitive(_) | TypeNode::Declared(_) => self.clone(),
        }
    }

    /// Boxed counterpart for use as a generic argument.
    pub fn boxed(self) -> TypeNode {
        let name = match &self {
            TypeNode::Primitive(PrimitiveKind::Boolean) => "Boolean",
            TypeNode::Primitive(PrimitiveKind::Byte) => "Byte",
            TypeNode::Primitive(PrimitiveKind::Short) => "Short",
            TypeNode::Primitive(PrimitiveKind::Int) => "Integer",
            TypeNode::Primitive(PrimitiveKind::Long) => "Long",
            TypeNode::Primitive(PrimitiveKind::Float) => "Float",
            TypeNode::Primitive(PrimitiveKind::Double) => "Double",
            TypeNode::Primitive(PrimitiveKind::Char) => "Character",
            TypeNode::Primitive(PrimitiveKind::Void) => "Void",
            _ => return self,
        };
        TypeNode::declared("java.lang", name)
    }
}

/// Constructors for the library and JDK types the composers emit.
pub mod known {
    use super::{TypeNode, TypeRef};

    pub const GAX_CORE: &str = "com.google.api.gax.core";
    pub const GAX_RPC: &str = "com.google.api.gax.rpc";
    pub const GAX_LRO: &str = "com.google.api.gax.longrunning";
    pub const GAX_PAGING: &str = "com.google.api.gax.paging";
    pub const GAX_RETRYING: &str = "com.google.api.gax.retrying";
    pub const LONGRUNNING: &str = "com.google.longrunning";
    pub const LONGRUNNING_STUB: &str = "com.google.longrunning.stub";

    fn generic(package: &str, name: &str, args: Vec<TypeNode>) -> TypeNode {
        TypeNode::Generic(TypeRef::new(package, name), args)
    }

    pub fn string() -> TypeNode {
        TypeNode::declared("java.lang", "String")
    }

    pub fn object() -> TypeNode {
        TypeNode::declared("java.lang", "Object")
    }

    pub fn exception() -> TypeRef {
        TypeRef::new("java.lang", "Exception")
    }

    pub fn interrupted_exception() -> TypeRef {
        TypeRef::new("java.lang", "InterruptedException")
    }

    pub fn override_annotation() -> TypeRef {
        TypeRef::new("java.lang", "Override")
    }

    pub fn io_exception() -> TypeRef {
        TypeRef::new("java.io", "IOException")
    }

    pub fn time_unit() -> TypeNode {
        TypeNode::declared("java.util.concurrent", "TimeUnit")
    }

    pub fn duration() -> TypeRef {
        TypeRef::new("java.time", "Duration")
    }

    pub fn generated_annotation() -> TypeRef {
        TypeRef::new("javax.annotation", "Generated")
    }

    pub fn beta_api_annotation() -> TypeRef {
        TypeRef::new("com.google.api.core", "BetaApi")
    }

    pub fn list(element: TypeNode) -> TypeNode {
        generic("java.util", "List", vec![element.boxed()])
    }

    pub fn map(key: TypeNode, value: TypeNode) -> TypeNode {
        generic("java.util", "Map", vec![key.boxed(), value.boxed()])
    }

    pub fn array_list(element: TypeNode) -> TypeNode {
        generic("java.util", "ArrayList", vec![element.boxed()])
    }

    pub fn hash_map(key: TypeNode, value: TypeNode) -> TypeNode {
        generic("java.util", "HashMap", vec![key.boxed(), value.boxed()])
    }

    pub fn byte_string() -> TypeRef {
        TypeRef::new("com.google.protobuf", "ByteString")
    }

    pub fn background_resource() -> TypeNode {
        TypeNode::declared(GAX_CORE, "BackgroundResource")
    }

    pub fn resource_name() -> TypeNode {
        TypeNode::declared("com.google.api.resourcenames", "ResourceName")
    }

    pub fn operations_client() -> TypeNode {
        TypeNode::declared(LONGRUNNING, "OperationsClient")
    }

    pub fn operations_stub() -> TypeNode {
        TypeNode::declared(LONGRUNNING_STUB, "OperationsStub")
    }

    pub fn retry_settings() -> TypeRef {
        TypeRef::new(GAX_RETRYING, "RetrySettings")
    }

    pub fn retry_settings_builder() -> TypeNode {
        TypeNode::Declared(TypeRef::nested(
            GAX_RETRYING,
            vec!["RetrySettings".to_string()],
            "Builder",
        ))
    }

    pub fn unary_callable(request: TypeNode, response: TypeNode) -> TypeNode {
        generic(GAX_RPC, "UnaryCallable", vec![request, response])
    }

    pub fn server_streaming_callable(request: TypeNode, response: TypeNode) -> TypeNode {
        generic(GAX_RPC, "ServerStreamingCallable", vec![request, response])
    }

    pub fn client_streaming_callable(request: TypeNode, response: TypeNode) -> TypeNode {
        generic(GAX_RPC, "ClientStreamingCallable", vec![request, response])
    }

    pub fn bidi_streaming_callable(request: TypeNode, response: TypeNode) -> TypeNode {
        generic(GAX_RPC, "BidiStreamingCallable", vec![request, response])
    }

    pub fn operation_callable(request: TypeNode, response: TypeNode, metadata: TypeNode) -> TypeNode {
        generic(GAX_RPC, "OperationCallable", vec![request, response, metadata])
    }

    pub fn operation_future(response: TypeNode, metadata: TypeNode) -> TypeNode {
        generic(GAX_LRO, "OperationFuture", vec![response, metadata])
    }

    pub fn server_stream(response: TypeNode) -> TypeNode {
        generic(GAX_RPC, "ServerStream", vec![response])
    }

    pub fn bidi_stream(request: TypeNode, response: TypeNode) -> TypeNode {
        generic(GAX_RPC, "BidiStream", vec![request, response])
    }

    pub fn page_context(request: TypeNode, response: TypeNode, element: TypeNode) -> TypeNode {
        generic(GAX_RPC, "PageContext", vec![request, response, element])
    }

    pub fn abstract_paged_list_response(args: Vec<TypeNode>) -> TypeNode {
        generic(GAX_PAGING, "AbstractPagedListResponse", args)
    }

    pub fn abstract_page(args: Vec<TypeNode>) -> TypeNode {
        generic(GAX_PAGING, "AbstractPage", args)
    }

    pub fn abstract_fixed_size_collection(args: Vec<TypeNode>) -> TypeNode {
        generic(GAX_PAGING, "AbstractFixedSizeCollection", args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_refs_import_their_outer_class() {
        let inner = TypeRef::nested("com.example", vec!["Outer".into(), "Mid".into()], "Inner");
        assert_eq!(inner.top_level_name(), "Outer");
        assert_eq!(inner.import_name(), "com.example.Outer");
        assert_eq!(inner.relative_name(), "Outer.Mid.Inner");
        assert_eq!(inner.full_name(), "com.example.Outer.Mid.Inner");
    }

    #[test]
    fn primitives_box_for_generic_arguments() {
        assert_eq!(
            known::list(TypeNode::INT),
            TypeNode::Generic(
                TypeRef::new("java.util", "List"),
                vec![TypeNode::declared("java.lang", "Integer")]
            )
        );
        assert_eq!(known::string().boxed(), known::string());
    }
}
