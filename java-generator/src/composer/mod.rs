//! Class and sample composers.
//!
//! A [`ServiceContext`] is built once per service: it classifies every
//! method up front and maps proto names to Java types, so the individual
//! composers never re-derive shape policy.

pub mod client;
pub mod default_value;
pub mod region_tag;
pub mod sample;
pub mod settings;
pub mod signature;
pub mod stub;

use parser::ScalarType;
use parser::descriptor::{Api, Field, FieldKind, Message, Method, ResourceName, Service};

use crate::ast::{Annotation, PrimitiveKind, TypeNode, TypeRef, known};
use crate::classifier::{self, MethodShape};
use crate::config::GeneratorConfig;
use crate::error::GenerateError;

/// A method together with its classified shape.
#[derive(Debug, Clone)]
pub struct ClassifiedMethod<'a> {
    pub method: &'a Method,
    pub shape: MethodShape,
}

impl ClassifiedMethod<'_> {
    /// Java name stem, e.g. `pagedExpand`; callable and settings accessor
    /// names are built on it.
    pub fn java_name(&self) -> String {
        crate::naming::lower_camel(&self.method.name)
    }

    /// The stem used on its own as a method name, escaped when reserved.
    pub fn method_name(&self) -> String {
        crate::naming::java_identifier(&self.method.name)
    }
}

pub struct ServiceContext<'a> {
    pub api: &'a Api,
    pub config: &'a GeneratorConfig,
    pub service: &'a Service,
    pub methods: Vec<ClassifiedMethod<'a>>,
}

impl<'a> ServiceContext<'a> {
    pub fn new(
        api: &'a Api,
        config: &'a GeneratorConfig,
        service: &'a Service,
    ) -> Result<Self, GenerateError> {
        let methods = service
            .methods
            .iter()
            .map(|method| {
                let shape = classifier::classify(method, api, config)?;
                tracing::debug!(
                    service = %service.name,
                    method = %method.name,
                    shape = shape.as_str(),
                    "classified method"
                );
                Ok(ClassifiedMethod { method, shape })
            })
            .collect::<Result<Vec<_>, GenerateError>>()?;
        Ok(Self {
            api,
            config,
            service,
            methods,
        })
    }

    // ---------------- Generated class names ----------------

    pub fn package(&self) -> &str {
        &self.service.java_package
    }

    pub fn stub_package(&self) -> String {
        format!(
            "{}.{}",
            self.service.java_package, self.config.naming.stub_package_segment
        )
    }

    pub fn samples_package(&self) -> String {
        format!(
            "{}.{}",
            self.service.java_package, self.config.naming.samples_package_segment
        )
    }

    pub fn client_name(&self) -> String {
        format!("{}{}", self.service.name, self.config.naming.client_suffix)
    }

    pub fn settings_name(&self) -> String {
        format!("{}{}", self.service.name, self.config.naming.settings_suffix)
    }

    pub fn stub_name(&self) -> String {
        format!("{}{}", self.service.name, self.config.naming.stub_suffix)
    }

    pub fn client_type(&self) -> TypeRef {
        TypeRef::new(self.package(), self.client_name())
    }

    pub fn settings_type(&self) -> TypeRef {
        TypeRef::new(self.package(), self.settings_name())
    }

    pub fn stub_type(&self) -> TypeRef {
        TypeRef::new(self.stub_package(), self.stub_name())
    }

    /// Transport settings class, produced outside this crate.
    pub fn stub_settings_type(&self) -> TypeRef {
        TypeRef::new(
            self.stub_package(),
            format!("{}{}", self.stub_name(), self.config.naming.settings_suffix),
        )
    }

    pub fn generated_annotation(&self) -> Annotation {
        Annotation::with_value(
            known::generated_annotation(),
            &self.config.naming.generated_annotation,
        )
    }

    /// Nested `<Method><kind>` class of the client, e.g. `PagedExpandPage`.
    pub fn paged_class(&self, method: &Method, kind: &str) -> TypeRef {
        TypeRef::nested(
            self.package(),
            vec![self.client_name()],
            format!("{}{kind}", method.name),
        )
    }

    // ---------------- Proto to Java types ----------------

    pub fn message(&self, full_name: &str) -> Result<&'a Message, GenerateError> {
        classifier::lookup(self.api, full_name)
    }

    pub fn message_ref(&self, full_name: &str) -> Result<TypeRef, GenerateError> {
        let message = self.message(full_name)?;
        Ok(TypeRef::nested(
            &message.java_package,
            message.outer_names.clone(),
            &message.name,
        ))
    }

    pub fn message_type(&self, full_name: &str) -> Result<TypeNode, GenerateError> {
        self.message_ref(full_name).map(TypeNode::Declared)
    }

    pub fn enum_ref(&self, full_name: &str) -> Result<TypeRef, GenerateError> {
        let e = self
            .api
            .enum_type(full_name)
            .ok_or_else(|| GenerateError::UnresolvedType(full_name.to_string()))?;
        Ok(TypeRef::nested(&e.java_package, e.outer_names.clone(), &e.name))
    }

    /// Type of one element of a field, ignoring repetition.
    pub fn element_type(&self, kind: &FieldKind) -> Result<TypeNode, GenerateError> {
        match kind {
            FieldKind::Scalar(s) => Ok(scalar_type(*s)),
            FieldKind::Message(full_name) => self.message_type(full_name),
            FieldKind::Enum(full_name) => self.enum_ref(full_name).map(TypeNode::Declared),
        }
    }

    /// Java type of a field as a method parameter: `List<T>`, `Map<K, V>` or `T`.
    pub fn field_type(&self, field: &Field) -> Result<TypeNode, GenerateError> {
        let element = self.element_type(&field.kind)?;
        Ok(match field.map_key {
            Some(key) => known::map(scalar_type(key), element),
            None if field.is_repeated => known::list(element),
            None => element,
        })
    }

    pub fn resource_ref(&self, resource: &ResourceName) -> TypeRef {
        TypeRef::new(&resource.java_package, resource.class_name())
    }

    /// Output type as seen by callers: `void` for the configured empty message.
    pub fn is_void(&self, full_name: &str) -> bool {
        self.config.is_empty_type(full_name)
    }

    pub fn client_variable_name(&self) -> String {
        crate::naming::lower_camel(&self.client_name())
    }
}

pub fn scalar_type(s: ScalarType) -> TypeNode {
    match s {
        ScalarType::Double => TypeNode::Primitive(PrimitiveKind::Double),
        ScalarType::Float => TypeNode::Primitive(PrimitiveKind::Float),
        ScalarType::Int32
        | ScalarType::Uint32
        | ScalarType::Sint32
        | ScalarType::Fixed32
        | ScalarType::Sfixed32 => TypeNode::INT,
        ScalarType::Int64
        | ScalarType::Uint64
        | ScalarType::Sint64
        | ScalarType::Fixed64
        | ScalarType::Sfixed64 => TypeNode::LONG,
        ScalarType::Bool => TypeNode::BOOLEAN,
        ScalarType::String => known::string(),
        ScalarType::Bytes => TypeNode::Declared(known::byte_string()),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use parser::descriptor::{Api, BuildOptions};
    use parser::parse_proto_str;

    /// Trimmed-down showcase Echo API covering every method shape.
    pub const ECHO_PROTO: &str = r#"
        syntax = "proto3";
        package google.showcase.v1beta1;

        option java_package = "com.google.showcase.v1beta1";

        service Echo {
          option (google.api.default_host) = "localhost:7469";

          rpc Echo(EchoRequest) returns (EchoResponse) {
            option (google.api.method_signature) = "content";
            option (google.api.method_signature) = "content,severity";
          }
          rpc Expand(ExpandRequest) returns (stream EchoResponse);
          rpc Collect(stream EchoRequest) returns (EchoResponse);
          rpc Chat(stream EchoRequest) returns (stream EchoResponse);
          rpc PagedExpand(PagedExpandRequest) returns (PagedExpandResponse);
          rpc Wait(WaitRequest) returns (google.longrunning.Operation) {
            option (google.api.method_signature) = "ttl";
            option (google.longrunning.operation_info) = {
              response_type: "WaitResponse"
              metadata_type: "WaitMetadata"
            };
          }
          rpc Block(BlockRequest) returns (google.protobuf.Empty);
          rpc GetFoobar(GetFoobarRequest) returns (Foobar);
        }

        enum Severity { UNNECESSARY = 0; NECESSARY = 1; }

        message EchoRequest {
          oneof response {
            string content = 1;
            google.rpc.Status error = 2;
          }
          Severity severity = 3;
        }
        message EchoResponse { string content = 1; Severity severity = 2; }
        message ExpandRequest { string content = 1; }
        message PagedExpandRequest {
          string content = 1;
          int32 page_size = 2;
          string page_token = 3;
        }
        message PagedExpandResponse {
          repeated EchoResponse responses = 1;
          string next_page_token = 2;
        }
        message WaitRequest { google.protobuf.Duration ttl = 1; }
        message WaitResponse { string content = 1; }
        message WaitMetadata { google.protobuf.Timestamp end_time = 1; }
        message BlockRequest { int64 delay_millis = 1; map<string, string> labels = 2; }

        message Foobar {
          option (google.api.resource) = {
            type: "showcase.googleapis.com/Foobar"
            pattern: "projects/{project}/foobars/{foobar}"
          };
          string name = 1;
        }
        message GetFoobarRequest {
          string name = 1 [(google.api.resource_reference).type = "showcase.googleapis.com/Foobar"];
        }
    "#;

    pub fn echo_api() -> Api {
        let model = parse_proto_str(ECHO_PROTO).expect("echo fixture parses");
        Api::build(&[model], &BuildOptions::default()).expect("echo fixture builds")
    }
}
