//! Normalized descriptor model.
//!
//! [`Api::build`] folds one or more parsed [`ProtoModel`]s into an immutable
//! view: messages and enums keyed by fully-qualified proto name, resource
//! names keyed by resource type, and services with every type reference
//! resolved. Downstream code only reads it.

use std::collections::{BTreeMap, BTreeSet};

use crate::{FieldLabel, FieldType, OptionValue, ParseError, ProtoModel, ScalarType, TypeDecl};

const RESOURCE: &str = "(google.api.resource)";
const RESOURCE_DEFINITION: &str = "(google.api.resource_definition)";
const RESOURCE_REFERENCE: &str = "(google.api.resource_reference)";
const METHOD_SIGNATURE: &str = "(google.api.method_signature)";
const OPERATION_INFO: &str = "(google.longrunning.operation_info)";
const DEFAULT_HOST: &str = "(google.api.default_host)";

/// Resource type that stands for "any resource".
pub const WILDCARD_RESOURCE: &str = "*";

/// Messages commonly imported from other files, with their Java packages.
const WELL_KNOWN_MESSAGES: &[(&str, &str)] = &[
    ("google.protobuf.Any", "com.google.protobuf"),
    ("google.protobuf.Duration", "com.google.protobuf"),
    ("google.protobuf.Empty", "com.google.protobuf"),
    ("google.protobuf.FieldMask", "com.google.protobuf"),
    ("google.protobuf.ListValue", "com.google.protobuf"),
    ("google.protobuf.Struct", "com.google.protobuf"),
    ("google.protobuf.Timestamp", "com.google.protobuf"),
    ("google.protobuf.Value", "com.google.protobuf"),
    ("google.rpc.Status", "com.google.rpc"),
    ("google.longrunning.Operation", "com.google.longrunning"),
];

/// How unqualified `operation_info` type names are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LroResolution {
    /// Bare names resolve against the declaring file's package.
    #[default]
    PackageRelative,
    /// Names must already be fully qualified.
    FullyQualified,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    pub lro_resolution: LroResolution,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub name: String,
    pub full_name: String,
    pub java_package: String,
    /// Simple names of the enclosing messages, outermost first.
    pub outer_names: Vec<String>,
    pub fields: Vec<Field>,
    /// Resource type declared by this message through `google.api.resource`.
    pub resource_type: Option<String>,
}

impl Message {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    pub is_repeated: bool,
    /// Key type for map fields; `kind` is then the value type.
    pub map_key: Option<ScalarType>,
    /// Name of the enclosing `oneof` group, if any.
    pub oneof: Option<String>,
    pub resource_reference: Option<ResourceReference>,
}

impl Field {
    pub fn is_map(&self) -> bool {
        self.map_key.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Scalar(ScalarType),
    Message(String),
    Enum(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceReference {
    /// Resolved resource type, or [`WILDCARD_RESOURCE`].
    pub resource_type: String,
    pub is_child_type: bool,
}

impl ResourceReference {
    pub fn is_wildcard(&self) -> bool {
        self.resource_type == WILDCARD_RESOURCE
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    pub name: String,
    pub full_name: String,
    pub java_package: String,
    pub outer_names: Vec<String>,
    pub values: Vec<(String, i32)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceName {
    pub resource_type: String,
    pub patterns: Vec<String>,
    pub java_package: String,
}

impl ResourceName {
    /// `library.googleapis.com/Shelf` becomes `ShelfName`.
    pub fn class_name(&self) -> String {
        let short = self
            .resource_type
            .rsplit('/')
            .next()
            .unwrap_or(&self.resource_type);
        format!("{short}Name")
    }

    pub fn pattern(&self) -> Option<&str> {
        self.patterns.first().map(String::as_str)
    }

    /// Variable names of the first pattern in order, e.g. `["project", "shelf"]`.
    pub fn variables(&self) -> Vec<String> {
        self.pattern().map(pattern_variables).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamingKind {
    None,
    Client,
    Server,
    Bidi,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LroInfo {
    pub response_type: String,
    pub metadata_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub input_type: String,
    pub output_type: String,
    pub streaming: StreamingKind,
    pub lro: Option<LroInfo>,
    /// Declared `method_signature` field lists, in declaration order.
    pub signatures: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    pub name: String,
    pub full_name: String,
    pub proto_package: String,
    pub java_package: String,
    pub default_host: Option<String>,
    pub methods: Vec<Method>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Api {
    messages: BTreeMap<String, Message>,
    enums: BTreeMap<String, EnumType>,
    resource_names: BTreeMap<String, ResourceName>,
    services: Vec<Service>,
}

impl Api {
    pub fn message(&self, full_name: &str) -> Option<&Message> {
        self.messages.get(full_name)
    }

    pub fn enum_type(&self, full_name: &str) -> Option<&EnumType> {
        self.enums.get(full_name)
    }

    pub fn resource_name(&self, resource_type: &str) -> Option<&ResourceName> {
        self.resource_names.get(resource_type)
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.values()
    }

    pub fn resource_names(&self) -> impl Iterator<Item = &ResourceName> {
        self.resource_names.values()
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    /// Normalize parsed files into one descriptor model.
    pub fn build(models: &[ProtoModel], options: &BuildOptions) -> Result<Self, ParseError> {
        let mut names = NameTable::default();
        for model in models {
            names.register(model)?;
        }
        for (full_name, _) in WELL_KNOWN_MESSAGES {
            names.seed(full_name);
        }

        let mut api = Api::default();
        for model in models {
            collect_resource_names(model, &mut api.resource_names);
        }

        for model in models {
            let package = model.package.clone().unwrap_or_default();
            let java_package = java_package_of(model);
            for decl in &model.types {
                match decl {
                    TypeDecl::Message(m) => {
                        let message = build_message(m, &package, &java_package, &names, &api)?;
                        api.messages.insert(message.full_name.clone(), message);
                    }
                    TypeDecl::Enum(e) => {
                        let full_name = qualify(&package, &e.name);
                        let (name, outer_names) = split_nested(&e.name);
                        api.enums.insert(
                            full_name.clone(),
                            EnumType {
                                name,
                                full_name,
                                java_package: java_package.clone(),
                                outer_names,
                                values: e.values.iter().map(|v| (v.name.clone(), v.number)).collect(),
                            },
                        );
                    }
                }
            }
        }

        for (full_name, java_package) in WELL_KNOWN_MESSAGES {
            if !api.messages.contains_key(*full_name) {
                let name = full_name.rsplit('.').next().unwrap_or(full_name);
                api.messages.insert(
                    (*full_name).to_string(),
                    Message {
                        name: name.to_string(),
                        full_name: (*full_name).to_string(),
                        java_package: (*java_package).to_string(),
                        outer_names: Vec::new(),
                        fields: Vec::new(),
                        resource_type: None,
                    },
                );
            }
        }

        for model in models {
            let package = model.package.clone().unwrap_or_default();
            let java_package = java_package_of(model);
            for service in &model.services {
                let methods = service
                    .methods
                    .iter()
                    .map(|rpc| build_method(rpc, &package, &names, &api, options))
                    .collect::<Result<Vec<_>, _>>()?;
                api.services.push(Service {
                    name: service.name.clone(),
                    full_name: qualify(&package, &service.name),
                    proto_package: package.clone(),
                    java_package: java_package.clone(),
                    default_host: service
                        .option(DEFAULT_HOST)
                        .and_then(OptionValue::as_str)
                        .map(str::to_string),
                    methods,
                });
            }
        }

        tracing::debug!(
            messages = api.messages.len(),
            enums = api.enums.len(),
            resources = api.resource_names.len(),
            services = api.services.len(),
            "built descriptor model"
        );
        Ok(api)
    }
}

// ---------------- Name resolution ----------------

#[derive(Default)]
struct NameTable {
    messages: BTreeSet<String>,
    enums: BTreeSet<String>,
}

impl NameTable {
    fn register(&mut self, model: &ProtoModel) -> Result<(), ParseError> {
        let package = model.package.as_deref().unwrap_or_default();
        for decl in &model.types {
            let (set, name) = match decl {
                TypeDecl::Message(m) => (&mut self.messages, &m.name),
                TypeDecl::Enum(e) => (&mut self.enums, &e.name),
            };
            let full_name = qualify(package, name);
            if !set.insert(full_name.clone()) {
                return Err(ParseError::Duplicate(full_name));
            }
        }
        Ok(())
    }

    fn seed(&mut self, full_name: &str) {
        if !self.enums.contains(full_name) {
            self.messages.insert(full_name.to_string());
        }
    }

    /// Protobuf scoping: try the innermost scope first, then walk outward.
    fn resolve(&self, scope: &str, reference: &str) -> Option<FieldKind> {
        if let Some(absolute) = reference.strip_prefix('.') {
            return self.lookup(absolute);
        }
        let mut scope = scope;
        loop {
            let candidate = qualify(scope, reference);
            if let Some(kind) = self.lookup(&candidate) {
                return Some(kind);
            }
            if scope.is_empty() {
                return None;
            }
            scope = scope.rsplit_once('.').map_or("", |(outer, _)| outer);
        }
    }

    fn lookup(&self, full_name: &str) -> Option<FieldKind> {
        if self.messages.contains(full_name) {
            Some(FieldKind::Message(full_name.to_string()))
        } else if self.enums.contains(full_name) {
            Some(FieldKind::Enum(full_name.to_string()))
        } else {
            None
        }
    }

    fn resolve_message(&self, scope: &str, reference: &str) -> Result<String, ParseError> {
        match self.resolve(scope, reference) {
            Some(FieldKind::Message(full_name)) => Ok(full_name),
            _ => Err(ParseError::UnresolvedType {
                name: reference.to_string(),
                scope: scope.to_string(),
            }),
        }
    }
}

fn qualify(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{scope}.{name}")
    }
}

fn split_nested(name: &str) -> (String, Vec<String>) {
    let mut parts: Vec<String> = name.split('.').map(str::to_string).collect();
    let simple = parts.pop().unwrap_or_default();
    (simple, parts)
}

fn java_package_of(model: &ProtoModel) -> String {
    model
        .option("java_package")
        .and_then(OptionValue::as_str)
        .map(str::to_string)
        .or_else(|| model.package.clone())
        .unwrap_or_default()
}

// ---------------- Messages ----------------

fn build_message(
    m: &crate::Message,
    package: &str,
    java_package: &str,
    names: &NameTable,
    api: &Api,
) -> Result<Message, ParseError> {
    let full_name = qualify(package, &m.name);
    let (name, outer_names) = split_nested(&m.name);

    let mut fields = Vec::with_capacity(m.fields.len());
    for f in &m.fields {
        let kind = match &f.ty {
            FieldType::Scalar(s) => FieldKind::Scalar(*s),
            FieldType::Custom(reference) => {
                names
                    .resolve(&full_name, reference)
                    .ok_or_else(|| ParseError::UnresolvedType {
                        name: reference.clone(),
                        scope: full_name.clone(),
                    })?
            }
        };
        fields.push(Field {
            name: f.name.clone(),
            kind,
            is_repeated: f.label == FieldLabel::Repeated,
            map_key: f.map_key,
            oneof: f.oneof.clone(),
            resource_reference: resource_reference(f, api),
        });
    }

    Ok(Message {
        name,
        full_name,
        java_package: java_package.to_string(),
        outer_names,
        fields,
        resource_type: m
            .options
            .iter()
            .find(|o| o.name == RESOURCE)
            .and_then(|o| o.value.field_str("type"))
            .map(str::to_string),
    })
}

fn resource_reference(f: &crate::Field, api: &Api) -> Option<ResourceReference> {
    // Both `(google.api.resource_reference) = { type: ".." }` and
    // `(google.api.resource_reference).type = ".."` spellings are accepted.
    let aggregate = f.option(RESOURCE_REFERENCE);
    let read = |key: &str| {
        aggregate
            .and_then(|v| v.field_str(key))
            .or_else(|| {
                f.option(&format!("{RESOURCE_REFERENCE}.{key}"))
                    .and_then(OptionValue::as_str)
            })
            .map(str::to_string)
    };

    if let Some(resource_type) = read("type") {
        return Some(ResourceReference {
            resource_type,
            is_child_type: false,
        });
    }
    let child = read("child_type")?;
    Some(ResourceReference {
        resource_type: parent_resource_type(&child, api),
        is_child_type: true,
    })
}

/// The resource whose pattern is the child's first pattern minus its last
/// collection segment; wildcard when there is none.
fn parent_resource_type(child_type: &str, api: &Api) -> String {
    let parent_pattern = api
        .resource_name(child_type)
        .and_then(ResourceName::pattern)
        .and_then(|p| {
            let segments: Vec<&str> = p.split('/').collect();
            (segments.len() > 2).then(|| segments[..segments.len() - 2].join("/"))
        });
    parent_pattern
        .and_then(|pattern| {
            api.resource_names
                .values()
                .find(|r| r.patterns.iter().any(|p| *p == pattern))
                .map(|r| r.resource_type.clone())
        })
        .unwrap_or_else(|| WILDCARD_RESOURCE.to_string())
}

fn collect_resource_names(model: &ProtoModel, out: &mut BTreeMap<String, ResourceName>) {
    let java_package = java_package_of(model);
    let mut declare = |value: &OptionValue| {
        let Some(resource_type) = value.field_str("type") else {
            return;
        };
        let patterns = value
            .fields("pattern")
            .into_iter()
            .filter_map(OptionValue::as_str)
            .map(str::to_string)
            .collect();
        // First declaration wins; files commonly restate shared resources.
        out.entry(resource_type.to_string())
            .or_insert_with(|| ResourceName {
                resource_type: resource_type.to_string(),
                patterns,
                java_package: java_package.clone(),
            });
    };

    for option in model.options.iter().filter(|o| o.name == RESOURCE_DEFINITION) {
        declare(&option.value);
    }
    for decl in &model.types {
        if let TypeDecl::Message(m) = decl {
            for option in m.options.iter().filter(|o| o.name == RESOURCE) {
                declare(&option.value);
            }
        }
    }
}

fn pattern_variables(pattern: &str) -> Vec<String> {
    pattern
        .split('/')
        .filter_map(|segment| {
            let inner = segment.strip_prefix('{')?.strip_suffix('}')?;
            Some(inner.split('=').next().unwrap_or(inner).to_string())
        })
        .collect()
}

// ---------------- Services ----------------

fn build_method(
    rpc: &crate::Rpc,
    package: &str,
    names: &NameTable,
    api: &Api,
    options: &BuildOptions,
) -> Result<Method, ParseError> {
    let input_type = names.resolve_message(package, &rpc.input_type)?;
    let output_type = names.resolve_message(package, &rpc.output_type)?;

    let streaming = match (rpc.client_streaming, rpc.server_streaming) {
        (true, true) => StreamingKind::Bidi,
        (true, false) => StreamingKind::Client,
        (false, true) => StreamingKind::Server,
        (false, false) => StreamingKind::None,
    };

    let lro = match rpc.options_named(OPERATION_INFO).next() {
        Some(info) => {
            let target = qualify(package, &rpc.name);
            let read = |key: &str| {
                info.field_str(key)
                    .ok_or_else(|| ParseError::InvalidAnnotation {
                        target: target.clone(),
                        reason: format!("operation_info is missing `{key}`"),
                    })
                    .and_then(|name| resolve_lro_type(name, package, names, options))
            };
            Some(LroInfo {
                response_type: read("response_type")?,
                metadata_type: read("metadata_type")?,
            })
        }
        None => None,
    };

    let input = api.message(&input_type);
    let mut signatures = Vec::new();
    for value in rpc.options_named(METHOD_SIGNATURE) {
        let Some(text) = value.as_str() else {
            continue;
        };
        let fields: Vec<String> = text
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if fields.iter().any(|f| f.contains('.')) {
            tracing::warn!(method = %rpc.name, signature = %text, "skipping nested-field method signature");
            continue;
        }
        if let Some(missing) = fields
            .iter()
            .find(|f| input.is_some_and(|m| m.field(f).is_none()))
        {
            return Err(ParseError::InvalidAnnotation {
                target: qualify(package, &rpc.name),
                reason: format!("method signature names unknown field `{missing}`"),
            });
        }
        signatures.push(fields);
    }

    Ok(Method {
        name: rpc.name.clone(),
        input_type,
        output_type,
        streaming,
        lro,
        signatures,
    })
}

fn resolve_lro_type(
    name: &str,
    package: &str,
    names: &NameTable,
    options: &BuildOptions,
) -> Result<String, ParseError> {
    let unresolved = || ParseError::UnresolvedType {
        name: name.to_string(),
        scope: package.to_string(),
    };
    match options.lro_resolution {
        LroResolution::FullyQualified => match names.lookup(name) {
            Some(FieldKind::Message(full_name)) => Ok(full_name),
            _ => Err(unresolved()),
        },
        LroResolution::PackageRelative => {
            names.resolve_message(package, name).map_err(|_| unresolved())
        }
    }
}
