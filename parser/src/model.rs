// Syntax-level IR for .proto files, one `ProtoModel` per parsed file.
// - Names are kept as written; nested declarations are qualified with their parents.
// - Type references are unresolved strings; `descriptor` resolves them.
// - Options are kept as a generic key/value tree.

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProtoModel {
    pub package: Option<String>,
    pub imports: Vec<String>,
    pub options: Vec<OptionEntry>,
    pub types: Vec<TypeDecl>,
    pub services: Vec<Service>,
}

impl ProtoModel {
    /// Value of the first file-level option with this name.
    pub fn option(&self, name: &str) -> Option<&OptionValue> {
        find_option(&self.options, name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeDecl {
    Message(Message),
    Enum(Enum),
}

// ---------------- Message & Fields ----------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Message {
    pub name: String,
    pub fields: Vec<Field>,
    pub options: Vec<OptionEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub ty: FieldType,
    pub name: String,
    pub order: u32, // tag number
    pub label: FieldLabel,
    /// Key type when the field was declared as `map<K, V>`; `ty` is then `V`.
    pub map_key: Option<ScalarType>,
    pub oneof: Option<String>,
    pub options: Vec<OptionEntry>,
}

impl Field {
    pub fn option(&self, name: &str) -> Option<&OptionValue> {
        find_option(&self.options, name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldLabel {
    #[default]
    Singular,
    Optional,
    Required,
    Repeated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Scalar(ScalarType),
    Custom(String), // fully-qualified or simple type name
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
}

// ---------------- Enum ----------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Enum {
    pub name: String,
    pub values: Vec<EnumValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub name: String,
    pub number: i32,
}

// ---------------- Service ----------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Service {
    pub name: String,
    pub methods: Vec<Rpc>,
    pub options: Vec<OptionEntry>,
}

impl Service {
    pub fn option(&self, name: &str) -> Option<&OptionValue> {
        find_option(&self.options, name)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Rpc {
    pub name: String,
    pub input_type: String,
    pub output_type: String,
    pub client_streaming: bool,
    pub server_streaming: bool,
    pub options: Vec<OptionEntry>,
}

impl Rpc {
    /// All values of a repeatable method option, in declaration order.
    pub fn options_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a OptionValue> {
        self.options
            .iter()
            .filter(move |o| o.name == name)
            .map(|o| &o.value)
    }
}

// ---------------- Options ----------------

#[derive(Debug, Clone, PartialEq)]
pub struct OptionEntry {
    /// Option name as written, e.g. `java_package` or `(google.api.resource_reference).type`.
    pub name: String,
    pub value: OptionValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Ident(String),
    Aggregate(Vec<(String, OptionValue)>),
    List(Vec<OptionValue>),
}

impl OptionValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(s) | OptionValue::Ident(s) => Some(s),
            _ => None,
        }
    }

    /// Entries named `key` inside an aggregate, flattening list values
    /// so that `pattern: "a" pattern: "b"` and `pattern: ["a", "b"]` read the same.
    pub fn fields<'a>(&'a self, key: &str) -> Vec<&'a OptionValue> {
        let OptionValue::Aggregate(entries) = self else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for (k, v) in entries {
            if k != key {
                continue;
            }
            match v {
                OptionValue::List(items) => out.extend(items.iter()),
                other => out.push(other),
            }
        }
        out
    }

    /// First string value stored under `key` in an aggregate.
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.fields(key).into_iter().find_map(OptionValue::as_str)
    }
}

fn find_option<'a>(options: &'a [OptionEntry], name: &str) -> Option<&'a OptionValue> {
    options.iter().find(|o| o.name == name).map(|o| &o.value)
}
