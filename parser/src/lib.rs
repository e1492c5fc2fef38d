pub mod descriptor;
mod model;

use pest::Parser as _;
use pest::iterators::Pair;
use pest_derive::Parser;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub use model::*;

#[derive(Parser)]
#[grammar = "resources/proto.pest"] // Path relative to the crate's src directory
pub struct ProtoParser;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Pest(#[from] Box<pest::error::Error<Rule>>),

    #[error("{0}")]
    Message(&'static str),

    #[error("unresolved type `{name}` referenced from `{scope}`")]
    UnresolvedType { name: String, scope: String },

    #[error("duplicate definition of `{0}`")]
    Duplicate(String),

    #[error("invalid annotation on `{target}`: {reason}")]
    InvalidAnnotation { target: String, reason: String },
}

impl From<pest::error::Error<Rule>> for ParseError {
    fn from(e: pest::error::Error<Rule>) -> Self {
        Self::Pest(Box::new(e))
    }
}

// Public API: parse a .proto file into ProtoModel IR
pub fn parse_proto_file<P: AsRef<Path>>(path: P) -> Result<ProtoModel, ParseError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    tracing::debug!(path = %path.display(), "parsing proto file");
    parse_proto_str(&content)
}

/// Parse .proto source text into ProtoModel IR.
pub fn parse_proto_str(content: &str) -> Result<ProtoModel, ParseError> {
    let mut pairs = ProtoParser::parse(Rule::proto, content)?;
    let proto_pair = pairs
        .next()
        .ok_or(ParseError::Message("expected proto root"))?;
    Ok(parse_proto(proto_pair))
}

fn parse_proto(pair: Pair<Rule>) -> ProtoModel {
    let mut model = ProtoModel::default();

    for inner in pair.into_inner() {
        if inner.as_rule() != Rule::proto_body {
            continue;
        }
        for b in inner.into_inner() {
            match b.as_rule() {
                Rule::import_statement => {
                    let path = b
                        .into_inner()
                        .find(|p| p.as_rule() == Rule::string_value)
                        .map(parse_string_value);
                    model.imports.extend(path);
                }
                Rule::package_statement => {
                    // package_statement = { "package" ~ package_name ~ ";" }
                    model.package = b
                        .into_inner()
                        .find(|p| p.as_rule() == Rule::package_name)
                        .map(|p| p.as_str().to_string());
                }
                Rule::option_statement => model.options.push(parse_option(b)),
                Rule::top_level_definition => {
                    for def in b.into_inner() {
                        match def.as_rule() {
                            Rule::message_block => parse_message_block(def, None, &mut model.types),
                            Rule::enum_block => parse_enum_block(def, None, &mut model.types),
                            Rule::service_block => model.services.push(parse_service_block(def)),
                            // extend blocks carry custom option declarations only
                            _ => {}
                        }
                    }
                }
                _ => {}
            }
        }
    }

    model
}

fn qualify(parent: Option<&str>, name: &str) -> String {
    if let Some(p) = parent {
        format!("{}.{name}", p)
    } else {
        name.to_string()
    }
}

fn parse_message_block(block: Pair<Rule>, parent: Option<&str>, types: &mut Vec<TypeDecl>) {
    // message_block = { "message" ~ message_name ~ message_body }
    let mut message = Message::default();
    let mut body_opt: Option<Pair<Rule>> = None;

    for p in block.into_inner() {
        match p.as_rule() {
            Rule::message_name => message.name = qualify(parent, p.as_str()),
            Rule::message_body => body_opt = Some(p),
            _ => {}
        }
    }

    // Nested declarations land in `types` before their parent.
    if let Some(body) = body_opt {
        for elem in body.into_inner() {
            for inner in elem.into_inner() {
                match inner.as_rule() {
                    Rule::field => {
                        if let Some(field) = parse_field(inner, None) {
                            message.fields.push(field);
                        }
                    }
                    Rule::map_field => {
                        if let Some(field) = parse_map_field(inner) {
                            message.fields.push(field);
                        }
                    }
                    Rule::oneof => {
                        // Flatten oneof members into message fields, remembering the group name
                        let mut group: Option<String> = None;
                        for p in inner.into_inner() {
                            match p.as_rule() {
                                Rule::oneof_name => group = Some(p.as_str().to_string()),
                                Rule::field => {
                                    if let Some(field) = parse_field(p, group.clone()) {
                                        message.fields.push(field);
                                    }
                                }
                                _ => {}
                            }
                        }
                    }
                    Rule::option_statement => message.options.push(parse_option(inner)),
                    Rule::enum_block => parse_enum_block(inner, Some(&message.name), types),
                    Rule::message_block => parse_message_block(inner, Some(&message.name), types),
                    _ => {}
                }
            }
        }
    }

    types.push(TypeDecl::Message(message));
}

fn parse_enum_block(block: Pair<Rule>, parent: Option<&str>, types: &mut Vec<TypeDecl>) {
    // enum_block = { "enum" ~ enum_name ~ "{" ~ enum_body* ~ "}" }
    let mut en = Enum::default();

    for p in block.into_inner() {
        match p.as_rule() {
            Rule::enum_name => en.name = qualify(parent, p.as_str()),
            Rule::enum_body => {
                for eb in p.into_inner() {
                    if eb.as_rule() != Rule::enum_field {
                        continue;
                    }
                    let mut val_name: Option<String> = None;
                    let mut number: Option<i32> = None;
                    for ef in eb.into_inner() {
                        match ef.as_rule() {
                            Rule::enum_field_name => val_name = Some(ef.as_str().to_string()),
                            Rule::enum_field_value => {
                                number = i32::try_from(parse_integer_literal(ef.as_str())).ok();
                            }
                            _ => {}
                        }
                    }
                    if let (Some(name), Some(number)) = (val_name, number) {
                        en.values.push(EnumValue { name, number });
                    }
                }
            }
            _ => {}
        }
    }

    types.push(TypeDecl::Enum(en));
}

fn parse_field(pair: Pair<Rule>, oneof: Option<String>) -> Option<Field> {
    // field = { field_modifier? ~ type_reference ~ field_name ~ "=" ~ tag ~ field_options? ~ ";" }
    let mut ty_opt: Option<FieldType> = None;
    let mut name_opt: Option<String> = None;
    let mut order_opt: Option<u32> = None;
    let mut label = FieldLabel::Singular;
    let mut options = Vec::new();

    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::field_modifier => {
                label = match p.as_str() {
                    "repeated" => FieldLabel::Repeated,
                    "optional" => FieldLabel::Optional,
                    "required" => FieldLabel::Required,
                    _ => FieldLabel::Singular,
                }
            }
            Rule::type_reference => ty_opt = Some(parse_type_reference(p)),
            Rule::field_name => name_opt = Some(p.as_str().to_string()),
            Rule::tag => order_opt = u32::try_from(parse_integer_literal(p.as_str())).ok(),
            Rule::field_options => options = parse_field_options(p),
            _ => {}
        }
    }

    match (ty_opt, name_opt, order_opt) {
        (Some(ty), Some(name), Some(order)) => Some(Field {
            ty,
            name,
            order,
            label,
            map_key: None,
            oneof,
            options,
        }),
        _ => None,
    }
}

fn parse_map_field(pair: Pair<Rule>) -> Option<Field> {
    // map_field = { "map" ~ "<" ~ scalar_type ~ "," ~ type_reference ~ ">" ~ field_name ~ "=" ~ tag ~ field_options? ~ ";" }
    let mut key: Option<ScalarType> = None;
    let mut value: Option<FieldType> = None;
    let mut name_opt: Option<String> = None;
    let mut order_opt: Option<u32> = None;
    let mut options = Vec::new();

    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::scalar_type => key = Some(parse_scalar_type(p.as_str())),
            Rule::type_reference => value = Some(parse_type_reference(p)),
            Rule::field_name => name_opt = Some(p.as_str().to_string()),
            Rule::tag => order_opt = u32::try_from(parse_integer_literal(p.as_str())).ok(),
            Rule::field_options => options = parse_field_options(p),
            _ => {}
        }
    }

    match (key, value, name_opt, order_opt) {
        (Some(key), Some(ty), Some(name), Some(order)) => Some(Field {
            ty,
            name,
            order,
            label: FieldLabel::Repeated,
            map_key: Some(key),
            oneof: None,
            options,
        }),
        _ => None,
    }
}

fn parse_field_options(pair: Pair<Rule>) -> Vec<OptionEntry> {
    pair.into_inner()
        .filter(|p| p.as_rule() == Rule::field_option)
        .map(parse_option)
        .collect()
}

fn parse_type_reference(pair: Pair<Rule>) -> FieldType {
    // type_reference = { scalar_type | message_type }
    // A leading '.' is kept: it marks an absolute reference for scope resolution.
    match pair.clone().into_inner().next() {
        Some(first) if first.as_rule() == Rule::scalar_type => {
            FieldType::Scalar(parse_scalar_type(first.as_str()))
        }
        _ => FieldType::Custom(pair.as_str().trim().to_string()),
    }
}

fn parse_scalar_type(s: &str) -> ScalarType {
    match s {
        "double" => ScalarType::Double,
        "float" => ScalarType::Float,
        "int32" => ScalarType::Int32,
        "int64" => ScalarType::Int64,
        "uint32" => ScalarType::Uint32,
        "uint64" => ScalarType::Uint64,
        "sint32" => ScalarType::Sint32,
        "sint64" => ScalarType::Sint64,
        "fixed32" => ScalarType::Fixed32,
        "fixed64" => ScalarType::Fixed64,
        "sfixed32" => ScalarType::Sfixed32,
        "sfixed64" => ScalarType::Sfixed64,
        "bool" => ScalarType::Bool,
        "string" => ScalarType::String,
        "bytes" => ScalarType::Bytes,
        _ => ScalarType::String, // fallback shouldn't happen
    }
}

fn parse_service_block(block: Pair<Rule>) -> Service {
    // service_block = { "service" ~ service_name ~ "{" ~ service_element* ~ "}" }
    let mut service = Service::default();
    for p in block.into_inner() {
        match p.as_rule() {
            Rule::service_name => service.name = p.as_str().to_string(),
            Rule::service_element => {
                for inner in p.into_inner() {
                    match inner.as_rule() {
                        Rule::option_statement => service.options.push(parse_option(inner)),
                        Rule::rpc => service.methods.push(parse_rpc(inner)),
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
    service
}

fn parse_rpc(pair: Pair<Rule>) -> Rpc {
    // rpc = { "rpc" ~ rpc_name ~ rpc_input ~ "returns" ~ rpc_output ~ (rpc_body | ";") }
    let mut rpc = Rpc::default();
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::rpc_name => rpc.name = p.as_str().to_string(),
            Rule::rpc_input => {
                (rpc.client_streaming, rpc.input_type) = parse_rpc_type(p);
            }
            Rule::rpc_output => {
                (rpc.server_streaming, rpc.output_type) = parse_rpc_type(p);
            }
            Rule::rpc_body => {
                for o in p.into_inner() {
                    if o.as_rule() == Rule::option_statement {
                        rpc.options.push(parse_option(o));
                    }
                }
            }
            _ => {}
        }
    }
    rpc
}

fn parse_rpc_type(pair: Pair<Rule>) -> (bool, String) {
    let mut streaming = false;
    let mut ty = String::new();
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::stream => streaming = true,
            Rule::message_type => ty = p.as_str().to_string(),
            _ => {}
        }
    }
    (streaming, ty)
}

// ---------------- Options ----------------

fn parse_option(pair: Pair<Rule>) -> OptionEntry {
    // option_statement = { "option" ~ option_name ~ "=" ~ constant ~ ";" }
    // field_option     = { option_name ~ "=" ~ constant }
    let mut name = String::new();
    let mut value = OptionValue::Aggregate(Vec::new());
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::option_name => name = p.as_str().to_string(),
            Rule::constant => value = parse_constant(p),
            _ => {}
        }
    }
    OptionEntry { name, value }
}

fn parse_constant(pair: Pair<Rule>) -> OptionValue {
    let Some(inner) = pair.into_inner().next() else {
        return OptionValue::Aggregate(Vec::new());
    };
    match inner.as_rule() {
        Rule::aggregate => parse_aggregate(inner),
        Rule::string_value => OptionValue::String(parse_string_value(inner)),
        Rule::float_value => OptionValue::Float(inner.as_str().parse::<f64>().unwrap_or(0.0)),
        Rule::int_value => OptionValue::Int(parse_integer_literal(inner.as_str())),
        Rule::bool_value => OptionValue::Bool(inner.as_str() == "true"),
        _ => OptionValue::Ident(inner.as_str().to_string()),
    }
}

fn parse_aggregate(pair: Pair<Rule>) -> OptionValue {
    // aggregate = { "{" ~ aggregate_field* ~ "}" }
    let mut entries = Vec::new();
    for field in pair.into_inner() {
        let mut key = String::new();
        let mut value: Option<OptionValue> = None;
        for p in field.into_inner() {
            match p.as_rule() {
                Rule::aggregate_key => key = p.as_str().to_string(),
                Rule::aggregate_value => value = Some(parse_aggregate_value(p)),
                _ => {}
            }
        }
        if let Some(value) = value {
            entries.push((key, value));
        }
    }
    OptionValue::Aggregate(entries)
}

fn parse_aggregate_value(pair: Pair<Rule>) -> OptionValue {
    match pair.into_inner().next() {
        Some(p) if p.as_rule() == Rule::aggregate => parse_aggregate(p),
        Some(p) if p.as_rule() == Rule::aggregate_list => {
            OptionValue::List(p.into_inner().map(parse_aggregate_value).collect())
        }
        Some(p) => parse_constant(p),
        None => OptionValue::List(Vec::new()),
    }
}

fn parse_string_value(pair: Pair<Rule>) -> String {
    // Adjacent literals concatenate, as in C.
    pair.into_inner()
        .map(|lit| {
            let raw = lit.as_str();
            unescape(&raw[1..raw.len() - 1])
        })
        .collect()
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn parse_integer_literal(s: &str) -> i64 {
    // dec|hex|oct with optional sign; out-of-range values saturate
    let (neg, rest) = match s.strip_prefix('-') {
        Some(stripped) => (true, stripped),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let val: i128 = if rest.starts_with("0x") || rest.starts_with("0X") {
        i128::from_str_radix(&rest[2..], 16).unwrap_or(0)
    } else if rest.starts_with('0') && rest.len() > 1 {
        // Octal per grammar
        i128::from_str_radix(&rest[1..], 8).unwrap_or(0)
    } else {
        rest.parse::<i128>().unwrap_or(0)
    };
    let signed = if neg { -val } else { val };
    signed.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}
