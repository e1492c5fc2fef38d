//! Method classifier: the single place that decides which client surface a
//! method gets.
//!
//! Order is authoritative: bidi, client and server streaming, then
//! long-running, then paginated, else simple. A method that satisfies both
//! the long-running and the pagination conventions is long-running.
//! Long-running needs `operation_info` and the configured operation type as
//! output.

use parser::descriptor::{Api, FieldKind, LroInfo, Message, Method, StreamingKind};

use crate::config::{GeneratorConfig, PaginationConfig};
use crate::error::GenerateError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodShape {
    Simple,
    ServerStreaming,
    ClientStreaming,
    BidiStreaming,
    Paginated(Pagination),
    LongRunning(LroInfo),
}

/// The repeated field carrying one page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub field: String,
    pub element: FieldKind,
}

impl MethodShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodShape::Simple => "simple",
            MethodShape::ServerStreaming => "server_streaming",
            MethodShape::ClientStreaming => "client_streaming",
            MethodShape::BidiStreaming => "bidi_streaming",
            MethodShape::Paginated(_) => "paginated",
            MethodShape::LongRunning(_) => "long_running",
        }
    }
}

pub fn classify(
    method: &Method,
    api: &Api,
    config: &GeneratorConfig,
) -> Result<MethodShape, GenerateError> {
    match method.streaming {
        StreamingKind::Bidi => return Ok(MethodShape::BidiStreaming),
        StreamingKind::Client => return Ok(MethodShape::ClientStreaming),
        StreamingKind::Server => return Ok(MethodShape::ServerStreaming),
        StreamingKind::None => {}
    }
    if let Some(lro) = &method.lro {
        if method.output_type == config.lro.operation_type {
            return Ok(MethodShape::LongRunning(lro.clone()));
        }
        tracing::warn!(
            method = %method.name,
            output = %method.output_type,
            operation_type = %config.lro.operation_type,
            "operation_info on a method that does not return the operation type; ignoring it"
        );
    }

    let input = lookup(api, &method.input_type)?;
    let output = lookup(api, &method.output_type)?;
    match pagination(input, output, &config.pagination) {
        PageMatch::Full(p) => Ok(MethodShape::Paginated(p)),
        PageMatch::Partial(missing) => {
            tracing::warn!(
                method = %method.name,
                missing,
                "method partially matches the pagination convention; treating it as simple"
            );
            Ok(MethodShape::Simple)
        }
        PageMatch::None => Ok(MethodShape::Simple),
    }
}

pub(crate) fn lookup<'a>(api: &'a Api, full_name: &str) -> Result<&'a Message, GenerateError> {
    api.message(full_name)
        .ok_or_else(|| GenerateError::MissingMessage(full_name.to_string()))
}

enum PageMatch {
    Full(Pagination),
    Partial(&'static str),
    None,
}

fn pagination(input: &Message, output: &Message, convention: &PaginationConfig) -> PageMatch {
    let has_size = convention
        .page_size_fields
        .iter()
        .any(|name| input.field(name).is_some_and(|f| !f.is_repeated));
    let has_token = input.field(&convention.page_token_field).is_some();
    let has_next = output.field(&convention.next_page_token_field).is_some();
    let mut repeated = output.fields.iter().filter(|f| f.is_repeated && !f.is_map());
    let page_field = match (repeated.next(), repeated.next()) {
        (Some(field), None) => Some(field),
        _ => None,
    };

    match (has_size, has_token, has_next, page_field) {
        (true, true, true, Some(field)) => PageMatch::Full(Pagination {
            field: field.name.clone(),
            element: field.kind.clone(),
        }),
        (false, false, false, _) => PageMatch::None,
        (false, ..) => PageMatch::Partial("page size field"),
        (_, false, ..) => PageMatch::Partial("page token field"),
        (_, _, false, _) => PageMatch::Partial("next page token field"),
        (.., None) => PageMatch::Partial("single repeated result field"),
    }
}
