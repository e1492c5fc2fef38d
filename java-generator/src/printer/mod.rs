//! Deterministic Java printer.
//!
//! Rendering is an exhaustive match over the AST. Expressions are first
//! rendered flat; statements that overflow the column limit are then broken
//! after `=` and, if still too long, at each call of a method chain.

mod imports;
mod writer;

use std::fmt;

use thiserror::Error;

use crate::ast::{
    Annotation, BuilderChain, ClassDefinition, Expr, FieldDecl, Literal, MethodDefinition,
    MethodInvocation, Receiver, RelationalOp, Scope, Statement, TypeNode, TypeRef, VariableExpr,
};
use crate::config::FormatConfig;

pub use imports::ImportTable;
pub use writer::CodeWriter;

#[derive(Debug, Error)]
pub enum PrintError {
    #[error("type `{0}` has no fully-qualified name")]
    UnresolvedType(String),

    #[error("failed to write source text")]
    Fmt(#[from] fmt::Error),
}

/// Render a top-level class, including package, imports and file header.
pub fn print_class(class: &ClassDefinition, format: &FormatConfig) -> Result<String, PrintError> {
    let imports = ImportTable::collect(class)?;
    let printer = JavaPrinter {
        imports: &imports,
        format,
        outer: &class.name,
    };

    let mut out = String::new();
    let mut w = CodeWriter::new(&mut out, format.indent_width);
    if !class.file_header.is_empty() {
        w.block_comment(&class.file_header)?;
        w.blank_line()?;
    }
    if !class.package.is_empty() {
        w.writeln(&format!("package {};", class.package))?;
        w.blank_line()?;
    }
    if let Some(tag) = &class.region_tag {
        w.writeln(&format!("// [START {tag}]"))?;
    }
    let mut any_import = false;
    for import in imports.imports() {
        w.writeln(&format!("import {import};"))?;
        any_import = true;
    }
    if any_import {
        w.blank_line()?;
    }
    printer.class(&mut w, class)?;
    if let Some(tag) = &class.region_tag {
        w.writeln(&format!("// [END {tag}]"))?;
    }
    drop(w);
    Ok(out)
}

struct JavaPrinter<'a> {
    imports: &'a ImportTable,
    format: &'a FormatConfig,
    /// Top-level class being printed; nested references drop this prefix.
    outer: &'a str,
}

/// A call chain split into its head and `.call(..)` segments.
struct Chain {
    head: String,
    segments: Vec<String>,
}

impl JavaPrinter<'_> {
    fn fits<W: fmt::Write>(&self, w: &CodeWriter<W>, extra: usize, text: &str) -> bool {
        w.indent_columns() + extra + text.chars().count() <= self.format.column_limit
    }

    // ---------------- Types ----------------

    fn type_ref(&self, r: &TypeRef) -> String {
        self.imports.name_of(r, self.outer)
    }

    fn type_name(&self, ty: &TypeNode) -> String {
        match ty {
            TypeNode::Primitive(kind) => kind.keyword().to_string(),
            TypeNode::Declared(r) => self.type_ref(r),
            TypeNode::Generic(r, args) => {
                let args: Vec<String> = args.iter().map(|a| self.type_name(a)).collect();
                format!("{}<{}>", self.type_ref(r), args.join(", "))
            }
            TypeNode::Array(inner) => format!("{}[]", self.type_name(inner)),
        }
    }

    fn annotation(&self, a: &Annotation) -> String {
        match &a.value {
            Some(value) => format!("@{}({})", self.type_ref(&a.ty), quote(value)),
            None => format!("@{}", self.type_ref(&a.ty)),
        }
    }

    // ---------------- Declarations ----------------

    fn class<W: fmt::Write>(&self, w: &mut CodeWriter<W>, class: &ClassDefinition) -> fmt::Result {
        for a in &class.annotations {
            w.writeln(&self.annotation(a))?;
        }

        let mut head = modifiers(class.scope, class.is_abstract, class.is_static, class.is_final);
        head.push_str("class ");
        head.push_str(&class.name);
        let mut clauses = Vec::new();
        if let Some(extends) = &class.extends {
            clauses.push(format!("extends {}", self.type_name(extends)));
        }
        if !class.implements.is_empty() {
            let names: Vec<String> = class.implements.iter().map(|t| self.type_name(t)).collect();
            clauses.push(format!("implements {}", names.join(", ")));
        }
        let single = std::iter::once(head.clone())
            .chain(clauses.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ");
        if clauses.is_empty() || self.fits(w, 0, &format!("{single} {{")) {
            w.writeln(&format!("{single} {{"))?;
        } else {
            w.writeln(&head)?;
            let last = clauses.len() - 1;
            for (i, clause) in clauses.iter().enumerate() {
                let text = if i == last {
                    format!("{clause} {{")
                } else {
                    clause.clone()
                };
                w.writeln_continued(self.format.continuation_indent, &text)?;
            }
        }

        {
            let _indent = w.indent();
            for field in &class.fields {
                self.field(w, field)?;
            }
            w.blank_line()?;
            for (i, method) in class.methods.iter().enumerate() {
                if i > 0 {
                    w.blank_line()?;
                }
                self.method(w, method)?;
            }
            for nested in &class.nested {
                w.blank_line()?;
                self.class(w, nested)?;
            }
        }
        w.writeln("}")
    }

    fn field<W: fmt::Write>(&self, w: &mut CodeWriter<W>, field: &FieldDecl) -> fmt::Result {
        let mut text = modifiers(field.scope, false, field.is_static, field.is_final);
        text.push_str(&self.type_name(&field.variable.ty));
        text.push(' ');
        text.push_str(&field.variable.name);
        match &field.initializer {
            Some(init) => self.assignment_lines(w, "", &text, init, ";"),
            None => w.writeln(&format!("{text};")),
        }
    }

    fn method<W: fmt::Write>(&self, w: &mut CodeWriter<W>, method: &MethodDefinition) -> fmt::Result {
        for a in &method.annotations {
            w.writeln(&self.annotation(a))?;
        }

        let mut lead = modifiers(method.scope, method.is_abstract, method.is_static, method.is_final);
        if !method.is_constructor {
            lead.push_str(&self.type_name(&method.return_type));
            lead.push(' ');
        }
        let params: Vec<String> = method
            .params
            .iter()
            .map(|p| format!("{} {}", self.type_name(&p.ty), p.name))
            .collect();
        let throws = if method.throws.is_empty() {
            String::new()
        } else {
            let names: Vec<String> = method.throws.iter().map(|t| self.type_ref(t)).collect();
            format!(" throws {}", names.join(", "))
        };
        let open = if method.is_abstract {
            ";"
        } else if method.body.is_empty() {
            " {}"
        } else {
            " {"
        };

        let single = format!("{lead}{}({}){throws}{open}", method.name, params.join(", "));
        let cont = self.format.continuation_indent;
        if self.fits(w, 0, &single) {
            w.writeln(&single)?;
        } else if params.is_empty() {
            w.writeln(lead.trim_end())?;
            w.writeln_continued(cont, &format!("{}(){throws}{open}", method.name))?;
        } else {
            w.writeln(&format!("{lead}{}(", method.name))?;
            w.writeln_continued(cont, &format!("{}){throws}{open}", params.join(", ")))?;
        }

        if method.is_abstract || method.body.is_empty() {
            return Ok(());
        }
        {
            let _indent = w.indent();
            for statement in &method.body {
                self.statement(w, statement)?;
            }
        }
        w.writeln("}")
    }

    // ---------------- Statements ----------------

    fn statement<W: fmt::Write>(&self, w: &mut CodeWriter<W>, statement: &Statement) -> fmt::Result {
        match statement {
            Statement::Expr(e) => self.expr_lines(w, "", e, ";"),
            Statement::Return(e) => self.expr_lines(w, "return ", e, ";"),
            Statement::For {
                variable,
                collection,
                body,
            } => {
                let header = format!(
                    "for ({} {} : {})",
                    self.type_name(&variable.ty),
                    variable.name,
                    self.expr(collection)
                );
                w.block(&header, |w| {
                    for s in body {
                        self.statement(w, s)?;
                    }
                    Ok(())
                })
            }
            Statement::Try { resources, body } => {
                let resources: Vec<String> = resources.iter().map(|r| self.expr(r)).collect();
                w.block(&format!("try ({})", resources.join("; ")), |w| {
                    for s in body {
                        self.statement(w, s)?;
                    }
                    Ok(())
                })
            }
            Statement::Comment(text) => w.line_comment(text),
        }
    }

    /// `<prefix><expr><suffix>`, wrapped when it overflows.
    fn expr_lines<W: fmt::Write>(
        &self,
        w: &mut CodeWriter<W>,
        prefix: &str,
        expr: &Expr,
        suffix: &str,
    ) -> fmt::Result {
        if let Expr::Assign(a) = expr {
            let target = self.variable_expr(&a.target);
            return self.assignment_lines(w, prefix, &target, &a.value, suffix);
        }
        let flat = format!("{prefix}{}{suffix}", self.expr(expr));
        if self.fits(w, 0, &flat) {
            return w.writeln(&flat);
        }
        match self.chain(expr) {
            Some(chain) if chain.segments.len() > 1 => {
                w.writeln(&format!("{prefix}{}", chain.head))?;
                self.segments(w, self.format.continuation_indent, &chain.segments, suffix)
            }
            _ => w.writeln(&flat),
        }
    }

    fn assignment_lines<W: fmt::Write>(
        &self,
        w: &mut CodeWriter<W>,
        prefix: &str,
        target: &str,
        value: &Expr,
        suffix: &str,
    ) -> fmt::Result {
        let value_text = self.expr(value);
        let flat = format!("{prefix}{target} = {value_text}{suffix}");
        if self.fits(w, 0, &flat) {
            return w.writeln(&flat);
        }

        let cont = self.format.continuation_indent;
        w.writeln(&format!("{prefix}{target} ="))?;
        let continued = format!("{value_text}{suffix}");
        if self.fits(w, cont, &continued) {
            return w.writeln_continued(cont, &continued);
        }
        match self.chain(value) {
            Some(chain) if chain.segments.len() > 1 => {
                w.writeln_continued(cont, &chain.head)?;
                self.segments(w, cont * 2, &chain.segments, suffix)
            }
            _ => w.writeln_continued(cont, &continued),
        }
    }

    fn segments<W: fmt::Write>(
        &self,
        w: &mut CodeWriter<W>,
        extra: usize,
        segments: &[String],
        suffix: &str,
    ) -> fmt::Result {
        let last = segments.len().saturating_sub(1);
        for (i, segment) in segments.iter().enumerate() {
            if i == last {
                w.writeln_continued(extra, &format!("{segment}{suffix}"))?;
            } else {
                w.writeln_continued(extra, segment)?;
            }
        }
        Ok(())
    }

    // ---------------- Expressions ----------------

    fn args(&self, args: &[Expr]) -> String {
        args.iter().map(|a| self.expr(a)).collect::<Vec<_>>().join(", ")
    }

    fn variable_expr(&self, v: &VariableExpr) -> String {
        let mut text = String::new();
        if v.is_decl {
            text.push_str(&self.type_name(&v.variable.ty));
            text.push(' ');
        }
        if let Some(q) = &v.qualifier {
            text.push_str(&self.expr(q));
            text.push('.');
        }
        text.push_str(&v.variable.name);
        text
    }

    fn invocation(&self, m: &MethodInvocation) -> String {
        let receiver = match &m.receiver {
            Receiver::None => String::new(),
            Receiver::Expr(e) => format!("{}.", self.expr(e)),
            Receiver::Static(r) => format!("{}.", self.type_ref(r)),
        };
        format!("{receiver}{}({})", m.name, self.args(&m.args))
    }

    fn builder_calls(&self, b: &BuilderChain) -> Vec<String> {
        b.calls
            .iter()
            .map(|(name, arg)| format!(".{name}({})", self.expr(arg)))
            .chain(std::iter::once(".build()".to_string()))
            .collect()
    }

    fn expr(&self, expr: &Expr) -> String {
        match expr {
            Expr::Variable(v) => self.variable_expr(v),
            Expr::Invoke(m) => self.invocation(m),
            Expr::Assign(a) => format!("{} = {}", self.variable_expr(&a.target), self.expr(&a.value)),
            Expr::Literal(l) => literal(l),
            Expr::Builder(b) => format!(
                "{}.newBuilder(){}",
                self.type_ref(&b.ty),
                self.builder_calls(b).concat()
            ),
            Expr::New { ty, args } => format!("new {}({})", self.type_name(ty), self.args(args)),
            Expr::StaticField { owner, name } => format!("{}.{name}", self.type_ref(owner)),
            Expr::Ternary {
                condition,
                then,
                otherwise,
            } => format!(
                "{} ? {} : {}",
                self.expr(condition),
                self.expr(then),
                self.expr(otherwise)
            ),
            Expr::Relational { lhs, op, rhs } => {
                let op = match op {
                    RelationalOp::Equal => "==",
                    RelationalOp::NotEqual => "!=",
                };
                format!("{} {op} {}", self.expr(lhs), self.expr(rhs))
            }
            Expr::This => "this".to_string(),
        }
    }

    /// Split a builder or instance-call chain into head and segments.
    fn chain(&self, expr: &Expr) -> Option<Chain> {
        match expr {
            Expr::Builder(b) => Some(Chain {
                head: format!("{}.newBuilder()", self.type_ref(&b.ty)),
                segments: self.builder_calls(b),
            }),
            Expr::Invoke(m) => {
                let Receiver::Expr(receiver) = &m.receiver else {
                    return None;
                };
                let segment = format!(".{}({})", m.name, self.args(&m.args));
                let mut chain = self.chain(receiver).unwrap_or_else(|| Chain {
                    head: self.expr(receiver),
                    segments: Vec::new(),
                });
                chain.segments.push(segment);
                Some(chain)
            }
            _ => None,
        }
    }
}

fn modifiers(scope: Scope, is_abstract: bool, is_static: bool, is_final: bool) -> String {
    let mut text = String::new();
    let keywords = [
        scope.keyword(),
        is_abstract.then_some("abstract"),
        is_static.then_some("static"),
        is_final.then_some("final"),
    ];
    for keyword in keywords.into_iter().flatten() {
        text.push_str(keyword);
        text.push(' ');
    }
    text
}

fn literal(l: &Literal) -> String {
    match l {
        Literal::Null => "null".to_string(),
        Literal::Bool(b) => b.to_string(),
        Literal::Int(v) => v.to_string(),
        Literal::Long(v) => format!("{v}L"),
        Literal::Float(v) => format!("{v}F"),
        Literal::Double(v) => format!("{v}D"),
        Literal::String(s) => quote(s),
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{PrimitiveKind, Variable, known};
    use proptest::prelude::*;

    fn format() -> FormatConfig {
        FormatConfig::default()
    }

    fn method_with(body: Vec<Statement>) -> ClassDefinition {
        let mut class = ClassDefinition::new("com.example", "Demo");
        let mut method = MethodDefinition::new("run", TypeNode::VOID);
        method.body = body;
        class.methods.push(method);
        class
    }

    fn request_type() -> TypeRef {
        TypeRef::new("com.example.v1", "QueryWriteStatusRequest")
    }

    #[test]
    fn prints_package_imports_and_body() {
        let response = Variable::new("names", known::list(known::string()));
        let class = method_with(vec![Statement::expr(Expr::declare(
            response,
            Expr::new_object(known::array_list(known::string()), vec![]),
        ))]);
        let text = print_class(&class, &format()).unwrap();
        assert_eq!(
            text,
            "package com.example;\n\
             \n\
             import java.util.ArrayList;\n\
             import java.util.List;\n\
             \n\
             public class Demo {\n\
             \n\
             \x20 public void run() {\n\
             \x20   List<String> names = new ArrayList<String>();\n\
             \x20 }\n\
             }\n"
        );
    }

    #[test]
    fn long_assignment_breaks_after_equals_then_per_call() {
        let request = Variable::new("request", TypeNode::Declared(request_type()));
        let builder = Expr::Builder(BuilderChain {
            ty: request_type(),
            calls: vec![
                ("setUploadId".into(), Expr::string("uploadId1563990780")),
                (
                    "setCommonObjectRequestParams".into(),
                    Expr::Builder(BuilderChain {
                        ty: TypeRef::new("com.example.v1", "CommonObjectRequestParams"),
                        calls: vec![],
                    }),
                ),
            ],
        });
        let class = method_with(vec![Statement::expr(Expr::declare(request, builder))]);
        let text = print_class(&class, &format()).unwrap();
        assert!(text.contains(
            "    QueryWriteStatusRequest request =\n\
             \x20       QueryWriteStatusRequest.newBuilder()\n\
             \x20           .setUploadId(\"uploadId1563990780\")\n\
             \x20           .setCommonObjectRequestParams(CommonObjectRequestParams.newBuilder().build())\n\
             \x20           .build();\n"
        ));
    }

    #[test]
    fn medium_assignment_only_breaks_after_equals() {
        let request = Variable::new("request", TypeNode::declared("com.example", "EchoRequest"));
        let builder = Expr::Builder(BuilderChain {
            ty: TypeRef::new("com.example", "EchoRequest"),
            calls: vec![
                ("setContent".into(), Expr::var(&Variable::new("content", known::string()))),
                ("setSeverity".into(), Expr::var(&Variable::new("severity", known::string()))),
            ],
        });
        let class = method_with(vec![Statement::expr(Expr::declare(request, builder))]);
        let text = print_class(&class, &format()).unwrap();
        assert!(text.contains(
            "    EchoRequest request =\n\
             \x20       EchoRequest.newBuilder().setContent(content).setSeverity(severity).build();\n"
        ));
    }

    #[test]
    fn long_method_headers_move_params_to_continuation_line() {
        let mut class = ClassDefinition::new("com.example", "Demo");
        let mut method = MethodDefinition::new(
            "waitOperationCallable",
            known::operation_callable(
                TypeNode::declared("com.example", "WaitRequestWithALongName"),
                TypeNode::declared("com.example", "WaitResponseWithALongName"),
                TypeNode::declared("com.example", "WaitMetadataWithALongName"),
            ),
        );
        method.is_abstract = true;
        class.methods.push(method);
        let text = print_class(&class, &format()).unwrap();
        assert!(text.contains(
            "  public abstract OperationCallable<WaitRequestWithALongName, WaitResponseWithALongName, WaitMetadataWithALongName>\n\
             \x20     waitOperationCallable();\n"
        ));
    }

    #[test]
    fn region_tags_wrap_imports_through_class() {
        let mut class = method_with(vec![Statement::comment("doThingsWith(element);")]);
        class.region_tag = Some("demo_v1_generated_democlient_run_sync".into());
        class.file_header = vec!["Copyright".into()];
        let text = print_class(&class, &format()).unwrap();
        assert!(text.starts_with("/*\n * Copyright\n */\n\npackage com.example;\n\n// [START demo_v1"));
        assert!(text.ends_with("}\n// [END demo_v1_generated_democlient_run_sync]\n"));
        assert!(text.contains("    // doThingsWith(element);\n"));
    }

    #[test]
    fn literals_carry_java_suffixes() {
        assert_eq!(literal(&Literal::Long(-995424086)), "-995424086L");
        assert_eq!(literal(&Literal::Float(951530617.0)), "951530617F");
        assert_eq!(literal(&Literal::Double(-1.5)), "-1.5D");
        assert_eq!(literal(&Literal::String("a\"b".into())), "\"a\\\"b\"");
    }

    #[test]
    fn try_and_for_blocks_indent() {
        let client = Variable::new("echoClient", TypeNode::declared("com.example", "EchoClient"));
        let element = Variable::new("element", TypeNode::declared("com.example", "EchoResponse"));
        let body = vec![Statement::Try {
            resources: vec![Expr::declare(
                client.clone(),
                Expr::call_static(TypeRef::new("com.example", "EchoClient"), "create", vec![]),
            )],
            body: vec![Statement::For {
                variable: element,
                collection: Expr::call(Expr::var(&client), "iterateAll", vec![]),
                body: vec![Statement::comment("doThingsWith(element);")],
            }],
        }];
        let text = print_class(&method_with(body), &format()).unwrap();
        assert!(text.contains(
            "    try (EchoClient echoClient = EchoClient.create()) {\n\
             \x20     for (EchoResponse element : echoClient.iterateAll()) {\n\
             \x20       // doThingsWith(element);\n\
             \x20     }\n\
             \x20   }\n"
        ));
    }

    const PACKAGES: &[&str] = &["com.example", "com.a", "com.b", "java.lang", "java.util"];
    const NAMES: &[&str] = &["String", "Status", "Echo", "List", "Demo", "Page"];

    fn arb_type() -> impl Strategy<Value = TypeNode> {
        let leaf = (0..PACKAGES.len(), 0..NAMES.len())
            .prop_map(|(p, n)| TypeNode::declared(PACKAGES[p], NAMES[n]));
        prop_oneof![
            Just(TypeNode::Primitive(PrimitiveKind::Int)),
            leaf.clone(),
            (leaf.clone(), leaf).prop_map(|(a, b)| known::map(a, b)),
        ]
    }

    proptest! {
        #[test]
        fn imports_are_sorted_unique_and_used(types in prop::collection::vec(arb_type(), 0..8)) {
            let mut class = ClassDefinition::new("com.example", "Demo");
            for (i, ty) in types.into_iter().enumerate() {
                class.fields.push(FieldDecl::private_final(Variable::new(format!("f{i}"), ty)));
            }
            let text = print_class(&class, &format()).unwrap();
            let imports: Vec<&str> = text
                .lines()
                .filter_map(|l| l.strip_prefix("import ")?.strip_suffix(';'))
                .collect();
            let mut sorted = imports.clone();
            sorted.sort();
            sorted.dedup();
            prop_assert_eq!(&imports, &sorted);

            let body = &text[text.find("public class").unwrap()..];
            for import in imports {
                prop_assert!(!import.starts_with("java.lang."));
                prop_assert!(!import.starts_with("com.example."));
                let simple = import.rsplit('.').next().unwrap();
                prop_assert!(body.contains(simple), "unused import {}", import);
            }
        }

        #[test]
        fn printing_is_deterministic(types in prop::collection::vec(arb_type(), 0..8)) {
            let mut class = ClassDefinition::new("com.example", "Demo");
            for (i, ty) in types.into_iter().enumerate() {
                class.fields.push(FieldDecl::private_final(Variable::new(format!("f{i}"), ty)));
            }
            let first = print_class(&class, &format()).unwrap();
            let second = print_class(&class.clone(), &format()).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
