//! Reference collection and the minimal import table.
//!
//! Only references that reach the printed text are collected: a method
//! invocation's result type, for instance, is never written out and so
//! never imported.

use std::collections::{BTreeMap, BTreeSet};

use crate::ast::{
    ClassDefinition, Expr, MethodDefinition, Receiver, Statement, TypeNode, TypeRef,
    VariableExpr,
};

use super::PrintError;

#[derive(Debug, Default)]
pub struct ImportTable {
    package: String,
    imports: BTreeSet<String>,
    /// Top-level names that must be written fully qualified.
    qualified: BTreeSet<String>,
}

impl ImportTable {
    /// Resolve every printed reference of `class` once.
    pub fn collect(class: &ClassDefinition) -> Result<Self, PrintError> {
        let mut collector = Collector::default();
        collector.class(class);
        let refs = collector.refs;

        if let Some(unresolved) = refs.iter().find(|r| r.package.is_empty()) {
            return Err(PrintError::UnresolvedType(unresolved.relative_name()));
        }

        // Group distinct top-level classes by the simple name they would print as.
        let mut by_simple_name: BTreeMap<&str, BTreeSet<(Visibility, String)>> = BTreeMap::new();
        by_simple_name
            .entry(class.name.as_str())
            .or_default()
            .insert((Visibility::Local, join(&class.package, &class.name)));
        for r in &refs {
            let visibility = if r.package == class.package {
                Visibility::Local
            } else if r.is_java_lang() {
                Visibility::Implicit
            } else {
                Visibility::Imported
            };
            by_simple_name
                .entry(r.top_level_name())
                .or_default()
                .insert((visibility, r.import_name()));
        }

        let mut table = ImportTable {
            package: class.package.clone(),
            ..Self::default()
        };
        for candidates in by_simple_name.values() {
            let mut iter = candidates.iter();
            let Some((winner_visibility, winner)) = iter.next() else {
                continue;
            };
            // Local and java.lang names are visible without an import, so
            // they keep the simple name; a clash among imports qualifies all.
            let ambiguous = candidates.len() > 1;
            match winner_visibility {
                Visibility::Imported if ambiguous => {
                    table.qualified.insert(winner.clone());
                }
                Visibility::Imported => {
                    table.imports.insert(winner.clone());
                }
                Visibility::Local | Visibility::Implicit => {}
            }
            for (_, other) in iter {
                table.qualified.insert(other.clone());
            }
        }
        Ok(table)
    }

    /// Sorted, de-duplicated import lines without the `import` keyword.
    pub fn imports(&self) -> impl Iterator<Item = &str> {
        self.imports.iter().map(String::as_str)
    }

    /// Text for a reference printed inside the top-level class `outer`.
    pub fn name_of(&self, r: &TypeRef, outer: &str) -> String {
        if self.qualified.contains(&r.import_name()) {
            return r.full_name();
        }
        if r.package == self.package
            && r.enclosing.first().is_some_and(|first| first == outer)
        {
            let mut parts: Vec<&str> = r.enclosing[1..].iter().map(String::as_str).collect();
            parts.push(&r.name);
            return parts.join(".");
        }
        r.relative_name()
    }
}

fn join(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{package}.{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Visibility {
    Local,
    Implicit,
    Imported,
}

#[derive(Default)]
struct Collector {
    refs: BTreeSet<TypeRef>,
}

impl Collector {
    fn reference(&mut self, r: &TypeRef) {
        self.refs.insert(r.clone());
    }

    fn type_node(&mut self, ty: &TypeNode) {
        match ty {
            TypeNode::Primitive(_) => {}
            TypeNode::Declared(r) => self.reference(r),
            TypeNode::Generic(r, args) => {
                self.reference(r);
                for arg in args {
                    self.type_node(arg);
                }
            }
            TypeNode::Array(inner) => self.type_node(inner),
        }
    }

    fn class(&mut self, class: &ClassDefinition) {
        for annotation in &class.annotations {
            self.reference(&annotation.ty);
        }
        if let Some(extends) = &class.extends {
            self.type_node(extends);
        }
        for ty in &class.implements {
            self.type_node(ty);
        }
        for field in &class.fields {
            self.type_node(&field.variable.ty);
            if let Some(init) = &field.initializer {
                self.expr(init);
            }
        }
        for method in &class.methods {
            self.method(method);
        }
        for nested in &class.nested {
            self.class(nested);
        }
    }

    fn method(&mut self, method: &MethodDefinition) {
        for annotation in &method.annotations {
            self.reference(&annotation.ty);
        }
        if !method.is_constructor {
            self.type_node(&method.return_type);
        }
        for param in &method.params {
            self.type_node(&param.ty);
        }
        for throws in &method.throws {
            self.reference(throws);
        }
        for statement in &method.body {
            self.statement(statement);
        }
    }

    fn statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Expr(e) | Statement::Return(e) => self.expr(e),
            Statement::For {
                variable,
                collection,
                body,
            } => {
                self.type_node(&variable.ty);
                self.expr(collection);
                for s in body {
                    self.statement(s);
                }
            }
            Statement::Try { resources, body } => {
                for r in resources {
                    self.expr(r);
                }
                for s in body {
                    self.statement(s);
                }
            }
            Statement::Comment(_) => {}
        }
    }

    fn variable_expr(&mut self, v: &VariableExpr) {
        if v.is_decl {
            self.type_node(&v.variable.ty);
        }
        if let Some(q) = &v.qualifier {
            self.expr(q);
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Variable(v) => self.variable_expr(v),
            Expr::Invoke(m) => {
                match &m.receiver {
                    Receiver::None => {}
                    Receiver::Expr(e) => self.expr(e),
                    Receiver::Static(r) => self.reference(r),
                }
                for arg in &m.args {
                    self.expr(arg);
                }
            }
            Expr::Assign(a) => {
                self.variable_expr(&a.target);
                self.expr(&a.value);
            }
            Expr::Literal(_) | Expr::This => {}
            Expr::Builder(b) => {
                self.reference(&b.ty);
                for (_, arg) in &b.calls {
                    self.expr(arg);
                }
            }
            Expr::New { ty, args } => {
                self.type_node(ty);
                for arg in args {
                    self.expr(arg);
                }
            }
            Expr::StaticField { owner, .. } => self.reference(owner),
            Expr::Ternary {
                condition,
                then,
                otherwise,
            } => {
                self.expr(condition);
                self.expr(then);
                self.expr(otherwise);
            }
            Expr::Relational { lhs, rhs, .. } => {
                self.expr(lhs);
                self.expr(rhs);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{FieldDecl, Variable, known};

    fn class_with_fields(types: Vec<TypeNode>) -> ClassDefinition {
        let mut class = ClassDefinition::new("com.example", "Holder");
        for (i, ty) in types.into_iter().enumerate() {
            class
                .fields
                .push(FieldDecl::private_final(Variable::new(format!("f{i}"), ty)));
        }
        class
    }

    #[test]
    fn skips_java_lang_and_same_package() {
        let class = class_with_fields(vec![
            known::string(),
            TypeNode::declared("com.example", "Sibling"),
            known::list(TypeNode::declared("com.other", "Thing")),
        ]);
        let table = ImportTable::collect(&class).unwrap();
        let imports: Vec<&str> = table.imports().collect();
        assert_eq!(imports, vec!["com.other.Thing", "java.util.List"]);
    }

    #[test]
    fn invocation_result_types_are_not_imported() {
        let mut class = ClassDefinition::new("com.example", "Holder");
        let mut method = crate::ast::MethodDefinition::new("run", TypeNode::VOID);
        method.body.push(Statement::Expr(
            Expr::call_local("compute", vec![])
                .returning(TypeNode::declared("com.hidden", "Result")),
        ));
        class.methods.push(method);
        let table = ImportTable::collect(&class).unwrap();
        assert_eq!(table.imports().count(), 0);
    }

    #[test]
    fn clashing_simple_names_print_qualified() {
        let class = class_with_fields(vec![
            TypeNode::declared("com.a", "Status"),
            TypeNode::declared("com.b", "Status"),
            TypeNode::declared("com.c", "Holder"),
        ]);
        let table = ImportTable::collect(&class).unwrap();
        assert_eq!(table.imports().count(), 0);
        assert_eq!(
            table.name_of(&TypeRef::new("com.a", "Status"), "Holder"),
            "com.a.Status"
        );
        assert_eq!(
            table.name_of(&TypeRef::new("com.c", "Holder"), "Holder"),
            "com.c.Holder"
        );
    }

    #[test]
    fn nested_types_shorten_inside_their_outer_class() {
        let class = class_with_fields(vec![]);
        let table = ImportTable::collect(&class).unwrap();
        let page = TypeRef::nested("com.example", vec!["Holder".into()], "Page");
        assert_eq!(table.name_of(&page, "Holder"), "Page");
        assert_eq!(table.name_of(&page, "Other"), "Holder.Page");
    }

    #[test]
    fn missing_package_is_fatal() {
        let class = class_with_fields(vec![TypeNode::declared("", "Orphan")]);
        let err = ImportTable::collect(&class).unwrap_err();
        assert!(matches!(err, PrintError::UnresolvedType(ref n) if n == "Orphan"));
    }
}
