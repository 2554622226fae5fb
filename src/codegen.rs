//! Render copy operations as Rust statements and mapping methods.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Config;
use crate::contract::{Binding, MethodPlan};
use crate::error::{Error, Result};
use crate::ir::{CopyOperation, CopySlot, Ty, TypeRef};
use crate::workspace::MethodDecl;

static IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\p{XID_Start}_]\p{XID_Continue}*$").expect("static regex"));

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut",
    "pub", "ref", "return", "static", "struct", "trait", "true", "type", "unsafe", "use",
    "where", "while", "abstract", "become", "box", "do", "final", "gen", "macro", "override",
    "priv", "try", "typeof", "unsized", "virtual", "yield",
];
// cannot be raw identifiers
const RESERVED: &[&str] = &["self", "Self", "super", "crate", "_"];

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

pub struct Codegen {
    out: String,
    indent: usize,
    receiver: String,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Codegen {
    pub fn new(cfg: &Config) -> Self {
        Self { out: String::new(), indent: cfg.indent, receiver: cfg.receiver.clone() }
    }

    /// Expression a binding stands for inside the method body.
    pub fn binding_expr(&self, binding: &Binding) -> Result<String> {
        match binding {
            Binding::Receiver => Ok(self.receiver.clone()),
            Binding::Param(name) => ident(name),
        }
    }

    /// One or more statements per operation, in operation order.
    pub fn statements(&self, ops: &[CopyOperation], source: &str, target: &str) -> Result<Vec<String>> {
        let mut out = Vec::with_capacity(ops.len());
        for op in ops {
            match op {
                CopyOperation::DirectAssign(slot) => {
                    let (read, write) = access(slot, source, target)?;
                    let value = read_value(&read, &slot.source.declared_type);
                    let wraps = !slot.target.declared_type.is_equal_to(&slot.source.declared_type)
                        && slot.target.declared_type.unwrap_optional().is_some();
                    if wraps {
                        out.push(format!("{write} = Some({value});"));
                    } else {
                        out.push(format!("{write} = {value};"));
                    }
                }
                CopyOperation::CoalesceAssign { slot, default_of } => {
                    let (read, write) = access(slot, source, target)?;
                    let read = if default_of.is_copy_scalar() { read } else { format!("{read}.clone()") };
                    match default_of.zero_literal() {
                        Some(zero) => out.push(format!("{write} = {read}.unwrap_or({zero});")),
                        None => out.push(format!("{write} = {read}.unwrap_or_default();")),
                    }
                }
                CopyOperation::CollectionReplace(slot) => {
                    let (read, write) = access(slot, source, target)?;
                    out.push(format!("{write}.clear();"));
                    out.push(format!("{write}.extend({read}.iter().cloned());"));
                }
            }
        }
        Ok(out)
    }

    /// Append a full method: signature from `method`, body replaced by `body`.
    pub fn emit_method(&mut self, method: &MethodDecl, plan: &MethodPlan, body: &[String]) -> Result<()> {
        let pad = " ".repeat(self.indent);
        let name = ident(&method.name)?;
        let mut params = vec!["&self".to_string()];
        for p in &method.params {
            let writes = plan.target == Binding::Param(p.name.clone());
            let by = if writes { "&mut " } else { "&" };
            params.push(format!("{}: {by}{}", ident(&p.name)?, p.ty));
        }
        let vis = if method.public { "pub " } else { "" };
        self.out.push_str(&format!("{vis}fn {name}({}) {{\n", params.join(", ")));
        for stmt in body {
            self.out.push_str(&format!("{pad}{stmt}\n"));
        }
        self.out.push_str("}\n");
        Ok(())
    }

    pub fn comment(&mut self, text: &str) {
        for line in text.lines() {
            self.out.push_str(&format!("// {line}\n"));
        }
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

/// Escape a member or parameter name for use as a Rust identifier.
pub fn ident(name: &str) -> Result<String> {
    if !IDENT.is_match(name) || RESERVED.contains(&name) {
        return Err(Error::InvalidIdentifier(name.to_string()));
    }
    if KEYWORDS.contains(&name) {
        return Ok(format!("r#{name}"));
    }
    Ok(name.to_string())
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// `(read expression, write place)` for a slot.
fn access(slot: &CopySlot<Ty>, source: &str, target: &str) -> Result<(String, String)> {
    Ok((
        format!("{source}.{}", ident(&slot.source.name)?),
        format!("{target}.{}", ident(&slot.target.name)?),
    ))
}

fn read_value(read: &str, ty: &Ty) -> String {
    if ty.is_copy_scalar() { read.to_string() } else { format!("{read}.clone()") }
}
