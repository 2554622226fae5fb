//! Suggestions: when to offer a generated mapping, and the edits it makes.
//!
//! Every request is computed from scratch against a read-only workspace. A
//! request either yields its complete set of edits or none at all; a failed
//! role lookup never produces a partial body.
use std::sync::atomic::{AtomicBool, Ordering};
use rayon::prelude::*;
use serde::Serialize;

use crate::codegen::Codegen;
use crate::config::Config;
use crate::contract::{contract_for_method, declared_contracts, implements, MappingContract, MethodPlan};
use crate::error::{Error, Result};
use crate::ir::{CopyOperation, Shape, Ty};
use crate::matcher::match_members;
use crate::reflect::reflect;
use crate::synth::synthesize;
use crate::workspace::{MethodDecl, TypeDescription, Workspace};

pub const GENERATE_IMPLEMENTATION: &str = "MAP001";
pub const TAG_USAGE: &str = "MAP002";

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// offered as a suggestion only
    Hidden,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Location {
    Contract { ty: String, contract: String },
    Method { ty: String, method: String, index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub id: &'static str,
    pub severity: Severity,
    pub message: &'static str,
    pub location: Location,
}

/// A code-fix action on one type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Edit {
    /// The method at `index` gets `method.body` as its entire new body.
    ReplaceBody { ty: String, index: usize, method: MethodDecl, plan: MethodPlan },
    /// A required method was missing; add it whole.
    AddMethod { ty: String, method: MethodDecl, plan: MethodPlan },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeFixes {
    pub ty: String,
    pub edits: Vec<Edit>,
}

// ————————————————————————————————————————————————————————————————————————————
// DIAGNOSTICS
// ————————————————————————————————————————————————————————————————————————————

/// Trigger diagnostics for one type: on mapping contract references, on
/// methods implementing them, and on tagged methods (misused tags get an
/// error instead).
pub fn diagnose(cfg: &Config, desc: &TypeDescription) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for reference in &desc.implements {
        if let Ok(Some(_)) = MappingContract::from_ref(cfg, &desc.name, reference) {
            out.push(generate_here(Location::Contract {
                ty: desc.name.clone(),
                contract: reference.contract.clone(),
            }));
        }
    }
    for (index, method) in desc.methods.iter().enumerate() {
        let location = || Location::Method { ty: desc.name.clone(), method: method.name.clone(), index };
        if contract_for_method(cfg, desc, method).is_some() {
            out.push(generate_here(location()));
        } else if method.is_tagged(&cfg.method_tag) {
            if MappingContract::tagged(method).is_ok() {
                out.push(generate_here(location()));
            } else {
                out.push(Diagnostic {
                    id: TAG_USAGE,
                    severity: Severity::Error,
                    message: "Mapping method must return void and accept exactly two parameters.",
                    location: location(),
                });
            }
        }
    }
    out
}

fn generate_here(location: Location) -> Diagnostic {
    Diagnostic {
        id: GENERATE_IMPLEMENTATION,
        severity: Severity::Hidden,
        message: "Implementation of mapping method(s) can be generated.",
        location,
    }
}

// ————————————————————————————————————————————————————————————————————————————
// SYNTHESIS REQUESTS
// ————————————————————————————————————————————————————————————————————————————

/// Reflect both roles of `plan`, match them and synthesize in the plan's
/// direction.
pub fn operations(ws: &Workspace, plan: &MethodPlan) -> Result<Vec<CopyOperation>> {
    let first = resolve_shape(ws, &plan.roles.0)?;
    let second = resolve_shape(ws, &plan.roles.1)?;
    let pairs = match_members(&reflect(first), &reflect(second));
    Ok(synthesize(pairs, plan.direction))
}

/// Shape of the side `plan` writes.
pub fn written_shape(ws: &Workspace, plan: &MethodPlan) -> Result<Shape> {
    Ok(reflect(resolve_shape(ws, plan.write_role())?))
}

/// The method with its body replaced by freshly synthesized statements.
/// Whatever the body held before is dropped.
pub fn regenerate(ws: &Workspace, cfg: &Config, method: &MethodDecl, plan: &MethodPlan) -> Result<MethodDecl> {
    let ops = operations(ws, plan)?;
    let cg = Codegen::new(cfg);
    let source = cg.binding_expr(&plan.source)?;
    let target = cg.binding_expr(&plan.target)?;
    let body = cg.statements(&ops, &source, &target)?;
    Ok(MethodDecl { body, ..method.clone() })
}

/// Edits implementing every method `contract` requires on `desc`.
pub fn generate_for_contract(
    ws: &Workspace,
    cfg: &Config,
    desc: &TypeDescription,
    contract: &MappingContract,
) -> Result<Vec<Edit>> {
    let mut edits = Vec::new();
    for required in contract.required_methods(cfg) {
        match desc.methods.iter().position(|m| implements(m, &required)) {
            Some(index) => {
                let existing = &desc.methods[index];
                let plan = contract.plan(existing)?;
                let method = regenerate(ws, cfg, existing, &plan)?;
                edits.push(Edit::ReplaceBody { ty: desc.name.clone(), index, method, plan });
            }
            None => {
                let plan = contract.plan(&required)?;
                let method = regenerate(ws, cfg, &required, &plan)?;
                edits.push(Edit::AddMethod { ty: desc.name.clone(), method, plan });
            }
        }
    }
    Ok(edits)
}

/// Edit for the method at `index`: an implementation of a declared contract
/// or a tagged mapping method.
pub fn generate_for_method(ws: &Workspace, cfg: &Config, desc: &TypeDescription, index: usize) -> Result<Edit> {
    let existing = desc
        .methods
        .get(index)
        .ok_or_else(|| Error::UnsupportedSignature(format!("{}#{index}", desc.name)))?;
    let contract = match contract_for_method(cfg, desc, existing) {
        Some(contract) => contract,
        None if existing.is_tagged(&cfg.method_tag) => MappingContract::tagged(existing)?,
        None => return Err(Error::UnsupportedSignature(existing.name.clone())),
    };
    let plan = contract.plan(existing)?;
    let method = regenerate(ws, cfg, existing, &plan)?;
    Ok(Edit::ReplaceBody { ty: desc.name.clone(), index, method, plan })
}

/// All edits for one type: one request per declared contract and per tagged
/// method. A failing request contributes nothing; the others still apply.
pub fn fixes_for(ws: &Workspace, cfg: &Config, desc: &TypeDescription) -> Vec<Edit> {
    let mut edits = Vec::new();
    for contract in declared_contracts(cfg, desc) {
        match generate_for_contract(ws, cfg, desc, &contract) {
            Ok(more) => edits.extend(more),
            Err(err) => tracing::warn!(ty = %desc.name, %err, "mapping request aborted"),
        }
    }
    for (index, method) in desc.methods.iter().enumerate() {
        if !method.is_tagged(&cfg.method_tag) || contract_for_method(cfg, desc, method).is_some() {
            continue;
        }
        match generate_for_method(ws, cfg, desc, index) {
            Ok(edit) => edits.push(edit),
            Err(err) => tracing::warn!(ty = %desc.name, method = %method.name, %err, "mapping request aborted"),
        }
    }
    edits
}

/// Batch mode: every type with something to fix, computed independently and
/// in parallel, reported in workspace order.
///
/// `cancel` is checked before each type; types not started when it is set are
/// left out entirely.
pub fn fix_all(ws: &Workspace, cfg: &Config, cancel: &AtomicBool) -> Vec<TypeFixes> {
    let types = ws.iter().collect::<Vec<_>>();
    let out = types
        .par_iter()
        .filter_map(|desc| {
            if cancel.load(Ordering::Relaxed) {
                return None;
            }
            let edits = fixes_for(ws, cfg, desc);
            if edits.is_empty() {
                return None;
            }
            Some(TypeFixes { ty: desc.name.clone(), edits })
        })
        .collect::<Vec<_>>();
    tracing::info!(types = types.len(), fixed = out.len(), "fix-all finished");
    out
}

fn resolve_shape<'a>(ws: &'a Workspace, ty: &Ty) -> Result<&'a TypeDescription> {
    ws.resolve(ty).ok_or_else(|| Error::UnresolvedRole(ty.to_string()))
}
