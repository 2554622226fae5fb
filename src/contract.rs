//! Mapping contracts: which shapes a mapping method reads and writes, and in
//! which direction.
//!
//! Three kinds of declarations oblige a type to provide a mapping method:
//! - a one-role contract `ObjectMapper<T>`: `map_object(target: T)` copies
//!   the implementing type itself into `target`;
//! - a two-role contract `ObjectMapperAdapter<A, B>`: two methods,
//!   `map_object(source: A, target: B)` and `map_object(source: B, target: A)`;
//! - a method tagged as a mapping method, with signature `(source, target)`
//!   and a void return.
use serde::Serialize;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::ir::Ty;
use crate::synth::{resolve_direction, MappingDirection};
use crate::workspace::{ContractRef, MethodDecl, Param, TypeDescription};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MappingContract {
    OneWay { this: Ty, target: Ty },
    TwoWay { first: Ty, second: Ty },
    Tagged { source: Ty, target: Ty },
}

/// Where one side of a mapping lives in the generated method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Binding {
    /// the implementing object itself
    Receiver,
    Param(String),
}

/// Everything synthesis needs for one concrete method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodPlan {
    /// declared role order; pairs are matched `roles.0 → roles.1`
    pub roles: (Ty, Ty),
    pub direction: MappingDirection,
    /// read side after any role swap
    pub source: Binding,
    /// write side after any role swap
    pub target: Binding,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl MappingContract {
    /// Resolve a contract reference declared by `implementor`.
    ///
    /// `Ok(None)` when the reference is not a mapping contract at all; an
    /// arity error when it is one but with the wrong number of type roles.
    pub fn from_ref(cfg: &Config, implementor: &str, reference: &ContractRef) -> Result<Option<Self>> {
        let name = simple_name(&reference.contract);
        let expected = if name == cfg.one_way_contract {
            1
        } else if name == cfg.two_way_contract {
            2
        } else {
            return Ok(None);
        };
        let contract = match reference.args.as_slice() {
            [target] if expected == 1 => {
                MappingContract::OneWay { this: Ty::named(implementor), target: target.clone() }
            }
            [first, second] if expected == 2 => {
                MappingContract::TwoWay { first: first.clone(), second: second.clone() }
            }
            args => {
                return Err(Error::ContractArity {
                    contract: reference.contract.clone(),
                    expected,
                    found: args.len(),
                });
            }
        };
        Ok(Some(contract))
    }

    /// Contract of a tagged method; the signature must be `(source, target)`
    /// with a void return.
    pub fn tagged(method: &MethodDecl) -> Result<Self> {
        match method.params.as_slice() {
            [source, target] if method.returns_void() => Ok(MappingContract::Tagged {
                source: source.ty.clone(),
                target: target.ty.clone(),
            }),
            _ => Err(Error::UnsupportedSignature(method.name.clone())),
        }
    }

    /// Stubs for the methods this contract requires, bodies empty.
    pub fn required_methods(&self, cfg: &Config) -> Vec<MethodDecl> {
        let stub = |params: Vec<Param>| MethodDecl {
            name: cfg.method_name.clone(),
            params,
            returns: None,
            public: true,
            tags: Vec::new(),
            body: Vec::new(),
        };
        match self {
            MappingContract::OneWay { target, .. } => vec![stub(vec![param("target", target)])],
            MappingContract::TwoWay { first, second } => vec![
                stub(vec![param("source", first), param("target", second)]),
                stub(vec![param("source", second), param("target", first)]),
            ],
            // a tagged method is its own requirement
            MappingContract::Tagged { .. } => Vec::new(),
        }
    }

    /// Bind a concrete method against this contract.
    pub fn plan(&self, method: &MethodDecl) -> Result<MethodPlan> {
        let unsupported = || Error::UnsupportedSignature(method.name.clone());
        match (self, method.params.as_slice()) {
            (MappingContract::OneWay { this, target }, [p0]) => Ok(MethodPlan {
                roles: (this.clone(), target.clone()),
                direction: MappingDirection::AsDeclared,
                source: Binding::Receiver,
                target: Binding::Param(p0.name.clone()),
            }),
            (MappingContract::TwoWay { first, second }, [p0, p1]) => {
                let direction = resolve_direction((first, second), (&p0.ty, &p1.ty));
                tracing::debug!(method = %method.name, ?direction, "two-way direction");
                Ok(MethodPlan {
                    roles: (first.clone(), second.clone()),
                    direction,
                    source: Binding::Param(p0.name.clone()),
                    target: Binding::Param(p1.name.clone()),
                })
            }
            (MappingContract::Tagged { source, target }, [p0, p1]) => Ok(MethodPlan {
                roles: (source.clone(), target.clone()),
                direction: MappingDirection::AsDeclared,
                source: Binding::Param(p0.name.clone()),
                target: Binding::Param(p1.name.clone()),
            }),
            _ => Err(unsupported()),
        }
    }
}

impl MethodPlan {
    /// Role type of the side that is read.
    pub fn read_role(&self) -> &Ty {
        match self.direction {
            MappingDirection::AsDeclared => &self.roles.0,
            MappingDirection::Swapped => &self.roles.1,
        }
    }

    /// Role type of the side that is written.
    pub fn write_role(&self) -> &Ty {
        match self.direction {
            MappingDirection::AsDeclared => &self.roles.1,
            MappingDirection::Swapped => &self.roles.0,
        }
    }

    /// Plan of the method `contract` requires for writing `into`; the first
    /// required method when `into` is `None`. `Ok(None)` when the contract
    /// requires no method writing that type.
    pub fn writing(cfg: &Config, contract: &MappingContract, into: Option<&Ty>) -> Result<Option<Self>> {
        let required = contract.required_methods(cfg);
        let found = required.iter().find(|method| match (into, method.params.last()) {
            (None, _) => true,
            (Some(into), Some(last)) => &last.ty == into,
            (Some(_), None) => false,
        });
        match found {
            Some(method) => contract.plan(method).map(Some),
            None => Ok(None),
        }
    }
}

/// Whether `method` implements `required`: same name, same parameter types
/// in order. Parameter names do not matter.
pub fn implements(method: &MethodDecl, required: &MethodDecl) -> bool {
    method.name == required.name
        && method.params.len() == required.params.len()
        && method.params.iter().zip(&required.params).all(|(a, b)| a.ty == b.ty)
}

/// Contracts declared by `desc`, skipping references that are not mapping
/// contracts and those with the wrong arity.
pub fn declared_contracts(cfg: &Config, desc: &TypeDescription) -> Vec<MappingContract> {
    desc.implements
        .iter()
        .filter_map(|reference| match MappingContract::from_ref(cfg, &desc.name, reference) {
            Ok(contract) => contract,
            Err(err) => {
                tracing::debug!(ty = %desc.name, %err, "contract reference skipped");
                None
            }
        })
        .collect()
}

/// The declared contract `method` is an implementation of, if any.
///
/// Only public, void methods with the configured name qualify: one parameter
/// typed as a one-role contract's target, or two parameters matching a
/// two-role contract in either order.
pub fn contract_for_method(cfg: &Config, desc: &TypeDescription, method: &MethodDecl) -> Option<MappingContract> {
    if method.name != cfg.method_name || !method.public || !method.returns_void() {
        return None;
    }
    declared_contracts(cfg, desc).into_iter().find(|contract| match (contract, method.params.as_slice()) {
        (MappingContract::OneWay { target, .. }, [p0]) => &p0.ty == target,
        (MappingContract::TwoWay { first, second }, [p0, p1]) => {
            (&p0.ty == first && &p1.ty == second) || (&p0.ty == second && &p1.ty == first)
        }
        _ => false,
    })
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn param(name: &str, ty: &Ty) -> Param {
    Param { name: name.to_string(), ty: ty.clone() }
}

fn simple_name(path: &str) -> &str {
    path.rsplit(|c: char| c == ':' || c == '.').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cfg() -> Config {
        Config::default()
    }

    fn reference(contract: &str, args: &[&str]) -> ContractRef {
        ContractRef {
            contract: contract.to_string(),
            args: args.iter().map(|a| a.parse().unwrap()).collect(),
        }
    }

    fn method(value: serde_json::Value) -> MethodDecl {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn contract_references_resolve_by_arity() {
        let one = MappingContract::from_ref(&cfg(), "A", &reference("ObjectMapper", &["B"])).unwrap();
        assert_eq!(one, Some(MappingContract::OneWay { this: Ty::named("A"), target: Ty::named("B") }));

        let two = MappingContract::from_ref(&cfg(), "X", &reference("Framework.ObjectMapperAdapter", &["A", "B"])).unwrap();
        assert_eq!(two, Some(MappingContract::TwoWay { first: Ty::named("A"), second: Ty::named("B") }));

        let other = MappingContract::from_ref(&cfg(), "A", &reference("Display", &[])).unwrap();
        assert_eq!(other, None);

        let err = MappingContract::from_ref(&cfg(), "A", &reference("ObjectMapper", &["B", "C"])).unwrap_err();
        assert!(matches!(err, Error::ContractArity { expected: 1, found: 2, .. }));
    }

    #[test]
    fn two_way_requires_both_directions() {
        let contract = MappingContract::TwoWay { first: Ty::named("A"), second: Ty::named("B") };
        let required = contract.required_methods(&cfg());
        assert_eq!(required.len(), 2);
        let sigs = required
            .iter()
            .map(|m| m.params.iter().map(|p| p.ty.to_string()).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        assert_eq!(sigs, [["A", "B"], ["B", "A"]]);
        assert!(required.iter().all(|m| m.name == "map_object" && m.returns_void()));
    }

    #[test]
    fn reversed_parameters_swap_roles() {
        let contract = MappingContract::TwoWay { first: Ty::named("A"), second: Ty::named("B") };
        let m = method(json!({
            "name": "map_object",
            "params": [ { "name": "b", "type": "B" }, { "name": "a", "type": "A" } ]
        }));
        let plan = contract.plan(&m).unwrap();
        assert_eq!(plan.direction, MappingDirection::Swapped);
        assert_eq!(plan.source, Binding::Param("b".into()));
        assert_eq!(plan.target, Binding::Param("a".into()));
        assert_eq!(plan.roles, (Ty::named("A"), Ty::named("B")));
    }

    #[test]
    fn one_way_reads_from_the_receiver() {
        let contract = MappingContract::OneWay { this: Ty::named("A"), target: Ty::named("B") };
        let m = method(json!({ "name": "map_object", "params": [ { "name": "dst", "type": "B" } ] }));
        let plan = contract.plan(&m).unwrap();
        assert_eq!(plan.source, Binding::Receiver);
        assert_eq!(plan.target, Binding::Param("dst".into()));

        let wrong = method(json!({ "name": "map_object", "params": [] }));
        assert!(matches!(contract.plan(&wrong), Err(Error::UnsupportedSignature(_))));
    }

    #[test]
    fn tagged_methods_need_two_params_and_void() {
        let ok = method(json!({
            "name": "copy", "tags": ["ObjectMapperMethod"],
            "params": [ { "name": "s", "type": "A" }, { "name": "t", "type": "B" } ]
        }));
        assert_eq!(
            MappingContract::tagged(&ok).unwrap(),
            MappingContract::Tagged { source: Ty::named("A"), target: Ty::named("B") }
        );

        let returns = method(json!({
            "name": "copy", "returns": "int",
            "params": [ { "name": "s", "type": "A" }, { "name": "t", "type": "B" } ]
        }));
        assert!(MappingContract::tagged(&returns).is_err());
    }

    #[test]
    fn method_level_contract_lookup() {
        let desc: TypeDescription = serde_json::from_value(json!({
            "name": "Adapter",
            "implements": [ { "contract": "ObjectMapperAdapter", "args": ["A", "B"] } ]
        })).unwrap();
        let reversed = method(json!({
            "name": "map_object",
            "params": [ { "name": "b", "type": "B" }, { "name": "a", "type": "A" } ]
        }));
        assert!(contract_for_method(&cfg(), &desc, &reversed).is_some());

        let private = method(json!({
            "name": "map_object", "public": false,
            "params": [ { "name": "a", "type": "A" }, { "name": "b", "type": "B" } ]
        }));
        assert!(contract_for_method(&cfg(), &desc, &private).is_none());

        let unrelated = method(json!({
            "name": "map_object",
            "params": [ { "name": "a", "type": "A" }, { "name": "c", "type": "C" } ]
        }));
        assert!(contract_for_method(&cfg(), &desc, &unrelated).is_none());
    }

    #[test]
    fn plans_pick_the_written_role() {
        let contract = MappingContract::TwoWay { first: Ty::named("A"), second: Ty::named("B") };
        let into_b = MethodPlan::writing(&cfg(), &contract, Some(&Ty::named("B"))).unwrap().unwrap();
        assert_eq!(into_b.direction, MappingDirection::AsDeclared);
        assert_eq!((into_b.read_role(), into_b.write_role()), (&Ty::named("A"), &Ty::named("B")));

        let into_a = MethodPlan::writing(&cfg(), &contract, Some(&Ty::named("A"))).unwrap().unwrap();
        assert_eq!(into_a.direction, MappingDirection::Swapped);
        assert_eq!((into_a.read_role(), into_a.write_role()), (&Ty::named("B"), &Ty::named("A")));

        let first = MethodPlan::writing(&cfg(), &contract, None).unwrap().unwrap();
        assert_eq!(first, into_b);
        assert!(MethodPlan::writing(&cfg(), &contract, Some(&Ty::named("C"))).unwrap().is_none());

        let one_way = MappingContract::OneWay { this: Ty::named("A"), target: Ty::named("B") };
        let plan = MethodPlan::writing(&cfg(), &one_way, None).unwrap().unwrap();
        assert_eq!(plan.write_role(), &Ty::named("B"));
        assert_eq!(plan.source, Binding::Receiver);
    }

    #[test]
    fn implementations_match_on_parameter_types() {
        let contract = MappingContract::OneWay { this: Ty::named("A"), target: Ty::named("B") };
        let required = contract.required_methods(&cfg()).remove(0);
        let renamed = method(json!({ "name": "map_object", "params": [ { "name": "other", "type": "B" } ] }));
        assert!(implements(&renamed, &required));
        let different = method(json!({ "name": "map_object", "params": [ { "name": "other", "type": "C" } ] }));
        assert!(!implements(&different, &required));
    }
}
