//! Mapping synthesis: matched pairs → ordered copy operations.
//!
//! Each pair is classified by walking [`rules`] top to bottom; the first rule
//! whose predicate holds decides the strategy. Keeping the rules in one table
//! makes the tie-break order explicit and lets each predicate be tested on
//! its own.
use serde::Serialize;
use crate::ir::{CopyOperation, CopySlot, MatchedPair, Member, Shape, TypeRef};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Skip,
    DirectAssign,
    CoalesceAssign,
    CollectionReplace,
}

/// Whether matched pairs are read as declared or with source and target
/// exchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingDirection {
    #[default]
    AsDeclared,
    Swapped,
}

pub struct Rule<T> {
    pub name: &'static str,
    pub strategy: Strategy,
    pub applies: fn(&MatchedPair<T>) -> bool,
}

// ————————————————————————————————————————————————————————————————————————————
// RULES
// ————————————————————————————————————————————————————————————————————————————

/// Classification rules in priority order. The last entry always matches.
pub fn rules<T: TypeRef>() -> [Rule<T>; 5] {
    [
        Rule { name: "absence-guard", strategy: Strategy::Skip, applies: is_absent_or_unreadable::<T> },
        Rule { name: "direct-assign", strategy: Strategy::DirectAssign, applies: is_direct_assignable::<T> },
        Rule { name: "coalesce-assign", strategy: Strategy::CoalesceAssign, applies: is_coalescable::<T> },
        Rule { name: "collection-replace", strategy: Strategy::CollectionReplace, applies: is_collection_replaceable::<T> },
        Rule { name: "no-match", strategy: Strategy::Skip, applies: |_| true },
    ]
}

fn both<T>(pair: &MatchedPair<T>) -> Option<(&Member<T>, &Member<T>)> {
    Some((pair.source.as_ref()?, pair.target.as_ref()?))
}

fn is_absent_or_unreadable<T>(pair: &MatchedPair<T>) -> bool {
    match both(pair) {
        None => true,
        Some((source, _)) => !source.has_public_getter,
    }
}

/// Same type, or target is optional-of the source type (auto-wrap).
///
/// The source setter check is a proxy for "genuine data member" and applies
/// even though the source is only read.
fn is_direct_assignable<T: TypeRef>(pair: &MatchedPair<T>) -> bool {
    let Some((source, target)) = both(pair) else { return false };
    let same = target.declared_type.is_equal_to(&source.declared_type);
    let wraps = target
        .declared_type
        .unwrap_optional()
        .is_some_and(|inner| inner.is_equal_to(&source.declared_type));
    target.has_public_setter && source.has_public_setter && (same || wraps)
}

/// Source is optional-of the target type.
fn is_coalescable<T: TypeRef>(pair: &MatchedPair<T>) -> bool {
    let Some((source, target)) = both(pair) else { return false };
    let unwraps = source
        .declared_type
        .unwrap_optional()
        .is_some_and(|inner| inner.is_equal_to(&target.declared_type));
    target.has_public_setter && source.has_public_setter && unwraps
}

/// Target is a mutable collection of `E` reachable through its getter, source
/// iterates the same `E`. The target is mutated in place, so no setter.
fn is_collection_replaceable<T: TypeRef>(pair: &MatchedPair<T>) -> bool {
    let Some((source, target)) = both(pair) else { return false };
    match (
        target.declared_type.element_type_if_mutable_collection(),
        source.declared_type.element_type_if_sequence(),
    ) {
        (Some(into), Some(from)) => target.has_public_getter && into.is_equal_to(from),
        _ => false,
    }
}

// ————————————————————————————————————————————————————————————————————————————
// SYNTHESIS
// ————————————————————————————————————————————————————————————————————————————

/// First matching rule's strategy.
pub fn classify<T: TypeRef>(pair: &MatchedPair<T>) -> Strategy {
    rules::<T>()
        .into_iter()
        .find(|rule| (rule.applies)(pair))
        .map(|rule| rule.strategy)
        .unwrap_or(Strategy::Skip)
}

/// Produce the copy operations for `pairs`, in the order received.
///
/// With [`MappingDirection::Swapped`] every pair is role-swapped first, so
/// "source" is always the side read from.
pub fn synthesize<T: TypeRef>(
    pairs: Vec<MatchedPair<T>>,
    direction: MappingDirection,
) -> Vec<CopyOperation<T>> {
    pairs
        .into_iter()
        .map(|pair| match direction {
            MappingDirection::AsDeclared => pair,
            MappingDirection::Swapped => pair.swapped(),
        })
        .filter_map(|pair| {
            let strategy = classify(&pair);
            if strategy == Strategy::Skip {
                tracing::trace!(member = %pair.name, "no copy strategy");
            }
            build(strategy, pair)
        })
        .collect()
}

/// Reflect-free shortcut: match two shapes and synthesize as declared.
pub fn synthesize_shapes<T: TypeRef>(source: &Shape<T>, target: &Shape<T>) -> Vec<CopyOperation<T>> {
    synthesize(crate::matcher::match_members(source, target), MappingDirection::AsDeclared)
}

/// Direction of a two-role mapping method.
///
/// `roles` is the declared role order `(A, B)`, `params` the method's
/// parameter types in lexical order. `(B, A)` means swapped; anything that
/// does not tell the two apart falls back to the declared order.
pub fn resolve_direction<T: TypeRef>(roles: (&T, &T), params: (&T, &T)) -> MappingDirection {
    let declared = params.0.is_equal_to(roles.0) && params.1.is_equal_to(roles.1);
    let reversed = params.0.is_equal_to(roles.1) && params.1.is_equal_to(roles.0);
    if reversed && !declared {
        MappingDirection::Swapped
    } else {
        MappingDirection::AsDeclared
    }
}

fn build<T: TypeRef>(strategy: Strategy, pair: MatchedPair<T>) -> Option<CopyOperation<T>> {
    let MatchedPair { name, source: Some(source), target: Some(target) } = pair else {
        return None;
    };
    let slot = CopySlot { name, source, target };
    match strategy {
        Strategy::Skip => None,
        Strategy::DirectAssign => Some(CopyOperation::DirectAssign(slot)),
        Strategy::CoalesceAssign => {
            let default_of = slot.target.declared_type.clone();
            Some(CopyOperation::CoalesceAssign { slot, default_of })
        }
        Strategy::CollectionReplace => Some(CopyOperation::CollectionReplace(slot)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Ty;
    use crate::matcher::match_members;
    use crate::reflect::reflect;
    use serde_json::json;

    fn shape(name: &str, members: serde_json::Value) -> Shape {
        reflect(&serde_json::from_value(json!({ "name": name, "members": members })).unwrap())
    }

    fn ops(source: serde_json::Value, target: serde_json::Value) -> Vec<CopyOperation> {
        synthesize_shapes(&shape("S", source), &shape("T", target))
    }

    fn pair(source: serde_json::Value, target: serde_json::Value) -> MatchedPair {
        match_members(&shape("S", json!([source])), &shape("T", json!([target]))).remove(0)
    }

    #[test]
    fn same_type_direct_assign() {
        let out = ops(
            json!([ { "name": "Age", "type": "int" } ]),
            json!([ { "name": "Age", "type": "int" } ]),
        );
        assert_eq!(out.len(), 1);
        assert!(matches!(&out[0], CopyOperation::DirectAssign(s) if s.name == "Age"));
    }

    #[test]
    fn optional_source_coalesces_to_target_zero() {
        let out = ops(
            json!([ { "name": "Age", "type": "int?" } ]),
            json!([ { "name": "Age", "type": "int" } ]),
        );
        assert_eq!(out.len(), 1);
        match &out[0] {
            CopyOperation::CoalesceAssign { default_of, .. } => {
                assert_eq!(default_of, &Ty::named("int"));
                assert_eq!(default_of.zero_value(), json!(0));
            }
            other => panic!("expected coalesce, got {other:?}"),
        }
    }

    #[test]
    fn optional_target_wraps_instead_of_coalescing() {
        let p = pair(
            json!({ "name": "Age", "type": "int" }),
            json!({ "name": "Age", "type": "int?" }),
        );
        assert_eq!(classify(&p), Strategy::DirectAssign);
    }

    #[test]
    fn getter_only_collection_is_replaced() {
        let out = ops(
            json!([ { "name": "Tags", "type": "Seq<string>" } ]),
            json!([ { "name": "Tags", "type": "List<string>", "setter": null } ]),
        );
        assert_eq!(out.len(), 1);
        assert!(matches!(&out[0], CopyOperation::CollectionReplace(s) if s.name == "Tags"));
    }

    #[test]
    fn settable_collection_of_same_type_prefers_direct_assign() {
        let p = pair(
            json!({ "name": "Tags", "type": "List<string>" }),
            json!({ "name": "Tags", "type": "List<string>" }),
        );
        assert_eq!(classify(&p), Strategy::DirectAssign);
    }

    #[test]
    fn collection_without_public_getter_is_skipped() {
        let p = pair(
            json!({ "name": "Tags", "type": "Seq<string>" }),
            json!({ "name": "Tags", "type": "List<string>", "getter": null, "setter": null }),
        );
        assert_eq!(classify(&p), Strategy::Skip);

        let p = pair(
            json!({ "name": "Tags", "type": "Seq<string>" }),
            json!({ "name": "Tags", "type": "List<string>", "getter": "internal", "setter": null }),
        );
        assert_eq!(classify(&p), Strategy::Skip);
    }

    #[test]
    fn coalesce_needs_a_target_setter() {
        let p = pair(
            json!({ "name": "Age", "type": "int?" }),
            json!({ "name": "Age", "type": "int", "setter": null }),
        );
        assert_eq!(classify(&p), Strategy::Skip);

        let p = pair(
            json!({ "name": "Age", "type": "int?" }),
            json!({ "name": "Age", "type": "int", "setter": "private" }),
        );
        assert_eq!(classify(&p), Strategy::Skip);
    }

    #[test]
    fn collection_element_types_must_agree() {
        let p = pair(
            json!({ "name": "Tags", "type": "Seq<int>" }),
            json!({ "name": "Tags", "type": "List<string>", "setter": null }),
        );
        assert_eq!(classify(&p), Strategy::Skip);
    }

    #[test]
    fn absence_guard_comes_first() {
        // unreadable source
        let p = pair(
            json!({ "name": "Age", "type": "int", "getter": null }),
            json!({ "name": "Age", "type": "int" }),
        );
        assert_eq!(classify(&p), Strategy::Skip);

        // one-sided names never copy, whatever their types
        let out = ops(
            json!([ { "name": "Left", "type": "int" } ]),
            json!([ { "name": "Right", "type": "int" } ]),
        );
        assert!(out.is_empty());
    }

    #[test]
    fn source_setter_flag_gates_assignment() {
        let p = pair(
            json!({ "name": "Age", "type": "int", "setter": "private" }),
            json!({ "name": "Age", "type": "int" }),
        );
        assert_eq!(classify(&p), Strategy::Skip);

        let p = pair(
            json!({ "name": "Age", "type": "int?", "setter": null }),
            json!({ "name": "Age", "type": "int" }),
        );
        assert_eq!(classify(&p), Strategy::Skip);
    }

    #[test]
    fn target_without_setter_is_not_assigned() {
        let p = pair(
            json!({ "name": "Age", "type": "int" }),
            json!({ "name": "Age", "type": "int", "setter": null }),
        );
        assert_eq!(classify(&p), Strategy::Skip);
    }

    #[test]
    fn mismatched_types_emit_nothing() {
        let out = ops(
            json!([ { "name": "Age", "type": "string" } ]),
            json!([ { "name": "Age", "type": "int" } ]),
        );
        assert!(out.is_empty());
    }

    #[test]
    fn rule_table_order_is_fixed() {
        let names = rules::<Ty>().iter().map(|r| r.name).collect::<Vec<_>>();
        assert_eq!(
            names,
            ["absence-guard", "direct-assign", "coalesce-assign", "collection-replace", "no-match"]
        );
    }

    #[test]
    fn output_follows_name_order_and_is_deterministic() {
        let source = json!([
            { "name": "Zip", "type": "string" },
            { "name": "Age", "type": "int?" },
            { "name": "Name", "type": "string" },
        ]);
        let target = json!([
            { "name": "Name", "type": "string" },
            { "name": "Zip", "type": "string" },
            { "name": "Age", "type": "int" },
        ]);
        let first = ops(source.clone(), target.clone());
        let names = first.iter().map(|o| o.name()).collect::<Vec<_>>();
        assert_eq!(names, ["Age", "Name", "Zip"]);
        assert_eq!(first, ops(source, target));
    }

    #[test]
    fn swapped_direction_reads_from_the_other_side() {
        let a = shape("A", json!([ { "name": "Age", "type": "int?" } ]));
        let b = shape("B", json!([ { "name": "Age", "type": "int" } ]));
        let pairs = match_members(&a, &b);

        let forward = synthesize(pairs.clone(), MappingDirection::AsDeclared);
        assert!(matches!(forward[0], CopyOperation::CoalesceAssign { .. }));

        // B → A: int into int? is a wrapping direct assign
        let backward = synthesize(pairs, MappingDirection::Swapped);
        match &backward[0] {
            CopyOperation::DirectAssign(slot) => {
                assert_eq!(slot.source.declared_type, Ty::named("int"));
                assert_eq!(slot.target.declared_type, Ty::optional(Ty::named("int")));
            }
            other => panic!("expected direct assign, got {other:?}"),
        }
    }

    #[test]
    fn direction_follows_parameter_roles() {
        let a = Ty::named("A");
        let b = Ty::named("B");
        assert_eq!(resolve_direction((&a, &b), (&a, &b)), MappingDirection::AsDeclared);
        assert_eq!(resolve_direction((&a, &b), (&b, &a)), MappingDirection::Swapped);
        // ambiguous: same type on both roles, or unrelated parameters
        assert_eq!(resolve_direction((&a, &a), (&a, &a)), MappingDirection::AsDeclared);
        let c = Ty::named("C");
        assert_eq!(resolve_direction((&a, &b), (&c, &a)), MappingDirection::AsDeclared);
    }
}
