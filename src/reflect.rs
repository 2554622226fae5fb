//! Shape reflection: member declarations → normalized [`Shape`].
use crate::ir::{Member, Shape, TypeRef};
use crate::workspace::{Access, MemberDecl, MemberKind, TypeDescription};

/// Extract the public instance properties of a type description.
///
/// Accessor visibility is recorded rather than filtered; the synthesizer
/// decides what a missing getter or setter means. When a name is declared
/// twice the first declaration wins. Never fails: a type without public
/// instance properties reflects to an empty shape.
pub fn reflect<T: TypeRef>(desc: &TypeDescription<T>) -> Shape<T> {
    let mut shape = Shape::empty(desc.name.clone());
    for decl in &desc.members {
        if !is_reflected(decl) {
            continue;
        }
        if shape.members.contains_key(&decl.name) {
            tracing::debug!(ty = %desc.name, member = %decl.name, "duplicate member ignored");
            continue;
        }
        shape.members.insert(decl.name.clone(), to_member(decl));
    }
    shape
}

fn is_reflected<T>(decl: &MemberDecl<T>) -> bool {
    decl.kind == MemberKind::Property
        && !decl.is_static
        && !decl.is_indexer
        && decl.access == Access::Public
}

fn to_member<T: TypeRef>(decl: &MemberDecl<T>) -> Member<T> {
    Member {
        name: decl.name.clone(),
        is_optional: decl.ty.unwrap_optional().is_some(),
        declared_type: decl.ty.clone(),
        has_public_getter: decl.getter == Some(Access::Public),
        has_public_setter: decl.setter == Some(Access::Public),
        is_static: decl.is_static,
        is_indexed: decl.is_indexer,
    }
}
