//! Host-side descriptors: the JSON stand-in for the type information a host
//! environment would hand over.
//!
//! A workspace is `{ "types": [...] }`. Each type lists its member
//! declarations and, optionally, the mapping contracts it declares and the
//! methods it already has.
use std::path::Path;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ir::Ty;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    #[default]
    Public,
    Internal,
    Protected,
    Private,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    #[default]
    Property,
    Field,
    Method,
    Event,
}

/// One member declaration as the host sees it, before any filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberDecl<T = Ty> {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: T,
    #[serde(default)]
    pub kind: MemberKind,
    #[serde(default)]
    pub access: Access,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default, rename = "indexer")]
    pub is_indexer: bool,
    /// absent key → public accessor, `null` → no accessor
    #[serde(default = "public_accessor")]
    pub getter: Option<Access>,
    #[serde(default = "public_accessor")]
    pub setter: Option<Access>,
}

/// A reference to a mapping contract, e.g. `ObjectMapper<PersonDto>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractRef {
    pub contract: String,
    #[serde(default)]
    pub args: Vec<Ty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Ty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    #[serde(default)]
    pub params: Vec<Param>,
    /// `None` is a void return.
    #[serde(default)]
    pub returns: Option<Ty>,
    #[serde(default = "yes")]
    pub public: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Existing statements, kept only so regeneration can discard them.
    #[serde(default)]
    pub body: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct TypeDescription<T = Ty> {
    pub name: String,
    #[serde(default)]
    pub members: Vec<MemberDecl<T>>,
    #[serde(default)]
    pub implements: Vec<ContractRef>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawWorkspace {
    #[serde(default)]
    types: Vec<TypeDescription>,
}

/// Type descriptions keyed by name, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    types: IndexMap<String, TypeDescription>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl MethodDecl {
    pub fn returns_void(&self) -> bool {
        self.returns.is_none()
    }

    pub fn is_tagged(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

impl Workspace {
    pub fn from_json(src: &str) -> Result<Self> {
        let raw: RawWorkspace = crate::path_de::from_str_with_path(src)?;
        let mut ws = Self::default();
        ws.extend(raw.types);
        Ok(ws)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let raw: RawWorkspace = crate::path_de::from_slice_with_path(&bytes)?;
        let mut ws = Self::default();
        ws.extend(raw.types);
        Ok(ws)
    }

    /// Add descriptions; a name already present keeps its first description.
    pub fn extend(&mut self, types: impl IntoIterator<Item = TypeDescription>) {
        for desc in types {
            if self.types.contains_key(&desc.name) {
                tracing::warn!(name = %desc.name, "duplicate type description ignored");
                continue;
            }
            self.types.insert(desc.name.clone(), desc);
        }
    }

    pub fn merge(&mut self, other: Workspace) {
        self.extend(other.types.into_values());
    }

    pub fn get(&self, name: &str) -> Option<&TypeDescription> {
        self.types.get(name)
    }

    /// Look up the description behind a type reference. Only plain named
    /// types denote a record shape.
    pub fn resolve(&self, ty: &Ty) -> Option<&TypeDescription> {
        match ty {
            Ty::Named { name, args } if args.is_empty() => self.get(name),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDescription> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn public_accessor() -> Option<Access> {
    Some(Access::Public)
}

fn yes() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accessor_defaults_and_explicit_nulls() {
        let decl: MemberDecl = serde_json::from_value(json!({
            "name": "Tags", "type": "List<string>", "setter": null
        })).unwrap();
        assert_eq!(decl.kind, MemberKind::Property);
        assert_eq!(decl.access, Access::Public);
        assert_eq!(decl.getter, Some(Access::Public));
        assert_eq!(decl.setter, None);
        assert!(!decl.is_static && !decl.is_indexer);
    }

    #[test]
    fn first_type_description_wins() {
        let src = json!({
            "types": [
                { "name": "A", "members": [ { "name": "X", "type": "int" } ] },
                { "name": "A", "members": [] },
                { "name": "B" }
            ]
        }).to_string();
        let ws = Workspace::from_json(&src).unwrap();
        assert_eq!(ws.len(), 2);
        assert_eq!(ws.get("A").unwrap().members.len(), 1);
        assert_eq!(ws.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(), ["A", "B"]);
    }

    #[test]
    fn bare_type_description_has_empty_lists() {
        let ws = Workspace::from_json(&json!({ "types": [ { "name": "Empty" } ] }).to_string()).unwrap();
        let desc = ws.get("Empty").unwrap();
        assert!(desc.members.is_empty());
        assert!(desc.implements.is_empty() && desc.methods.is_empty());
    }

    #[test]
    fn resolve_only_accepts_plain_named_types() {
        let ws = Workspace::from_json(&json!({ "types": [ { "name": "A" } ] }).to_string()).unwrap();
        assert!(ws.resolve(&Ty::named("A")).is_some());
        assert!(ws.resolve(&"A?".parse().unwrap()).is_none());
        assert!(ws.resolve(&Ty::named("Missing")).is_none());
    }

    #[test]
    fn bad_type_notation_reports_its_path() {
        let src = json!({
            "types": [ { "name": "A", "members": [ { "name": "X", "type": "List<" } ] } ]
        }).to_string();
        let err = Workspace::from_json(&src).unwrap_err().to_string();
        assert!(err.contains("types[0].members[0].type"), "{err}");
    }
}
