// Strongly-typed IR shared by reflection, matching and synthesis. No serde_json::Value here
// except for zero values.
pub mod notation;

use std::collections::BTreeMap;
use std::fmt;
use serde::{Deserialize, Serialize};

// ————————————————————————————————————————————————————————————————————————————
// TYPE REFERENCES
// ————————————————————————————————————————————————————————————————————————————

/// Capability queries the synthesizer asks of a declared type.
///
/// These are three independent extractors rather than a walk over some
/// framework's collection hierarchy; a host plugs in its own representation
/// by implementing this trait.
pub trait TypeRef: Clone + fmt::Debug {
    fn is_equal_to(&self, other: &Self) -> bool;
    /// `Some(X)` iff this type is optional-of-X.
    fn unwrap_optional(&self) -> Option<&Self>;
    /// `Some(E)` iff this type can be iterated read-only, yielding `E`.
    fn element_type_if_sequence(&self) -> Option<&Self>;
    /// `Some(E)` iff this type supports clear + add over `E`.
    fn element_type_if_mutable_collection(&self) -> Option<&Self>;
}

/// The crate's own type representation, written in the workspace format with
/// the compact notation from [`notation`] (`int?`, `Vec<string>`, `[T]`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Ty {
    /// opaque, possibly generic
    Named { name: String, args: Vec<Ty> },
    Optional(Box<Ty>),
    /// read-only iteration; `name` is empty for the `[T]` form
    Sequence { name: String, item: Box<Ty> },
    /// clear + add; also iterable
    Collection { name: String, item: Box<Ty> },
}

impl TypeRef for Ty {
    fn is_equal_to(&self, other: &Self) -> bool {
        self == other
    }

    fn unwrap_optional(&self) -> Option<&Self> {
        match self {
            Ty::Optional(inner) => Some(inner),
            _ => None,
        }
    }

    fn element_type_if_sequence(&self) -> Option<&Self> {
        match self {
            Ty::Sequence { item, .. } | Ty::Collection { item, .. } => Some(item),
            _ => None,
        }
    }

    fn element_type_if_mutable_collection(&self) -> Option<&Self> {
        match self {
            Ty::Collection { item, .. } => Some(item),
            _ => None,
        }
    }
}

const INTEGER_NAMES: &[&str] = &[
    "i8", "i16", "i32", "i64", "i128", "isize",
    "u8", "u16", "u32", "u64", "u128", "usize",
    "int", "long", "short", "byte", "sbyte", "uint", "ulong", "ushort",
];
const FLOAT_NAMES: &[&str] = &["f32", "f64", "float", "double", "decimal"];
const BOOL_NAMES: &[&str] = &["bool", "boolean"];
const CHAR_NAMES: &[&str] = &["char"];
const STRING_NAMES: &[&str] = &["String", "string", "str"];

impl Ty {
    pub fn named(name: impl Into<String>) -> Self {
        Ty::Named { name: name.into(), args: Vec::new() }
    }

    pub fn optional(inner: Ty) -> Self {
        Ty::Optional(Box::new(inner))
    }

    fn scalar_name(&self) -> Option<&str> {
        match self {
            Ty::Named { name, args } if args.is_empty() => Some(name.as_str()),
            _ => None,
        }
    }

    /// Plain bit-copy scalars; everything else needs an explicit clone when read
    /// through a shared reference.
    pub fn is_copy_scalar(&self) -> bool {
        self.scalar_name().is_some_and(|n| {
            INTEGER_NAMES.contains(&n)
                || FLOAT_NAMES.contains(&n)
                || BOOL_NAMES.contains(&n)
                || CHAR_NAMES.contains(&n)
        })
    }

    /// Source literal of the zero value, when the type has an obvious one.
    pub fn zero_literal(&self) -> Option<&'static str> {
        let n = self.scalar_name()?;
        if INTEGER_NAMES.contains(&n) { return Some("0") }
        if FLOAT_NAMES.contains(&n) { return Some("0.0") }
        if BOOL_NAMES.contains(&n) { return Some("false") }
        if CHAR_NAMES.contains(&n) { return Some("'\\0'") }
        None
    }

    /// Zero value as a JSON value; the same value `Default::default()` yields
    /// for the rendered Rust type. Unknown named types fall back to `null`.
    pub fn zero_value(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            Ty::Optional(_) => Value::Null,
            Ty::Sequence { .. } | Ty::Collection { .. } => Value::Array(Vec::new()),
            Ty::Named { .. } => match self.scalar_name() {
                Some(n) if INTEGER_NAMES.contains(&n) => Value::from(0),
                Some(n) if FLOAT_NAMES.contains(&n) => Value::from(0.0),
                Some(n) if BOOL_NAMES.contains(&n) => Value::Bool(false),
                Some(n) if CHAR_NAMES.contains(&n) => Value::from("\u{0}"),
                Some(n) if STRING_NAMES.contains(&n) => Value::from(""),
                _ => Value::Null,
            },
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn generic(f: &mut fmt::Formatter<'_>, name: &str, args: &[&Ty]) -> fmt::Result {
            write!(f, "{name}")?;
            if args.is_empty() { return Ok(()) }
            write!(f, "<")?;
            for (i, a) in args.iter().enumerate() {
                if i > 0 { write!(f, ", ")?; }
                write!(f, "{a}")?;
            }
            write!(f, ">")
        }
        match self {
            Ty::Named { name, args } => generic(f, name, &args.iter().collect::<Vec<_>>()),
            Ty::Optional(inner) => write!(f, "Option<{inner}>"),
            Ty::Sequence { name, item } if name.is_empty() => write!(f, "[{item}]"),
            Ty::Sequence { name, item } | Ty::Collection { name, item } => generic(f, name, &[item.as_ref()]),
        }
    }
}

impl From<Ty> for String {
    fn from(ty: Ty) -> Self {
        ty.to_string()
    }
}

impl TryFrom<String> for Ty {
    type Error = crate::error::Error;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        notation::parse(&text)
    }
}

impl std::str::FromStr for Ty {
    type Err = crate::error::Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        notation::parse(text)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// SHAPES
// ————————————————————————————————————————————————————————————————————————————

/// One property slot of a record shape. Identity is the (case-sensitive) name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Member<T = Ty> {
    pub name: String,
    pub declared_type: T,
    pub is_optional: bool,
    pub has_public_getter: bool,
    pub has_public_setter: bool,
    pub is_static: bool,
    pub is_indexed: bool,
}

/// Public instance members of a record type, ordered by name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shape<T = Ty> {
    pub name: String,
    pub members: BTreeMap<String, Member<T>>,
}

impl<T> Shape<T> {
    pub fn empty(name: impl Into<String>) -> Self {
        Self { name: name.into(), members: BTreeMap::new() }
    }

    pub fn get(&self, name: &str) -> Option<&Member<T>> {
        self.members.get(name)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Name-correlated members; either side may be absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedPair<T = Ty> {
    pub name: String,
    pub source: Option<Member<T>>,
    pub target: Option<Member<T>>,
}

impl<T> MatchedPair<T> {
    /// Exchange the read side and the write side.
    pub fn swapped(self) -> Self {
        Self { name: self.name, source: self.target, target: self.source }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// OPERATIONS
// ————————————————————————————————————————————————————————————————————————————

/// A pair that survived the absence guard: both sides are present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CopySlot<T = Ty> {
    pub name: String,
    pub source: Member<T>,
    pub target: Member<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CopyOperation<T = Ty> {
    /// `target.x = source.x`, wrapping into an optional when needed
    DirectAssign(CopySlot<T>),
    /// `target.x = source.x ?? zero(default_of)`
    CoalesceAssign { slot: CopySlot<T>, default_of: T },
    /// clear `target.x`, then append everything `source.x` yields
    CollectionReplace(CopySlot<T>),
}

impl<T> CopyOperation<T> {
    pub fn slot(&self) -> &CopySlot<T> {
        match self {
            CopyOperation::DirectAssign(slot)
            | CopyOperation::CoalesceAssign { slot, .. }
            | CopyOperation::CollectionReplace(slot) => slot,
        }
    }

    pub fn name(&self) -> &str {
        &self.slot().name
    }
}
