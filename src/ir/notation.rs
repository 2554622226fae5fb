//! Compact type notation used by the workspace format.
//!
//! ```text
//! ty   := atom '?'*
//! atom := '[' ty ']' | path ('<' ty (',' ty)* '>')?
//! path := ident (('::' | '.') ident)*
//! ```
//!
//! Well-known generic names decide the capability: `Option<T>`/`T?` is
//! optional, `Seq<T>`/`[T]` is a read-only sequence, `Vec<T>`/`List<T>` and
//! friends are mutable collections. Everything else stays opaque.
use crate::error::{Error, Result};
use super::Ty;

const OPTIONAL_NAMES: &[&str] = &["Option", "Nullable"];
const SEQUENCE_NAMES: &[&str] = &[
    "Seq", "Iter", "IEnumerable", "IReadOnlyCollection", "IReadOnlyList",
];
const COLLECTION_NAMES: &[&str] = &[
    "Vec", "VecDeque", "List", "LinkedList", "Collection", "ObservableCollection",
    "ICollection", "IList", "HashSet", "BTreeSet",
];
// nesting levels (brackets, generic arguments, `?` suffixes) per type
const MAX_DEPTH: usize = 64;

pub fn parse(text: &str) -> Result<Ty> {
    let mut p = Parser { src: text, pos: 0, depth: 0 };
    let ty = p.ty()?;
    p.skip_ws();
    if p.pos != text.len() {
        return Err(p.error("trailing input"));
    }
    Ok(ty)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn eat(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<()> {
        if self.eat(c) { Ok(()) } else { Err(self.error(&format!("expected `{c}`"))) }
    }

    fn error(&self, reason: &str) -> Error {
        Error::TypeSyntax {
            text: self.src.to_string(),
            reason: format!("{reason} at offset {}", self.pos),
        }
    }

    fn ty(&mut self) -> Result<Ty> {
        self.enter()?;
        let mut ty = self.atom()?;
        let mut wraps = 0;
        while self.eat('?') {
            wraps += 1;
            if self.depth + wraps > MAX_DEPTH {
                return Err(self.error("type nested too deeply"));
            }
            ty = Ty::optional(ty);
        }
        self.depth -= 1;
        Ok(ty)
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error("type nested too deeply"));
        }
        Ok(())
    }

    fn atom(&mut self) -> Result<Ty> {
        if self.eat('[') {
            let item = self.ty()?;
            self.expect(']')?;
            return Ok(Ty::Sequence { name: String::new(), item: Box::new(item) });
        }
        let name = self.path()?;
        let mut args = Vec::new();
        if self.eat('<') {
            loop {
                args.push(self.ty()?);
                if self.eat(',') { continue }
                self.expect('>')?;
                break;
            }
        }
        Ok(classify(name, args))
    }

    fn path(&mut self) -> Result<String> {
        self.skip_ws();
        let start = self.pos;
        loop {
            match self.peek() {
                Some(c) if c.is_alphanumeric() || c == '_' => { self.bump(); }
                Some(':') if self.src[self.pos..].starts_with("::") => self.pos += 2,
                Some('.') => { self.bump(); }
                _ => break,
            }
        }
        let name = &self.src[start..self.pos];
        if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(self.error("expected a type name"));
        }
        Ok(name.to_string())
    }
}

fn classify(name: String, mut args: Vec<Ty>) -> Ty {
    // qualified names classify by their last segment
    let simple = name
        .rsplit(|c: char| c == ':' || c == '.')
        .next()
        .unwrap_or_default()
        .to_string();
    if args.len() != 1 {
        return Ty::Named { name, args };
    }
    let item = Box::new(args.remove(0));
    if OPTIONAL_NAMES.contains(&simple.as_str()) {
        Ty::Optional(item)
    } else if SEQUENCE_NAMES.contains(&simple.as_str()) {
        Ty::Sequence { name, item }
    } else if COLLECTION_NAMES.contains(&simple.as_str()) {
        Ty::Collection { name, item }
    } else {
        Ty::Named { name, args: vec![*item] }
    }
}
