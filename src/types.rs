//! The language type universe (spec.md §3, §4.3).
//!
//! Every `Type` is a cheap `Rc`-backed handle onto a `TypeData` payload,
//! built via one staged builder per kind the way `spec.md` §4.3
//! describes. A builder panics if asked to `build()` before its
//! mandatory fields are set — the spec explicitly allows "an assert at
//! runtime" here, since Rust can't express the staged-construction
//! invariant as cheaply at compile time without a sea of marker types.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::token::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Si8,
    Ui8,
    Si32,
    Ui32,
    Sisz,
    Uisz,
    Ptr,
    Flt32,
    Flt64,
    String,
    Bool,
    Null,
}

impl Primitive {
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Si8 => "si8",
            Primitive::Ui8 => "ui8",
            Primitive::Si32 => "si32",
            Primitive::Ui32 => "ui32",
            Primitive::Sisz => "sisz",
            Primitive::Uisz => "uisz",
            Primitive::Ptr => "ptr",
            Primitive::Flt32 => "flt32",
            Primitive::Flt64 => "flt64",
            Primitive::String => "string",
            Primitive::Bool => "bool",
            Primitive::Null => "null",
        }
    }

    /// Accepts both of this language's primitive spelling regimes: the
    /// `si8`/`ui8`/`sisz` family used by §3's lexer grammar and §4.5's
    /// renaming table, and the `i8`/`u8`/`isz` shorthand §8's own
    /// end-to-end scenarios are written in (see DESIGN.md Open Question
    /// 12 — both spellings name the same primitive set, so both parse).
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "si8" | "i8" => Primitive::Si8,
            "ui8" | "u8" => Primitive::Ui8,
            "si32" | "i32" => Primitive::Si32,
            "ui32" | "u32" => Primitive::Ui32,
            "sisz" | "isz" => Primitive::Sisz,
            "uisz" | "usz" => Primitive::Uisz,
            "ptr" => Primitive::Ptr,
            "flt32" => Primitive::Flt32,
            "flt64" => Primitive::Flt64,
            "string" => Primitive::String,
            "bool" => Primitive::Bool,
            "null" => Primitive::Null,
            _ => return None,
        })
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Primitive::Si8
                | Primitive::Ui8
                | Primitive::Si32
                | Primitive::Ui32
                | Primitive::Sisz
                | Primitive::Uisz
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, Primitive::Flt32 | Primitive::Flt64)
    }
}

#[derive(Debug, Clone)]
pub enum TypeKind {
    Any,
    Void,
    Primitive(Primitive),
    Array {
        element: Type,
        size: Option<usize>,
    },
    Struct {
        name: String,
        fields: Vec<(String, Type)>,
    },
    Func {
        name: Option<String>,
        args: Vec<(String, Type)>,
        ret: Type,
        /// Last declared argument accepting zero or more additional
        /// positional arguments of a given element type.
        variadic: Option<(String, Option<Type>)>,
    },
    Enum {
        name: String,
        values: Vec<(String, i64)>,
    },
    TaggedUnion {
        name: String,
        cases: Vec<(String, Type)>,
    },
}

#[derive(Debug)]
pub struct TypeData {
    pub kind: TypeKind,
    pub origin: Option<Position>,
    pub methods: RefCell<HashMap<String, Type>>,
    pub properties: RefCell<HashMap<String, Type>>,
}

/// A cheaply-cloned handle onto a `TypeData` payload.
#[derive(Debug, Clone)]
pub struct Type(Rc<TypeData>);

impl Type {
    fn wrap(kind: TypeKind, origin: Option<Position>) -> Self {
        Type(Rc::new(TypeData {
            kind,
            origin,
            methods: RefCell::new(HashMap::new()),
            properties: RefCell::new(HashMap::new()),
        }))
    }

    pub fn any() -> Self {
        Type::wrap(TypeKind::Any, None)
    }

    pub fn void() -> Self {
        Type::wrap(TypeKind::Void, None)
    }

    pub fn primitive(p: Primitive) -> Self {
        Type::wrap(TypeKind::Primitive(p), None)
    }

    pub fn kind(&self) -> &TypeKind {
        &self.0.kind
    }

    pub fn origin(&self) -> Option<&Position> {
        self.0.origin.as_ref()
    }

    pub fn add_method(&self, name: impl Into<String>, ty: Type) {
        self.0.methods.borrow_mut().insert(name.into(), ty);
    }

    pub fn get_method(&self, name: &str) -> Option<Type> {
        self.0.methods.borrow().get(name).cloned()
    }

    pub fn add_property(&self, name: impl Into<String>, ty: Type) {
        self.0.properties.borrow_mut().insert(name.into(), ty);
    }

    pub fn get_property(&self, name: &str) -> Option<Type> {
        self.0.properties.borrow().get(name).cloned()
    }

    /// "Any integer" per spec.md §4.3: an integer-base primitive or an enum.
    pub fn is_any_integer(&self) -> bool {
        match &self.0.kind {
            TypeKind::Primitive(p) => p.is_integer(),
            TypeKind::Enum { .. } => true,
            _ => false,
        }
    }

    /// "Number" per spec.md §4.3: any integer or a float primitive.
    pub fn is_number(&self) -> bool {
        self.is_any_integer()
            || matches!(&self.0.kind, TypeKind::Primitive(p) if p.is_float())
    }

    pub fn as_primitive(&self) -> Option<Primitive> {
        match &self.0.kind {
            TypeKind::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    /// The type's canonical written name, used to rewrite `VarDecl`
    /// declared-type text once the checker has resolved it (e.g. the
    /// `"number"` sentinel resolving to a concrete primitive).
    pub fn canonical_name(&self) -> String {
        match &self.0.kind {
            TypeKind::Any => "any".to_string(),
            TypeKind::Void => "void".to_string(),
            TypeKind::Primitive(p) => p.name().to_string(),
            TypeKind::Array { element, size } => match size {
                Some(n) => format!("{}[{}]", element.canonical_name(), n),
                None => format!("{}[]", element.canonical_name()),
            },
            TypeKind::Struct { name, .. } => name.clone(),
            TypeKind::Func { name, .. } => name.clone().unwrap_or_else(|| "fn".to_string()),
            TypeKind::Enum { name, .. } => name.clone(),
            TypeKind::TaggedUnion { name, .. } => name.clone(),
        }
    }

    /// Reflexive type equivalence (spec.md §4.3 `types_are_equivalent`).
    /// `any` is equivalent to every type on either side.
    pub fn equivalent(&self, other: &Type) -> bool {
        if matches!(self.0.kind, TypeKind::Any) || matches!(other.0.kind, TypeKind::Any) {
            return true;
        }
        match (&self.0.kind, &other.0.kind) {
            (TypeKind::Void, TypeKind::Void) => true,
            (TypeKind::Primitive(a), TypeKind::Primitive(b)) => primitives_equivalent(*a, *b),
            (
                TypeKind::Array { element: ea, size: sa },
                TypeKind::Array { element: eb, size: sb },
            ) => sa == sb && ea.equivalent(eb),
            (
                TypeKind::Struct { fields: fa, .. },
                TypeKind::Struct { fields: fb, .. },
            ) => {
                fa.len() == fb.len()
                    && fa.iter().zip(fb.iter()).all(|((na, ta), (nb, tb))| {
                        na == nb && ta.equivalent(tb)
                    })
            }
            (
                TypeKind::Func { args: aa, ret: ra, .. },
                TypeKind::Func { args: ab, ret: rb, .. },
            ) => {
                aa.len() == ab.len()
                    && aa.iter().zip(ab.iter()).all(|((_, ta), (_, tb))| ta.equivalent(tb))
                    && ra.equivalent(rb)
            }
            (
                TypeKind::Enum { name: na, values: va },
                TypeKind::Enum { name: nb, values: vb },
            ) => na == nb && va == vb,
            (
                TypeKind::TaggedUnion { name: na, cases: ca },
                TypeKind::TaggedUnion { name: nb, cases: cb },
            ) => {
                na == nb
                    && ca.len() == cb.len()
                    && ca.iter().zip(cb.iter()).all(|((an, at), (bn, bt))| {
                        an == bn && at.equivalent(bt)
                    })
            }
            _ => false,
        }
    }
}

fn primitives_equivalent(a: Primitive, b: Primitive) -> bool {
    if a == b {
        return true;
    }
    match (a, b) {
        (x, y) if x.is_integer() && y.is_integer() => true,
        (x, y) if x.is_float() && y.is_float() => true,
        _ => false,
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_name())
    }
}

// ===========================================================================
// Staged builders
// ===========================================================================

#[derive(Default)]
pub struct ArrayBuilder {
    element: Option<Type>,
    size: Option<usize>,
    origin: Option<Position>,
}

impl ArrayBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn element(mut self, ty: Type) -> Self {
        self.element = Some(ty);
        self
    }

    pub fn size(mut self, n: usize) -> Self {
        self.size = Some(n);
        self
    }

    pub fn origin(mut self, pos: Position) -> Self {
        self.origin = Some(pos);
        self
    }

    pub fn build(self) -> Type {
        let element = self.element.expect("ArrayBuilder: element type is mandatory");
        Type::wrap(
            TypeKind::Array { element, size: self.size },
            self.origin,
        )
    }
}

#[derive(Default)]
pub struct StructBuilder {
    name: Option<String>,
    fields: Vec<(String, Type)>,
    origin: Option<Position>,
}

impl StructBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.fields.push((name.into(), ty));
        self
    }

    pub fn origin(mut self, pos: Position) -> Self {
        self.origin = Some(pos);
        self
    }

    pub fn build(self) -> Type {
        let name = self.name.expect("StructBuilder: name is mandatory");
        Type::wrap(
            TypeKind::Struct { name, fields: self.fields },
            self.origin,
        )
    }
}

#[derive(Default)]
pub struct FuncBuilder {
    name: Option<String>,
    args: Vec<(String, Type)>,
    ret: Option<Type>,
    variadic: Option<(String, Option<Type>)>,
    origin: Option<Position>,
}

impl FuncBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn arg(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.args.push((name.into(), ty));
        self
    }

    pub fn ret(mut self, ty: Type) -> Self {
        self.ret = Some(ty);
        self
    }

    pub fn variadic(mut self, name: impl Into<String>, element: Option<Type>) -> Self {
        self.variadic = Some((name.into(), element));
        self
    }

    pub fn origin(mut self, pos: Position) -> Self {
        self.origin = Some(pos);
        self
    }

    pub fn build(self) -> Type {
        let ret = self.ret.expect("FuncBuilder: return type is mandatory");
        Type::wrap(
            TypeKind::Func {
                name: self.name,
                args: self.args,
                ret,
                variadic: self.variadic,
            },
            self.origin,
        )
    }
}

#[derive(Default)]
pub struct EnumBuilder {
    name: Option<String>,
    values: Vec<(String, i64)>,
    origin: Option<Position>,
}

impl EnumBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn value(mut self, name: impl Into<String>, v: i64) -> Self {
        self.values.push((name.into(), v));
        self
    }

    pub fn origin(mut self, pos: Position) -> Self {
        self.origin = Some(pos);
        self
    }

    pub fn build(self) -> Type {
        let name = self.name.expect("EnumBuilder: name is mandatory");
        Type::wrap(TypeKind::Enum { name, values: self.values }, self.origin)
    }
}

#[derive(Default)]
pub struct TaggedUnionBuilder {
    name: Option<String>,
    cases: Vec<(String, Type)>,
    origin: Option<Position>,
}

impl TaggedUnionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn case(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.cases.push((name.into(), ty));
        self
    }

    pub fn origin(mut self, pos: Position) -> Self {
        self.origin = Some(pos);
        self
    }

    pub fn build(self) -> Type {
        let name = self.name.expect("TaggedUnionBuilder: name is mandatory");
        Type::wrap(TypeKind::TaggedUnion { name, cases: self.cases }, self.origin)
    }
}

// ===========================================================================
// Type-name-string parsing (spec.md §4.3 "Type name parsing")
// ===========================================================================

/// Parse a written type name like `Base`, `Base[]`, `Base[N]`, `Base[][M]`
/// into a `Type`. `resolve_base` maps the leading identifier to a `Type`
/// (a primitive, or a lookup against a `TypeContext`).
pub fn parse_type_name(
    name: &str,
    resolve_base: impl Fn(&str) -> Option<Type>,
) -> Result<Type, String> {
    use crate::lexer::Lexer;
    use crate::token::TokenType;

    let mut lx = Lexer::new(name);
    let base_tok = lx.next();
    let base_name = match &base_tok.kind {
        TokenType::Identifier(s) => s.clone(),
        TokenType::Keyword(_) => return Err(format!("malformed type name '{}'", name)),
        other => return Err(format!("malformed type name '{}': unexpected {}", name, other)),
    };

    let mut ty = resolve_base(&base_name).ok_or_else(|| format!("unknown type '{}'", base_name))?;

    loop {
        let tok = lx.peek();
        match tok.kind.symbol_text() {
            Some("[") => {
                lx.next();
                let next = lx.peek();
                let size = if let crate::token::TokenType::Integer(n) = next.kind {
                    lx.next();
                    Some(n as usize)
                } else {
                    None
                };
                let close = lx.next();
                if close.kind.symbol_text() != Some("]") {
                    return Err(format!("malformed array bracket in type name '{}'", name));
                }
                ty = ArrayBuilder::new().element(ty).size_opt(size).build();
            }
            _ => break,
        }
    }

    Ok(ty)
}

impl ArrayBuilder {
    /// Convenience for `parse_type_name`: set the size only if `Some`.
    pub fn size_opt(self, size: Option<usize>) -> Self {
        match size {
            Some(n) => self.size(n),
            None => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_is_equivalent_to_everything() {
        let any = Type::any();
        let s = Type::primitive(Primitive::String);
        assert!(any.equivalent(&s));
        assert!(s.equivalent(&any));
    }

    #[test]
    fn integers_are_mutually_equivalent() {
        let a = Type::primitive(Primitive::Si32);
        let b = Type::primitive(Primitive::Uisz);
        assert!(a.equivalent(&b));
    }

    #[test]
    fn floats_are_not_equivalent_to_integers() {
        let f = Type::primitive(Primitive::Flt32);
        let i = Type::primitive(Primitive::Si32);
        assert!(!f.equivalent(&i));
    }

    #[test]
    fn string_bool_null_match_only_themselves() {
        let s = Type::primitive(Primitive::String);
        let b = Type::primitive(Primitive::Bool);
        assert!(!s.equivalent(&b));
        assert!(s.equivalent(&Type::primitive(Primitive::String)));
    }

    #[test]
    fn array_equivalence_checks_size_and_element() {
        let a = ArrayBuilder::new().element(Type::primitive(Primitive::Si32)).size(3).build();
        let b = ArrayBuilder::new().element(Type::primitive(Primitive::Si32)).size(3).build();
        let c = ArrayBuilder::new().element(Type::primitive(Primitive::Si32)).build();
        assert!(a.equivalent(&b));
        assert!(!a.equivalent(&c));
    }

    #[test]
    #[should_panic(expected = "mandatory")]
    fn struct_builder_requires_name() {
        let _ = StructBuilder::new().build();
    }

    #[test]
    fn parse_simple_array_type_name() {
        let ty = parse_type_name("si32[]", |n| {
            Primitive::from_name(n).map(Type::primitive)
        })
        .unwrap();
        match ty.kind() {
            TypeKind::Array { size: None, .. } => {}
            other => panic!("expected unsized array, got {:?}", other),
        }
    }

    #[test]
    fn parse_fixed_size_array_type_name() {
        let ty = parse_type_name("si32[4]", |n| {
            Primitive::from_name(n).map(Type::primitive)
        })
        .unwrap();
        match ty.kind() {
            TypeKind::Array { size: Some(4), .. } => {}
            other => panic!("expected size-4 array, got {:?}", other),
        }
    }

    #[test]
    fn from_name_accepts_both_primitive_spelling_regimes() {
        assert_eq!(Primitive::from_name("isz"), Some(Primitive::Sisz));
        assert_eq!(Primitive::from_name("sisz"), Some(Primitive::Sisz));
        assert_eq!(Primitive::from_name("u8"), Some(Primitive::Ui8));
        assert_eq!(Primitive::from_name("ui8"), Some(Primitive::Ui8));
        assert_eq!(Primitive::from_name("i32"), Some(Primitive::Si32));
        assert_eq!(Primitive::from_name("usz"), Some(Primitive::Uisz));
    }
}
