// src/types.rs
//
// Interned host type system.
//
// - TypeId: u32 handle to an interned type (Copy, trivial Eq/Hash)
// - TypeArena: per-unit storage with automatic deduplication
// - HostType: structural type representation, including qualifier wrappers
//
// Wrapping a type in a label interns a new `Annotated` type; the inner type
// is never touched, so a label attached to one expression cannot leak to
// another expression that shares the same type.

use quala_identity::{Label, LabelTable};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    // Reserved ids, interned in this order by TypeArena::new()
    pub const VOID: TypeId = TypeId(0);
    pub const BOOL: TypeId = TypeId(1);
    pub const CHAR: TypeId = TypeId(2);
    pub const INT: TypeId = TypeId(3);
    pub const LONG: TypeId = TypeId(4);
    pub const FLOAT: TypeId = TypeId(5);
    pub const DOUBLE: TypeId = TypeId(6);
    /// `std::nullptr_t`
    pub const NULLPTR: TypeId = TypeId(7);

    /// First non-reserved TypeId index
    pub const FIRST_DYNAMIC: u32 = 8;

    pub fn index(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Void,
    Bool,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Void => "void",
            PrimitiveType::Bool => "bool",
            PrimitiveType::Char => "char",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionType {
    pub ret: TypeId,
    pub params: SmallVec<[TypeId; 4]>,
    pub variadic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HostType {
    Primitive(PrimitiveType),
    NullPtr,
    Pointer(TypeId),
    Reference(TypeId),
    /// Named alias (`typedef`); sugar over `target`.
    Alias { name: String, target: TypeId },
    /// A qualifier label wrapped around `inner`.
    Annotated { inner: TypeId, label: Label },
    Function(FunctionType),
}

#[derive(Debug, Clone)]
pub struct TypeArena {
    types: Vec<HostType>,
    intern_map: FxHashMap<HostType, TypeId>,
}

impl Default for TypeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeArena {
    pub fn new() -> Self {
        let mut arena = Self {
            types: Vec::new(),
            intern_map: FxHashMap::default(),
        };
        for prim in [
            PrimitiveType::Void,
            PrimitiveType::Bool,
            PrimitiveType::Char,
            PrimitiveType::Int,
            PrimitiveType::Long,
            PrimitiveType::Float,
            PrimitiveType::Double,
        ] {
            arena.intern(HostType::Primitive(prim));
        }
        arena.intern(HostType::NullPtr);
        debug_assert_eq!(arena.types.len() as u32, TypeId::FIRST_DYNAMIC);
        arena
    }

    pub fn intern(&mut self, ty: HostType) -> TypeId {
        if let Some(&id) = self.intern_map.get(&ty) {
            return id;
        }
        let id = TypeId(self.types.len() as u32);
        self.types.push(ty.clone());
        self.intern_map.insert(ty, id);
        id
    }

    pub fn get(&self, id: TypeId) -> &HostType {
        &self.types[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    // ------------------------------------------------------------------------
    // Constructors
    // ------------------------------------------------------------------------

    pub fn primitive(&self, prim: PrimitiveType) -> TypeId {
        match prim {
            PrimitiveType::Void => TypeId::VOID,
            PrimitiveType::Bool => TypeId::BOOL,
            PrimitiveType::Char => TypeId::CHAR,
            PrimitiveType::Int => TypeId::INT,
            PrimitiveType::Long => TypeId::LONG,
            PrimitiveType::Float => TypeId::FLOAT,
            PrimitiveType::Double => TypeId::DOUBLE,
        }
    }

    pub fn pointer(&mut self, pointee: TypeId) -> TypeId {
        self.intern(HostType::Pointer(pointee))
    }

    pub fn reference(&mut self, referent: TypeId) -> TypeId {
        self.intern(HostType::Reference(referent))
    }

    pub fn alias(&mut self, name: &str, target: TypeId) -> TypeId {
        self.intern(HostType::Alias {
            name: name.to_string(),
            target,
        })
    }

    /// Wrap `inner` in one qualifier layer.
    pub fn annotated(&mut self, inner: TypeId, label: Label) -> TypeId {
        self.intern(HostType::Annotated { inner, label })
    }

    pub fn function(&mut self, ret: TypeId, params: &[TypeId], variadic: bool) -> TypeId {
        self.intern(HostType::Function(FunctionType {
            ret,
            params: params.iter().copied().collect(),
            variadic,
        }))
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Strip one layer of sugar: an alias or a qualifier wrapper.
    /// Returns None once the type is canonical.
    pub fn desugar_once(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id) {
            HostType::Alias { target, .. } => Some(*target),
            HostType::Annotated { inner, .. } => Some(*inner),
            _ => None,
        }
    }

    /// Strip all outer sugar.
    pub fn canonical(&self, id: TypeId) -> TypeId {
        let mut current = id;
        while let Some(next) = self.desugar_once(current) {
            current = next;
        }
        current
    }

    /// The outermost label if `id` is itself an `Annotated` type.
    pub fn own_label(&self, id: TypeId) -> Option<Label> {
        match self.get(id) {
            HostType::Annotated { label, .. } => Some(*label),
            _ => None,
        }
    }

    /// The inner type if `id` is itself an `Annotated` type.
    pub fn strip_annotation(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id) {
            HostType::Annotated { inner, .. } => Some(*inner),
            _ => None,
        }
    }

    pub fn is_pointer(&self, id: TypeId) -> bool {
        matches!(self.get(self.canonical(id)), HostType::Pointer(_))
    }

    pub fn is_reference(&self, id: TypeId) -> bool {
        matches!(self.get(self.canonical(id)), HostType::Reference(_))
    }

    pub fn is_nullptr(&self, id: TypeId) -> bool {
        self.canonical(id) == TypeId::NULLPTR
    }

    /// Pointee of a pointer or referent of a reference, with its sugar intact.
    pub fn pointee(&self, id: TypeId) -> Option<TypeId> {
        match self.get(self.canonical(id)) {
            HostType::Pointer(inner) | HostType::Reference(inner) => Some(*inner),
            _ => None,
        }
    }

    /// Peel one pointer (or one reference) layer off both types at once.
    /// Returns None unless both are pointers or both are references.
    pub fn peel_pointer_pair(&self, a: TypeId, b: TypeId) -> Option<(TypeId, TypeId)> {
        match (self.get(self.canonical(a)), self.get(self.canonical(b))) {
            (HostType::Pointer(pa), HostType::Pointer(pb))
            | (HostType::Reference(pa), HostType::Reference(pb)) => Some((*pa, *pb)),
            _ => None,
        }
    }

    /// Number of pointer/reference layers below `id`.
    pub fn pointer_depth(&self, id: TypeId) -> u32 {
        let mut depth = 0;
        let mut current = id;
        while let Some(inner) = self.pointee(current) {
            depth += 1;
            current = inner;
        }
        depth
    }

    /// Signature of a function or pointer-to-function type.
    pub fn function_signature(&self, id: TypeId) -> Option<&FunctionType> {
        let canonical = self.canonical(id);
        let target = match self.get(canonical) {
            HostType::Pointer(inner) => self.canonical(*inner),
            _ => canonical,
        };
        match self.get(target) {
            HostType::Function(func) => Some(func),
            _ => None,
        }
    }

    /// Render a type for diagnostics and debug logs.
    pub fn display(&self, id: TypeId, labels: &LabelTable) -> String {
        match self.get(id) {
            HostType::Primitive(p) => p.name().to_string(),
            HostType::NullPtr => "nullptr_t".to_string(),
            HostType::Pointer(inner) => format!("{} *", self.display(*inner, labels)),
            HostType::Reference(inner) => format!("{} &", self.display(*inner, labels)),
            HostType::Alias { name, .. } => name.clone(),
            HostType::Annotated { inner, label } => {
                format!("{} {}", labels.resolve(*label), self.display(*inner, labels))
            }
            HostType::Function(func) => {
                let mut params: Vec<String> =
                    func.params.iter().map(|p| self.display(*p, labels)).collect();
                if func.variadic {
                    params.push("...".to_string());
                }
                format!("{} ({})", self.display(func.ret, labels), params.join(", "))
            }
        }
    }
}
