use hack::vm::Segment;
use smol_str::SmolStr;
use std::collections::{btree_map::Entry, BTreeMap};

/// Storage class of a declared variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Class level, shared by all instances.
    Static,
    /// Class level, one per instance.
    Field,
    Argument,
    Local,
}

impl SymbolKind {
    /// Memory segment the variable lives in.
    #[rustfmt::skip]
    pub fn segment(self) -> Segment {
        match self {
            SymbolKind::Static   => Segment::Static,
            SymbolKind::Field    => Segment::This,
            SymbolKind::Argument => Segment::Argument,
            SymbolKind::Local    => Segment::Local,
        }
    }

    fn slot(self) -> usize {
        match self {
            SymbolKind::Static => 0,
            SymbolKind::Field => 1,
            SymbolKind::Argument => 2,
            SymbolKind::Local => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: SmolStr,
    /// Declared type name, `int`, `char`, `boolean` or a class.
    pub ty: SmolStr,
    pub kind: SymbolKind,
    /// 0-based position among the symbols of the same kind.
    pub index: u16,
}

/// Single level of name bindings with dense per kind counters.
#[derive(Debug, Default)]
pub struct Scope {
    symbols: BTreeMap<SmolStr, Symbol>,
    counts: [u16; 4],
}

impl Scope {
    /// Bind a name, overwriting any previous binding of it in this scope.
    ///
    /// Returns `None` when the kind has run out of indices.
    pub fn define(&mut self, name: &str, ty: &str, kind: SymbolKind) -> Option<&Symbol> {
        let count = &mut self.counts[kind.slot()];
        let symbol = Symbol {
            name: SmolStr::new(name),
            ty: SmolStr::new(ty),
            kind,
            index: *count,
        };
        *count = count.checked_add(1)?;

        match self.symbols.entry(symbol.name.clone()) {
            Entry::Occupied(mut entry) => {
                entry.insert(symbol);
                Some(entry.into_mut())
            }
            Entry::Vacant(entry) => Some(entry.insert(symbol)),
        }
    }

    #[inline]
    pub fn get_symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    #[inline]
    pub fn count_of(&self, kind: SymbolKind) -> u16 {
        self.counts[kind.slot()]
    }

    pub fn clear(&mut self) {
        self.symbols.clear();
        self.counts = [0; 4];
    }
}

/// Class scope with a subroutine scope layered over it.
///
/// Lookups try the subroutine scope first. The class scope lives
/// for the whole compilation unit, the subroutine scope is reset at
/// every subroutine declaration.
#[derive(Debug, Default)]
pub struct SymbolTable {
    class: Scope,
    subroutine: Scope,
}

impl SymbolTable {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Statics and fields go to the class scope, arguments and
    /// locals to the subroutine scope.
    pub fn define(&mut self, name: &str, ty: &str, kind: SymbolKind) -> Option<&Symbol> {
        match kind {
            SymbolKind::Static | SymbolKind::Field => self.class.define(name, ty, kind),
            SymbolKind::Argument | SymbolKind::Local => self.subroutine.define(name, ty, kind),
        }
    }

    /// Start a new subroutine scope.
    #[inline]
    pub fn reset(&mut self) {
        self.subroutine.clear();
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.subroutine.get_symbol(name).or_else(|| self.class.get_symbol(name))
    }

    #[inline]
    pub fn kind_of(&self, name: &str) -> Option<SymbolKind> {
        self.lookup(name).map(|symbol| symbol.kind)
    }

    #[inline]
    pub fn type_of(&self, name: &str) -> Option<&str> {
        self.lookup(name).map(|symbol| symbol.ty.as_str())
    }

    #[inline]
    pub fn index_of(&self, name: &str) -> Option<u16> {
        self.lookup(name).map(|symbol| symbol.index)
    }

    pub fn count_of(&self, kind: SymbolKind) -> u16 {
        match kind {
            SymbolKind::Static | SymbolKind::Field => self.class.count_of(kind),
            SymbolKind::Argument | SymbolKind::Local => self.subroutine.count_of(kind),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_subroutine_scope_shadows_class_scope() {
        let mut table = SymbolTable::new();
        table.define("x", "int", SymbolKind::Field);
        table.define("x", "int", SymbolKind::Local);
        assert_eq!(table.kind_of("x"), Some(SymbolKind::Local));
        assert_eq!(table.lookup("x").unwrap().kind.segment(), Segment::Local);

        table.reset();
        assert_eq!(table.kind_of("x"), Some(SymbolKind::Field));
        assert_eq!(table.lookup("x").unwrap().kind.segment(), Segment::This);
    }

    #[test]
    fn test_ordinals_are_dense_per_kind() {
        let mut table = SymbolTable::new();
        table.define("a", "int", SymbolKind::Static);
        table.define("b", "int", SymbolKind::Field);
        table.define("c", "Point", SymbolKind::Argument);
        table.define("d", "int", SymbolKind::Local);
        table.define("e", "int", SymbolKind::Field);
        table.define("f", "char", SymbolKind::Local);
        table.define("g", "int", SymbolKind::Field);

        assert_eq!(table.index_of("g"), Some(2));
        assert_eq!(table.index_of("f"), Some(1));
        assert_eq!(table.index_of("c"), Some(0));
        assert_eq!(table.type_of("c"), Some("Point"));
        assert_eq!(table.count_of(SymbolKind::Field), 3);
        assert_eq!(table.count_of(SymbolKind::Local), 2);
    }

    #[test]
    fn test_reset_keeps_class_counters() {
        let mut table = SymbolTable::new();
        table.define("count", "int", SymbolKind::Static);
        table.define("n", "int", SymbolKind::Argument);
        table.define("i", "int", SymbolKind::Local);

        table.reset();
        assert_eq!(table.count_of(SymbolKind::Argument), 0);
        assert_eq!(table.count_of(SymbolKind::Local), 0);
        assert_eq!(table.count_of(SymbolKind::Static), 1);
        assert_eq!(table.lookup("n"), None);
        assert_eq!(table.define("m", "int", SymbolKind::Argument).unwrap().index, 0);
    }

    #[test]
    fn test_redefinition_overwrites() {
        let mut table = SymbolTable::new();
        table.define("x", "int", SymbolKind::Local);
        table.define("x", "boolean", SymbolKind::Local);
        assert_eq!(table.type_of("x"), Some("boolean"));
        assert_eq!(table.index_of("x"), Some(1));
        assert_eq!(table.count_of(SymbolKind::Local), 2);
    }

    #[test]
    fn test_unknown_name() {
        let table = SymbolTable::new();
        assert_eq!(table.kind_of("Math"), None);
        assert_eq!(table.index_of("Math"), None);
    }

    #[test]
    fn test_index_exhaustion() {
        let mut scope = Scope::default();
        for n in 0..u16::MAX {
            assert_eq!(scope.define("x", "int", SymbolKind::Local).unwrap().index, n);
        }
        assert_eq!(scope.count_of(SymbolKind::Local), u16::MAX);
        assert!(scope.define("y", "int", SymbolKind::Local).is_none());
        assert_eq!(scope.count_of(SymbolKind::Local), u16::MAX);
        assert!(scope.define("s", "int", SymbolKind::Static).is_some());
    }
}
