use std::collections::HashMap;

use epsilang_session::InternedStr;

use crate::NodeCopy;

/// Index of a function into [`Symbols::funcs`].
#[derive(NodeCopy!)]
pub struct FuncId(pub usize);

/// The two flat side tables of one code-generation run: globals (one
/// `.data` qword each) and functions. Both keep declaration order for
/// deterministic emission, with a name lookup alongside.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Symbols {
    globals: Vec<GlobalSymbol>,
    global_lookup: HashMap<InternedStr, usize>,

    funcs: Vec<FuncSymbol>,
    func_lookup: HashMap<InternedStr, FuncId>,
}

impl Symbols {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a global. Returns `false` when the name was already
    /// declared; the original entry is kept either way.
    pub fn declare_global(&mut self, symbol: GlobalSymbol) -> bool {
        if self.global_lookup.contains_key(&symbol.ident) {
            return false;
        }

        self.global_lookup.insert(symbol.ident, self.globals.len());
        self.globals.push(symbol);
        true
    }

    pub fn lookup_global(&self, name: InternedStr) -> Option<&GlobalSymbol> {
        self.global_lookup.get(&name).map(|&i| &self.globals[i])
    }

    pub fn globals(&self) -> &[GlobalSymbol] {
        &self.globals
    }

    /// Register a function. Returns `Err` with the existing id when the
    /// name was already declared; the first definition wins.
    pub fn declare_func(&mut self, symbol: FuncSymbol) -> Result<FuncId, FuncId> {
        if let Some(&existing) = self.func_lookup.get(&symbol.ident) {
            return Err(existing);
        }

        let id = FuncId(self.funcs.len());
        self.func_lookup.insert(symbol.ident, id);
        self.funcs.push(symbol);
        Ok(id)
    }

    pub fn lookup_func(&self, name: InternedStr) -> Option<(FuncId, &FuncSymbol)> {
        let &id = self.func_lookup.get(&name)?;
        Some((id, &self.funcs[id.0]))
    }

    pub fn func(&self, id: FuncId) -> &FuncSymbol {
        &self.funcs[id.0]
    }

    pub fn func_mut(&mut self, id: FuncId) -> &mut FuncSymbol {
        &mut self.funcs[id.0]
    }

    pub fn funcs(&self) -> &[FuncSymbol] {
        &self.funcs
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlobalSymbol {
    pub ident: InternedStr,
    /// Mangled `.data` label, `var_<name>`.
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncSymbol {
    pub ident: InternedStr,
    /// Mangled text label, `func_<name>`.
    pub label: String,
    /// Index of the definition in the top-level statement list.
    pub stmt_index: usize,

    pub params: Vec<InternedStr>,
    pub locals: LocalTable,
}

impl FuncSymbol {
    pub fn param_index(&self, name: InternedStr) -> Option<usize> {
        self.params.iter().position(|&p| p == name)
    }

    /// Stack slots the frame reserves: one per parameter spill plus one
    /// per local.
    pub fn slot_count(&self) -> usize {
        self.params.len() + self.locals.len()
    }
}

/// Per-function local table: name to slot index, slots numbered from 0
/// in declaration order. Parameters are not in here; they occupy the
/// lower frame slots by position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalTable {
    slots: HashMap<InternedStr, usize>,
}

impl LocalTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next slot for `name`, or hand back the slot it
    /// already has.
    pub fn declare(&mut self, name: InternedStr) -> usize {
        let next = self.slots.len();
        *self.slots.entry(name).or_insert(next)
    }

    pub fn get(&self, name: InternedStr) -> Option<usize> {
        self.slots.get(&name).copied()
    }

    pub fn contains(&self, name: InternedStr) -> bool {
        self.slots.contains_key(&name)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
