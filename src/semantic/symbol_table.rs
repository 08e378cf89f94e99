//! Block-structured symbol table
//!
//! Three append-only tables in the classical Pascal-S layout:
//!
//! - `tab`: one row per identifier, chained per block through `link`
//! - `btab`: one row per block (the program and each subprogram)
//! - `atab`: one row per array type
//!
//! A `display` vector maps each nesting level to the block active there.
//! Row 0 of every table is a sentinel; typed indices ([`EntryId`],
//! [`BlockId`], [`ArrayId`]) use 0 to mean "none" and the accessors reject
//! it explicitly.
//!
//! Popping a scope only lowers the level. The display slot above it is left
//! in place and overwritten by the next push at that depth.

use super::errors::SymbolTableError;
use std::fmt;
use tracing::{debug, trace};

macro_rules! table_index {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(pub usize);

        impl $name {
            pub const NONE: $name = $name(0);

            pub fn index(self) -> usize {
                self.0
            }

            pub fn is_none(self) -> bool {
                self.0 == 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

table_index!(
    /// Index into `tab`.
    EntryId
);
table_index!(
    /// Index into `btab`.
    BlockId
);
table_index!(
    /// Index into `atab`.
    ArrayId
);

/// The block of the main program.
pub const GLOBAL_BLOCK: BlockId = BlockId(1);

/// Procedures registered on first lookup.
pub const BUILTIN_PROCEDURES: [&str; 4] = ["write", "writeln", "read", "readln"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Constant,
    Variable,
    Type,
    Procedure,
    Function,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ObjectKind::Constant => "constant",
            ObjectKind::Variable => "variable",
            ObjectKind::Type => "type",
            ObjectKind::Procedure => "procedure",
            ObjectKind::Function => "function",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    NoType = 0,
    Ints = 1,
    Reals = 2,
    Bools = 3,
    Chars = 4,
    Arrays = 5,
    Records = 6,
}

impl BaseType {
    /// Numeric code used in table dumps.
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_ordinal(self) -> bool {
        matches!(self, BaseType::Ints | BaseType::Bools | BaseType::Chars)
    }
}

/// `tab` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabEntry {
    pub name: String,
    /// Previous entry of the same block, or [`EntryId::NONE`].
    pub link: EntryId,
    pub kind: ObjectKind,
    pub typ: BaseType,
    /// Block index for subprograms, array index for array types, else 0.
    pub reference: usize,
    /// False for by-reference parameters.
    pub normal: bool,
    pub level: usize,
    /// Storage offset for variables, value for constants.
    pub address: i64,
}

/// `btab` row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockEntry {
    pub last: EntryId,
    /// Last parameter entry, or [`EntryId::NONE`] without parameters.
    pub lastpar: EntryId,
    pub psize: usize,
    pub vsize: usize,
}

/// `atab` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayEntry {
    pub index_type: BaseType,
    pub element_type: BaseType,
    pub element_ref: usize,
    pub low: i64,
    pub high: i64,
    pub element_size: usize,
    pub size: usize,
}

#[derive(Debug, Clone)]
pub struct SymbolTable {
    tab: Vec<TabEntry>,
    btab: Vec<BlockEntry>,
    atab: Vec<ArrayEntry>,
    display: Vec<BlockId>,
    level: usize,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Empty table with the sentinels and the global block active at level 0.
    pub fn new() -> Self {
        let sentinel = TabEntry {
            name: String::new(),
            link: EntryId::NONE,
            kind: ObjectKind::Constant,
            typ: BaseType::NoType,
            reference: 0,
            normal: true,
            level: 0,
            address: 0,
        };
        let sentinel_array = ArrayEntry {
            index_type: BaseType::NoType,
            element_type: BaseType::NoType,
            element_ref: 0,
            low: 0,
            high: 0,
            element_size: 0,
            size: 0,
        };

        Self {
            tab: vec![sentinel],
            btab: vec![BlockEntry::default(), BlockEntry::default()],
            atab: vec![sentinel_array],
            display: vec![GLOBAL_BLOCK],
            level: 0,
        }
    }

    pub fn level(&self) -> usize {
        self.level
    }

    /// Block active at the current level.
    pub fn current_block(&self) -> BlockId {
        self.display[self.level]
    }

    /// Append an entry to the current block.
    pub fn insert(
        &mut self,
        name: &str,
        kind: ObjectKind,
        typ: BaseType,
        reference: usize,
        normal: bool,
        address: i64,
    ) -> Result<EntryId, SymbolTableError> {
        if self.lookup_current_scope(name).is_some() {
            return Err(SymbolTableError::Duplicate {
                name: name.to_string(),
            });
        }
        let block = self.current_block();
        let level = self.level;
        Ok(self.append(block, level, name, kind, typ, reference, normal, address))
    }

    /// Search the current level and every enclosing one.
    ///
    /// Built-in procedures are added to the global block the first time they
    /// are looked up and not found.
    pub fn lookup(&mut self, name: &str) -> Option<EntryId> {
        let found = (0..=self.level)
            .rev()
            .find_map(|level| self.find_in_block(self.display[level], name));
        if found.is_some() {
            return found;
        }

        let builtin = BUILTIN_PROCEDURES
            .iter()
            .find(|b| b.eq_ignore_ascii_case(name))?;
        debug!(name = *builtin, "registering built-in procedure");
        Some(self.append(
            GLOBAL_BLOCK,
            0,
            builtin,
            ObjectKind::Procedure,
            BaseType::NoType,
            0,
            true,
            0,
        ))
    }

    /// Search only the innermost block.
    pub fn lookup_current_scope(&self, name: &str) -> Option<EntryId> {
        self.find_in_block(self.current_block(), name)
    }

    /// Allocate a new block and make it current one level deeper.
    pub fn push_scope(&mut self) -> BlockId {
        let block = self.enter_block();
        self.push_block_scope(block);
        block
    }

    /// Make an existing block current one level deeper.
    pub fn push_block_scope(&mut self, block: BlockId) {
        self.level += 1;
        if self.level < self.display.len() {
            self.display[self.level] = block;
        } else {
            self.display.push(block);
        }
        debug!(level = self.level, block = %block, "scope pushed");
    }

    /// Leave the current scope. Level 0 is never left.
    pub fn pop_scope(&mut self) {
        if self.level > 0 {
            self.level -= 1;
            debug!(level = self.level, "scope popped");
        }
    }

    /// Allocate a block row without changing level.
    pub fn enter_block(&mut self) -> BlockId {
        self.btab.push(BlockEntry::default());
        BlockId(self.btab.len() - 1)
    }

    pub fn set_block_params(
        &mut self,
        block: BlockId,
        lastpar: EntryId,
        psize: usize,
    ) -> Result<(), SymbolTableError> {
        let entry = self.btab_mut(block)?;
        entry.lastpar = lastpar;
        entry.psize = psize;
        Ok(())
    }

    pub fn set_block_vars(&mut self, block: BlockId, vsize: usize) -> Result<(), SymbolTableError> {
        self.btab_mut(block)?.vsize = vsize;
        Ok(())
    }

    /// Record an array type; `size` is `(high - low + 1) * element_size`,
    /// or 0 when `high < low`.
    pub fn enter_array(
        &mut self,
        index_type: BaseType,
        element_type: BaseType,
        element_ref: usize,
        low: i64,
        high: i64,
        element_size: usize,
    ) -> Result<ArrayId, SymbolTableError> {
        let size = high
            .checked_sub(low)
            .and_then(|span| span.checked_add(1))
            .map(|count| count.max(0))
            .and_then(|count| usize::try_from(count).ok())
            .and_then(|count| count.checked_mul(element_size))
            .ok_or(SymbolTableError::ArrayTooLarge {
                low,
                high,
                element_size,
            })?;
        self.atab.push(ArrayEntry {
            index_type,
            element_type,
            element_ref,
            low,
            high,
            element_size,
            size,
        });
        Ok(ArrayId(self.atab.len() - 1))
    }

    pub fn tab(&self, id: EntryId) -> Result<&TabEntry, SymbolTableError> {
        checked_index("tab", id.0, self.tab.len())?;
        Ok(&self.tab[id.0])
    }

    pub fn tab_mut(&mut self, id: EntryId) -> Result<&mut TabEntry, SymbolTableError> {
        checked_index("tab", id.0, self.tab.len())?;
        Ok(&mut self.tab[id.0])
    }

    pub fn btab(&self, id: BlockId) -> Result<&BlockEntry, SymbolTableError> {
        checked_index("btab", id.0, self.btab.len())?;
        Ok(&self.btab[id.0])
    }

    pub fn btab_mut(&mut self, id: BlockId) -> Result<&mut BlockEntry, SymbolTableError> {
        checked_index("btab", id.0, self.btab.len())?;
        Ok(&mut self.btab[id.0])
    }

    pub fn atab(&self, id: ArrayId) -> Result<&ArrayEntry, SymbolTableError> {
        checked_index("atab", id.0, self.atab.len())?;
        Ok(&self.atab[id.0])
    }

    /// Row counts including the sentinels.
    pub fn tab_len(&self) -> usize {
        self.tab.len()
    }

    pub fn btab_len(&self) -> usize {
        self.btab.len()
    }

    pub fn atab_len(&self) -> usize {
        self.atab.len()
    }

    /// Live entries of one block, most recent first.
    pub fn block_entries(&self, block: BlockId) -> impl Iterator<Item = (EntryId, &TabEntry)> {
        let start = self.btab.get(block.0).map_or(EntryId::NONE, |b| b.last);
        std::iter::successors(Some(start), |id| self.tab.get(id.0).map(|e| e.link))
            .take_while(|id| !id.is_none())
            .filter_map(|id| self.tab.get(id.0).map(|e| (id, e)))
    }

    fn find_in_block(&self, block: BlockId, name: &str) -> Option<EntryId> {
        self.block_entries(block)
            .find(|(_, entry)| entry.name.eq_ignore_ascii_case(name))
            .map(|(id, _)| id)
    }

    #[allow(clippy::too_many_arguments)]
    fn append(
        &mut self,
        block: BlockId,
        level: usize,
        name: &str,
        kind: ObjectKind,
        typ: BaseType,
        reference: usize,
        normal: bool,
        address: i64,
    ) -> EntryId {
        let link = self.btab[block.0].last;
        self.tab.push(TabEntry {
            name: name.to_string(),
            link,
            kind,
            typ,
            reference,
            normal,
            level,
            address,
        });
        let id = EntryId(self.tab.len() - 1);
        self.btab[block.0].last = id;
        trace!(name, %id, %block, level, "tab entry appended");
        id
    }
}

fn checked_index(table: &'static str, index: usize, len: usize) -> Result<(), SymbolTableError> {
    if index == 0 {
        Err(SymbolTableError::SentinelAccess { table })
    } else if index >= len {
        Err(SymbolTableError::IndexOutOfRange { table, index, len })
    } else {
        Ok(())
    }
}

impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== TAB (identifier table) ===")?;
        writeln!(
            f,
            "{:>4} {:>15} {:>5} {:>10} {:>4} {:>4} {:>4} {:>4} {:>6}",
            "idx", "name", "link", "obj", "typ", "ref", "nrm", "lev", "adr"
        )?;
        writeln!(f, "{}", "-".repeat(66))?;
        for (i, e) in self.tab.iter().enumerate().skip(1) {
            writeln!(
                f,
                "{:>4} {:>15} {:>5} {:>10} {:>4} {:>4} {:>4} {:>4} {:>6}",
                i,
                e.name,
                e.link,
                e.kind.to_string(),
                e.typ.code(),
                e.reference,
                u8::from(e.normal),
                e.level,
                e.address
            )?;
        }

        writeln!(f)?;
        writeln!(f, "=== BTAB (block table) ===")?;
        writeln!(
            f,
            "{:>4} {:>6} {:>6} {:>6} {:>6}",
            "idx", "last", "lpar", "psize", "vsize"
        )?;
        writeln!(f, "{}", "-".repeat(32))?;
        for (i, b) in self.btab.iter().enumerate().skip(1) {
            writeln!(
                f,
                "{:>4} {:>6} {:>6} {:>6} {:>6}",
                i, b.last, b.lastpar, b.psize, b.vsize
            )?;
        }

        writeln!(f)?;
        writeln!(f, "=== ATAB (array table) ===")?;
        writeln!(
            f,
            "{:>4} {:>5} {:>5} {:>5} {:>6} {:>6} {:>5} {:>6}",
            "idx", "xtyp", "etyp", "eref", "low", "high", "elsz", "size"
        )?;
        writeln!(f, "{}", "-".repeat(51))?;
        for (i, a) in self.atab.iter().enumerate().skip(1) {
            writeln!(
                f,
                "{:>4} {:>5} {:>5} {:>5} {:>6} {:>6} {:>5} {:>6}",
                i,
                a.index_type.code(),
                a.element_type.code(),
                a.element_ref,
                a.low,
                a.high,
                a.element_size,
                a.size
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(table: &mut SymbolTable, name: &str, address: i64) -> EntryId {
        table
            .insert(name, ObjectKind::Variable, BaseType::Ints, 0, true, address)
            .unwrap()
    }

    #[test]
    fn test_new_table_sentinels() {
        let table = SymbolTable::new();
        assert_eq!(table.level(), 0);
        assert_eq!(table.current_block(), GLOBAL_BLOCK);
        assert_eq!(table.tab_len(), 1);
        assert_eq!(table.btab_len(), 2);
        assert_eq!(table.atab_len(), 1);
    }

    #[test]
    fn test_insert_links_block_chain() {
        let mut table = SymbolTable::new();
        let x = var(&mut table, "x", 0);
        let y = var(&mut table, "y", 1);

        assert_eq!(table.tab(x).unwrap().link, EntryId::NONE);
        assert_eq!(table.tab(y).unwrap().link, x);
        assert_eq!(table.btab(GLOBAL_BLOCK).unwrap().last, y);

        let names: Vec<_> = table
            .block_entries(GLOBAL_BLOCK)
            .map(|(_, e)| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["y", "x"]);
    }

    #[test]
    fn test_duplicate_in_same_scope() {
        let mut table = SymbolTable::new();
        var(&mut table, "x", 0);
        let err = table
            .insert("X", ObjectKind::Constant, BaseType::Ints, 0, true, 0)
            .unwrap_err();
        assert_eq!(err, SymbolTableError::Duplicate { name: "X".into() });
    }

    #[test]
    fn test_shadowing_and_pop() {
        let mut table = SymbolTable::new();
        let outer = var(&mut table, "x", 0);

        let block = table.push_scope();
        assert_eq!(table.level(), 1);
        assert_eq!(table.current_block(), block);
        assert!(table.lookup_current_scope("x").is_none());

        let inner = var(&mut table, "x", 0);
        let local = var(&mut table, "t", 1);
        assert_eq!(table.lookup("x"), Some(inner));
        assert_eq!(table.tab(inner).unwrap().level, 1);

        table.pop_scope();
        assert_eq!(table.level(), 0);
        assert_eq!(table.lookup("x"), Some(outer));
        assert!(table.lookup("t").is_none());
        assert_eq!(table.tab(local).unwrap().name, "t");
    }

    #[test]
    fn test_display_slot_reused_by_sibling() {
        let mut table = SymbolTable::new();
        let first = table.push_scope();
        table.pop_scope();
        let second = table.push_scope();

        assert_ne!(first, second);
        assert_eq!(table.current_block(), second);
        table.pop_scope();
        table.pop_scope();
        assert_eq!(table.level(), 0);
    }

    #[test]
    fn test_builtins_register_lazily() {
        let mut table = SymbolTable::new();
        table.push_scope();
        let before = table.tab_len();

        let writeln = table.lookup("writeln").unwrap();
        assert_eq!(table.tab_len(), before + 1);
        let entry = table.tab(writeln).unwrap();
        assert_eq!(entry.kind, ObjectKind::Procedure);
        assert_eq!(entry.level, 0);
        assert_eq!(table.btab(GLOBAL_BLOCK).unwrap().last, writeln);

        assert_eq!(table.lookup("writeln"), Some(writeln));
        assert_eq!(table.tab_len(), before + 1);
        assert!(table.lookup("tulis").is_none());
    }

    #[test]
    fn test_enter_array_size() {
        let mut table = SymbolTable::new();
        let id = table
            .enter_array(BaseType::Ints, BaseType::Reals, 0, 1, 10, 1)
            .unwrap();
        let entry = table.atab(id).unwrap();
        assert_eq!(entry.size, 10);

        let nested = table
            .enter_array(BaseType::Chars, BaseType::Arrays, id.0, 97, 99, 10)
            .unwrap();
        assert_eq!(table.atab(nested).unwrap().size, 30);
    }

    #[test]
    fn test_enter_array_rejects_sizes_that_overflow() {
        let mut table = SymbolTable::new();
        let before = table.atab_len();

        let err = table
            .enter_array(BaseType::Ints, BaseType::Ints, 0, -i64::MAX, i64::MAX, 1)
            .unwrap_err();
        assert!(matches!(err, SymbolTableError::ArrayTooLarge { .. }));

        let err = table
            .enter_array(BaseType::Ints, BaseType::Arrays, 1, 1, i64::MAX / 2, 10)
            .unwrap_err();
        assert_eq!(
            err,
            SymbolTableError::ArrayTooLarge {
                low: 1,
                high: i64::MAX / 2,
                element_size: 10
            }
        );

        assert_eq!(table.atab_len(), before);
    }

    #[test]
    fn test_accessors_reject_sentinel_and_range() {
        let table = SymbolTable::new();
        assert_eq!(
            table.tab(EntryId::NONE).unwrap_err(),
            SymbolTableError::SentinelAccess { table: "tab" }
        );
        assert_eq!(
            table.btab(BlockId(7)).unwrap_err(),
            SymbolTableError::IndexOutOfRange {
                table: "btab",
                index: 7,
                len: 2
            }
        );
        assert!(table.atab(ArrayId(1)).is_err());
    }

    #[test]
    fn test_display_lists_rows() {
        let mut table = SymbolTable::new();
        var(&mut table, "hitung", 0);
        let dump = table.to_string();
        assert!(dump.contains("=== TAB (identifier table) ==="));
        assert!(dump.contains("hitung"));
        assert!(dump.contains("=== ATAB (array table) ==="));
    }
}
