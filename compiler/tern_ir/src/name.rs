//! Interned identifiers.
//!
//! Every identifier in a Tern program is a [`Name`]: a 32-bit index into one
//! process-wide interner. Names compare and hash as integers and render back
//! to their text without threading an interner through every call.

use std::fmt;
use std::sync::LazyLock;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Interned identifier.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string. Never a valid declared name.
    pub const EMPTY: Name = Name(0);

    /// Pre-interned blank identifier `_`.
    pub const BLANK: Name = Name(1);

    /// Intern `s`, returning its name.
    pub fn intern(s: &str) -> Name {
        INTERNER.intern(s)
    }

    /// The interned text.
    pub fn as_str(self) -> &'static str {
        INTERNER.lookup(self)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == Self::EMPTY.0
    }

    #[inline]
    pub const fn is_blank(self) -> bool {
        self.0 == Self::BLANK.0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({:?})", self.as_str())
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Name::intern(s)
    }
}

static INTERNER: LazyLock<StringInterner> = LazyLock::new(StringInterner::new);

struct InternTable {
    map: FxHashMap<&'static str, u32>,
    strings: Vec<&'static str>,
}

/// String interner behind [`Name`].
///
/// Interned text is leaked so lookups hand out `&'static str` without holding
/// the lock.
struct StringInterner {
    table: RwLock<InternTable>,
}

impl StringInterner {
    fn new() -> Self {
        let mut table = InternTable {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(256),
        };
        for (s, index) in ["", "_"].into_iter().zip(0u32..) {
            table.map.insert(s, index);
            table.strings.push(s);
        }
        StringInterner {
            table: RwLock::new(table),
        }
    }

    fn intern(&self, s: &str) -> Name {
        if let Some(&index) = self.table.read().map.get(s) {
            return Name(index);
        }

        let mut table = self.table.write();
        // Another writer may have won the race.
        if let Some(&index) = table.map.get(s) {
            return Name(index);
        }
        let index = u32::try_from(table.strings.len())
            .unwrap_or_else(|_| panic!("name interner exceeded {} entries", u32::MAX));
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        table.strings.push(leaked);
        table.map.insert(leaked, index);
        Name(index)
    }

    fn lookup(&self, name: Name) -> &'static str {
        self.table
            .read()
            .strings
            .get(name.0 as usize)
            .copied()
            .unwrap_or("<unknown name>")
    }
}

#[cfg(test)]
mod tests;
