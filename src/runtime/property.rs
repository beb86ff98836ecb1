//! Property keys, symbols and property descriptors
//!
//! Own properties live in an insertion-ordered table keyed by [`PropertyKey`].
//! Each entry is a [`Property`] descriptor: either a data slot or an
//! accessor pair, with the usual writable/enumerable/configurable flags.

use super::value::Value;
use bitflags::bitflags;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// ID counter for user symbols. Ids below this are reserved for well-known symbols.
static SYMBOL_ID: AtomicU64 = AtomicU64::new(64);

/// Well-known symbols (fixed allocation in the symbol space)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnownSymbol {
    AsyncIterator,
    HasInstance,
    IsConcatSpreadable,
    Iterator,
    Match,
    MatchAll,
    Replace,
    Search,
    Species,
    Split,
    ToPrimitive,
    ToStringTag,
    Unscopables,
}

impl WellKnownSymbol {
    const ALL: [WellKnownSymbol; 13] = [
        WellKnownSymbol::AsyncIterator,
        WellKnownSymbol::HasInstance,
        WellKnownSymbol::IsConcatSpreadable,
        WellKnownSymbol::Iterator,
        WellKnownSymbol::Match,
        WellKnownSymbol::MatchAll,
        WellKnownSymbol::Replace,
        WellKnownSymbol::Search,
        WellKnownSymbol::Species,
        WellKnownSymbol::Split,
        WellKnownSymbol::ToPrimitive,
        WellKnownSymbol::ToStringTag,
        WellKnownSymbol::Unscopables,
    ];

    /// Well-known symbols occupy ids 1..=13
    pub fn id(self) -> u64 {
        self as u64 + 1
    }

    /// Description as printed by `Symbol.prototype.toString`
    pub fn description(self) -> &'static str {
        match self {
            WellKnownSymbol::AsyncIterator => "Symbol.asyncIterator",
            WellKnownSymbol::HasInstance => "Symbol.hasInstance",
            WellKnownSymbol::IsConcatSpreadable => "Symbol.isConcatSpreadable",
            WellKnownSymbol::Iterator => "Symbol.iterator",
            WellKnownSymbol::Match => "Symbol.match",
            WellKnownSymbol::MatchAll => "Symbol.matchAll",
            WellKnownSymbol::Replace => "Symbol.replace",
            WellKnownSymbol::Search => "Symbol.search",
            WellKnownSymbol::Species => "Symbol.species",
            WellKnownSymbol::Split => "Symbol.split",
            WellKnownSymbol::ToPrimitive => "Symbol.toPrimitive",
            WellKnownSymbol::ToStringTag => "Symbol.toStringTag",
            WellKnownSymbol::Unscopables => "Symbol.unscopables",
        }
    }

    fn from_id(id: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.id() == id)
    }
}

/// A symbol primitive. Two symbols are the same symbol iff their ids match.
#[derive(Clone)]
pub struct Symbol {
    id: u64,
    description: Option<Rc<str>>,
}

impl Symbol {
    /// Create a fresh, unique symbol
    pub fn new(description: Option<&str>) -> Self {
        Self {
            id: SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
            description: description.map(Rc::from),
        }
    }

    /// The shared instance of a well-known symbol
    pub fn well_known(symbol: WellKnownSymbol) -> Self {
        Self {
            id: symbol.id(),
            description: Some(Rc::from(symbol.description())),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Which well-known symbol this is, if any
    pub fn as_well_known(&self) -> Option<WellKnownSymbol> {
        WellKnownSymbol::from_id(self.id)
    }

    pub fn is_well_known(&self) -> bool {
        self.as_well_known().is_some()
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description().unwrap_or(""))
    }
}

/// A property key: either a string or a symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    String(String),
    Symbol(Symbol),
}

impl PropertyKey {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyKey::String(s) => Some(s),
            PropertyKey::Symbol(_) => None,
        }
    }

    pub fn is_symbol(&self) -> bool {
        matches!(self, PropertyKey::Symbol(_))
    }

    /// Array index interpretation of a string key (`"0"`, `"17"`, not `"01"`)
    pub fn as_index(&self) -> Option<usize> {
        let s = self.as_str()?;
        if s.is_empty() || (s.len() > 1 && s.starts_with('0')) {
            return None;
        }
        s.parse().ok()
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::String(s) => f.write_str(s),
            PropertyKey::Symbol(sym) => write!(f, "{:?}", sym),
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        PropertyKey::String(s.to_string())
    }
}

impl From<String> for PropertyKey {
    fn from(s: String) -> Self {
        PropertyKey::String(s)
    }
}

impl From<Symbol> for PropertyKey {
    fn from(sym: Symbol) -> Self {
        PropertyKey::Symbol(sym)
    }
}

impl From<WellKnownSymbol> for PropertyKey {
    fn from(sym: WellKnownSymbol) -> Self {
        PropertyKey::Symbol(Symbol::well_known(sym))
    }
}

bitflags! {
    /// Attribute flags of a property descriptor.
    /// `WRITABLE` is meaningless on accessors and is ignored there.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PropertyFlags: u8 {
        const WRITABLE = 0b001;
        const ENUMERABLE = 0b010;
        const CONFIGURABLE = 0b100;
    }
}

impl PropertyFlags {
    /// Flags of a property created by plain assignment
    pub const DEFAULT: PropertyFlags = PropertyFlags::all();
    /// Writable and configurable but hidden from enumeration (built-in slots)
    pub const HIDDEN: PropertyFlags =
        PropertyFlags::WRITABLE.union(PropertyFlags::CONFIGURABLE);
}

/// A property descriptor
#[derive(Debug, Clone)]
pub enum Property {
    /// Data descriptor: has a value
    Data { value: Value, flags: PropertyFlags },
    /// Accessor descriptor: has a getter and/or a setter
    Accessor {
        get: Option<Value>,
        set: Option<Value>,
        flags: PropertyFlags,
    },
}

impl Property {
    /// An ordinary assigned property (writable, enumerable, configurable)
    pub fn data(value: Value) -> Self {
        Property::Data {
            value,
            flags: PropertyFlags::DEFAULT,
        }
    }

    pub fn data_with_flags(value: Value, flags: PropertyFlags) -> Self {
        Property::Data { value, flags }
    }

    pub fn accessor(get: Option<Value>, set: Option<Value>, flags: PropertyFlags) -> Self {
        Property::Accessor {
            get,
            set,
            flags: flags - PropertyFlags::WRITABLE,
        }
    }

    pub fn flags(&self) -> PropertyFlags {
        match self {
            Property::Data { flags, .. } | Property::Accessor { flags, .. } => *flags,
        }
    }

    pub fn is_accessor(&self) -> bool {
        matches!(self, Property::Accessor { .. })
    }

    pub fn is_enumerable(&self) -> bool {
        self.flags().contains(PropertyFlags::ENUMERABLE)
    }

    /// A data property with every flag set, i.e. one that plain assignment could have made
    pub fn is_plain_data(&self) -> bool {
        matches!(self, Property::Data { flags, .. } if *flags == PropertyFlags::DEFAULT)
    }

    /// The stored value of a data property
    pub fn value(&self) -> Option<&Value> {
        match self {
            Property::Data { value, .. } => Some(value),
            Property::Accessor { .. } => None,
        }
    }
}

/// Insertion-ordered own-property table
pub type PropertyMap = IndexMap<PropertyKey, Property, FxBuildHasher>;

/// Own keys in reflection order: string keys first, then symbol keys, each in insertion order
pub fn own_keys(properties: &PropertyMap) -> Vec<PropertyKey> {
    let strings = properties.keys().filter(|k| !k.is_symbol());
    let symbols = properties.keys().filter(|k| k.is_symbol());
    strings.chain(symbols).cloned().collect()
}
