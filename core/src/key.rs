//! Keys of the Merkle-Patricia map and the bit-prefix arithmetic over them.
//!
//! Every node of the map trie is addressed by a [`DbKey`]: a leaf carries the full 256-bit
//! [`Key`] it stores a value for, while a branch carries the bit-prefix shared by both of its
//! sub-tries together with the number of significant bits in that prefix.
//!
//! Bit `i` of a key path is bit `i % 8` of byte `i / 8`, counted from the least significant bit
//! of the byte. "First" and "most significant" always refer to path order.

use core::{cmp::Ordering, fmt};

use bitvec::prelude::*;

use crate::error::MalformedKey;

/// Size of a user key in bytes.
pub const KEY_SIZE: usize = 32;

/// Size of a user key in bits.
pub const KEY_SIZE_BITS: u16 = 256;

/// Size of the raw encoding of a [`DbKey`]: a tag byte, the key slice and the number of
/// significant bits.
pub const DB_KEY_SIZE: usize = KEY_SIZE + 2;

/// A key of the map. All keys have a fixed length of 256 bits.
pub type Key = [u8; KEY_SIZE];

/// The kind of trie node a [`DbKey`] addresses. The discriminant is the tag byte of the raw
/// encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// An internal node; the key is the common prefix of both sub-tries.
    Branch = 0,
    /// A leaf node; the key is the full user key.
    Leaf = 1,
}

impl KeyKind {
    fn from_tag(tag: u8) -> Result<Self, MalformedKey> {
        match tag {
            0 => Ok(KeyKind::Branch),
            1 => Ok(KeyKind::Leaf),
            _ => Err(MalformedKey::UnknownTag(tag)),
        }
    }
}

/// How thoroughly branch keys are validated.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum KeyChecks {
    /// Reject branch keys that have set bits after their significant bits.
    #[default]
    Strict,
    /// Only check that the number of significant bits is in range.
    ///
    /// This skips a scan over the key slice and is meant for callers who obtain their keys
    /// from a trusted source.
    Relaxed,
}

/// A database key of a map proof node.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DbKey {
    kind: KeyKind,
    slice: Key,
    significant_bits: u16,
}

impl DbKey {
    /// Create a leaf key for the given user key.
    pub fn leaf(key: Key) -> Self {
        DbKey {
            kind: KeyKind::Leaf,
            slice: key,
            significant_bits: KEY_SIZE_BITS,
        }
    }

    /// Create a branch key from a key slice and the number of its significant bits, which must
    /// be in range `0..256`. No bit after the significant ones may be set.
    pub fn branch(slice: Key, significant_bits: u16) -> Result<Self, MalformedKey> {
        Self::branch_with_checks(slice, significant_bits, KeyChecks::Strict)
    }

    /// Create a branch key, validating the slice according to `checks`.
    pub fn branch_with_checks(
        slice: Key,
        significant_bits: u16,
        checks: KeyChecks,
    ) -> Result<Self, MalformedKey> {
        if significant_bits >= KEY_SIZE_BITS {
            return Err(MalformedKey::BitsOutOfRange(significant_bits));
        }
        let key = DbKey {
            kind: KeyKind::Branch,
            slice,
            significant_bits,
        };
        key.validate(checks)?;
        Ok(key)
    }

    /// Parse a key from its raw 34-byte encoding.
    pub fn from_raw(raw: &[u8], checks: KeyChecks) -> Result<Self, MalformedKey> {
        if raw.len() != DB_KEY_SIZE {
            return Err(MalformedKey::InvalidSize(raw.len()));
        }
        let kind = KeyKind::from_tag(raw[0])?;
        let mut slice = [0u8; KEY_SIZE];
        slice.copy_from_slice(&raw[1..=KEY_SIZE]);
        let last = raw[DB_KEY_SIZE - 1];

        match kind {
            KeyKind::Leaf if last != 0 => Err(MalformedKey::LeafLengthByte(last)),
            KeyKind::Leaf => Ok(DbKey::leaf(slice)),
            KeyKind::Branch => DbKey::branch_with_checks(slice, last as u16, checks),
        }
    }

    /// The raw encoding of this key. Leaves store `0` as their number of significant bits.
    pub fn to_raw(&self) -> [u8; DB_KEY_SIZE] {
        let mut raw = [0u8; DB_KEY_SIZE];
        raw[0] = self.kind as u8;
        raw[1..=KEY_SIZE].copy_from_slice(&self.slice);
        raw[DB_KEY_SIZE - 1] = match self.kind {
            KeyKind::Leaf => 0,
            // significant bits of a branch are always below 256.
            KeyKind::Branch => self.significant_bits as u8,
        };
        raw
    }

    /// Check the invariants of this key.
    ///
    /// Leaves are always well-formed. Strict checks additionally reject branch keys with set
    /// bits beyond their significant bits.
    pub fn validate(&self, checks: KeyChecks) -> Result<(), MalformedKey> {
        if self.kind == KeyKind::Leaf || checks == KeyChecks::Relaxed {
            return Ok(());
        }
        let trailing = &self.slice.view_bits::<Lsb0>()[self.significant_bits as usize..];
        if trailing.any() {
            return Err(MalformedKey::TrailingBits {
                significant_bits: self.significant_bits,
            });
        }
        Ok(())
    }

    /// The kind of node this key addresses.
    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    /// Whether this is a leaf key.
    pub fn is_leaf(&self) -> bool {
        self.kind == KeyKind::Leaf
    }

    /// The full key slice. Only the first [`DbKey::significant_bits`] bits are meaningful.
    pub fn slice(&self) -> &Key {
        &self.slice
    }

    /// The number of significant bits: 256 for leaves, `0..256` for branches.
    pub fn significant_bits(&self) -> u16 {
        self.significant_bits
    }

    /// The significant bits of the key, in path order.
    pub fn bits(&self) -> &BitSlice<u8, Lsb0> {
        &self.slice.view_bits::<Lsb0>()[..self.significant_bits as usize]
    }

    /// The branch key covering the longest common bit-prefix of `self` and `other`.
    ///
    /// If both keys are equal, `self` is returned unchanged.
    pub fn common_prefix(&self, other: &DbKey) -> DbKey {
        if self == other {
            return *self;
        }
        let len = shared_bits(self.bits(), other.bits());
        debug_assert!(len < KEY_SIZE_BITS as usize);

        let mut slice = [0u8; KEY_SIZE];
        slice.view_bits_mut::<Lsb0>()[..len].copy_from_bitslice(&self.bits()[..len]);
        DbKey {
            kind: KeyKind::Branch,
            slice,
            significant_bits: len as u16,
        }
    }

    /// Whether this key is a prefix of `other`. Every key is a prefix of itself.
    pub fn is_prefix_of(&self, other: &DbKey) -> bool {
        self.significant_bits <= other.significant_bits
            && self.bits() == &other.bits()[..self.significant_bits as usize]
    }
}

fn shared_bits(a: &BitSlice<u8, Lsb0>, b: &BitSlice<u8, Lsb0>) -> usize {
    a.iter()
        .by_vals()
        .zip(b.iter().by_vals())
        .take_while(|(a, b)| a == b)
        .count()
}

impl Ord for DbKey {
    /// Keys are compared bit by bit in path order, up to the length of the shorter key. The
    /// first differing bit decides (`0 < 1`). If there is none, the shorter key, being a
    /// prefix of the other, is the lesser one.
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b) = (self.bits(), other.bits());
        let shared = shared_bits(a, b);
        if shared < a.len() && shared < b.len() {
            return a[shared].cmp(&b[shared]);
        }
        self.significant_bits
            .cmp(&other.significant_bits)
            // only distinguishes relaxed keys with garbage after their significant bits.
            .then_with(|| self.slice.cmp(&other.slice))
    }
}

impl PartialOrd for DbKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for DbKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            KeyKind::Leaf => write!(f, "Leaf(0x{})", hex::encode(self.slice)),
            KeyKind::Branch => write!(
                f,
                "Branch(0x{}/{})",
                hex::encode(self.slice),
                self.significant_bits
            ),
        }
    }
}

impl fmt::Display for DbKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(feature = "borsh")]
impl borsh::BorshSerialize for DbKey {
    fn serialize<W: borsh::io::Write>(&self, writer: &mut W) -> borsh::io::Result<()> {
        writer.write_all(&self.to_raw())
    }
}

// Bit-level checks are left to the verifier, which applies its configured `KeyChecks`.
#[cfg(feature = "borsh")]
impl borsh::BorshDeserialize for DbKey {
    fn deserialize_reader<R: borsh::io::Read>(reader: &mut R) -> borsh::io::Result<Self> {
        let mut raw = [0u8; DB_KEY_SIZE];
        reader.read_exact(&mut raw)?;
        DbKey::from_raw(&raw, KeyChecks::Relaxed).map_err(|_| {
            borsh::io::Error::new(
                borsh::io::ErrorKind::InvalidData,
                "malformed database key",
            )
        })
    }
}
