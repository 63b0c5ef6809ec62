//! Persistent identities.
//!
//! An [`ObjectId`] is a realm identifier followed by a per-realm ordinal. The
//! zero id means "not yet persisted".

use std::fmt;

use sha2::{Digest, Sha256};

use crate::RealmError;

/// Width of realm identifiers and value hashes, in bytes.
pub const HASH_SIZE: usize = 20;

/// Width of an encoded [`ObjectId`]: realm bytes then an 8-byte ordinal.
pub const OBJECT_ID_SIZE: usize = HASH_SIZE + 8;

/// Identifier of a persistence domain.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RealmId([u8; HASH_SIZE]);

impl RealmId {
    /// The zero realm. Objects under it are not persisted.
    pub const ZERO: RealmId = RealmId([0; HASH_SIZE]);

    pub const fn from_bytes(bytes: [u8; HASH_SIZE]) -> Self {
        RealmId(bytes)
    }

    /// Derive a realm id from a package path: the leading bytes of its SHA-256.
    pub fn from_path(path: &str) -> Self {
        let digest = Sha256::digest(path.as_bytes());
        let mut bytes = [0u8; HASH_SIZE];
        bytes.copy_from_slice(&digest[..HASH_SIZE]);
        RealmId(bytes)
    }

    #[inline]
    pub const fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == [0; HASH_SIZE]
    }
}

impl fmt::Debug for RealmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RealmId({})", hex::encode(self.0))
    }
}

impl fmt::Display for RealmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Content hash of a persisted value. Stale while the owning object is dirty.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct ValueHash([u8; HASH_SIZE]);

impl ValueHash {
    pub const ZERO: ValueHash = ValueHash([0; HASH_SIZE]);

    pub const fn from_bytes(bytes: [u8; HASH_SIZE]) -> Self {
        ValueHash(bytes)
    }

    #[inline]
    pub const fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == [0; HASH_SIZE]
    }
}

impl fmt::Debug for ValueHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueHash({})", hex::encode(self.0))
    }
}

/// Globally unique identity of a persisted object.
///
/// Ordered by realm then ordinal, which matches the byte order of
/// [`ObjectId::bytes`], so encoded ids sort the same way as decoded ones.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId {
    pub realm: RealmId,
    pub ordinal: u64,
}

impl ObjectId {
    pub const ZERO: ObjectId = ObjectId {
        realm: RealmId::ZERO,
        ordinal: 0,
    };

    pub const fn new(realm: RealmId, ordinal: u64) -> Self {
        ObjectId { realm, ordinal }
    }

    /// Canonical storage key: realm bytes followed by the big-endian ordinal.
    pub fn bytes(&self) -> [u8; OBJECT_ID_SIZE] {
        let mut bz = [0u8; OBJECT_ID_SIZE];
        bz[..HASH_SIZE].copy_from_slice(self.realm.as_bytes());
        bz[HASH_SIZE..].copy_from_slice(&self.ordinal.to_be_bytes());
        bz
    }

    /// Decode a key produced by [`ObjectId::bytes`].
    pub fn from_bytes(bz: &[u8]) -> Result<Self, RealmError> {
        if bz.len() != OBJECT_ID_SIZE {
            return Err(RealmError::InvalidIdLength {
                expected: OBJECT_ID_SIZE,
                got: bz.len(),
            });
        }
        let mut realm = [0u8; HASH_SIZE];
        realm.copy_from_slice(&bz[..HASH_SIZE]);
        let mut ordinal = [0u8; 8];
        ordinal.copy_from_slice(&bz[HASH_SIZE..]);
        Ok(ObjectId {
            realm: RealmId(realm),
            ordinal: u64::from_be_bytes(ordinal),
        })
    }

    /// True iff the realm component is zero.
    ///
    /// A zero realm always pairs with ordinal 0; debug builds check it.
    pub fn is_zero(&self) -> bool {
        let zero = self.realm.is_zero();
        debug_assert!(
            !zero || self.ordinal == 0,
            "object id with zero realm has ordinal {}",
            self.ordinal
        );
        zero
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({self})")
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.realm, self.ordinal)
    }
}

#[cfg(test)]
mod tests;
