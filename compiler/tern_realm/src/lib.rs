//! Tern Realm - object ownership and persistence tracking.
//!
//! Every heap-resident structured value (struct, array, map, block) carries an
//! [`ObjectInfo`]: its persistent identity, its last computed hash, a single
//! owner back-reference, a live reference count, and the new-real, dirty and
//! deleted flags the commit step uses to decide what to rehash and rewrite.
//!
//! This crate is pure bookkeeping. It defines and maintains the metadata; it
//! does not hash, serialize, or store anything.
//!
//! # Ownership tree
//!
//! Owners form a strict tree. The owner link is a weak back-reference
//! ([`OwnerRef`]); only the forward containment edges (a struct holding its
//! fields, a block holding its slots) keep objects alive.

mod errors;
mod id;
mod object;
mod realm;

pub use errors::RealmError;
pub use id::{ObjectId, RealmId, ValueHash, HASH_SIZE, OBJECT_ID_SIZE};
pub use object::{same_object, Object, ObjectCell, ObjectInfo, ObjectRef, OwnerRef};
pub use realm::{Realm, RealmChanges};
