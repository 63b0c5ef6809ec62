//! Per-realm identity assignment and ownership updates.
//!
//! The commit and collection steps live outside this crate. What lives here is
//! the bookkeeping they consume: which objects became new reals, which real
//! objects went dirty, and which real objects lost their last reference.

use crate::{same_object, ObjectId, ObjectRef, RealmError, RealmId};

/// Objects touched since the last [`Realm::take_changes`].
#[derive(Debug, Default)]
pub struct RealmChanges {
    pub created: Vec<ObjectRef>,
    pub updated: Vec<ObjectRef>,
    pub deleted: Vec<ObjectRef>,
}

impl RealmChanges {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }
}

/// A persistence domain.
#[derive(Debug)]
pub struct Realm {
    id: RealmId,
    path: String,
    /// Last ordinal handed out; ordinals start at 1.
    ordinal: u64,
    changes: RealmChanges,
}

impl Realm {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        Realm {
            id: RealmId::from_path(&path),
            path,
            ordinal: 0,
            changes: RealmChanges::default(),
        }
    }

    #[inline]
    pub fn id(&self) -> RealmId {
        self.id
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Give `obj` the next identity in this realm, making it real.
    pub fn assign_new_id(&mut self, obj: &ObjectRef) -> Result<ObjectId, RealmError> {
        let mut guard = obj.borrow_mut();
        let info = guard.object_info_mut();
        if info.is_real() {
            return Err(RealmError::AlreadyReal { id: info.id });
        }
        self.ordinal += 1;
        let id = ObjectId::new(self.id, self.ordinal);
        info.id = id;
        info.set_is_new_real(false);
        tracing::debug!(%id, realm = %self.path, "assigned object id");
        Ok(id)
    }

    /// Record that a slot of `parent` changed from `old` to `new`.
    ///
    /// - `new` gains a reference and takes `parent` as owner if it has none.
    ///   An unowned `new` that is `parent` or one of its owners stays
    ///   unowned, so owner chains never loop. It is marked new-real when
    ///   `parent` is real.
    /// - `old` loses a reference; if that was its last one and it is real, it
    ///   is marked deleted. An owner link to `parent` is cleared.
    /// - A real `parent` is marked dirty.
    ///
    /// Nothing is changed when `old` has no reference left to release.
    /// No `RefCell` involved may be borrowed by the caller.
    pub fn did_update(
        &mut self,
        parent: &ObjectRef,
        old: Option<&ObjectRef>,
        new: Option<&ObjectRef>,
    ) -> Result<(), RealmError> {
        if let (Some(o), Some(n)) = (old, new) {
            if same_object(o, n) {
                return Ok(());
            }
        }
        if let Some(o) = old {
            let guard = o.borrow();
            let info = guard.object_info();
            if info.ref_count() == 0 {
                return Err(RealmError::NegativeRefCount { id: info.object_id() });
            }
        }

        let parent_real = parent.borrow().object_info().is_real();

        if let Some(n) = new {
            let take_owner =
                !n.borrow().object_info().is_owned() && !is_owner_chain_member(parent, n);
            let mut guard = n.borrow_mut();
            let info = guard.object_info_mut();
            info.inc_ref_count();
            if take_owner {
                info.set_owner(Some(parent));
            }
            if parent_real && !info.is_real() && !info.is_new_real() {
                info.set_is_new_real(true);
                self.changes.created.push(n.clone());
            }
        }

        if let Some(o) = old {
            let mut guard = o.borrow_mut();
            let info = guard.object_info_mut();
            let remaining = info.dec_ref_count()?;
            if remaining == 0 {
                if info.is_owned_by(parent) {
                    info.set_owner(None);
                }
                if info.is_real() && !info.is_deleted() {
                    info.set_is_deleted(true);
                    self.changes.deleted.push(o.clone());
                }
            }
        }

        if parent_real {
            let mut guard = parent.borrow_mut();
            let info = guard.object_info_mut();
            if !info.is_dirty() {
                info.set_is_dirty(true);
                self.changes.updated.push(parent.clone());
            }
        }

        tracing::trace!(
            parent = kind_of(parent),
            had_old = old.is_some(),
            has_new = new.is_some(),
            "ownership update"
        );
        Ok(())
    }

    pub fn changes(&self) -> &RealmChanges {
        &self.changes
    }

    /// Hand the pending changes to the commit step.
    pub fn take_changes(&mut self) -> RealmChanges {
        std::mem::take(&mut self.changes)
    }
}

fn kind_of(obj: &ObjectRef) -> &'static str {
    obj.try_borrow().map_or("<borrowed>", |o| o.object_kind())
}

/// Whether `obj` is `parent` or reachable from it through owner links.
fn is_owner_chain_member(parent: &ObjectRef, obj: &ObjectRef) -> bool {
    let mut cursor = Some(parent.clone());
    while let Some(current) = cursor {
        if same_object(&current, obj) {
            return true;
        }
        cursor = current.borrow().object_info().owner();
    }
    false
}
