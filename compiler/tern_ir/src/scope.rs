//! Static blocks: the compile-time scope chain.
//!
//! Every scope-owning node carries a [`ScopeId`] into the scope table of its
//! [`Ast`]. A static block holds a [`Block`] whose slots record the static
//! type (and, for constants and types, the value) of each declared name, plus
//! the name-to-index map that resolves names to [`ValuePath`]s.
//!
//! Name-based lookups walk the chain and are meant for preprocessing only.
//! Evaluation uses the path-based accessors, which cost a fixed number of
//! hops.

use rustc_hash::FxHashMap;
use tern_realm::ObjectCell;

use crate::{
    Ast, Block, BlockRef, Name, NodeId, ScopeError, ScopeId, SlotRef, Type, TypedValue, ValuePath,
};

/// Static scope of a block node.
#[derive(Debug)]
pub struct StaticBlock {
    source: NodeId,
    parent: Option<ScopeId>,
    /// `None` until initialized.
    block: Option<BlockRef>,
    names: Vec<Name>,
    index: FxHashMap<Name, u16>,
    num_names: u16,
}

impl StaticBlock {
    pub(crate) fn new(source: NodeId) -> Self {
        StaticBlock {
            source,
            parent: None,
            block: None,
            names: Vec::new(),
            index: FxHashMap::default(),
            num_names: 0,
        }
    }

    #[inline]
    pub fn source(&self) -> NodeId {
        self.source
    }

    #[inline]
    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.block.is_some()
    }

    /// The underlying block holding static types and constant values.
    #[inline]
    pub fn block(&self) -> Option<&BlockRef> {
        self.block.as_ref()
    }

    /// Declared names in slot order.
    #[inline]
    pub fn names(&self) -> &[Name] {
        &self.names
    }

    #[inline]
    pub fn num_names(&self) -> u16 {
        self.num_names
    }

    #[inline]
    pub fn local_index(&self, name: Name) -> Option<u16> {
        self.index.get(&name).copied()
    }
}

impl Ast {
    /// Attach an empty block to `scope`, linked to the block of `parent`.
    pub fn init_static_block(
        &mut self,
        scope: ScopeId,
        parent: Option<ScopeId>,
    ) -> Result<(), ScopeError> {
        if self.scopes[scope.index()].is_initialized() {
            return Err(ScopeError::AlreadyInitialized { scope });
        }
        let parent_block = match parent {
            Some(p) => Some(self.scope_block(p)?.clone()),
            None => None,
        };
        let sb = &mut self.scopes[scope.index()];
        sb.block = Some(ObjectCell::new(Block::new(Some(sb.source), parent_block)));
        sb.parent = parent;
        sb.names.clear();
        sb.index.clear();
        sb.num_names = 0;
        tracing::trace!(?scope, ?parent, "initialized static block");
        Ok(())
    }

    #[inline]
    pub fn static_block(&self, scope: ScopeId) -> &StaticBlock {
        &self.scopes[scope.index()]
    }

    #[inline]
    pub fn parent_scope(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope.index()].parent
    }

    #[inline]
    pub fn names(&self, scope: ScopeId) -> &[Name] {
        self.scopes[scope.index()].names()
    }

    #[inline]
    pub fn num_names(&self, scope: ScopeId) -> u16 {
        self.scopes[scope.index()].num_names
    }

    #[inline]
    pub fn local_index(&self, scope: ScopeId, name: Name) -> Option<u16> {
        self.scopes[scope.index()].local_index(name)
    }

    fn scope_block(&self, scope: ScopeId) -> Result<&BlockRef, ScopeError> {
        self.scopes[scope.index()]
            .block
            .as_ref()
            .ok_or(ScopeError::Uninitialized { scope })
    }

    /// Declare `name` in `scope`, or complete an earlier declaration.
    ///
    /// A name goes through at most three states: reserved (no type), typed,
    /// typed with a value. Each call must move it forward; anything else is an
    /// error. Returns the local index.
    pub fn define(
        &mut self,
        scope: ScopeId,
        name: Name,
        tv: TypedValue,
    ) -> Result<u16, ScopeError> {
        tracing::trace!(?scope, %name, value = %tv, "define");
        if name.is_empty() {
            return Err(ScopeError::EmptyName);
        }
        let sb = &mut self.scopes[scope.index()];
        let block = sb.block.clone().ok_or(ScopeError::Uninitialized { scope })?;
        if sb.names.len() != usize::from(sb.num_names) || sb.index.len() != sb.names.len() {
            return Err(ScopeError::NameCountMismatch {
                names: sb.index.len(),
                num_names: sb.num_names,
            });
        }
        if tv.t.is_none() && !tv.v.is_none() {
            return Err(ScopeError::ValueWithoutType { name });
        }

        if let Some(index) = sb.index.get(&name).copied() {
            let Some(new_t) = tv.t.as_ref() else {
                return Err(ScopeError::RedefinitionWithoutType { name });
            };
            let mut block = block.borrow_mut();
            let slot = block
                .get_mut(usize::from(index))
                .ok_or(ScopeError::NameCountMismatch {
                    names: sb.names.len(),
                    num_names: sb.num_names,
                })?;
            if let Some(old_t) = slot.t.as_ref() {
                if old_t != new_t {
                    return Err(ScopeError::TypeChanged {
                        name,
                        old: old_t.to_string(),
                        new: new_t.to_string(),
                    });
                }
                if !slot.v.is_none() && !slot.v.identical(&tv.v) {
                    return Err(ScopeError::ValueChanged { name });
                }
                // Typed already: only a first value may be attached.
                if !slot.v.is_none() || tv.v.is_none() {
                    return Err(ScopeError::AlreadyDefined { name });
                }
            }
            *slot = tv;
            return Ok(index);
        }

        if sb.num_names == u16::MAX {
            return Err(ScopeError::TooManyNames { name });
        }
        let index = sb.num_names;
        sb.index.insert(name, index);
        sb.names.push(name);
        sb.num_names += 1;
        block.borrow_mut().push(tv);
        Ok(index)
    }

    /// Resolve `name` from `scope`: one generation per hop, starting at 1.
    pub fn path_for_name(&self, scope: ScopeId, name: Name) -> Result<ValuePath, ScopeError> {
        if cfg!(debug_assertions) && name.is_blank() {
            return Err(ScopeError::BlankName);
        }
        let mut generation: u16 = 1;
        let mut current = Some(scope);
        while let Some(s) = current {
            if let Some(index) = self.local_index(s, name) {
                return Ok(ValuePath::new(name, generation, index));
            }
            current = self.parent_scope(s);
            if current.is_some() {
                generation = generation
                    .checked_add(1)
                    .ok_or(ScopeError::ChainTooDeep { name })?;
            }
        }
        Err(ScopeError::Undeclared { name })
    }

    /// Slot declaring `name`, found by walking the chain.
    ///
    /// `None` when `name` is not declared or the chain is not initialized.
    pub fn value_ref(&self, scope: ScopeId, name: Name) -> Option<SlotRef> {
        let mut current = Some(scope);
        while let Some(s) = current {
            if let Some(index) = self.local_index(s, name) {
                let block = self.scopes[s.index()].block.clone()?;
                return Some(SlotRef {
                    block,
                    index: usize::from(index),
                });
            }
            current = self.parent_scope(s);
        }
        None
    }

    /// Static type of `name`; `None` while it is only reserved.
    pub fn static_type_of(&self, scope: ScopeId, name: Name) -> Result<Option<Type>, ScopeError> {
        self.value_ref(scope, name)
            .map(|slot| slot.ty())
            .ok_or(ScopeError::Undeclared { name })
    }

    /// Slot at `path`, relative to `scope`.
    pub fn value_ref_at(&self, scope: ScopeId, path: ValuePath) -> Result<SlotRef, ScopeError> {
        SlotRef::resolve(self.scope_block(scope)?, path)
    }

    pub fn static_type_of_at(
        &self,
        scope: ScopeId,
        path: ValuePath,
    ) -> Result<Option<Type>, ScopeError> {
        Ok(self.value_ref_at(scope, path)?.ty())
    }

    /// A fresh run-time block for `scope`, child of `parent`.
    ///
    /// Constants and type values are carried over; variables start at the zero
    /// value of their static type.
    pub fn instantiate(
        &self,
        scope: ScopeId,
        parent: Option<BlockRef>,
    ) -> Result<BlockRef, ScopeError> {
        let sb = &self.scopes[scope.index()];
        let block = self.scope_block(scope)?.borrow();
        let values = block
            .values()
            .iter()
            .map(|tv| match &tv.t {
                Some(_) if !tv.v.is_none() => tv.copy(),
                Some(t) => TypedValue::zero(t),
                None => TypedValue::UNDEFINED,
            })
            .collect();
        Ok(ObjectCell::new(Block::with_values(
            Some(sb.source),
            values,
            parent,
        )))
    }
}

#[cfg(test)]
mod tests;
