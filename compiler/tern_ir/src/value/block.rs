//! Run-time scope blocks.

use std::fmt;

use tern_realm::{ObjectCell, ObjectInfo};

use super::{BlockRef, TypedValue};
use crate::{NodeId, ScopeError, Type, ValuePath};

/// Slots of one scope instance, linked to the enclosing block.
pub struct Block {
    info: ObjectInfo,
    source: Option<NodeId>,
    values: Vec<TypedValue>,
    parent: Option<BlockRef>,
    /// Created by `&T{...}` rather than by entering a scope.
    heap_item: bool,
}

impl Block {
    pub fn new(source: Option<NodeId>, parent: Option<BlockRef>) -> Self {
        Block {
            info: ObjectInfo::new(),
            source,
            values: Vec::new(),
            parent,
            heap_item: false,
        }
    }

    pub fn with_values(
        source: Option<NodeId>,
        values: Vec<TypedValue>,
        parent: Option<BlockRef>,
    ) -> Self {
        Block {
            info: ObjectInfo::new(),
            source,
            values,
            parent,
            heap_item: false,
        }
    }

    /// A parentless one-slot block holding `tv`, used as the target of
    /// `&T{...}`.
    pub fn heap_item(tv: TypedValue) -> BlockRef {
        let mut block = Block::with_values(None, vec![tv], None);
        block.heap_item = true;
        ObjectCell::new(block)
    }

    #[inline]
    pub fn is_heap_item(&self) -> bool {
        self.heap_item
    }

    #[inline]
    pub fn source(&self) -> Option<NodeId> {
        self.source
    }

    #[inline]
    pub fn parent(&self) -> Option<&BlockRef> {
        self.parent.as_ref()
    }

    #[inline]
    pub fn values(&self) -> &[TypedValue] {
        &self.values
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn push(&mut self, tv: TypedValue) {
        self.values.push(tv);
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&TypedValue> {
        self.values.get(index)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut TypedValue> {
        self.values.get_mut(index)
    }
}

impl_object!(Block, "block");

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("source", &self.source)
            .field("values", &self.values)
            .field("has_parent", &self.parent.is_some())
            .field("heap_item", &self.heap_item)
            .finish_non_exhaustive()
    }
}

/// One addressable slot of a block.
#[derive(Clone)]
pub struct SlotRef {
    pub block: BlockRef,
    pub index: usize,
}

impl SlotRef {
    /// Resolve `path` starting at `block`: `depth - 1` parent hops, then
    /// `index`. Depth 0 belongs to the universe and is not resolvable here.
    pub fn resolve(block: &BlockRef, path: ValuePath) -> Result<SlotRef, ScopeError> {
        if path.depth == 0 {
            return Err(ScopeError::InvalidPath { path });
        }
        let mut current = block.clone();
        for _ in 1..path.depth {
            let parent = current.borrow().parent.clone();
            current = parent.ok_or(ScopeError::InvalidPath { path })?;
        }
        let index = usize::from(path.index);
        if index >= current.borrow().values.len() {
            return Err(ScopeError::InvalidPath { path });
        }
        Ok(SlotRef {
            block: current,
            index,
        })
    }

    /// The slot's value, sharing any heap payload.
    pub fn get(&self) -> TypedValue {
        self.block
            .borrow()
            .values
            .get(self.index)
            .cloned()
            .unwrap_or_default()
    }

    pub fn ty(&self) -> Option<Type> {
        self.block
            .borrow()
            .values
            .get(self.index)
            .and_then(|tv| tv.t.clone())
    }

    /// Store `tv`, returning the previous value.
    pub fn set(&self, tv: TypedValue) -> TypedValue {
        let mut block = self.block.borrow_mut();
        match block.values.get_mut(self.index) {
            Some(slot) => std::mem::replace(slot, tv),
            None => TypedValue::UNDEFINED,
        }
    }

    /// Whether both refer to the same slot of the same block.
    pub fn same_slot(&self, other: &SlotRef) -> bool {
        self.block.ptr_eq(&other.block) && self.index == other.index
    }
}

impl fmt::Debug for SlotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlotRef(#{})", self.index)
    }
}
