//! Machine configuration and construction.

use tern_ir::{Ast, Block, BlockRef};
use tern_realm::{ObjectCell, Realm};

use crate::{Machine, Universe};

/// Limits and checks applied by a [`Machine`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MachineConfig {
    /// Steps allowed per `run`/`eval`/`exec`; `None` is unbounded.
    pub max_steps: Option<u64>,
    /// Nested closure calls allowed at once.
    pub max_call_depth: usize,
    /// Verify that stacks are balanced after each top-level evaluation.
    pub check_invariants: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        MachineConfig {
            max_steps: None,
            max_call_depth: 1024,
            check_invariants: cfg!(debug_assertions),
        }
    }
}

/// Builder for [`Machine`].
///
/// ```text
/// let machine = MachineBuilder::new(&ast, &universe)
///     .config(MachineConfig { max_steps: Some(10_000), ..Default::default() })
///     .block(file_block)
///     .realm(Realm::new("tern.land/r/demo"))
///     .build();
/// ```
pub struct MachineBuilder<'a> {
    ast: &'a Ast,
    universe: &'a Universe,
    config: MachineConfig,
    block: Option<BlockRef>,
    realm: Option<Realm>,
}

impl<'a> MachineBuilder<'a> {
    pub fn new(ast: &'a Ast, universe: &'a Universe) -> Self {
        MachineBuilder {
            ast,
            universe,
            config: MachineConfig::default(),
            block: None,
            realm: None,
        }
    }

    #[must_use]
    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Block that depth-1 paths resolve against when nothing else is pushed.
    #[must_use]
    pub fn block(mut self, block: BlockRef) -> Self {
        self.block = Some(block);
        self
    }

    /// Realm receiving ownership updates. Without one no bookkeeping happens.
    #[must_use]
    pub fn realm(mut self, realm: Realm) -> Self {
        self.realm = Some(realm);
        self
    }

    pub fn build(self) -> Machine<'a> {
        let base = self
            .block
            .unwrap_or_else(|| ObjectCell::new(Block::new(None, None)));
        Machine::from_parts(self.ast, self.universe, self.config, base, self.realm)
    }
}
