use crate::host::ArenaHost;

/// The state every imported primitive runs against.
#[derive(Clone, Debug, Default)]
pub struct Env {
    pub arena: ArenaHost,
}

impl Env {
    pub fn new(arena: ArenaHost) -> Self {
        Self { arena }
    }
}
