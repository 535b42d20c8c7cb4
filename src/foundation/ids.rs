/// Source of fresh clip and word identifiers.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Random v4 UUIDs; the default for interactive editing.
#[derive(Debug, Default)]
pub struct UuidIdGen;

impl IdGenerator for UuidIdGen {
    fn next_id(&mut self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Deterministic sequential ID generator for tests and golden-file snapshots
/// where stable, reproducible clip IDs are required.
#[derive(Debug, Default)]
pub struct SequentialIdGen(u64);

impl SequentialIdGen {
    pub fn new() -> Self {
        Self(0)
    }

    /// Start counting from `first`.
    pub fn starting_at(first: u64) -> Self {
        Self(first)
    }
}

impl IdGenerator for SequentialIdGen {
    fn next_id(&mut self) -> String {
        let id = self.0;
        self.0 += 1;
        id.to_string()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/ids.rs"]
mod tests;
