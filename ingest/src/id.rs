use ulid::{Generator, Ulid};

/// Source of public identifiers for newly created rows.
pub trait IdGenerator {
    fn new_id(&mut self) -> String;
}

/// ULIDs, strictly increasing within one generator.
pub struct UlidGenerator {
    inner: Generator,
}

impl Default for UlidGenerator {
    fn default() -> Self {
        Self {
            inner: Generator::new(),
        }
    }
}

impl IdGenerator for UlidGenerator {
    fn new_id(&mut self) -> String {
        // the monotonic generator only fails once the random part of a single
        // millisecond is exhausted
        self.inner
            .generate()
            .unwrap_or_else(|_| Ulid::new())
            .to_string()
    }
}
