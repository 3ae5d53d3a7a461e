use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdGenerationError {
    #[error("system clock reads before the UNIX epoch")]
    ClockBeforeEpoch,
    #[error("generated identifier is nil")]
    Nil,
    #[error("generated identifier {generated} does not sort after {previous}")]
    NotMonotonic { previous: Uuid, generated: Uuid },
}

/// Source of unique, time-ordered identifiers.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> Result<String, IdGenerationError>;
}

/// UUIDv7 generator that refuses to hand out an id which does not sort
/// strictly after the previous one it issued.
#[derive(Debug)]
pub struct UuidV7Generator {
    last: Mutex<Uuid>,
}

impl UuidV7Generator {
    pub fn new() -> Self {
        Self {
            last: Mutex::new(Uuid::nil()),
        }
    }
}

impl Default for UuidV7Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for UuidV7Generator {
    fn generate(&self) -> Result<String, IdGenerationError> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| IdGenerationError::ClockBeforeEpoch)?;

        // Generate under the lock so issue order and comparison order agree.
        let mut last = self.last.lock();
        let generated = Uuid::now_v7();

        if generated.is_nil() {
            return Err(IdGenerationError::Nil);
        }
        if generated <= *last {
            return Err(IdGenerationError::NotMonotonic {
                previous: *last,
                generated,
            });
        }

        *last = generated;
        Ok(generated.to_string())
    }
}
