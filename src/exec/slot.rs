// src/exec/slot.rs

use crate::exec::pool::BackgroundTask;
use crate::errors::Result;

/// A value in an eager run: either realized, or still computing on a worker.
#[derive(Debug)]
pub enum Slot<V> {
    Ready(V),
    Pending(BackgroundTask<V>),
}

impl<V> Slot<V> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Slot::Ready(_))
    }

    /// Join a pending task in place and return the value.
    ///
    /// Idempotent: forcing a ready slot just returns its value.
    pub async fn force(&mut self) -> Result<&V> {
        if let Slot::Pending(task) = self {
            let value = task.join().await?;
            *self = Slot::Ready(value);
        }

        match self {
            Slot::Ready(value) => Ok(value),
            Slot::Pending(_) => unreachable!("pending slot was just replaced"),
        }
    }

    /// Consume the slot, joining it if needed.
    pub async fn resolve(self) -> Result<V> {
        match self {
            Slot::Ready(value) => Ok(value),
            Slot::Pending(mut task) => task.join().await,
        }
    }
}
