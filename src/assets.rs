use std::sync::Arc;

use crate::texture::Texture;

/// State of an asynchronously loaded resource.
///
/// Loads resolve exactly once, to `Ready` or `Failed`; failure is a value the
/// caller can branch on, never a panic.
#[derive(Debug)]
pub enum Load<T> {
    Pending,
    Ready(T),
    Failed(String),
}

/// A slot a loader resolves into. Everything that consumes the resource must
/// check [`Slot::get`] first; acting on a pending or failed slot is the
/// caller's logged-no-op responsibility.
#[derive(Debug)]
pub struct Slot<T> {
    state: Load<T>,
}

impl<T> Slot<T> {
    pub fn new() -> Self {
        Self {
            state: Load::Pending,
        }
    }

    /// Slot that is ready from the start, for resources built synchronously.
    pub fn immediate(value: T) -> Self {
        Self {
            state: Load::Ready(value),
        }
    }

    /// Resolves the slot. A slot resolves exactly once; a second resolution
    /// is a logged no-op.
    pub fn resolve(&mut self, result: Result<T, String>) {
        if !matches!(self.state, Load::Pending) {
            log::warn!("asset slot resolved twice; keeping the first resolution");
            return;
        }
        self.state = match result {
            Ok(value) => Load::Ready(value),
            Err(message) => {
                log::error!("asset load failed: {message}");
                Load::Failed(message)
            }
        };
    }

    pub fn get(&self) -> Option<&T> {
        match &self.state {
            Load::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, Load::Pending)
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            Load::Failed(message) => Some(message),
            _ => None,
        }
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub type TextureSlot = Slot<Arc<Texture>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_resolves_once() {
        let mut slot: Slot<u32> = Slot::new();
        assert!(slot.is_pending());
        slot.resolve(Ok(7));
        assert_eq!(slot.get(), Some(&7));
        // Second resolution keeps the first value.
        slot.resolve(Ok(9));
        assert_eq!(slot.get(), Some(&7));
    }

    #[test]
    fn failed_slot_is_a_value_not_a_panic() {
        let mut slot: Slot<u32> = Slot::new();
        slot.resolve(Err("404".to_string()));
        assert!(slot.get().is_none());
        assert_eq!(slot.error(), Some("404"));
    }
}
