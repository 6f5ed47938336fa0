use parking_lot::RwLock;
use std::sync::Arc;

/// Owner of the current index snapshot.
///
/// Readers take an `Arc` to the snapshot and keep using it for the whole
/// request; a rebuild swaps in a new snapshot without touching the old one.
#[derive(Debug)]
pub struct IndexHandle<P> {
    current: RwLock<(u64, Arc<P>)>,
}

impl<P> IndexHandle<P> {
    pub fn new(provider: P) -> Self {
        Self { current: RwLock::new((0, Arc::new(provider))) }
    }

    pub fn snapshot(&self) -> Arc<P> {
        Arc::clone(&self.current.read().1)
    }

    pub fn generation(&self) -> u64 {
        self.current.read().0
    }

    /// Installs a rebuilt provider and returns its generation.
    pub fn replace(&self, provider: P) -> u64 {
        let mut guard = self.current.write();
        guard.0 += 1;
        guard.1 = Arc::new(provider);
        tracing::info!(generation = guard.0, "swapped index snapshot");
        guard.0
    }
}
