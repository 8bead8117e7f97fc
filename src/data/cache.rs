use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Trained-model cache keyed by window fingerprint.
///
/// Entries are immutable once inserted. A hit must return exactly what a
/// fresh training run would have produced, so keys have to cover every
/// input of the training step, seed included.
pub struct ModelCache<V> {
    data: Mutex<HashMap<String, Arc<V>>>,
    capacity: usize,
}

impl<V> ModelCache<V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: Mutex::new(HashMap::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<V>> {
        self.lock().get(key).cloned()
    }

    pub fn set(&self, key: String, value: Arc<V>) {
        if self.capacity == 0 {
            return;
        }
        let mut data = self.lock();
        if data.len() >= self.capacity {
            // Clear everything when full.
            data.clear();
        }
        data.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<V>>> {
        match self.data.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
