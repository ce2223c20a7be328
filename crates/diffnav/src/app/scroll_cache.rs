//! Per-file scroll positions for single-file views

use rustc_hash::FxHashMap;

#[derive(Debug, Default)]
pub struct ScrollCache {
    offsets: FxHashMap<String, usize>,
}

impl ScrollCache {
    pub fn save(&mut self, key: &str, offset: usize) {
        self.offsets.insert(key.to_string(), offset);
    }

    /// Saved offset for `key` (0 if none), clamped to `[0, max(total - height, 0)]`
    pub fn restore(&self, key: &str, total: usize, height: usize) -> usize {
        let saved = self.offsets.get(key).copied().unwrap_or(0);
        saved.min(total.saturating_sub(height))
    }

    pub fn clear(&mut self) {
        self.offsets.clear();
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }
}
