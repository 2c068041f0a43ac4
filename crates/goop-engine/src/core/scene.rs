use crate::api::types::BlobId;
use crate::core::blob::SoftBlob;

/// Active blob storage using a flat Vec.
/// A board holds at most a few dozen goop groups, so lookups are linear.
pub struct BlobScene {
    blobs: Vec<SoftBlob>,
}

impl BlobScene {
    pub fn new() -> Self {
        Self {
            blobs: Vec::with_capacity(32),
        }
    }

    /// Add a blob. A blob already stored under the same id is replaced and
    /// returned.
    pub fn insert(&mut self, blob: SoftBlob) -> Option<SoftBlob> {
        let old = self.remove(&blob.id);
        self.blobs.push(blob);
        old
    }

    /// Remove a blob by id. Returns the removed blob if found.
    pub fn remove(&mut self, id: &BlobId) -> Option<SoftBlob> {
        let idx = self.blobs.iter().position(|b| &b.id == id)?;
        Some(self.blobs.remove(idx))
    }

    pub fn get(&self, id: &BlobId) -> Option<&SoftBlob> {
        self.blobs.iter().find(|b| &b.id == id)
    }

    pub fn get_mut(&mut self, id: &BlobId) -> Option<&mut SoftBlob> {
        self.blobs.iter_mut().find(|b| &b.id == id)
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &SoftBlob> {
        self.blobs.iter()
    }

    pub fn as_slice(&self) -> &[SoftBlob] {
        &self.blobs
    }

    pub fn as_mut_slice(&mut self) -> &mut [SoftBlob] {
        &mut self.blobs
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl Default for BlobScene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{GoopColor, GridCell};
    use crate::core::topology::build_topology;
    use glam::Vec2;

    fn blob(id: BlobId, x: i32, falling: bool) -> SoftBlob {
        let topo = build_topology(&[GridCell::new(x, 0)], 30.0, Vec2::ZERO);
        SoftBlob::new(id, GoopColor(0x33cc33), topo, falling)
    }

    #[test]
    fn insert_and_get() {
        let mut scene = BlobScene::new();
        scene.insert(blob(BlobId::locked("a"), 2, false));
        let b = scene.get(&BlobId::locked("a")).unwrap();
        assert_eq!(b.cells, vec![GridCell::new(2, 0)]);
        assert!(scene.get(&BlobId::locked("b")).is_none());
    }

    #[test]
    fn insert_replaces_same_id() {
        let mut scene = BlobScene::new();
        scene.insert(blob(BlobId::locked("a"), 0, false));
        let old = scene.insert(blob(BlobId::locked("a"), 3, false));
        assert_eq!(old.unwrap().cells, vec![GridCell::new(0, 0)]);
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.get(&BlobId::locked("a")).unwrap().cells, vec![GridCell::new(3, 0)]);
    }

    #[test]
    fn remove_keeps_order() {
        let mut scene = BlobScene::new();
        scene.insert(blob(BlobId::locked("a"), 0, false));
        scene.insert(blob(BlobId::locked("b"), 1, false));
        scene.insert(blob(BlobId::locked("c"), 2, false));
        assert!(scene.remove(&BlobId::locked("a")).is_some());
        assert!(scene.remove(&BlobId::locked("a")).is_none());
        let ids: Vec<_> = scene.iter().map(|b| b.id.as_str().to_string()).collect();
        assert_eq!(ids, vec!["goop-b", "goop-c"]);
    }
}
