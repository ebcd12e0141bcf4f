//! Per-entity cache of world-space bone transforms

use glam::{Affine3A, Vec3};
use studio_model::BoneFlags;

/// What a cached set of transforms was computed for
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneCacheKey {
    pub sequence: Option<usize>,
    pub anim_time: f32,
    pub angles: Vec3,
    pub origin: Vec3,
    pub mask: BoneFlags,
}

/// Hit and miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Single-entry cache of bone-to-world transforms
#[derive(Debug, Clone, Default)]
pub struct BoneCache {
    key: Option<BoneCacheKey>,
    transforms: Vec<Option<Affine3A>>,
    stats: CacheStats,
}

impl BoneCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check the cache against a key, counting the lookup as a hit or miss
    pub fn is_valid_for(&mut self, key: &BoneCacheKey) -> bool {
        let valid = self.key.as_ref() == Some(key);
        if valid {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
        }
        valid
    }

    /// Replace the cached entry
    pub fn store(&mut self, key: BoneCacheKey, transforms: Vec<Option<Affine3A>>) {
        self.key = Some(key);
        self.transforms = transforms;
    }

    /// Force the next lookup to miss
    pub fn invalidate(&mut self) {
        self.key = None;
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_none()
    }

    pub fn key(&self) -> Option<&BoneCacheKey> {
        self.key.as_ref()
    }

    /// Cached transform of one bone, None when the bone was masked out
    pub fn get(&self, bone: usize) -> Option<&Affine3A> {
        self.key.as_ref()?;
        self.transforms.get(bone).and_then(Option::as_ref)
    }

    pub fn transforms(&self) -> &[Option<Affine3A>] {
        &self.transforms
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
