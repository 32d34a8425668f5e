//! Per-vertex memo keyed by quantized position.

use glam::DVec3;
use rustc_hash::FxHashMap;

/// Highest supported number of decimal digits. Beyond this the scaled coordinates
/// no longer fit an `i64` for points far from the origin.
pub const MAX_PRECISION: u32 = 12;

/// Quantized position used as a cache key.
pub type VertexKey = [i64; 3];

/// Everything computed once per distinct vertex.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexRecord {
    /// Canonical un-displaced position: the first raw position seen for this key.
    pub base: DVec3,
    /// Raw terrain height.
    pub height: f64,
    /// Positional jitter, already scaled by the scatter amount.
    pub scatter: DVec3,
    /// Resting ocean surface height.
    pub sea_height: f64,
    /// Ocean surface height of the tide morph target.
    pub sea_morph_height: f64,
}

impl VertexRecord {
    /// Displaced terrain position.
    pub fn terrain(&self, up: DVec3) -> DVec3 {
        self.base + self.scatter + up * self.height
    }

    /// Displaced resting ocean position.
    pub fn ocean(&self, up: DVec3) -> DVec3 {
        self.base + self.scatter + up * self.sea_height
    }

    /// Displaced morph-target ocean position.
    pub fn ocean_morph(&self, up: DVec3) -> DVec3 {
        self.base + self.scatter + up * self.sea_morph_height
    }
}

/// Maps raw vertex positions to their [`VertexRecord`].
///
/// Positions that round to the same `precision` decimal digits share one record,
/// so corners shared by adjacent faces always displace identically.
pub struct VertexCache {
    scale: f64,
    records: FxHashMap<VertexKey, VertexRecord>,
    hits: usize,
}

impl VertexCache {
    /// Create a cache quantizing to `precision` decimal digits (capped at
    /// [`MAX_PRECISION`]).
    pub fn new(precision: u32) -> Self {
        Self::with_capacity(precision, 0)
    }

    pub fn with_capacity(precision: u32, capacity: usize) -> Self {
        let precision = precision.min(MAX_PRECISION);
        Self {
            scale: 10f64.powi(precision as i32),
            records: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            hits: 0,
        }
    }

    /// The quantized key of `position`.
    pub fn key(&self, position: DVec3) -> VertexKey {
        let q = |v: f64| (v * self.scale).round() as i64;
        [q(position.x), q(position.y), q(position.z)]
    }

    /// The record for `position`, computing it with `compute` on a miss.
    ///
    /// `compute` receives the raw position, which becomes the record's canonical
    /// base.
    pub fn get_or_insert_with<F>(&mut self, position: DVec3, compute: F) -> VertexRecord
    where
        F: FnOnce(DVec3) -> VertexRecord,
    {
        let key = self.key(position);
        if let Some(record) = self.records.get(&key) {
            self.hits += 1;
            return *record;
        }
        let record = compute(position);
        self.records.insert(key, record);
        record
    }

    pub fn get(&self, position: DVec3) -> Option<&VertexRecord> {
        self.records.get(&self.key(position))
    }

    /// Number of distinct vertices stored.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of lookups answered from the cache.
    pub fn hits(&self) -> usize {
        self.hits
    }
}
