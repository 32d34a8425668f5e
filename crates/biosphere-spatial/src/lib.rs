//! Uniform-grid spatial hash for proximity queries over payload-carrying points.
//!
//! Points are bucketed by the grid cell containing them, so radius and box queries
//! only visit the cells the query volume overlaps. Built for the vegetation pass:
//! thousands of points, frequent inserts, and query radii of a few cells.

use glam::{DVec3, IVec3};
use rustc_hash::FxHashMap;

/// A point stored in a [`SpatialIndex`] together with its payload.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry<T> {
    /// Position of the point.
    pub position: DVec3,
    /// Caller data attached to the point.
    pub payload: T,
}

/// A spatial hash that buckets entries by the grid cell containing them.
pub struct SpatialIndex<T> {
    /// Edge length of one grid cell.
    cell_size: f64,
    /// Cell coordinate -> entries whose position falls in that cell.
    buckets: FxHashMap<IVec3, Vec<Entry<T>>>,
    /// Total number of entries across all buckets.
    count: usize,
}

impl<T> SpatialIndex<T> {
    /// Create an empty index with the given cell size.
    ///
    /// Non-positive or non-finite sizes fall back to `1.0`. For best performance
    /// pick a cell size close to the typical query radius.
    pub fn new(cell_size: f64) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        Self {
            cell_size,
            buckets: FxHashMap::default(),
            count: 0,
        }
    }

    /// The cell edge length in effect.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if nothing has been inserted.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Insert a point. Duplicate positions are kept as separate entries.
    pub fn insert(&mut self, position: DVec3, payload: T) {
        let key = self.cell_of(position);
        self.buckets
            .entry(key)
            .or_default()
            .push(Entry { position, payload });
        self.count += 1;
    }

    /// All entries within `radius` (inclusive) of `center`.
    pub fn query_radius(&self, center: DVec3, radius: f64) -> Vec<&Entry<T>> {
        if radius.is_nan() || radius < 0.0 {
            return Vec::new();
        }
        let radius_sq = radius * radius;
        let mut results = Vec::new();
        self.visit_cells(center, DVec3::splat(radius), |entry| {
            if entry.position.distance_squared(center) <= radius_sq {
                results.push(entry);
            }
        });
        results
    }

    /// All entries inside the axis-aligned box `center ± half_extents` (inclusive).
    pub fn query_box(&self, center: DVec3, half_extents: DVec3) -> Vec<&Entry<T>> {
        let half_extents = half_extents.abs();
        let min = center - half_extents;
        let max = center + half_extents;
        let mut results = Vec::new();
        self.visit_cells(center, half_extents, |entry| {
            let p = entry.position;
            if p.cmpge(min).all() && p.cmple(max).all() {
                results.push(entry);
            }
        });
        results
    }

    /// The closest entry within `max_radius` of `center` accepted by `filter`,
    /// together with its distance.
    pub fn nearest<F>(&self, center: DVec3, max_radius: f64, filter: F) -> Option<(&Entry<T>, f64)>
    where
        F: Fn(&T) -> bool,
    {
        self.query_radius(center, max_radius)
            .into_iter()
            .filter(|entry| filter(&entry.payload))
            .map(|entry| (entry, entry.position.distance(center)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Iterate over every stored entry in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry<T>> {
        self.buckets.values().flatten()
    }

    fn cell_of(&self, position: DVec3) -> IVec3 {
        (position / self.cell_size).floor().as_ivec3()
    }

    fn visit_cells<'a, F>(&'a self, center: DVec3, half_extents: DVec3, mut visit: F)
    where
        F: FnMut(&'a Entry<T>),
    {
        let lo = self.cell_of(center - half_extents);
        let hi = self.cell_of(center + half_extents);

        // A huge query would enumerate more cells than there are buckets; scan
        // the buckets directly instead.
        let span = hi.as_dvec3() - lo.as_dvec3() + DVec3::ONE;
        if span.x * span.y * span.z > self.buckets.len() as f64 {
            for (key, bucket) in &self.buckets {
                if key.cmpge(lo).all() && key.cmple(hi).all() {
                    bucket.iter().for_each(&mut visit);
                }
            }
            return;
        }

        for x in lo.x..=hi.x {
            for y in lo.y..=hi.y {
                for z in lo.z..=hi.z {
                    if let Some(bucket) = self.buckets.get(&IVec3::new(x, y, z)) {
                        bucket.iter().for_each(&mut visit);
                    }
                }
            }
        }
    }
}

impl<T> Default for SpatialIndex<T> {
    fn default() -> Self {
        Self::new(1.0)
    }
}
