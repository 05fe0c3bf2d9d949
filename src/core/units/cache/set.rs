//! Cache Set.
//!
//! A fixed array of ways allocated once at construction. Lookup scans every
//! way comparing tag and external-origin flag.

use super::line::CacheLine;

pub struct CacheSet {
    ways: Box<[CacheLine]>,
}

impl CacheSet {
    /// Creates a set with `ways` invalid lines.
    pub fn new(ways: usize) -> Self {
        Self {
            ways: vec![CacheLine::default(); ways].into_boxed_slice(),
        }
    }

    /// Associativity of the set.
    #[inline]
    pub fn ways(&self) -> usize {
        self.ways.len()
    }

    /// Returns the way holding `tag` from the given memory space, if any.
    #[inline]
    pub fn find(&self, tag: u64, external: bool) -> Option<usize> {
        self.ways.iter().position(|l| l.matches(tag, external))
    }

    /// Returns the first way with no valid data, if any.
    #[inline]
    pub fn find_invalid(&self) -> Option<usize> {
        self.ways.iter().position(|l| !l.state.is_valid())
    }

    #[inline]
    pub fn line(&self, way: usize) -> &CacheLine {
        &self.ways[way]
    }

    #[inline]
    pub fn line_mut(&mut self, way: usize) -> &mut CacheLine {
        &mut self.ways[way]
    }

    pub fn iter(&self) -> impl Iterator<Item = &CacheLine> {
        self.ways.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut CacheLine> {
        self.ways.iter_mut()
    }

    /// Forces every way to `Invalid`.
    pub fn clear(&mut self) {
        for line in self.ways.iter_mut() {
            line.invalidate();
        }
    }
}
