// Copyright 2025 Lars Brubaker
// License: MIT
//
// Index-stable arena used for the triangle, subsegment, and vertex pools.
// Items are allocated by pushing to a Vec and freed through a freelist, so
// an item's index stays valid for its whole lifetime within a mesh
// generation. Slot 0 can be reserved at construction for a sentinel object
// that is never freed; "no neighbor" comparisons then reduce to an index
// equality check against 0.

use std::ops::{Index, IndexMut};

pub struct Pool<T> {
    items: Vec<Option<T>>,
    free_list: Vec<u32>,
    /// Number of leading slots reserved for sentinels (0 or 1).
    reserved: u32,
    /// Live items, not counting reserved slots.
    live: u32,
}

impl<T> Pool<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            free_list: Vec::new(),
            reserved: 0,
            live: 0,
        }
    }

    /// Create a pool whose slot 0 holds `sentinel`. The sentinel is never
    /// freed and is skipped by iteration and by `count`.
    pub fn with_sentinel(sentinel: T) -> Self {
        Self {
            items: vec![Some(sentinel)],
            free_list: Vec::new(),
            reserved: 1,
            live: 0,
        }
    }

    /// Allocate a slot for `item`, reusing a freed slot when one exists.
    pub fn alloc(&mut self, item: T) -> u32 {
        self.live += 1;
        if let Some(idx) = self.free_list.pop() {
            self.items[idx as usize] = Some(item);
            idx
        } else {
            let idx = self.items.len() as u32;
            self.items.push(Some(item));
            idx
        }
    }

    /// Return a slot to the freelist. Freeing the sentinel or an already
    /// vacant slot is a programming error.
    pub fn free(&mut self, idx: u32) {
        debug_assert!(idx >= self.reserved, "attempt to free a sentinel slot");
        debug_assert!(self.items[idx as usize].is_some(), "double free");
        self.items[idx as usize] = None;
        self.free_list.push(idx);
        self.live -= 1;
    }

    #[inline]
    pub fn get(&self, idx: u32) -> Option<&T> {
        self.items.get(idx as usize)?.as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, idx: u32) -> Option<&mut T> {
        self.items.get_mut(idx as usize)?.as_mut()
    }

    /// Live items, excluding any reserved sentinel.
    #[inline]
    pub fn count(&self) -> u32 {
        self.live
    }

    /// Total number of slots ever allocated, vacant or not. Side tables
    /// indexed by slot id are sized with this.
    #[inline]
    pub fn slots(&self) -> u32 {
        self.items.len() as u32
    }

    #[inline]
    pub fn is_live(&self, idx: u32) -> bool {
        idx >= self.reserved && self.get(idx).is_some()
    }

    /// Smallest live slot index >= `idx`, skipping sentinels. Used by the
    /// point-location sampler to turn a raw draw into a real item.
    pub fn live_at_or_after(&self, idx: u32) -> Option<u32> {
        let start = idx.max(self.reserved) as usize;
        (start..self.items.len())
            .find(|&i| self.items[i].is_some())
            .map(|i| i as u32)
    }

    /// Iterate live (index, item) pairs, skipping vacant and sentinel slots.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        let reserved = self.reserved as usize;
        self.items
            .iter()
            .enumerate()
            .skip(reserved)
            .filter_map(|(i, slot)| slot.as_ref().map(|item| (i as u32, item)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u32, &mut T)> {
        let reserved = self.reserved as usize;
        self.items
            .iter_mut()
            .enumerate()
            .skip(reserved)
            .filter_map(|(i, slot)| slot.as_mut().map(|item| (i as u32, item)))
    }

    /// Live slot indices, skipping vacant and sentinel slots.
    pub fn indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.iter().map(|(i, _)| i)
    }
}

impl<T> Index<u32> for Pool<T> {
    type Output = T;

    /// Panics on a vacant slot; indexing a dead item is a programming error.
    #[inline]
    fn index(&self, idx: u32) -> &T {
        match self.items[idx as usize].as_ref() {
            Some(item) => item,
            None => panic!("pool index {} is vacant", idx),
        }
    }
}

impl<T> IndexMut<u32> for Pool<T> {
    #[inline]
    fn index_mut(&mut self, idx: u32) -> &mut T {
        match self.items[idx as usize].as_mut() {
            Some(item) => item,
            None => panic!("pool index {} is vacant", idx),
        }
    }
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_and_free_reuses_slot() {
        let mut pool: Pool<u32> = Pool::new();
        let a = pool.alloc(10);
        let b = pool.alloc(20);
        assert_ne!(a, b);
        pool.free(a);
        let c = pool.alloc(30);
        // c reuses a's slot
        assert_eq!(c, a);
        assert_eq!(pool[c], 30);
    }

    #[test]
    fn sentinel_occupies_slot_zero() {
        let mut pool: Pool<i32> = Pool::with_sentinel(-1);
        let a = pool.alloc(5);
        assert_eq!(a, 1);
        assert_eq!(pool[0], -1);
        assert_eq!(pool.count(), 1);
        let ids: Vec<u32> = pool.indices().collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn get_after_free_returns_none() {
        let mut pool: Pool<i32> = Pool::new();
        let idx = pool.alloc(7);
        pool.free(idx);
        assert!(pool.get(idx).is_none());
        assert_eq!(pool.count(), 0);
    }

    #[test]
    #[should_panic(expected = "vacant")]
    fn index_vacant_slot_panics() {
        let mut pool: Pool<i32> = Pool::new();
        let idx = pool.alloc(7);
        pool.free(idx);
        let _ = pool[idx];
    }

    #[test]
    fn iteration_skips_vacant_slots() {
        let mut pool: Pool<i32> = Pool::with_sentinel(0);
        let a = pool.alloc(1);
        let b = pool.alloc(2);
        let c = pool.alloc(3);
        pool.free(b);
        let items: Vec<(u32, i32)> = pool.iter().map(|(i, v)| (i, *v)).collect();
        assert_eq!(items, vec![(a, 1), (c, 3)]);
    }

    #[test]
    fn live_at_or_after_skips_gaps() {
        let mut pool: Pool<i32> = Pool::with_sentinel(0);
        let a = pool.alloc(1);
        let b = pool.alloc(2);
        pool.free(a);
        assert_eq!(pool.live_at_or_after(0), Some(b));
        assert_eq!(pool.live_at_or_after(a), Some(b));
        assert_eq!(pool.live_at_or_after(b + 1), None);
    }
}
