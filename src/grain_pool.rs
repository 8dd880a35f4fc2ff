// src/grain_pool.rs

use crate::grain::{Grain, GrainId, GrainSpawn};
use crate::sample_buffer::SampleBuffer;

/// Fixed number of grain slots.
pub const MAX_GRAINS: usize = 128;

/// Fixed-capacity arena of grain voices.
///
/// Responsibilities:
/// - hand out slots for new grains
/// - steal the voice nearest completion when full
/// - mix every active grain into the output
///
/// Does NOT:
/// - allocate after construction
/// - decide when or where grains spawn
pub struct GrainPool {
    grains: [Grain; MAX_GRAINS],
}

impl GrainPool {
    pub fn new() -> Self {
        Self {
            grains: [Grain::default(); MAX_GRAINS],
        }
    }

    /// Pick the slot for a new grain.
    ///
    /// The first inactive slot wins. With every slot busy, the grain with
    /// the fewest samples remaining is stolen (lowest index on ties).
    pub fn allocate(&self) -> GrainId {
        if let Some(free) = self.grains.iter().position(|g| !g.active) {
            return free;
        }

        let mut slot = 0;
        let mut least_remaining = u32::MAX;
        for (i, grain) in self.grains.iter().enumerate() {
            if grain.samples_remaining() < least_remaining {
                least_remaining = grain.samples_remaining();
                slot = i;
            }
        }
        slot
    }

    /// Start a grain in the slot chosen by [`Self::allocate`].
    pub fn spawn(&mut self, spawn: &GrainSpawn) -> GrainId {
        let slot = self.allocate();
        self.grains[slot].activate(spawn);
        slot
    }

    /// Hard-stop every grain.
    pub fn deactivate_all(&mut self) {
        for grain in &mut self.grains {
            grain.deactivate();
        }
    }

    /// Mix all active grains into the output, sample by sample.
    ///
    /// Overwrites `out_left`/`out_right` for the first `frames` samples.
    pub fn render(
        &mut self,
        buffer: &SampleBuffer,
        out_left: &mut [f32],
        out_right: &mut [f32],
        frames: usize,
    ) {
        for (left, right) in out_left.iter_mut().zip(out_right.iter_mut()).take(frames) {
            let mut sum_left = 0.0;
            let mut sum_right = 0.0;

            for grain in self.grains.iter_mut().filter(|g| g.active) {
                let (l, r) = grain.render(buffer);
                sum_left += l;
                sum_right += r;
            }

            *left = sum_left;
            *right = sum_right;
        }
    }

    /// Iterate over active grains.
    pub fn active_grains(&self) -> impl Iterator<Item = &Grain> + '_ {
        self.grains.iter().filter(|g| g.active)
    }

    /// Number of currently active grains.
    pub fn active_count(&self) -> usize {
        self.grains.iter().filter(|g| g.active).count()
    }
}

impl Default for GrainPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::EnvelopeShape;

    fn spawn_with_len(total_samples: u32) -> GrainSpawn {
        GrainSpawn {
            start: 0.0,
            playback_rate: 1.0,
            total_samples,
            envelope: EnvelopeShape::default(),
            pan: 0.0,
            norm_position: 0.0,
            duration: 0.0,
        }
    }

    #[test]
    fn test_fills_free_slots_in_order() {
        let mut pool = GrainPool::new();
        assert_eq!(pool.spawn(&spawn_with_len(10)), 0);
        assert_eq!(pool.spawn(&spawn_with_len(10)), 1);
        assert_eq!(pool.active_count(), 2);
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut pool = GrainPool::new();
        for i in 0..(MAX_GRAINS * 3) {
            pool.spawn(&spawn_with_len(1000 + i as u32));
            assert!(pool.active_count() <= MAX_GRAINS);
        }
        assert_eq!(pool.active_count(), MAX_GRAINS);
    }

    #[test]
    fn test_steals_grain_nearest_completion() {
        let mut pool = GrainPool::new();
        for i in 0..MAX_GRAINS {
            // Slot 37 is the shortest
            let len = if i == 37 { 5 } else { 500 + i as u32 };
            pool.spawn(&spawn_with_len(len));
        }

        assert_eq!(pool.allocate(), 37);
        let stolen = pool.spawn(&spawn_with_len(9999));
        assert_eq!(stolen, 37);
        assert_eq!(pool.grains[37].total_samples(), 9999);
        assert_eq!(pool.active_count(), MAX_GRAINS);
    }

    #[test]
    fn test_freed_slot_reused_before_stealing() {
        let mut buffer = SampleBuffer::new();
        buffer.allocate(4096).fill(0.5);
        buffer.commit(1, 4096).unwrap();

        let mut pool = GrainPool::new();
        for _ in 0..MAX_GRAINS - 1 {
            pool.spawn(&spawn_with_len(1000));
        }
        pool.spawn(&spawn_with_len(2));

        let mut left = [0.0; 4];
        let mut right = [0.0; 4];
        pool.render(&buffer, &mut left, &mut right, 4);

        assert_eq!(pool.active_count(), MAX_GRAINS - 1);
        assert_eq!(pool.allocate(), MAX_GRAINS - 1);
    }

    #[test]
    fn test_deactivate_all() {
        let mut pool = GrainPool::new();
        for _ in 0..10 {
            pool.spawn(&spawn_with_len(100));
        }
        pool.deactivate_all();
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.active_grains().count(), 0);
    }
}
