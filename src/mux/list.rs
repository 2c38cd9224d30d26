use log::warn;

use super::{SpriteHandle, SpriteMux, OFFSCREEN_Y};

impl SpriteMux {
    /// Sets the X position. X does not affect the list order.
    pub fn set_position_x(&mut self, handle: SpriteHandle, x: u16) {
        let record = &mut self.records[handle.index()];
        record.x = x;

        // The ninth X bit lives in the shared high X register, so it follows
        // the same channel bit as the enable mask.
        record.affinity.high_x = if x > 0xFF {
            record.affinity.enabled
        } else {
            0
        };
    }

    /// Sets the Y position and moves the handle to its sorted slot.
    ///
    /// This is a single element insertion sort step, linear in the distance
    /// moved. Equal Ys are never passed, so the earlier writer keeps its
    /// place. Every record that lands in a slot is re-pinned to that slot's
    /// channel bit.
    pub fn set_position_y(&mut self, handle: SpriteHandle, y: u8) {
        let old = self.records[handle.index()].y;
        if y == old {
            return;
        }

        let Some(start) = self.index_of(handle) else {
            warn!("positioned sprite {} is not live", handle);
            return;
        };
        self.records[handle.index()].y = y;

        let later = y > old;
        if (later && start + 1 == self.count) || (!later && start == 0) {
            return;
        }

        let mut slot = start;
        while let Some(next) = self.neighbour(slot, later) {
            let other = self.list[next];
            let other_y = self.records[other.index()].y;
            let passes = if later { y > other_y } else { y < other_y };
            if !passes {
                break;
            }

            // The neighbour takes the slot being vacated.
            self.list[slot] = other;
            self.records[other.index()].affinity.repin(slot);
            slot = next;
        }

        self.list[slot] = handle;
        self.records[handle.index()].affinity.repin(slot);
    }

    /// Sets both coordinates.
    pub fn set_position(&mut self, handle: SpriteHandle, x: u16, y: u8) {
        self.set_position_x(handle, x);
        self.set_position_y(handle, y);
    }

    /// Moves an off-screen handle behind the other off-screen records at the
    /// tail of the list.
    ///
    /// `set_position_y` never passes an equal Y, so a handle moved to
    /// `OFFSCREEN_Y` stops in front of records already there. Those records
    /// are never displayed, so their order does not matter.
    pub(super) fn sink_to_tail(&mut self, handle: SpriteHandle) {
        if self.records[handle.index()].y != OFFSCREEN_Y {
            return;
        }
        let Some(mut slot) = self.index_of(handle) else {
            return;
        };

        while slot + 1 < self.count {
            let other = self.list[slot + 1];
            if self.records[other.index()].y != OFFSCREEN_Y {
                break;
            }
            self.list[slot] = other;
            self.records[other.index()].affinity.repin(slot);
            slot += 1;
        }

        self.list[slot] = handle;
        self.records[handle.index()].affinity.repin(slot);
    }

    /// Returns the next slot in the walking direction, if any.
    fn neighbour(&self, slot: usize, later: bool) -> Option<usize> {
        if later {
            (slot + 1 < self.count).then_some(slot + 1)
        } else {
            slot.checked_sub(1)
        }
    }
}

#[cfg(test)]
mod test {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::super::test::assert_invariants;
    use super::super::{channel_bit, POOL_CAPACITY};
    use super::*;

    fn pool_of(count: usize, double_size: bool) -> (SpriteMux, Vec<SpriteHandle>) {
        let mut mux = SpriteMux::new();
        let handles = (0..count)
            .map(|_| mux.allocate(double_size).unwrap())
            .collect();
        (mux, handles)
    }

    #[test]
    fn test_mouth_moves_to_head() {
        let (mut mux, h) = pool_of(9, true);
        for (i, handle) in h.iter().enumerate() {
            mux.set_position_y(*handle, if i == 7 { 80 } else { 100 });
        }

        let expected = [h[7], h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[8]];
        assert_eq!(mux.handles(), &expected);
        assert_eq!(mux.index_of(h[7]), Some(0));
        assert_eq!(mux.record(h[7]).affinity.enabled, 0b0000_0001);
        assert_eq!(mux.record(h[7]).affinity.double_size, 0b0000_0001);
        assert_invariants(&mux);
    }

    #[test]
    fn test_same_y_is_noop() {
        let (mut mux, h) = pool_of(3, false);
        mux.set_position_y(h[0], 50);
        mux.set_position_y(h[1], 50);
        mux.set_position_y(h[2], 40);
        let before = mux.handles().to_vec();

        mux.set_position_y(h[2], 40);
        mux.set_position_y(h[1], 50);

        assert_eq!(mux.handles(), &before[..]);
        assert_invariants(&mux);
    }

    #[test]
    fn test_ties_keep_first_writer() {
        let (mut mux, h) = pool_of(3, false);
        mux.set_position_y(h[0], 70);
        mux.set_position_y(h[1], 90);
        mux.set_position_y(h[2], 90);

        // Moving up onto an equal Y stops behind it.
        mux.set_position_y(h[2], 70);
        assert_eq!(mux.handles(), &[h[0], h[2], h[1]]);

        // Moving down onto an equal Y stops in front of it.
        mux.set_position_y(h[0], 90);
        assert_eq!(mux.handles(), &[h[2], h[0], h[1]]);
        assert_invariants(&mux);
    }

    #[test]
    fn test_boundaries_are_noops() {
        let (mut mux, h) = pool_of(3, false);
        mux.set_position_y(h[0], 10);
        mux.set_position_y(h[1], 20);
        mux.set_position_y(h[2], 30);

        mux.set_position_y(h[0], 5);
        mux.set_position_y(h[2], 200);

        assert_eq!(mux.handles(), &[h[0], h[1], h[2]]);
        assert_eq!(mux.record(h[0]).y, 5);
        assert_eq!(mux.record(h[2]).y, 200);
        assert_invariants(&mux);
    }

    #[test]
    fn test_move_across_whole_list() {
        let (mut mux, h) = pool_of(10, false);
        for (i, handle) in h.iter().enumerate() {
            mux.set_position_y(*handle, 10 * i as u8 + 10);
        }

        mux.set_position_y(h[0], 250);
        assert_eq!(mux.handles()[9], h[0]);
        assert_eq!(mux.record(h[0]).affinity.enabled, channel_bit(9));
        assert_eq!(mux.record(h[1]).affinity.enabled, channel_bit(0));

        mux.set_position_y(h[0], 0);
        assert_eq!(mux.handles()[0], h[0]);
        assert_invariants(&mux);
    }

    #[test]
    fn test_attributes_follow_the_record() {
        let (mut mux, h) = pool_of(4, false);
        for (i, handle) in h.iter().enumerate() {
            mux.set_position(*handle, 40, 60 + i as u8);
        }
        mux.set_position_x(h[1], 300);
        mux.records[h[1].index()].affinity.multicolor = channel_bit(1);

        mux.set_position_y(h[1], 200);
        assert_eq!(mux.index_of(h[1]), Some(3));
        assert_eq!(mux.record(h[1]).affinity.high_x, channel_bit(3));
        assert_eq!(mux.record(h[1]).affinity.multicolor, channel_bit(3));

        for other in [h[0], h[2], h[3]] {
            assert_eq!(mux.record(other).affinity.high_x, 0);
            assert_eq!(mux.record(other).affinity.multicolor, 0);
        }
        assert_invariants(&mux);
    }

    #[test]
    fn test_high_x_tracks_enable_bit() {
        let (mut mux, h) = pool_of(3, false);

        mux.set_position_x(h[2], 0x100);
        assert_eq!(mux.record(h[2]).affinity.high_x, channel_bit(2));

        mux.set_position_x(h[2], 0xFF);
        assert_eq!(mux.record(h[2]).affinity.high_x, 0);
    }

    #[test]
    fn test_released_handle_is_not_moved() {
        let (mut mux, h) = pool_of(3, false);
        mux.set_position_y(h[0], 40);
        mux.set_position_y(h[1], 60);
        mux.discard(h[2]).unwrap();
        let before = mux.handles().to_vec();

        mux.set_position_y(h[2], 10);

        assert_eq!(mux.record(h[2]).y, OFFSCREEN_Y);
        assert_eq!(mux.handles(), &before[..]);
        assert_invariants(&mux);
    }

    #[test]
    fn test_sink_passes_offscreen_records_only() {
        let (mut mux, h) = pool_of(4, false);
        mux.set_position_y(h[0], 40);

        // h[1], h[2] and h[3] are still at the sentinel.
        mux.sink_to_tail(h[1]);
        assert_eq!(mux.handles(), &[h[0], h[2], h[3], h[1]]);
        assert_invariants(&mux);

        mux.sink_to_tail(h[0]);
        assert_eq!(mux.handles()[0], h[0]);
    }

    #[test]
    fn test_random_moves_keep_invariants() {
        let mut rng = StdRng::seed_from_u64(0x5EED);
        let (mut mux, h) = pool_of(POOL_CAPACITY, false);
        for handle in h.iter() {
            mux.set_position_x(*handle, rng.gen_range(0..=0x1FF));
        }

        for _ in 0..5000 {
            let handle = h[rng.gen_range(0..h.len())];
            let y = if rng.gen_bool(0.8) {
                let delta: i16 = rng.gen_range(-6..=6);
                (mux.record(handle).y as i16 + delta).clamp(0, 255) as u8
            } else {
                rng.gen()
            };
            mux.set_position_y(handle, y);
            assert_invariants(&mux);
        }

        for handle in h.iter() {
            let record = mux.record(*handle);
            assert_eq!(record.affinity.high_x != 0, record.x > 0xFF);
        }
    }
}
