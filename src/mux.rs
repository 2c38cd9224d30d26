mod list;
mod record;

use std::fmt;

use log::trace;

use crate::error::MuxError;
use crate::sheet::SpriteSheet;

pub use record::{
    channel_bit, Affinity, SpriteRecord, CHANNEL_COUNT, CHANNEL_HEIGHT, CHANNEL_WIDTH,
    OFFSCREEN_X, OFFSCREEN_Y,
};

/// Number of logical sprites the pool can hold.
pub const POOL_CAPACITY: usize = 32;

/// Refers to one record of the pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SpriteHandle(u8);

impl SpriteHandle {
    /// Returns the pool index of the record.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SpriteHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The sprite record pool and the active list.
///
/// The active list holds the live handles ordered by ascending Y. A record's
/// attribute masks are pinned to the channel bit of its list slot, see
/// `Affinity`.
pub struct SpriteMux {
    records: [SpriteRecord; POOL_CAPACITY],
    live: [bool; POOL_CAPACITY],

    /// Bump pointer into `records`.
    next: usize,

    list: [SpriteHandle; POOL_CAPACITY],
    count: usize,
}

impl SpriteMux {
    /// Returns an empty pool.
    pub fn new() -> Self {
        SpriteMux {
            records: [SpriteRecord::default(); POOL_CAPACITY],
            live: [false; POOL_CAPACITY],
            next: 0,
            list: [SpriteHandle::default(); POOL_CAPACITY],
            count: 0,
        }
    }

    /// Returns a new off-screen sprite appended to the tail of the active
    /// list.
    pub fn allocate(&mut self, double_size: bool) -> Result<SpriteHandle, MuxError> {
        if self.count == POOL_CAPACITY {
            return Err(MuxError::PoolExhausted);
        }

        let index = if self.next < POOL_CAPACITY {
            self.next += 1;
            self.next - 1
        } else {
            self.live
                .iter()
                .position(|live| !live)
                .ok_or(MuxError::PoolExhausted)?
        };

        let handle = SpriteHandle(index as u8);
        let slot = self.count;
        self.records[index] = SpriteRecord::new(slot, double_size);
        self.live[index] = true;
        self.list[slot] = handle;
        self.count += 1;

        trace!("allocated sprite {} at slot {}", handle, slot);
        Ok(handle)
    }

    /// Frees the record at the tail of the active list.
    ///
    /// The handle must already be the tail, which is where `set_position_y`
    /// puts it when it is moved to `OFFSCREEN_Y`. No search is performed.
    pub fn release(&mut self, handle: SpriteHandle) -> Result<(), MuxError> {
        if self.count == 0 || self.list[self.count - 1] != handle {
            return Err(MuxError::ReleaseNotTail(handle));
        }

        self.count -= 1;
        self.live[handle.index()] = false;

        trace!("released sprite {}", handle);
        Ok(())
    }

    /// Moves the sprite off-screen and releases it.
    pub fn discard(&mut self, handle: SpriteHandle) -> Result<(), MuxError> {
        if self.index_of(handle).is_none() {
            return Err(MuxError::StaleHandle(handle));
        }
        self.set_position_y(handle, OFFSCREEN_Y);
        self.sink_to_tail(handle);
        self.release(handle)
    }

    /// Points the sprite at an image of the sheet and takes its colour and
    /// multicolour flag from the image metadata.
    pub fn bind_graphic(
        &mut self,
        handle: SpriteHandle,
        sheet: &SpriteSheet,
        sheet_index: usize,
    ) -> Result<(), MuxError> {
        let pointer = sheet.pointer(sheet_index)?;
        let meta = sheet.metadata(sheet_index)?;
        let slot = self
            .index_of(handle)
            .ok_or(MuxError::StaleHandle(handle))?;

        let record = &mut self.records[handle.index()];
        record.pointer = pointer;
        record.color = meta.color;
        record.affinity.multicolor = if meta.multicolor {
            channel_bit(slot)
        } else {
            0
        };
        Ok(())
    }

    /// Returns the number of live sprites.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the live handles in active list order.
    pub fn handles(&self) -> &[SpriteHandle] {
        &self.list[..self.count]
    }

    /// Returns the record behind a handle.
    pub fn record(&self, handle: SpriteHandle) -> &SpriteRecord {
        &self.records[handle.index()]
    }

    /// Returns the record at the given active list slot.
    pub fn slot(&self, slot: usize) -> Option<&SpriteRecord> {
        self.handles()
            .get(slot)
            .map(|handle| &self.records[handle.index()])
    }

    /// Returns the active list slot of a live handle.
    pub fn index_of(&self, handle: SpriteHandle) -> Option<usize> {
        self.handles().iter().position(|h| *h == handle)
    }
}

impl Default for SpriteMux {
    fn default() -> Self {
        SpriteMux::new()
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::sheet::test::test_sheet_bytes;

    /// Asserts the ordering and slot binding invariants of the active list.
    pub fn assert_invariants(mux: &SpriteMux) {
        let handles = mux.handles();
        for pair in handles.windows(2) {
            assert!(
                mux.record(pair[0]).y <= mux.record(pair[1]).y,
                "list not sorted: {:?}",
                handles
                    .iter()
                    .map(|h| mux.record(*h).y)
                    .collect::<Vec<_>>()
            );
        }

        for (slot, handle) in handles.iter().enumerate() {
            let affinity = mux.record(*handle).affinity;
            assert_eq!(affinity.enabled, channel_bit(slot), "sprite {}", handle);
            for mask in affinity.masks() {
                assert!(
                    mask == 0 || mask == channel_bit(slot),
                    "sprite {} at slot {} has mask {:08b}",
                    handle,
                    slot,
                    mask
                );
            }
        }
    }

    #[test]
    fn test_allocate_appends_at_tail() {
        let mut mux = SpriteMux::new();
        let a = mux.allocate(false).unwrap();
        let b = mux.allocate(true).unwrap();

        assert_eq!(mux.handles(), &[a, b]);
        assert_eq!(mux.record(b).y, OFFSCREEN_Y);
        assert_eq!(mux.record(b).affinity.enabled, 0b10);
        assert_eq!(mux.record(b).affinity.double_size, 0b10);
        assert_eq!(mux.record(a).affinity.double_size, 0);
        assert_invariants(&mux);
    }

    #[test]
    fn test_pool_exhausted() {
        let mut mux = SpriteMux::new();
        for _ in 0..POOL_CAPACITY {
            mux.allocate(false).unwrap();
        }

        assert!(matches!(mux.allocate(false), Err(MuxError::PoolExhausted)));
        assert_eq!(mux.len(), POOL_CAPACITY);
    }

    #[test]
    fn test_release_requires_tail() {
        let mut mux = SpriteMux::new();
        let a = mux.allocate(false).unwrap();
        let b = mux.allocate(false).unwrap();

        assert!(matches!(mux.release(a), Err(MuxError::ReleaseNotTail(h)) if h == a));
        assert_eq!(mux.len(), 2);

        mux.release(b).unwrap();
        assert_eq!(mux.handles(), &[a]);
    }

    #[test]
    fn test_discard_then_reuse() {
        let mut mux = SpriteMux::new();
        let handles: Vec<_> = (0..POOL_CAPACITY)
            .map(|_| mux.allocate(false).unwrap())
            .collect();
        for (i, h) in handles.iter().enumerate() {
            mux.set_position_y(*h, 60 + i as u8);
        }

        mux.discard(handles[3]).unwrap();
        assert_eq!(mux.len(), POOL_CAPACITY - 1);
        assert_eq!(mux.index_of(handles[3]), None);
        assert_invariants(&mux);

        let reused = mux.allocate(false).unwrap();
        assert_eq!(reused, handles[3]);
        assert_eq!(mux.index_of(reused), Some(POOL_CAPACITY - 1));
        assert_invariants(&mux);
    }

    #[test]
    fn test_discard_passes_unplaced_sprites() {
        let mut mux = SpriteMux::new();
        let a = mux.allocate(false).unwrap();
        let b = mux.allocate(false).unwrap();
        mux.set_position_y(a, 100);

        mux.discard(a).unwrap();

        assert_eq!(mux.handles(), &[b]);
        assert_eq!(mux.record(b).affinity.enabled, channel_bit(0));
        assert_invariants(&mux);
    }

    #[test]
    fn test_discard_twice_is_stale() {
        let mut mux = SpriteMux::new();
        let a = mux.allocate(false).unwrap();
        mux.discard(a).unwrap();

        assert!(matches!(mux.discard(a), Err(MuxError::StaleHandle(h)) if h == a));
        assert!(mux.is_empty());
    }

    #[test]
    fn test_bind_graphic_on_released_handle() {
        let sheet = SpriteSheet::new(&test_sheet_bytes(&[0x03], None)).unwrap();
        let mut mux = SpriteMux::new();
        let a = mux.allocate(false).unwrap();
        mux.release(a).unwrap();

        assert!(matches!(
            mux.bind_graphic(a, &sheet, 0),
            Err(MuxError::StaleHandle(h)) if h == a
        ));
        assert_eq!(mux.record(a).pointer, 0);
    }

    #[test]
    fn test_bind_graphic() {
        let sheet = SpriteSheet::new(&test_sheet_bytes(&[0x03, 0x8E], None)).unwrap();
        let mut mux = SpriteMux::new();
        let a = mux.allocate(false).unwrap();
        let b = mux.allocate(false).unwrap();

        mux.bind_graphic(a, &sheet, 0).unwrap();
        mux.bind_graphic(b, &sheet, 1).unwrap();

        assert_eq!(mux.record(a).color, 3);
        assert_eq!(mux.record(a).affinity.multicolor, 0);
        assert_eq!(mux.record(b).color, 0x0E);
        assert_eq!(mux.record(b).affinity.multicolor, 0b10);
        assert_eq!(mux.record(b).pointer, sheet.pointer(1).unwrap());
        assert!(matches!(
            mux.bind_graphic(a, &sheet, 2),
            Err(MuxError::UnknownGraphic(2))
        ));
    }
}
