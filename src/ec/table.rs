/// Per-slot register cache with presence and dirty tracking.
///
/// A slot is present once its register has been read from or written to
/// hardware (or written while cache-only). A dirty slot holds a value that
/// still has to reach the hardware.
pub(crate) struct CacheTable<const N: usize>
where
    bitmaps::BitsImpl<N>: bitmaps::Bits,
{
    values: [u8; N],
    present: bitmaps::Bitmap<N>,
    dirty: bitmaps::Bitmap<N>,
}

impl<const N: usize> CacheTable<N>
where
    bitmaps::BitsImpl<N>: bitmaps::Bits,
{
    pub(crate) fn new() -> Self {
        Self {
            values: [0; N],
            present: bitmaps::Bitmap::new(),
            dirty: bitmaps::Bitmap::new(),
        }
    }

    pub(crate) fn get(&self, slot: usize) -> Option<u8> {
        if slot < N && self.present.get(slot) {
            self.values.get(slot).copied()
        } else {
            None
        }
    }

    /// Stores a value confirmed by hardware.
    pub(crate) fn store_clean(&mut self, slot: usize, value: u8) {
        self.store(slot, value, false);
    }

    /// Stores a value that has not reached hardware yet.
    pub(crate) fn store_dirty(&mut self, slot: usize, value: u8) {
        self.store(slot, value, true);
    }

    fn store(&mut self, slot: usize, value: u8, dirty: bool) {
        if let Some(v) = self.values.get_mut(slot) {
            *v = value;
            self.present.set(slot, true);
            self.dirty.set(slot, dirty);
        }
    }

    pub(crate) fn is_present(&self, slot: usize) -> bool {
        slot < N && self.present.get(slot)
    }

    pub(crate) fn is_dirty(&self, slot: usize) -> bool {
        slot < N && self.dirty.get(slot)
    }

    pub(crate) fn any_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub(crate) fn mark_clean(&mut self, slot: usize) {
        if slot < N {
            self.dirty.set(slot, false);
        }
    }

    /// Marks every present slot accepted by `filter` dirty.
    pub(crate) fn mark_present_dirty(&mut self, mut filter: impl FnMut(usize) -> bool) {
        let mut idx = self.present.first_index();
        while let Some(slot) = idx {
            if filter(slot) {
                self.dirty.set(slot, true);
            }
            idx = self.present.next_index(slot);
        }
    }

    /// Forgets every clean slot; dirty slots survive.
    pub(crate) fn invalidate_clean(&mut self) {
        self.present &= self.dirty;
    }

    /// Returns the first dirty slot at or after `from`, with its value.
    pub(crate) fn next_dirty(&self, from: usize) -> Option<(usize, u8)> {
        let slot = if from == 0 {
            self.dirty.first_index()
        } else {
            self.dirty.next_index(from - 1)
        }?;
        self.values.get(slot).map(|v| (slot, *v))
    }
}
