// Fri Oct 16 2026 - Alex

use crate::layout::alignment::{align_offset, TypeMetrics};

/// An open bitfield storage unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StorageUnit {
    offset: u32,
    size: u32,
    bit_cursor: u32,
}

impl StorageUnit {
    fn has_room(&self, size: u32, width: u32) -> bool {
        self.size == size && self.bit_cursor.saturating_add(width) <= self.size.saturating_mul(8)
    }

    fn end(&self) -> u32 {
        self.offset.saturating_add(self.size)
    }
}

/// Where a member landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub offset: u32,
    /// Bit position inside the storage unit, bitfields only
    pub bit_offset: Option<u32>,
}

/// Sequential member placement for structs and classes.
///
/// `current_offset` is the next free byte. While a bitfield unit is open it
/// stays at the unit's start; the unit is closed (and `current_offset` moved
/// past it) by the next ordinary member or a bitfield that does not fit.
#[derive(Debug, Clone)]
pub struct MemberCursor {
    current_offset: u32,
    unit: Option<StorageUnit>,
    max_alignment: u32,
}

impl MemberCursor {
    pub fn new(start_offset: u32) -> Self {
        Self {
            current_offset: start_offset,
            unit: None,
            max_alignment: 1,
        }
    }

    pub fn place_field(&mut self, metrics: TypeMetrics) -> Placement {
        self.close_unit();
        self.observe(metrics.alignment);
        self.current_offset = align_offset(self.current_offset, metrics.alignment);
        let offset = self.current_offset;
        self.current_offset = self.current_offset.saturating_add(metrics.size);
        Placement { offset, bit_offset: None }
    }

    /// `storage` is the metrics of the bitfield's declared type
    pub fn place_bitfield(&mut self, width: u8, storage: TypeMetrics) -> Placement {
        let width = u32::from(width);
        let size = storage.size.max(1);

        if width == 0 {
            self.close_unit();
            self.current_offset = align_offset(self.current_offset, storage.alignment);
            return Placement {
                offset: self.current_offset,
                bit_offset: Some(0),
            };
        }

        self.observe(storage.alignment);

        if let Some(unit) = self.unit.as_mut() {
            if unit.has_room(size, width) {
                let bit_offset = unit.bit_cursor;
                unit.bit_cursor = unit.bit_cursor.saturating_add(width);
                return Placement {
                    offset: unit.offset,
                    bit_offset: Some(bit_offset),
                };
            }
        }

        self.close_unit();
        self.current_offset = align_offset(self.current_offset, storage.alignment);
        self.unit = Some(StorageUnit {
            offset: self.current_offset,
            size,
            bit_cursor: width,
        });
        Placement {
            offset: self.current_offset,
            bit_offset: Some(0),
        }
    }

    fn close_unit(&mut self) {
        if let Some(unit) = self.unit.take() {
            self.current_offset = self.current_offset.max(unit.end());
        }
    }

    fn observe(&mut self, alignment: u32) {
        self.max_alignment = self.max_alignment.max(alignment);
    }

    /// End of the laid out members, counting a still open bitfield unit
    pub fn end(&self) -> u32 {
        match self.unit {
            Some(unit) => self.current_offset.max(unit.end()),
            None => self.current_offset,
        }
    }

    pub fn max_alignment(&self) -> u32 {
        self.max_alignment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INT: TypeMetrics = TypeMetrics { size: 4, alignment: 4 };
    const SHORT: TypeMetrics = TypeMetrics { size: 2, alignment: 2 };
    const CHAR: TypeMetrics = TypeMetrics { size: 1, alignment: 1 };

    #[test]
    fn test_bitfields_share_unit_until_full() {
        let mut cursor = MemberCursor::new(0);
        let a = cursor.place_bitfield(1, INT);
        let b = cursor.place_bitfield(30, INT);
        let c = cursor.place_bitfield(5, INT);

        assert_eq!((a.offset, a.bit_offset), (0, Some(0)));
        assert_eq!((b.offset, b.bit_offset), (0, Some(1)));
        assert_eq!((c.offset, c.bit_offset), (4, Some(0)));
        assert_eq!(cursor.end(), 8);
    }

    #[test]
    fn test_storage_size_change_opens_new_unit() {
        let mut cursor = MemberCursor::new(0);
        cursor.place_bitfield(3, CHAR);
        let wide = cursor.place_bitfield(3, SHORT);
        assert_eq!(wide.offset, 2);
        assert_eq!(cursor.end(), 4);
    }

    #[test]
    fn test_field_closes_open_unit() {
        let mut cursor = MemberCursor::new(0);
        cursor.place_bitfield(4, CHAR);
        let next = cursor.place_field(CHAR);
        assert_eq!(next.offset, 1);
        assert_eq!(next.bit_offset, None);
    }

    #[test]
    fn test_zero_width_closes_and_aligns() {
        let mut cursor = MemberCursor::new(0);
        cursor.place_bitfield(3, CHAR);
        let separator = cursor.place_bitfield(0, INT);
        assert_eq!(separator.offset, 4);
        let after = cursor.place_bitfield(2, INT);
        assert_eq!(after.offset, 4);
    }

    #[test]
    fn test_fields_aligned_and_start_offset_respected() {
        let mut cursor = MemberCursor::new(5);
        let c = cursor.place_field(CHAR);
        let i = cursor.place_field(INT);
        assert_eq!(c.offset, 5);
        assert_eq!(i.offset, 8);
        assert_eq!(cursor.end(), 12);
        assert_eq!(cursor.max_alignment(), 4);
    }
}
