// Fri Oct 16 2026 - Alex

use crate::model::{MemberId, TypeId, TypeKind};
use serde::Serialize;
use std::fmt;

/// A base-class subobject inside a derived layout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseSlot {
    pub name: String,
    pub type_id: TypeId,
    pub offset: u32,
    pub size: u32,
}

impl fmt::Display for BaseSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ 0x{:X} ({} bytes)", self.name, self.offset, self.size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BitFieldSlot {
    pub width: u8,
    pub bit_offset: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberSlot {
    pub member_id: MemberId,
    pub name: String,
    pub type_string: String,
    pub offset: u32,
    /// Bytes occupied; the whole storage unit for bitfields
    pub size: u32,
    pub alignment: u32,
    pub bit_field: Option<BitFieldSlot>,
}

impl MemberSlot {
    pub fn end_offset(&self) -> u32 {
        self.offset.saturating_add(self.size)
    }
}

impl fmt::Display for MemberSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} @ 0x{:X}", self.type_string, self.name, self.offset)?;
        if let Some(bf) = &self.bit_field {
            write!(f, " : {} bits at {}", bf.width, bf.bit_offset)?;
        }
        Ok(())
    }
}

/// Computed layout of one aggregate type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeLayout {
    pub type_id: TypeId,
    pub name: String,
    pub kind: TypeKind,
    pub size: u32,
    pub alignment: u32,
    pub bases: Vec<BaseSlot>,
    pub members: Vec<MemberSlot>,
    /// Padding holes as (offset, size)
    pub padding: Vec<(u32, u32)>,
}

impl TypeLayout {
    pub fn new(type_id: TypeId, name: &str, kind: TypeKind) -> Self {
        Self {
            type_id,
            name: name.to_string(),
            kind,
            size: 0,
            alignment: 1,
            bases: Vec::new(),
            members: Vec::new(),
            padding: Vec::new(),
        }
    }

    /// Recomputes padding holes from base and member extents
    pub fn find_padding(&mut self) {
        self.padding.clear();

        let mut extents: Vec<(u32, u32)> = self
            .bases
            .iter()
            .map(|b| (b.offset, b.offset.saturating_add(b.size)))
            .chain(self.members.iter().map(|m| (m.offset, m.end_offset())))
            .collect();
        extents.sort_unstable();

        let mut expected_offset = 0;
        for (start, end) in extents {
            if start > expected_offset {
                self.padding.push((expected_offset, start - expected_offset));
            }
            expected_offset = expected_offset.max(end);
        }

        if expected_offset < self.size {
            self.padding.push((expected_offset, self.size - expected_offset));
        }
    }

    pub fn member(&self, name: &str) -> Option<&MemberSlot> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn members_at_offset(&self, offset: u32) -> impl Iterator<Item = &MemberSlot> {
        self.members.iter().filter(move |m| m.offset == offset)
    }

    pub fn base(&self, name: &str) -> Option<&BaseSlot> {
        self.bases.iter().find(|b| b.name == name)
    }

    pub fn total_padding(&self) -> u32 {
        self.padding.iter().fold(0u32, |total, (_, size)| total.saturating_add(*size))
    }

    pub fn padding_percentage(&self) -> f64 {
        if self.size == 0 {
            return 0.0;
        }
        (self.total_padding() as f64 / self.size as f64) * 100.0
    }
}

impl fmt::Display for TypeLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {} {{", self.kind, self.name)?;
        writeln!(f, "  // Size: 0x{:X} ({} bytes)", self.size, self.size)?;
        writeln!(f, "  // Alignment: {}", self.alignment)?;

        if !self.bases.is_empty() {
            writeln!(f, "  // Base classes:")?;
            for base in &self.bases {
                writeln!(f, "  //   {}", base)?;
            }
        }

        for member in &self.members {
            writeln!(f, "  {}", member)?;
        }

        if !self.padding.is_empty() {
            writeln!(
                f,
                "  // Padding ({} bytes total, {:.1}%):",
                self.total_padding(),
                self.padding_percentage()
            )?;
            for (offset, size) in &self.padding {
                writeln!(f, "  //   0x{:X} - 0x{:X} ({} bytes)", offset, offset + size, size)?;
            }
        }

        writeln!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(id: u64, name: &str, offset: u32, size: u32) -> MemberSlot {
        MemberSlot {
            member_id: MemberId::new(id),
            name: name.to_string(),
            type_string: "int".to_string(),
            offset,
            size,
            alignment: size.min(4),
            bit_field: None,
        }
    }

    #[test]
    fn test_find_padding_holes_and_tail() {
        let mut layout = TypeLayout::new(TypeId::new(1), "S", TypeKind::Struct);
        layout.members.push(slot(1, "c", 0, 1));
        layout.members.push(slot(2, "i", 4, 4));
        layout.members.push(slot(3, "d", 8, 1));
        layout.size = 12;
        layout.find_padding();

        assert_eq!(layout.padding, vec![(1, 3), (9, 3)]);
        assert_eq!(layout.total_padding(), 6);
        assert!((layout.padding_percentage() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_overlapping_members_are_not_padding() {
        let mut layout = TypeLayout::new(TypeId::new(1), "U", TypeKind::Union);
        layout.members.push(slot(1, "a", 0, 4));
        layout.members.push(slot(2, "b", 0, 1));
        layout.size = 4;
        layout.find_padding();
        assert!(layout.padding.is_empty());
        assert_eq!(layout.members_at_offset(0).count(), 2);
    }

    #[test]
    fn test_display_mentions_members() {
        let mut layout = TypeLayout::new(TypeId::new(1), "game::Node", TypeKind::Struct);
        layout.members.push(slot(1, "value", 0x10, 4));
        let text = layout.to_string();
        assert!(text.contains("struct game::Node"));
        assert!(text.contains("value @ 0x10"));
    }
}
