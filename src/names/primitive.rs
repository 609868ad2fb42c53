// Fri Oct 16 2026 - Alex

use ahash::AHashMap;
use once_cell::sync::Lazy;
use std::fmt;

/// Primitive leaves of the 32-bit x86 size table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Void,
    Bool,
    I8,
    U8,
    I16,
    U16,
    WChar,
    I32,
    U32,
    F32,
    Usize,
    Isize,
    I64,
    U64,
    F64,
}

static PRIMITIVE_NAMES: Lazy<AHashMap<&'static str, PrimitiveType>> = Lazy::new(|| {
    use PrimitiveType::*;

    let entries: &[(&str, PrimitiveType)] = &[
        ("void", Void),
        ("VOID", Void),
        // 1 byte
        ("bool", Bool),
        ("_BOOL1", Bool),
        ("BOOLEAN", Bool),
        ("char", I8),
        ("signed char", I8),
        ("__int8", I8),
        ("int8_t", I8),
        ("CHAR", I8),
        ("unsigned char", U8),
        ("unsigned __int8", U8),
        ("uint8_t", U8),
        ("_BYTE", U8),
        ("BYTE", U8),
        ("byte", U8),
        ("UCHAR", U8),
        ("_UNKNOWN", U8),
        // 2 bytes
        ("short", I16),
        ("short int", I16),
        ("signed short", I16),
        ("signed short int", I16),
        ("__int16", I16),
        ("int16_t", I16),
        ("SHORT", I16),
        ("unsigned short", U16),
        ("unsigned short int", U16),
        ("unsigned __int16", U16),
        ("uint16_t", U16),
        ("_WORD", U16),
        ("WORD", U16),
        ("USHORT", U16),
        ("_BOOL2", U16),
        ("wchar_t", WChar),
        ("char16_t", WChar),
        ("WCHAR", WChar),
        // 4 bytes
        ("int", I32),
        ("signed", I32),
        ("signed int", I32),
        ("long", I32),
        ("long int", I32),
        ("signed long", I32),
        ("__int32", I32),
        ("int32_t", I32),
        ("INT", I32),
        ("LONG", I32),
        ("BOOL", I32),
        ("_BOOL4", I32),
        ("HRESULT", I32),
        ("char32_t", U32),
        ("unsigned", U32),
        ("unsigned int", U32),
        ("unsigned long", U32),
        ("unsigned long int", U32),
        ("unsigned __int32", U32),
        ("uint32_t", U32),
        ("_DWORD", U32),
        ("DWORD", U32),
        ("UINT", U32),
        ("ULONG", U32),
        ("float", F32),
        ("FLOAT", F32),
        ("size_t", Usize),
        ("uintptr_t", Usize),
        ("UINT_PTR", Usize),
        ("ULONG_PTR", Usize),
        ("DWORD_PTR", Usize),
        ("ssize_t", Isize),
        ("ptrdiff_t", Isize),
        ("intptr_t", Isize),
        ("INT_PTR", Isize),
        ("LONG_PTR", Isize),
        // 8 bytes
        ("long long", I64),
        ("long long int", I64),
        ("signed long long", I64),
        ("__int64", I64),
        ("int64_t", I64),
        ("LONGLONG", I64),
        ("unsigned long long", U64),
        ("unsigned long long int", U64),
        ("unsigned __int64", U64),
        ("uint64_t", U64),
        ("_QWORD", U64),
        ("QWORD", U64),
        ("ULONGLONG", U64),
        ("double", F64),
        ("long double", F64),
        ("DOUBLE", F64),
    ];

    entries.iter().copied().collect()
});

impl PrimitiveType {
    pub fn from_name(name: &str) -> Option<Self> {
        PRIMITIVE_NAMES.get(name).copied()
    }

    pub fn size(self) -> u32 {
        match self {
            Self::Void => 0,
            Self::Bool | Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 | Self::WChar => 2,
            Self::I32 | Self::U32 | Self::F32 | Self::Usize | Self::Isize => 4,
            Self::I64 | Self::U64 | Self::F64 => 8,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Void => "void",
            Self::Bool => "bool",
            Self::I8 => "char",
            Self::U8 => "unsigned char",
            Self::I16 => "short",
            Self::U16 => "unsigned short",
            Self::WChar => "wchar_t",
            Self::I32 => "int",
            Self::U32 => "unsigned int",
            Self::F32 => "float",
            Self::Usize => "size_t",
            Self::Isize => "ptrdiff_t",
            Self::I64 => "__int64",
            Self::U64 => "unsigned __int64",
            Self::F64 => "double",
        };
        f.write_str(name)
    }
}

/// Size of a primitive by name, `None` when the name is not in the table
pub fn primitive_type_size(name: &str) -> Option<u32> {
    PrimitiveType::from_name(name).map(PrimitiveType::size)
}

pub fn is_primitive_name(name: &str) -> bool {
    PRIMITIVE_NAMES.contains_key(name)
}

pub fn all_primitive_names() -> impl Iterator<Item = &'static str> {
    PRIMITIVE_NAMES.keys().copied()
}
