use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

use serde::{Deserialize, Serialize};

/// Element types understood by the downstream tensor runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DataType {
    Unknown,
    Float32,
    Float16,
    UInt32,
    UInt16,
    UInt8,
    Int32,
    Int16,
    Int8,
    Float64,
    UInt64,
    Int64,
}

impl DataType {
    pub const ALL: [DataType; 11] = [
        DataType::Float32,
        DataType::Float16,
        DataType::UInt32,
        DataType::UInt16,
        DataType::UInt8,
        DataType::Int32,
        DataType::Int16,
        DataType::Int8,
        DataType::Float64,
        DataType::UInt64,
        DataType::Int64,
    ];

    /// Storage width of one element; `0` for [`DataType::Unknown`].
    pub fn element_bits(self) -> u32 {
        match self {
            DataType::Float64 | DataType::UInt64 | DataType::Int64 => 64,
            DataType::Float32 | DataType::UInt32 | DataType::Int32 => 32,
            DataType::Float16 | DataType::UInt16 | DataType::Int16 => 16,
            DataType::UInt8 | DataType::Int8 => 8,
            DataType::Unknown => 0,
        }
    }

    pub fn size_in_bytes(self) -> u32 {
        self.element_bits() / 8
    }

    pub fn is_float(self) -> bool {
        matches!(
            self,
            DataType::Float16 | DataType::Float32 | DataType::Float64
        )
    }

    pub fn is_signed_integer(self) -> bool {
        matches!(
            self,
            DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64
        )
    }

    pub fn is_unsigned_integer(self) -> bool {
        matches!(
            self,
            DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64
        )
    }

    pub fn is_integer(self) -> bool {
        self.is_signed_integer() || self.is_unsigned_integer()
    }

    /// Bit assigned to this type inside a [`DataTypeMask`].
    pub fn mask(self) -> DataTypeMask {
        match self {
            DataType::Unknown => DataTypeMask::NONE,
            other => DataTypeMask(1 << other.ordinal()),
        }
    }

    fn ordinal(self) -> u32 {
        match self {
            DataType::Unknown => 0,
            DataType::Float32 => 1,
            DataType::Float16 => 2,
            DataType::UInt32 => 3,
            DataType::UInt16 => 4,
            DataType::UInt8 => 5,
            DataType::Int32 => 6,
            DataType::Int16 => 7,
            DataType::Int8 => 8,
            DataType::Float64 => 9,
            DataType::UInt64 => 10,
            DataType::Int64 => 11,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Unknown => "unknown",
            DataType::Float32 => "f32",
            DataType::Float16 => "f16",
            DataType::UInt32 => "u32",
            DataType::UInt16 => "u16",
            DataType::UInt8 => "u8",
            DataType::Int32 => "i32",
            DataType::Int16 => "i16",
            DataType::Int8 => "i8",
            DataType::Float64 => "f64",
            DataType::UInt64 => "u64",
            DataType::Int64 => "i64",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of data types, one bit per type (plus the 4-bit nibble types the runtime may report).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataTypeMask(u32);

impl DataTypeMask {
    pub const NONE: DataTypeMask = DataTypeMask(0);
    pub const FLOAT32: DataTypeMask = DataTypeMask(1 << 1);
    pub const FLOAT16: DataTypeMask = DataTypeMask(1 << 2);
    pub const UINT32: DataTypeMask = DataTypeMask(1 << 3);
    pub const UINT16: DataTypeMask = DataTypeMask(1 << 4);
    pub const UINT8: DataTypeMask = DataTypeMask(1 << 5);
    pub const INT32: DataTypeMask = DataTypeMask(1 << 6);
    pub const INT16: DataTypeMask = DataTypeMask(1 << 7);
    pub const INT8: DataTypeMask = DataTypeMask(1 << 8);
    pub const FLOAT64: DataTypeMask = DataTypeMask(1 << 9);
    pub const UINT64: DataTypeMask = DataTypeMask(1 << 10);
    pub const INT64: DataTypeMask = DataTypeMask(1 << 11);
    pub const UINT4: DataTypeMask = DataTypeMask(1 << 12);
    pub const INT4: DataTypeMask = DataTypeMask(1 << 13);

    pub const FLOAT16_32: DataTypeMask = DataTypeMask(Self::FLOAT32.0 | Self::FLOAT16.0);
    pub const ALL_FLOAT: DataTypeMask = DataTypeMask(Self::FLOAT16_32.0 | Self::FLOAT64.0);
    pub const ALL_SIGNED: DataTypeMask =
        DataTypeMask(Self::INT8.0 | Self::INT16.0 | Self::INT32.0 | Self::INT64.0);
    pub const ALL_UNSIGNED: DataTypeMask =
        DataTypeMask(Self::UINT8.0 | Self::UINT16.0 | Self::UINT32.0 | Self::UINT64.0);
    pub const ALL_INTEGER: DataTypeMask = DataTypeMask(Self::ALL_SIGNED.0 | Self::ALL_UNSIGNED.0);
    /// Float32/Float16 plus every 8..64 bit integer type.
    pub const NUMERIC: DataTypeMask = DataTypeMask(Self::FLOAT16_32.0 | Self::ALL_INTEGER.0);
    pub const SIGNED_NUMERIC: DataTypeMask = DataTypeMask(Self::FLOAT16_32.0 | Self::ALL_SIGNED.0);
    pub const UINT8_32: DataTypeMask = DataTypeMask(Self::UINT8.0 | Self::UINT32.0);
    pub const INT8_32: DataTypeMask =
        DataTypeMask(Self::UINT8.0 | Self::INT8.0 | Self::UINT32.0 | Self::INT32.0);
    pub const QUANTIZED_8: DataTypeMask = DataTypeMask(Self::UINT8.0 | Self::INT8.0);
    pub const INDEX: DataTypeMask =
        DataTypeMask(Self::UINT32.0 | Self::INT32.0 | Self::UINT64.0 | Self::INT64.0);
    pub const ALL_BUT_NIBBLE: DataTypeMask = DataTypeMask(Self::ALL_FLOAT.0 | Self::ALL_INTEGER.0);
    pub const ALL: DataTypeMask =
        DataTypeMask(Self::ALL_BUT_NIBBLE.0 | Self::UINT4.0 | Self::INT4.0);

    pub const fn from_bits(bits: u32) -> Self {
        DataTypeMask(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, data_type: DataType) -> bool {
        let bit = data_type.mask();
        !bit.is_empty() && (self.0 & bit.0) == bit.0
    }

    pub fn data_types(self) -> impl Iterator<Item = DataType> {
        DataType::ALL
            .into_iter()
            .filter(move |data_type| self.contains(*data_type))
    }
}

impl From<DataType> for DataTypeMask {
    fn from(value: DataType) -> Self {
        value.mask()
    }
}

impl BitOr for DataTypeMask {
    type Output = DataTypeMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        DataTypeMask(self.0 | rhs.0)
    }
}

impl BitAnd for DataTypeMask {
    type Output = DataTypeMask;

    fn bitand(self, rhs: Self) -> Self::Output {
        DataTypeMask(self.0 & rhs.0)
    }
}

impl Not for DataTypeMask {
    type Output = DataTypeMask;

    fn not(self) -> Self::Output {
        DataTypeMask(!self.0 & Self::ALL.0)
    }
}

impl fmt::Debug for DataTypeMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut set = f.debug_set();
        for data_type in self.data_types() {
            set.entry(&data_type);
        }
        if self.0 & Self::UINT4.0 != 0 {
            set.entry(&"u4");
        }
        if self.0 & Self::INT4.0 != 0 {
            set.entry(&"i4");
        }
        set.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_bits_are_distinct_per_type() {
        let mut seen = DataTypeMask::NONE;
        for data_type in DataType::ALL {
            assert!(!seen.contains(data_type));
            seen = seen | data_type.mask();
        }
        assert_eq!(seen, DataTypeMask::ALL_BUT_NIBBLE);
    }

    #[test]
    fn unknown_is_never_contained() {
        assert!(!DataTypeMask::ALL.contains(DataType::Unknown));
        assert_eq!(DataType::Unknown.element_bits(), 0);
    }
}
