use std::fmt::{Display, Formatter};

/// Representation of a value as it crosses a call boundary.
///
/// Tagged types participate in stack scanning; everything else is raw
/// machine data the collector must never interpret as a pointer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MachineType {
    /// Any heap value, pointer or small integer.
    AnyTagged,
    /// A tagged value known to be a heap pointer.
    TaggedPointer,
    /// A tagged value known to be a small integer.
    TaggedSigned,
    Int32,
    Uint32,
    Int64,
    Uint64,
    IntPtr,
    UintPtr,
    /// An untagged code or data address.
    Pointer,
    Float32,
    Float64,
}

impl MachineType {
    pub const fn is_tagged(self) -> bool {
        matches!(
            self,
            Self::AnyTagged | Self::TaggedPointer | Self::TaggedSigned
        )
    }

    pub const fn is_floating_point(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }
}

impl Display for MachineType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::AnyTagged => "any_tagged",
            Self::TaggedPointer => "tagged_pointer",
            Self::TaggedSigned => "tagged_signed",
            Self::Int32 => "int32",
            Self::Uint32 => "uint32",
            Self::Int64 => "int64",
            Self::Uint64 => "uint64",
            Self::IntPtr => "intptr",
            Self::UintPtr => "uintptr",
            Self::Pointer => "pointer",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::MachineType;

    #[test]
    fn tagged_predicate() {
        let tagged = [
            MachineType::AnyTagged,
            MachineType::TaggedPointer,
            MachineType::TaggedSigned,
        ];
        let untagged = [
            MachineType::Int32,
            MachineType::Uint32,
            MachineType::Int64,
            MachineType::IntPtr,
            MachineType::UintPtr,
            MachineType::Pointer,
            MachineType::Float32,
            MachineType::Float64,
        ];
        for ty in tagged {
            assert!(ty.is_tagged(), "{ty} should be tagged");
        }
        for ty in untagged {
            assert!(!ty.is_tagged(), "{ty} should not be tagged");
        }
    }

    #[test]
    fn floating_point_predicate() {
        assert!(MachineType::Float32.is_floating_point());
        assert!(MachineType::Float64.is_floating_point());
        assert!(!MachineType::AnyTagged.is_floating_point());
        assert!(!MachineType::IntPtr.is_floating_point());
    }
}
