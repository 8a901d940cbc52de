pub use isa::{
    PhysicalRegister,
    TargetIsa,
};
pub use machine_type::MachineType;

pub mod isa;
pub mod machine_type;
