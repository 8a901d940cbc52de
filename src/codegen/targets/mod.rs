pub mod ia32;
pub mod x86_64;
