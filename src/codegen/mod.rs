pub mod descriptor;
pub mod machine;
pub mod targets;
