pub mod core;
pub mod input_selector;
pub mod permissions;
