pub mod completions;
pub mod generate;
pub mod solve;
pub mod validate;
