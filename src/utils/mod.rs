pub mod glob;
pub mod path_validator;

pub use glob::compile_glob;
pub use path_validator::PathValidator;
