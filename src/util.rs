pub mod path;
pub mod records;
