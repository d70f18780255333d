pub mod get;
pub mod list;
pub mod props;
pub mod status;
