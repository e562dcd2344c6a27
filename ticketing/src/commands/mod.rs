pub mod image;
pub mod migrate;
pub mod serve;
