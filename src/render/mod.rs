pub mod tables;
pub mod tree;
