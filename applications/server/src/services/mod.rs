/// Server services
pub mod tree;

pub use tree::BuiltTree;
