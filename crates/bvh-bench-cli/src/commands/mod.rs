pub mod collect;
pub mod sweep;
