pub mod dataset;
pub mod favorite;
pub mod filter;
pub mod language;
