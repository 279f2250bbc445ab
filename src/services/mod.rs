pub mod combine;
pub mod corpus;
pub mod digest;
pub mod encoding;
pub mod favorites;
pub mod fetch;
pub mod filename;
pub mod filter_task;
pub mod intake;
pub mod languages;
pub mod listing;
pub mod normalize;
pub mod ordering;
pub mod pairing;
pub mod search;
pub mod sentences;
pub mod staging;
pub mod store;
pub mod update;
