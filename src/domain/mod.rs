// Domain layer - Core types for the measurement feed
pub mod measurement;
pub mod query;
pub mod station;
