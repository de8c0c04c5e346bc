// Application layer - Use cases for the measurement feed pipeline
pub mod gateway;
pub mod live_watcher;
pub mod measurement_store;
pub mod station_service;
pub mod view_engine;
