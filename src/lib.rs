// Measurement feed reconciliation and presentation pipeline for the
// environmental-monitoring dashboard
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
