// Presentation layer - display-ready and export-ready projections
pub mod charts;
pub mod export;
pub mod table;
