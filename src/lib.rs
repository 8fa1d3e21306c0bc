pub mod cells;
pub mod config;
pub mod csv_io;
pub mod importers;
pub mod models;
pub mod normalize;
pub mod resampler;
pub mod schema;
