//! Result export

pub mod csv;

pub use csv::{
    save_correlation_csv, save_histogram_csv, save_sweep_csv, write_correlation_csv,
    write_histogram_csv, write_sweep_csv,
};
