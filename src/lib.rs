//! Stacked bar dashboards of hourly feed status, one SVG chart per ticker.

pub mod chart;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod file_processing;
pub mod page;
pub mod progress;
pub mod scale;
pub mod stack;
pub mod summary;
pub mod utils;

pub use chart::{Chart, Container, render};
pub use config::ChartConfig;
pub use dataset::{Dataset, Row};
pub use error::{ConfigError, LoadError};
pub use page::Page;
