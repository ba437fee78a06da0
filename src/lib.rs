pub mod archive;
pub mod calendar;
pub mod config;
pub mod coordinate;
pub mod error;
pub mod feed;
pub mod fetch;
pub mod model;
pub mod output;
pub mod sheet;
pub mod stops;
pub mod trips;
