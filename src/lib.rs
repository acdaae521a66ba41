#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod fetch;
pub mod gallery;
pub mod index;
pub mod logging;
pub mod seasons;
pub mod shows;
pub mod store;
pub mod text;
pub mod update;
