//! Core functionality: storage adapter, file repository, viewer and configuration

pub mod config;
pub mod error;
pub mod repository;
pub mod store;
pub mod viewer;
