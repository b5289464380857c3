pub mod domain;
pub mod engine;
pub mod repository;
pub mod services;
