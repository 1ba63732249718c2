//! Infrastructure layer: store, token verifiers and wire DTOs.

pub mod auth;
pub mod dto;
pub mod repository;
