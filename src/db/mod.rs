// src/db/mod.rs
// DOCUMENTATION: Database module organization
// PURPOSE: Re-export database components

pub mod city_set_repository;
pub mod photo_repository;

pub use city_set_repository::*;
pub use photo_repository::*;
