// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod cache;
pub mod city_set_service;
pub mod map_features;
pub mod object_store;
pub mod photo_service;

pub use cache::*;
pub use city_set_service::*;
pub use map_features::*;
pub use object_store::*;
pub use photo_service::*;
