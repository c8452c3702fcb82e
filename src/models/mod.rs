// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod city_set;
pub mod de;
pub mod pagination;
pub mod photo;

pub use city_set::*;
pub use pagination::*;
pub use photo::*;
