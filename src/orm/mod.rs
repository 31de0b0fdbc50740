//! SeaORM entities and their schema tables

pub mod cases;
pub mod clients;
pub mod evidence;
pub mod locations;
pub mod reports;
