//! Battle-report ingestion and team attribution for the Hawks/Coalition
//! wormhole war.
//!
//! The pipeline consumes pre-fetched battle report documents one at a time,
//! registers every pilot, ship, corp, alliance, and system it encounters in a
//! deduplicated in-memory database, attributes each battle side to a
//! coalition using the curated allegiance document, and folds structure
//! sightings into cross-battle histories with estimated reinforcement
//! timers. Downstream reporting consumes the finished database read-only.

pub mod attribution;
pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod registry;
pub mod source;
pub mod structures;
pub mod teams;
