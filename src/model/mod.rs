pub mod battle;
pub mod eve;
pub mod structure;
