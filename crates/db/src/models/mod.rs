//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` row struct and the
//! `Deserialize` DTOs used to insert or patch it.

pub mod ballot;
pub mod knowledge_question;
pub mod option;
pub mod population;
pub mod result;
pub mod vote;
