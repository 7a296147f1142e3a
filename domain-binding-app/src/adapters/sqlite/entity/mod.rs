//! `SeaORM` entities for `SqliteStore`.

pub mod application;
pub mod certificate;
pub mod domain;
