//! Model to entity mappers
//!
//! - `From<Model> for Entity` where every row is a valid entity
//! - `TryFrom<Model> for Entity` where the row carries values the domain re-validates
//!   (coordinates, action flags)

mod log_entry;
mod profile;
mod user;

pub use profile::point_columns;
