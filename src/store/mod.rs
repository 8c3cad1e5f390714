// Persistencia del dominio sobre SQLite.

mod calendarios;
mod catalogo;
mod clases;
mod conflictos;
mod db;
mod disponibilidad;

pub use db::{db_path, Store};
