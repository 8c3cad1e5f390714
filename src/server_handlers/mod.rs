pub mod asignacion;
pub mod bloques;
pub mod catalogo;
pub mod clases;
pub mod conflictos;
pub mod disponibilidad;
pub mod grid;
