// Motores de planificación: detección de conflictos, propuesta de docentes,
// auto-asignación de aulas, proyección de grilla y resúmenes de carga.

pub mod cargas;
pub mod conflict;
pub mod grid;
pub mod locks;
pub mod propose;
pub mod rooms;
