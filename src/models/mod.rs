// Estructuras de datos principales del dominio de horarios.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Periodo {
    pub id: i64,
    pub gestion: i32,
    pub numero: i32,
    pub fecha_inicio: String,
    pub fecha_fin: String,
}

#[derive(Debug, Deserialize)]
pub struct NuevoPeriodo {
    pub gestion: i32,
    pub numero: i32,
    pub fecha_inicio: String,
    pub fecha_fin: String,
}

/// Configuración de bloques para un periodo académico. El calendario "activo"
/// de un periodo es el de id más alto.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calendario {
    pub id: i64,
    pub periodo: i64,
    pub nombre: Option<String>,
    pub duracion_bloque_min: i32,
}

#[derive(Debug, Deserialize)]
pub struct NuevoCalendario {
    pub periodo: i64,
    pub nombre: Option<String>,
    /// 45 por defecto
    pub duracion_bloque_min: Option<i32>,
}

/// Un bloque horario dentro de un calendario. Los bloques de un calendario
/// son contiguos: `orden` va de 1..N sin huecos y `hora_fin` siempre se
/// recalcula como `hora_inicio + duracion_min`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bloque {
    pub id: i64,
    pub calendario: i64,
    pub orden: i32,
    pub hora_inicio: String, // HH:MM:SS
    pub hora_fin: String,    // HH:MM:SS
    pub duracion_min: i32,
}

#[derive(Debug, Deserialize)]
pub struct NuevoBloque {
    pub calendario: i64,
    pub orden: i32,
    pub hora_inicio: String,
    pub duracion_min: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ActualizaBloque {
    pub orden: Option<i32>,
    pub hora_inicio: Option<String>,
    pub duracion_min: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Docente {
    pub id: i64,
    pub nombre_completo: String,
    pub especialidad: Option<String>,
    pub carga_min_semanal: i32,
    pub carga_max_semanal: i32,
    pub activo: bool,
}

#[derive(Debug, Deserialize)]
pub struct NuevoDocente {
    pub nombre_completo: String,
    pub especialidad: Option<String>,
    pub carga_min_semanal: Option<i32>,
    pub carga_max_semanal: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edificio {
    pub id: i64,
    pub codigo: String,
    pub nombre: String,
    pub ubicacion: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NuevoEdificio {
    pub codigo: String,
    pub nombre: String,
    pub ubicacion: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TipoAmbiente {
    pub id: i64,
    pub nombre: String, // Aula, Laboratorio, Auditorio...
    pub descripcion: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NuevoTipoAmbiente {
    pub nombre: String,
    pub descripcion: Option<String>,
}

/// Aula, laboratorio o auditorio dentro de un edificio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ambiente {
    pub id: i64,
    pub edificio: i64,
    pub tipo_ambiente: i64,
    pub codigo: String, // ej A-101
    pub nombre: Option<String>,
    pub capacidad: i32,
}

#[derive(Debug, Deserialize)]
pub struct NuevoAmbiente {
    pub edificio: i64,
    pub tipo_ambiente: i64,
    pub codigo: String,
    pub nombre: Option<String>,
    pub capacidad: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asignatura {
    pub id: i64,
    pub carrera: Option<i64>,
    pub codigo: String,
    pub nombre: String,
    pub horas_teoria_semana: i32,
    pub horas_practica_semana: i32,
    pub tipo_ambiente_teoria: Option<i64>,
    pub tipo_ambiente_practica: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct NuevaAsignatura {
    pub carrera: Option<i64>,
    pub codigo: String,
    pub nombre: String,
    pub horas_teoria_semana: Option<i32>,
    pub horas_practica_semana: Option<i32>,
    pub tipo_ambiente_teoria: Option<i64>,
    pub tipo_ambiente_practica: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turno {
    pub id: i64,
    pub nombre: String, // Mañana/Tarde/Noche
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrupoEstado {
    Borrador,
    Confirmado,
    Cerrado,
}

impl GrupoEstado {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrupoEstado::Borrador => "borrador",
            GrupoEstado::Confirmado => "confirmado",
            GrupoEstado::Cerrado => "cerrado",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "borrador" => Some(GrupoEstado::Borrador),
            "confirmado" => Some(GrupoEstado::Confirmado),
            "cerrado" => Some(GrupoEstado::Cerrado),
            _ => None,
        }
    }
}

/// Sección de estudiantes de una asignatura en un periodo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grupo {
    pub id: i64,
    pub asignatura: i64,
    pub periodo: i64,
    pub turno: i64,
    pub docente: Option<i64>,
    pub codigo: Option<String>, // A1, B2...
    pub capacidad: i32,
    pub estado: GrupoEstado,
}

#[derive(Debug, Deserialize)]
pub struct NuevoGrupo {
    pub asignatura: i64,
    pub periodo: i64,
    pub turno: i64,
    pub docente: Option<i64>,
    pub codigo: Option<String>,
    pub capacidad: Option<i32>,
}

/// Franja declarada por un docente como disponible para dictar clases.
/// `bloque_inicio` es el orden del bloque dentro del calendario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisponibilidadDocente {
    pub id: i64,
    pub docente: i64,
    pub calendario: i64,
    pub day_of_week: i32, // 1 = lunes .. 7 = domingo
    pub bloque_inicio: i32,
    pub bloques_duracion: i32,
    pub preferencia: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct NuevaDisponibilidad {
    pub docente: i64,
    pub calendario: i64,
    pub day_of_week: i32,
    pub bloque_inicio: i32,
    pub bloques_duracion: Option<i32>,
    pub preferencia: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaseTipo {
    T,
    P,
}

impl ClaseTipo {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaseTipo::T => "T",
            ClaseTipo::P => "P",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "T" => Some(ClaseTipo::T),
            "P" => Some(ClaseTipo::P),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaseEstado {
    Propuesto,
    Confirmado,
    Cancelado,
}

impl ClaseEstado {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaseEstado::Propuesto => "propuesto",
            ClaseEstado::Confirmado => "confirmado",
            ClaseEstado::Cancelado => "cancelado",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "propuesto" => Some(ClaseEstado::Propuesto),
            "confirmado" => Some(ClaseEstado::Confirmado),
            "cancelado" => Some(ClaseEstado::Cancelado),
            _ => None,
        }
    }
}

/// Una clase programada: la ocurrencia semanal de un grupo (teoría o
/// práctica) en un día, rango de bloques, ambiente y docente concretos.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clase {
    pub id: i64,
    pub grupo: i64,
    pub tipo: ClaseTipo,
    pub day_of_week: i32,
    pub bloque_inicio: i32, // orden del bloque
    pub bloques_duracion: i32,
    pub ambiente: Option<i64>,
    pub docente: Option<i64>,
    pub docente_substituto: Option<i64>,
    pub estado: ClaseEstado,
}

impl Clase {
    /// Orden del primer bloque posterior al rango ocupado.
    pub fn bloque_fin(&self) -> i32 {
        self.bloque_inicio + self.bloques_duracion
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NuevaClase {
    pub grupo: i64,
    pub tipo: ClaseTipo,
    pub day_of_week: i32,
    pub bloque_inicio: i32,
    pub bloques_duracion: Option<i32>,
    pub ambiente: Option<i64>,
    pub docente: Option<i64>,
    pub estado: Option<ClaseEstado>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConflictoTipo {
    Docente,
    Ambiente,
    Grupo,
}

impl ConflictoTipo {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictoTipo::Docente => "DOCENTE",
            ConflictoTipo::Ambiente => "AMBIENTE",
            ConflictoTipo::Grupo => "GRUPO",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DOCENTE" => Some(ConflictoTipo::Docente),
            "AMBIENTE" => Some(ConflictoTipo::Ambiente),
            "GRUPO" => Some(ConflictoTipo::Grupo),
            _ => None,
        }
    }
}

/// Solape detectado entre dos clases que comparten docente, ambiente o
/// grupo. Los conflictos nunca se borran: se marcan `resuelto`.
///
/// Un conflicto transitorio (resultado de una detección con
/// `persistir: false` o de un movimiento en dry-run) lleva `id == 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conflicto {
    pub id: i64,
    pub tipo: ConflictoTipo,
    pub clase_a: i64,
    pub clase_b: i64,
    pub resuelto: bool,
    pub nota: Option<String>,
    pub detectado_en: String, // ISO-8601
}

/// Registro de auditoría de un movimiento aplicado sobre una clase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CambioHorario {
    pub id: i64,
    pub clase: i64,
    pub usuario: Option<i64>,
    pub motivo: Option<String>,
    pub old_day_of_week: Option<i32>,
    pub old_bloque_inicio: Option<i32>,
    pub old_bloques_duracion: Option<i32>,
    pub old_ambiente: Option<i64>,
    pub old_docente: Option<i64>,
    pub new_day_of_week: Option<i32>,
    pub new_bloque_inicio: Option<i32>,
    pub new_bloques_duracion: Option<i32>,
    pub new_ambiente: Option<i64>,
    pub new_docente: Option<i64>,
    pub fecha: String, // ISO-8601
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CargaEstado {
    Ok,
    Bajo,
    Exceso,
}
