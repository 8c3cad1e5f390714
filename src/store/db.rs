use rusqlite::Connection;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use crate::errors::ApiError;

// load .env at module init if present
fn load_dotenv() {
    let _ = dotenv::dotenv();
}

/// Ruta del archivo SQLite. Honra AULAGRID_DB_PATH / AULAGRID_DB_URL
/// (esquemas sqlite:// y file://).
pub fn db_path() -> PathBuf {
    load_dotenv();
    if let Ok(p) = env::var("AULAGRID_DB_PATH") {
        PathBuf::from(p)
    } else if let Ok(p) = env::var("AULAGRID_DB_URL") {
        if p.starts_with("sqlite://") {
            PathBuf::from(p.trim_start_matches("sqlite://"))
        } else if p.starts_with("file://") {
            PathBuf::from(p.trim_start_matches("file://"))
        } else {
            PathBuf::from("data/aulagrid.db")
        }
    } else {
        PathBuf::from("data/aulagrid.db")
    }
}

/// Almacén del dominio: una única conexión SQLite detrás de un mutex.
/// Las operaciones por lotes (detección, asignación de aulas, bulk-create)
/// además se serializan por calendario con `scheduling::locks`.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Abre (o crea) la base en la ruta resuelta por entorno.
    pub fn abrir() -> Result<Store, ApiError> {
        let path = db_path();
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)
                    .map_err(|e| ApiError::Interno(format!("no se pudo crear {}: {}", dir.display(), e)))?;
            }
        }
        let conn = Connection::open(&path)?;
        init_schema(&conn)?;
        Ok(Store { conn: Mutex::new(conn) })
    }

    /// Base en memoria, para tests.
    pub fn abrir_en_memoria() -> Result<Store, ApiError> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Store { conn: Mutex::new(conn) })
    }

    pub(crate) fn con(&self) -> MutexGuard<'_, Connection> {
        // El mutex solo se envenena si otro hilo entró en pánico con la
        // conexión tomada; en ese caso seguimos con el guard igualmente.
        match self.conn.lock() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        }
    }
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS periodos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            gestion INTEGER NOT NULL,
            numero INTEGER NOT NULL,
            fecha_inicio TEXT NOT NULL,
            fecha_fin TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS calendarios (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            periodo INTEGER NOT NULL REFERENCES periodos(id),
            nombre TEXT,
            duracion_bloque_min INTEGER NOT NULL DEFAULT 45
        );

        CREATE TABLE IF NOT EXISTS bloques (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            calendario INTEGER NOT NULL REFERENCES calendarios(id),
            orden INTEGER NOT NULL,
            hora_inicio TEXT NOT NULL,
            hora_fin TEXT NOT NULL,
            duracion_min INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS docentes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nombre_completo TEXT NOT NULL,
            especialidad TEXT,
            carga_min_semanal INTEGER NOT NULL DEFAULT 0,
            carga_max_semanal INTEGER NOT NULL DEFAULT 40,
            activo INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS edificios (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            codigo TEXT NOT NULL UNIQUE,
            nombre TEXT NOT NULL,
            ubicacion TEXT
        );

        CREATE TABLE IF NOT EXISTS tipos_ambiente (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nombre TEXT NOT NULL,
            descripcion TEXT
        );

        CREATE TABLE IF NOT EXISTS ambientes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            edificio INTEGER NOT NULL REFERENCES edificios(id),
            tipo_ambiente INTEGER NOT NULL REFERENCES tipos_ambiente(id),
            codigo TEXT NOT NULL UNIQUE,
            nombre TEXT,
            capacidad INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS asignaturas (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            carrera INTEGER,
            codigo TEXT NOT NULL UNIQUE,
            nombre TEXT NOT NULL,
            horas_teoria_semana INTEGER NOT NULL DEFAULT 0,
            horas_practica_semana INTEGER NOT NULL DEFAULT 0,
            tipo_ambiente_teoria INTEGER REFERENCES tipos_ambiente(id),
            tipo_ambiente_practica INTEGER REFERENCES tipos_ambiente(id)
        );

        CREATE TABLE IF NOT EXISTS turnos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nombre TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS grupos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            asignatura INTEGER NOT NULL REFERENCES asignaturas(id),
            periodo INTEGER NOT NULL REFERENCES periodos(id),
            turno INTEGER NOT NULL REFERENCES turnos(id),
            docente INTEGER REFERENCES docentes(id),
            codigo TEXT,
            capacidad INTEGER NOT NULL DEFAULT 0,
            estado TEXT NOT NULL DEFAULT 'borrador'
        );

        CREATE TABLE IF NOT EXISTS disponibilidad (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            docente INTEGER NOT NULL REFERENCES docentes(id),
            calendario INTEGER NOT NULL REFERENCES calendarios(id),
            day_of_week INTEGER NOT NULL,
            bloque_inicio INTEGER NOT NULL,
            bloques_duracion INTEGER NOT NULL DEFAULT 1,
            preferencia INTEGER
        );

        CREATE TABLE IF NOT EXISTS clases (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            grupo INTEGER NOT NULL REFERENCES grupos(id),
            tipo TEXT NOT NULL,
            day_of_week INTEGER NOT NULL,
            bloque_inicio INTEGER NOT NULL,
            bloques_duracion INTEGER NOT NULL DEFAULT 1,
            ambiente INTEGER REFERENCES ambientes(id),
            docente INTEGER REFERENCES docentes(id),
            docente_substituto INTEGER REFERENCES docentes(id),
            estado TEXT NOT NULL DEFAULT 'propuesto'
        );

        CREATE TABLE IF NOT EXISTS conflictos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tipo TEXT NOT NULL,
            clase_a INTEGER NOT NULL,
            clase_b INTEGER NOT NULL,
            resuelto INTEGER NOT NULL DEFAULT 0,
            nota TEXT,
            detectado_en TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS cambios (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            clase INTEGER NOT NULL,
            usuario INTEGER,
            motivo TEXT,
            old_day_of_week INTEGER,
            old_bloque_inicio INTEGER,
            old_bloques_duracion INTEGER,
            old_ambiente INTEGER,
            old_docente INTEGER,
            new_day_of_week INTEGER,
            new_bloque_inicio INTEGER,
            new_bloques_duracion INTEGER,
            new_ambiente INTEGER,
            new_docente INTEGER,
            fecha TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_bloques_calendario ON bloques(calendario, orden);
        CREATE INDEX IF NOT EXISTS idx_clases_grupo ON clases(grupo);
        CREATE INDEX IF NOT EXISTS idx_disponibilidad_doc ON disponibilidad(calendario, docente);
        CREATE INDEX IF NOT EXISTS idx_conflictos_par ON conflictos(tipo, clase_a, clase_b);
        ",
    )
}
