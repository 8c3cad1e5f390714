// Catálogo: periodos, turnos, docentes, edificios, tipos de ambiente,
// ambientes, asignaturas y grupos. CRUD mínimo que el resto del sistema
// necesita para operar.

use rusqlite::{params, OptionalExtension, Row};

use crate::errors::ApiError;
use crate::models::{
    Ambiente, Asignatura, Docente, Edificio, Grupo, GrupoEstado, NuevaAsignatura, NuevoAmbiente,
    NuevoDocente, NuevoEdificio, NuevoGrupo, NuevoPeriodo, NuevoTipoAmbiente, Periodo, TipoAmbiente,
    Turno,
};
use crate::store::Store;

fn fila_grupo(row: &Row) -> rusqlite::Result<Grupo> {
    let estado: String = row.get("estado")?;
    Ok(Grupo {
        id: row.get("id")?,
        asignatura: row.get("asignatura")?,
        periodo: row.get("periodo")?,
        turno: row.get("turno")?,
        docente: row.get("docente")?,
        codigo: row.get("codigo")?,
        capacidad: row.get("capacidad")?,
        estado: GrupoEstado::parse(&estado).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                format!("estado de grupo desconocido: {}", estado).into(),
            )
        })?,
    })
}

fn fila_docente(row: &Row) -> rusqlite::Result<Docente> {
    Ok(Docente {
        id: row.get("id")?,
        nombre_completo: row.get("nombre_completo")?,
        especialidad: row.get("especialidad")?,
        carga_min_semanal: row.get("carga_min_semanal")?,
        carga_max_semanal: row.get("carga_max_semanal")?,
        activo: row.get::<_, i64>("activo")? != 0,
    })
}

fn fila_ambiente(row: &Row) -> rusqlite::Result<Ambiente> {
    Ok(Ambiente {
        id: row.get("id")?,
        edificio: row.get("edificio")?,
        tipo_ambiente: row.get("tipo_ambiente")?,
        codigo: row.get("codigo")?,
        nombre: row.get("nombre")?,
        capacidad: row.get("capacidad")?,
    })
}

fn fila_asignatura(row: &Row) -> rusqlite::Result<Asignatura> {
    Ok(Asignatura {
        id: row.get("id")?,
        carrera: row.get("carrera")?,
        codigo: row.get("codigo")?,
        nombre: row.get("nombre")?,
        horas_teoria_semana: row.get("horas_teoria_semana")?,
        horas_practica_semana: row.get("horas_practica_semana")?,
        tipo_ambiente_teoria: row.get("tipo_ambiente_teoria")?,
        tipo_ambiente_practica: row.get("tipo_ambiente_practica")?,
    })
}

impl Store {
    pub fn crear_periodo(&self, p: &NuevoPeriodo) -> Result<Periodo, ApiError> {
        if p.numero != 1 && p.numero != 2 {
            return Err(ApiError::validacion("numero", "el número de periodo debe ser 1 o 2"));
        }
        let conn = self.con();
        conn.execute(
            "INSERT INTO periodos (gestion, numero, fecha_inicio, fecha_fin) VALUES (?1, ?2, ?3, ?4)",
            params![p.gestion, p.numero, p.fecha_inicio, p.fecha_fin],
        )?;
        let id = conn.last_insert_rowid();
        Ok(Periodo {
            id,
            gestion: p.gestion,
            numero: p.numero,
            fecha_inicio: p.fecha_inicio.clone(),
            fecha_fin: p.fecha_fin.clone(),
        })
    }

    pub fn listar_periodos(&self) -> Result<Vec<Periodo>, ApiError> {
        let conn = self.con();
        let mut stmt = conn.prepare(
            "SELECT id, gestion, numero, fecha_inicio, fecha_fin FROM periodos ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Periodo {
                id: row.get(0)?,
                gestion: row.get(1)?,
                numero: row.get(2)?,
                fecha_inicio: row.get(3)?,
                fecha_fin: row.get(4)?,
            })
        })?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    pub fn obtener_periodo(&self, id: i64) -> Result<Periodo, ApiError> {
        let conn = self.con();
        conn.query_row(
            "SELECT id, gestion, numero, fecha_inicio, fecha_fin FROM periodos WHERE id = ?1",
            params![id],
            |row| {
                Ok(Periodo {
                    id: row.get(0)?,
                    gestion: row.get(1)?,
                    numero: row.get(2)?,
                    fecha_inicio: row.get(3)?,
                    fecha_fin: row.get(4)?,
                })
            },
        )
        .optional()?
        .ok_or_else(|| ApiError::no_encontrado(format!("periodo {}", id)))
    }

    pub fn crear_turno(&self, nombre: &str) -> Result<Turno, ApiError> {
        if nombre.trim().is_empty() {
            return Err(ApiError::validacion("nombre", "el nombre del turno es obligatorio"));
        }
        let conn = self.con();
        conn.execute("INSERT INTO turnos (nombre) VALUES (?1)", params![nombre.trim()])?;
        Ok(Turno { id: conn.last_insert_rowid(), nombre: nombre.trim().to_string() })
    }

    pub fn listar_turnos(&self) -> Result<Vec<Turno>, ApiError> {
        let conn = self.con();
        let mut stmt = conn.prepare("SELECT id, nombre FROM turnos ORDER BY id")?;
        let rows = stmt.query_map([], |row| Ok(Turno { id: row.get(0)?, nombre: row.get(1)? }))?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    pub fn crear_docente(&self, d: &NuevoDocente) -> Result<Docente, ApiError> {
        if d.nombre_completo.trim().is_empty() {
            return Err(ApiError::validacion("nombre_completo", "el nombre es obligatorio"));
        }
        let min = d.carga_min_semanal.unwrap_or(0);
        let max = d.carga_max_semanal.unwrap_or(40);
        if min > max {
            return Err(ApiError::validacion(
                "carga_min_semanal",
                "la carga mínima no puede superar la máxima",
            ));
        }
        let conn = self.con();
        conn.execute(
            "INSERT INTO docentes (nombre_completo, especialidad, carga_min_semanal, carga_max_semanal, activo)
             VALUES (?1, ?2, ?3, ?4, 1)",
            params![d.nombre_completo.trim(), d.especialidad, min, max],
        )?;
        Ok(Docente {
            id: conn.last_insert_rowid(),
            nombre_completo: d.nombre_completo.trim().to_string(),
            especialidad: d.especialidad.clone(),
            carga_min_semanal: min,
            carga_max_semanal: max,
            activo: true,
        })
    }

    pub fn listar_docentes(&self) -> Result<Vec<Docente>, ApiError> {
        let conn = self.con();
        let mut stmt = conn.prepare(
            "SELECT id, nombre_completo, especialidad, carga_min_semanal, carga_max_semanal, activo
             FROM docentes ORDER BY id",
        )?;
        let rows = stmt.query_map([], fila_docente)?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    pub fn obtener_docente(&self, id: i64) -> Result<Docente, ApiError> {
        let conn = self.con();
        conn.query_row(
            "SELECT id, nombre_completo, especialidad, carga_min_semanal, carga_max_semanal, activo
             FROM docentes WHERE id = ?1",
            params![id],
            fila_docente,
        )
        .optional()?
        .ok_or_else(|| ApiError::no_encontrado(format!("docente {}", id)))
    }

    pub fn crear_edificio(&self, e: &NuevoEdificio) -> Result<Edificio, ApiError> {
        let conn = self.con();
        let existe: Option<i64> = conn
            .query_row("SELECT id FROM edificios WHERE codigo = ?1", params![e.codigo], |r| r.get(0))
            .optional()?;
        if existe.is_some() {
            return Err(ApiError::validacion("codigo", format!("código de edificio duplicado: {}", e.codigo)));
        }
        conn.execute(
            "INSERT INTO edificios (codigo, nombre, ubicacion) VALUES (?1, ?2, ?3)",
            params![e.codigo, e.nombre, e.ubicacion],
        )?;
        Ok(Edificio {
            id: conn.last_insert_rowid(),
            codigo: e.codigo.clone(),
            nombre: e.nombre.clone(),
            ubicacion: e.ubicacion.clone(),
        })
    }

    pub fn listar_edificios(&self) -> Result<Vec<Edificio>, ApiError> {
        let conn = self.con();
        let mut stmt = conn.prepare("SELECT id, codigo, nombre, ubicacion FROM edificios ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Edificio {
                id: row.get(0)?,
                codigo: row.get(1)?,
                nombre: row.get(2)?,
                ubicacion: row.get(3)?,
            })
        })?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    pub fn crear_tipo_ambiente(&self, t: &NuevoTipoAmbiente) -> Result<TipoAmbiente, ApiError> {
        let conn = self.con();
        conn.execute(
            "INSERT INTO tipos_ambiente (nombre, descripcion) VALUES (?1, ?2)",
            params![t.nombre, t.descripcion],
        )?;
        Ok(TipoAmbiente {
            id: conn.last_insert_rowid(),
            nombre: t.nombre.clone(),
            descripcion: t.descripcion.clone(),
        })
    }

    pub fn listar_tipos_ambiente(&self) -> Result<Vec<TipoAmbiente>, ApiError> {
        let conn = self.con();
        let mut stmt = conn.prepare("SELECT id, nombre, descripcion FROM tipos_ambiente ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(TipoAmbiente { id: row.get(0)?, nombre: row.get(1)?, descripcion: row.get(2)? })
        })?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    pub fn crear_ambiente(&self, a: &NuevoAmbiente) -> Result<Ambiente, ApiError> {
        let conn = self.con();
        let existe: Option<i64> = conn
            .query_row("SELECT id FROM ambientes WHERE codigo = ?1", params![a.codigo], |r| r.get(0))
            .optional()?;
        if existe.is_some() {
            return Err(ApiError::validacion("codigo", format!("código de ambiente duplicado: {}", a.codigo)));
        }
        if a.capacidad < 0 {
            return Err(ApiError::validacion("capacidad", "la capacidad no puede ser negativa"));
        }
        conn.execute(
            "INSERT INTO ambientes (edificio, tipo_ambiente, codigo, nombre, capacidad)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![a.edificio, a.tipo_ambiente, a.codigo, a.nombre, a.capacidad],
        )?;
        Ok(Ambiente {
            id: conn.last_insert_rowid(),
            edificio: a.edificio,
            tipo_ambiente: a.tipo_ambiente,
            codigo: a.codigo.clone(),
            nombre: a.nombre.clone(),
            capacidad: a.capacidad,
        })
    }

    pub fn listar_ambientes(&self) -> Result<Vec<Ambiente>, ApiError> {
        let conn = self.con();
        let mut stmt = conn.prepare(
            "SELECT id, edificio, tipo_ambiente, codigo, nombre, capacidad FROM ambientes ORDER BY id",
        )?;
        let rows = stmt.query_map([], fila_ambiente)?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    pub fn crear_asignatura(&self, a: &NuevaAsignatura) -> Result<Asignatura, ApiError> {
        let conn = self.con();
        let existe: Option<i64> = conn
            .query_row("SELECT id FROM asignaturas WHERE codigo = ?1", params![a.codigo], |r| r.get(0))
            .optional()?;
        if existe.is_some() {
            return Err(ApiError::validacion("codigo", format!("código de asignatura duplicado: {}", a.codigo)));
        }
        conn.execute(
            "INSERT INTO asignaturas (carrera, codigo, nombre, horas_teoria_semana, horas_practica_semana,
             tipo_ambiente_teoria, tipo_ambiente_practica) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                a.carrera,
                a.codigo,
                a.nombre,
                a.horas_teoria_semana.unwrap_or(0),
                a.horas_practica_semana.unwrap_or(0),
                a.tipo_ambiente_teoria,
                a.tipo_ambiente_practica,
            ],
        )?;
        Ok(Asignatura {
            id: conn.last_insert_rowid(),
            carrera: a.carrera,
            codigo: a.codigo.clone(),
            nombre: a.nombre.clone(),
            horas_teoria_semana: a.horas_teoria_semana.unwrap_or(0),
            horas_practica_semana: a.horas_practica_semana.unwrap_or(0),
            tipo_ambiente_teoria: a.tipo_ambiente_teoria,
            tipo_ambiente_practica: a.tipo_ambiente_practica,
        })
    }

    pub fn listar_asignaturas(&self) -> Result<Vec<Asignatura>, ApiError> {
        let conn = self.con();
        let mut stmt = conn.prepare(
            "SELECT id, carrera, codigo, nombre, horas_teoria_semana, horas_practica_semana,
             tipo_ambiente_teoria, tipo_ambiente_practica FROM asignaturas ORDER BY id",
        )?;
        let rows = stmt.query_map([], fila_asignatura)?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    pub fn crear_grupo(&self, g: &NuevoGrupo) -> Result<Grupo, ApiError> {
        let conn = self.con();
        conn.execute(
            "INSERT INTO grupos (asignatura, periodo, turno, docente, codigo, capacidad, estado)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                g.asignatura,
                g.periodo,
                g.turno,
                g.docente,
                g.codigo,
                g.capacidad.unwrap_or(0),
                GrupoEstado::Borrador.as_str(),
            ],
        )?;
        Ok(Grupo {
            id: conn.last_insert_rowid(),
            asignatura: g.asignatura,
            periodo: g.periodo,
            turno: g.turno,
            docente: g.docente,
            codigo: g.codigo.clone(),
            capacidad: g.capacidad.unwrap_or(0),
            estado: GrupoEstado::Borrador,
        })
    }

    /// Grupos de un periodo, opcionalmente filtrados por asignatura y turno.
    pub fn listar_grupos(
        &self,
        periodo: Option<i64>,
        asignatura: Option<i64>,
        turno: Option<i64>,
    ) -> Result<Vec<Grupo>, ApiError> {
        let conn = self.con();
        let mut sql = String::from(
            "SELECT id, asignatura, periodo, turno, docente, codigo, capacidad, estado
             FROM grupos WHERE 1=1",
        );
        let mut args: Vec<i64> = Vec::new();
        if let Some(p) = periodo {
            sql.push_str(&format!(" AND periodo = ?{}", args.len() + 1));
            args.push(p);
        }
        if let Some(a) = asignatura {
            sql.push_str(&format!(" AND asignatura = ?{}", args.len() + 1));
            args.push(a);
        }
        if let Some(t) = turno {
            sql.push_str(&format!(" AND turno = ?{}", args.len() + 1));
            args.push(t);
        }
        sql.push_str(" ORDER BY id");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(args.iter()), fila_grupo)?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    pub fn obtener_grupo(&self, id: i64) -> Result<Grupo, ApiError> {
        let conn = self.con();
        conn.query_row(
            "SELECT id, asignatura, periodo, turno, docente, codigo, capacidad, estado
             FROM grupos WHERE id = ?1",
            params![id],
            fila_grupo,
        )
        .optional()?
        .ok_or_else(|| ApiError::no_encontrado(format!("grupo {}", id)))
    }

    /// Escribe el docente propuesto en el grupo solo si no tiene uno asignado.
    /// Devuelve true si el grupo quedó actualizado.
    pub fn asignar_docente_grupo(&self, grupo: i64, docente: i64) -> Result<bool, ApiError> {
        let conn = self.con();
        let n = conn.execute(
            "UPDATE grupos SET docente = ?1 WHERE id = ?2 AND docente IS NULL",
            params![docente, grupo],
        )?;
        Ok(n > 0)
    }
}
