// Disponibilidad declarada por los docentes, por calendario.

use rusqlite::{params, OptionalExtension, Row};

use crate::errors::ApiError;
use crate::models::{DisponibilidadDocente, NuevaDisponibilidad};
use crate::store::Store;

fn fila_disp(row: &Row) -> rusqlite::Result<DisponibilidadDocente> {
    Ok(DisponibilidadDocente {
        id: row.get(0)?,
        docente: row.get(1)?,
        calendario: row.get(2)?,
        day_of_week: row.get(3)?,
        bloque_inicio: row.get(4)?,
        bloques_duracion: row.get(5)?,
        preferencia: row.get(6)?,
    })
}

fn validar_franja(day_of_week: i32, bloque_inicio: i32, bloques_duracion: i32) -> Result<(), ApiError> {
    if !(1..=7).contains(&day_of_week) {
        return Err(ApiError::validacion("day_of_week", "el día debe estar entre 1 (lunes) y 7 (domingo)"));
    }
    if bloque_inicio < 1 {
        return Err(ApiError::validacion("bloque_inicio", "el bloque inicial debe ser >= 1"));
    }
    if bloques_duracion < 1 {
        return Err(ApiError::validacion("bloques_duracion", "la duración en bloques debe ser >= 1"));
    }
    Ok(())
}

impl Store {
    pub fn listar_disponibilidad(
        &self,
        calendario: Option<i64>,
        day: Option<i32>,
        docente: Option<i64>,
    ) -> Result<Vec<DisponibilidadDocente>, ApiError> {
        let conn = self.con();
        let mut sql = String::from(
            "SELECT id, docente, calendario, day_of_week, bloque_inicio, bloques_duracion, preferencia
             FROM disponibilidad WHERE 1=1",
        );
        let mut args: Vec<i64> = Vec::new();
        if let Some(c) = calendario {
            sql.push_str(&format!(" AND calendario = ?{}", args.len() + 1));
            args.push(c);
        }
        if let Some(d) = day {
            sql.push_str(&format!(" AND day_of_week = ?{}", args.len() + 1));
            args.push(d as i64);
        }
        if let Some(d) = docente {
            sql.push_str(&format!(" AND docente = ?{}", args.len() + 1));
            args.push(d);
        }
        sql.push_str(" ORDER BY docente, day_of_week, bloque_inicio");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(args.iter()), fila_disp)?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    pub fn crear_disponibilidad(&self, d: &NuevaDisponibilidad) -> Result<DisponibilidadDocente, ApiError> {
        let dur = d.bloques_duracion.unwrap_or(1);
        validar_franja(d.day_of_week, d.bloque_inicio, dur)?;
        self.obtener_docente(d.docente)?;
        self.obtener_calendario(d.calendario)?;
        let conn = self.con();
        conn.execute(
            "INSERT INTO disponibilidad (docente, calendario, day_of_week, bloque_inicio, bloques_duracion, preferencia)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![d.docente, d.calendario, d.day_of_week, d.bloque_inicio, dur, d.preferencia],
        )?;
        Ok(DisponibilidadDocente {
            id: conn.last_insert_rowid(),
            docente: d.docente,
            calendario: d.calendario,
            day_of_week: d.day_of_week,
            bloque_inicio: d.bloque_inicio,
            bloques_duracion: dur,
            preferencia: d.preferencia,
        })
    }

    pub fn actualizar_disponibilidad(
        &self,
        id: i64,
        d: &NuevaDisponibilidad,
    ) -> Result<DisponibilidadDocente, ApiError> {
        let dur = d.bloques_duracion.unwrap_or(1);
        validar_franja(d.day_of_week, d.bloque_inicio, dur)?;
        let conn = self.con();
        let n = conn.execute(
            "UPDATE disponibilidad SET docente = ?1, calendario = ?2, day_of_week = ?3,
             bloque_inicio = ?4, bloques_duracion = ?5, preferencia = ?6 WHERE id = ?7",
            params![d.docente, d.calendario, d.day_of_week, d.bloque_inicio, dur, d.preferencia, id],
        )?;
        if n == 0 {
            return Err(ApiError::no_encontrado(format!("disponibilidad {}", id)));
        }
        Ok(DisponibilidadDocente {
            id,
            docente: d.docente,
            calendario: d.calendario,
            day_of_week: d.day_of_week,
            bloque_inicio: d.bloque_inicio,
            bloques_duracion: dur,
            preferencia: d.preferencia,
        })
    }

    pub fn eliminar_disponibilidad(&self, id: i64) -> Result<(), ApiError> {
        let conn = self.con();
        let n = conn.execute("DELETE FROM disponibilidad WHERE id = ?1", params![id])?;
        if n == 0 {
            return Err(ApiError::no_encontrado(format!("disponibilidad {}", id)));
        }
        Ok(())
    }

    /// Importa franjas desde texto CSV. Formato por línea:
    /// `docente,day_of_week,bloque_inicio[,bloques_duracion[,preferencia]]`.
    /// La primera línea puede ser una cabecera. Todo o nada: una línea
    /// inválida aborta la importación completa indicando su número.
    pub fn importar_disponibilidad_csv(&self, calendario: i64, texto: &str) -> Result<usize, ApiError> {
        self.obtener_calendario(calendario)?;

        let mut filas: Vec<(i64, i32, i32, i32, Option<i32>)> = Vec::new();
        for (num, linea) in texto.lines().enumerate() {
            let linea = linea.trim();
            if linea.is_empty() {
                continue;
            }
            if num == 0 && linea.to_lowercase().contains("docente") {
                continue; // cabecera
            }
            let campos: Vec<&str> = linea.split(',').map(|c| c.trim()).collect();
            if campos.len() < 3 {
                return Err(ApiError::validacion(
                    "csv",
                    format!("línea {}: se esperaban al menos docente, día y bloque", num + 1),
                ));
            }
            let parse_i32 = |campo: &str, valor: &str| -> Result<i32, ApiError> {
                valor.parse::<i32>().map_err(|_| {
                    ApiError::validacion("csv", format!("línea {}: {} inválido: {}", num + 1, campo, valor))
                })
            };
            let docente = valor_i64(campos[0], "docente", num + 1)?;
            let day = parse_i32("day_of_week", campos[1])?;
            let bloque = parse_i32("bloque_inicio", campos[2])?;
            let dur = if campos.len() > 3 && !campos[3].is_empty() {
                parse_i32("bloques_duracion", campos[3])?
            } else {
                1
            };
            let pref = if campos.len() > 4 && !campos[4].is_empty() {
                Some(parse_i32("preferencia", campos[4])?)
            } else {
                None
            };
            validar_franja(day, bloque, dur).map_err(|e| match e {
                ApiError::Validacion { campo, detalle } => {
                    ApiError::validacion(campo, format!("línea {}: {}", num + 1, detalle))
                }
                otro => otro,
            })?;
            filas.push((docente, day, bloque, dur, pref));
        }

        let mut conn = self.con();
        let tx = conn.transaction().map_err(ApiError::from)?;
        for (docente, day, bloque, dur, pref) in &filas {
            let existe: Option<i64> = tx
                .query_row("SELECT id FROM docentes WHERE id = ?1", params![docente], |r| r.get(0))
                .optional()?;
            if existe.is_none() {
                return Err(ApiError::validacion("csv", format!("docente {} no existe", docente)));
            }
            tx.execute(
                "INSERT INTO disponibilidad (docente, calendario, day_of_week, bloque_inicio, bloques_duracion, preferencia)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![docente, calendario, day, bloque, dur, pref],
            )?;
        }
        tx.commit().map_err(ApiError::from)?;
        Ok(filas.len())
    }
}

fn valor_i64(valor: &str, campo: &str, linea: usize) -> Result<i64, ApiError> {
    valor
        .parse::<i64>()
        .map_err(|_| ApiError::validacion("csv", format!("línea {}: {} inválido: {}", linea, campo, valor)))
}
