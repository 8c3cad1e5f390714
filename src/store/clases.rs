// Clases programadas: el recurso compartido que disputan detección de
// conflictos, asignación de aulas y movimientos. Las operaciones por lotes
// son transaccionales: o entra todo el lote o no entra nada.

use rusqlite::{params, OptionalExtension, Row};

use crate::errors::ApiError;
use crate::models::{Clase, ClaseEstado, ClaseTipo, NuevaClase};
use crate::store::Store;

pub(crate) fn fila_clase(row: &Row) -> rusqlite::Result<Clase> {
    let tipo: String = row.get(2)?;
    let estado: String = row.get(9)?;
    Ok(Clase {
        id: row.get(0)?,
        grupo: row.get(1)?,
        tipo: ClaseTipo::parse(&tipo).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                format!("tipo de clase desconocido: {}", tipo).into(),
            )
        })?,
        day_of_week: row.get(3)?,
        bloque_inicio: row.get(4)?,
        bloques_duracion: row.get(5)?,
        ambiente: row.get(6)?,
        docente: row.get(7)?,
        docente_substituto: row.get(8)?,
        estado: ClaseEstado::parse(&estado).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                9,
                rusqlite::types::Type::Text,
                format!("estado de clase desconocido: {}", estado).into(),
            )
        })?,
    })
}

const COLS: &str = "c.id, c.grupo, c.tipo, c.day_of_week, c.bloque_inicio, c.bloques_duracion,
    c.ambiente, c.docente, c.docente_substituto, c.estado";

impl Store {
    pub fn obtener_clase(&self, id: i64) -> Result<Clase, ApiError> {
        let conn = self.con();
        conn.query_row(
            &format!("SELECT {} FROM clases c WHERE c.id = ?1", COLS),
            params![id],
            fila_clase,
        )
        .optional()?
        .ok_or_else(|| ApiError::no_encontrado(format!("clase {}", id)))
    }

    /// Clases no canceladas de todos los grupos de un periodo, ordenadas por
    /// id para que los barridos por pares y los lotes sean deterministas.
    pub fn listar_clases_activas_periodo(&self, periodo: i64) -> Result<Vec<Clase>, ApiError> {
        let conn = self.con();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM clases c JOIN grupos g ON g.id = c.grupo
             WHERE g.periodo = ?1 AND c.estado != 'cancelado' ORDER BY c.id",
            COLS
        ))?;
        let rows = stmt.query_map(params![periodo], fila_clase)?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    pub fn listar_clases_grupo(&self, grupo: i64) -> Result<Vec<Clase>, ApiError> {
        let conn = self.con();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM clases c WHERE c.grupo = ?1 ORDER BY c.day_of_week, c.bloque_inicio",
            COLS
        ))?;
        let rows = stmt.query_map(params![grupo], fila_clase)?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    /// Listado para el panel de substituciones: clases del periodo del
    /// calendario dado, con filtros opcionales.
    pub fn listar_clases_preview(
        &self,
        periodo: i64,
        docente: Option<i64>,
        grupo: Option<i64>,
        asignatura: Option<i64>,
        has_substituto: Option<bool>,
    ) -> Result<Vec<Clase>, ApiError> {
        let conn = self.con();
        let mut sql = format!(
            "SELECT {} FROM clases c JOIN grupos g ON g.id = c.grupo
             WHERE g.periodo = ?1 AND c.estado != 'cancelado'",
            COLS
        );
        let mut args: Vec<i64> = vec![periodo];
        if let Some(d) = docente {
            sql.push_str(&format!(" AND c.docente = ?{}", args.len() + 1));
            args.push(d);
        }
        if let Some(gid) = grupo {
            sql.push_str(&format!(" AND c.grupo = ?{}", args.len() + 1));
            args.push(gid);
        }
        if let Some(a) = asignatura {
            sql.push_str(&format!(" AND g.asignatura = ?{}", args.len() + 1));
            args.push(a);
        }
        match has_substituto {
            Some(true) => sql.push_str(" AND c.docente_substituto IS NOT NULL"),
            Some(false) => sql.push_str(" AND c.docente_substituto IS NULL"),
            None => {}
        }
        sql.push_str(" ORDER BY c.id");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(args.iter()), fila_clase)?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    /// Alta en lote, todo o nada. Cada item se valida contra la grilla del
    /// calendario (`max_orden`) antes de escribir; cualquier fallo revierte
    /// el lote completo.
    pub fn crear_clases_bulk(&self, items: &[NuevaClase], max_orden: i32) -> Result<Vec<Clase>, ApiError> {
        let mut conn = self.con();
        let tx = conn.transaction().map_err(ApiError::from)?;
        let mut creadas = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let dur = item.bloques_duracion.unwrap_or(1);
            let estado = item.estado.unwrap_or(ClaseEstado::Propuesto);
            if !(1..=7).contains(&item.day_of_week) {
                return Err(ApiError::validacion(
                    "day_of_week",
                    format!("item {}: el día debe estar entre 1 y 7", i),
                ));
            }
            if dur < 1 {
                return Err(ApiError::validacion(
                    "bloques_duracion",
                    format!("item {}: la duración en bloques debe ser >= 1", i),
                ));
            }
            if item.bloque_inicio < 1 || item.bloque_inicio + dur - 1 > max_orden {
                return Err(ApiError::validacion(
                    "bloque_inicio",
                    format!(
                        "item {}: el rango de bloques {}..{} no cabe en la grilla (1..{})",
                        i,
                        item.bloque_inicio,
                        item.bloque_inicio + dur - 1,
                        max_orden
                    ),
                ));
            }
            let grupo_existe: Option<i64> = tx
                .query_row("SELECT id FROM grupos WHERE id = ?1", params![item.grupo], |r| r.get(0))
                .optional()?;
            if grupo_existe.is_none() {
                return Err(ApiError::validacion("grupo", format!("item {}: grupo {} no existe", i, item.grupo)));
            }
            tx.execute(
                "INSERT INTO clases (grupo, tipo, day_of_week, bloque_inicio, bloques_duracion,
                 ambiente, docente, docente_substituto, estado)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, ?8)",
                params![
                    item.grupo,
                    item.tipo.as_str(),
                    item.day_of_week,
                    item.bloque_inicio,
                    dur,
                    item.ambiente,
                    item.docente,
                    estado.as_str(),
                ],
            )?;
            creadas.push(Clase {
                id: tx.last_insert_rowid(),
                grupo: item.grupo,
                tipo: item.tipo,
                day_of_week: item.day_of_week,
                bloque_inicio: item.bloque_inicio,
                bloques_duracion: dur,
                ambiente: item.ambiente,
                docente: item.docente,
                docente_substituto: None,
                estado,
            });
        }
        tx.commit().map_err(ApiError::from)?;
        Ok(creadas)
    }

    /// Baja en lote. Devuelve cuántas se borraron y qué ids no existían.
    pub fn eliminar_clases_bulk(&self, ids: &[i64]) -> Result<(usize, Vec<i64>), ApiError> {
        let mut conn = self.con();
        let tx = conn.transaction().map_err(ApiError::from)?;
        let mut borradas = 0usize;
        let mut no_encontradas = Vec::new();
        for id in ids {
            let n = tx.execute("DELETE FROM clases WHERE id = ?1", params![id])?;
            if n == 0 {
                no_encontradas.push(*id);
            } else {
                borradas += 1;
            }
        }
        tx.commit().map_err(ApiError::from)?;
        Ok((borradas, no_encontradas))
    }

    pub fn actualizar_ubicacion_clase(
        &self,
        id: i64,
        day_of_week: i32,
        bloque_inicio: i32,
        bloques_duracion: i32,
    ) -> Result<(), ApiError> {
        let conn = self.con();
        let n = conn.execute(
            "UPDATE clases SET day_of_week = ?1, bloque_inicio = ?2, bloques_duracion = ?3 WHERE id = ?4",
            params![day_of_week, bloque_inicio, bloques_duracion, id],
        )?;
        if n == 0 {
            return Err(ApiError::no_encontrado(format!("clase {}", id)));
        }
        Ok(())
    }

    /// Aplica en una sola transacción las asignaciones de ambiente calculadas
    /// por un lote del auto-asignador.
    pub fn asignar_ambientes_bulk(&self, asignaciones: &[(i64, i64)]) -> Result<(), ApiError> {
        let mut conn = self.con();
        let tx = conn.transaction().map_err(ApiError::from)?;
        for (clase, ambiente) in asignaciones {
            let n = tx.execute(
                "UPDATE clases SET ambiente = ?1 WHERE id = ?2",
                params![ambiente, clase],
            )?;
            if n == 0 {
                return Err(ApiError::no_encontrado(format!("clase {}", clase)));
            }
        }
        tx.commit().map_err(ApiError::from)?;
        Ok(())
    }

    pub fn set_substituto(&self, clase: i64, docente_substituto: Option<i64>) -> Result<Clase, ApiError> {
        if let Some(d) = docente_substituto {
            self.obtener_docente(d)?;
        }
        {
            let conn = self.con();
            let n = conn.execute(
                "UPDATE clases SET docente_substituto = ?1 WHERE id = ?2",
                params![docente_substituto, clase],
            )?;
            if n == 0 {
                return Err(ApiError::no_encontrado(format!("clase {}", clase)));
            }
        }
        self.obtener_clase(clase)
    }
}
