// Tabla de conflictos y registro de cambios de horario. Los conflictos no
// se borran nunca; `resolver` los marca y la re-detección deduplica contra
// los no resueltos por (tipo, par de clases sin orden).

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use crate::errors::ApiError;
use crate::models::{CambioHorario, Conflicto, ConflictoTipo};
use crate::store::Store;

fn fila_conflicto(row: &Row) -> rusqlite::Result<Conflicto> {
    let tipo: String = row.get(1)?;
    Ok(Conflicto {
        id: row.get(0)?,
        tipo: ConflictoTipo::parse(&tipo).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                1,
                rusqlite::types::Type::Text,
                format!("tipo de conflicto desconocido: {}", tipo).into(),
            )
        })?,
        clase_a: row.get(2)?,
        clase_b: row.get(3)?,
        resuelto: row.get::<_, i64>(4)? != 0,
        nota: row.get(5)?,
        detectado_en: row.get(6)?,
    })
}

/// Par normalizado: (menor, mayor), para que (A,B) y (B,A) sean el mismo par.
fn par_ordenado(a: i64, b: i64) -> (i64, i64) {
    if a <= b { (a, b) } else { (b, a) }
}

impl Store {
    pub fn listar_conflictos(&self) -> Result<Vec<Conflicto>, ApiError> {
        let conn = self.con();
        let mut stmt = conn.prepare(
            "SELECT id, tipo, clase_a, clase_b, resuelto, nota, detectado_en
             FROM conflictos ORDER BY id DESC",
        )?;
        let rows = stmt.query_map([], fila_conflicto)?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    /// ¿Existe ya un conflicto NO resuelto para este (tipo, par)?
    pub fn conflicto_no_resuelto_existe(
        &self,
        tipo: ConflictoTipo,
        clase_a: i64,
        clase_b: i64,
    ) -> Result<bool, ApiError> {
        let (a, b) = par_ordenado(clase_a, clase_b);
        let conn = self.con();
        let existe: Option<i64> = conn
            .query_row(
                "SELECT id FROM conflictos
                 WHERE tipo = ?1 AND clase_a = ?2 AND clase_b = ?3 AND resuelto = 0",
                params![tipo.as_str(), a, b],
                |r| r.get(0),
            )
            .optional()?;
        Ok(existe.is_some())
    }

    pub fn insertar_conflicto(
        &self,
        tipo: ConflictoTipo,
        clase_a: i64,
        clase_b: i64,
        nota: Option<&str>,
    ) -> Result<Conflicto, ApiError> {
        let (a, b) = par_ordenado(clase_a, clase_b);
        let detectado_en = Utc::now().to_rfc3339();
        let conn = self.con();
        conn.execute(
            "INSERT INTO conflictos (tipo, clase_a, clase_b, resuelto, nota, detectado_en)
             VALUES (?1, ?2, ?3, 0, ?4, ?5)",
            params![tipo.as_str(), a, b, nota, detectado_en],
        )?;
        Ok(Conflicto {
            id: conn.last_insert_rowid(),
            tipo,
            clase_a: a,
            clase_b: b,
            resuelto: false,
            nota: nota.map(|s| s.to_string()),
            detectado_en,
        })
    }

    /// Marca el conflicto como resuelto, sin re-verificar el solape: quien
    /// lo invoca (el movimiento) es responsable de haber arreglado la clase.
    pub fn resolver_conflicto(&self, id: i64) -> Result<Conflicto, ApiError> {
        {
            let conn = self.con();
            let n = conn.execute("UPDATE conflictos SET resuelto = 1 WHERE id = ?1", params![id])?;
            if n == 0 {
                return Err(ApiError::no_encontrado(format!("conflicto {}", id)));
            }
        }
        let conn = self.con();
        conn.query_row(
            "SELECT id, tipo, clase_a, clase_b, resuelto, nota, detectado_en FROM conflictos WHERE id = ?1",
            params![id],
            fila_conflicto,
        )
        .map_err(ApiError::from)
    }

    pub fn registrar_cambio(&self, c: &CambioHorario) -> Result<CambioHorario, ApiError> {
        let conn = self.con();
        conn.execute(
            "INSERT INTO cambios (clase, usuario, motivo,
             old_day_of_week, old_bloque_inicio, old_bloques_duracion, old_ambiente, old_docente,
             new_day_of_week, new_bloque_inicio, new_bloques_duracion, new_ambiente, new_docente, fecha)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                c.clase,
                c.usuario,
                c.motivo,
                c.old_day_of_week,
                c.old_bloque_inicio,
                c.old_bloques_duracion,
                c.old_ambiente,
                c.old_docente,
                c.new_day_of_week,
                c.new_bloque_inicio,
                c.new_bloques_duracion,
                c.new_ambiente,
                c.new_docente,
                c.fecha,
            ],
        )?;
        let mut guardado = c.clone();
        guardado.id = conn.last_insert_rowid();
        Ok(guardado)
    }

    pub fn listar_cambios(&self, clase: Option<i64>) -> Result<Vec<CambioHorario>, ApiError> {
        let conn = self.con();
        let mut sql = String::from(
            "SELECT id, clase, usuario, motivo,
             old_day_of_week, old_bloque_inicio, old_bloques_duracion, old_ambiente, old_docente,
             new_day_of_week, new_bloque_inicio, new_bloques_duracion, new_ambiente, new_docente, fecha
             FROM cambios",
        );
        let mut args: Vec<i64> = Vec::new();
        if let Some(c) = clase {
            sql.push_str(" WHERE clase = ?1");
            args.push(c);
        }
        sql.push_str(" ORDER BY id DESC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(args.iter()), |row| {
            Ok(CambioHorario {
                id: row.get(0)?,
                clase: row.get(1)?,
                usuario: row.get(2)?,
                motivo: row.get(3)?,
                old_day_of_week: row.get(4)?,
                old_bloque_inicio: row.get(5)?,
                old_bloques_duracion: row.get(6)?,
                old_ambiente: row.get(7)?,
                old_docente: row.get(8)?,
                new_day_of_week: row.get(9)?,
                new_bloque_inicio: row.get(10)?,
                new_bloques_duracion: row.get(11)?,
                new_ambiente: row.get(12)?,
                new_docente: row.get(13)?,
                fecha: row.get(14)?,
            })
        })?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }
}
