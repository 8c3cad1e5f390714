// Calendarios y su grilla de bloques. Toda mutación de bloques revalida el
// invariante completo del calendario: `orden` contiguo 1..N y franjas sin
// solapes, con `hora_fin` recalculada a partir de `hora_inicio + duracion`.

use chrono::NaiveTime;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::errors::ApiError;
use crate::models::{ActualizaBloque, Bloque, Calendario, NuevoBloque, NuevoCalendario};
use crate::store::Store;

fn fila_bloque(row: &Row) -> rusqlite::Result<Bloque> {
    Ok(Bloque {
        id: row.get(0)?,
        calendario: row.get(1)?,
        orden: row.get(2)?,
        hora_inicio: row.get(3)?,
        hora_fin: row.get(4)?,
        duracion_min: row.get(5)?,
    })
}

/// Acepta "HH:MM" y "HH:MM:SS".
pub fn parse_hora(s: &str) -> Result<NaiveTime, ApiError> {
    let t = s.trim();
    NaiveTime::parse_from_str(t, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M"))
        .map_err(|_| ApiError::validacion("hora_inicio", format!("hora inválida: {}", s)))
}

fn formatear_hora(t: NaiveTime) -> String {
    t.format("%H:%M:%S").to_string()
}

/// hora_fin = hora_inicio + duracion_min
fn hora_fin_de(inicio: &str, duracion_min: i32) -> Result<String, ApiError> {
    let t = parse_hora(inicio)?;
    Ok(formatear_hora(t + chrono::Duration::minutes(duracion_min as i64)))
}

/// Revalida el calendario entero tras una mutación. Se invoca dentro de la
/// transacción que hizo el cambio, de modo que un fallo deja todo como estaba.
fn revalidar_bloques(conn: &Connection, calendario: i64) -> Result<(), ApiError> {
    let mut stmt = conn.prepare(
        "SELECT id, calendario, orden, hora_inicio, hora_fin, duracion_min
         FROM bloques WHERE calendario = ?1 ORDER BY orden",
    )?;
    let rows = stmt.query_map(params![calendario], fila_bloque)?;
    let mut bloques = Vec::new();
    for r in rows {
        bloques.push(r?);
    }

    for (i, b) in bloques.iter().enumerate() {
        let esperado = (i + 1) as i32;
        if b.orden != esperado {
            return Err(ApiError::validacion(
                "orden",
                format!("orden no contiguo: se esperaba {} y hay {}", esperado, b.orden),
            ));
        }
        if b.duracion_min <= 0 {
            return Err(ApiError::validacion("duracion_min", "la duración debe ser positiva"));
        }
    }
    for par in bloques.windows(2) {
        let fin_ant = parse_hora(&par[0].hora_fin)?;
        let ini_sig = parse_hora(&par[1].hora_inicio)?;
        if ini_sig < fin_ant {
            return Err(ApiError::validacion(
                "hora_inicio",
                format!(
                    "el bloque {} ({}) se solapa con el fin del bloque {} ({})",
                    par[1].orden, par[1].hora_inicio, par[0].orden, par[0].hora_fin
                ),
            ));
        }
    }
    Ok(())
}

impl Store {
    pub fn crear_calendario(&self, c: &NuevoCalendario) -> Result<Calendario, ApiError> {
        let duracion = c.duracion_bloque_min.unwrap_or(45);
        if duracion <= 0 {
            return Err(ApiError::validacion("duracion_bloque_min", "la duración debe ser positiva"));
        }
        self.obtener_periodo(c.periodo)?;
        let conn = self.con();
        conn.execute(
            "INSERT INTO calendarios (periodo, nombre, duracion_bloque_min) VALUES (?1, ?2, ?3)",
            params![c.periodo, c.nombre, duracion],
        )?;
        Ok(Calendario {
            id: conn.last_insert_rowid(),
            periodo: c.periodo,
            nombre: c.nombre.clone(),
            duracion_bloque_min: duracion,
        })
    }

    pub fn listar_calendarios(&self) -> Result<Vec<Calendario>, ApiError> {
        let conn = self.con();
        let mut stmt =
            conn.prepare("SELECT id, periodo, nombre, duracion_bloque_min FROM calendarios ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Calendario {
                id: row.get(0)?,
                periodo: row.get(1)?,
                nombre: row.get(2)?,
                duracion_bloque_min: row.get(3)?,
            })
        })?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    pub fn obtener_calendario(&self, id: i64) -> Result<Calendario, ApiError> {
        let conn = self.con();
        conn.query_row(
            "SELECT id, periodo, nombre, duracion_bloque_min FROM calendarios WHERE id = ?1",
            params![id],
            |row| {
                Ok(Calendario {
                    id: row.get(0)?,
                    periodo: row.get(1)?,
                    nombre: row.get(2)?,
                    duracion_bloque_min: row.get(3)?,
                })
            },
        )
        .optional()?
        .ok_or_else(|| ApiError::no_encontrado(format!("calendario {}", id)))
    }

    /// El calendario activo de un periodo es el de id más alto.
    pub fn calendario_activo(&self, periodo: i64) -> Result<Option<Calendario>, ApiError> {
        let conn = self.con();
        let cal = conn
            .query_row(
                "SELECT id, periodo, nombre, duracion_bloque_min FROM calendarios
                 WHERE periodo = ?1 ORDER BY id DESC LIMIT 1",
                params![periodo],
                |row| {
                    Ok(Calendario {
                        id: row.get(0)?,
                        periodo: row.get(1)?,
                        nombre: row.get(2)?,
                        duracion_bloque_min: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(cal)
    }

    pub fn listar_bloques(&self, calendario: Option<i64>) -> Result<Vec<Bloque>, ApiError> {
        let conn = self.con();
        let mut out = Vec::new();
        match calendario {
            Some(cal) => {
                let mut stmt = conn.prepare(
                    "SELECT id, calendario, orden, hora_inicio, hora_fin, duracion_min
                     FROM bloques WHERE calendario = ?1 ORDER BY orden",
                )?;
                let rows = stmt.query_map(params![cal], fila_bloque)?;
                for r in rows {
                    out.push(r?);
                }
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT id, calendario, orden, hora_inicio, hora_fin, duracion_min
                     FROM bloques ORDER BY calendario, orden",
                )?;
                let rows = stmt.query_map([], fila_bloque)?;
                for r in rows {
                    out.push(r?);
                }
            }
        }
        Ok(out)
    }

    pub fn crear_bloque(&self, b: &NuevoBloque) -> Result<Bloque, ApiError> {
        let cal = self.obtener_calendario(b.calendario)?;
        let duracion = b.duracion_min.unwrap_or(cal.duracion_bloque_min);
        let hora_fin = hora_fin_de(&b.hora_inicio, duracion)?;
        let inicio = formatear_hora(parse_hora(&b.hora_inicio)?);

        let mut conn = self.con();
        let tx = conn.transaction().map_err(ApiError::from)?;
        tx.execute(
            "INSERT INTO bloques (calendario, orden, hora_inicio, hora_fin, duracion_min)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![b.calendario, b.orden, inicio, hora_fin, duracion],
        )?;
        let id = tx.last_insert_rowid();
        revalidar_bloques(&tx, b.calendario)?;
        tx.commit().map_err(ApiError::from)?;

        Ok(Bloque {
            id,
            calendario: b.calendario,
            orden: b.orden,
            hora_inicio: inicio,
            hora_fin,
            duracion_min: duracion,
        })
    }

    pub fn actualizar_bloque(&self, id: i64, cambios: &ActualizaBloque) -> Result<Bloque, ApiError> {
        let mut conn = self.con();
        let tx = conn.transaction().map_err(ApiError::from)?;

        let actual = tx
            .query_row(
                "SELECT id, calendario, orden, hora_inicio, hora_fin, duracion_min
                 FROM bloques WHERE id = ?1",
                params![id],
                fila_bloque,
            )
            .optional()?
            .ok_or_else(|| ApiError::no_encontrado(format!("bloque {}", id)))?;

        let orden = cambios.orden.unwrap_or(actual.orden);
        let hora_inicio = match &cambios.hora_inicio {
            Some(h) => formatear_hora(parse_hora(h)?),
            None => actual.hora_inicio.clone(),
        };
        let duracion = cambios.duracion_min.unwrap_or(actual.duracion_min);
        let hora_fin = hora_fin_de(&hora_inicio, duracion)?;

        tx.execute(
            "UPDATE bloques SET orden = ?1, hora_inicio = ?2, hora_fin = ?3, duracion_min = ?4
             WHERE id = ?5",
            params![orden, hora_inicio, hora_fin, duracion, id],
        )?;
        revalidar_bloques(&tx, actual.calendario)?;
        tx.commit().map_err(ApiError::from)?;

        Ok(Bloque {
            id,
            calendario: actual.calendario,
            orden,
            hora_inicio,
            hora_fin,
            duracion_min: duracion,
        })
    }

    /// Elimina un bloque y renumera los posteriores para que `orden` siga
    /// siendo contiguo.
    pub fn eliminar_bloque(&self, id: i64) -> Result<(), ApiError> {
        let mut conn = self.con();
        let tx = conn.transaction().map_err(ApiError::from)?;

        let actual = tx
            .query_row(
                "SELECT id, calendario, orden, hora_inicio, hora_fin, duracion_min
                 FROM bloques WHERE id = ?1",
                params![id],
                fila_bloque,
            )
            .optional()?
            .ok_or_else(|| ApiError::no_encontrado(format!("bloque {}", id)))?;

        tx.execute("DELETE FROM bloques WHERE id = ?1", params![id])?;
        tx.execute(
            "UPDATE bloques SET orden = orden - 1 WHERE calendario = ?1 AND orden > ?2",
            params![actual.calendario, actual.orden],
        )?;
        revalidar_bloques(&tx, actual.calendario)?;
        tx.commit().map_err(ApiError::from)?;
        Ok(())
    }

    /// Orden máximo de la grilla de un calendario (0 si no tiene bloques).
    pub fn max_orden_bloques(&self, calendario: i64) -> Result<i32, ApiError> {
        let conn = self.con();
        let max: Option<i32> = conn.query_row(
            "SELECT MAX(orden) FROM bloques WHERE calendario = ?1",
            params![calendario],
            |row| row.get(0),
        )?;
        Ok(max.unwrap_or(0))
    }
}
