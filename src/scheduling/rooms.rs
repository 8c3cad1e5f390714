// Auto-asignación de ambientes. El lote procesa las clases en orden
// ascendente de id: dos corridas sobre el mismo estado producen el mismo
// resultado, y con `force: false` la segunda corrida solo emite `omitido`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::ApiError;
use crate::models::{Ambiente, Clase, ClaseTipo};
use crate::scheduling::conflict::bloques_se_solapan;
use crate::store::Store;

#[derive(Debug, Deserialize)]
pub struct AsignarAulasRequest {
    pub periodo: i64,
    pub calendario: i64,
    /// Subconjunto de clases a procesar; ausente = todas las del periodo.
    pub clase_ids: Option<Vec<i64>>,
    pub prefer_edificio: Option<i64>,
    pub force: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AsignacionEstado {
    Asignado,
    SinCandidatos,
    Conflicto,
    Omitido,
}

#[derive(Debug, Serialize)]
pub struct AsignacionItem {
    pub clase: i64,
    pub ambiente_anterior: Option<i64>,
    pub ambiente_nuevo: Option<i64>,
    pub estado: AsignacionEstado,
}

pub fn asignar_aulas(store: &Store, req: &AsignarAulasRequest) -> Result<Vec<AsignacionItem>, ApiError> {
    let cal = store.obtener_calendario(req.calendario)?;
    if cal.periodo != req.periodo {
        return Err(ApiError::validacion(
            "calendario",
            format!("el calendario {} no pertenece al periodo {}", cal.id, req.periodo),
        ));
    }
    let force = req.force.unwrap_or(false);

    let todas = store.listar_clases_activas_periodo(req.periodo)?;
    let en_lote: Vec<&Clase> = match &req.clase_ids {
        Some(ids) => {
            let por_id: HashMap<i64, &Clase> = todas.iter().map(|c| (c.id, c)).collect();
            let mut sel = Vec::with_capacity(ids.len());
            for id in ids {
                match por_id.get(id) {
                    Some(c) => sel.push(*c),
                    None => return Err(ApiError::no_encontrado(format!("clase {}", id))),
                }
            }
            sel.sort_by_key(|c| c.id);
            sel
        }
        None => todas.iter().collect(), // ya vienen ordenadas por id
    };

    let ambientes = store.listar_ambientes()?;
    let grupos: HashMap<i64, _> = store
        .listar_grupos(Some(req.periodo), None, None)?
        .into_iter()
        .map(|g| (g.id, g))
        .collect();
    let asignaturas: HashMap<i64, _> =
        store.listar_asignaturas()?.into_iter().map(|a| (a.id, a)).collect();

    // Ocupación ya comprometida en la base: ambiente -> franjas (día, ini, dur).
    // Las clases del propio lote que van a ser reasignadas (force) no
    // bloquean su ambiente actual.
    let ids_lote: std::collections::HashSet<i64> = en_lote.iter().map(|c| c.id).collect();
    let mut ocupacion_db: HashMap<i64, Vec<(i32, i32, i32)>> = HashMap::new();
    for c in &todas {
        if force && ids_lote.contains(&c.id) {
            continue;
        }
        if let Some(amb) = c.ambiente {
            ocupacion_db.entry(amb).or_default().push((c.day_of_week, c.bloque_inicio, c.bloques_duracion));
        }
    }

    // Reservas hechas dentro de este mismo lote.
    let mut reservas: HashMap<i64, Vec<(i32, i32, i32)>> = HashMap::new();
    let libre = |franjas: Option<&Vec<(i32, i32, i32)>>, c: &Clase| -> bool {
        franjas.map_or(true, |fs| {
            !fs.iter().any(|(dia, ini, dur)| {
                *dia == c.day_of_week
                    && bloques_se_solapan(*ini, *dur, c.bloque_inicio, c.bloques_duracion)
            })
        })
    };

    let mut resultado = Vec::new();
    let mut aplicar: Vec<(i64, i64)> = Vec::new();
    for clase in en_lote {
        if clase.ambiente.is_some() && !force {
            resultado.push(AsignacionItem {
                clase: clase.id,
                ambiente_anterior: clase.ambiente,
                ambiente_nuevo: clase.ambiente,
                estado: AsignacionEstado::Omitido,
            });
            continue;
        }

        let grupo = match grupos.get(&clase.grupo) {
            Some(g) => g,
            None => return Err(ApiError::no_encontrado(format!("grupo {}", clase.grupo))),
        };
        let tipo_requerido = asignaturas.get(&grupo.asignatura).and_then(|a| match clase.tipo {
            ClaseTipo::T => a.tipo_ambiente_teoria,
            ClaseTipo::P => a.tipo_ambiente_practica,
        });

        // Tipo + capacidad + libre según la base.
        let mut candidatos: Vec<&Ambiente> = ambientes
            .iter()
            .filter(|a| tipo_requerido.map_or(true, |t| a.tipo_ambiente == t))
            .filter(|a| a.capacidad >= grupo.capacidad)
            .filter(|a| libre(ocupacion_db.get(&a.id), clase))
            .collect();

        if candidatos.is_empty() {
            resultado.push(AsignacionItem {
                clase: clase.id,
                ambiente_anterior: clase.ambiente,
                ambiente_nuevo: None,
                estado: AsignacionEstado::SinCandidatos,
            });
            continue;
        }

        // Choque interno del lote: había candidatos, pero ya los tomó una
        // clase anterior de esta misma corrida.
        candidatos.retain(|a| libre(reservas.get(&a.id), clase));
        if candidatos.is_empty() {
            resultado.push(AsignacionItem {
                clase: clase.id,
                ambiente_anterior: clase.ambiente,
                ambiente_nuevo: None,
                estado: AsignacionEstado::Conflicto,
            });
            continue;
        }

        if let Some(edificio) = req.prefer_edificio {
            if candidatos.iter().any(|a| a.edificio == edificio) {
                candidatos.retain(|a| a.edificio == edificio);
            }
        }
        candidatos.sort_by_key(|a| a.id);
        let elegido = candidatos[0];

        reservas
            .entry(elegido.id)
            .or_default()
            .push((clase.day_of_week, clase.bloque_inicio, clase.bloques_duracion));
        aplicar.push((clase.id, elegido.id));
        resultado.push(AsignacionItem {
            clase: clase.id,
            ambiente_anterior: clase.ambiente,
            ambiente_nuevo: Some(elegido.id),
            estado: AsignacionEstado::Asignado,
        });
    }

    // Una sola transacción: un lote a medias no deja solapes comprometidos.
    store.asignar_ambientes_bulk(&aplicar)?;

    tracing::info!(
        periodo = req.periodo,
        procesadas = resultado.len(),
        asignadas = aplicar.len(),
        force,
        "asignación de aulas completada"
    );
    Ok(resultado)
}
