// Proyección de la grilla semanal: el único read-model que consumen el
// panel de conflictos, el de substituciones y la exportación. Cada celda
// sale con ids y etiquetas ya resueltas para que el cliente no haga joins.
// Se recalcula en cada petición; no hay caché que invalidar.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::ApiError;
use crate::models::{Bloque, Clase, ClaseTipo};
use crate::store::Store;

/// Paleta fija; el color de una celda depende solo de la asignatura.
const PALETA: [&str; 8] = [
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948", "#b07aa1", "#9c755f",
];

#[derive(Debug, Deserialize)]
pub struct GridRequest {
    pub periodo: i64,
    pub calendario: i64,
    pub docente: Option<i64>,
    pub grupo: Option<i64>,
    pub ambiente: Option<i64>,
    pub bloque_min: Option<i32>,
    pub bloque_max: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct GridCell {
    pub day_of_week: i32,
    pub bloque_inicio_orden: i32,
    pub bloques_duracion: i32,
    pub clase_id: i64,
    pub grupo_id: i64,
    pub asignatura_id: i64,
    pub docente_id: Option<i64>,
    pub ambiente_id: Option<i64>,
    pub asignatura: String,
    pub grupo_codigo: String,
    pub docente: String,
    pub ambiente: Option<String>,
    pub tipo: ClaseTipo,
    pub color: String,
}

#[derive(Debug, Serialize)]
pub struct GridResponse {
    pub calendario: i64,
    pub periodo: i64,
    pub dias: Vec<i32>,
    pub bloques: Vec<Bloque>,
    pub celdas: Vec<GridCell>,
}

/// Etiquetas denormalizadas de una clase, para los listados que las piden
/// con `expand=labels`.
#[derive(Debug, Serialize)]
pub struct ClaseLabels {
    pub asignatura: String,
    pub grupo: Option<String>,
    pub docente: String,
    pub ambiente: Option<String>,
    pub bloque_inicio_orden: i32,
    pub rango_hora: String,
}

#[derive(Debug, Serialize)]
pub struct ClaseConLabels {
    #[serde(flatten)]
    pub clase: Clase,
    pub labels: ClaseLabels,
}

struct Etiquetas {
    asignatura_por_grupo: HashMap<i64, (i64, String)>, // grupo -> (asignatura id, nombre)
    codigo_grupo: HashMap<i64, Option<String>>,
    nombre_docente: HashMap<i64, String>,
    codigo_ambiente: HashMap<i64, String>,
}

fn cargar_etiquetas(store: &Store, periodo: i64) -> Result<Etiquetas, ApiError> {
    let asignaturas: HashMap<i64, String> =
        store.listar_asignaturas()?.into_iter().map(|a| (a.id, a.nombre)).collect();
    let mut asignatura_por_grupo = HashMap::new();
    let mut codigo_grupo = HashMap::new();
    for g in store.listar_grupos(Some(periodo), None, None)? {
        let nombre = asignaturas.get(&g.asignatura).cloned().unwrap_or_default();
        asignatura_por_grupo.insert(g.id, (g.asignatura, nombre));
        codigo_grupo.insert(g.id, g.codigo);
    }
    let nombre_docente =
        store.listar_docentes()?.into_iter().map(|d| (d.id, d.nombre_completo)).collect();
    let codigo_ambiente = store.listar_ambientes()?.into_iter().map(|a| (a.id, a.codigo)).collect();
    Ok(Etiquetas { asignatura_por_grupo, codigo_grupo, nombre_docente, codigo_ambiente })
}

pub fn proyectar_grid(store: &Store, req: &GridRequest) -> Result<GridResponse, ApiError> {
    let cal = store.obtener_calendario(req.calendario)?;
    if cal.periodo != req.periodo {
        return Err(ApiError::validacion(
            "calendario",
            format!("el calendario {} no pertenece al periodo {}", cal.id, req.periodo),
        ));
    }
    let bloques = store.listar_bloques(Some(cal.id))?;
    let etiquetas = cargar_etiquetas(store, req.periodo)?;

    let clases = store.listar_clases_activas_periodo(req.periodo)?;
    let mut celdas = Vec::new();
    for c in &clases {
        if let Some(d) = req.docente {
            if c.docente != Some(d) {
                continue;
            }
        }
        if let Some(g) = req.grupo {
            if c.grupo != g {
                continue;
            }
        }
        if let Some(a) = req.ambiente {
            if c.ambiente != Some(a) {
                continue;
            }
        }
        if let Some(min) = req.bloque_min {
            if c.bloque_fin() <= min {
                continue;
            }
        }
        if let Some(max) = req.bloque_max {
            if c.bloque_inicio > max {
                continue;
            }
        }
        let (asignatura_id, asignatura) = etiquetas
            .asignatura_por_grupo
            .get(&c.grupo)
            .cloned()
            .unwrap_or((0, String::new()));
        celdas.push(GridCell {
            day_of_week: c.day_of_week,
            bloque_inicio_orden: c.bloque_inicio,
            bloques_duracion: c.bloques_duracion,
            clase_id: c.id,
            grupo_id: c.grupo,
            asignatura_id,
            docente_id: c.docente,
            ambiente_id: c.ambiente,
            asignatura,
            grupo_codigo: etiquetas
                .codigo_grupo
                .get(&c.grupo)
                .cloned()
                .flatten()
                .unwrap_or_default(),
            docente: c
                .docente
                .and_then(|d| etiquetas.nombre_docente.get(&d).cloned())
                .unwrap_or_default(),
            ambiente: c.ambiente.and_then(|a| etiquetas.codigo_ambiente.get(&a).cloned()),
            tipo: c.tipo,
            color: PALETA[(asignatura_id as usize) % PALETA.len()].to_string(),
        });
    }

    Ok(GridResponse {
        calendario: cal.id,
        periodo: req.periodo,
        dias: (1..=6).collect(),
        bloques,
        celdas,
    })
}

/// Rango horario legible de un rango de bloques ("08:00 - 09:30").
fn rango_hora(bloques: &[Bloque], inicio: i32, dur: i32) -> String {
    let primero = bloques.iter().find(|b| b.orden == inicio);
    let ultimo = bloques.iter().find(|b| b.orden == inicio + dur - 1);
    match (primero, ultimo) {
        (Some(p), Some(u)) => format!("{} - {}", &p.hora_inicio[..5], &u.hora_fin[..5]),
        _ => String::new(),
    }
}

/// Expande las etiquetas de un conjunto de clases de un mismo periodo,
/// usando el calendario activo del periodo para el rango horario.
pub fn expandir_labels(store: &Store, periodo: i64, clases: &[Clase]) -> Result<Vec<ClaseConLabels>, ApiError> {
    let etiquetas = cargar_etiquetas(store, periodo)?;
    let bloques = match store.calendario_activo(periodo)? {
        Some(cal) => store.listar_bloques(Some(cal.id))?,
        None => Vec::new(),
    };
    let mut out = Vec::with_capacity(clases.len());
    for c in clases {
        let (_, asignatura) = etiquetas
            .asignatura_por_grupo
            .get(&c.grupo)
            .cloned()
            .unwrap_or((0, String::new()));
        out.push(ClaseConLabels {
            clase: c.clone(),
            labels: ClaseLabels {
                asignatura,
                grupo: etiquetas.codigo_grupo.get(&c.grupo).cloned().flatten(),
                docente: c
                    .docente
                    .and_then(|d| etiquetas.nombre_docente.get(&d).cloned())
                    .unwrap_or_default(),
                ambiente: c.ambiente.and_then(|a| etiquetas.codigo_ambiente.get(&a).cloned()),
                bloque_inicio_orden: c.bloque_inicio,
                rango_hora: rango_hora(&bloques, c.bloque_inicio, c.bloques_duracion),
            },
        });
    }
    Ok(out)
}
