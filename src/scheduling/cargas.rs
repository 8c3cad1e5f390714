// Resúmenes derivados: carga semanal por docente y planificación por grupo.
// Nada de esto se almacena; se calcula sobre las clases vigentes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::ApiError;
use crate::models::{CargaEstado, Clase, ClaseTipo};
use crate::store::Store;

#[derive(Debug, Serialize)]
pub struct CargaDocenteItem {
    pub docente: i64,
    pub nombre: String,
    /// Horas académicas de 45 minutos.
    pub horas_45: f64,
    pub carga_min_semanal: i32,
    pub carga_max_semanal: i32,
    pub estado: CargaEstado,
    pub clases: usize,
}

#[derive(Debug, Serialize)]
pub struct CargaDocenteResponse {
    pub periodo: i64,
    pub calendario: i64,
    pub items: Vec<CargaDocenteItem>,
}

pub fn cargas_docentes(store: &Store, calendario: i64, periodo: i64) -> Result<CargaDocenteResponse, ApiError> {
    let cal = store.obtener_calendario(calendario)?;
    if cal.periodo != periodo {
        return Err(ApiError::validacion(
            "calendario",
            format!("el calendario {} no pertenece al periodo {}", cal.id, periodo),
        ));
    }
    let clases = store.listar_clases_activas_periodo(periodo)?;
    let mut por_docente: HashMap<i64, Vec<&Clase>> = HashMap::new();
    for c in &clases {
        if let Some(d) = c.docente {
            por_docente.entry(d).or_default().push(c);
        }
    }

    let mut items = Vec::new();
    for d in store.listar_docentes()?.into_iter().filter(|d| d.activo) {
        let suyas = por_docente.get(&d.id);
        let bloques: i32 = suyas.map(|cs| cs.iter().map(|c| c.bloques_duracion).sum()).unwrap_or(0);
        let horas_45 = bloques as f64 * cal.duracion_bloque_min as f64 / 45.0;
        let estado = if horas_45 < d.carga_min_semanal as f64 {
            CargaEstado::Bajo
        } else if horas_45 > d.carga_max_semanal as f64 {
            CargaEstado::Exceso
        } else {
            CargaEstado::Ok
        };
        items.push(CargaDocenteItem {
            docente: d.id,
            nombre: d.nombre_completo,
            horas_45,
            carga_min_semanal: d.carga_min_semanal,
            carga_max_semanal: d.carga_max_semanal,
            estado,
            clases: suyas.map(Vec::len).unwrap_or(0),
        });
    }
    Ok(CargaDocenteResponse { periodo, calendario, items })
}

#[derive(Debug, Deserialize)]
pub struct PlanGruposParams {
    pub periodo: Option<i64>,
    pub asignatura: Option<i64>,
    pub turno: Option<i64>,
    /// Holgura en minutos para clasificar OK.
    pub tolerancia_min: Option<i32>,
    pub calendario: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct HorasProgramadas {
    pub bloques: i32,
    pub minutos: i32,
    pub horas: f64,
}

#[derive(Debug, Serialize)]
pub struct GrupoPlanRow {
    pub grupo: i64,
    pub codigo: Option<String>,
    pub periodo: i64,
    pub turno: i64,
    pub asignatura: AsignaturaRef,
    pub programado: ProgramadoPorTipo,
    pub requeridos: Requeridos,
    pub estado: EstadoPorTipo,
}

#[derive(Debug, Serialize)]
pub struct AsignaturaRef {
    pub id: i64,
    pub codigo: String,
    pub nombre: String,
}

#[derive(Debug, Serialize)]
pub struct ProgramadoPorTipo {
    pub teoria: HorasProgramadas,
    pub practica: HorasProgramadas,
}

#[derive(Debug, Serialize)]
pub struct Requeridos {
    pub teoria_horas_semana: i32,
    pub practica_horas_semana: i32,
}

#[derive(Debug, Serialize)]
pub struct EstadoPorTipo {
    pub teoria: CargaEstado,
    pub practica: CargaEstado,
}

fn clasificar(programado_min: i32, requerido_min: i32, tolerancia_min: i32) -> CargaEstado {
    if (programado_min - requerido_min).abs() <= tolerancia_min {
        CargaEstado::Ok
    } else if programado_min < requerido_min {
        CargaEstado::Bajo
    } else {
        CargaEstado::Exceso
    }
}

/// Horas programadas vs. requeridas por grupo, separadas en teoría y
/// práctica. El calendario (explícito o el activo del periodo del grupo)
/// aporta la duración de bloque para convertir bloques en minutos.
pub fn plan_grupos(store: &Store, params: &PlanGruposParams) -> Result<Vec<GrupoPlanRow>, ApiError> {
    let grupos = store.listar_grupos(params.periodo, params.asignatura, params.turno)?;
    let asignaturas: HashMap<i64, _> =
        store.listar_asignaturas()?.into_iter().map(|a| (a.id, a)).collect();
    let tolerancia = params.tolerancia_min.unwrap_or(0);

    // Duración de bloque por periodo, resuelta una sola vez por periodo.
    let mut duracion_por_periodo: HashMap<i64, i32> = HashMap::new();
    let mut duracion_de = |store: &Store, periodo: i64| -> Result<i32, ApiError> {
        if let Some(d) = duracion_por_periodo.get(&periodo) {
            return Ok(*d);
        }
        let d = match params.calendario {
            Some(cal) => store.obtener_calendario(cal)?.duracion_bloque_min,
            None => store
                .calendario_activo(periodo)?
                .map(|c| c.duracion_bloque_min)
                .unwrap_or(45),
        };
        duracion_por_periodo.insert(periodo, d);
        Ok(d)
    };

    let mut filas = Vec::new();
    for g in grupos {
        let duracion = duracion_de(store, g.periodo)?;
        let clases = store.listar_clases_grupo(g.id)?;
        let sumar = |tipo: ClaseTipo| -> HorasProgramadas {
            let bloques: i32 = clases
                .iter()
                .filter(|c| c.tipo == tipo && c.estado != crate::models::ClaseEstado::Cancelado)
                .map(|c| c.bloques_duracion)
                .sum();
            let minutos = bloques * duracion;
            HorasProgramadas { bloques, minutos, horas: minutos as f64 / 60.0 }
        };
        let teoria = sumar(ClaseTipo::T);
        let practica = sumar(ClaseTipo::P);

        let asig = asignaturas
            .get(&g.asignatura)
            .ok_or_else(|| ApiError::no_encontrado(format!("asignatura {}", g.asignatura)))?;
        let req_teoria_min = asig.horas_teoria_semana * 60;
        let req_practica_min = asig.horas_practica_semana * 60;

        filas.push(GrupoPlanRow {
            grupo: g.id,
            codigo: g.codigo.clone(),
            periodo: g.periodo,
            turno: g.turno,
            asignatura: AsignaturaRef {
                id: asig.id,
                codigo: asig.codigo.clone(),
                nombre: asig.nombre.clone(),
            },
            estado: EstadoPorTipo {
                teoria: clasificar(teoria.minutos, req_teoria_min, tolerancia),
                practica: clasificar(practica.minutos, req_practica_min, tolerancia),
            },
            programado: ProgramadoPorTipo { teoria, practica },
            requeridos: Requeridos {
                teoria_horas_semana: asig.horas_teoria_semana,
                practica_horas_semana: asig.horas_practica_semana,
            },
        });
    }
    Ok(filas)
}
