// Propuesta de docentes para grupos sin asignar. Heurística, no un solver:
// ordena candidatos por cobertura de disponibilidad, especialidad (si se
// pide) y margen de carga, con el id como desempate determinista.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::ApiError;
use crate::models::{Clase, DisponibilidadDocente, Docente};
use crate::scheduling::conflict::bloques_se_solapan;
use crate::store::Store;

#[derive(Debug, Deserialize)]
pub struct PropuestaRequest {
    pub periodo: i64,
    pub calendario: i64,
    pub asignatura: Option<i64>,
    pub turno: Option<i64>,
    pub persistir: Option<bool>,
    pub prefer_especialidad: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct GrupoDocenteSugerencia {
    pub grupo: i64,
    pub docente_sugerido: Option<i64>,
    pub motivo: String,
}

/// Cobertura de la disponibilidad declarada de un docente sobre las franjas
/// que el grupo ya tiene programadas: 2 = total, 1 = parcial, 0 = ninguna.
fn cobertura(disp: &[&DisponibilidadDocente], franjas: &[(i32, i32, i32)]) -> i32 {
    if franjas.is_empty() {
        // Grupo sin clases programadas: nada que cubrir, cuenta como total.
        return 2;
    }
    let mut cubiertas = 0usize;
    for (dia, ini, dur) in franjas {
        let cubierta = (0..*dur).all(|k| {
            let orden = ini + k;
            disp.iter().any(|d| {
                d.day_of_week == *dia && orden >= d.bloque_inicio && orden < d.bloque_inicio + d.bloques_duracion
            })
        });
        if cubierta {
            cubiertas += 1;
        }
    }
    if cubiertas == franjas.len() {
        2
    } else if cubiertas > 0 {
        1
    } else {
        0
    }
}

fn normalizar(s: &str) -> String {
    s.trim().to_lowercase()
}

/// ¿La especialidad declarada del docente es afín a la asignatura?
fn especialidad_afin(docente: &Docente, asignatura_nombre: &str) -> bool {
    match &docente.especialidad {
        Some(e) if !e.trim().is_empty() => {
            let e = normalizar(e);
            let a = normalizar(asignatura_nombre);
            e.contains(&a) || a.contains(&e)
        }
        _ => false,
    }
}

pub fn proponer_docentes(
    store: &Store,
    req: &PropuestaRequest,
) -> Result<Vec<GrupoDocenteSugerencia>, ApiError> {
    let cal = store.obtener_calendario(req.calendario)?;
    if cal.periodo != req.periodo {
        return Err(ApiError::validacion(
            "calendario",
            format!("el calendario {} no pertenece al periodo {}", cal.id, req.periodo),
        ));
    }
    let prefer_especialidad = req.prefer_especialidad.unwrap_or(false);
    let persistir = req.persistir.unwrap_or(false);

    let grupos = store.listar_grupos(Some(req.periodo), req.asignatura, req.turno)?;
    let docentes: Vec<Docente> = store.listar_docentes()?.into_iter().filter(|d| d.activo).collect();
    let asignaturas: HashMap<i64, String> =
        store.listar_asignaturas()?.into_iter().map(|a| (a.id, a.nombre)).collect();

    let disponibilidad = store.listar_disponibilidad(Some(req.calendario), None, None)?;
    let mut disp_por_docente: HashMap<i64, Vec<&DisponibilidadDocente>> = HashMap::new();
    for d in &disponibilidad {
        disp_por_docente.entry(d.docente).or_default().push(d);
    }

    let clases = store.listar_clases_activas_periodo(req.periodo)?;
    let mut clases_por_grupo: HashMap<i64, Vec<&Clase>> = HashMap::new();
    let mut clases_por_docente: HashMap<i64, Vec<&Clase>> = HashMap::new();
    for c in &clases {
        clases_por_grupo.entry(c.grupo).or_default().push(c);
        if let Some(d) = c.docente {
            clases_por_docente.entry(d).or_default().push(c);
        }
    }

    // Carga actual en horas académicas de 45', para el desempate por margen.
    let horas_45 = |docente: i64| -> f64 {
        clases_por_docente
            .get(&docente)
            .map(|cs| {
                cs.iter().map(|c| c.bloques_duracion).sum::<i32>() as f64 * cal.duracion_bloque_min as f64
                    / 45.0
            })
            .unwrap_or(0.0)
    };

    let mut sugerencias = Vec::new();
    for grupo in grupos.iter().filter(|g| g.docente.is_none()) {
        let franjas: Vec<(i32, i32, i32)> = clases_por_grupo
            .get(&grupo.id)
            .map(|cs| cs.iter().map(|c| (c.day_of_week, c.bloque_inicio, c.bloques_duracion)).collect())
            .unwrap_or_default();
        let asignatura_nombre = asignaturas.get(&grupo.asignatura).map(String::as_str).unwrap_or("");

        // Candidatos: docentes activos que no tengan ya una clase propia
        // solapada con alguna franja del grupo.
        let mut candidatos: Vec<&Docente> = docentes
            .iter()
            .filter(|d| {
                let ocupadas = clases_por_docente.get(&d.id);
                !franjas.iter().any(|(dia, ini, dur)| {
                    ocupadas.map_or(false, |cs| {
                        cs.iter().any(|c| {
                            c.day_of_week == *dia
                                && bloques_se_solapan(c.bloque_inicio, c.bloques_duracion, *ini, *dur)
                        })
                    })
                })
            })
            .collect();

        if candidatos.is_empty() {
            sugerencias.push(GrupoDocenteSugerencia {
                grupo: grupo.id,
                docente_sugerido: None,
                motivo: "sin candidatos disponibles".to_string(),
            });
            continue;
        }

        let hay_especialista = prefer_especialidad
            && candidatos.iter().any(|d| especialidad_afin(d, asignatura_nombre));

        candidatos.sort_by(|x, y| {
            let cov_x = cobertura(disp_por_docente.get(&x.id).map(Vec::as_slice).unwrap_or(&[]), &franjas);
            let cov_y = cobertura(disp_por_docente.get(&y.id).map(Vec::as_slice).unwrap_or(&[]), &franjas);
            let esp_x = prefer_especialidad && especialidad_afin(x, asignatura_nombre);
            let esp_y = prefer_especialidad && especialidad_afin(y, asignatura_nombre);
            // Margen bajo el máximo: más margen primero. Un docente aún por
            // debajo de su mínimo también va primero: le faltan horas.
            let margen_x = x.carga_max_semanal as f64 - horas_45(x.id);
            let margen_y = y.carga_max_semanal as f64 - horas_45(y.id);
            let bajo_min_x = horas_45(x.id) < x.carga_min_semanal as f64;
            let bajo_min_y = horas_45(y.id) < y.carga_min_semanal as f64;
            cov_y
                .cmp(&cov_x)
                .then(esp_y.cmp(&esp_x))
                .then(bajo_min_y.cmp(&bajo_min_x))
                .then(margen_y.partial_cmp(&margen_x).unwrap_or(std::cmp::Ordering::Equal))
                .then(x.id.cmp(&y.id))
        });

        let elegido = candidatos[0];
        let cov = cobertura(
            disp_por_docente.get(&elegido.id).map(Vec::as_slice).unwrap_or(&[]),
            &franjas,
        );
        let mut partes: Vec<String> = Vec::new();
        partes.push(
            match cov {
                2 => "disponibilidad completa",
                1 => "disponibilidad parcial",
                _ => "sin disponibilidad declarada",
            }
            .to_string(),
        );
        if prefer_especialidad {
            if especialidad_afin(elegido, asignatura_nombre) {
                partes.push("especialidad afín".to_string());
            } else if hay_especialista {
                partes.push("se prefirió disponibilidad sobre especialidad".to_string());
            } else {
                partes.push("sin especialidad afín, se propone por disponibilidad y carga".to_string());
            }
        }
        partes.push(format!(
            "carga {:.1}h de {}h máx",
            horas_45(elegido.id),
            elegido.carga_max_semanal
        ));

        if persistir {
            store.asignar_docente_grupo(grupo.id, elegido.id)?;
        }
        sugerencias.push(GrupoDocenteSugerencia {
            grupo: grupo.id,
            docente_sugerido: Some(elegido.id),
            motivo: partes.join("; "),
        });
    }

    tracing::info!(
        periodo = req.periodo,
        grupos = sugerencias.len(),
        persistir,
        "propuesta de docentes completada"
    );
    Ok(sugerencias)
}
