// Detección de conflictos y movimiento de clases.
//
// El barrido es por pares dentro de cada día: con los tamaños de grupo que
// maneja una carrera el O(n²) diario es más que suficiente, y agrupar por
// día evita comparar clases que nunca pueden chocar.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use serde::Deserialize;

use crate::errors::ApiError;
use crate::models::{CambioHorario, Clase, Conflicto, ConflictoTipo};
use crate::store::Store;

/// True si los rangos de bloques [a_ini, a_ini+a_dur) y [b_ini, b_ini+b_dur)
/// se solapan. Rangos semiabiertos: compartir solo el límite no es solape.
pub fn bloques_se_solapan(a_ini: i32, a_dur: i32, b_ini: i32, b_dur: i32) -> bool {
    a_ini < b_ini + b_dur && b_ini < a_ini + a_dur
}

/// True si dos clases ocupan algún bloque común del mismo día.
pub fn clases_se_solapan(a: &Clase, b: &Clase) -> bool {
    a.day_of_week == b.day_of_week
        && bloques_se_solapan(a.bloque_inicio, a.bloques_duracion, b.bloque_inicio, b.bloques_duracion)
}

/// Dimensiones en conflicto entre dos clases solapadas. Un mismo par puede
/// producir hasta tres conflictos, uno por dimensión compartida.
pub fn dimensiones_en_conflicto(a: &Clase, b: &Clase) -> Vec<ConflictoTipo> {
    let mut dims = Vec::new();
    if let (Some(da), Some(db)) = (a.docente, b.docente) {
        if da == db {
            dims.push(ConflictoTipo::Docente);
        }
    }
    if let (Some(aa), Some(ab)) = (a.ambiente, b.ambiente) {
        if aa == ab {
            dims.push(ConflictoTipo::Ambiente);
        }
    }
    if a.grupo == b.grupo {
        dims.push(ConflictoTipo::Grupo);
    }
    dims
}

/// Barrido de detección sobre las clases no canceladas de un periodo.
///
/// Con `persistir: false` devuelve resultados transitorios (id 0) sin tocar
/// la tabla. Con `persistir: true` inserta solo los pares (tipo, par) que no
/// tengan ya un conflicto sin resolver: correr la detección dos veces
/// seguidas no aumenta el número de conflictos abiertos.
pub fn detectar_conflictos(
    store: &Store,
    periodo: i64,
    calendario: Option<i64>,
    persistir: bool,
) -> Result<Vec<Conflicto>, ApiError> {
    if let Some(cal) = calendario {
        let cal = store.obtener_calendario(cal)?;
        if cal.periodo != periodo {
            return Err(ApiError::validacion(
                "calendario",
                format!("el calendario {} no pertenece al periodo {}", cal.id, periodo),
            ));
        }
    }
    let clases = store.listar_clases_activas_periodo(periodo)?;

    let mut por_dia: HashMap<i32, Vec<&Clase>> = HashMap::new();
    for c in &clases {
        por_dia.entry(c.day_of_week).or_default().push(c);
    }

    let mut vistos: HashSet<(ConflictoTipo, i64, i64)> = HashSet::new();
    let mut resultado = Vec::new();
    let ahora = Utc::now().to_rfc3339();

    let mut dias: Vec<i32> = por_dia.keys().copied().collect();
    dias.sort();
    for dia in dias {
        let del_dia = &por_dia[&dia];
        for i in 0..del_dia.len() {
            for j in (i + 1)..del_dia.len() {
                let (a, b) = (del_dia[i], del_dia[j]);
                if !bloques_se_solapan(a.bloque_inicio, a.bloques_duracion, b.bloque_inicio, b.bloques_duracion)
                {
                    continue;
                }
                for tipo in dimensiones_en_conflicto(a, b) {
                    let clave = if a.id <= b.id {
                        (tipo, a.id, b.id)
                    } else {
                        (tipo, b.id, a.id)
                    };
                    if !vistos.insert(clave) {
                        continue;
                    }
                    if persistir {
                        if store.conflicto_no_resuelto_existe(tipo, a.id, b.id)? {
                            continue;
                        }
                        resultado.push(store.insertar_conflicto(tipo, a.id, b.id, None)?);
                    } else {
                        resultado.push(Conflicto {
                            id: 0,
                            tipo,
                            clase_a: clave.1,
                            clase_b: clave.2,
                            resuelto: false,
                            nota: None,
                            detectado_en: ahora.clone(),
                        });
                    }
                }
            }
        }
    }

    tracing::info!(
        periodo,
        clases = clases.len(),
        conflictos = resultado.len(),
        persistir,
        "detección de conflictos completada"
    );
    Ok(resultado)
}

#[derive(Debug, Deserialize)]
pub struct MoverRequest {
    pub clase: i64,
    pub new_day_of_week: i32,
    pub new_bloque_inicio: i32,
    /// default: mantener la duración actual
    pub new_bloques_duracion: Option<i32>,
    pub motivo: Option<String>,
    pub usuario: Option<i64>,
    /// true: solo evaluar; false explícito: aplicar aunque haya conflictos;
    /// ausente: aplicar solo si queda limpio, si no rechazar.
    pub dry_run: Option<bool>,
}

#[derive(Debug, serde::Serialize)]
pub struct MoverResponse {
    pub updated: bool,
    pub clase: Clase,
    pub conflictos: Vec<Conflicto>,
}

/// Evalúa qué conflictos tendría la clase si quedara en la nueva posición.
fn evaluar_destino(
    store: &Store,
    clase: &Clase,
    periodo: i64,
) -> Result<Vec<Conflicto>, ApiError> {
    let otras = store.listar_clases_activas_periodo(periodo)?;
    let ahora = Utc::now().to_rfc3339();
    let mut conflictos = Vec::new();
    for otra in otras.iter().filter(|c| c.id != clase.id) {
        if !clases_se_solapan(clase, otra) {
            continue;
        }
        for tipo in dimensiones_en_conflicto(clase, otra) {
            let (a, b) = if clase.id <= otra.id { (clase.id, otra.id) } else { (otra.id, clase.id) };
            conflictos.push(Conflicto {
                id: 0,
                tipo,
                clase_a: a,
                clase_b: b,
                resuelto: false,
                nota: None,
                detectado_en: ahora.clone(),
            });
        }
    }
    Ok(conflictos)
}

/// Mueve una clase a (día, bloque, duración). El contrato de `dry_run` está
/// documentado en `MoverRequest`; todo movimiento aplicado deja un registro
/// en la tabla de cambios.
pub fn mover_clase(store: &Store, req: &MoverRequest) -> Result<MoverResponse, ApiError> {
    let actual = store.obtener_clase(req.clase)?;
    let grupo = store.obtener_grupo(actual.grupo)?;
    let cal = store
        .calendario_activo(grupo.periodo)?
        .ok_or_else(|| ApiError::validacion("calendario", format!("el periodo {} no tiene calendario", grupo.periodo)))?;
    let max_orden = store.max_orden_bloques(cal.id)?;

    let dur = req.new_bloques_duracion.unwrap_or(actual.bloques_duracion);
    if !(1..=7).contains(&req.new_day_of_week) {
        return Err(ApiError::validacion("new_day_of_week", "el día debe estar entre 1 y 7"));
    }
    if dur < 1 {
        return Err(ApiError::validacion("new_bloques_duracion", "la duración en bloques debe ser >= 1"));
    }
    if req.new_bloque_inicio < 1 || req.new_bloque_inicio + dur - 1 > max_orden {
        return Err(ApiError::validacion(
            "new_bloque_inicio",
            format!(
                "el rango de bloques {}..{} no cabe en la grilla (1..{})",
                req.new_bloque_inicio,
                req.new_bloque_inicio + dur - 1,
                max_orden
            ),
        ));
    }

    let mut destino = actual.clone();
    destino.day_of_week = req.new_day_of_week;
    destino.bloque_inicio = req.new_bloque_inicio;
    destino.bloques_duracion = dur;

    let evaluados = evaluar_destino(store, &destino, grupo.periodo)?;

    if req.dry_run == Some(true) {
        return Ok(MoverResponse { updated: false, clase: destino, conflictos: evaluados });
    }
    if req.dry_run.is_none() && !evaluados.is_empty() {
        return Err(ApiError::ConflictoDetectado(evaluados));
    }

    // Aplicar: actualizar la clase, registrar el cambio y persistir los
    // conflictos que el movimiento introduce (dry_run == false explícito).
    store.actualizar_ubicacion_clase(actual.id, destino.day_of_week, destino.bloque_inicio, dur)?;
    store.registrar_cambio(&CambioHorario {
        id: 0,
        clase: actual.id,
        usuario: req.usuario,
        motivo: req.motivo.clone(),
        old_day_of_week: Some(actual.day_of_week),
        old_bloque_inicio: Some(actual.bloque_inicio),
        old_bloques_duracion: Some(actual.bloques_duracion),
        old_ambiente: actual.ambiente,
        old_docente: actual.docente,
        new_day_of_week: Some(destino.day_of_week),
        new_bloque_inicio: Some(destino.bloque_inicio),
        new_bloques_duracion: Some(dur),
        new_ambiente: destino.ambiente,
        new_docente: destino.docente,
        fecha: Utc::now().to_rfc3339(),
    })?;

    let mut persistidos = Vec::with_capacity(evaluados.len());
    for ev in &evaluados {
        if store.conflicto_no_resuelto_existe(ev.tipo, ev.clase_a, ev.clase_b)? {
            continue;
        }
        persistidos.push(store.insertar_conflicto(ev.tipo, ev.clase_a, ev.clase_b, Some("introducido por movimiento"))?);
    }

    tracing::info!(
        clase = actual.id,
        dia = destino.day_of_week,
        bloque = destino.bloque_inicio,
        conflictos = persistidos.len(),
        "clase movida"
    );
    Ok(MoverResponse { updated: true, clase: destino, conflictos: persistidos })
}
