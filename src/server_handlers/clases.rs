// Handlers de clases: listados por grupo, altas/bajas en lote, vista previa
// para substituciones y asignación de substituto.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::errors::ApiError;
use crate::models::NuevaClase;
use crate::scheduling::conflict::detectar_conflictos;
use crate::scheduling::grid::expandir_labels;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct ClasesGrupoQuery {
    pub expand: Option<String>,
}

pub async fn clases_de_grupo(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<ClasesGrupoQuery>,
) -> Result<HttpResponse, ApiError> {
    let grupo = data.store.obtener_grupo(path.into_inner())?;
    let clases = data.store.listar_clases_grupo(grupo.id)?;
    if query.expand.as_deref() == Some("labels") {
        let con_labels = expandir_labels(&data.store, grupo.periodo, &clases)?;
        return Ok(HttpResponse::Ok().json(con_labels));
    }
    Ok(HttpResponse::Ok().json(clases))
}

#[derive(Debug, Deserialize)]
pub struct BulkCreateRequest {
    pub items: Vec<NuevaClase>,
}

/// Alta en lote, todo o nada. La respuesta incluye los conflictos
/// transitorios que el lote introduce, sin persistirlos: la detección
/// persistente es una acción explícita del panel.
pub async fn bulk_create(
    data: web::Data<AppState>,
    body: web::Json<BulkCreateRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = body.into_inner();
    if req.items.is_empty() {
        return Err(ApiError::validacion("items", "el lote está vacío"));
    }
    let primer_grupo = data.store.obtener_grupo(req.items[0].grupo)?;
    let cal = data
        .store
        .calendario_activo(primer_grupo.periodo)?
        .ok_or_else(|| {
            ApiError::validacion("calendario", format!("el periodo {} no tiene calendario", primer_grupo.periodo))
        })?;
    let _guard = data.locks.adquirir(primer_grupo.periodo, cal.id).await?;

    let max_orden = data.store.max_orden_bloques(cal.id)?;
    let creadas = data.store.crear_clases_bulk(&req.items, max_orden)?;
    let conflictos = detectar_conflictos(&data.store, primer_grupo.periodo, None, false)?;
    let ids: std::collections::HashSet<i64> = creadas.iter().map(|c| c.id).collect();
    let del_lote: Vec<_> = conflictos
        .into_iter()
        .filter(|c| ids.contains(&c.clase_a) || ids.contains(&c.clase_b))
        .collect();
    Ok(HttpResponse::Ok().json(json!({
        "created": creadas.len(),
        "items": creadas,
        "conflicts": del_lote,
    })))
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<i64>,
}

pub async fn bulk_delete(
    data: web::Data<AppState>,
    body: web::Json<BulkDeleteRequest>,
) -> Result<HttpResponse, ApiError> {
    let (borradas, no_encontradas) = data.store.eliminar_clases_bulk(&body.ids)?;
    Ok(HttpResponse::Ok().json(json!({
        "deleted": borradas,
        "not_found": no_encontradas,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ClasesPrevQuery {
    pub calendario: i64,
    pub docente: Option<i64>,
    pub grupo: Option<i64>,
    pub asignatura: Option<i64>,
    pub has_substituto: Option<bool>,
}

pub async fn clases_preview(
    data: web::Data<AppState>,
    query: web::Query<ClasesPrevQuery>,
) -> Result<HttpResponse, ApiError> {
    let cal = data.store.obtener_calendario(query.calendario)?;
    let clases = data.store.listar_clases_preview(
        cal.periodo,
        query.docente,
        query.grupo,
        query.asignatura,
        query.has_substituto,
    )?;
    Ok(HttpResponse::Ok().json(clases))
}

#[derive(Debug, Deserialize)]
pub struct SubstitutoRequest {
    pub docente_substituto: Option<i64>,
}

pub async fn set_substituto(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<SubstitutoRequest>,
) -> Result<HttpResponse, ApiError> {
    let clase = data.store.set_substituto(path.into_inner(), body.docente_substituto)?;
    Ok(HttpResponse::Ok().json(clase))
}
