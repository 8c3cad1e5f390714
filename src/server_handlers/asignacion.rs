// Handlers de propuesta de docentes y auto-asignación de aulas.

use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::errors::ApiError;
use crate::scheduling::propose::{proponer_docentes, PropuestaRequest};
use crate::scheduling::rooms::{asignar_aulas, AsignarAulasRequest};
use crate::server::AppState;

pub async fn proponer(
    data: web::Data<AppState>,
    body: web::Json<PropuestaRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = body.into_inner();
    let sugerencias = if req.persistir.unwrap_or(false) {
        let _guard = data.locks.adquirir(req.periodo, req.calendario).await?;
        proponer_docentes(&data.store, &req)?
    } else {
        proponer_docentes(&data.store, &req)?
    };
    Ok(HttpResponse::Ok().json(json!({ "sugerencias": sugerencias })))
}

pub async fn asignar(
    data: web::Data<AppState>,
    body: web::Json<AsignarAulasRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = body.into_inner();
    let _guard = data.locks.adquirir(req.periodo, req.calendario).await?;
    let asignaciones = asignar_aulas(&data.store, &req)?;
    Ok(HttpResponse::Ok().json(json!({ "asignaciones": asignaciones })))
}
