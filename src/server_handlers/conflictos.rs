// Handlers de detección, resolución y movimiento. Las operaciones que
// escriben toman el candado del calendario antes de tocar las clases.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::errors::ApiError;
use crate::scheduling::conflict::{detectar_conflictos, mover_clase, MoverRequest};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct DetectarRequest {
    pub periodo: i64,
    pub calendario: Option<i64>,
    /// por defecto true
    pub persistir: Option<bool>,
}

pub async fn detectar(
    data: web::Data<AppState>,
    body: web::Json<DetectarRequest>,
) -> Result<HttpResponse, ApiError> {
    let persistir = body.persistir.unwrap_or(true);
    let conflictos = if persistir {
        let cal = match body.calendario {
            Some(c) => c,
            None => data
                .store
                .calendario_activo(body.periodo)?
                .map(|c| c.id)
                .unwrap_or(0),
        };
        let _guard = data.locks.adquirir(body.periodo, cal).await?;
        detectar_conflictos(&data.store, body.periodo, body.calendario, true)?
    } else {
        detectar_conflictos(&data.store, body.periodo, body.calendario, false)?
    };
    Ok(HttpResponse::Ok().json(conflictos))
}

pub async fn listar(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.store.listar_conflictos()?))
}

pub async fn resolver(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.store.resolver_conflicto(path.into_inner())?))
}

pub async fn mover(
    data: web::Data<AppState>,
    body: web::Json<MoverRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = body.into_inner();
    if req.dry_run == Some(true) {
        // Solo evaluación: no hay escritura que serializar.
        return Ok(HttpResponse::Ok().json(mover_clase(&data.store, &req)?));
    }
    let clase = data.store.obtener_clase(req.clase)?;
    let grupo = data.store.obtener_grupo(clase.grupo)?;
    let cal = data
        .store
        .calendario_activo(grupo.periodo)?
        .map(|c| c.id)
        .unwrap_or(0);
    let _guard = data.locks.adquirir(grupo.periodo, cal).await?;
    Ok(HttpResponse::Ok().json(mover_clase(&data.store, &req)?))
}

#[derive(Debug, Deserialize)]
pub struct CambiosQuery {
    pub clase: Option<i64>,
}

pub async fn listar_cambios(
    data: web::Data<AppState>,
    query: web::Query<CambiosQuery>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.store.listar_cambios(query.clase)?))
}
