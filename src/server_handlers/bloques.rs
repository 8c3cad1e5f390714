// Handlers de calendarios y bloques.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::errors::ApiError;
use crate::models::{ActualizaBloque, NuevoBloque, NuevoCalendario};
use crate::server::AppState;

pub async fn listar_calendarios(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.store.listar_calendarios()?))
}

pub async fn crear_calendario(
    data: web::Data<AppState>,
    body: web::Json<NuevoCalendario>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.store.crear_calendario(&body)?))
}

#[derive(Debug, Deserialize)]
pub struct BloquesQuery {
    pub calendario: Option<i64>,
}

pub async fn listar_bloques(
    data: web::Data<AppState>,
    query: web::Query<BloquesQuery>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.store.listar_bloques(query.calendario)?))
}

pub async fn crear_bloque(
    data: web::Data<AppState>,
    body: web::Json<NuevoBloque>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.store.crear_bloque(&body)?))
}

pub async fn actualizar_bloque(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<ActualizaBloque>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.store.actualizar_bloque(path.into_inner(), &body)?))
}

pub async fn eliminar_bloque(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    data.store.eliminar_bloque(path.into_inner())?;
    Ok(HttpResponse::Ok().json(serde_json::json!({"status": "ok"})))
}
