// Handlers del catálogo: altas y listados mínimos para que el resto del
// sistema tenga datos con los que operar.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::errors::ApiError;
use crate::models::{
    NuevaAsignatura, NuevoAmbiente, NuevoDocente, NuevoEdificio, NuevoGrupo, NuevoPeriodo,
    NuevoTipoAmbiente,
};
use crate::server::AppState;

pub async fn crear_periodo(
    data: web::Data<AppState>,
    body: web::Json<NuevoPeriodo>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.store.crear_periodo(&body)?))
}

pub async fn listar_periodos(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.store.listar_periodos()?))
}

#[derive(Debug, Deserialize)]
pub struct NuevoTurnoRequest {
    pub nombre: String,
}

pub async fn crear_turno(
    data: web::Data<AppState>,
    body: web::Json<NuevoTurnoRequest>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.store.crear_turno(&body.nombre)?))
}

pub async fn listar_turnos(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.store.listar_turnos()?))
}

pub async fn crear_docente(
    data: web::Data<AppState>,
    body: web::Json<NuevoDocente>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.store.crear_docente(&body)?))
}

pub async fn listar_docentes(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.store.listar_docentes()?))
}

pub async fn crear_edificio(
    data: web::Data<AppState>,
    body: web::Json<NuevoEdificio>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.store.crear_edificio(&body)?))
}

pub async fn listar_edificios(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.store.listar_edificios()?))
}

pub async fn crear_tipo_ambiente(
    data: web::Data<AppState>,
    body: web::Json<NuevoTipoAmbiente>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.store.crear_tipo_ambiente(&body)?))
}

pub async fn listar_tipos_ambiente(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.store.listar_tipos_ambiente()?))
}

pub async fn crear_ambiente(
    data: web::Data<AppState>,
    body: web::Json<NuevoAmbiente>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.store.crear_ambiente(&body)?))
}

pub async fn listar_ambientes(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.store.listar_ambientes()?))
}

pub async fn crear_asignatura(
    data: web::Data<AppState>,
    body: web::Json<NuevaAsignatura>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.store.crear_asignatura(&body)?))
}

pub async fn listar_asignaturas(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.store.listar_asignaturas()?))
}

pub async fn crear_grupo(
    data: web::Data<AppState>,
    body: web::Json<NuevoGrupo>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.store.crear_grupo(&body)?))
}

#[derive(Debug, Deserialize)]
pub struct GruposQuery {
    pub periodo: Option<i64>,
    pub asignatura: Option<i64>,
    pub turno: Option<i64>,
}

pub async fn listar_grupos(
    data: web::Data<AppState>,
    query: web::Query<GruposQuery>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.store.listar_grupos(query.periodo, query.asignatura, query.turno)?))
}
