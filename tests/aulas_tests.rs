use aulagrid::models::*;
use aulagrid::scheduling::rooms::{asignar_aulas, AsignacionEstado, AsignarAulasRequest};
use aulagrid::store::Store;

struct Escenario {
    store: Store,
    periodo: i64,
    calendario: i64,
    tipo_lab: i64,
    edificio_a: i64,
    edificio_b: i64,
    asignatura: i64,
    turno: i64,
}

fn escenario() -> Escenario {
    let store = Store::abrir_en_memoria().unwrap();
    let periodo = store
        .crear_periodo(&NuevoPeriodo {
            gestion: 2026,
            numero: 1,
            fecha_inicio: "2026-02-02".to_string(),
            fecha_fin: "2026-06-30".to_string(),
        })
        .unwrap()
        .id;
    let calendario = store
        .crear_calendario(&NuevoCalendario { periodo, nombre: None, duracion_bloque_min: Some(45) })
        .unwrap()
        .id;
    let inicios = ["08:00", "08:45", "09:30", "10:15", "11:00"];
    for (i, h) in inicios.iter().enumerate() {
        store
            .crear_bloque(&NuevoBloque {
                calendario,
                orden: (i + 1) as i32,
                hora_inicio: h.to_string(),
                duracion_min: None,
            })
            .unwrap();
    }
    let edificio_a = store
        .crear_edificio(&NuevoEdificio {
            codigo: "A".to_string(),
            nombre: "Bloque A".to_string(),
            ubicacion: None,
        })
        .unwrap()
        .id;
    let edificio_b = store
        .crear_edificio(&NuevoEdificio {
            codigo: "B".to_string(),
            nombre: "Bloque B".to_string(),
            ubicacion: None,
        })
        .unwrap()
        .id;
    let tipo_lab = store
        .crear_tipo_ambiente(&NuevoTipoAmbiente { nombre: "Laboratorio".to_string(), descripcion: None })
        .unwrap()
        .id;
    let turno = store.crear_turno("Mañana").unwrap().id;
    let asignatura = store
        .crear_asignatura(&NuevaAsignatura {
            carrera: None,
            codigo: "CIT2002".to_string(),
            nombre: "Redes".to_string(),
            horas_teoria_semana: Some(0),
            horas_practica_semana: Some(2),
            tipo_ambiente_teoria: None,
            tipo_ambiente_practica: Some(tipo_lab),
        })
        .unwrap()
        .id;
    Escenario { store, periodo, calendario, tipo_lab, edificio_a, edificio_b, asignatura, turno }
}

fn grupo(e: &Escenario, codigo: &str, capacidad: i32) -> i64 {
    e.store
        .crear_grupo(&NuevoGrupo {
            asignatura: e.asignatura,
            periodo: e.periodo,
            turno: e.turno,
            docente: None,
            codigo: Some(codigo.to_string()),
            capacidad: Some(capacidad),
        })
        .unwrap()
        .id
}

fn clase_practica(e: &Escenario, grupo: i64, dia: i32, bloque: i32) -> i64 {
    e.store
        .crear_clases_bulk(
            &[NuevaClase {
                grupo,
                tipo: ClaseTipo::P,
                day_of_week: dia,
                bloque_inicio: bloque,
                bloques_duracion: Some(1),
                ambiente: None,
                docente: None,
                estado: Some(ClaseEstado::Confirmado),
            }],
            5,
        )
        .unwrap()[0]
        .id
}

fn lab(e: &Escenario, edificio: i64, codigo: &str, capacidad: i32) -> i64 {
    e.store
        .crear_ambiente(&NuevoAmbiente {
            edificio,
            tipo_ambiente: e.tipo_lab,
            codigo: codigo.to_string(),
            nombre: None,
            capacidad,
        })
        .unwrap()
        .id
}

#[test]
fn test_un_laboratorio_dos_clases_mismo_bloque() {
    let e = escenario();
    let laboratorio = lab(&e, e.edificio_a, "LAB-101", 30);
    let g1 = grupo(&e, "A1", 30);
    let g2 = grupo(&e, "B1", 30);
    let c1 = clase_practica(&e, g1, 1, 2);
    let c2 = clase_practica(&e, g2, 1, 2);

    let items = asignar_aulas(
        &e.store,
        &AsignarAulasRequest {
            periodo: e.periodo,
            calendario: e.calendario,
            clase_ids: None,
            prefer_edificio: None,
            force: None,
        },
    )
    .unwrap();

    // orden determinista por id ascendente: la primera gana el laboratorio,
    // la segunda choca dentro del mismo lote
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].clase, c1.min(c2));
    assert_eq!(items[0].estado, AsignacionEstado::Asignado);
    assert_eq!(items[0].ambiente_nuevo, Some(laboratorio));
    assert_eq!(items[1].estado, AsignacionEstado::Conflicto);
    assert_eq!(items[1].ambiente_nuevo, None);
}

#[test]
fn test_segunda_corrida_sin_force_solo_omite() {
    let e = escenario();
    lab(&e, e.edificio_a, "LAB-101", 30);
    lab(&e, e.edificio_a, "LAB-102", 30);
    let g1 = grupo(&e, "A1", 30);
    let g2 = grupo(&e, "B1", 30);
    clase_practica(&e, g1, 1, 2);
    clase_practica(&e, g2, 1, 2);

    let req = AsignarAulasRequest {
        periodo: e.periodo,
        calendario: e.calendario,
        clase_ids: None,
        prefer_edificio: None,
        force: None,
    };
    let primera = asignar_aulas(&e.store, &req).unwrap();
    assert!(primera.iter().all(|i| i.estado == AsignacionEstado::Asignado));

    let segunda = asignar_aulas(&e.store, &req).unwrap();
    assert!(segunda.iter().all(|i| i.estado == AsignacionEstado::Omitido));
}

#[test]
fn test_capacidad_y_tipo_filtran_candidatos() {
    let e = escenario();
    // único laboratorio, demasiado chico para el grupo
    lab(&e, e.edificio_a, "LAB-101", 20);
    let g = grupo(&e, "A1", 35);
    clase_practica(&e, g, 1, 1);

    let items = asignar_aulas(
        &e.store,
        &AsignarAulasRequest {
            periodo: e.periodo,
            calendario: e.calendario,
            clase_ids: None,
            prefer_edificio: None,
            force: None,
        },
    )
    .unwrap();
    assert_eq!(items[0].estado, AsignacionEstado::SinCandidatos);
}

#[test]
fn test_prefer_edificio_desempata() {
    let e = escenario();
    // el laboratorio del edificio A tiene id menor, pero se prefiere B
    lab(&e, e.edificio_a, "LAB-A", 30);
    let lab_b = lab(&e, e.edificio_b, "LAB-B", 30);
    let g = grupo(&e, "A1", 25);
    clase_practica(&e, g, 1, 1);

    let items = asignar_aulas(
        &e.store,
        &AsignarAulasRequest {
            periodo: e.periodo,
            calendario: e.calendario,
            clase_ids: None,
            prefer_edificio: Some(e.edificio_b),
            force: None,
        },
    )
    .unwrap();
    assert_eq!(items[0].estado, AsignacionEstado::Asignado);
    assert_eq!(items[0].ambiente_nuevo, Some(lab_b));
}

#[test]
fn test_ambiente_ocupado_en_db_excluido() {
    let e = escenario();
    let laboratorio = lab(&e, e.edificio_a, "LAB-101", 30);
    let g1 = grupo(&e, "A1", 30);
    let g2 = grupo(&e, "B1", 30);
    // la clase de g1 ya tiene el laboratorio reservado en la base
    e.store
        .crear_clases_bulk(
            &[NuevaClase {
                grupo: g1,
                tipo: ClaseTipo::P,
                day_of_week: 1,
                bloque_inicio: 2,
                bloques_duracion: Some(1),
                ambiente: Some(laboratorio),
                docente: None,
                estado: Some(ClaseEstado::Confirmado),
            }],
            5,
        )
        .unwrap();
    clase_practica(&e, g2, 1, 2);

    let items = asignar_aulas(
        &e.store,
        &AsignarAulasRequest {
            periodo: e.periodo,
            calendario: e.calendario,
            clase_ids: None,
            prefer_edificio: None,
            force: None,
        },
    )
    .unwrap();
    // la ya asignada se omite; la otra no tiene candidato libre
    let omitidos = items.iter().filter(|i| i.estado == AsignacionEstado::Omitido).count();
    let sin_candidatos = items.iter().filter(|i| i.estado == AsignacionEstado::SinCandidatos).count();
    assert_eq!(omitidos, 1);
    assert_eq!(sin_candidatos, 1);
}
