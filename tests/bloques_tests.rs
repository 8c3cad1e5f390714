use aulagrid::errors::ApiError;
use aulagrid::models::{ActualizaBloque, NuevoBloque, NuevoCalendario, NuevoPeriodo};
use aulagrid::store::Store;

fn base() -> (Store, i64, i64) {
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
        .crear_calendario(&NuevoCalendario {
            periodo,
            nombre: Some("2026-1".to_string()),
            duracion_bloque_min: Some(45),
        })
        .unwrap()
        .id;
    (store, periodo, calendario)
}

#[test]
fn test_crear_bloques_recalcula_hora_fin() {
    let (store, _periodo, cal) = base();
    let b1 = store
        .crear_bloque(&NuevoBloque {
            calendario: cal,
            orden: 1,
            hora_inicio: "08:00".to_string(),
            duracion_min: None,
        })
        .unwrap();
    // duración por defecto del calendario (45') y fin recalculado
    assert_eq!(b1.duracion_min, 45);
    assert_eq!(b1.hora_inicio, "08:00:00");
    assert_eq!(b1.hora_fin, "08:45:00");

    let b2 = store
        .crear_bloque(&NuevoBloque {
            calendario: cal,
            orden: 2,
            hora_inicio: "08:45:00".to_string(),
            duracion_min: Some(90),
        })
        .unwrap();
    assert_eq!(b2.hora_fin, "10:15:00");
}

#[test]
fn test_orden_no_contiguo_rechazado() {
    let (store, _periodo, cal) = base();
    store
        .crear_bloque(&NuevoBloque {
            calendario: cal,
            orden: 1,
            hora_inicio: "08:00".to_string(),
            duracion_min: None,
        })
        .unwrap();
    // saltarse el orden 2 viola la contigüidad y no debe dejar rastro
    let err = store
        .crear_bloque(&NuevoBloque {
            calendario: cal,
            orden: 3,
            hora_inicio: "09:30".to_string(),
            duracion_min: None,
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::Validacion { .. }));
    assert_eq!(store.listar_bloques(Some(cal)).unwrap().len(), 1);
}

#[test]
fn test_solape_entre_bloques_rechazado() {
    let (store, _periodo, cal) = base();
    store
        .crear_bloque(&NuevoBloque {
            calendario: cal,
            orden: 1,
            hora_inicio: "08:00".to_string(),
            duracion_min: None,
        })
        .unwrap();
    // 08:30 < 08:45 (fin del bloque 1): se solapa
    let err = store
        .crear_bloque(&NuevoBloque {
            calendario: cal,
            orden: 2,
            hora_inicio: "08:30".to_string(),
            duracion_min: None,
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::Validacion { .. }));
}

#[test]
fn test_actualizar_duracion_revalida() {
    let (store, _periodo, cal) = base();
    let b1 = store
        .crear_bloque(&NuevoBloque {
            calendario: cal,
            orden: 1,
            hora_inicio: "08:00".to_string(),
            duracion_min: None,
        })
        .unwrap();
    store
        .crear_bloque(&NuevoBloque {
            calendario: cal,
            orden: 2,
            hora_inicio: "08:45".to_string(),
            duracion_min: None,
        })
        .unwrap();

    // estirar el bloque 1 hasta pisar el inicio del bloque 2 debe fallar
    let err = store
        .actualizar_bloque(
            b1.id,
            &ActualizaBloque { orden: None, hora_inicio: None, duracion_min: Some(60) },
        )
        .unwrap_err();
    assert!(matches!(err, ApiError::Validacion { .. }));

    // y la tabla queda como estaba
    let bloques = store.listar_bloques(Some(cal)).unwrap();
    assert_eq!(bloques[0].duracion_min, 45);
    assert_eq!(bloques[0].hora_fin, "08:45:00");
}

#[test]
fn test_eliminar_bloque_renumera() {
    let (store, _periodo, cal) = base();
    let inicios = ["08:00", "08:45", "09:30"];
    let mut ids = Vec::new();
    for (i, h) in inicios.iter().enumerate() {
        ids.push(
            store
                .crear_bloque(&NuevoBloque {
                    calendario: cal,
                    orden: (i + 1) as i32,
                    hora_inicio: h.to_string(),
                    duracion_min: None,
                })
                .unwrap()
                .id,
        );
    }
    store.eliminar_bloque(ids[1]).unwrap();
    let bloques = store.listar_bloques(Some(cal)).unwrap();
    assert_eq!(bloques.len(), 2);
    assert_eq!(bloques[0].orden, 1);
    assert_eq!(bloques[1].orden, 2);
    assert_eq!(bloques[1].hora_inicio, "09:30:00");
}

#[test]
fn test_bloque_inexistente_da_no_encontrado() {
    let (store, _periodo, _cal) = base();
    let err = store.eliminar_bloque(999).unwrap_err();
    assert!(matches!(err, ApiError::NoEncontrado(_)));
}
