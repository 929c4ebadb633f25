//! Integration tests for the complete platform flow.
//!
//! These tests drive setup, polling and control against mock buses the way
//! a host would: load configuration, register entities, then call turn on,
//! turn off and update at its own cadence.

use dalilight_hardware::mock::{MockFault, MockTransport, MockTransportHandle};
use dalilight_hardware::{AnyTransport, Command};
use dalilight_platform::{DaliConfig, EntityCollector, EntityKind, LightEntity, setup_platform};
use tokio::sync::mpsc;

const CONFIG: &str = r#"
max_buses = 4

[[drivers]]
name = "office"

[[drivers]]
name = "hall"
max_gears = 16
"#;

fn bus(gear: &[(u8, u8)]) -> (AnyTransport, MockTransportHandle) {
    let (transport, handle) = MockTransport::new();
    for (address, level) in gear {
        handle.add_gear(*address, *level);
    }
    (transport.into(), handle)
}

fn find<'a, T>(entities: &'a mut [LightEntity<T>], name: &str) -> &'a mut LightEntity<T>
where
    T: dalilight_hardware::DaliTransport,
{
    entities
        .iter_mut()
        .find(|e| e.name() == name)
        .unwrap_or_else(|| panic!("entity {name} not registered"))
}

#[tokio::test]
async fn test_setup_registers_both_buses() {
    let config = DaliConfig::from_toml_str(CONFIG).unwrap();
    let (office, _office_handle) = bus(&[(3, 120), (10, 120), (40, 120)]);
    // address 20 is beyond max_gears for the hall bus
    let (hall, hall_handle) = bus(&[(0, 50), (20, 50)]);
    let mut sink = EntityCollector::new();

    let registered = setup_platform(&config, &mut vec![office, hall], &mut sink)
        .await
        .unwrap();

    assert_eq!(registered, 6);
    let summary: Vec<(String, u32, EntityKind)> = sink
        .entities()
        .iter()
        .map(|e| (e.name().to_string(), e.unique_id().as_u32(), e.kind()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("office_3".to_string(), 3, EntityKind::Lamp),
            ("office_10".to_string(), 10, EntityKind::Lamp),
            ("office_40".to_string(), 40, EntityKind::Lamp),
            ("office bus".to_string(), 256, EntityKind::Bus),
            ("hall_0".to_string(), 64, EntityKind::Lamp),
            ("hall bus".to_string(), 257, EntityKind::Bus),
        ]
    );
    assert!(
        hall_handle
            .sent_commands()
            .iter()
            .filter(|c| matches!(c, Command::QueryControlGearPresent(_)))
            .count()
            == 16
    );
}

#[tokio::test]
async fn test_poll_cycle_tracks_divergence() {
    let config = DaliConfig::from_toml_str(CONFIG).unwrap();
    let (office, handle) = bus(&[(1, 120), (2, 120), (3, 120)]);
    let mut sink = EntityCollector::new();
    setup_platform(&config, &mut vec![office], &mut sink).await.unwrap();
    let entities = sink.entities_mut();

    let office_bus = find(entities, "office bus");
    assert_eq!(office_bus.brightness(), Some(120));
    assert_eq!(office_bus.is_on(), Some(true));

    handle.set_level(2, 90);
    for entity in entities.iter_mut() {
        entity.update().await;
    }
    assert_eq!(find(entities, "office bus").brightness(), None);
    assert_eq!(find(entities, "office bus").is_on(), None);
    assert_eq!(find(entities, "office_2").brightness(), Some(90));

    handle.set_level(2, 120);
    find(entities, "office bus").update().await;
    assert_eq!(find(entities, "office bus").brightness(), Some(120));
}

#[tokio::test]
async fn test_lamp_vanishing_mid_scan() {
    let config = DaliConfig::from_toml_str(CONFIG).unwrap();
    let (office, handle) = bus(&[(1, 120), (2, 120), (3, 120)]);
    let mut sink = EntityCollector::new();
    setup_platform(&config, &mut vec![office], &mut sink).await.unwrap();
    let entities = sink.entities_mut();

    handle.set_fault(2, MockFault::NoResponse);
    find(entities, "office bus").update().await;

    assert_eq!(find(entities, "office bus").brightness(), None);
    // per-lamp state is untouched by the bus scan
    assert_eq!(find(entities, "office_2").brightness(), Some(120));
    assert_eq!(find(entities, "office_2").is_on(), Some(true));

    find(entities, "office_2").update().await;
    assert_eq!(find(entities, "office_2").brightness(), None);
    assert_eq!(find(entities, "office_2").is_on(), None);
}

#[tokio::test]
async fn test_bus_control_is_broadcast() {
    let config = DaliConfig::from_toml_str(CONFIG).unwrap();
    let (office, handle) = bus(&[(1, 0), (2, 0)]);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut sink = EntityCollector::new().with_updates(tx);
    setup_platform(&config, &mut vec![office], &mut sink).await.unwrap();
    let entities = sink.entities_mut();

    handle.clear_log();
    find(entities, "office bus").turn_on(Some(255)).await;

    assert_eq!(handle.exchange_count(), 1);
    assert_eq!(handle.level(1), Some(254));
    assert_eq!(handle.level(2), Some(254));
    let announced = rx.recv().await.unwrap();
    assert_eq!(announced.name, "office bus");
    assert_eq!(announced.brightness, Some(254));

    // lamps only learn about the broadcast on their next poll
    assert_eq!(find(entities, "office_1").is_on(), Some(false));
    find(entities, "office_1").update().await;
    assert_eq!(find(entities, "office_1").brightness(), Some(254));
}

#[tokio::test]
async fn test_turn_off_twice_sends_twice() {
    let config = DaliConfig::from_toml_str(CONFIG).unwrap();
    let (office, handle) = bus(&[(7, 200)]);
    let mut sink = EntityCollector::new();
    setup_platform(&config, &mut vec![office], &mut sink).await.unwrap();
    let lamp = find(sink.entities_mut(), "office_7");

    handle.clear_log();
    lamp.turn_off().await;
    lamp.turn_off().await;

    assert_eq!(lamp.is_on(), Some(false));
    let offs = handle
        .sent_commands()
        .into_iter()
        .filter(|c| matches!(c, Command::Off(_)))
        .count();
    assert_eq!(offs, 2);
}

#[tokio::test]
async fn test_unplugged_master_degrades_silently() {
    let config = DaliConfig::from_toml_str(CONFIG).unwrap();
    let (office, handle) = bus(&[(1, 80)]);
    let mut sink = EntityCollector::new();
    setup_platform(&config, &mut vec![office], &mut sink).await.unwrap();
    let entities = sink.entities_mut();

    handle.disconnect();
    for entity in entities.iter_mut() {
        entity.turn_on(Some(10)).await;
        entity.update().await;
    }

    assert_eq!(find(entities, "office_1").brightness(), None);
    assert_eq!(find(entities, "office bus").brightness(), None);
}
