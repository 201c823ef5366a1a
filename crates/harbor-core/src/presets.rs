//! Built-in scene list used when no `[[scenes]]` are configured

use crate::catalog::{CatalogSpec, ObjectProfile, Severity};
use crate::overlay::OverlayKind;
use crate::scene::{SceneDescriptor, FIXED_CAMERA_NAME};
use crate::telemetry::{TelemetryRecord, TrackingNote};

/// Mesh parts that all show the robotic arm record
pub const ROBOTIC_ARM_PARTS: [&str; 4] = [
    "Arm1_lambert1_0",
    "ArmBase_lambert1_0",
    "RotatingArm_lambert1_0",
    "Cube",
];

pub const ROBOTIC_ARM_KEY: &str = "Robotic_Arm_System";

pub fn default_scenes() -> Vec<SceneDescriptor> {
    vec![port(), vehicle_management(), predictive_maintenance(), energy_management()]
}

fn port() -> SceneDescriptor {
    SceneDescriptor {
        overlays: vec![OverlayKind::Analytics],
        catalog: port_catalog(),
        ..SceneDescriptor::new("The Port", "scenes/scene.glb")
    }
}

fn vehicle_management() -> SceneDescriptor {
    let mut catalog = port_catalog();
    catalog.objects.push(
        ObjectProfile::focus("Gate_Control").with_overlays(&[OverlayKind::Dwell, OverlayKind::Graph]),
    );
    catalog.records.insert(
        "Gate_Control".into(),
        TelemetryRecord::from_pairs([
            ("Name", "Gate Control Station"),
            ("Status", "Active - Processing Queue"),
            ("Lanes Open", "4 of 6"),
            ("Scanner Health", "88%"),
        ]),
    );

    SceneDescriptor {
        overlays: vec![OverlayKind::Analytics, OverlayKind::Dwell, OverlayKind::Graph],
        catalog,
        ..SceneDescriptor::new("Vehicle Management", "scenes/scene2.glb")
    }
}

fn predictive_maintenance() -> SceneDescriptor {
    let diagnostics = [OverlayKind::Diagnostic, OverlayKind::Alert, OverlayKind::Graph];

    let mut catalog = port_catalog();
    for profile in catalog.objects.iter_mut().filter(|p| p.name == "Object_4_002") {
        *profile = ObjectProfile::focus("Object_4_002")
            .with_overlays(&diagnostics)
            .with_severity(Severity::Warning);
    }
    catalog.objects.push(
        ObjectProfile::focus("Pump_Station_A")
            .with_overlays(&diagnostics)
            .with_severity(Severity::Critical),
    );
    catalog.records.insert(
        "Pump_Station_A".into(),
        TelemetryRecord::from_pairs([
            ("Name", "Hydraulic Pump Station A"),
            ("Status", "Offline - Pressure Sensor Error"),
            ("Equipment Health", "22%"),
            ("Vibration", "11.4 mm/s"),
            ("Predicted Failure", "< 48 h"),
        ]),
    );

    SceneDescriptor {
        loop_frames: 600,
        overlays: vec![
            OverlayKind::Analytics,
            OverlayKind::Diagnostic,
            OverlayKind::Alert,
            OverlayKind::Graph,
        ],
        catalog,
        ..SceneDescriptor::new("Predictive Maintenance", "scenes/scene3.glb")
    }
}

fn energy_management() -> SceneDescriptor {
    SceneDescriptor {
        loop_frames: 600,
        environment: "qwantani_moon_noon_puresky_1k".into(),
        camera_position: [150.0, 100.0, 150.0],
        exposure: 0.3,
        fixed_camera: Some(FIXED_CAMERA_NAME.into()),
        overlays: vec![OverlayKind::Analytics, OverlayKind::EnergyGrid],
        catalog: port_catalog(),
        ..SceneDescriptor::new("Smart Energy Management", "scenes/scene4.glb")
    }
}

/// Port equipment, vessels and yard vehicles
pub fn port_catalog() -> CatalogSpec {
    let analytics = [OverlayKind::Analytics];

    let mut objects = vec![
        ObjectProfile::focus("Green_zeleni_kont_0"),
        ObjectProfile::focus("model_81_backside_2"),
        ObjectProfile::focus("Object_4_002"),
        ObjectProfile::focus("Object_17"),
        ObjectProfile::focus("Object_17_001"),
        ObjectProfile::focus("crane_new").with_overlays(&analytics),
    ];
    objects.extend(ROBOTIC_ARM_PARTS.iter().map(|part| {
        ObjectProfile::focus(part)
            .with_alias(ROBOTIC_ARM_KEY)
            .with_overlays(&analytics)
    }));
    objects.extend(
        ["crate_opti_1", "crate_opti_2", "crate_lag_1", "crate_lag_2"]
            .into_iter()
            .map(ObjectProfile::track),
    );

    let records = [
        (
            "Green_zeleni_kont_0",
            TelemetryRecord::from_pairs([
                ("Name", "Container C-734"),
                ("Status", "Awaiting Pickup"),
                ("Container Health", "98%"),
                ("Weight", "14.2 Tons"),
                ("Max Weight", "30 Tons"),
                ("Location", "Dock 4, Bay 7"),
            ]),
        ),
        (
            "model_81_backside_2",
            TelemetryRecord::from_pairs([
                ("Name", "Port Power Unit"),
                ("Status", "Active"),
                ("Energy Output", "2.1 GW"),
                ("Coolant Temp", "78°C"),
                ("Last Service", "2025-08-12"),
            ]),
        ),
        (
            "Object_4_002",
            TelemetryRecord::from_pairs([
                ("Name", "Crane Alpha-3"),
                ("Status", "Idle"),
                ("Equipment Health", "92%"),
                ("Temperature", "45°C"),
                ("Current Load", "0 Tons"),
                ("Next Service", "2025-11-05"),
            ]),
        ),
        (
            "Object_17",
            TelemetryRecord::from_pairs([
                ("Name", "Cargo Ship \"Odyssey\""),
                ("Status", "Docked - Unloading"),
                ("Fuel Reserve", "65%"),
                ("Cargo Capacity", "85% Full"),
                ("Next Departure", "2025-10-19 18:00 UTC"),
                ("Maintenance Status", "No Issues Reported"),
            ]),
        ),
        (
            "Object_17_001",
            TelemetryRecord::from_pairs([
                ("Name", "Freighter \"Starlight\""),
                ("Status", "Docked - Loading"),
                ("Fuel Reserve", "95%"),
                ("Cargo Capacity", "34% Full"),
                ("Next Departure", "2025-10-20 04:00 UTC"),
                ("Maintenance Status", "Minor Hydraulics Check Scheduled"),
            ]),
        ),
        (
            "crane_new",
            TelemetryRecord::from_pairs([
                ("Name", "Automated Crane Unit"),
                ("Status", "Active - Scanning"),
                ("Transfer Efficiency", "+35%"),
                ("Berth Idle Time", "-28%"),
                ("Technology", "Robotic Arm Integration"),
            ]),
        ),
        (
            ROBOTIC_ARM_KEY,
            TelemetryRecord::from_pairs([
                ("Name", "Robotic Arm System"),
                (
                    "Purpose",
                    "High-speed container scanning and sorting to reduce unloading times.",
                ),
                ("Status", "Active"),
                ("Current Task", "Scanning Container #41"),
            ]),
        ),
    ];

    let tracking = [
        (
            "crate_opti_1",
            TrackingNote::new(true, "Traffic Optimized:", "AI-guided pathing is reducing congestion by 32%."),
        ),
        (
            "crate_opti_2",
            TrackingNote::new(true, "Traffic Optimized:", "Smart-lane allocation is minimizing vehicle idle time."),
        ),
        (
            "crate_lag_1",
            TrackingNote::new(false, "Congestion Detected:", "Unmanaged traffic is causing a 14% delay in transfer."),
        ),
        (
            "crate_lag_2",
            TrackingNote::new(false, "Congestion Detected:", "Manual routing is leading to potential bottlenecks."),
        ),
    ];

    CatalogSpec {
        objects,
        records: records.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        tracking: tracking.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Capability, ObjectCatalog};
    use crate::scene::SceneList;
    use crate::telemetry::{FieldView, Tier};

    #[test]
    fn test_presets_validate() {
        let list = SceneList::new(default_scenes()).unwrap();
        assert_eq!(list.len(), 4);
        assert_eq!(list.get(0).unwrap().name, "The Port");
        assert_eq!(list.get(2).unwrap().loop_frames, 600);

        let energy = list.get(3).unwrap();
        assert!(energy.shows_energy_grid());
        assert_eq!(energy.fixed_camera.as_deref(), Some(FIXED_CAMERA_NAME));
        assert!(list.iter().take(3).all(|s| !s.shows_energy_grid() && s.fixed_camera.is_none()));
    }

    #[test]
    fn test_robotic_arm_parts_share_record() {
        let catalog = ObjectCatalog::resolve(&port_catalog()).unwrap();
        for part in ROBOTIC_ARM_PARTS {
            let profile = catalog.profile(part).unwrap();
            assert_eq!(profile.display_key(), ROBOTIC_ARM_KEY);
            assert_eq!(profile.overlays, vec![OverlayKind::Analytics]);
        }
        assert_eq!(catalog.names_with(Capability::Track).len(), 4);
    }

    #[test]
    fn test_every_focusable_has_a_record() {
        for scene in default_scenes() {
            let catalog = scene.resolve_catalog().unwrap();
            for name in catalog.names_with(Capability::Focus) {
                let key = catalog.profile(name).unwrap().display_key();
                assert!(catalog.record(key).is_some(), "{}: {name}", scene.name);
            }
        }
    }

    #[test]
    fn test_ship_rows() {
        let catalog = ObjectCatalog::resolve(&port_catalog()).unwrap();
        let rows = catalog.record("Object_17_001").unwrap().rows();
        let capacity = rows.iter().find(|r| r.label() == "Cargo Capacity").unwrap();
        assert!(matches!(capacity, FieldView::Percentage { percent: 34, tier: Tier::Warning, .. }));
        let maintenance = rows.iter().find(|r| r.label() == "Maintenance Status").unwrap();
        assert!(matches!(maintenance, FieldView::Status { tier: Tier::Warning, .. }));
    }
}
