//! End-to-end collection: configuration file, compute pipeline, collector and registry

use std::io::Write;

use hs_connector::names;
use hs_core::ParameterState;
use hwsentry::config::load_agent_config;
use hwsentry::Scheduler;
use tempfile::NamedTempFile;

const CONFIG: &str = r#"{
    "hostname": "server-01",
    "max_concurrency": 2,
    "cycle_interval_ms": 10,
    "cycle_deadline_ms": 5000,
    "jobs": [
        {
            "name": "enclosure",
            "connector": "GenericEnclosure",
            "monitor_type": "enclosure",
            "snapshots": ["chassis;OK;1000;", "chassis;OK;4600;", "chassis;Failed;8200;"],
            "mapping": {
                "status": "Column(2)",
                "energyUsage": "Column(3)"
            }
        },
        {
            "name": "fans",
            "connector": "GenericFans",
            "source_key": "fan.collect.source(1)",
            "monitor_type": "fan",
            "snapshots": ["fan1;1;1200;\nfan2;2;600;"],
            "computes": [
                {
                    "type": "translate",
                    "column": 2,
                    "translationTable": {
                        "name": "FanStatus",
                        "translations": { "1": "OK", "2": "degraded", "default": "UNKNOWN" }
                    }
                }
            ],
            "mapping": {
                "status": "Column(2)",
                "speed": "Column(3)"
            }
        }
    ]
}"#;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn test_cycles_build_power_and_energy_from_counter() {
    let file = write_config(CONFIG);
    let config = load_agent_config(Some(file.path())).unwrap();
    let scheduler = Scheduler::from_config(&config);

    let first = scheduler.run_cycle(0, 0).await;
    assert_eq!(first.jobs_completed, 2);
    assert_eq!(first.rows_collected, 3);

    let enclosure = scheduler.registry().get("Enclosure:chassis").unwrap();
    assert!(enclosure.lock().number_param(names::POWER_CONSUMPTION).is_none());

    scheduler.run_cycle(1, 3_600_000).await;
    {
        let enclosure = enclosure.lock();
        let power = enclosure.number_param(names::POWER_CONSUMPTION).unwrap();
        assert!((power.value.unwrap() - 1.0).abs() < 1e-9);
        let energy = enclosure.number_param(names::ENERGY_USAGE).unwrap();
        assert_eq!(energy.value, Some(3600.0));
        assert_eq!(energy.raw_value, Some(4600.0));
    }

    scheduler.run_cycle(2, 7_200_000).await;
    let enclosure = enclosure.lock();
    let status = enclosure.status_param(names::STATUS).unwrap();
    assert_eq!(status.state, ParameterState::Alarm);
    assert_eq!(status.previous_state, Some(ParameterState::Ok));
}

#[tokio::test]
async fn test_compute_pipeline_feeds_the_collector() {
    let file = write_config(CONFIG);
    let config = load_agent_config(Some(file.path())).unwrap();
    let scheduler = Scheduler::from_config(&config);

    scheduler.run_cycle(0, 1_000).await;

    let ids = scheduler.registry().ids();
    assert_eq!(ids, vec!["Enclosure:chassis", "Fan:fan1", "Fan:fan2"]);

    let monitors = scheduler.registry().snapshot();
    let fan2 = monitors.iter().find(|m| m.id == "fan2").unwrap();
    assert_eq!(fan2.status_param(names::STATUS).unwrap().state, ParameterState::Warn);
    assert_eq!(fan2.number_param(names::SPEED).unwrap().value, Some(600.0));

    let json = serde_json::to_value(&monitors).unwrap();
    assert_eq!(json.as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn test_invalid_configuration_is_rejected() {
    let file = write_config(r#"{ "jobs": [ { "name": "x", "connector": "c", "monitor_type": "fan" } ] }"#);
    let err = load_agent_config(Some(file.path())).unwrap_err();
    assert!(err.to_string().contains("no snapshots"));
}
