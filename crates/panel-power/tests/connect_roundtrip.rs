//! Power runs over TCP against the Connect simulator

use panel_power::{run, ConnectConfig, PanelGroups, PanelPowerError, PowerJob};
use std::io::Write;
use std::net::TcpListener;
use stk_connect::server::ConnectServer;
use stk_connect::sim::SimCall;
use stk_connect::{ClassicalElements, ConnectError, Endpoint, StkVersion};
use tempfile::NamedTempFile;

fn model_file() -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".dae").tempfile().unwrap();
    writeln!(file, "<COLLADA/>").unwrap();
    file
}

fn job(model: &NamedTempFile) -> PowerJob {
    PowerJob {
        start: "1 Jan 2020 00:00:00".parse().unwrap(),
        stop: "1 Jan 2020 01:00:00".parse().unwrap(),
        step_s: 60.0,
        elements: ClassicalElements::from_array([7000.0, 0.001, 51.6, 0.0, 0.0, 0.0]),
        orbit_epoch: "1 Jan 2020 00:00:00".parse().unwrap(),
        model_file: model.path().to_path_buf(),
        panel_count: 2,
        panel_groups: PanelGroups::new(["PanelA", "PanelB"]).unwrap(),
        group_index: 2,
    }
}

/// Address nothing listens on
fn dead_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().to_string()
}

fn config(endpoints: Vec<Endpoint>) -> ConnectConfig {
    ConnectConfig {
        endpoints,
        connect_timeout_ms: 500,
        io_timeout_ms: 10_000,
        ..ConnectConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_run_over_tcp() {
    let server = ConnectServer::bind("127.0.0.1:0", "11.6.0").await.unwrap();
    let address = server.local_addr().unwrap().to_string();
    let stk = server.stk();
    let task = tokio::spawn(server.run());

    let model = model_file();
    let job = job(&model);
    let config = config(vec![Endpoint {
        version: StkVersion(11),
        address,
    }]);

    let series = tokio::task::spawn_blocking(move || run(&config.connector(), &config, &job))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(series.len(), 61);
    assert_eq!(series.group(), "PanelB");
    assert!(series.samples().iter().all(|s| s.power_w >= 0.0));
    assert_eq!(series.samples()[60].time_s, 3600.0);

    let stk = stk.lock().unwrap();
    assert_eq!(stk.scenario_name(), None);
    assert_eq!(stk.calls().first(), Some(&SimCall::Version));
    assert_eq!(stk.calls().last(), Some(&SimCall::UnloadScenario));

    task.abort();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_fallback_over_tcp() {
    // 11 is down, 10 answers with the wrong major version, 12 is fine
    let wrong = ConnectServer::bind("127.0.0.1:0", "12.0.0").await.unwrap();
    let right = ConnectServer::bind("127.0.0.1:0", "12.2.0").await.unwrap();
    let wrong_addr = wrong.local_addr().unwrap().to_string();
    let right_addr = right.local_addr().unwrap().to_string();
    let wrong_stk = wrong.stk();
    let tasks = [tokio::spawn(wrong.run()), tokio::spawn(right.run())];

    let model = model_file();
    let job = job(&model);
    let config = config(vec![
        Endpoint {
            version: StkVersion(11),
            address: dead_address(),
        },
        Endpoint {
            version: StkVersion(10),
            address: wrong_addr,
        },
        Endpoint {
            version: StkVersion(12),
            address: right_addr,
        },
    ]);

    let series = tokio::task::spawn_blocking(move || run(&config.connector(), &config, &job))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(series.len(), 61);

    // the mismatched instance only saw the handshake
    assert_eq!(wrong_stk.lock().unwrap().calls(), &[SimCall::Version]);

    for task in tasks {
        task.abort();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_nothing_listening() {
    let model = model_file();
    let job = job(&model);
    let config = config(
        StkVersion::FALLBACK_ORDER
            .iter()
            .map(|&version| Endpoint {
                version,
                address: dead_address(),
            })
            .collect(),
    );

    let err = tokio::task::spawn_blocking(move || run(&config.connector(), &config, &job))
        .await
        .unwrap()
        .unwrap_err();

    match err {
        PanelPowerError::Connect(ConnectError::NoSupportedVersion { tried }) => {
            assert_eq!(tried, StkVersion::FALLBACK_ORDER.to_vec())
        }
        other => panic!("unexpected error {:?}", other),
    }
}
