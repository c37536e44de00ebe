mod support;

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use screenlogic::protocol::messages::{HistoryData, HistorySample};
use screenlogic::{
    BodyType, Client, Error, Gateway, HeatMode, HeatingState, SessionState, TemperatureUnit,
};
use support::{MockGateway, Script, Seen};

fn open(mock: &MockGateway, config: &screenlogic::ClientConfig) -> Gateway {
    let mut gateway = Gateway::new(mock.discovery(), config.clone());
    gateway.connect().unwrap();
    gateway.login().unwrap();
    gateway
}

fn codes(frames: &[Seen]) -> Vec<u16> {
    frames.iter().map(|f| f.code).collect()
}

#[test]
fn handshake_then_cached_reads() {
    let mock = MockGateway::start(Script {
        connections: 1,
        weather_before_status: true,
        ..Script::default()
    });
    let config = support::client_config(0);

    let pushed = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&pushed);
    let mut gateway = Gateway::new(mock.discovery(), config.clone());
    gateway.set_out_of_band_handler(move |header, _body| {
        sink.lock().unwrap().push(header.code());
        Ok(())
    });
    gateway.connect().unwrap();
    assert_eq!(gateway.state(), SessionState::Connected);
    assert_eq!(gateway.identity().mac_address.as_deref(), Some(support::MAC));
    gateway.login().unwrap();
    assert_eq!(gateway.state(), SessionState::Authenticated);

    let client = Client::new(gateway, &config);
    assert_eq!(client.gateway_name(), support::NAME);
    assert_eq!(client.gateway_version().unwrap(), support::VERSION);

    let status = client.pool_status().unwrap();
    assert!(status.is_ready());
    assert_eq!(status.air_temperature(), 68);
    assert_eq!(*pushed.lock().unwrap(), vec![9806]);

    // 80°F pool reported as 26°C
    assert_eq!(
        client
            .current_temperature(BodyType::Pool, TemperatureUnit::Celsius)
            .unwrap(),
        26
    );
    assert_eq!(
        client.heating_state(BodyType::Spa).unwrap(),
        HeatingState::Heating
    );
    assert!(client.heater_active(BodyType::Spa).unwrap());
    assert!(!client.heater_active(BodyType::Pool).unwrap());
    assert!(client.controller_config().unwrap().has_solar());

    drop(client);
    let seen = mock.join();
    assert_eq!(seen.len(), 1);

    let frames = &seen[0];
    assert_eq!(codes(frames), vec![14, 27, 8120, 12526, 12532]);
    let sequences: Vec<u16> = frames.iter().map(|f| f.sequence).collect();
    assert_eq!(sequences, vec![2, 3, 4, 5, 6]);
}

#[test]
fn dropped_connection_is_reconnected_and_retried() {
    let mock = MockGateway::start(Script {
        connections: 2,
        drop_first_status: true,
        ..Script::default()
    });
    let config = support::client_config(0);
    let client = Client::new(open(&mock, &config), &config);

    let before = screenlogic::metrics();
    let status = client.pool_status().unwrap();
    assert_eq!(status.bodies().len(), 2);
    assert!(screenlogic::metrics().reconnects > before.reconnects);

    drop(client);
    let seen = mock.join();
    assert_eq!(codes(&seen[0]), vec![14, 27, 12526]);
    assert_eq!(codes(&seen[1]), vec![14, 27, 12526]);
    // the counter restarts on the new connection
    assert_eq!(seen[1][0].sequence, 2);
}

#[test]
fn login_failure_is_terminal() {
    let mock = MockGateway::start(Script {
        connections: 1,
        reject_login: true,
        ..Script::default()
    });
    let config = support::client_config(0);

    let mut gateway = Gateway::new(mock.discovery(), config);
    gateway.connect().unwrap();
    let err = gateway.login().unwrap_err();
    assert!(matches!(err, Error::LoginFailed));
    assert!(!err.is_transient());
    assert_eq!(gateway.state(), SessionState::Connected);

    drop(gateway);
    assert_eq!(codes(&mock.join()[0]), vec![14, 27]);
}

#[test]
fn password_login_refused_before_sending() {
    let mock = MockGateway::start(Script {
        connections: 1,
        ..Script::default()
    });
    let mut config = support::client_config(0);
    config.password = Some("hunter2".to_string());

    let mut gateway = Gateway::new(mock.discovery(), config);
    gateway.connect().unwrap();
    assert!(matches!(gateway.login(), Err(Error::Unimplemented(_))));

    drop(gateway);
    assert_eq!(codes(&mock.join()[0]), vec![14]);
}

#[test]
fn commands_acknowledged_or_rejected() {
    let mock = MockGateway::start(Script {
        connections: 1,
        ..Script::default()
    });
    let config = support::client_config(0);
    let client = Client::new(open(&mock, &config), &config);

    client.set_heat_mode(BodyType::Spa, HeatMode::On).unwrap();
    client.set_temperature(BodyType::Spa, 102).unwrap();
    let err = client
        .set_heat_mode(BodyType::Spa, HeatMode::Unchanged)
        .unwrap_err();
    assert!(matches!(err, Error::BadParameter { request: 12538 }));

    // the session survives a rejected command
    assert!(client.pool_status().is_ok());

    drop(client);
    assert_eq!(
        codes(&mock.join()[0]),
        vec![14, 27, 12538, 12528, 12538, 12526]
    );
}

#[test]
fn history_reads_ack_then_samples() {
    let day = NaiveDate::from_ymd_opt(2024, 7, 4).unwrap();
    let history = HistoryData {
        outside_air: vec![HistorySample {
            timestamp: day.and_hms_opt(6, 0, 0).unwrap(),
            temperature: 65,
        }],
        pool_water: vec![
            HistorySample {
                timestamp: day.and_hms_opt(6, 0, 0).unwrap(),
                temperature: 79,
            },
            HistorySample {
                timestamp: day.and_hms_opt(7, 0, 0).unwrap(),
                temperature: 80,
            },
        ],
    };
    let mock = MockGateway::start(Script {
        connections: 1,
        history: history.clone(),
        ..Script::default()
    });
    let config = support::client_config(0);
    let client = Client::new(open(&mock, &config), &config);

    let start = day.and_hms_opt(0, 0, 0).unwrap();
    let end = day.and_hms_opt(23, 59, 59).unwrap();
    assert_eq!(client.history(start, end).unwrap(), history);

    drop(client);
    assert_eq!(codes(&mock.join()[0]), vec![14, 27, 12534]);
}

#[test]
fn oversized_frame_closes_the_session() {
    let mock = MockGateway::start(Script {
        connections: 1,
        oversized_version: true,
        ..Script::default()
    });
    let config = support::client_config(0);
    let mut gateway = open(&mock, &config);

    let err = gateway.version().unwrap_err();
    assert!(matches!(err, Error::Framing(_)));
    assert!(!err.is_transient());
    assert_eq!(gateway.state(), SessionState::Unconnected);

    // the unread body is never parsed as the next header
    assert!(matches!(gateway.version(), Err(Error::NotConnected)));

    drop(gateway);
    assert_eq!(codes(&mock.join()[0]), vec![14, 27, 8120]);
}

#[test]
fn wrong_login_answer_is_malformed() {
    let mock = MockGateway::start(Script {
        connections: 1,
        login_reply: Some(12527),
        ..Script::default()
    });
    let config = support::client_config(0);

    let mut gateway = Gateway::new(mock.discovery(), config);
    gateway.connect().unwrap();
    let err = gateway.login().unwrap_err();
    assert!(matches!(
        err,
        Error::UnexpectedMessage {
            expected: 28,
            found: 12527
        }
    ));
    assert!(err.is_malformed());
    assert!(!err.is_transient());
    assert_eq!(gateway.state(), SessionState::Connected);

    drop(gateway);
    assert_eq!(codes(&mock.join()[0]), vec![14, 27]);
}

#[test]
fn truncated_frame_fails_once_then_reconnects() {
    let mock = MockGateway::start(Script {
        connections: 2,
        truncate_first_status: true,
        ..Script::default()
    });
    let config = support::client_config(0);
    let client = Client::new(open(&mock, &config), &config);

    // a retry would have reached the second connection and succeeded
    let err = client.pool_status().unwrap_err();
    assert!(matches!(err, Error::Truncated { .. }));
    assert!(!err.is_transient());

    let before = screenlogic::metrics();
    assert!(client.pool_status().unwrap().is_ready());
    assert!(screenlogic::metrics().reconnects > before.reconnects);

    drop(client);
    let seen = mock.join();
    assert_eq!(seen.len(), 2);
    assert_eq!(codes(&seen[0]), vec![14, 27, 12526]);
    assert_eq!(codes(&seen[1]), vec![14, 27, 12526]);
}
