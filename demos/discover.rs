//! Find the gateway on the local network and print what it reports
//!
//! Run with `RUST_LOG=screenlogic=debug` to watch the handshake.

use screenlogic::{BodyType, Client, ClientConfig, TemperatureUnit};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("screenlogic=info".parse()?))
        .init();

    let client = Client::connect(ClientConfig::with_client_name("screenlogic-demo"))?;
    println!("Gateway:  {}", client.gateway_name());
    println!("Firmware: {}", client.gateway_version()?);

    let unit = client.temperature_unit()?;
    let config = client.controller_config()?;
    println!("Unit:     {}", unit.symbol());
    println!("Solar:    {}", config.has_solar());
    println!("Circuits: {}", config.circuits().len());

    let status = client.pool_status()?;
    println!("Ready:    {:?}", status.readiness());
    println!(
        "Air:      {}{}",
        client.air_temperature(TemperatureUnit::Celsius)?,
        TemperatureUnit::Celsius.symbol()
    );

    for body in [BodyType::Pool, BodyType::Spa] {
        if status.body(body).is_none() {
            continue;
        }
        println!(
            "{body:<8}  {}{}  heat mode {:?}  {:?}",
            client.current_temperature(body, TemperatureUnit::Celsius)?,
            TemperatureUnit::Celsius.symbol(),
            client.target_heat_mode(body)?,
            client.heating_state(body)?,
        );
    }

    Ok(())
}
