use anyhow::{Context as _, Result, bail};
use rumqttc::{AsyncClient, Event, MqttOptions, Outgoing, QoS};
use tokio::time::Duration;

use crate::measurement::RoomReading;

const CLIENT_ID: &str = "co2mini-reporter";
const DEFAULT_PORT: u16 = 1883;

pub fn temperature_topic(base_topic: &str) -> String {
    format!("{base_topic}/temperature")
}

pub fn co2_topic(base_topic: &str) -> String {
    format!("{base_topic}/co2")
}

pub fn temperature_payload(reading: &RoomReading) -> String {
    format!("{:.2}", reading.temperature_celsius)
}

pub fn co2_payload(reading: &RoomReading) -> String {
    format!("{}", reading.co2_ppm)
}

/// Splits a broker address like `tcp://192.168.0.1:1883` into host and port.
/// The scheme is optional and the port defaults to 1883.
pub fn parse_server_address(server: &str) -> Result<(String, u16)> {
    let address = server
        .strip_prefix("tcp://")
        .or_else(|| server.strip_prefix("mqtt://"))
        .unwrap_or(server);

    if address.is_empty() {
        bail!("empty broker address");
    }

    match address.rsplit_once(':') {
        Some((host, port)) => {
            if host.is_empty() {
                bail!("missing host in broker address: {server}");
            }
            let port = port
                .parse()
                .with_context(|| format!("invalid port in broker address: {server}"))?;
            Ok((host.to_string(), port))
        }
        None => Ok((address.to_string(), DEFAULT_PORT)),
    }
}

/// Publishes one completed reading to `<base_topic>/temperature` and
/// `<base_topic>/co2`, then disconnects.
pub async fn publish_reading(
    server: &str,
    base_topic: &str,
    credentials: Option<(&str, &str)>,
    reading: &RoomReading,
) -> Result<()> {
    let (host, port) = parse_server_address(server).context("failed to parse broker address")?;

    let mut options = MqttOptions::new(CLIENT_ID, host, port);
    options.set_keep_alive(Duration::from_secs(5));
    if let Some((user, password)) = credentials {
        options.set_credentials(user, password);
    }

    let (client, mut eventloop) = AsyncClient::new(options, 10);

    client
        .publish(
            temperature_topic(base_topic),
            QoS::AtMostOnce,
            false,
            temperature_payload(reading),
        )
        .await
        .context("failed to queue temperature publish")?;
    client
        .publish(
            co2_topic(base_topic),
            QoS::AtMostOnce,
            false,
            co2_payload(reading),
        )
        .await
        .context("failed to queue CO2 publish")?;
    client
        .disconnect()
        .await
        .context("failed to queue disconnect")?;

    // The event loop drives the network; the queued publishes are on the
    // wire once the disconnect goes out.
    loop {
        match eventloop.poll().await {
            Ok(Event::Outgoing(Outgoing::Disconnect)) => return Ok(()),
            Ok(_) => {}
            Err(e) => return Err(e).context("mqtt connection failed"),
        }
    }
}
