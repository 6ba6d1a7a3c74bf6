//! Client/broker exchange over an in-memory pipe using `MqttCodec`.
//!
//! Run with `cargo run --example framed_echo`. Set `RUST_LOG=debug` to see
//! every frame the codec handles.

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use mqtt_wire::config::CodecConfig;
use mqtt_wire::utils::logging::init_logging;
use mqtt_wire::utils::CodecMetrics;
use mqtt_wire::{
    Connack, ConnackCode, Connect, MqttCodec, Packet, ProtocolError, Publish, QoS, Result,
};
use tokio_util::codec::Framed;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = CodecConfig::from_env()?;
    config.validate_strict()?;
    init_logging(&config.logging)?;

    let metrics = Arc::new(CodecMetrics::new());
    let codec = || MqttCodec::from_config(&config.framing).with_metrics(metrics.clone());
    let capacity = config.framing.initial_buffer_capacity;

    // Small pipe so larger frames arrive in several reads
    let (client_io, broker_io) = tokio::io::duplex(16);
    let mut client = Framed::with_capacity(client_io, codec(), capacity);
    let mut broker = Framed::with_capacity(broker_io, codec(), capacity);

    let broker_task = tokio::spawn(async move {
        while let Some(packet) = broker.next().await {
            let reply = match packet? {
                Packet::Connect(connect) => {
                    info!(client_id = %connect.client_id, "Broker accepted client");
                    Packet::Connack(Connack::new(ConnackCode::Accepted, false))
                }
                Packet::Publish(publish) => match publish.message_id {
                    Some(id) => Packet::puback(id),
                    None => continue,
                },
                Packet::Pingreq(_) => Packet::pingresp(),
                Packet::Disconnect(_) => break,
                other => {
                    info!(packet_type = %other.packet_type(), "Broker ignoring packet");
                    continue;
                }
            };
            broker.send(reply).await?;
        }
        Ok::<_, ProtocolError>(())
    });

    let mut connect = Connect::new("demo-client");
    connect.keep_alive = 30;
    client.send(Packet::Connect(connect)).await?;
    expect_reply(&mut client).await?;

    for (i, text) in ["hello", "from", "mqtt-wire"].iter().enumerate() {
        let publish = Publish::with_qos("demo/echo", QoS::AtLeastOnce, i as u16 + 1, *text);
        client.send(Packet::Publish(publish)).await?;
        expect_reply(&mut client).await?;
    }

    client.send(Packet::pingreq()).await?;
    expect_reply(&mut client).await?;
    client.send(Packet::disconnect()).await?;

    broker_task
        .await
        .map_err(|e| ProtocolError::ConfigError(format!("Broker task failed: {e}")))??;

    metrics.log_metrics();
    println!("{:#?}", metrics.snapshot());
    Ok(())
}

async fn expect_reply<T>(client: &mut Framed<T, MqttCodec>) -> Result<()>
where
    T: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
{
    match client.next().await {
        Some(packet) => {
            let packet = packet?;
            info!(packet_type = %packet.packet_type(), "Client received reply");
            println!("{packet:?}");
            Ok(())
        }
        None => Err(ProtocolError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "broker closed the connection",
        ))),
    }
}
