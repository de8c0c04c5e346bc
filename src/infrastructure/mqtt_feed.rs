// MQTT push feed - supplementary new-measurement channel for the watcher
use std::time::Duration;

use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::measurement::Measurement;
use crate::infrastructure::config::MqttSettings;
use crate::infrastructure::dto::MeasurementDto;

/// Disposal handle for a broker subscription; dropping it aborts the event
/// loop task.
pub struct MqttFeed {
    task: JoinHandle<()>,
}

impl Drop for MqttFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Subscribe to the broker's new-measurement topic and forward decoded
/// records, tagged with the active station. The receiver plugs into the
/// watcher as its push channel.
pub fn subscribe(settings: &MqttSettings, station: &str) -> (MqttFeed, mpsc::Receiver<Measurement>) {
    let mut options = MqttOptions::new("ambient-dashboard", &settings.host, settings.port);
    options.set_keep_alive(Duration::from_secs(30));

    let (client, mut eventloop) = AsyncClient::new(options, 100);
    let topic = settings.topic.clone();
    let station = station.to_string();
    let (tx, rx) = mpsc::channel(16);

    let task = tokio::spawn(async move {
        if let Err(e) = client.subscribe(topic.as_str(), QoS::AtLeastOnce).await {
            tracing::warn!(%topic, "mqtt subscribe failed: {e}");
            return;
        }

        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    match serde_json::from_slice::<MeasurementDto>(&publish.payload) {
                        Ok(dto) => match dto.into_domain(&station) {
                            Ok(record) => {
                                // Watcher gone: nothing left to feed.
                                if tx.send(record).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => tracing::warn!("mqtt payload rejected: {e}"),
                        },
                        Err(e) => tracing::warn!("mqtt payload is not a measurement: {e}"),
                    }
                }
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    tracing::info!("connected to mqtt broker");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("mqtt connection error: {e}, retrying");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    });

    (MqttFeed { task }, rx)
}
