// Main entry point - Dependency injection and the feed loop
use std::sync::Arc;

use futures::StreamExt;
use tracing_subscriber::EnvFilter;

use ambient_dashboard::application::gateway::MeasurementGateway;
use ambient_dashboard::application::live_watcher::{LiveWatcher, WatcherEvent};
use ambient_dashboard::application::measurement_store::MeasurementStore;
use ambient_dashboard::application::station_service::StationService;
use ambient_dashboard::application::view_engine;
use ambient_dashboard::domain::measurement::MetricField;
use ambient_dashboard::domain::query::QueryFilter;
use ambient_dashboard::infrastructure::config::{load_backend_config, load_display_config};
use ambient_dashboard::infrastructure::http_gateway::HttpMeasurementGateway;
use ambient_dashboard::infrastructure::mqtt_feed;
use ambient_dashboard::presentation::table::{
    FeedView, MetricStatus, TableAdapter, TableRow, summarize,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Load configuration
    let backend_config = load_backend_config()?;
    let display_config = load_display_config()?;

    // Create gateway (infrastructure layer)
    let gateway: Arc<dyn MeasurementGateway> =
        Arc::new(HttpMeasurementGateway::new(&backend_config.backend)?);

    // Create store and services (application layer)
    let store = Arc::new(MeasurementStore::new(gateway.clone()));
    let stations = StationService::new(gateway.clone());
    let adapter = TableAdapter::new(display_config.thresholds);

    // Pick the first station, as the web client does on load
    let available = stations.list_stations().await?;
    let Some(station) = available.first() else {
        println!("No stations available to monitor.");
        return Ok(());
    };
    tracing::info!(station = %station.display_name(), "monitoring station");

    let mut filter = QueryFilter::for_station(station.name.clone());
    filter.page_size = display_config.page_size;
    if let Some((from, to)) = stations.default_date_range(&station.name).await? {
        filter.date_from = Some(from);
        filter.date_to = Some(to);
    }

    print_feed(&FeedView::Loading);
    let feed = load_and_project(&store, &filter, &adapter).await;
    print_feed(&feed);
    print_summary(&store);

    // Watch for new data: polling primary, MQTT push supplementary
    let push = backend_config
        .mqtt
        .as_ref()
        .map(|settings| mqtt_feed::subscribe(settings, &station.name));
    let (_mqtt_feed, push_rx) = match push {
        Some((feed, rx)) => (Some(feed), Some(rx)),
        None => (None, None),
    };

    let watcher = LiveWatcher::new(
        gateway.clone(),
        store.clone(),
        display_config.watcher_config(),
    );
    let (watcher_handle, mut events) = watcher.spawn(station.name.clone(), push_rx);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.next() => {
                match event {
                    Some(WatcherEvent::NewMeasurement(record)) => {
                        println!(
                            "New measurement available ({})",
                            record.timestamp.format("%d-%m-%Y %H:%M")
                        );
                        // "View now": reload the current page and resync
                        let feed = load_and_project(&store, &filter, &adapter).await;
                        print_feed(&feed);
                        watcher_handle.sync(store.latest_id()).await;
                    }
                    None => break,
                }
            }
        }
    }

    tracing::info!("shutting down");
    Ok(())
}

async fn load_and_project(
    store: &MeasurementStore,
    filter: &QueryFilter,
    adapter: &TableAdapter,
) -> FeedView {
    match store.load_page(filter).await {
        Ok(page) => {
            let visible = view_engine::view(&page.records, filter);
            FeedView::ready(adapter.rows(&visible))
        }
        // The previously loaded rows stay on screen alongside the error.
        Err(e) => FeedView::Error {
            message: e.to_string(),
            rows: adapter.rows(&view_engine::view(&store.current(), filter)),
        },
    }
}

fn print_feed(feed: &FeedView) {
    match feed {
        FeedView::Loading => println!("Loading measurements..."),
        FeedView::Empty => {
            println!("No measurements found. Try other filters or another station.");
        }
        FeedView::Ready { rows } => print_rows(rows),
        FeedView::Error { message, rows } => {
            println!("Could not load measurements: {message}");
            if !rows.is_empty() {
                print_rows(rows);
            }
        }
    }
}

fn print_rows(rows: &[TableRow]) {
    println!(
        "{:<18} {:>14} {:>14} {:>16} {:>16}",
        "Date", "Temp", "Humidity", "PM2.5", "PM10"
    );
    for row in rows {
        let cells: Vec<String> = row
            .cells
            .iter()
            .map(|cell| match cell.status {
                MetricStatus::Warning => format!("{} (!)", cell.text),
                _ => cell.text.clone(),
            })
            .collect();
        println!(
            "{:<18} {:>14} {:>14} {:>16} {:>16}",
            row.timestamp, cells[0], cells[1], cells[2], cells[3]
        );
    }
}

fn print_summary(store: &MeasurementStore) {
    let records = store.current();
    for field in MetricField::ALL {
        if let Some(summary) = summarize(&records, field) {
            println!(
                "{}: avg {:.2} / min {:.2} / max {:.2} {}",
                field.label(),
                summary.mean,
                summary.min,
                summary.max,
                field.unit()
            );
        }
    }
}
