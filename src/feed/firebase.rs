// src/feed/firebase.rs
use crate::feed::sse::{CollectionTree, SseParser};
use crate::feed::{CollectionFeed, Delivery, FeedError, FeedEvent, Subscription};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use std::io::{BufRead, BufReader};
use std::sync::mpsc::Sender;
use std::time::Duration;
use url::Url;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Realtime-database REST stream over one collection path.
///
/// Each subscription opens its own `text/event-stream` request on a worker
/// thread. The thread exits after the first error, or at the next line the
/// server sends once the subscription is released. A released subscription
/// therefore holds its connection until the next event or keep-alive (the
/// database sends one about every 30 seconds); nothing is delivered in
/// between.
#[derive(Debug, Clone)]
pub struct FirebaseFeed {
    endpoint: Url,
    client: Client,
}

impl FirebaseFeed {
    pub fn new(database_url: &Url, collection: &str, order_by: Option<&str>) -> Result<Self, FeedError> {
        // No overall timeout: the response body is an open-ended stream.
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| FeedError::Connect(e.to_string()))?;

        Self::with_client(database_url, collection, order_by, client)
    }

    pub fn with_client(
        database_url: &Url,
        collection: &str,
        order_by: Option<&str>,
        client: Client,
    ) -> Result<Self, FeedError> {
        let endpoint = collection_endpoint(database_url, collection, order_by)?;
        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl CollectionFeed for FirebaseFeed {
    fn subscribe(&self, sink: Sender<FeedEvent>) -> Subscription {
        let (subscription, delivery) = Subscription::new(self.endpoint.path().to_string());
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();

        log::info!("subscribing to {}", endpoint.path());

        let spawned = std::thread::Builder::new()
            .name("collection-feed".into())
            .spawn({
                let delivery = delivery.clone();
                let sink = sink.clone();
                move || {
                    if let Err(e) = stream_collection(&client, &endpoint, &delivery, &sink) {
                        if delivery.is_active() {
                            log::error!("collection feed failed: {e}");
                        }
                        delivery.send(&sink, FeedEvent::Error(e));
                    }
                }
            });

        if let Err(e) = spawned {
            delivery.send(&sink, FeedEvent::Error(FeedError::Connect(e.to_string())));
        }

        subscription
    }
}

/// `{database_url}/{collection}.json`, with the ordering hint as a quoted JSON string.
pub fn collection_endpoint(
    database_url: &Url,
    collection: &str,
    order_by: Option<&str>,
) -> Result<Url, FeedError> {
    let mut base = database_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    let collection = collection.trim_matches('/');
    if collection.is_empty() {
        return Err(FeedError::Connect("collection path is empty".into()));
    }

    let mut endpoint = base
        .join(&format!("{collection}.json"))
        .map_err(|e| FeedError::Connect(format!("bad collection path {collection}: {e}")))?;

    if let Some(field) = order_by.filter(|f| !f.is_empty()) {
        endpoint
            .query_pairs_mut()
            .append_pair("orderBy", &format!("\"{field}\""));
    }

    Ok(endpoint)
}

fn stream_collection(
    client: &Client,
    endpoint: &Url,
    delivery: &Delivery,
    sink: &Sender<FeedEvent>,
) -> Result<(), FeedError> {
    let resp = client
        .get(endpoint.clone())
        .header(ACCEPT, "text/event-stream")
        .send()
        .map_err(|e| FeedError::Connect(e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().unwrap_or_default();
        return Err(FeedError::Http(status.as_u16(), body));
    }

    let mut parser = SseParser::new();
    let mut tree = CollectionTree::new();

    for line in BufReader::new(resp).lines() {
        if !delivery.is_active() {
            return Ok(());
        }

        let line = line.map_err(|e| FeedError::Stream(e.to_string()))?;
        let Some(event) = parser.push_line(&line) else {
            continue;
        };

        if tree.apply(&event)? {
            let records = tree.records();
            log::debug!("snapshot with {} records", records.len());
            if !delivery.send(sink, FeedEvent::Snapshot(records)) {
                return Ok(());
            }
        }
    }

    Err(FeedError::Closed)
}
