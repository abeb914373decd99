//! SMS transports
//!
//! Both report asynchronously through the completion callback and only
//! fail synchronously on malformed requests or a missing runtime. Spawned
//! deliveries are tracked so `flush` can wait for them before shutdown.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sos_core::{SmsCallback, SmsError, SmsReceipt, SmsRequest, SmsTransport};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::Notify;

/// Request timeout of the webhook client.
pub const GATEWAY_TIMEOUT: Duration = Duration::from_secs(30);

/// How long a shell waits on pending sends before exiting: the gateway
/// timeout plus headroom for connection setup.
pub const SEND_GRACE: Duration = Duration::from_secs(35);

fn validate(request: &SmsRequest) -> Result<(), SmsError> {
    if request.to.trim().is_empty() {
        return Err(SmsError::InvalidRequest("recipient is empty".into()));
    }
    if request.body.is_empty() {
        return Err(SmsError::InvalidRequest("message body is empty".into()));
    }
    Ok(())
}

fn runtime() -> Result<Handle, SmsError> {
    Handle::try_current().map_err(|e| SmsError::Unavailable(format!("no async runtime: {}", e)))
}

/// Counts spawned deliveries and wakes flushers when the count drops to zero.
#[derive(Default)]
struct InFlight {
    count: Arc<AtomicUsize>,
    idle: Arc<Notify>,
}

impl InFlight {
    fn spawn<F>(&self, handle: &Handle, delivery: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.count.fetch_add(1, Ordering::SeqCst);
        let count = self.count.clone();
        let idle = self.idle.clone();
        handle.spawn(async move {
            delivery.await;
            if count.fetch_sub(1, Ordering::SeqCst) == 1 {
                idle.notify_waiters();
            }
        });
    }

    fn pending(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    async fn wait_idle(&self, grace: Duration) -> bool {
        let settled = tokio::time::timeout(grace, async {
            loop {
                let notified = self.idle.notified();
                if self.pending() == 0 {
                    return;
                }
                notified.await;
            }
        })
        .await
        .is_ok();

        if !settled {
            tracing::warn!(pending = self.pending(), ?grace, "SMS sends still in flight");
        }
        settled
    }
}

/// Logs the message instead of sending it.
pub struct DryRunSms {
    latency: Duration,
    in_flight: InFlight,
}

impl DryRunSms {
    pub fn new() -> Self {
        Self::with_latency(Duration::from_millis(300))
    }

    /// Delay before the synthetic receipt is reported.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            in_flight: InFlight::default(),
        }
    }
}

impl Default for DryRunSms {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SmsTransport for DryRunSms {
    fn name(&self) -> &str {
        "dry-run"
    }

    fn send(&self, request: SmsRequest, on_complete: SmsCallback) -> Result<(), SmsError> {
        validate(&request)?;
        let handle = runtime()?;
        let latency = self.latency;

        tracing::info!(
            channel = request.channel,
            to = %request.to,
            "[dry run] SMS: {}",
            request.body
        );
        self.in_flight.spawn(&handle, async move {
            tokio::time::sleep(latency).await;
            let id = uuid::Uuid::new_v4().to_string();
            on_complete(SmsReceipt::new(Some(id), "SMS queued (dry run)"));
        });
        Ok(())
    }

    fn pending(&self) -> usize {
        self.in_flight.pending()
    }

    async fn flush(&self, grace: Duration) -> bool {
        self.in_flight.wait_idle(grace).await
    }
}

#[derive(Debug, Serialize)]
struct GatewayPayload<'a> {
    channel: u8,
    to: &'a str,
    body: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GatewayReply {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// POSTs `{channel, to, body}` as JSON to an HTTP SMS gateway.
pub struct WebhookSms {
    url: url::Url,
    client: reqwest::Client,
    in_flight: InFlight,
}

impl WebhookSms {
    pub fn new(url: &str) -> Result<Self, SmsError> {
        let url = url::Url::parse(url)
            .map_err(|e| SmsError::Unavailable(format!("invalid webhook URL: {}", e)))?;
        let client = reqwest::Client::builder()
            .timeout(GATEWAY_TIMEOUT)
            .build()
            .map_err(|e| SmsError::Unavailable(e.to_string()))?;
        Ok(Self {
            url,
            client,
            in_flight: InFlight::default(),
        })
    }

    pub fn url(&self) -> &url::Url {
        &self.url
    }

    async fn deliver(client: reqwest::Client, url: url::Url, request: SmsRequest) -> SmsReceipt {
        let payload = GatewayPayload {
            channel: request.channel,
            to: &request.to,
            body: &request.body,
        };

        let response = match client.post(url).json(&payload).send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!("SMS gateway unreachable: {}", err);
                return SmsReceipt::new(None, format!("SMS gateway unreachable: {}", err));
            }
        };

        let status = response.status();
        if !status.is_success() {
            return SmsReceipt::new(None, format!("Gateway rejected SMS (HTTP {})", status.as_u16()));
        }

        let reply: GatewayReply = response.json().await.unwrap_or_default();
        let text = reply
            .status
            .unwrap_or_else(|| format!("SMS sent (HTTP {})", status.as_u16()));
        SmsReceipt::new(reply.id, text)
    }
}

#[async_trait]
impl SmsTransport for WebhookSms {
    fn name(&self) -> &str {
        "webhook"
    }

    fn send(&self, request: SmsRequest, on_complete: SmsCallback) -> Result<(), SmsError> {
        validate(&request)?;
        let handle = runtime()?;
        let client = self.client.clone();
        let url = self.url.clone();

        tracing::debug!(gateway = %url, to = %request.to, "Posting SMS to gateway");
        self.in_flight.spawn(&handle, async move {
            let receipt = Self::deliver(client, url, request).await;
            on_complete(receipt);
        });
        Ok(())
    }

    fn pending(&self) -> usize {
        self.in_flight.pending()
    }

    async fn flush(&self, grace: Duration) -> bool {
        self.in_flight.wait_idle(grace).await
    }
}
