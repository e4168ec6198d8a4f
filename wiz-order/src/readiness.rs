use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;
use wiz_core::PaymentGateway;

/// Whether the gateway's checkout script has become available. The poller
/// retries at a fixed interval until it succeeds once; there is no timeout.
#[derive(Clone)]
pub struct GatewayReadiness {
    rx: watch::Receiver<bool>,
}

impl GatewayReadiness {
    pub fn spawn(gateway: Arc<dyn PaymentGateway>, poll: Duration) -> Self {
        let (tx, rx) = watch::channel(false);
        tokio::spawn(async move {
            let mut attempts: u64 = 0;
            loop {
                attempts += 1;
                if gateway.is_ready().await {
                    info!("Payment gateway ready after {} checks", attempts);
                    let _ = tx.send(true);
                    break;
                }
                tokio::time::sleep(poll).await;
            }
        });
        Self { rx }
    }

    /// A readiness that never changes.
    pub fn fixed(ready: bool) -> Self {
        let (_tx, rx) = watch::channel(ready);
        Self { rx }
    }

    pub fn is_ready(&self) -> bool {
        *self.rx.borrow()
    }

    /// Waits until the gateway is ready. Returns false if the poller went
    /// away first.
    pub async fn wait_ready(&mut self) -> bool {
        self.rx.wait_for(|ready| *ready).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::MockPaymentGateway;

    #[tokio::test]
    async fn test_poller_flips_once_gateway_loads() {
        let gateway = Arc::new(MockPaymentGateway::new(false));
        let mut readiness = GatewayReadiness::spawn(gateway.clone(), Duration::from_millis(5));
        assert!(!readiness.is_ready());

        gateway.set_ready(true);
        let ready = tokio::time::timeout(Duration::from_secs(2), readiness.wait_ready())
            .await
            .unwrap();
        assert!(ready);
        assert!(readiness.is_ready());
    }

    #[test]
    fn test_fixed_readiness() {
        assert!(GatewayReadiness::fixed(true).is_ready());
        assert!(!GatewayReadiness::fixed(false).is_ready());
    }
}
