use async_trait::async_trait;

/// Source of the device connectivity signal. The session manager only
/// consumes the boolean; platforms plug in whatever probe they have.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn is_connected(&self) -> bool;
}

/// Probe for environments without a connectivity signal.
#[derive(Clone, Copy, Debug, Default)]
pub struct AssumeOnline;

#[async_trait]
impl ConnectivityProbe for AssumeOnline {
    async fn is_connected(&self) -> bool {
        true
    }
}
