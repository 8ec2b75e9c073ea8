//! Backend health check

use helix_core::{HelixError, HelixResult, NetworkError};

use crate::api::HelixApi;

/// Address used for health probes (the all-zero public key)
pub const PROBE_WALLET: &str = "11111111111111111111111111111111";

/// Verify the API is reachable by requesting a sign-in nonce.
///
/// A client-error status (4xx) still proves the API is up and counts as
/// healthy; transport failures and server errors do not.
pub async fn check_health(api: &dyn HelixApi) -> HelixResult<()> {
    match api.request_nonce(PROBE_WALLET).await {
        Ok(_) => Ok(()),
        Err(HelixError::Network(NetworkError::HttpStatus { code, .. })) if code < 500 => Ok(()),
        Err(e) => {
            tracing::debug!(backend = api.name(), error = %e, "health check failed");
            Err(e)
        }
    }
}

/// Returns true if the API is reachable, false otherwise
pub async fn is_healthy(api: &dyn HelixApi) -> bool {
    check_health(api).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryApi;

    #[test]
    fn test_memory_backend_is_healthy() {
        let api = MemoryApi::new();
        assert!(tokio_test::block_on(is_healthy(&api)));
    }
}
