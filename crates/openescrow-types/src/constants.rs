//! System-wide constants for the OpenEscrow marketplace engine.

/// Default label for the currency the payment rail moves.
pub const DEFAULT_CURRENCY: &str = "ETH";

/// Recovery scans walk every sell offer ever created. Past this many records
/// a scan is logged at `warn` so operators notice the growth.
pub const DEFAULT_RECOVERY_SCAN_WARN_THRESHOLD: usize = 100_000;

/// Domain separator for the event log hash chain.
pub const EVENT_DIGEST_DOMAIN: &[u8] = b"openescrow:event:v1:";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "OpenEscrow";
