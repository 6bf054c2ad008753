use std::sync::Arc;

use tessera_core::device::DeviceClassifier;

use crate::config::ServerConfig;
use crate::email::Mailer;
use crate::payment::PaymentClient;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: tessera_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// SMTP mailer; `None` when email delivery is not configured.
    pub mailer: Option<Arc<Mailer>>,
    /// Payment-processor client; `None` when payments are not configured.
    pub payment: Option<Arc<PaymentClient>>,
    /// User-agent classifier used when creating sessions.
    pub classifier: Arc<dyn DeviceClassifier>,
}
