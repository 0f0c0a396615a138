use std::sync::Arc;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::services::gateway_service::GatewayService;
use crate::services::transaction_store::TransactionStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub gateway: Arc<GatewayService>,
    pub transactions: Arc<dyn TransactionStore>,
}

impl AppState {
    pub fn new(config: AppConfig, transactions: Arc<dyn TransactionStore>) -> Result<Self> {
        let gateway = Arc::new(GatewayService::new(&config)?);
        Ok(AppState {
            config: Arc::new(config),
            gateway,
            transactions,
        })
    }
}
