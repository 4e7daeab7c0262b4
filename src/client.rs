use std::sync::Arc;
use tracing::info;

use crate::adapters::ReqwestSession;
use crate::config::ClientConfig;
use crate::domain::{endpoints, ApiMethod, ApiResponse, ApiService, Params, Result};
use crate::ports::HttpSessionPort;

const CURRENCY: i32 = 1;
const ORDER_BOOK_LIMIT: i32 = 5;
const COMMODITY_BUY_TYPE: i32 = 1;

/// Asynchronous client for the steam-trader.com API.
///
/// Every operation returns `None` when the call could not complete and the
/// decoded body otherwise, including bodies whose `success` field is false.
pub struct SteamTraderClient {
    service: ApiService,
    owns_session: bool,
}

impl SteamTraderClient {
    /// Client with its own connection pool, released by [`close`](Self::close).
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::from_config(ClientConfig::new(api_key))
    }

    /// Client over a caller-owned session. `close` never releases it.
    pub fn with_session(api_key: impl Into<String>, session: Arc<dyn HttpSessionPort>) -> Result<Self> {
        Self::from_config_with_session(ClientConfig::new(api_key), session)
    }

    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let base_url = config.validate()?;
        let session: Arc<dyn HttpSessionPort> = Arc::new(ReqwestSession::new()?);

        Ok(Self {
            service: ApiService::new(config.api_key.clone(), base_url, config.timeout(), session),
            owns_session: true,
        })
    }

    pub fn from_config_with_session(config: ClientConfig, session: Arc<dyn HttpSessionPort>) -> Result<Self> {
        let base_url = config.validate()?;

        Ok(Self {
            service: ApiService::new(config.api_key.clone(), base_url, config.timeout(), session),
            owns_session: false,
        })
    }

    pub fn owns_session(&self) -> bool {
        self.owns_session
    }

    pub fn session(&self) -> &Arc<dyn HttpSessionPort> {
        self.service.session()
    }

    /// Generic request against any endpoint; the named operations below delegate here.
    pub async fn request(
        &self,
        method: ApiMethod,
        endpoint: &str,
        query: Option<&Params>,
        body: Option<&Params>,
    ) -> Option<ApiResponse> {
        self.service.request(method, endpoint, query, body).await
    }

    async fn get(&self, endpoint: &str, query: Option<Params>) -> Option<ApiResponse> {
        self.request(ApiMethod::Get, endpoint, query.as_ref(), None).await
    }

    async fn post(&self, endpoint: &str, body: Params) -> Option<ApiResponse> {
        self.request(ApiMethod::Post, endpoint, None, Some(&body)).await
    }

    /// Minimum and maximum prices of an item.
    pub async fn get_min_prices(&self, gid: u64) -> Option<ApiResponse> {
        let query = Params::new().with("gid", gid).with("currency", CURRENCY);
        self.get(endpoints::MIN_PRICES, Some(query)).await
    }

    pub async fn get_order_book(&self, gid: u64) -> Option<ApiResponse> {
        let query = Params::new().with("gid", gid).with("limit", ORDER_BOOK_LIMIT);
        self.get(endpoints::ORDER_BOOK, Some(query)).await
    }

    /// Inventory items of one game filtered by a single status.
    pub async fn get_inventory(&self, game_id: u64, status: i64) -> Option<ApiResponse> {
        let query = Params::new().with("gameid", game_id).with("status[0]", status);
        self.get(endpoints::INVENTORY, Some(query)).await
    }

    pub async fn create_buy_order(&self, gid: u64, price: f64) -> Option<ApiResponse> {
        self.create_buy_order_with_count(gid, price, 1).await
    }

    pub async fn create_buy_order_with_count(&self, gid: u64, price: f64, count: u32) -> Option<ApiResponse> {
        let body = Params::new().with("gid", gid).with("price", price).with("count", count);
        self.post(endpoints::CREATE_BUY_ORDER, body).await
    }

    /// Instantly buy the cheapest offer of a commodity item.
    pub async fn buy_item(&self, gid: u64, price: f64) -> Option<ApiResponse> {
        let body = Params::new()
            .with("id", gid)
            .with("type", COMMODITY_BUY_TYPE)
            .with("price", price)
            .with("currency", CURRENCY);
        self.post(endpoints::BUY, body).await
    }

    pub async fn list_item_for_sale(&self, asset_id: u64, item_id: u64, price: f64) -> Option<ApiResponse> {
        let body = Params::new()
            .with("assetid", asset_id)
            .with("itemid", item_id)
            .with("price", price);
        self.post(endpoints::SALE, body).await
    }

    pub async fn edit_price(&self, order_id: u64, new_price: f64) -> Option<ApiResponse> {
        let body = Params::new().with("id", order_id).with("price", new_price);
        self.post(endpoints::EDIT_PRICE, body).await
    }

    pub async fn get_ws_token(&self) -> Option<ApiResponse> {
        self.get(endpoints::WS_TOKEN, None).await
    }

    pub async fn get_balance(&self) -> Option<ApiResponse> {
        self.get(endpoints::BALANCE, None).await
    }

    /// Information about a trade that is ready to be accepted.
    pub async fn check_and_accept_trades(&self) -> Option<ApiResponse> {
        self.get(endpoints::EXCHANGE, None).await
    }

    pub async fn get_discounts(&self) -> Option<ApiResponse> {
        self.get(endpoints::DISCOUNTS, None).await
    }

    pub async fn set_trade_link(&self, trade_link: &str) -> Option<ApiResponse> {
        let body = Params::new().with("trade_link", trade_link);
        self.post(endpoints::TRADE_LINK, body).await
    }

    /// Release the connection pool if this client created it.
    ///
    /// Returns true only for the call that actually released it.
    pub async fn close(&self) -> bool {
        if !self.owns_session {
            return false;
        }

        let released = self.service.session().close().await;
        if released {
            info!("Session closed");
        }
        released
    }
}
