use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use log::info;
use warp::filters::BoxedFilter;
use warp::reply::Response;
use warp::{Filter, Reply};

use super::routes::*;
use crate::attendance::SignatureParty;
use crate::configuration::types::{PaginationConfig, ServerConfig};
use crate::error_handling::types::WebError;
use crate::storage::storage_trait::Storage;

/// Web server for the ITA HTTP API
pub struct WebServer {
    storage: Arc<dyn Storage>,
    pagination: PaginationConfig,
}

impl WebServer {
    /// Create a new WebServer instance
    pub fn new(storage: Arc<dyn Storage>, pagination: PaginationConfig) -> Self {
        Self {
            storage,
            pagination,
        }
    }

    /// Every endpoint of the API, without logging or rejection handling.
    pub fn api(&self) -> BoxedFilter<(Response,)> {
        let storage = &self.storage;
        let limits = &self.pagination;

        let agreements = list_agreements_route(storage.clone(), limits.clone())
            .or(agreement_stats_route(storage.clone()))
            .unify()
            .or(get_agreement_route(storage.clone()))
            .unify()
            .or(create_agreement_route(storage.clone()))
            .unify()
            .or(update_agreement_route(storage.clone()))
            .unify()
            .or(delete_agreement_route(storage.clone()))
            .unify();

        let entries = list_entries_route(storage.clone(), limits.clone())
            .or(entry_stats_route(storage.clone()))
            .unify()
            .or(progress_route(storage.clone()))
            .unify()
            .or(get_entry_route(storage.clone()))
            .unify()
            .or(create_entry_route(storage.clone()))
            .unify()
            .or(update_entry_route(storage.clone()))
            .unify()
            .or(delete_entry_route(storage.clone()))
            .unify()
            .or(sign_entry_route(storage.clone(), SignatureParty::Student))
            .unify()
            .or(sign_entry_route(storage.clone(), SignatureParty::Instructor))
            .unify();

        health_route(storage.clone())
            .or(agreements)
            .unify()
            .or(entries)
            .unify()
            .boxed()
    }

    /// The full filter served over HTTP: the API plus JSON rejections and
    /// request logging.
    pub fn routes(
        &self,
    ) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone + Send + Sync + 'static {
        self.api()
            .recover(handle_rejection)
            .unify()
            .with(warp::log("ita_tracker::web"))
    }

    /// Start the web server on the configured address
    pub async fn start(&self, server: &ServerConfig) -> Result<(), WebError> {
        let addr: SocketAddr = format!("{}:{}", server.bind_address, server.port)
            .parse()
            .map_err(|e| {
                WebError::BadAddress(format!(
                    "{}:{} ({})",
                    server.bind_address, server.port, e
                ))
            })?;

        info!("Web server listening on http://{}", addr);
        warp::serve(self.routes()).run(addr).await;
        Ok(())
    }
}
