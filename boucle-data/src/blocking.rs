//! Drive async HTTP calls from synchronous trait methods.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

use crate::ProviderBuildError;

/// A reqwest client paired with the runtime that drives it.
///
/// When called from outside any Tokio runtime, requests run on the owned
/// `current_thread` runtime. Inside a multi-threaded runtime the caller's
/// handle is used through [`tokio::task::block_in_place`] to avoid nested
/// runtime panics. Inside a `current_thread` runtime the owned runtime is
/// used, which may deadlock if the caller's runtime drives IO this request
/// depends on.
pub(crate) struct BlockingClient {
    client: Client,
    runtime: Runtime,
}

impl std::fmt::Debug for BlockingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingClient")
            .field("client", &self.client)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl BlockingClient {
    pub(crate) fn new(user_agent: &str, timeout: Duration) -> Result<Self, ProviderBuildError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self { client, runtime })
    }

    pub(crate) const fn client(&self) -> &Client {
        &self.client
    }

    pub(crate) fn block_on<F: Future>(&self, future: F) -> F::Output {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}
