use async_trait::async_trait;

use crate::{compute::UrlMap, error::ProviderError};

/// CRUD transport for url maps.
///
/// `get_url_map` and `delete_url_map` must return [`ProviderError::NotFound`]
/// for an unknown name. Server-populated fields of the url map passed to
/// `create_url_map` and `update_url_map` are ignored.
#[async_trait]
pub trait UrlMapProvider: Send + Sync {
    async fn get_url_map(&self, name: &str) -> Result<UrlMap, ProviderError>;

    async fn create_url_map(&self, url_map: &UrlMap) -> Result<(), ProviderError>;

    async fn update_url_map(&self, url_map: &UrlMap) -> Result<(), ProviderError>;

    async fn list_url_maps(&self) -> Result<Vec<UrlMap>, ProviderError>;

    async fn delete_url_map(&self, name: &str) -> Result<(), ProviderError>;
}

#[cfg(test)]
pub mod mock {
    use super::{ProviderError, UrlMap, UrlMapProvider};
    use mockall::mock;

    mock! {
        pub TestUrlMapProvider {}

        #[async_trait::async_trait]
        impl UrlMapProvider for TestUrlMapProvider {
            async fn get_url_map(&self, name: &str) -> Result<UrlMap, ProviderError>;
            async fn create_url_map(&self, url_map: &UrlMap) -> Result<(), ProviderError>;
            async fn update_url_map(&self, url_map: &UrlMap) -> Result<(), ProviderError>;
            async fn list_url_maps(&self) -> Result<Vec<UrlMap>, ProviderError>;
            async fn delete_url_map(&self, name: &str) -> Result<(), ProviderError>;
        }
    }

    /// `mock_expect!(provider, get_url_map, eq("name"), Ok(um.clone()))` sets up
    /// an expectation for a single-argument provider method.
    #[macro_export]
    macro_rules! mock_expect {
        ($provider:ident, $method:ident, $with:expr, $ret:expr) => {
            ::paste::paste! {
                $provider.[<expect_ $method>]().with($with).returning(move |_| $ret);
            }
        };
        ($provider:ident, $method:ident, $with:expr, $ret:expr, times = $times:expr) => {
            ::paste::paste! {
                $provider
                    .[<expect_ $method>]()
                    .with($with)
                    .times($times)
                    .returning(move |_| $ret);
            }
        };
    }
}
