/// Read-side methods shared by every resource client: foreground load,
/// background refresh and snapshot access on the backing store.
macro_rules! impl_client_methods {
    ($client_name:ident, $entity:ty, $error:ty, $plural:ident) => {
        paste::paste! {
            impl $client_name {
                /// Foreground load with the store's current query.
                #[tracing::instrument(skip(self))]
                pub async fn [<load_ $plural>](&self) -> Result<Vec<$entity>, $error> {
                    tracing::debug!("Sending request");
                    self.inner.load(None).await.map_err(<$error>::from)
                }

                /// Silent refresh. A failed fetch is not an error here.
                #[tracing::instrument(skip(self))]
                pub async fn [<refresh_ $plural>](
                    &self,
                ) -> Result<$crate::actor_framework::RefreshOutcome, $error> {
                    tracing::debug!("Sending request");
                    self.inner.refresh().await.map_err(<$error>::from)
                }

                pub async fn [<list_ $plural>](&self) -> Result<Vec<$entity>, $error> {
                    Ok(self.snapshot().await?.items)
                }

                pub async fn snapshot(
                    &self,
                ) -> Result<$crate::actor_framework::Snapshot<$entity>, $error> {
                    self.inner.snapshot().await.map_err(<$error>::from)
                }

                pub fn store(&self) -> &$crate::actor_framework::ResourceClient<$entity> {
                    &self.inner
                }
            }
        }
    };
}

macro_rules! impl_client_new {
    ($client_name:ident, $entity:ty) => {
        impl $client_name {
            pub fn new(
                inner: $crate::actor_framework::ResourceClient<$entity>,
                api: std::sync::Arc<dyn $crate::api::DrillApi>,
            ) -> Self {
                Self { inner, api }
            }
        }
    };
}

macro_rules! impl_basic_client {
    ($client_name:ident, $entity:ty, $error:ty, $plural:ident) => {
        impl_client_new!($client_name, $entity);
        impl_client_methods!($client_name, $entity, $error, $plural);
    };
}
