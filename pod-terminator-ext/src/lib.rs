pub use k8s_openapi as openapi;
pub use k8s_openapi::api::core::v1 as corev1;
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;

pub use time::TimeExt;

mod time;

pub trait ObjectMetaExt {
    fn new(name: impl ToString) -> Self;
    fn with_namespace(name: impl ToString, namespace: impl ToString) -> Self;
    fn deleted(self, ts: impl Into<Option<metav1::Time>>) -> Self;

    /// The `deletionTimestamp` as served by the API server, if the object
    /// has been asked to terminate.
    fn deletion_requested_at(&self) -> Option<String>;
}

impl ObjectMetaExt for metav1::ObjectMeta {
    fn new(name: impl ToString) -> Self {
        let name = Some(name.to_string());
        Self { name, ..default() }
    }

    fn with_namespace(name: impl ToString, namespace: impl ToString) -> Self {
        Self {
            namespace: Some(namespace.to_string()),
            ..Self::new(name)
        }
    }

    fn deleted(self, ts: impl Into<Option<metav1::Time>>) -> Self {
        Self {
            deletion_timestamp: ts.into(),
            ..self
        }
    }

    fn deletion_requested_at(&self) -> Option<String> {
        self.deletion_timestamp
            .as_ref()
            .and_then(TimeExt::to_rfc3339)
            .filter(|text| !text.is_empty())
    }
}

pub fn default<T: Default>() -> T {
    T::default()
}
