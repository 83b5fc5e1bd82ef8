use super::*;

pub trait TimeExt: Sized {
    fn from_rfc3339(text: &str) -> serde_json::Result<Self>;
    fn to_rfc3339(&self) -> Option<String>;
}

impl TimeExt for metav1::Time {
    /// Build a `metav1::Time` from its wire representation.
    ///
    /// # Examples
    ///
    /// ```
    /// use pod_terminator_ext::{metav1, TimeExt as _};
    /// let ts = metav1::Time::from_rfc3339("2024-03-01T12:30:45Z").unwrap();
    /// assert!(ts.to_rfc3339().is_some());
    /// ```
    fn from_rfc3339(text: &str) -> serde_json::Result<Self> {
        serde_json::from_value(serde_json::Value::String(text.to_string()))
    }

    /// Render the timestamp exactly as the API server would serve it.
    fn to_rfc3339(&self) -> Option<String> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::String(text)) => Some(text),
            _ => None,
        }
    }
}
