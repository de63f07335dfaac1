use crate::domain::types::SubscriptionScope;

/// Static scoping inputs, resolved into a [`SubscriptionScope`] once per session.
#[derive(Debug, Clone, Default)]
pub struct ScopeConfig {
    pub namespace: Option<String>,
    pub label_selector: Option<String>,
}

impl ScopeConfig {
    /// Namespace wins over label selector; absent or blank values fall through,
    /// ending at [`SubscriptionScope::ClusterWide`].
    pub fn resolve(&self) -> SubscriptionScope {
        if let Some(namespace) = non_blank(&self.namespace) {
            SubscriptionScope::Namespace(namespace.to_string())
        } else if let Some(selector) = non_blank(&self.label_selector) {
            SubscriptionScope::LabelSelector(selector.to_string())
        } else {
            SubscriptionScope::ClusterWide
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
