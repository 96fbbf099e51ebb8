//! Service registry with async handlers
//!
//! Services are the command surface of the bridge: `number.set_value` and
//! `button.press` route user input to the printer.

use dashmap::DashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument};

/// A call to a registered service
#[derive(Debug, Clone)]
pub struct ServiceCall {
    pub domain: String,
    pub service: String,
    pub data: serde_json::Value,
}

impl ServiceCall {
    pub fn new(
        domain: impl Into<String>,
        service: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            domain: domain.into(),
            service: service.into(),
            data,
        }
    }

    /// The entity the call addresses, if present in the data
    pub fn entity_id(&self) -> Option<&str> {
        self.data.get("entity_id").and_then(serde_json::Value::as_str)
    }
}

/// Result type for service calls
pub type ServiceResult = Result<Option<serde_json::Value>, ServiceError>;

/// Future type for async service handlers
pub type ServiceFuture = Pin<Box<dyn Future<Output = ServiceResult> + Send>>;

/// Service handler function type
pub type ServiceHandler = Arc<dyn Fn(ServiceCall) -> ServiceFuture + Send + Sync>;

/// Errors that can occur when working with services
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("service not found: {domain}.{service}")]
    NotFound { domain: String, service: String },

    #[error("service call failed: {0}")]
    CallFailed(String),

    #[error("invalid service data: {0}")]
    InvalidData(String),
}

/// The service registry manages all registered services
pub struct ServiceRegistry {
    /// Services indexed by "domain.service" key
    services: DashMap<String, ServiceHandler>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self {
            services: DashMap::new(),
        }
    }

    /// Register a new service handler
    #[instrument(skip(self, domain, service, handler))]
    pub fn register<F, Fut>(&self, domain: impl Into<String>, service: impl Into<String>, handler: F)
    where
        F: Fn(ServiceCall) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ServiceResult> + Send + 'static,
    {
        let domain = domain.into();
        let service = service.into();
        let key = format!("{domain}.{service}");

        debug!(domain = %domain, service = %service, "Registering service");

        let handler: ServiceHandler =
            Arc::new(move |call| Box::pin(handler(call)) as ServiceFuture);
        self.services.insert(key, handler);
    }

    /// Check whether a service exists
    pub fn has_service(&self, domain: &str, service: &str) -> bool {
        self.services.contains_key(&format!("{domain}.{service}"))
    }

    /// Call a service, routing to its handler
    pub async fn call(&self, call: ServiceCall) -> ServiceResult {
        let key = format!("{}.{}", call.domain, call.service);
        let handler = self
            .services
            .get(&key)
            .map(|h| h.clone())
            .ok_or_else(|| ServiceError::NotFound {
                domain: call.domain.clone(),
                service: call.service.clone(),
            })?;

        debug!(service = %key, "Calling service");
        handler(call).await
    }

    /// All registered "domain.service" keys
    pub fn service_keys(&self) -> Vec<String> {
        self.services.iter().map(|r| r.key().clone()).collect()
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_register_and_call() {
        let registry = ServiceRegistry::new();
        registry.register("button", "press", |call: ServiceCall| async move {
            Ok(Some(json!({"pressed": call.entity_id()})))
        });

        assert!(registry.has_service("button", "press"));

        let result = registry
            .call(ServiceCall::new(
                "button",
                "press",
                json!({"entity_id": "button.move_home"}),
            ))
            .await
            .unwrap();
        assert_eq!(result, Some(json!({"pressed": "button.move_home"})));
    }

    #[tokio::test]
    async fn test_unknown_service() {
        let registry = ServiceRegistry::new();
        let err = registry
            .call(ServiceCall::new("number", "set_value", json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_handler_errors_propagate() {
        let registry = ServiceRegistry::new();
        registry.register("number", "set_value", |_call| async {
            Err(ServiceError::InvalidData("value is required".to_string()))
        });

        let err = registry
            .call(ServiceCall::new("number", "set_value", json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidData(_)));
    }
}
