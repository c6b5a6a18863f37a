//! Event bus port: publish/subscribe for scheduler events.

use std::future::Future;

use autotheme_domain::error::AutoThemeError;
use autotheme_domain::state::SchedulerEvent;

/// Publishes scheduler events to interested subscribers.
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(
        &self,
        event: SchedulerEvent,
    ) -> impl Future<Output = Result<(), AutoThemeError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(
        &self,
        event: SchedulerEvent,
    ) -> impl Future<Output = Result<(), AutoThemeError>> + Send {
        (**self).publish(event)
    }
}
