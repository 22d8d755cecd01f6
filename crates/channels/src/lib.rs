//! Notification channel contracts.
//!
//! A channel delivers a [`Notification`] to a [`Notifiable`] entity and
//! reports failed deliveries through an [`EventDispatcher`].

pub mod events;

pub use events::{EventDispatcher, NotificationFailed, TracingDispatcher};

/// A notification that can be routed to one or more channels.
pub trait Notification: Send + Sync {
    /// Stable name of the notification type (e.g. "invoice_paid").
    fn notification_type(&self) -> &str;
}

/// An entity that receives notifications (a user, a team, an on-call rota).
pub trait Notifiable: Send + Sync {
    /// Identifier used in diagnostics and failure events.
    fn notifiable_id(&self) -> String;

    /// Address of this entity on `channel`, if it has one.
    fn route_notification_for(
        &self,
        channel: &str,
        notification: &dyn Notification,
    ) -> Option<String>;
}
