// Messaging domain - outbound e-mail and SMS to people outside the platform

pub mod activities;

pub use activities::{ChannelOutcome, DeliveryReport, SendNotificationInput};
