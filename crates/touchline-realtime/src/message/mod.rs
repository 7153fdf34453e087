//! Wire messages: the `{type, payload}` envelope, its decode and encode.

pub mod envelope;
pub mod inbound;
pub mod outbound;
pub mod serializer;
pub mod validator;

pub use envelope::RelayEnvelope;
pub use inbound::InboundMessage;
pub use outbound::OutboundMessage;
