//! unirelay-core
//!
//! Provider-agnostic runtime: channel configuration, per-request relay
//! context, the adaptor capability traits, the HTTP transport seam, and the
//! pricing rule engine.
#![deny(unsafe_code)]

pub mod adaptor;
pub mod channel;
pub mod encoding;
pub mod execution;
pub mod media;
pub mod observability;
pub mod pricing;
pub mod relay;

pub use unirelay_spec::{error, types};

pub use adaptor::{ChannelAdaptor, RelayOutput, SubmitOutcome, TaskAdaptor};
pub use channel::{ChannelConfig, ChannelSpecialBase, ChannelType};
pub use error::RelayError;
pub use relay::{RelayFormat, RelayInfo, RelayMode};
