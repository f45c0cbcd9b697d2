//! Client-side transports for the contract verification page: the
//! real-time result channel and the batched file submission.

pub mod channel;
pub mod phoenix;
pub mod upload;

pub use channel::{ChannelClient, ChannelError, ChannelSubscription, ChannelTransport, TransportEvent};
pub use phoenix::{websocket_url, PhoenixSocket};
pub use upload::{
    load_file, BatchSubmission, HttpUploadSubmitter, SubmissionOutcome, SubmitError,
    UploadSubmitter,
};

#[cfg(test)]
#[path = "tests/channel_tests.rs"]
mod channel_tests;

#[cfg(test)]
#[path = "tests/phoenix_tests.rs"]
mod phoenix_tests;

#[cfg(test)]
#[path = "tests/upload_tests.rs"]
mod upload_tests;
