pub mod dispatcher;
pub mod sink;
pub mod types;

pub use dispatcher::{Dispatcher, SubmissionHandle};
pub use sink::{ChannelSink, CompletionSink, LoggingSink};
pub use types::{CompletionResult, PendingRequest, RequestState};
