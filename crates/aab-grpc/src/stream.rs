// ABOUTME: Boxed server-streaming response type shared by real and fake backends.
// ABOUTME: Erases tonic::Streaming so consumers can be driven by in-memory streams.

use std::pin::Pin;

use futures::{Stream, StreamExt};
use tonic::Streaming;

/// An ordered server stream. Ends on completion; yields `Err` on failure.
pub type ResponseStream<T> = Pin<Box<dyn Stream<Item = Result<T, tonic::Status>> + Send>>;

/// Box a tonic stream.
pub fn into_response_stream<T>(streaming: Streaming<T>) -> ResponseStream<T>
where
    T: Send + 'static,
{
    streaming.boxed()
}

/// Box any stream of results, e.g. `futures::stream::iter` in tests.
pub fn from_stream<T, S>(stream: S) -> ResponseStream<T>
where
    S: Stream<Item = Result<T, tonic::Status>> + Send + 'static,
{
    Box::pin(stream)
}
