//! The transport seam: the only place a request leaves the process.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Transport`] | Send a prepared request, release resources on dispose |
//! | [`NativeTransport`] | Default `reqwest` backed network transport |
//! | [`MockTransport`] | In-memory transport with canned responses for tests |

mod handle;
mod mock;
mod native;

pub(crate) use handle::TransportHandle;
pub use mock::{MockRoute, MockTransport};
pub use native::NativeTransport;

use crate::error::Result;
use crate::types::{Request, Response};
use async_trait::async_trait;

/// Send a request, get a response.
///
/// Requests reach the transport with an absolute [`Request::url`] and an encoded
/// body. Cancellation is cooperative: dropping the returned future abandons the send.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Send a prepared request and return the raw response.
    async fn send(&self, request: Request) -> Result<Response>;

    /// Release held resources.
    ///
    /// Called once all clients built on this transport are disposed or dropped and
    /// no request is in flight. Other holders of the `Arc` (builders, callers) do not
    /// delay it. A client built later from the same configuration attaches again,
    /// so a reusable transport may see this more than once.
    fn dispose(&self) -> Result<()> {
        Ok(())
    }
}
