//! Value types shared by clients, middleware and transports.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Items`] | String-keyed context values copied between configurations |
//! | [`RequestTemplate`] | Defaults applied to every request of a client |
//! | [`Request`] | A single request, seeded from a template |
//! | [`Response`] | Transport response carrying the request's items |

mod items;
mod request;
mod response;

pub use items::{ItemValue, Items};
pub use request::{Request, RequestBody, RequestTemplate};
pub use response::{Response, TIME_TAKEN_KEY};
