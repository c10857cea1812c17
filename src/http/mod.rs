//! HTTP transport and error normalization.

mod normalize;
mod transport;

pub use normalize::normalize;
#[cfg(test)]
pub use transport::MockTransport;
pub use transport::{
    RawResponse, ReqwestTransport, Transport, TransportError, TransportRequest,
    TransportResponse, parse_body,
};
