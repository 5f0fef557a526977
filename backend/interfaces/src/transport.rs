use common_utils::{request::Request, CustomResult};
use domain_types::errors::ApiClientError;

/// Sends a built request to the gateway and hands back the raw response body,
/// undecoded.
///
/// Implementations block until the gateway answers or the call fails. Failures
/// are returned to the caller as they are; nothing is retried.
pub trait ConnectorTransport {
    fn send(&self, request: Request) -> CustomResult<Vec<u8>, ApiClientError>;
}

impl<T: ConnectorTransport + ?Sized> ConnectorTransport for &T {
    fn send(&self, request: Request) -> CustomResult<Vec<u8>, ApiClientError> {
        (**self).send(request)
    }
}

impl<T: ConnectorTransport + ?Sized> ConnectorTransport for Box<T> {
    fn send(&self, request: Request) -> CustomResult<Vec<u8>, ApiClientError> {
        (**self).send(request)
    }
}
