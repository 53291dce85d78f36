pub mod retry;
pub mod transport;

pub use retry::RetryPolicy;
pub use transport::{ApiRequest, ApiResponse, ApiTransport, HttpTransport, Method};

#[cfg(test)]
pub use transport::MockApiTransport;
