//! HTTP client for the Raise3D printer's local API
//!
//! The printer speaks HTTP/JSON on a configurable port (default 10800).
//! Every response is wrapped in a `{status, data, error}` envelope; calls
//! are authenticated with a token obtained by signing the printer's access
//! password. The camera server is a separate basic-auth HTTP endpoint.

mod camera;
mod client;
mod error;
mod sign;

pub use camera::CameraClient;
pub use client::{AxisControl, PrinterClient};
pub use error::{ApiError, ApiResult};
pub use sign::{generate_sign, sign_now};
