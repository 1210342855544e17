//! # HTTP 中间件

pub mod gate;
pub mod request_id;

pub use gate::{DASHBOARD_PATH, LOGIN_PATH, PathClass, request_gate};
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
