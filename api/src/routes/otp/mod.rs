//! Passcode issuance and verification endpoints

pub mod send;
pub mod verify;

use actix_web::HttpRequest;

/// Client address for request logs, honouring reverse proxy headers
pub(crate) fn client_ip(req: &HttpRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string()
}
