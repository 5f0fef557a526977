/// Value sent in the `Via` header of every outgoing request
pub const VIA_HEADER_VALUE: &str = "AprovaFacil-Connector";

/// Content type of every request body posted to the gateway
pub const FORM_URL_ENCODED: &str = "application/x-www-form-urlencoded";

/// UTF-8 byte order mark some gateway deployments prepend to their responses
pub const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
