/// User agent sent by the default transport.
pub(crate) fn get_user_agent() -> String {
    format!("authreq/{}", env!("CARGO_PKG_VERSION"))
}
