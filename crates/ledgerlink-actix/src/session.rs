//! Typed access to the three values the session carries.

use actix_session::Session;
use ledgerlink_oauth1::Token;

pub const REQUEST_TOKEN: &str = "oauth_request_token";
pub const ACCESS_TOKEN: &str = "access_token";
pub const RETURN_TO: &str = "return_to";

/// A cookie value that fails to decode is treated as absent; the worst that
/// happens is another trip through the authorize redirect.
pub fn access_token(session: &Session) -> Option<Token> {
    session.get::<Token>(ACCESS_TOKEN).ok().flatten()
}

pub fn request_token(session: &Session) -> Option<Token> {
    session.get::<Token>(REQUEST_TOKEN).ok().flatten()
}

/// Pop the page the user was headed to when the handshake started.
pub fn take_return_to(session: &Session) -> Option<String> {
    let target = session.get::<String>(RETURN_TO).ok().flatten();
    session.remove(RETURN_TO);
    target
}
