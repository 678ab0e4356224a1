use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::auth::Caller;
use crate::state::AppState;

/// Resolves the `Authorization` header into a [`Caller`] and stores it in the
/// request extensions. Never rejects: bad credentials degrade to
/// [`Caller::Anonymous`] and the handler's role check decides.
pub async fn authenticate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let caller = state.authenticator.resolve(request.headers().get(AUTHORIZATION));
    request.extensions_mut().insert(caller);
    next.run(request).await
}
