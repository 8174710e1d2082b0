#![allow(dead_code)]

pub mod auth {
    use brrtrouter_testkit::context::{ReqContext, SignedInUser};
    use brrtrouter_testkit::fakes::{hash_token, RemoteCache, RemoteCacheExt, TokenError, UserTokenService};
    use brrtrouter_testkit::fixtures::ApiKeyFixture;
    use brrtrouter_testkit::middleware::Middleware;
    use brrtrouter_testkit::server::HandlerResponse;
    use std::sync::Arc;
    use std::time::Duration;

    /// Cache key the middleware stores resolved session users under.
    pub fn session_cache_key(unhashed_token: &str) -> String {
        format!("session-user:{}", hash_token(unhashed_token))
    }

    /// Minimal context-handler middleware: API key first, then the login cookie.
    ///
    /// A request carrying neither passes through anonymous.
    pub struct ContextAuthMiddleware {
        pub tokens: Arc<dyn UserTokenService>,
        pub cache: Arc<dyn RemoteCache>,
        pub cookie_name: String,
    }

    impl ContextAuthMiddleware {
        fn sign_in_with_api_key(&self, ctx: &mut ReqContext, key: &str) -> Option<HandlerResponse> {
            match ApiKeyFixture::decode(key) {
                Ok(fixture) => {
                    ctx.sign_in(SignedInUser {
                        user_id: 0,
                        org_id: fixture.org_id,
                        login: format!("api-key:{}", fixture.name),
                        api_key_id: Some(1),
                    });
                    None
                }
                Err(_) => Some(HandlerResponse::error(401, "Invalid API key")),
            }
        }

        fn sign_in_with_cookie(&self, ctx: &mut ReqContext, unhashed: &str) -> Option<HandlerResponse> {
            let cache_key = session_cache_key(unhashed);
            if let Ok(user) = self.cache.get::<SignedInUser>(&cache_key) {
                ctx.sign_in(user);
                return None;
            }

            match self.tokens.lookup_token(unhashed) {
                Ok(token) => {
                    let user = SignedInUser {
                        user_id: token.user_id,
                        org_id: 1,
                        login: format!("user-{}", token.user_id),
                        api_key_id: None,
                    };
                    if self
                        .cache
                        .set(&cache_key, &user, Some(Duration::from_secs(60)))
                        .is_err()
                    {
                        return Some(HandlerResponse::error(500, "Session cache failure"));
                    }
                    ctx.user_token = Some(token);
                    ctx.sign_in(user);
                    None
                }
                Err(TokenError::NotFound) | Err(TokenError::Expired) => {
                    Some(HandlerResponse::error(401, "Unauthorized"))
                }
                Err(TokenError::Internal(msg)) => Some(HandlerResponse::error(500, &msg)),
            }
        }
    }

    impl Middleware for ContextAuthMiddleware {
        fn before(&self, ctx: &mut ReqContext) -> Option<HandlerResponse> {
            let bearer = ctx
                .get_header_values("authorization")
                .find_map(|v| v.strip_prefix("Bearer "))
                .map(str::to_string);
            if let Some(key) = bearer {
                return self.sign_in_with_api_key(ctx, &key);
            }

            let cookie = ctx.get_cookie(&self.cookie_name).map(str::to_string);
            match cookie {
                Some(unhashed) => self.sign_in_with_cookie(ctx, &unhashed),
                None => None,
            }
        }
    }
}
