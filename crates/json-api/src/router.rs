//! App Router

use salvo::Router;

use crate::{carts, orders, sessions, webhooks};

/// Storefront routes. Everything a visitor touches runs behind the session
/// middleware; the payment webhook is called by the gateway and has no session.
pub(crate) fn app_router() -> Router {
    Router::new()
        .push(
            Router::new()
                .hoop(sessions::handler)
                .push(
                    Router::with_path("cart")
                        .get(carts::handlers::get::handler)
                        .delete(carts::handlers::clear::handler)
                        .push(
                            Router::with_path("items")
                                .post(carts::items::handlers::create::handler)
                                .push(
                                    Router::with_path("{product}")
                                        .put(carts::items::handlers::update::handler)
                                        .delete(carts::items::handlers::delete::handler),
                                ),
                        ),
                )
                .push(Router::with_path("checkout").post(orders::handlers::create::handler))
                .push(
                    Router::with_path("orders/{order}")
                        .get(orders::handlers::get::handler)
                        .push(Router::with_path("cancel").post(orders::handlers::cancel::handler)),
                ),
        )
        .push(Router::with_path("webhooks/payments").post(webhooks::payments::handler))
}
