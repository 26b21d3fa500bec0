//! App Router

use salvo::Router;

use crate::{delivery, orders};

pub fn app_router() -> Router {
    Router::new()
        .push(
            Router::with_path("delivery")
                .push(Router::with_path("options").get(delivery::options::handler))
                .push(Router::with_path("slots").get(delivery::slots::handler))
                .push(
                    Router::with_path("reservations")
                        .post(delivery::reserve::handler)
                        .push(
                            Router::with_path("{reservation}")
                                .push(Router::with_path("confirm").post(delivery::confirm::handler))
                                .push(Router::with_path("cancel").post(delivery::cancel::handler)),
                        ),
                ),
        )
        .push(Router::with_path("orders/{order}/label").post(orders::label::handler))
}
