//! Get Order Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use storefront_app::domain::orders::records::OrderUuid;
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{
        errors::{into_status_error, payments_status_error, session_status_error},
        models::OrderResponse,
        session::owns_order,
    },
    state::State,
};

/// Get Order Handler
///
/// Only orders placed from the caller's session are visible.
#[endpoint(
    tags("orders"),
    summary = "Get Order",
    responses(
        (status_code = StatusCode::OK, description = "Order details"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let session = depot.session_key_or_500()?;
    let order: OrderUuid = order.into_inner().into();

    if !owns_order(state.app.sessions.as_ref(), session, order)
        .await
        .map_err(session_status_error)?
    {
        return Err(StatusError::not_found());
    }

    let record = state
        .app
        .orders
        .get_order(order)
        .await
        .map_err(into_status_error)?;

    let payments = state
        .app
        .payments
        .list_payments(order)
        .await
        .map_err(payments_status_error)?;

    Ok(Json(OrderResponse::from(record).with_payments(payments)))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use rust_decimal_macros::dec;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use storefront_app::domain::{
        orders::{
            OrdersServiceError,
            records::{OrderUuid, PaymentStatus},
        },
        payments::records::{PaymentRecord, PaymentUuid},
    };
    use testresult::TestResult;

    use crate::{
        orders::session::ORDERS_SESSION_NAME,
        sessions::SESSION_KEY_HEADER,
        test_helpers::{TEST_SESSION_KEY, TestApp, make_order},
    };

    use super::*;

    fn make_service(app: TestApp) -> Service {
        app.service(Router::with_path("orders/{order}").get(handler))
    }

    fn remember(app: &mut TestApp, orders: &[OrderUuid]) {
        let value = json!(orders.iter().map(ToString::to_string).collect::<Vec<_>>());

        app.sessions
            .expect_get()
            .once()
            .withf(|_, name| name == ORDERS_SESSION_NAME)
            .return_once(move |_, _| Ok(Some(value)));
    }

    #[tokio::test]
    async fn test_get_returns_order_with_payments() -> TestResult {
        let mut app = TestApp::default();
        let uuid = OrderUuid::new();

        remember(&mut app, &[uuid]);

        app.orders
            .expect_get_order()
            .once()
            .withf(move |order| *order == uuid)
            .return_once(move |_| Ok(make_order(uuid)));

        app.payments
            .expect_list_payments()
            .once()
            .withf(move |order| *order == uuid)
            .return_once(move |_| {
                Ok(vec![PaymentRecord {
                    uuid: PaymentUuid::new(),
                    order_uuid: uuid,
                    gateway_transaction_id: "1234".to_string(),
                    amount: dec!(25.00),
                    status: PaymentStatus::Completed,
                    gateway_response: None,
                    paid_at: Some(Timestamp::UNIX_EPOCH),
                    created_at: Timestamp::UNIX_EPOCH,
                    updated_at: Timestamp::UNIX_EPOCH,
                }])
            });

        let mut res = TestClient::get(format!("http://example.com/orders/{uuid}"))
            .add_header(SESSION_KEY_HEADER, TEST_SESSION_KEY, true)
            .send(&make_service(app))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: OrderResponse = res.take_json().await?;

        assert_eq!(body.order_number, "ORD-0000BEEF");
        assert_eq!(body.full_name, "Ana Souza");
        assert_eq!(body.payments.len(), 1);
        assert_eq!(
            body.payments.first().map(|payment| payment.status.as_str()),
            Some("completed")
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_get_order_from_another_session_returns_404() -> TestResult {
        let mut app = TestApp::default();

        remember(&mut app, &[OrderUuid::new()]);

        let res = TestClient::get(format!("http://example.com/orders/{}", OrderUuid::new()))
            .add_header(SESSION_KEY_HEADER, TEST_SESSION_KEY, true)
            .send(&make_service(app))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_missing_order_returns_404() -> TestResult {
        let mut app = TestApp::default();
        let uuid = OrderUuid::new();

        remember(&mut app, &[uuid]);

        app.orders
            .expect_get_order()
            .once()
            .return_once(|_| Err(OrdersServiceError::NotFound));

        let res = TestClient::get(format!("http://example.com/orders/{uuid}"))
            .add_header(SESSION_KEY_HEADER, TEST_SESSION_KEY, true)
            .send(&make_service(app))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_invalid_uuid_returns_400() -> TestResult {
        let res = TestClient::get("http://example.com/orders/not-a-uuid")
            .send(&make_service(TestApp::default()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
