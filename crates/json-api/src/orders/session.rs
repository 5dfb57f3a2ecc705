//! Orders placed from a visitor session.
//!
//! The session keeps a list of the order UUIDs it checked out, and only
//! those orders can be read or cancelled through it.

use serde_json::Value;
use smallvec::SmallVec;

use storefront_app::domain::{
    orders::records::OrderUuid,
    sessions::{SessionError, SessionKey, SessionStore},
};

pub(crate) const ORDERS_SESSION_NAME: &str = "orders";

pub(crate) type RememberedOrders = SmallVec<[OrderUuid; 4]>;

pub(crate) async fn remembered_orders(
    sessions: &dyn SessionStore,
    session: &SessionKey,
) -> Result<RememberedOrders, SessionError> {
    let Some(Value::Array(values)) = sessions.get(session, ORDERS_SESSION_NAME).await? else {
        return Ok(RememberedOrders::new());
    };

    Ok(values
        .iter()
        .filter_map(Value::as_str)
        .filter_map(|value| value.parse::<OrderUuid>().ok())
        .collect())
}

pub(crate) async fn remember_order(
    sessions: &dyn SessionStore,
    session: &SessionKey,
    order: OrderUuid,
) -> Result<(), SessionError> {
    let mut orders = remembered_orders(sessions, session).await?;

    if orders.contains(&order) {
        return Ok(());
    }

    orders.push(order);

    let value = orders
        .iter()
        .map(|order| Value::String(order.to_string()))
        .collect();

    sessions
        .set(session, ORDERS_SESSION_NAME, Value::Array(value))
        .await
}

pub(crate) async fn owns_order(
    sessions: &dyn SessionStore,
    session: &SessionKey,
    order: OrderUuid,
) -> Result<bool, SessionError> {
    Ok(remembered_orders(sessions, session).await?.contains(&order))
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;
    use storefront_app::domain::sessions::MemorySessionStore;
    use testresult::TestResult;

    use super::*;

    #[tokio::test]
    async fn remembered_orders_accumulate_once() -> TestResult {
        let sessions = MemorySessionStore::new(SignedDuration::from_secs(60));
        let session = SessionKey::generate();
        let first = OrderUuid::new();
        let second = OrderUuid::new();

        remember_order(&sessions, &session, first).await?;
        remember_order(&sessions, &session, second).await?;
        remember_order(&sessions, &session, first).await?;

        let orders = remembered_orders(&sessions, &session).await?;

        assert_eq!(orders.as_slice(), &[first, second]);
        assert!(owns_order(&sessions, &session, second).await?, "second order is owned");

        Ok(())
    }

    #[tokio::test]
    async fn other_sessions_do_not_own_orders() -> TestResult {
        let sessions = MemorySessionStore::new(SignedDuration::from_secs(60));
        let order = OrderUuid::new();

        remember_order(&sessions, &SessionKey::generate(), order).await?;

        assert!(
            !owns_order(&sessions, &SessionKey::generate(), order).await?,
            "a different session must not own the order"
        );

        Ok(())
    }
}
