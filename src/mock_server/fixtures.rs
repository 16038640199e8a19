//! Test data fixtures for the mock server.
//!
//! Provides factory functions for creating realistic raw API payloads.

use serde_json::{json, Value};

use super::state::MockState;

/// Collection of fixture factories for test data.
pub struct Fixtures;

impl Fixtures {
    // =========================================================================
    // Resource Fixtures
    // =========================================================================

    /// A company.
    pub fn company(slug: &str, name: &str) -> Value {
        json!({
            "id": slug,
            "name": name,
            "domain": slug,
            "url": format!("https://getsatisfaction.com/{slug}"),
        })
    }

    /// A person.
    pub fn person(id: u64, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "canonical_name": name.to_lowercase().replace(' ', "_"),
            "member_since": "2012/03/01 09:30:00 +0000",
        })
    }

    /// A product with one link.
    pub fn product(slug: &str, name: &str) -> Value {
        json!({
            "id": slug,
            "name": name,
            "created_at": "2012/06/10 12:00:00 +0000",
            "links": [
                {"url": format!("https://example.com/{slug}"), "created_at": "2012/06/11 08:00:00 +0000"}
            ],
        })
    }

    /// A topic written by `author`.
    pub fn topic(slug: &str, subject: &str, author: Value) -> Value {
        json!({
            "id": slug,
            "subject": subject,
            "style": "problem",
            "created_at": "2013/05/15 15:56:42 +0000",
            "last_active_at": "2013/05/16 10:00:00 +0000",
            "author": author,
            "products": [],
            "emotitag": {"face": "sad", "feeling": "frustrated"},
        })
    }

    /// A reply written by `author`.
    pub fn reply(id: u64, content: &str, author: Value) -> Value {
        json!({
            "id": id,
            "content": content,
            "created_at": "2013/05/15 16:10:00 +0000",
            "author": author,
        })
    }

    // =========================================================================
    // Scenarios
    // =========================================================================

    /// A small community: one company with employees, products and topics.
    pub fn default_scenario() -> MockState {
        let ann = Self::person(1, "Ann Agent");
        let bob = Self::person(2, "Bob Builder");
        let acme = Self::company("acme", "Acme Corp");
        let widget = Self::product("widget", "Widget");
        let topic = Self::topic("login-broken", "Login is broken", bob.clone());

        MockState::new()
            .with_collection("companies", vec![acme.clone(), Self::company("globex", "Globex")])
            .with_resource("companies/acme", acme)
            .with_collection("companies/acme/employees", vec![ann.clone()])
            .with_collection("companies/acme/people", vec![ann.clone(), bob.clone()])
            .with_collection("companies/acme/products", vec![widget.clone()])
            .with_resource("companies/acme/products/widget", widget.clone())
            .with_collection("companies/acme/products/widget/topics", vec![topic.clone()])
            .with_collection("topics", vec![topic.clone()])
            .with_resource("topics/login-broken", topic)
            .with_collection(
                "topics/login-broken/replies",
                vec![Self::reply(10, "Try clearing cookies", ann.clone())],
            )
            .with_collection("products", vec![widget])
            .with_resource("people/2", bob)
            .with_collection("people/2/followed/topics", vec![])
    }
}
