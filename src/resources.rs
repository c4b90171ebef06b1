//! Dashboard resource collections
//!
//! Typed names for the REST collections the dashboard manages and thin
//! CRUD helpers over the API client.

use crate::error::{Error, Result};
use crate::http::ApiClient;
use crate::types::JsonValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A collection managed from the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Books,
    Products,
    Categories,
    Colleges,
    Departments,
    Users,
    Roles,
    OnboardingScreens,
    Reviews,
    Approvals,
}

impl Resource {
    pub const ALL: [Resource; 10] = [
        Resource::Books,
        Resource::Products,
        Resource::Categories,
        Resource::Colleges,
        Resource::Departments,
        Resource::Users,
        Resource::Roles,
        Resource::OnboardingScreens,
        Resource::Reviews,
        Resource::Approvals,
    ];

    /// Name used on the command line
    pub fn name(self) -> &'static str {
        match self {
            Resource::Books => "books",
            Resource::Products => "products",
            Resource::Categories => "categories",
            Resource::Colleges => "colleges",
            Resource::Departments => "departments",
            Resource::Users => "users",
            Resource::Roles => "roles",
            Resource::OnboardingScreens => "onboarding",
            Resource::Reviews => "reviews",
            Resource::Approvals => "approvals",
        }
    }

    /// Collection path
    pub fn path(self) -> String {
        format!("/{}", self.name())
    }

    /// Path of one item
    pub fn item_path(self, id: &str) -> String {
        format!("/{}/{}", self.name(), id)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Resource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        let wanted = match wanted.as_str() {
            "onboarding_screens" | "onboarding-screens" => "onboarding",
            other => other,
        };

        Resource::ALL
            .into_iter()
            .find(|r| r.name() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Resource::ALL.iter().map(|r| r.name()).collect();
                Error::invalid_value(
                    "resource",
                    format!("unknown resource '{s}' (expected one of: {})", known.join(", ")),
                )
            })
    }
}

/// CRUD operations on dashboard resources
#[derive(Debug, Clone, Copy)]
pub struct ResourceApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ResourceApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// All items of a collection; unexpected shapes read as empty
    pub async fn list(&self, resource: Resource) -> Result<Vec<JsonValue>> {
        self.client.get_list(&resource.path()).await
    }

    pub async fn get(&self, resource: Resource, id: &str) -> Result<JsonValue> {
        self.client.get(&resource.item_path(id)).await?.value()
    }

    pub async fn create(&self, resource: Resource, body: JsonValue) -> Result<JsonValue> {
        self.client.post(&resource.path(), body).await?.value()
    }

    pub async fn update(&self, resource: Resource, id: &str, body: JsonValue) -> Result<JsonValue> {
        self.client.put(&resource.item_path(id), body).await?.value()
    }

    pub async fn remove(&self, resource: Resource, id: &str) -> Result<JsonValue> {
        self.client.delete(&resource.item_path(id)).await?.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ApiClientConfig;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ApiClient {
        ApiClient::with_config(ApiClientConfig::builder().base_url(server.uri()).build()).unwrap()
    }

    #[test]
    fn test_resource_paths() {
        assert_eq!(Resource::Books.path(), "/books");
        assert_eq!(Resource::OnboardingScreens.path(), "/onboarding");
        assert_eq!(Resource::Roles.item_path("3"), "/roles/3");
    }

    #[test]
    fn test_resource_from_str() {
        assert_eq!("Colleges".parse::<Resource>().unwrap(), Resource::Colleges);
        assert_eq!(
            "onboarding-screens".parse::<Resource>().unwrap(),
            Resource::OnboardingScreens
        );

        let err = "authors".parse::<Resource>().unwrap_err();
        assert!(err.to_string().contains("unknown resource 'authors'"));
    }

    #[tokio::test]
    async fn test_list_reads_wrapped_and_bare() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/departments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"name": "Physics"}]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/categories"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "Fiction"}])))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/reviews"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&server)
            .await;

        let client = client(&server);
        let api = ResourceApi::new(&client);

        assert_eq!(
            api.list(Resource::Departments).await.unwrap(),
            vec![json!({"name": "Physics"})]
        );
        assert_eq!(
            api.list(Resource::Categories).await.unwrap(),
            vec![json!({"name": "Fiction"})]
        );
        assert!(api.list(Resource::Reviews).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_update_remove() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/books"))
            .and(body_json(json!({"title": "Emma", "images": ["https://cdn/e.png"]})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "b1"})))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("PUT"))
            .and(path("/books/b1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "b1"})))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/books/b1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let api = ResourceApi::new(&client);

        let created = api
            .create(
                Resource::Books,
                json!({"title": "Emma", "images": ["https://cdn/e.png"]}),
            )
            .await
            .unwrap();
        assert_eq!(created["id"], "b1");

        api.update(Resource::Books, "b1", json!({"title": "Emma (2nd ed.)"}))
            .await
            .unwrap();

        let removed = api.remove(Resource::Books, "b1").await.unwrap();
        assert_eq!(removed, JsonValue::Null);
    }
}
