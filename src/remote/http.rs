//! HTTP list store client
//!
//! Lists are addressed as `{base}/lists/{list}/items`. Every non-2xx
//! response becomes a `Remote` error carrying the status and body.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::dto::{
    convert_requests, join_floors, ChoiceFieldItem, CreatedItem, FloorItem, NewReadingItem,
    NewServiceRequestItem, ODataList, ReadingItem, ServiceRequestItem, ServiceRequestPatch,
};
use super::{ChoiceField, ListStore};
use crate::config::RemoteSettings;
use crate::error::{MeterbookError, MeterbookResult};
use crate::models::{
    Floor, FloorId, ReadingCandidate, ReadingId, RequestId, ServiceRequest, ValidatedRequest,
};

pub struct HttpListStore {
    client: Client,
    settings: RemoteSettings,
    token: Option<String>,
}

impl HttpListStore {
    pub fn new(settings: RemoteSettings, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            settings,
            token,
        }
    }

    fn items_url(&self, list: &str) -> String {
        format!("{}/lists/{}/items", self.settings.base_url, list)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, operation: &str) -> MeterbookResult<Response> {
        let response = builder.send().await.map_err(|e| {
            tracing::error!(operation, error = %e, "List store request failed");
            MeterbookError::remote(operation, e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::error!(operation, %status, "List store rejected request");
        Err(MeterbookError::remote(
            operation,
            format!("HTTP {}: {}", status, body.trim()),
        ))
    }

    async fn json<T: DeserializeOwned>(response: Response, operation: &str) -> MeterbookResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| MeterbookError::remote(operation, format!("invalid response: {}", e)))
    }

    async fn get_items<T: DeserializeOwned>(
        &self,
        list: &str,
        operation: &str,
    ) -> MeterbookResult<Vec<T>> {
        let url = self.items_url(list);
        let response = self.send(self.request(Method::GET, &url), operation).await?;
        let envelope: ODataList<T> = Self::json(response, operation).await?;
        Ok(envelope.value)
    }

    async fn post_item<B: Serialize + Sync>(
        &self,
        list: &str,
        body: &B,
        operation: &str,
    ) -> MeterbookResult<u64> {
        let url = self.items_url(list);
        let response = self
            .send(self.request(Method::POST, &url).json(body), operation)
            .await?;
        let created: CreatedItem = Self::json(response, operation).await?;
        Ok(created.id)
    }
}

#[async_trait]
impl ListStore for HttpListStore {
    async fn fetch_floors(&self) -> MeterbookResult<Vec<Floor>> {
        let floors: Vec<FloorItem> = self
            .get_items(&self.settings.floors_list, "fetch floors")
            .await?;
        let readings: Vec<ReadingItem> = self
            .get_items(&self.settings.readings_list, "fetch readings")
            .await?;
        tracing::debug!(
            floors = floors.len(),
            readings = readings.len(),
            "Fetched floors and readings"
        );
        Ok(join_floors(floors, readings))
    }

    async fn append_reading(
        &self,
        floor_id: FloorId,
        candidate: &ReadingCandidate,
        units_consumed: f64,
    ) -> MeterbookResult<ReadingId> {
        let body = NewReadingItem::new(floor_id, candidate, units_consumed);
        let id = self
            .post_item(&self.settings.readings_list, &body, "append reading")
            .await?;
        Ok(ReadingId::new(id))
    }

    async fn fetch_service_requests(&self) -> MeterbookResult<Vec<ServiceRequest>> {
        let items: Vec<ServiceRequestItem> = self
            .get_items(&self.settings.requests_list, "fetch service requests")
            .await?;
        Ok(convert_requests(items))
    }

    async fn append_service_request(
        &self,
        request: &ValidatedRequest,
    ) -> MeterbookResult<RequestId> {
        let body = NewServiceRequestItem::from(request);
        let id = self
            .post_item(&self.settings.requests_list, &body, "raise service request")
            .await?;
        Ok(RequestId::new(id))
    }

    async fn update_service_request(
        &self,
        id: RequestId,
        patch: &ServiceRequestPatch,
    ) -> MeterbookResult<()> {
        let url = format!("{}/{}", self.items_url(&self.settings.requests_list), id.get());
        self.send(
            self.request(Method::PATCH, &url).json(patch),
            "update service request",
        )
        .await?;
        Ok(())
    }

    async fn fetch_choices(&self, field: ChoiceField) -> MeterbookResult<Vec<String>> {
        let url = format!(
            "{}/lists/{}/fields/{}",
            self.settings.base_url,
            self.settings.requests_list,
            field.internal_name()
        );
        let response = self
            .send(self.request(Method::GET, &url), "fetch choices")
            .await?;
        let item: ChoiceFieldItem = Self::json(response, "fetch choices").await?;
        Ok(item.choices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Location, RequestCategory, RequestStatus};
    use chrono::NaiveDate;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store_for(server: &MockServer) -> HttpListStore {
        HttpListStore::new(RemoteSettings::new(server.uri()), Some("secret".into()))
    }

    #[tokio::test]
    async fn test_fetch_floors_joins_both_lists() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lists/Floors/items"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{"Id": 1, "Title": "Basement"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/lists/Readings/items"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [
                    {"Id": 102, "floorId": 1, "readingDate": "2024-06-28", "reading": 23150},
                    {"Id": 101, "floorId": 1, "readingDate": "2024-06-15", "reading": 23000}
                ]
            })))
            .mount(&server)
            .await;

        let floors = store_for(&server).fetch_floors().await.unwrap();
        assert_eq!(floors.len(), 1);
        assert_eq!(floors[0].readings.len(), 2);
        assert_eq!(floors[0].total_consumption(), 150.0);
    }

    #[tokio::test]
    async fn test_append_reading_returns_remote_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/lists/Readings/items"))
            .and(body_partial_json(json!({"floorId": 1, "reading": 23700.0})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"Id": 4411})))
            .mount(&server)
            .await;

        let id = store_for(&server)
            .append_reading(
                FloorId::new(1),
                &ReadingCandidate::new(date(2024, 8, 20), 23700.0),
                138.0,
            )
            .await
            .unwrap();
        assert_eq!(id, ReadingId::new(4411));
    }

    #[tokio::test]
    async fn test_server_error_is_remote_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/lists/ServiceRequests/items"))
            .respond_with(ResponseTemplate::new(500).set_body_string("list locked"))
            .mount(&server)
            .await;

        let request = ValidatedRequest {
            request_date: date(2024, 8, 20),
            category: RequestCategory::Lift,
            location: Location::new(Some(7), "Lift"),
            description: "Stuck between floors".into(),
        };
        let err = store_for(&server)
            .append_service_request(&request)
            .await
            .unwrap_err();
        assert!(err.is_remote());
        assert!(err.to_string().contains("list locked"));
    }

    #[tokio::test]
    async fn test_update_request_patches_item() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/lists/ServiceRequests/items/12"))
            .and(body_partial_json(json!({"status": "Cancelled"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let patch = ServiceRequestPatch {
            status: RequestStatus::Cancelled.to_string(),
            resolution_date: None,
            resolution_notes: None,
            payment_amount: None,
            payment_date: None,
            payment_mode: None,
        };
        store_for(&server)
            .update_service_request(RequestId::new(12), &patch)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_fetch_choices() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lists/ServiceRequests/fields/category"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Choices": ["Electrical", "Lift", "Plumbing"]
            })))
            .mount(&server)
            .await;

        let choices = store_for(&server)
            .fetch_choices(ChoiceField::Category)
            .await
            .unwrap();
        assert_eq!(choices, vec!["Electrical", "Lift", "Plumbing"]);
    }
}
