//! Wire records of the remote lists
//!
//! Field names follow the list schemas (`Id`, `Title`, `requestDate`,
//! `location/Title`, ...). Records are converted into the core model at this
//! boundary and anything malformed is rejected here, never further in.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    Floor, FloorId, Location, Money, Reading, ReadingCandidate, ReadingId, RequestCategory,
    RequestId, RequestStatus, Resolution, ServicePayment, ServiceRequest, ValidatedRequest,
};

/// `{"value": [...]}` collection envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ODataList<T> {
    pub value: Vec<T>,
}

/// Response body of a create call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedItem {
    #[serde(rename = "Id")]
    pub id: u64,
}

/// Choice column definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceFieldItem {
    #[serde(rename = "Choices", default)]
    pub choices: Vec<String>,
}

/// Floors list item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloorItem {
    #[serde(rename = "Id")]
    pub id: u64,
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
}

/// Readings list item; `floorId` is the lookup back to the floors list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingItem {
    #[serde(rename = "Id")]
    pub id: u64,
    #[serde(rename = "floorId", default)]
    pub floor_id: Option<u64>,
    #[serde(rename = "readingDate", default)]
    pub reading_date: Option<String>,
    #[serde(default)]
    pub reading: Option<f64>,
    #[serde(rename = "unitsConsumed", default)]
    pub units_consumed: Option<f64>,
}

/// Body of a readings-list create call
#[derive(Debug, Clone, Serialize)]
pub struct NewReadingItem {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "floorId")]
    pub floor_id: u64,
    #[serde(rename = "readingDate")]
    pub reading_date: String,
    pub reading: f64,
    #[serde(rename = "unitsConsumed")]
    pub units_consumed: f64,
}

impl NewReadingItem {
    pub fn new(floor_id: FloorId, candidate: &ReadingCandidate, units_consumed: f64) -> Self {
        Self {
            title: format!("Reading {}", candidate.date.format("%Y-%m-%d")),
            floor_id: floor_id.get(),
            reading_date: candidate.date.format("%Y-%m-%d").to_string(),
            reading: candidate.value,
            units_consumed,
        }
    }
}

/// Expanded `location` lookup of a service request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationLookup {
    #[serde(rename = "Id", default)]
    pub id: Option<u64>,
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
}

/// Service requests list item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRequestItem {
    #[serde(rename = "Id")]
    pub id: u64,
    #[serde(rename = "requestDate", default)]
    pub request_date: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub location: Option<LocationLookup>,
    #[serde(rename = "descriptionIssue", default)]
    pub description_issue: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "resolutionDate", default)]
    pub resolution_date: Option<String>,
    #[serde(rename = "resolutionNotes", default)]
    pub resolution_notes: Option<String>,
    #[serde(rename = "paymentAmount", default)]
    pub payment_amount: Option<f64>,
    #[serde(rename = "paymentDate", default)]
    pub payment_date: Option<String>,
    #[serde(rename = "paymentMode", default)]
    pub payment_mode: Option<String>,
}

/// Body of a service-request create call
#[derive(Debug, Clone, Serialize)]
pub struct NewServiceRequestItem {
    #[serde(rename = "Title")]
    pub title: &'static str,
    #[serde(rename = "requestDate")]
    pub request_date: String,
    pub category: String,
    #[serde(rename = "descriptionIssue")]
    pub description_issue: String,
    #[serde(rename = "locationId", skip_serializing_if = "Option::is_none")]
    pub location_id: Option<u64>,
    pub status: String,
}

impl From<&ValidatedRequest> for NewServiceRequestItem {
    fn from(request: &ValidatedRequest) -> Self {
        Self {
            title: "Service Request",
            request_date: request.request_date.format("%Y-%m-%d").to_string(),
            category: request.category.to_string(),
            description_issue: request.description.clone(),
            location_id: request.location.id,
            status: RequestStatus::Open.to_string(),
        }
    }
}

/// Body of a service-request update call
///
/// Absent values serialize as `null` so that leaving Resolved clears the
/// remote resolution columns too.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceRequestPatch {
    pub status: String,
    #[serde(rename = "resolutionDate")]
    pub resolution_date: Option<String>,
    #[serde(rename = "resolutionNotes")]
    pub resolution_notes: Option<String>,
    #[serde(rename = "paymentAmount")]
    pub payment_amount: Option<f64>,
    #[serde(rename = "paymentDate")]
    pub payment_date: Option<String>,
    #[serde(rename = "paymentMode")]
    pub payment_mode: Option<String>,
}

impl From<&ServiceRequest> for ServiceRequestPatch {
    fn from(request: &ServiceRequest) -> Self {
        let resolution = request.resolution.as_ref();
        let payment = resolution.and_then(|r| r.payment.as_ref());
        Self {
            status: request.status.to_string(),
            resolution_date: resolution.map(|r| r.date.format("%Y-%m-%d").to_string()),
            resolution_notes: resolution.and_then(|r| r.notes.clone()),
            payment_amount: payment.map(|p| p.amount.as_f64()),
            payment_date: payment.map(|p| p.date.format("%Y-%m-%d").to_string()),
            payment_mode: payment.map(|p| p.mode.clone()),
        }
    }
}

/// Parse a remote date, either `YYYY-MM-DD` or an RFC 3339 timestamp
///
/// Timestamps keep their UTC calendar date.
pub fn parse_remote_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}

fn money_from_remote(amount: f64) -> Option<Money> {
    amount
        .is_finite()
        .then(|| Money::from_minor((amount * 100.0).round() as i64))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl TryFrom<ReadingItem> for (FloorId, Reading) {
    type Error = String;

    fn try_from(item: ReadingItem) -> Result<Self, Self::Error> {
        let floor_id = item
            .floor_id
            .ok_or_else(|| format!("reading {} has no floor", item.id))?;
        let date = item
            .reading_date
            .as_deref()
            .and_then(parse_remote_date)
            .ok_or_else(|| format!("reading {} has no valid date", item.id))?;
        let value = item
            .reading
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("reading {} has no value", item.id))?;

        Ok((
            FloorId::new(floor_id),
            Reading::new(
                ReadingId::new(item.id),
                date,
                value,
                item.units_consumed.unwrap_or(0.0),
            ),
        ))
    }
}

impl TryFrom<ServiceRequestItem> for ServiceRequest {
    type Error = String;

    fn try_from(item: ServiceRequestItem) -> Result<Self, Self::Error> {
        let id = item.id;
        let request_date = item
            .request_date
            .as_deref()
            .and_then(parse_remote_date)
            .ok_or_else(|| format!("request {} has no valid request date", id))?;
        let category: RequestCategory = item
            .category
            .as_deref()
            .unwrap_or_default()
            .parse()
            .map_err(|e| format!("request {}: {}", id, e))?;
        let status = match item.status.as_deref().map(str::trim) {
            // Older clients created requests as "Pending"
            None | Some("") | Some("Pending") => RequestStatus::Open,
            Some(raw) => raw
                .parse::<RequestStatus>()
                .map_err(|e| format!("request {}: {}", id, e))?,
        };
        let location = item
            .location
            .map(|l| Location::new(l.id, l.title.unwrap_or_default()))
            .unwrap_or_else(|| Location::new(None, ""));

        let resolution = if status == RequestStatus::Resolved {
            let date = item
                .resolution_date
                .as_deref()
                .and_then(parse_remote_date)
                .ok_or_else(|| format!("resolved request {} has no resolution date", id))?;
            let payment = match (
                item.payment_amount.and_then(money_from_remote),
                item.payment_date.as_deref().and_then(parse_remote_date),
                non_blank(item.payment_mode),
            ) {
                (Some(amount), Some(date), Some(mode)) => {
                    Some(ServicePayment { amount, date, mode })
                }
                (Some(amount), _, _) if !amount.is_zero() => {
                    tracing::warn!(request = id, "Payment amount without date or mode ignored");
                    None
                }
                _ => None,
            };
            Some(Resolution {
                date,
                notes: non_blank(item.resolution_notes),
                payment,
            })
        } else {
            None
        };

        Ok(ServiceRequest {
            id: RequestId::new(id),
            request_date,
            category,
            location,
            description: item.description_issue.unwrap_or_default(),
            status,
            resolution,
        })
    }
}

/// Join floors with their readings by the floor back-reference
///
/// Malformed readings and readings of unknown floors are skipped with a
/// warning. Every floor history is normalized.
pub fn join_floors(floors: Vec<FloorItem>, readings: Vec<ReadingItem>) -> Vec<Floor> {
    let mut joined: Vec<Floor> = floors
        .into_iter()
        .map(|item| {
            let name = item
                .title
                .unwrap_or_else(|| format!("Floor {}", item.id));
            Floor::new(FloorId::new(item.id), name)
        })
        .collect();

    for item in readings {
        match <(FloorId, Reading)>::try_from(item) {
            Ok((floor_id, reading)) => match joined.iter_mut().find(|f| f.id == floor_id) {
                Some(floor) => floor.readings.push(reading),
                None => tracing::warn!(
                    %floor_id,
                    reading = %reading.id,
                    "Reading for unknown floor skipped"
                ),
            },
            Err(reason) => tracing::warn!(%reason, "Malformed reading skipped"),
        }
    }

    for floor in &mut joined {
        floor.normalize();
    }
    joined.sort_by_key(|f| f.id);
    joined
}

/// Convert service request records, skipping malformed ones
pub fn convert_requests(items: Vec<ServiceRequestItem>) -> Vec<ServiceRequest> {
    items
        .into_iter()
        .filter_map(|item| match ServiceRequest::try_from(item) {
            Ok(request) => Some(request),
            Err(reason) => {
                tracing::warn!(%reason, "Malformed service request skipped");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_remote_date_forms() {
        assert_eq!(parse_remote_date("2024-08-05"), Some(date(2024, 8, 5)));
        assert_eq!(
            parse_remote_date("2024-08-05T07:00:00Z"),
            Some(date(2024, 8, 5))
        );
        // 02:00 at +05:30 is still the previous day in UTC
        assert_eq!(
            parse_remote_date("2024-08-05T02:00:00+05:30"),
            Some(date(2024, 8, 4))
        );
        assert_eq!(parse_remote_date("05/08/2024"), None);
    }

    #[test]
    fn test_join_floors_by_back_reference() {
        let floors: ODataList<FloorItem> = serde_json::from_value(json!({
            "value": [{"Id": 7, "Title": "Lift"}, {"Id": 1, "Title": "Basement"}]
        }))
        .unwrap();
        let readings: ODataList<ReadingItem> = serde_json::from_value(json!({
            "value": [
                {"Id": 702, "floorId": 7, "readingDate": "2024-06-30T00:00:00Z", "reading": 150145},
                {"Id": 701, "floorId": 7, "readingDate": "2024-06-15", "reading": 150000},
                {"Id": 901, "floorId": 9, "readingDate": "2024-06-15", "reading": 4000},
                {"Id": 999, "floorId": 1, "reading": 5}
            ]
        }))
        .unwrap();

        let joined = join_floors(floors.value, readings.value);
        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].name, "Basement");
        assert!(joined[0].readings.is_empty());
        let lift = &joined[1];
        assert_eq!(lift.readings[0].id, ReadingId::new(701));
        assert_eq!(lift.readings[1].units_consumed, 145.0);
    }

    #[test]
    fn test_service_request_item_conversion() {
        let item: ServiceRequestItem = serde_json::from_value(json!({
            "Id": 12,
            "requestDate": "2024-08-20T00:00:00Z",
            "category": "Fire System",
            "location": {"Id": 8, "Title": "Pump Room"},
            "descriptionIssue": "Sprinkler valve leaking",
            "status": "Resolved",
            "resolutionDate": "2024-08-25",
            "resolutionNotes": "Valve replaced",
            "paymentAmount": 1250.5,
            "paymentDate": "2024-08-26",
            "paymentMode": "Cash"
        }))
        .unwrap();

        let request = ServiceRequest::try_from(item).unwrap();
        assert_eq!(request.category, RequestCategory::FireSystem);
        assert_eq!(request.location.title, "Pump Room");
        assert_eq!(request.payment_amount(), Money::from_minor(125050));
        assert!(request.is_consistent());
    }

    #[test]
    fn test_legacy_pending_status_is_open() {
        let item: ServiceRequestItem = serde_json::from_value(json!({
            "Id": 3,
            "requestDate": "2024-08-20",
            "category": "Lift",
            "status": "Pending",
            "resolutionDate": "2024-08-25"
        }))
        .unwrap();

        let request = ServiceRequest::try_from(item).unwrap();
        assert_eq!(request.status, RequestStatus::Open);
        assert!(request.resolution.is_none());
    }

    #[test]
    fn test_malformed_requests_skipped() {
        let items: ODataList<ServiceRequestItem> = serde_json::from_value(json!({
            "value": [
                {"Id": 1, "requestDate": "2024-08-20", "category": "Lift", "status": "Open"},
                {"Id": 2, "category": "Lift"},
                {"Id": 3, "requestDate": "2024-08-20", "category": "Gardening"},
                {"Id": 4, "requestDate": "2024-08-20", "category": "Lift", "status": "Resolved"}
            ]
        }))
        .unwrap();

        let requests = convert_requests(items.value);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].id, RequestId::new(1));
    }

    #[test]
    fn test_patch_clears_resolution_with_nulls() {
        let request = ServiceRequest {
            id: RequestId::new(5),
            request_date: date(2024, 8, 1),
            category: RequestCategory::Electrical,
            location: Location::new(Some(2), "Ground Floor"),
            description: "Flickering lights".into(),
            status: RequestStatus::InProgress,
            resolution: None,
        };

        let body = serde_json::to_value(ServiceRequestPatch::from(&request)).unwrap();
        assert_eq!(body["status"], "In Progress");
        assert!(body["resolutionDate"].is_null());
        assert!(body["paymentAmount"].is_null());
    }

    #[test]
    fn test_new_items_serialize_list_fields() {
        let candidate = ReadingCandidate::new(date(2024, 8, 20), 23700.0);
        let item = NewReadingItem::new(FloorId::new(1), &candidate, 138.0);
        let body = serde_json::to_value(item).unwrap();
        assert_eq!(body["floorId"], 1);
        assert_eq!(body["readingDate"], "2024-08-20");
        assert_eq!(body["unitsConsumed"], 138.0);

        let request = ValidatedRequest {
            request_date: date(2024, 8, 20),
            category: RequestCategory::GeneralMaintenance,
            location: Location::new(Some(3), "1st Floor"),
            description: "Corridor paint peeling".into(),
        };
        let body = serde_json::to_value(NewServiceRequestItem::from(&request)).unwrap();
        assert_eq!(body["category"], "General Maintenance");
        assert_eq!(body["locationId"], 3);
        assert_eq!(body["status"], "Open");
    }
}
