//! Domain DTOs for the branch API.
//!
//! # Design
//! These types mirror the mock server's schema but are defined independently;
//! the integration tests catch drift between the two. Most descriptive fields
//! are optional with serde defaults so a sparse payload (for example a branch
//! fetched without `include=sections`) still decodes.
//!
//! `Branch::number_of_tables` is client-side only. It is skipped on both
//! serialization and deserialization and is filled in by the store at load
//! time.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize};

/// Day of the week as spelled on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];
}

/// A `[start, end]` pair of `HH:MM` times, encoded as a two-element array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange(pub String, pub String);

impl TimeRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self(start.into(), end.into())
    }

    pub fn start(&self) -> &str {
        &self.0
    }

    pub fn end(&self) -> &str {
        &self.1
    }
}

/// Reservation windows keyed by weekday, each with its ranges in order.
pub type ReservationTimes = BTreeMap<Weekday, Vec<TimeRange>>;

/// A bookable table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: String,
    pub section_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub seats: u32,
    #[serde(default)]
    pub accepts_reservations: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub deleted_at: Option<String>,
}

/// A subdivision of a branch holding its tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub branch_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub name_localized: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub deleted_at: Option<String>,
}

/// A restaurant location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub name_localized: Option<String>,
    #[serde(default)]
    pub reference: String,
    #[serde(default, rename = "type")]
    pub kind: i64,
    #[serde(default)]
    pub latitude: Option<String>,
    #[serde(default)]
    pub longitude: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub opening_from: Option<String>,
    #[serde(default)]
    pub opening_to: Option<String>,
    #[serde(default)]
    pub inventory_end_of_day_time: Option<String>,
    #[serde(default)]
    pub receipt_header: Option<String>,
    #[serde(default)]
    pub receipt_footer: Option<String>,
    #[serde(default)]
    pub settings: Option<serde_json::Value>,
    #[serde(default)]
    pub receives_online_orders: bool,
    #[serde(default)]
    pub accepts_reservations: bool,
    #[serde(default)]
    pub reservation_duration: u32,
    #[serde(default, deserialize_with = "reservation_times_or_empty")]
    pub reservation_times: ReservationTimes,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub deleted_at: Option<String>,

    /// Tables accepting reservations across all sections. Set by the store
    /// for reservation-enabled branches; never sent to or read from the API.
    #[serde(skip)]
    pub number_of_tables: Option<usize>,
}

impl Branch {
    /// Count of tables, across every section, that accept reservations.
    pub fn reservable_table_count(&self) -> usize {
        self.sections
            .iter()
            .flat_map(|s| &s.tables)
            .filter(|t| t.accepts_reservations)
            .count()
    }

    /// Every table of the branch, flattened for a table picker.
    pub fn table_options(&self) -> Vec<TableOption> {
        self.sections
            .iter()
            .flat_map(|section| {
                section.tables.iter().map(move |table| TableOption {
                    id: table.id.clone(),
                    section_name: section.name.clone(),
                    table_name: table.name.clone(),
                })
            })
            .collect()
    }
}

/// A selectable table, labelled with its section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOption {
    pub id: String,
    pub section_name: String,
    pub table_name: String,
}

/// Pagination links of a list response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
    #[serde(default)]
    pub first: Option<String>,
    #[serde(default)]
    pub last: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub prev: Option<String>,
}

/// Pagination metadata of a list response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub from: Option<u32>,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub to: Option<u32>,
}

/// One page of branches. Links and meta are decoded but the client never
/// follows them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchPage {
    pub data: Vec<Branch>,
    #[serde(default)]
    pub links: PageLinks,
    #[serde(default)]
    pub meta: PageMeta,
}

/// Payload toggling whether a branch accepts reservations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationStatusUpdate {
    pub accepts_reservations: bool,
}

/// Reservation settings edited for one branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchForm {
    pub reservation_duration: u32,
    /// Selected tables; sent sorted and deduplicated.
    pub table_ids: BTreeSet<String>,
    pub reservation_times: ReservationTimes,
}

impl BranchForm {
    /// Form pre-filled from the branch's current settings.
    pub fn from_branch(branch: &Branch) -> Self {
        let table_ids = branch
            .sections
            .iter()
            .flat_map(|s| &s.tables)
            .filter(|t| t.accepts_reservations)
            .map(|t| t.id.clone())
            .collect();
        Self {
            reservation_duration: branch.reservation_duration,
            table_ids,
            reservation_times: branch.reservation_times.clone(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// PHP backends encode an empty associative array as `[]`.
fn reservation_times_or_empty<'de, D>(deserializer: D) -> Result<ReservationTimes, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Map(ReservationTimes),
        List(Vec<serde::de::IgnoredAny>),
    }

    match Option::<Repr>::deserialize(deserializer)? {
        None => Ok(ReservationTimes::new()),
        Some(Repr::Map(times)) => Ok(times),
        Some(Repr::List(items)) if items.is_empty() => Ok(ReservationTimes::new()),
        Some(Repr::List(_)) => Err(serde::de::Error::custom(
            "reservation_times must be an object keyed by weekday",
        )),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn table(id: &str, section: &str, accepts: bool) -> serde_json::Value {
        json!({
            "id": id,
            "section_id": section,
            "name": format!("T-{id}"),
            "seats": 4,
            "accepts_reservations": accepts
        })
    }

    fn branch_json() -> serde_json::Value {
        json!({
            "id": "b1",
            "name": "Downtown",
            "reference": "B01",
            "type": 1,
            "opening_from": "09:00",
            "opening_to": "23:00",
            "receives_online_orders": true,
            "accepts_reservations": true,
            "reservation_duration": 60,
            "reservation_times": {
                "monday": [["09:00", "12:00"], ["18:00", "22:00"]],
                "friday": [["12:00", "23:00"]]
            },
            "sections": [
                { "id": "s1", "branch_id": "b1", "name": "Main", "tables": [table("t1", "s1", true), table("t2", "s1", false)] },
                { "id": "s2", "branch_id": "b1", "name": "Patio", "tables": [table("t3", "s2", true)] }
            ]
        })
    }

    #[test]
    fn branch_decodes_nested_sections_and_windows() {
        let branch: Branch = serde_json::from_value(branch_json()).unwrap();
        assert_eq!(branch.sections.len(), 2);
        assert_eq!(branch.sections[0].tables.len(), 2);
        assert_eq!(branch.kind, 1);
        let monday = &branch.reservation_times[&Weekday::Monday];
        assert_eq!(monday, &vec![TimeRange::new("09:00", "12:00"), TimeRange::new("18:00", "22:00")]);
        assert_eq!(branch.number_of_tables, None);
    }

    #[test]
    fn reservable_table_count_spans_sections() {
        let branch: Branch = serde_json::from_value(branch_json()).unwrap();
        assert_eq!(branch.reservable_table_count(), 2);
    }

    #[test]
    fn reservable_table_count_is_zero_without_sections() {
        let mut value = branch_json();
        value.as_object_mut().unwrap().remove("sections");
        let branch: Branch = serde_json::from_value(value).unwrap();
        assert_eq!(branch.reservable_table_count(), 0);
    }

    #[test]
    fn empty_array_reservation_times_is_empty_map() {
        let mut value = branch_json();
        value["reservation_times"] = json!([]);
        let branch: Branch = serde_json::from_value(value).unwrap();
        assert!(branch.reservation_times.is_empty());

        let mut value = branch_json();
        value["reservation_times"] = json!(null);
        let branch: Branch = serde_json::from_value(value).unwrap();
        assert!(branch.reservation_times.is_empty());
    }

    #[test]
    fn non_empty_array_reservation_times_is_rejected() {
        let mut value = branch_json();
        value["reservation_times"] = json!([["09:00", "10:00"]]);
        assert!(serde_json::from_value::<Branch>(value).is_err());
    }

    #[test]
    fn null_sections_and_tables_decode_as_empty() {
        let mut value = branch_json();
        value["sections"] = json!([{ "id": "s1", "branch_id": "b1", "tables": null }]);
        let branch: Branch = serde_json::from_value(value.clone()).unwrap();
        assert!(branch.sections[0].tables.is_empty());

        value["sections"] = json!(null);
        let branch: Branch = serde_json::from_value(value).unwrap();
        assert!(branch.sections.is_empty());
    }

    #[test]
    fn number_of_tables_is_never_serialized_or_read() {
        let mut value = branch_json();
        value["number_of_tables"] = json!(99);
        let mut branch: Branch = serde_json::from_value(value).unwrap();
        assert_eq!(branch.number_of_tables, None);

        branch.number_of_tables = Some(2);
        let out = serde_json::to_value(&branch).unwrap();
        assert!(out.get("number_of_tables").is_none());
    }

    #[test]
    fn table_options_label_tables_with_their_section() {
        let branch: Branch = serde_json::from_value(branch_json()).unwrap();
        let options = branch.table_options();
        assert_eq!(options.len(), 3);
        assert_eq!(
            options[2],
            TableOption {
                id: "t3".to_string(),
                section_name: "Patio".to_string(),
                table_name: "T-t3".to_string(),
            }
        );
    }

    #[test]
    fn form_from_branch_selects_reservable_tables() {
        let branch: Branch = serde_json::from_value(branch_json()).unwrap();
        let form = BranchForm::from_branch(&branch);
        assert_eq!(form.reservation_duration, 60);
        assert_eq!(
            form.table_ids.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["t1", "t3"]
        );
        assert_eq!(form.reservation_times, branch.reservation_times);
    }

    #[test]
    fn form_serializes_to_wire_shape() {
        let mut times = ReservationTimes::new();
        times.insert(Weekday::Sunday, vec![TimeRange::new("10:00", "14:00")]);
        let form = BranchForm {
            reservation_duration: 45,
            table_ids: ["t2".to_string(), "t1".to_string()].into_iter().collect(),
            reservation_times: times,
        };
        let value = serde_json::to_value(&form).unwrap();
        assert_eq!(
            value,
            json!({
                "reservation_duration": 45,
                "table_ids": ["t1", "t2"],
                "reservation_times": { "sunday": [["10:00", "14:00"]] }
            })
        );
    }

    #[test]
    fn page_tolerates_missing_envelope_parts() {
        let page: BranchPage = serde_json::from_value(json!({ "data": [] })).unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.links, PageLinks::default());
        assert_eq!(page.meta.current_page, 0);
    }

    #[test]
    fn weekday_order_starts_on_sunday() {
        let mut sorted = Weekday::ALL;
        sorted.sort();
        assert_eq!(sorted, Weekday::ALL);
        assert_eq!(serde_json::to_value(Weekday::Wednesday).unwrap(), json!("wednesday"));
    }
}
