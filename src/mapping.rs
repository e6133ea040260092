//! Field mapping between system fields and raw file headers.
//!
//! The optimization backend expects canonical attribute names ("system
//! fields"); uploaded spreadsheets carry whatever column headers the
//! customer uses. A mapping associates the two, per entity (vehicles and
//! consignments), and exists in two wire shapes for the same association:
//!
//! - **external** (what the webhooks speak): raw header -> system field
//! - **internal** (what the editor needs): system field -> raw header
//!
//! The internal shape carries the stronger invariant (a system field may
//! only be mapped once), so all editing happens on it and the external
//! shape is derived at save time. Converting external -> internal is lossy
//! when the external mapping points two headers at the same field: the
//! association is dictionary-shaped, so the collision resolves
//! last-write-wins. That is inherent, documented behavior, not something
//! this module silently repairs (associations are `BTreeMap`s, so the
//! surviving entry is deterministically the lexicographically last header).
//!
//! ## Example
//! ```rust
//! use rpo_console::mapping::{to_external, to_internal, InternalMapping};
//!
//! let mut internal = InternalMapping::new();
//! internal.insert("worker_code".to_string(), "Vehicle ID".to_string());
//!
//! let external = to_external(&internal);
//! assert_eq!(external.get("Vehicle ID").map(String::as_str), Some("worker_code"));
//! assert_eq!(to_internal(&external), internal);
//! ```

use std::collections::BTreeMap;

use crate::error::{ConsoleError, Result};

pub mod store;

// ============================================================================
// System Field Vocabularies
// ============================================================================

/// Canonical consignment attributes the optimization engine understands.
pub const CONSIGNMENT_FIELDS: &[&str] = &[
    "reference_number",
    "origin_details_name",
    "origin_details_phone",
    "origin_details_address_line_1",
    "origin_details_address_line_2",
    "origin_details_pincode",
    "origin_details_city",
    "origin_details_state",
    "destination_details_name",
    "destination_details_phone",
    "destination_details_address_line_1",
    "destination_details_address_line_2",
    "destination_details_pincode",
    "destination_details_city",
    "destination_details_state",
    "destination_details_country",
    "length",
    "width",
    "height",
    "dimension_unit",
    "weight",
    "weight_unit",
    "volume",
    "volume_unit",
    "action_type",
    "declared_value",
    "destination_details_lat",
    "destination_details_lng",
    "origin_details_lat",
    "origin_details_lng",
    "pickup_service_time",
    "service_time",
    "pickup_time_slot_start",
    "pickup_time_slot_end",
    "delivery_time_slot_start",
    "delivery_time_slot_end",
    "constraint_tags",
];

/// Canonical vehicle attributes the optimization engine understands.
pub const VEHICLE_FIELDS: &[&str] = &[
    "worker_code",
    "weight",
    "volume",
    "speed",
    "consignment_capacity",
    "constraint_tags",
    "vehicle_service_time",
    "priority",
    "task_capacity",
    "height",
    "distance",
    "delivery_time_start",
    "delivery_time_end",
    "fixed_cost",
    "variable_cost",
    "trip_id",
    "cost_dimension",
    "length",
    "width",
    "max_cumulative_product_value",
    "max_hub_visit_allowed",
    "vehicle_replicate",
];

/// Which entity a mapping belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Vehicle,
    Consignment,
}

impl EntityKind {
    /// The system-field vocabulary for this entity.
    pub fn vocabulary(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Vehicle => VEHICLE_FIELDS,
            EntityKind::Consignment => CONSIGNMENT_FIELDS,
        }
    }
}

// ============================================================================
// Representations and Conversion
// ============================================================================

/// Editing shape: system field -> raw header. Unique system fields.
pub type InternalMapping = BTreeMap<String, String>;

/// Wire shape: raw header -> system field. Unique headers.
pub type ExternalMapping = BTreeMap<String, String>;

/// Convert the wire shape to the editing shape.
///
/// Linear in the association size. Two external headers pointing at the
/// same system field collapse to one internal entry, last-write-wins (see
/// the module docs).
pub fn to_internal(external: &ExternalMapping) -> InternalMapping {
    external
        .iter()
        .map(|(header, field)| (field.clone(), header.clone()))
        .collect()
}

/// Convert the editing shape back to the wire shape.
///
/// Linear in the association size. Lossless round trip with
/// [`to_internal`] as long as no two fields share a header.
pub fn to_external(internal: &InternalMapping) -> ExternalMapping {
    internal
        .iter()
        .map(|(field, header)| (header.clone(), field.clone()))
        .collect()
}

// ============================================================================
// Editor Operations
// ============================================================================

/// Upsert `assoc[field] = header`.
///
/// The header is free text: values absent from the discovered header set
/// are allowed here and surfaced by [`headers_missing_from_file`] so the
/// UI can flag them instead of rejecting the edit.
pub fn set_header(assoc: &mut InternalMapping, field: &str, header: &str) {
    assoc.insert(field.to_string(), header.to_string());
}

/// Delete the entry for `field`. Returns whether an entry was removed.
pub fn remove_field(assoc: &mut InternalMapping, field: &str) -> bool {
    assoc.remove(field).is_some()
}

/// Add a new association row.
///
/// Rejects an empty field or header, a field outside `vocabulary`, and a
/// field that is already mapped; the uniqueness invariant is reported as
/// a conflict, never resolved by overwriting.
pub fn add_new(
    assoc: &mut InternalMapping,
    vocabulary: &[&str],
    field: &str,
    header: &str,
) -> Result<()> {
    if field.is_empty() || header.is_empty() {
        return Err(ConsoleError::EmptyMappingEntry);
    }
    if !vocabulary.contains(&field) {
        return Err(ConsoleError::UnknownSystemField {
            field: field.to_string(),
        });
    }
    if assoc.contains_key(field) {
        return Err(ConsoleError::FieldAlreadyMapped {
            field: field.to_string(),
        });
    }
    assoc.insert(field.to_string(), header.to_string());
    Ok(())
}

/// Vocabulary entries not currently mapped, in vocabulary order.
///
/// Drives the "add new" selector; shrinks to empty once every field is
/// mapped.
pub fn available_fields<'a>(assoc: &InternalMapping, vocabulary: &[&'a str]) -> Vec<&'a str> {
    vocabulary
        .iter()
        .copied()
        .filter(|field| !assoc.contains_key(*field))
        .collect()
}

/// Mapped headers that do not appear in the discovered raw-file header
/// set. The UI flags these rather than rejecting them.
pub fn headers_missing_from_file(assoc: &InternalMapping, file_headers: &[String]) -> Vec<String> {
    assoc
        .values()
        .filter(|header| !file_headers.iter().any(|h| h == *header))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn internal(entries: &[(&str, &str)]) -> InternalMapping {
        entries
            .iter()
            .map(|(f, h)| (f.to_string(), h.to_string()))
            .collect()
    }

    #[test]
    fn test_round_trip_without_collisions() {
        let original = internal(&[
            ("worker_code", "Vehicle ID"),
            ("weight", "Vehicle Max Weight"),
            ("speed", "Avg Speed"),
        ]);
        assert_eq!(to_internal(&to_external(&original)), original);
    }

    #[test]
    fn test_shared_header_loses_data_on_round_trip() {
        // Two fields pointing at the same header is representable
        // internally, but the external shape keys by header, so one entry
        // must win. The surviving field is the lexicographically last one
        // (BTreeMap iteration order), and the round trip shrinks by one:
        // documented loss, not a crash.
        let original = internal(&[("weight", "Capacity"), ("volume", "Capacity")]);

        let external = to_external(&original);
        assert_eq!(external.len(), 1);
        assert_eq!(external.get("Capacity").map(String::as_str), Some("weight"));

        let back = to_internal(&external);
        assert_eq!(back.len(), 1);
        assert_ne!(back, original);
    }

    #[test]
    fn test_duplicate_external_headers_cannot_exist() {
        // The external shape itself cannot hold two entries for one
        // header; parsing such JSON keeps the last value. The lossy
        // direction is therefore internal -> external only.
        let json = r#"{"Capacity": "weight", "Capacity": "volume"}"#;
        let external: ExternalMapping = serde_json::from_str(json).unwrap();
        assert_eq!(external.len(), 1);
    }

    #[test]
    fn test_set_header_upserts() {
        let mut assoc = internal(&[("worker_code", "Vehicle ID")]);
        set_header(&mut assoc, "worker_code", "Fleet Number");
        set_header(&mut assoc, "speed", "Avg Speed");

        assert_eq!(assoc.get("worker_code").map(String::as_str), Some("Fleet Number"));
        assert_eq!(assoc.len(), 2);
    }

    #[test]
    fn test_remove_field() {
        let mut assoc = internal(&[("worker_code", "Vehicle ID")]);
        assert!(remove_field(&mut assoc, "worker_code"));
        assert!(!remove_field(&mut assoc, "worker_code"));
        assert!(assoc.is_empty());
    }

    #[test]
    fn test_add_new_validations() {
        let mut assoc = internal(&[("worker_code", "Vehicle ID")]);

        assert_eq!(
            add_new(&mut assoc, VEHICLE_FIELDS, "", "Header"),
            Err(ConsoleError::EmptyMappingEntry)
        );
        assert_eq!(
            add_new(&mut assoc, VEHICLE_FIELDS, "speed", ""),
            Err(ConsoleError::EmptyMappingEntry)
        );
        assert_eq!(
            add_new(&mut assoc, VEHICLE_FIELDS, "not_a_field", "Header"),
            Err(ConsoleError::UnknownSystemField {
                field: "not_a_field".to_string()
            })
        );
        // Refuses to overwrite an existing association.
        assert_eq!(
            add_new(&mut assoc, VEHICLE_FIELDS, "worker_code", "Other"),
            Err(ConsoleError::FieldAlreadyMapped {
                field: "worker_code".to_string()
            })
        );
        assert_eq!(assoc.get("worker_code").map(String::as_str), Some("Vehicle ID"));

        assert!(add_new(&mut assoc, VEHICLE_FIELDS, "speed", "Avg Speed").is_ok());
        assert_eq!(assoc.len(), 2);
    }

    #[test]
    fn test_available_fields_shrinks_and_grows() {
        let mut assoc = InternalMapping::new();
        let before = available_fields(&assoc, VEHICLE_FIELDS).len();
        assert_eq!(before, VEHICLE_FIELDS.len());

        add_new(&mut assoc, VEHICLE_FIELDS, "speed", "Avg Speed").unwrap();
        let after_add = available_fields(&assoc, VEHICLE_FIELDS);
        assert_eq!(after_add.len(), before - 1);
        assert!(!after_add.contains(&"speed"));

        remove_field(&mut assoc, "speed");
        assert_eq!(available_fields(&assoc, VEHICLE_FIELDS).len(), before);
    }

    #[test]
    fn test_available_fields_empty_when_fully_mapped() {
        let mut assoc = InternalMapping::new();
        for field in VEHICLE_FIELDS {
            set_header(&mut assoc, field, "col");
        }
        assert!(available_fields(&assoc, VEHICLE_FIELDS).is_empty());
    }

    #[test]
    fn test_headers_missing_from_file() {
        let assoc = internal(&[
            ("worker_code", "Vehicle ID"),
            ("weight", "Legacy Capacity Column"),
        ]);
        let file_headers = vec!["Vehicle ID".to_string(), "Driver Name".to_string()];

        let missing = headers_missing_from_file(&assoc, &file_headers);
        assert_eq!(missing, vec!["Legacy Capacity Column".to_string()]);
    }

    #[test]
    fn test_vocabularies_have_no_duplicates() {
        for vocab in [VEHICLE_FIELDS, CONSIGNMENT_FIELDS] {
            let mut seen = std::collections::BTreeSet::new();
            for field in vocab {
                assert!(seen.insert(*field), "duplicate vocabulary entry: {}", field);
            }
        }
    }
}
