use provlink_diff::{DiffChanges, DiffError, DiffKind, DiffOptions, compute_detailed_diff};
use provlink_property::{PropertyValue, map_from_json};
use provlink_schema::{Schema, SchemaInfo, SchemaInfoMap, SchemaKind, SchemaMap};
use serde_json::json;

use super::common::{assert_entries, diff_json, run, server_schema};

#[test]
fn identical_states_have_no_diff() {
  let schema = server_schema();
  let state = json!({
    "name": "web-1",
    "zone": "eu-west-1a",
    "cpus": 4,
    "tags": { "env": "prod" },
    "ports": [80, 443],
    "disks": [{ "size": 100, "kind": "ssd" }]
  });

  let diff = diff_json(&schema, state.clone(), state);
  assert!(diff.is_empty());
  assert_eq!(diff.changes(), DiffChanges::None);
}

#[test]
fn scalar_changes_classify_by_presence() {
  let schema = server_schema();

  let diff = diff_json(&schema, json!({ "name": "web-1" }), json!({ "name": "web-2" }));
  assert_entries(&diff, &[("name", DiffKind::Update)]);

  let diff = diff_json(&schema, json!({ "name": "web-1" }), json!({ "name": "web-1", "cpus": 4 }));
  assert_entries(&diff, &[("cpus", DiffKind::Add)]);

  let diff = diff_json(&schema, json!({ "name": "web-1", "cpus": 4 }), json!({ "name": "web-1" }));
  assert_entries(&diff, &[("cpus", DiffKind::Delete)]);

  assert!(diff.has_changes());
  assert_eq!(diff.changes(), DiffChanges::Some);
}

#[test]
fn force_new_fields_replace_instead_of_update() {
  let schema = server_schema();

  let diff = diff_json(&schema, json!({ "zone": "eu-west-1a" }), json!({ "zone": "us-east-1b" }));
  assert_entries(&diff, &[("zone", DiffKind::UpdateReplace)]);

  let diff = diff_json(&schema, json!({}), json!({ "zone": "us-east-1b" }));
  assert_entries(&diff, &[("zone", DiffKind::AddReplace)]);

  let diff = diff_json(&schema, json!({ "zone": "eu-west-1a" }), json!({}));
  assert_entries(&diff, &[("zone", DiffKind::DeleteReplace)]);
}

#[test]
fn overlay_force_new_overrides_the_schema_both_ways() {
  let schema = server_schema();

  let mut info = SchemaInfoMap::new();
  info.insert("zone".to_string(), SchemaInfo::forces_new(false));
  let old = map_from_json(json!({ "zone": "eu-west-1a" }));
  let new = map_from_json(json!({ "zone": "us-east-1b" }));
  let diff = run(&schema, &info, &old, &new, &new, &DiffOptions::default());
  assert_entries(&diff, &[("zone", DiffKind::Update)]);

  let mut info = SchemaInfoMap::new();
  info.insert("name".to_string(), SchemaInfo::forces_new(true));
  let old = map_from_json(json!({ "name": "web-1" }));
  let new = map_from_json(json!({ "name": "web-2" }));
  let diff = run(&schema, &info, &old, &new, &new, &DiffOptions::default());
  assert_entries(&diff, &[("name", DiffKind::UpdateReplace)]);
}

#[test]
fn unknown_new_values_always_read_as_changed() {
  let schema = server_schema();
  let info = SchemaInfoMap::new();

  let old = map_from_json(json!({ "name": "web-1" }));
  let mut new = old.clone();
  new.insert("name".to_string(), PropertyValue::Computed);
  let diff = run(&schema, &info, &old, &new, &new, &DiffOptions::default());
  assert_entries(&diff, &[("name", DiffKind::Update)]);

  // An unknown value appearing where nothing was is still an add.
  let old = map_from_json(json!({}));
  let diff = run(&schema, &info, &old, &new, &new, &DiffOptions::default());
  assert_entries(&diff, &[("name", DiffKind::Add)]);

  // Force-new flavors the coerced kinds as usual.
  let old = map_from_json(json!({ "zone": "eu-west-1a" }));
  let mut new = old.clone();
  new.insert("zone".to_string(), PropertyValue::Computed);
  let diff = run(&schema, &info, &old, &new, &new, &DiffOptions::default());
  assert_entries(&diff, &[("zone", DiffKind::UpdateReplace)]);
}

#[test]
fn output_only_attributes_reasserted_by_the_provider_are_not_changes() {
  let schema = SchemaMap::from([
    ("prop".to_string(), Schema::string()),
    ("outp".to_string(), Schema::string().computed()),
  ]);

  let diff = diff_json(&schema, json!({ "prop": "foo", "outp": "bar" }), json!({ "prop": "foo" }));
  assert!(diff.is_empty());
  assert_eq!(diff.changes(), DiffChanges::None);
}

#[test]
fn real_changes_to_computed_attributes_still_report() {
  let schema = server_schema();
  let diff = diff_json(&schema, json!({ "ip": "10.0.0.5" }), json!({ "ip": "10.0.0.9" }));
  assert_entries(&diff, &[("ip", DiffKind::Update)]);
}

#[test]
fn properties_outside_the_schema_compare_plainly() {
  let schema = server_schema();

  let diff = diff_json(&schema, json!({ "mystery": "a" }), json!({ "mystery": "b" }));
  assert_entries(&diff, &[("mystery", DiffKind::Update)]);

  let diff = diff_json(&schema, json!({}), json!({ "mystery": { "deep": 1 } }));
  assert_entries(&diff, &[("mystery", DiffKind::Add)]);
}

#[test]
fn reserved_bookkeeping_keys_never_surface() {
  let schema = server_schema();
  let diff = diff_json(
    &schema,
    json!({ "name": "web-1", "__defaults": ["cpus"], "__meta": { "rev": 1 } }),
    json!({ "name": "web-1", "__defaults": [], "__meta": { "rev": 2 } }),
  );
  assert!(diff.is_empty());
}

#[test]
fn secret_wrappers_do_not_mask_equality() {
  let schema = server_schema();
  let info = SchemaInfoMap::new();

  let mut old = map_from_json(json!({}));
  old.insert("name".to_string(), PropertyValue::Secret(Box::new(PropertyValue::String("web-1".to_string()))));
  let new = map_from_json(json!({ "name": "web-1" }));
  let diff = run(&schema, &info, &old, &new, &new, &DiffOptions::default());
  assert!(diff.is_empty());

  let new = map_from_json(json!({ "name": "web-2" }));
  let diff = run(&schema, &info, &old, &new, &new, &DiffOptions::default());
  assert_entries(&diff, &[("name", DiffKind::Update)]);
}

#[test]
fn explicit_null_reads_as_absent() {
  let schema = server_schema();
  let diff = diff_json(&schema, json!({}), json!({ "cpus": null }));
  assert!(diff.is_empty());
}

#[test]
fn contradictory_type_override_is_a_hard_error() {
  // The overlay insists this string is a map, so the walk descends into its
  // keys and hits the scalar schema underneath.
  let schema = SchemaMap::from([("opts".to_string(), Schema::string())]);
  let mut info = SchemaInfoMap::new();
  info.insert("opts".to_string(), SchemaInfo { type_override: Some(SchemaKind::Map), ..SchemaInfo::default() });

  let old = map_from_json(json!({ "opts": { "a": "1" } }));
  let new = map_from_json(json!({ "opts": { "a": "2" } }));
  let result =
    compute_detailed_diff(&schema, &info, &old, &new, &new, &DiffOptions::default());
  assert!(matches!(result, Err(DiffError::Schema(_))));
}
