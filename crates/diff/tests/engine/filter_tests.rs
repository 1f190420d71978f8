use provlink_diff::{DiffKind, DiffOptions};
use provlink_property::map_from_json;
use provlink_schema::{SchemaInfo, SchemaInfoMap};
use serde_json::json;
use tracing_test::traced_test;

use super::common::{assert_entries, diff_json, run, server_schema};

fn rename_cpus() -> SchemaInfoMap {
  SchemaInfoMap::from([("cpus".to_string(), SchemaInfo::renamed("cpuCount"))])
}

// ===========================================================================
// Rename Tests
// ===========================================================================

#[test]
fn renamed_fields_report_under_the_engine_name() {
  let schema = server_schema();
  let old = map_from_json(json!({ "cpus": 2 }));
  let new = map_from_json(json!({ "cpus": 4 }));
  let diff = run(&schema, &rename_cpus(), &old, &new, &new, &DiffOptions::default());
  assert_entries(&diff, &[("cpuCount", DiffKind::Update)]);
}

#[test]
fn renames_apply_inside_blocks() {
  let schema = server_schema();
  let info = SchemaInfoMap::from([(
    "disks".to_string(),
    SchemaInfo::with_elem(SchemaInfo {
      fields: [("size".to_string(), SchemaInfo::renamed("sizeGb"))].into(),
      ..SchemaInfo::default()
    }),
  )]);

  let old = map_from_json(json!({ "disks": [{ "size": 100, "kind": "ssd" }] }));
  let new = map_from_json(json!({ "disks": [{ "size": 200, "kind": "ssd" }] }));
  let diff = run(&schema, &info, &old, &new, &new, &DiffOptions::default());
  assert_entries(&diff, &[("disks[0].sizeGb", DiffKind::Update)]);
}

#[traced_test]
#[test]
fn colliding_renames_merge_and_log() {
  let schema = server_schema();
  // The overlay maps "cpus" onto the name an existing property already uses.
  let info = SchemaInfoMap::from([("cpus".to_string(), SchemaInfo::renamed("name"))]);

  let old = map_from_json(json!({ "cpus": 2, "name": "web-1" }));
  let new = map_from_json(json!({ "cpus": 4, "name": "web-2" }));
  let diff = run(&schema, &info, &old, &new, &new, &DiffOptions::default());

  assert_entries(&diff, &[("name", DiffKind::Update)]);
  assert!(logs_contain("rename collision merged two diff entries"));
}

#[test]
fn map_keys_are_data_and_never_renamed() {
  let schema = server_schema();
  // An element overlay on a map must not touch the keys themselves.
  let info = SchemaInfoMap::from([(
    "tags".to_string(),
    SchemaInfo::with_elem(SchemaInfo::renamed("wrong")),
  )]);

  let old = map_from_json(json!({ "tags": { "env": "prod" } }));
  let new = map_from_json(json!({ "tags": { "env": "staging" } }));
  let diff = run(&schema, &info, &old, &new, &new, &DiffOptions::default());
  assert_entries(&diff, &[("tags.env", DiffKind::Update)]);
}

// ===========================================================================
// Ignore Tests
// ===========================================================================

#[test]
fn ignoring_a_parent_suppresses_the_whole_subtree() {
  let schema = server_schema();
  let diff = diff_json(
    &schema,
    json!({ "name": "web-1", "disks": [{ "size": 100, "kind": "ssd" }] }),
    json!({ "name": "web-2", "disks": [{ "size": 200, "kind": "nvme" }] }),
  );
  assert_eq!(diff.len(), 3);

  let old = map_from_json(json!({ "name": "web-1", "disks": [{ "size": 100, "kind": "ssd" }] }));
  let new = map_from_json(json!({ "name": "web-2", "disks": [{ "size": 200, "kind": "nvme" }] }));
  let options = DiffOptions { ignore_changes: vec!["disks".to_string()], ..DiffOptions::default() };
  let diff = run(&schema, &SchemaInfoMap::new(), &old, &new, &new, &options);
  assert_entries(&diff, &[("name", DiffKind::Update)]);
}

#[test]
fn ignores_match_engine_names_after_renames() {
  let schema = server_schema();
  let old = map_from_json(json!({ "cpus": 2, "name": "web-1" }));
  let new = map_from_json(json!({ "cpus": 4, "name": "web-2" }));
  let options = DiffOptions { ignore_changes: vec!["cpuCount".to_string()], ..DiffOptions::default() };
  let diff = run(&schema, &rename_cpus(), &old, &new, &new, &options);
  assert_entries(&diff, &[("name", DiffKind::Update)]);
}

#[test]
fn ignoring_paths_that_never_diff_changes_nothing() {
  let schema = server_schema();
  let old = map_from_json(json!({ "name": "web-1" }));
  let new = map_from_json(json!({ "name": "web-2" }));
  let options = DiffOptions {
    ignore_changes: vec!["zone".to_string(), "disks[3].size".to_string()],
    ..DiffOptions::default()
  };
  let diff = run(&schema, &SchemaInfoMap::new(), &old, &new, &new, &options);
  assert_entries(&diff, &[("name", DiffKind::Update)]);
}

#[traced_test]
#[test]
fn unparseable_ignore_entries_are_skipped() {
  let schema = server_schema();
  let old = map_from_json(json!({ "name": "web-1" }));
  let new = map_from_json(json!({ "name": "web-2" }));
  let options = DiffOptions { ignore_changes: vec!["disks[".to_string()], ..DiffOptions::default() };
  let diff = run(&schema, &SchemaInfoMap::new(), &old, &new, &new, &options);

  assert_entries(&diff, &[("name", DiffKind::Update)]);
  assert!(logs_contain("skipping unparseable ignore entry"));
}

// ===========================================================================
// Replace Override Tests
// ===========================================================================

#[test]
fn forcing_a_replace_adds_a_marker_when_no_entry_replaces() {
  let schema = server_schema();
  let old = map_from_json(json!({ "name": "web-1" }));
  let new = map_from_json(json!({ "name": "web-2" }));
  let options = DiffOptions { replace_override: Some(true), ..DiffOptions::default() };
  let diff = run(&schema, &SchemaInfoMap::new(), &old, &new, &new, &options);

  assert_entries(&diff, &[("__meta", DiffKind::UpdateReplace), ("name", DiffKind::Update)]);
  assert!(diff.contains_replace());
}

#[test]
fn forcing_a_replace_is_satisfied_by_an_existing_replace_entry() {
  let schema = server_schema();
  let old = map_from_json(json!({ "zone": "eu-west-1a" }));
  let new = map_from_json(json!({ "zone": "us-east-1b" }));
  let options = DiffOptions { replace_override: Some(true), ..DiffOptions::default() };
  let diff = run(&schema, &SchemaInfoMap::new(), &old, &new, &new, &options);

  assert_entries(&diff, &[("zone", DiffKind::UpdateReplace)]);
  assert_eq!(diff.get("__meta"), None);
}

#[test]
fn suppressing_replaces_demotes_every_entry() {
  let schema = server_schema();
  let old = map_from_json(json!({ "zone": "eu-west-1a", "disks": [{ "size": 1, "kind": "ssd" }] }));
  let new = map_from_json(json!({ "zone": "us-east-1b", "disks": [{ "size": 1, "kind": "nvme" }] }));
  let options = DiffOptions { replace_override: Some(false), ..DiffOptions::default() };
  let diff = run(&schema, &SchemaInfoMap::new(), &old, &new, &new, &options);

  assert_entries(&diff, &[("disks[0].kind", DiffKind::Update), ("zone", DiffKind::Update)]);
  assert!(!diff.contains_replace());
}
