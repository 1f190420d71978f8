use provlink_diff::{DetailedDiff, DiffKind, DiffOptions, compute_detailed_diff};
use provlink_property::{PropertyMap, map_from_json};
use provlink_schema::{Schema, SchemaElem, SchemaInfoMap, SchemaMap};

/// A server-ish resource schema exercising scalars, force-new, computed
/// attributes, lists of blocks, sets, maps, and a flattened block.
pub fn server_schema() -> SchemaMap {
  SchemaMap::from([
    ("name".to_string(), Schema::string()),
    ("zone".to_string(), Schema::string().force_new()),
    ("cpus".to_string(), Schema::int()),
    ("ip".to_string(), Schema::string().computed()),
    ("tags".to_string(), Schema::map().with_elem(SchemaElem::Value(Box::new(Schema::string())))),
    ("ports".to_string(), Schema::set_of(Schema::int())),
    (
      "disks".to_string(),
      Schema::list().with_elem(SchemaElem::Fields(SchemaMap::from([
        ("size".to_string(), Schema::int()),
        ("kind".to_string(), Schema::string().force_new()),
      ]))),
    ),
    (
      "network".to_string(),
      Schema::list().max_items_one().with_elem(SchemaElem::Fields(SchemaMap::from([
        ("subnet".to_string(), Schema::string()),
        ("gateway".to_string(), Schema::string()),
      ]))),
    ),
    (
      "rules".to_string(),
      Schema::set().with_elem(SchemaElem::Fields(SchemaMap::from([
        ("port".to_string(), Schema::int()),
        ("action".to_string(), Schema::string()),
      ]))),
    ),
  ])
}

/// Diffs two JSON states under `schema`, with the new state doubling as the
/// planned state and the declared inputs.
pub fn diff_json(
  schema: &SchemaMap,
  old: serde_json::Value,
  new: serde_json::Value,
) -> DetailedDiff {
  let new_map = map_from_json(new);
  let old_map = map_from_json(old);
  run(schema, &SchemaInfoMap::new(), &old_map, &new_map, &new_map, &DiffOptions::default())
}

pub fn run(
  schema: &SchemaMap,
  info: &SchemaInfoMap,
  old: &PropertyMap,
  planned: &PropertyMap,
  inputs: &PropertyMap,
  options: &DiffOptions,
) -> DetailedDiff {
  compute_detailed_diff(schema, info, old, planned, inputs, options).unwrap()
}

/// Asserts the diff holds exactly `expected`, in path order.
pub fn assert_entries(diff: &DetailedDiff, expected: &[(&str, DiffKind)]) {
  let actual: Vec<(&str, DiffKind)> = diff.entries().collect();
  assert_eq!(actual, expected, "diff entries mismatch");
}
