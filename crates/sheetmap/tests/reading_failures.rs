use sheetmap::{
    MapRegistry, Mapper, MapperConfig, Optional, PropertyMap, ReadingFailurePolicy,
    ReadingResolution, ReadingResultKind, ResourceMap,
};
use sheetmap_workbook::{CsvReader, MemorySheet};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq)]
struct Item {
    sku: String,
    qty: i64,
    price: f64,
}

fn item_builder() -> sheetmap::ResourceMapBuilder<Item> {
    ResourceMap::builder("items")
        .property(PropertyMap::new("Sku", |i: &Item| i.sku.clone(), |i, v| i.sku = v))
        .property(PropertyMap::new("Qty", |i: &Item| i.qty, |i, v| i.qty = v))
        .property(PropertyMap::new("Price", |i: &Item| i.price, |i, v| i.price = v))
}

fn mapper(map: ResourceMap<Item>) -> Mapper {
    mapper_with(map, MapperConfig::default())
}

fn mapper_with(map: ResourceMap<Item>, config: MapperConfig) -> Mapper {
    let registry = MapRegistry::builder().insert(map).unwrap().build();
    Mapper::with_config(Arc::new(registry), config)
}

fn sheet(rows: &[&[&str]]) -> MemorySheet {
    MemorySheet::from_rows(rows.iter().map(|r| r.iter().copied()))
}

#[test]
fn absent_header_row_is_a_failure_without_mismatches() {
    let mut source = sheet(&[&[], &["a-1", "2", "1.5"]]);
    let result = mapper(item_builder().build().unwrap())
        .read::<Item, _>(&mut source)
        .unwrap();
    assert_eq!(result.kind(), ReadingResultKind::Failure);
    let header = result.header_failure().unwrap();
    assert!(header.missing_header_row());
    assert!(header.missing_headers().is_empty());
    assert!(header.invalid_headers().is_empty());
}

#[test]
fn missing_and_renamed_headers_are_reported_by_column() {
    let mut source = sheet(&[&["Sku", "Quantity"], &["a-1", "2", "1.5"]]);
    let result = mapper(item_builder().build().unwrap())
        .read::<Item, _>(&mut source)
        .unwrap();
    let header = result.header_failure().unwrap();
    assert!(!header.missing_header_row());
    assert_eq!(header.invalid_headers().len(), 1);
    assert_eq!(header.invalid_headers()[0].name, "Qty");
    assert_eq!(header.invalid_headers()[0].found, "Quantity");
    assert_eq!(header.missing_headers().len(), 1);
    assert_eq!(header.missing_headers()[0].column, 3);
    assert!(result.resources().is_empty());
    assert!(result.resource_failures().is_empty());
}

#[test]
fn missing_cell_with_continue_policy_is_partial_failure() {
    let mut source = sheet(&[
        &["Sku", "Qty", "Price"],
        &["a-1", "2", "1.5"],
        &["a-2", "", "3"],
        &["a-3", "4", "2"],
    ]);
    let result = mapper(item_builder().build().unwrap())
        .read::<Item, _>(&mut source)
        .unwrap();
    assert_eq!(result.kind(), ReadingResultKind::PartialFailure);

    let failures = result.resource_failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].row, 3);
    assert_eq!(failures[0].missing[0].name, "Qty");
    assert_eq!(failures[0].missing[0].column, 2);
    assert!(failures[0].invalid.is_empty());

    let rows: Vec<u32> = result.resources().iter().map(|n| n.row).collect();
    assert_eq!(rows, [2, 4]);
}

#[test]
fn exit_policy_stops_at_first_failed_row() {
    let mut source = sheet(&[
        &["Sku", "Qty", "Price"],
        &["a-1", "2", "1.5"],
        &["a-2", "two", "3"],
        &["a-3", "4", "2"],
    ]);
    let map = item_builder()
        .failure_policy(ReadingFailurePolicy::ExitOnFirstFailure)
        .build()
        .unwrap();
    let result = mapper(map).read::<Item, _>(&mut source).unwrap();
    assert_eq!(result.kind(), ReadingResultKind::PartialFailure);
    assert_eq!(result.resources().len(), 1);
    assert_eq!(result.resource_failures().len(), 1);
    assert_eq!(result.resource_failures()[0].invalid[0].text, "two");
}

#[test]
fn configured_policy_applies_when_map_sets_none() {
    let mut source = sheet(&[
        &["Sku", "Qty", "Price"],
        &["a-1", "x", "1.5"],
        &["a-2", "y", "3"],
    ]);
    let config = MapperConfig {
        failure_policy: ReadingFailurePolicy::ExitOnFirstFailure,
        ..MapperConfig::default()
    };
    let result = mapper_with(item_builder().build().unwrap(), config)
        .read::<Item, _>(&mut source)
        .unwrap();
    assert_eq!(result.kind(), ReadingResultKind::Failure);
    assert_eq!(result.resource_failures().len(), 1);
}

#[test]
fn all_rows_failing_is_failure() {
    let mut source = sheet(&[&["Sku", "Qty", "Price"], &["a-1", "1", "cheap"], &["", "2", "3"]]);
    let result = mapper(item_builder().build().unwrap())
        .read::<Item, _>(&mut source)
        .unwrap();
    assert_eq!(result.kind(), ReadingResultKind::Failure);
    assert_eq!(result.resource_failures().len(), 2);
    assert_eq!(result.resource_failures()[1].missing[0].name, "Sku");
}

#[test]
fn defaults_fill_missing_and_invalid_values() {
    let map = ResourceMap::builder("items")
        .property(PropertyMap::new("Sku", |i: &Item| i.sku.clone(), |i, v| i.sku = v))
        .property(PropertyMap::new("Qty", |i: &Item| i.qty, |i, v| i.qty = v).default_value(1_i64))
        .property(
            PropertyMap::new("Price", |i: &Item| i.price, |i, v| i.price = v)
                .default_value(0.0)
                .default_reading_resolution(ReadingResolution::INVALID_VALUE),
        )
        .build()
        .unwrap();
    let mut source = sheet(&[
        &["Sku", "Qty", "Price"],
        &["a-1", "", "n/a"],
        &["a-2", "bad", "2"],
    ]);
    let result = mapper(map).read::<Item, _>(&mut source).unwrap();
    assert_eq!(result.kind(), ReadingResultKind::PartialFailure);
    assert_eq!(
        result.resources()[0].resource,
        Item {
            sku: "a-1".into(),
            qty: 1,
            price: 0.0
        }
    );
    // Qty only defaults when missing; invalid text still fails.
    assert_eq!(result.resource_failures()[0].row, 3);
    assert_eq!(result.resource_failures()[0].invalid[0].name, "Qty");
}

#[test]
fn default_covers_missing_header_when_allowed() {
    let map = ResourceMap::builder("items")
        .property(PropertyMap::new("Sku", |i: &Item| i.sku.clone(), |i, v| i.sku = v))
        .property(
            PropertyMap::new("Qty", |i: &Item| i.qty, |i, v| i.qty = v)
                .default_value(5_i64)
                .default_reading_resolution(
                    ReadingResolution::MISSING_HEADER | ReadingResolution::MISSING_VALUE,
                ),
        )
        .build()
        .unwrap();
    let mut source = sheet(&[&["Sku"], &["a-1"], &["a-2"]]);
    let result = mapper(map).read::<Item, _>(&mut source).unwrap();
    assert!(result.is_success());
    let qty: Vec<i64> = result.resources().iter().map(|n| n.resource.qty).collect();
    assert_eq!(qty, [5, 5]);
}

#[test]
fn optional_body_cells_may_be_blank() {
    let map = ResourceMap::builder("items")
        .property(PropertyMap::new("Sku", |i: &Item| i.sku.clone(), |i, v| i.sku = v))
        .property(PropertyMap::new("Qty", |i: &Item| i.qty, |i, v| i.qty = v).optional(Optional::Body))
        .build()
        .unwrap();
    let mut source = sheet(&[&["Sku", "Qty"], &["a-1"]]);
    let result = mapper(map).read::<Item, _>(&mut source).unwrap();
    assert!(result.is_success());
    assert_eq!(result.resources()[0].resource.qty, 0);

    // Optional for the body only: the header is still required.
    let map = ResourceMap::builder("items")
        .property(PropertyMap::new("Sku", |i: &Item| i.sku.clone(), |i, v| i.sku = v))
        .property(PropertyMap::new("Qty", |i: &Item| i.qty, |i, v| i.qty = v).optional(Optional::Body))
        .build()
        .unwrap();
    let mut source = sheet(&[&["Sku"], &["a-1"]]);
    let result = mapper(map).read::<Item, _>(&mut source).unwrap();
    assert_eq!(result.header_failure().unwrap().missing_headers()[0].name, "Qty");
}

#[test]
fn header_row_option_and_trimmed_cells() {
    let data = b"report,,\nSku,Qty,Price\n a-1 , 2 , 1.5 \n".to_vec();
    let mut source = CsvReader::open_bytes(data).unwrap();
    let map = item_builder().header_row(2).build().unwrap();
    let config = MapperConfig {
        trim_cells: true,
        ..MapperConfig::default()
    };
    let result = mapper_with(map, config).read::<Item, _>(&mut source).unwrap();
    assert!(result.is_success());
    assert_eq!(
        result.into_values(),
        vec![Item {
            sku: "a-1".into(),
            qty: 2,
            price: 1.5
        }]
    );
}
