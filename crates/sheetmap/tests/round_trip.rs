use chrono::NaiveDate;
use sheetmap::{
    DateKind, FieldValues, MapRegistry, Mapper, Optional, PropertyMap, ReadingResultKind,
    ResourceMap,
};
use sheetmap_workbook::{CsvReader, CsvWriter, MemorySheet};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq)]
struct Pair {
    id: i64,
    name: String,
}

fn pair_map() -> ResourceMap<Pair> {
    ResourceMap::builder("pairs")
        .property(PropertyMap::new("Id", |p: &Pair| p.id, |p, v| p.id = v).column(1))
        .property(PropertyMap::new("Name", |p: &Pair| p.name.clone(), |p, v| p.name = v).column(2))
        .build()
        .unwrap()
}

fn mapper_for<T: 'static>(map: ResourceMap<T>) -> Mapper {
    let registry = MapRegistry::builder().insert(map).unwrap().build();
    Mapper::new(Arc::new(registry))
}

#[test]
fn id_name_pairs_round_trip_through_memory() {
    let mapper = mapper_for(pair_map());
    let input = vec![
        Pair {
            id: 1,
            name: "A".into(),
        },
        Pair {
            id: 2,
            name: "B".into(),
        },
    ];

    let mut sheet = MemorySheet::new();
    mapper.write(&mut sheet, &input).unwrap();
    assert_eq!(sheet.row_text(1), ["Id", "Name"]);
    assert_eq!(sheet.row_text(2), ["1", "A"]);
    assert_eq!(sheet.row_text(3), ["2", "B"]);
    assert_eq!(sheet.shared_strings(), ["Id", "Name", "A", "B"]);

    let result = mapper.read::<Pair, _>(&mut sheet).unwrap();
    assert_eq!(result.kind(), ReadingResultKind::Success);
    let rows: Vec<u32> = result.resources().iter().map(|n| n.row).collect();
    assert_eq!(rows, [2, 3]);
    assert_eq!(result.into_values(), input);
}

#[test]
fn empty_text_survives_the_round_trip() {
    let mapper = mapper_for(pair_map());
    let input = vec![
        Pair {
            id: 1,
            name: String::new(),
        },
        Pair {
            id: 2,
            name: "B".into(),
        },
    ];

    let mut sheet = MemorySheet::new();
    mapper.write(&mut sheet, &input).unwrap();
    assert_eq!(sheet.shared_strings(), ["Id", "Name", "B"]);
    let result = mapper.read::<Pair, _>(&mut sheet).unwrap();
    assert_eq!(result.kind(), ReadingResultKind::Success);
    assert_eq!(result.into_values(), input);

    let mut writer = CsvWriter::in_memory();
    mapper.write(&mut writer, &input).unwrap();
    let mut source = CsvReader::open_bytes(writer.finish().unwrap()).unwrap();
    let result = mapper.read::<Pair, _>(&mut source).unwrap();
    assert_eq!(result.into_values(), input);
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Label {
    text: String,
}

#[test]
fn row_of_only_empty_text_is_not_skipped() {
    let map = ResourceMap::builder("labels")
        .property(PropertyMap::new("Text", |l: &Label| l.text.clone(), |l, v| l.text = v))
        .build()
        .unwrap();
    let mapper = mapper_for(map);
    let input = vec![
        Label::default(),
        Label {
            text: "tail".into(),
        },
    ];
    let mut sheet = MemorySheet::new();
    mapper.write(&mut sheet, &input).unwrap();
    let result = mapper.read::<Label, _>(&mut sheet).unwrap();
    let rows: Vec<u32> = result.resources().iter().map(|n| n.row).collect();
    assert_eq!(rows, [2, 3]);
    assert_eq!(result.into_values(), input);
}

#[test]
fn empty_input_writes_only_the_header() {
    let mapper = mapper_for(pair_map());
    let mut sheet = MemorySheet::new();
    mapper.write::<Pair, _>(&mut sheet, &[]).unwrap();
    assert_eq!(sheet.dimensions(), Some((1, 2)));

    let result = mapper.read::<Pair, _>(&mut sheet).unwrap();
    assert!(result.is_success());
    assert!(result.resources().is_empty());
}

#[derive(Debug, Clone, PartialEq)]
struct Employee {
    id: u32,
    name: String,
    hired: NaiveDate,
    active: bool,
    rate: f64,
    nickname: Option<String>,
}

fn employee_map() -> ResourceMap<Employee> {
    ResourceMap::builder_with("employees", ["id", "name"], |fields: &mut FieldValues| {
        Ok(Employee {
            id: fields.take("id")?,
            name: fields.take("name")?,
            hired: NaiveDate::MIN,
            active: false,
            rate: 0.0,
            nickname: None,
        })
    })
    .property(PropertyMap::new("Employee Id", |e: &Employee| e.id, |_, _: u32| {}).member("id"))
    .property(PropertyMap::new("Name", |e: &Employee| e.name.clone(), |_, _: String| {}).member("name"))
    .property(
        PropertyMap::new("Hired", |e: &Employee| e.hired, |e, v| e.hired = v)
            .date_kind(DateKind::Text),
    )
    .property(PropertyMap::new("Active", |e: &Employee| e.active, |e, v| e.active = v))
    .property(PropertyMap::new("Rate", |e: &Employee| e.rate, |e, v| e.rate = v))
    .property(
        PropertyMap::new("Nickname", |e: &Employee| e.nickname.clone(), |e, v| e.nickname = v)
            .optional(Optional::Body),
    )
    .build()
    .unwrap()
}

fn employees() -> Vec<Employee> {
    vec![
        Employee {
            id: 10,
            name: "Ada".into(),
            hired: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
            active: true,
            rate: 41.5,
            nickname: None,
        },
        Employee {
            id: 11,
            name: "Grace, R.".into(),
            hired: NaiveDate::from_ymd_opt(1999, 12, 31).unwrap(),
            active: false,
            rate: 38.0,
            nickname: Some("Amazing".into()),
        },
    ]
}

#[test]
fn explicit_constructor_round_trips_through_csv_file() {
    let mapper = mapper_for(employee_map());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("employees.csv");

    let mut writer = CsvWriter::create(&path).unwrap();
    mapper.write(&mut writer, &employees()).unwrap();
    writer.finish().unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let first_lines: Vec<&str> = text.lines().take(2).collect();
    assert_eq!(
        first_lines,
        [
            "Employee Id,Name,Hired,Active,Rate,Nickname",
            "10,Ada,2024-02-29,TRUE,41.5,"
        ]
    );

    let mut reader = CsvReader::open_path(&path).unwrap();
    let result = mapper.read::<Employee, _>(&mut reader).unwrap();
    assert_eq!(result.kind(), ReadingResultKind::Success);
    assert_eq!(result.into_values(), employees());
}

#[test]
fn serial_dates_round_trip() {
    #[derive(Debug, Default, PartialEq)]
    struct Stamp {
        day: NaiveDate,
    }
    let mapper = mapper_for(
        ResourceMap::builder("stamps")
            .property(
                PropertyMap::new("Day", |s: &Stamp| s.day, |s, v| s.day = v)
                    .date_kind(DateKind::Serial),
            )
            .build()
            .unwrap(),
    );
    let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    let mut sheet = MemorySheet::new();
    mapper.write(&mut sheet, &[Stamp { day }]).unwrap();
    assert_eq!(sheet.row_text(2), ["45351"]);
    let read = mapper.read::<Stamp, _>(&mut sheet).unwrap();
    assert_eq!(read.into_values(), vec![Stamp { day }]);
}
