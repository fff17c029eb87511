use sheetmap_workbook::{
    CellData, CellValue, CsvReadOptions, CsvReader, CsvTrim, CsvWriter, SheetReader, SheetWriter,
};

#[test]
fn csv_file_roundtrip_preserves_positions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("people.csv");

    let mut writer = CsvWriter::create(&path).unwrap();
    writer.advance_to_row(2).unwrap();
    writer.write_cell(CellData::from_value("Id")).unwrap();
    writer.write_cell(CellData::from_value("Name")).unwrap();
    writer.advance_to_row(3).unwrap();
    writer.write_cell(CellData::from_value(1_i64)).unwrap();
    writer.write_cell(CellData::from_value("Ada")).unwrap();
    writer.advance_to_row(4).unwrap();
    writer.advance_to_column(2).unwrap();
    writer.write_cell(CellData::from_value("Grace")).unwrap();
    writer.finish().unwrap();

    let mut reader = CsvReader::open_path(&path).unwrap();
    assert!(reader.read_row(1).unwrap().is_none());
    let header = reader.read_row(2).unwrap().unwrap();
    assert_eq!(header.values().cloned().collect::<Vec<_>>(), ["Id", "Name"]);

    let (row, cells) = reader.next_row().unwrap().unwrap();
    assert_eq!(row, 3);
    assert_eq!(cells.get(&1).map(String::as_str), Some("1"));

    let (row, cells) = reader.next_row().unwrap().unwrap();
    assert_eq!(row, 4);
    assert_eq!(cells.get(&1).map(String::as_str), Some(""));
    assert_eq!(cells.get(&2).map(String::as_str), Some("Grace"));
    assert!(reader.next_row().unwrap().is_none());
}

#[test]
fn csv_dates_are_written_as_iso_text() {
    let mut writer = CsvWriter::in_memory();
    let date = chrono::NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    writer
        .write_cell(CellData::from_value(CellValue::Date(date)))
        .unwrap();
    writer.write_cell(CellData::from_value(true)).unwrap();
    let out = String::from_utf8(writer.finish().unwrap()).unwrap();
    assert_eq!(out, "2024-02-29,TRUE\n");
}

#[test]
fn csv_trim_and_delimiter_options() {
    let data = b" Id ; Name \n 7 ; Lin \n".to_vec();
    let options = CsvReadOptions {
        delimiter: b';',
        trim: CsvTrim::All,
    };
    let mut reader = CsvReader::from_reader_with_options(data.as_slice(), options).unwrap();
    let header = reader.read_row(1).unwrap().unwrap();
    assert_eq!(header.get(&1).map(String::as_str), Some("Id"));
    let (_, cells) = reader.next_row().unwrap().unwrap();
    assert_eq!(cells.get(&2).map(String::as_str), Some("Lin"));
}

#[test]
fn csv_writer_rejects_backward_moves() {
    let mut writer = CsvWriter::in_memory();
    writer.advance_to_row(3).unwrap();
    assert!(writer.advance_to_row(1).is_err());
    writer.advance_to_column(4).unwrap();
    assert!(writer.advance_to_column(2).is_err());
}
