//! Loading a whole study from files on disk.

use std::fs;
use std::path::Path;

use ess_ingest::{IngestError, LoadOptions, load_config, load_study};
use ess_model::{AlcoholFrequency, CellValue, SmokingStatus, UnitId};
use ess_xpt::{XptColumn, XptDataset, XptValue, write_xpt};

const CONFIG: &str = r#"
[sources.sample]
path = "sddf.csv"
columns = ["idno", "cntry", "psu", "prob"]

[sources.paradata]
path = "contact.csv"
columns = ["idno", "cntry", "outnic"]

[sources.responses]
path = "main.csv"
columns = ["idno", "cntry", "cgtsmke", "cgtsday", "alcfreq", "alcwkdy", "alcwknd"]

[roles]
outcome = "outnic"
psu = "psu"
inclusion_probability = "prob"
smoking_status = "cgtsmke"
cigarettes_per_day = "cgtsday"
alcohol_frequency = "alcfreq"
alcohol_weekday = "alcwkdy"
alcohol_weekend = "alcwknd"

[[codebook]]
name = "idno"
kind = "identifier"
label = "Respondent's identification number"

[[codebook]]
name = "cntry"
kind = "categorical"
label = "Country"
values = { GB = "United Kingdom", DE = "Germany" }

[[codebook]]
name = "psu"
kind = "numeric"

[[codebook]]
name = "prob"
kind = "numeric"

[[codebook]]
name = "outnic"
kind = "categorical"
values = { 1 = "Complete and valid interview related to CF", 3 = "Refusal by respondent" }

[[codebook]]
name = "cgtsmke"
kind = "categorical"
values = { 1 = "I smoke daily", 5 = "I have never smoked" }
missing = ["7", "8", "9"]

[[codebook]]
name = "cgtsday"
kind = "numeric"
missing = ["666", "777", "888", "999"]

[[codebook]]
name = "alcfreq"
kind = "categorical"
values = { 1 = "Every day", 3 = "Once a week", 7 = "Never" }
missing = ["77", "88", "99"]

[[codebook]]
name = "alcwkdy"
kind = "numeric"
missing = ["6666", "7777", "8888", "9999"]

[[codebook]]
name = "alcwknd"
kind = "numeric"
missing = ["6666", "7777", "8888", "9999"]
"#;

const SAMPLE: &str = "idno,cntry,psu,prob\n1,GB,10,0.0002\n2,GB,11,0.0003\n3,DE,1,0.001\n";
const PARADATA: &str = "idno,cntry,outnic,typesa\n1,GB,1,A\n2,GB,3,B\n4,GB,,C\n3,DE,1,A\n";
const RESPONSES: &str = "idno,cntry,cgtsmke,cgtsday,alcfreq,alcwkdy,alcwknd\n\
1,GB,1,20,3,7,0\n\
3,DE,5,,1,10,10\n";

fn write_study(dir: &Path, responses: &str) {
    fs::write(dir.join("study.toml"), CONFIG).unwrap();
    fs::write(dir.join("sddf.csv"), SAMPLE).unwrap();
    fs::write(dir.join("contact.csv"), PARADATA).unwrap();
    fs::write(dir.join("main.csv"), responses).unwrap();
}

#[test]
fn loads_country_subset_with_typed_records() {
    let dir = tempfile::tempdir().unwrap();
    write_study(dir.path(), RESPONSES);
    let config = load_config(&dir.path().join("study.toml")).unwrap();
    let study = load_study(&config, &LoadOptions::default()).unwrap();

    assert_eq!(study.country, "United Kingdom");
    assert_eq!(study.sample.height(), 2);
    assert_eq!(study.paradata.height(), 3);
    assert_eq!(study.responses.height(), 1);

    // Selection drops typesa and keeps the configured order.
    let names: Vec<&str> = study.paradata.column_names().collect();
    assert_eq!(names, vec!["idno", "cntry", "outnic"]);
    assert_eq!(study.paradata.columns[1].label.as_deref(), Some("Country"));

    let unset = &study.paradata.records[2];
    assert_eq!(unset.idno, UnitId::new(4));
    assert!(unset.outcome.is_none());

    let sample = &study.sample.records[0];
    assert_eq!(sample.psu, Some(10));
    assert_eq!(sample.inclusion_probability, Some(0.0002));

    let response = &study.responses.records[0];
    assert_eq!(response.smoking_status, Some(SmokingStatus::Daily));
    assert_eq!(response.cigarettes_per_day_raw, Some(20));
    assert_eq!(response.alcohol_frequency, Some(AlcoholFrequency::OnceAWeek));
    assert_eq!(response.alcohol_weekday_qty, Some(7.0));
    assert_eq!(response.alcohol_weekend_qty, Some(0.0));
}

#[test]
fn user_missing_codes_load_as_missing() {
    let dir = tempfile::tempdir().unwrap();
    write_study(
        dir.path(),
        "idno,cntry,cgtsmke,cgtsday,alcfreq,alcwkdy,alcwknd\n1,GB,8,777,99,8888,6666\n",
    );
    let config = load_config(&dir.path().join("study.toml")).unwrap();
    let study = load_study(&config, &LoadOptions::default()).unwrap();

    let response = &study.responses.records[0];
    assert!(response.smoking_status.is_none());
    assert!(response.cigarettes_per_day_raw.is_none());
    assert!(response.alcohol_frequency.is_none());
    assert!(response.alcohol_weekday_qty.is_none());
    assert!(response.alcohol_weekend_qty.is_none());
    assert!(response.cells[2..].iter().all(CellValue::is_missing));
}

#[test]
fn missing_columns_fail_before_any_row_is_decoded() {
    let dir = tempfile::tempdir().unwrap();
    // Row 1 holds an undeclared code; it must never be reached.
    write_study(
        dir.path(),
        "idno,cntry,cgtsmke,cgtsday,alcfreq\n1,GB,4,20,3\n",
    );
    let config = load_config(&dir.path().join("study.toml")).unwrap();
    let err = load_study(&config, &LoadOptions::default()).unwrap_err();
    match err {
        IngestError::MissingColumns { table, columns } => {
            assert_eq!(table, "responses");
            assert_eq!(columns, vec!["alcwkdy".to_string(), "alcwknd".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn country_override_and_empty_subsets() {
    let dir = tempfile::tempdir().unwrap();
    write_study(dir.path(), RESPONSES);
    let config = load_config(&dir.path().join("study.toml")).unwrap();

    let options = LoadOptions {
        country: Some("Germany".to_string()),
        ..LoadOptions::default()
    };
    let study = load_study(&config, &options).unwrap();
    assert_eq!(study.paradata.height(), 1);
    assert_eq!(
        study.responses.records[0].smoking_status,
        Some(SmokingStatus::Never)
    );

    let options = LoadOptions {
        country: Some("France".to_string()),
        ..LoadOptions::default()
    };
    let study = load_study(&config, &options).unwrap();
    assert!(study.sample.is_empty());
    assert!(study.paradata.is_empty());
    assert!(study.responses.is_empty());
}

#[test]
fn data_dir_overrides_config_directory() {
    let config_dir = tempfile::tempdir().unwrap();
    let data_dir = tempfile::tempdir().unwrap();
    fs::write(config_dir.path().join("study.toml"), CONFIG).unwrap();
    write_study(data_dir.path(), RESPONSES);

    let config = load_config(&config_dir.path().join("study.toml")).unwrap();
    assert!(matches!(
        load_study(&config, &LoadOptions::default()),
        Err(IngestError::FileNotFound { .. })
    ));

    let options = LoadOptions {
        data_dir: Some(data_dir.path().to_path_buf()),
        ..LoadOptions::default()
    };
    assert_eq!(load_study(&config, &options).unwrap().sample.height(), 2);
}

#[test]
fn xpt_sources_are_read_alongside_csv() {
    let dir = tempfile::tempdir().unwrap();
    write_study(dir.path(), RESPONSES);

    let mut sddf = XptDataset::with_columns(
        "SDDF",
        vec![
            XptColumn::numeric("IDNO"),
            XptColumn::character("CNTRY", 2),
            XptColumn::numeric("PSU").with_label("Primary sampling unit"),
            XptColumn::numeric("PROB"),
        ],
    );
    sddf.add_row(vec![
        XptValue::numeric(1.0),
        XptValue::character("GB"),
        XptValue::numeric(10.0),
        XptValue::numeric(0.25),
    ]);
    sddf.add_row(vec![
        XptValue::numeric(2.0),
        XptValue::character("GB"),
        XptValue::numeric_missing(),
        XptValue::numeric(0.5),
    ]);
    write_xpt(&dir.path().join("sddf.xpt"), &sddf).unwrap();

    let text = CONFIG.replace("path = \"sddf.csv\"", "path = \"sddf.xpt\"");
    fs::write(dir.path().join("study.toml"), text).unwrap();

    let config = load_config(&dir.path().join("study.toml")).unwrap();
    let study = load_study(&config, &LoadOptions::default()).unwrap();

    assert_eq!(study.sample.height(), 2);
    assert_eq!(study.sample.records[0].psu, Some(10));
    assert_eq!(study.sample.records[1].psu, None);
    assert_eq!(study.sample.records[1].inclusion_probability, Some(0.5));
    assert_eq!(
        study.sample.columns[2].label.as_deref(),
        Some("Primary sampling unit")
    );
}

#[test]
fn shipped_round_seven_config_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/ess7-uk.toml");
    let config = load_config(&path).unwrap();
    assert_eq!(config.country, "United Kingdom");
    assert_eq!(config.roles.alcohol_frequency, "alcfreq");
    let codebook = config.codebook().unwrap();
    let alcfreq = codebook.get("alcfreq").unwrap();
    assert_eq!(alcfreq.value_label("4"), Some("2-3 times a month"));
    assert!(alcfreq.is_missing_code("88"));
}
