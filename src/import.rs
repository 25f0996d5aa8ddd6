//! Batch import from the CSV template. Same scrape-and-build pipeline as the
//! interactive tool, minus the interview: blank cells take the shared
//! defaults and unresolvable rows are skipped.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::entry::Prompter;
use crate::geo;
use crate::publish;
use crate::scrape::Scraper;
use crate::store::{next_id, Store};
use crate::types::{Coords, Defaults, ParkingRecord, PriceStructure, Rate, Tariff};

/// Template rows carrying this name are instructions, not data.
const SAMPLE_NAME: &str = "サンプル駐車場";

/// Pause after each successful fetch, as a courtesy to the scraped service.
const FETCH_DELAY: Duration = Duration::from_secs(1);

/// One template row under the fixed header contract. Every column is
/// optional so partial templates still parse; blanks come through as
/// empty strings.
#[derive(Debug, Default, Clone, Deserialize)]
struct CsvRow {
    #[serde(rename = "名前", default)]
    name: Option<String>,
    #[serde(rename = "URL", default)]
    url: Option<String>,
    #[serde(rename = "昼開始(08:00)", default)]
    day_start: Option<String>,
    #[serde(rename = "昼終了(22:00)", default)]
    day_end: Option<String>,
    #[serde(rename = "昼料金", default)]
    day_price: Option<String>,
    #[serde(rename = "昼単位", default)]
    day_unit: Option<String>,
    #[serde(rename = "夜料金", default)]
    night_price: Option<String>,
    #[serde(rename = "夜単位", default)]
    night_unit: Option<String>,
    #[serde(rename = "最大料金", default)]
    max: Option<String>,
    #[serde(rename = "最大条件(24時間)", default)]
    max_desc: Option<String>,
    #[serde(rename = "最大料金2", default)]
    max2: Option<String>,
    #[serde(rename = "最大条件2(12時間)", default)]
    max2_desc: Option<String>,
    #[serde(rename = "休日同額(1=はい)", default)]
    weekend_same: Option<String>,
    #[serde(rename = "休日昼料金", default)]
    weekend_day_price: Option<String>,
    #[serde(rename = "休日最大", default)]
    weekend_max: Option<String>,
    #[serde(rename = "休日最大2", default)]
    weekend_max2: Option<String>,
}

fn blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn parse_u32_or(value: &Option<String>, default: u32) -> u32 {
    match non_blank(value) {
        Some(v) => v.trim().parse().unwrap_or(default),
        None => default,
    }
}

fn parse_u32_opt(value: &Option<String>) -> Option<u32> {
    non_blank(value)?.trim().parse().ok()
}

/// Rows without a name or URL, and the shipped sample row, never become
/// records. The sample match is exact and case-sensitive.
fn should_skip(row: &CsvRow) -> bool {
    blank(&row.name) || blank(&row.url) || row.name.as_deref() == Some(SAMPLE_NAME)
}

/// Assemble a record from one row plus its scraped coordinates. The name
/// always comes from the CSV, not the scrape.
fn record_from_row(row: &CsvRow, coords: Coords, id: u32, defaults: &Defaults) -> ParkingRecord {
    let day_start = non_blank(&row.day_start).unwrap_or(defaults.day_start);
    let day_end = non_blank(&row.day_end).unwrap_or(defaults.day_end);

    let day = Rate {
        price: parse_u32_or(&row.day_price, defaults.weekday_day.price),
        unit_minutes: parse_u32_or(&row.day_unit, defaults.weekday_day.unit_minutes),
    };
    let night = Rate {
        price: parse_u32_or(&row.night_price, defaults.night.price),
        unit_minutes: parse_u32_or(&row.night_unit, defaults.night.unit_minutes),
    };

    let max = parse_u32_opt(&row.max);
    let max2 = parse_u32_opt(&row.max2);

    let weekday = Tariff::new(day_start, day_end, day, night).with_caps(
        max,
        row.max_desc.clone(),
        max2,
        row.max2_desc.clone(),
    );

    let weekend = if row.weekend_same.as_deref() == Some("1") {
        weekday.clone()
    } else {
        let weekend_day = Rate {
            price: parse_u32_or(&row.weekend_day_price, defaults.weekend_day_price),
            // The template has no weekend unit column; reuse the weekday one.
            unit_minutes: day.unit_minutes,
        };
        let weekend_max = match non_blank(&row.weekend_max) {
            Some(_) => parse_u32_opt(&row.weekend_max),
            None => max,
        };
        let weekend_max2 = match non_blank(&row.weekend_max2) {
            Some(_) => parse_u32_opt(&row.weekend_max2),
            None => max2,
        };

        Tariff::new(day_start, day_end, weekend_day, night).with_caps(
            weekend_max,
            row.max_desc.clone(),
            weekend_max2,
            row.max2_desc.clone(),
        )
    };

    ParkingRecord {
        id,
        name: row.name.clone().unwrap_or_default(),
        coords,
        distance: geo::distance_label(Some(coords)),
        capacity: None,
        price_structure: PriceStructure { weekday, weekend },
        note: None,
    }
}

/// Excel saves the template as UTF-8 with a BOM; older spreadsheet tools
/// hand back Shift_JIS. Try UTF-8 first, fall back on decode errors.
fn decode_template(bytes: &[u8]) -> String {
    let (text, _, had_errors) = encoding_rs::UTF_8.decode(bytes);
    if !had_errors {
        return text.into_owned();
    }
    let (text, _, _) = encoding_rs::SHIFT_JIS.decode(bytes);
    text.into_owned()
}

fn parse_rows(text: &str) -> Result<Vec<CsvRow>> {
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row.context("CSVの解析に失敗しました")?);
    }
    Ok(rows)
}

fn read_rows(path: &Path) -> Result<Vec<CsvRow>> {
    let bytes = fs::read(path).with_context(|| {
        format!("テンプレートファイルが見つかりません ({})", path.display())
    })?;
    parse_rows(&decode_template(&bytes))
}

pub fn run_import(csv_path: &Path, data: &Path, no_push: bool) -> Result<()> {
    println!("=== CSV一括インポートツール ===");

    let store = Store::new(data);
    let mut records = store.load()?;
    let mut id = next_id(&records);

    println!("CSVファイルを読み込んでいます...");
    let rows = read_rows(csv_path)?;
    let total = rows.len();
    println!("{}件のデータが見つかりました。処理を開始します。\n", total);

    let scraper = Scraper::new()?;
    let defaults = Defaults::default();
    let mut added = 0usize;

    for (i, row) in rows.iter().enumerate() {
        if should_skip(row) {
            continue;
        }
        let name = row.name.as_deref().unwrap_or_default();
        println!("[{}/{}] {} を処理中...", i + 1, total, name);

        let coords = match scraper.resolve(row.url.as_deref().unwrap_or_default()) {
            Ok(resolved) => resolved.coords,
            Err(err) => {
                println!("  -> 座標取得失敗。スキップします。({})", err);
                continue;
            }
        };

        records.push(record_from_row(row, coords, id, &defaults));
        id += 1;
        added += 1;
        thread::sleep(FETCH_DELAY);
    }

    if added == 0 {
        println!("追加可能なデータがありませんでした。");
        return Ok(());
    }

    store.save(&records)?;
    println!("\n完了: {}件のデータを追加しました。", added);

    if !no_push {
        let stdin = io::stdin();
        let mut prompter = Prompter::new(stdin.lock());
        if prompter.ask_yes_no("\nGitHubへプッシュしますか? (y/n)", true)? {
            publish::commit_and_push(
                store.path(),
                &format!("Bulk add: {} entries via CSV", added),
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "名前,URL,昼開始(08:00),昼終了(22:00),昼料金,昼単位,夜料金,夜単位,最大料金,最大条件(24時間),最大料金2,最大条件2(12時間),休日同額(1=はい),休日昼料金,休日最大,休日最大2";

    fn rows(body: &str) -> Vec<CsvRow> {
        parse_rows(&format!("{}\n{}", HEADER, body)).unwrap()
    }

    #[test]
    fn test_skips_blank_and_sample_rows() {
        let rows = rows(
            "栄パーキング,https://maps.app.goo.gl/a,,,,,,,,,,,1,,,\n\
             ,https://maps.app.goo.gl/b,,,,,,,,,,,1,,,\n\
             名駅パーキング,,,,,,,,,,,,1,,,\n\
             サンプル駐車場,https://maps.app.goo.gl/c,,,300,,,,1500,24時間,,,1,,,",
        );
        let kept: Vec<_> = rows.iter().filter(|r| !should_skip(r)).collect();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name.as_deref(), Some("栄パーキング"));
    }

    #[test]
    fn test_blank_cells_take_defaults() {
        let rows = rows("栄パーキング,https://maps.app.goo.gl/a,,,,,,,,,,,1,,,");
        let record = record_from_row(&rows[0], Coords(35.1706, 136.8817), 9, &Defaults::default());

        assert_eq!(record.id, 9);
        assert_eq!(record.name, "栄パーキング");
        assert_eq!(record.distance, "0m");
        assert_eq!(record.capacity, None);
        assert_eq!(record.note, None);

        let weekday = &record.price_structure.weekday;
        assert_eq!(weekday.day.start, "08:00");
        assert_eq!(weekday.day.end, "22:00");
        assert_eq!(weekday.day.price, 200);
        assert_eq!(weekday.day.unit_minutes, 30);
        assert_eq!(weekday.night.price, 100);
        assert_eq!(weekday.night.unit_minutes, 60);
        assert_eq!(weekday.max, None);
        assert_eq!(weekday.max_desc, None);
    }

    #[test]
    fn test_weekend_same_flag_clones_weekday() {
        let rows =
            rows("栄パーキング,https://maps.app.goo.gl/a,09:00,21:00,300,20,150,60,1800,24時間,900,5時間,1,,,");
        let record = record_from_row(&rows[0], Coords(35.2, 136.9), 1, &Defaults::default());
        assert_eq!(record.price_structure.weekend, record.price_structure.weekday);
        assert_eq!(record.price_structure.weekday.max, Some(1800));
        assert_eq!(record.price_structure.weekday.max2_desc.as_deref(), Some("5時間"));
    }

    #[test]
    fn test_weekend_entered_separately() {
        // Flag not "1": weekend day price has its own default chain, night
        // pricing and caps fall back to the weekday values.
        let rows = rows("栄パーキング,https://maps.app.goo.gl/a,,,200,30,100,60,1200,24時間,,,,400,1500,");
        let record = record_from_row(&rows[0], Coords(35.2, 136.9), 1, &Defaults::default());

        let weekend = &record.price_structure.weekend;
        assert_eq!(weekend.day.price, 400);
        assert_eq!(weekend.day.unit_minutes, 30);
        assert_eq!(weekend.night.price, 100);
        assert_eq!(weekend.max, Some(1500));
        assert_eq!(weekend.max_desc.as_deref(), Some("24時間"));
        assert_eq!(weekend.max2, None);
        assert_eq!(weekend.night.start, weekend.day.end);
        assert_eq!(weekend.night.end, weekend.day.start);
    }

    #[test]
    fn test_weekend_day_price_default_is_300() {
        let rows = rows("栄パーキング,https://maps.app.goo.gl/a,,,,,,,,,,,,,,");
        let record = record_from_row(&rows[0], Coords(35.2, 136.9), 1, &Defaults::default());
        assert_eq!(record.price_structure.weekend.day.price, 300);
    }

    #[test]
    fn test_batch_id_assignment_in_row_order() {
        let rows = rows(
            "A駐車場,https://maps.app.goo.gl/a,,,,,,,,,,,1,,,\n\
             サンプル駐車場,https://maps.app.goo.gl/x,,,,,,,,,,,1,,,\n\
             B駐車場,https://maps.app.goo.gl/b,,,,,,,,,,,1,,,\n\
             C駐車場,https://maps.app.goo.gl/c,,,,,,,,,,,1,,,",
        );

        let defaults = Defaults::default();
        let mut id = 8; // store previously topped out at 7
        let mut added = Vec::new();
        for row in &rows {
            if should_skip(row) {
                continue;
            }
            added.push(record_from_row(row, Coords(35.2, 136.9), id, &defaults));
            id += 1;
        }

        assert_eq!(added.len(), 3);
        let ids: Vec<u32> = added.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![8, 9, 10]);
        let names: Vec<&str> = added.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A駐車場", "B駐車場", "C駐車場"]);
    }

    #[test]
    fn test_decode_utf8_with_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("名前,URL".as_bytes());
        assert_eq!(decode_template(&bytes), "名前,URL");
    }

    #[test]
    fn test_decode_shift_jis_fallback() {
        // "名前" in Shift_JIS.
        let bytes = [0x96, 0xBC, 0x91, 0x4F];
        assert_eq!(decode_template(&bytes), "名前");
    }

    #[test]
    fn test_missing_columns_still_parse() {
        let rows = parse_rows("名前,URL\n栄パーキング,https://maps.app.goo.gl/a").unwrap();
        assert!(!should_skip(&rows[0]));
        let record = record_from_row(&rows[0], Coords(35.2, 136.9), 1, &Defaults::default());
        assert_eq!(record.price_structure.weekday.day.price, 200);
    }
}
