//! Interactive single-record entry: prompt the operator for pricing fields
//! around a scraped Google Maps share link.

use anyhow::{bail, Context, Result};
use chrono::NaiveTime;
use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::geo;
use crate::publish;
use crate::scrape::{ScrapeError, Scraper, DEFAULT_NAME};
use crate::store::{next_id, Store};
use crate::types::{Coords, Defaults, ParkingRecord, PriceStructure, Rate, Tariff, UNRESOLVED_COORDS};

/// Console prompt driver. Every prompt shows its default in brackets and an
/// empty line falls back to it; numeric and time prompts re-prompt until the
/// input parses instead of aborting the whole entry.
pub struct Prompter<R> {
    input: R,
}

impl<R: BufRead> Prompter<R> {
    pub fn new(input: R) -> Self {
        Prompter { input }
    }

    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        let n = self
            .input
            .read_line(&mut line)
            .context("入力の読み取りに失敗しました")?;
        if n == 0 {
            bail!("入力が終了しました");
        }
        Ok(line.trim().to_string())
    }

    /// Free-standing prompt without a bracketed default.
    pub fn ask_line(&mut self, prompt: &str) -> Result<String> {
        println!("{}", prompt);
        print!("> ");
        io::stdout().flush()?;
        self.read_line()
    }

    pub fn ask(&mut self, label: &str, default: &str) -> Result<String> {
        print!("{} [{}]: ", label, default);
        io::stdout().flush()?;
        let line = self.read_line()?;
        Ok(if line.is_empty() {
            default.to_string()
        } else {
            line
        })
    }

    pub fn ask_u32(&mut self, label: &str, default: u32) -> Result<u32> {
        loop {
            let raw = self.ask(label, &default.to_string())?;
            match raw.parse() {
                Ok(value) => return Ok(value),
                Err(_) => println!("数値を入力してください: {}", raw),
            }
        }
    }

    pub fn ask_f64(&mut self, label: &str) -> Result<f64> {
        loop {
            print!("{}: ", label);
            io::stdout().flush()?;
            let raw = self.read_line()?;
            match raw.parse() {
                Ok(value) => return Ok(value),
                Err(_) => println!("数値を入力してください: {}", raw),
            }
        }
    }

    /// Cap prompt: `null` means "no cap".
    pub fn ask_cap(&mut self, label: &str, default: &str) -> Result<Option<u32>> {
        loop {
            let raw = self.ask(label, default)?;
            if raw.eq_ignore_ascii_case("null") {
                return Ok(None);
            }
            match raw.parse() {
                Ok(value) => return Ok(Some(value)),
                Err(_) => println!("数値または null を入力してください: {}", raw),
            }
        }
    }

    pub fn ask_yes_no(&mut self, label: &str, default_yes: bool) -> Result<bool> {
        let default = if default_yes { "y" } else { "n" };
        let raw = self.ask(label, default)?;
        Ok(raw.to_lowercase() == "y")
    }

    /// "HH:MM" prompt, validated with chrono.
    pub fn ask_time(&mut self, label: &str, default: &str) -> Result<String> {
        loop {
            let raw = self.ask(label, default)?;
            if NaiveTime::parse_from_str(&raw, "%H:%M").is_ok() {
                return Ok(raw);
            }
            println!("時刻は HH:MM 形式で入力してください: {}", raw);
        }
    }
}

/// First- and second-tier cap prompts. The second tier is only offered once
/// a first cap is set.
fn ask_caps<R: BufRead>(
    prompter: &mut Prompter<R>,
    cap_default: &str,
    desc_label: &str,
    desc_default: &str,
    defaults: &Defaults,
) -> Result<(Option<u32>, Option<String>, Option<u32>, Option<String>)> {
    let max = prompter.ask_cap("最大料金(円) (なし=null)", cap_default)?;
    let mut max_desc = None;
    let mut max2 = None;
    let mut max2_desc = None;

    if max.is_some() {
        max_desc = Some(prompter.ask(desc_label, desc_default)?);
        if prompter.ask_yes_no("別の最大料金設定はありますか? (y/n)", false)? {
            max2 = Some(prompter.ask_u32("最大料金2(円)", defaults.cap2_suggestion)?);
            max2_desc = Some(prompter.ask("最大料金2の条件 (例: 5時間)", defaults.cap2_desc)?);
        }
    }

    Ok((max, max_desc, max2, max2_desc))
}

/// Interview the operator and assemble one record. The id stays 0 here;
/// the store assigns the real one on append.
pub fn build_entry<R: BufRead>(
    prompter: &mut Prompter<R>,
    coords: Option<Coords>,
    scraped_name: &str,
    defaults: &Defaults,
) -> Result<ParkingRecord> {
    println!("\n--- 料金情報の入力 ---");

    println!("\n[共通設定] 時間帯の設定");
    let day_start = prompter.ask_time("昼間 開始時間 (例: 08:00)", defaults.day_start)?;
    let day_end = prompter.ask_time("昼間 終了時間 = 夜間 開始時間 (例: 22:00)", defaults.day_end)?;

    println!("\n[平日] 料金設定");
    let weekday_day = Rate {
        price: prompter.ask_u32("昼間 料金(円)", defaults.weekday_day.price)?,
        unit_minutes: prompter.ask_u32("昼間 単位(分)", defaults.weekday_day.unit_minutes)?,
    };
    let weekday_night = Rate {
        price: prompter.ask_u32("夜間 料金(円)", defaults.night.price)?,
        unit_minutes: prompter.ask_u32("夜間 単位(分)", defaults.night.unit_minutes)?,
    };

    let (max, max_desc, max2, max2_desc) = ask_caps(
        prompter,
        &defaults.cap_suggestion.to_string(),
        "最大料金の条件 (例: 24時間, 当日24時まで)",
        defaults.cap_desc,
        defaults,
    )?;

    let weekday = Tariff::new(&day_start, &day_end, weekday_day, weekday_night)
        .with_caps(max, max_desc.clone(), max2, max2_desc.clone());

    println!("\n[休日] 料金設定");
    let weekend = if prompter.ask_yes_no("休日は平日と同じですか? (y/n)", true)? {
        weekday.clone()
    } else {
        let weekend_day = Rate {
            price: prompter.ask_u32("昼間 料金(円)", defaults.weekend_day_price)?,
            unit_minutes: prompter.ask_u32("昼間 単位(分)", defaults.weekday_day.unit_minutes)?,
        };
        let weekend_night = Rate {
            price: prompter.ask_u32("夜間 料金(円)", weekday_night.price)?,
            unit_minutes: prompter.ask_u32("夜間 単位(分)", weekday_night.unit_minutes)?,
        };

        let cap_default = max.unwrap_or(defaults.weekend_cap_suggestion).to_string();
        let desc_default = max_desc
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(defaults.cap_desc)
            .to_string();
        let (h_max, h_max_desc, h_max2, h_max2_desc) =
            ask_caps(prompter, &cap_default, "最大料金の条件", &desc_default, defaults)?;

        Tariff::new(&day_start, &day_end, weekend_day, weekend_night)
            .with_caps(h_max, h_max_desc, h_max2, h_max2_desc)
    };

    println!("\n[その他]");
    let note = prompter.ask("備考", "")?;
    let capacity = prompter.ask("収容台数", "")?;
    let name = prompter.ask("駐車場名", scraped_name)?;

    Ok(ParkingRecord {
        id: 0,
        name,
        coords: coords.unwrap_or(UNRESOLVED_COORDS),
        distance: geo::distance_label(coords),
        capacity: (!capacity.is_empty()).then_some(capacity),
        price_structure: PriceStructure { weekday, weekend },
        note: (!note.is_empty()).then_some(note),
    })
}

pub fn run_add(url: Option<String>, data: &Path, no_push: bool) -> Result<()> {
    println!("=== 名古屋パーキング マップデータ追加ツール ===");

    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock());

    let url = match url {
        Some(url) => url,
        None => prompter.ask_line("Google MapsのURLを入力してください:")?,
    };
    if url.is_empty() {
        return Ok(());
    }

    println!("URLを解析中...");
    let scraper = Scraper::new()?;
    let (coords, name) = match scraper.resolve(&url) {
        Ok(resolved) => {
            println!("座標を取得しました: [{}, {}]", resolved.coords.0, resolved.coords.1);
            println!("名称を取得しました: {}", resolved.name);
            (Some(resolved.coords), resolved.name)
        }
        Err(err) => {
            println!("座標の自動取得に失敗しました。({})", err);
            let name = match err {
                ScrapeError::NoCoordinates { name } => name,
                ScrapeError::Request(_) => DEFAULT_NAME.to_string(),
            };
            println!("手動入力:");
            let lat = prompter.ask_f64("緯度")?;
            let lng = prompter.ask_f64("経度")?;
            (Some(Coords(lat, lng)), name)
        }
    };

    let defaults = Defaults::default();
    let mut entry = build_entry(&mut prompter, coords, &name, &defaults)?;

    let store = Store::new(data);
    let mut records = store.load()?;
    entry.id = next_id(&records);
    let added_name = entry.name.clone();
    records.push(entry);
    store.save(&records)?;

    println!("\n成功: {} を追加しました。", added_name);

    if !no_push && prompter.ask_yes_no("\nGitHubへプッシュしますか? (y/n)", true)? {
        publish::commit_and_push(store.path(), &format!("Auto-add: {}", added_name))?;
    }
    Ok(())
}
