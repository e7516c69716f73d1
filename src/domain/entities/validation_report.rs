//! # Validation Report
//!
//! INVALID サブミッションのエラー内容をテーブルごとに整理する

use serde_json::Value;
use std::collections::BTreeMap;

/// Action groups Lyric nests table errors under
const ACTION_KEYS: [&str; 3] = ["inserts", "updates", "deletes"];

/// レコード単位のバリデーションエラー
#[derive(Debug, Clone, PartialEq)]
pub struct RecordError {
    pub reason: String,
    pub index: Option<u64>,
    pub field_name: Option<String>,
    pub field_value: Option<String>,
    pub message: Option<String>,
}

impl RecordError {
    fn from_value(value: &Value) -> Self {
        let text = |key: &str| -> Option<String> {
            match value.get(key) {
                Some(Value::String(s)) => Some(s.clone()),
                Some(Value::Null) | None => None,
                Some(other) => Some(other.to_string()),
            }
        };

        Self {
            reason: text("reason").unwrap_or_else(|| "UNKNOWN".to_string()),
            index: value.get("index").and_then(Value::as_u64),
            field_name: text("fieldName"),
            field_value: text("fieldValue"),
            message: text("message"),
        }
    }

    /// 重複レコードのエラーか
    pub fn is_duplicate(&self) -> bool {
        let reason = self.reason.to_ascii_uppercase();
        reason.contains("UNIQUE") || reason.contains("DUPLICATE")
    }
}

/// テーブル単位のエラー
#[derive(Debug, Clone, PartialEq)]
pub struct TableErrors {
    pub table: String,
    pub errors: Vec<RecordError>,
}

impl TableErrors {
    pub fn duplicates(&self) -> impl Iterator<Item = &RecordError> {
        self.errors.iter().filter(|e| e.is_duplicate())
    }

    pub fn others(&self) -> impl Iterator<Item = &RecordError> {
        self.errors.iter().filter(|e| !e.is_duplicate())
    }
}

/// バリデーションレポート
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub tables: Vec<TableErrors>,
}

impl ValidationReport {
    /// Lyric の `errors` ペイロードを解析する
    ///
    /// `{ "inserts": { "donor": [...] } }` と `{ "donor": [...] }` の両方を受け付ける
    pub fn from_payload(payload: &Value) -> Self {
        let mut grouped: BTreeMap<String, Vec<RecordError>> = BTreeMap::new();

        if let Some(obj) = payload.as_object() {
            let nested = ACTION_KEYS
                .iter()
                .any(|key| obj.get(*key).map(Value::is_object).unwrap_or(false));

            if nested {
                for key in ACTION_KEYS {
                    if let Some(tables) = obj.get(key).and_then(Value::as_object) {
                        collect_tables(tables, &mut grouped);
                    }
                }
            } else {
                collect_tables(obj, &mut grouped);
            }
        }

        Self {
            tables: grouped
                .into_iter()
                .map(|(table, errors)| TableErrors { table, errors })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tables.iter().all(|t| t.errors.is_empty())
    }

    pub fn total_errors(&self) -> usize {
        self.tables.iter().map(|t| t.errors.len()).sum()
    }

    pub fn duplicate_count(&self) -> usize {
        self.tables.iter().map(|t| t.duplicates().count()).sum()
    }

    /// 人間が読める要約
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return "Submission is INVALID but no error details were returned".to_string();
        }

        let mut lines = Vec::new();
        for table in self.tables.iter().filter(|t| !t.errors.is_empty()) {
            lines.push(format!(
                "Table '{}': {} error(s)",
                table.table,
                table.errors.len()
            ));

            let duplicates: Vec<&RecordError> = table.duplicates().collect();
            if !duplicates.is_empty() {
                lines.push(format!(
                    "  - {} duplicate record(s){}",
                    duplicates.len(),
                    format_rows(&duplicates)
                ));
            }

            // reason ごとにまとめる
            let mut by_reason: BTreeMap<&str, Vec<&RecordError>> = BTreeMap::new();
            for err in table.others() {
                by_reason.entry(err.reason.as_str()).or_default().push(err);
            }
            for (reason, errors) in by_reason {
                let fields: Vec<String> = errors
                    .iter()
                    .filter_map(|e| e.field_name.clone())
                    .fold(Vec::new(), |mut acc, f| {
                        if !acc.contains(&f) {
                            acc.push(f);
                        }
                        acc
                    });
                let field_text = if fields.is_empty() {
                    String::new()
                } else {
                    format!(" on field(s) {}", fields.join(", "))
                };
                lines.push(format!(
                    "  - {}: {} error(s){}{}",
                    reason,
                    errors.len(),
                    field_text,
                    format_rows(&errors)
                ));
            }
        }

        lines.join("\n")
    }
}

fn collect_tables(
    tables: &serde_json::Map<String, Value>,
    grouped: &mut BTreeMap<String, Vec<RecordError>>,
) {
    for (table, records) in tables {
        if let Some(records) = records.as_array() {
            grouped
                .entry(table.clone())
                .or_default()
                .extend(records.iter().map(RecordError::from_value));
        }
    }
}

fn format_rows(errors: &[&RecordError]) -> String {
    let rows: Vec<String> = errors
        .iter()
        .filter_map(|e| e.index)
        .map(|i| i.to_string())
        .collect();
    if rows.is_empty() {
        String::new()
    } else {
        format!(" (rows {})", rows.join(", "))
    }
}
