pub mod client;
pub mod extract;
pub mod image;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::categorizer::guess_category;
use crate::error::Result;
use crate::models::{Category, NewTransaction};

pub use client::{HttpVisionClient, VisionApi};
pub use extract::ScannedItem;

pub const RECEIPT_PROMPT: &str = "You are reading a photo of a shopping receipt. \
List every purchased item as a JSON array of objects with the keys \
\"name\" (string), \"mount\" (number, the price paid, without currency symbol) and \
\"date\" (the receipt date as YYYY-MM-DD, or null if not printed). \
Answer with the JSON array only, no explanation.";

/// Category id used when nothing matches and no fallback category exists.
pub const UNCATEGORIZED: i64 = 0;

/// Turns scanned items into unsaved expense transactions.
pub fn drafts_from_items(
    items: Vec<ScannedItem>,
    categories: &[Category],
    card_id: Option<i64>,
    today: NaiveDate,
) -> Vec<NewTransaction> {
    items
        .into_iter()
        .map(|item| NewTransaction {
            category: guess_category(&item.name, categories).unwrap_or(UNCATEGORIZED),
            date: item.date.unwrap_or(today),
            mount: -item.amount.abs(),
            name: item.name,
            card_id,
        })
        .collect()
}

/// Encodes one image, asks the API about it and builds drafts from the answer.
pub fn scan_receipt(
    api: &dyn VisionApi,
    path: &Path,
    categories: &[Category],
    card_id: Option<i64>,
    today: NaiveDate,
) -> Result<Vec<NewTransaction>> {
    let image = image::encode_image(path)?;
    let answer = api.complete(&image, RECEIPT_PROMPT)?;
    tracing::debug!(chars = answer.len(), "received answer");
    let items = extract::parse_items(&answer)?;
    tracing::info!(path = %path.display(), items = items.len(), "extracted receipt items");
    Ok(drafts_from_items(items, categories, card_id, today))
}

pub struct ScanOutcome {
    pub path: PathBuf,
    pub result: Result<Vec<NewTransaction>>,
}

/// Scans images one after another. A failure only affects its own image.
pub fn scan_all(
    api: &dyn VisionApi,
    paths: &[PathBuf],
    categories: &[Category],
    card_id: Option<i64>,
    today: NaiveDate,
) -> Vec<ScanOutcome> {
    paths
        .iter()
        .map(|path| {
            let result = scan_receipt(api, path, categories, card_id, today);
            if let Err(e) = &result {
                tracing::warn!(path = %path.display(), error = %e, "scan failed");
            }
            ScanOutcome {
                path: path.clone(),
                result,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::error::TallyError;
    use crate::scanner::image::EncodedImage;

    struct FakeApi {
        answers: RefCell<Vec<Result<String>>>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeApi {
        fn new(answers: Vec<Result<String>>) -> Self {
            Self {
                answers: RefCell::new(answers),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl VisionApi for FakeApi {
        fn complete(&self, image: &EncodedImage, prompt: &str) -> Result<String> {
            assert_eq!(prompt, RECEIPT_PROMPT);
            self.calls.borrow_mut().push(image.base64.clone());
            self.answers.borrow_mut().remove(0)
        }
    }

    fn categories() -> Vec<Category> {
        ["Food", "Groceries", "Other"]
            .iter()
            .enumerate()
            .map(|(i, n)| Category {
                id: i as i64 + 1,
                name: n.to_string(),
                icon: String::new(),
                color: String::new(),
            })
            .collect()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn write_image(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_drafts_are_negative_and_categorized() {
        let items = vec![
            ScannedItem { name: "Cappuccino".into(), amount: 3.8, date: None },
            ScannedItem {
                name: "Eggs x12".into(),
                amount: -4.0,
                date: NaiveDate::from_ymd_opt(2026, 10, 1),
            },
            ScannedItem { name: "Widget".into(), amount: 9.0, date: None },
        ];
        let drafts = drafts_from_items(items, &categories(), Some(2), today());
        assert_eq!(drafts[0].mount, -3.8);
        assert_eq!(drafts[0].category, 1);
        assert_eq!(drafts[0].date, today());
        assert_eq!(drafts[1].mount, -4.0);
        assert_eq!(drafts[1].category, 2);
        assert_eq!(drafts[1].date, NaiveDate::from_ymd_opt(2026, 10, 1).unwrap());
        assert_eq!(drafts[2].category, 3);
        assert!(drafts.iter().all(|d| d.card_id == Some(2)));
    }

    #[test]
    fn test_no_categories_uses_uncategorized() {
        let items = vec![ScannedItem { name: "Tea".into(), amount: 2.0, date: None }];
        let drafts = drafts_from_items(items, &[], None, today());
        assert_eq!(drafts[0].category, UNCATEGORIZED);
    }

    #[test]
    fn test_scan_all_is_sequential_and_continues_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let paths = vec![
            write_image(dir.path(), "a.png", b"a"),
            write_image(dir.path(), "b.png", b"b"),
            write_image(dir.path(), "c.png", b"c"),
        ];
        let api = FakeApi::new(vec![
            Ok(r#"[{"name":"Pizza","mount":12}]"#.to_string()),
            Err(TallyError::Api { status: 500, body: "boom".into() }),
            Ok("Here you go: [{\"name\":\"Bread\",\"price\":\"2.10\"}]".to_string()),
        ]);
        let outcomes = scan_all(&api, &paths, &categories(), None, today());

        assert_eq!(*api.calls.borrow(), vec!["YQ==", "Yg==", "Yw=="]);
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].result.as_ref().unwrap()[0].name, "Pizza");
        assert!(matches!(outcomes[1].result, Err(TallyError::Api { status: 500, .. })));
        assert_eq!(outcomes[2].result.as_ref().unwrap()[0].mount, -2.1);
    }

    #[test]
    fn test_unreadable_image_never_calls_api() {
        let dir = tempfile::tempdir().unwrap();
        let api = FakeApi::new(vec![]);
        let missing = dir.path().join("missing.jpg");
        let result = scan_receipt(&api, &missing, &categories(), None, today());
        assert!(matches!(result, Err(TallyError::ImageAccess { .. })));
        assert!(api.calls.borrow().is_empty());
    }

    #[test]
    fn test_empty_answer_surfaces_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(dir.path(), "r.jpg", b"x");
        let api = FakeApi::new(vec![Ok("[]".to_string())]);
        let result = scan_receipt(&api, &path, &categories(), None, today());
        assert!(matches!(result, Err(TallyError::EmptyExtraction)));
    }
}
