use crate::session::DedupReport;

/// One item per line (rules and test case downloads).
pub fn lines_export(items: &[String]) -> String {
    items.join("\n")
}

/// `1. item` per line (checkpoint download).
pub fn numbered_export(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One page of a checkpoint listing. `page` and `first_number` are 1-based.
#[derive(Debug, PartialEq)]
pub struct Page<'a> {
    pub items: &'a [String],
    pub page: usize,
    pub total_pages: usize,
    pub first_number: usize,
    pub total_items: usize,
}

impl Page<'_> {
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{}. {}", self.first_number + i, item))
            .collect();
        lines.push(format!(
            "Page {}/{} | {} checkpoints in total",
            self.page, self.total_pages, self.total_items
        ));
        lines.join("\n")
    }
}

/// Slice `items` into pages of `page_size`; out-of-range pages are clamped.
pub fn paginate(items: &[String], page_size: usize, page: usize) -> Page<'_> {
    let page_size = page_size.max(1);
    let total_pages = items.len().div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);

    let start = ((page - 1) * page_size).min(items.len());
    let end = (start + page_size).min(items.len());

    Page {
        items: &items[start..end],
        page,
        total_pages,
        first_number: start + 1,
        total_items: items.len(),
    }
}

/// Numbered checkpoint listing: the whole list, or one page of it with a caption.
pub fn checkpoint_listing(items: &[String], page: Option<usize>, page_size: usize) -> String {
    match page {
        Some(page) => paginate(items, page_size, page).render(),
        None => numbered_export(items),
    }
}

/// Human-readable duplicate summary showing at most `limit` entries.
pub fn duplicates_summary(report: &DedupReport, limit: usize) -> String {
    let header = format!(
        "{} duplicates removed, {} checkpoints kept",
        report.removed_count(),
        report.retained_count()
    );
    if report.removed_count() == 0 {
        return header;
    }

    let mut lines = vec![header];
    let preview = report.preview(limit);
    lines.push("Checkpoints considered duplicates:".to_string());
    for duplicate in preview.shown {
        lines.push(format!(
            "- {} (matches \"{}\", similarity {:.2})",
            duplicate.checkpoint, duplicate.matched, duplicate.score
        ));
    }
    if preview.remaining > 0 {
        lines.push(format!("...and {} more", preview.remaining));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkpoint_dedup::{DedupConfig, DuplicateMatch, Partition};

    fn items(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("CP{}", i)).collect()
    }

    #[test]
    fn test_numbered_export() {
        assert_eq!(numbered_export(&items(2)), "1. CP1\n2. CP2");
        assert_eq!(numbered_export(&[]), "");
    }

    #[test]
    fn test_lines_export() {
        assert_eq!(lines_export(&items(3)), "CP1\nCP2\nCP3");
    }

    #[test]
    fn test_paginate_middle_and_last_page() {
        let all = items(23);

        let second = paginate(&all, 10, 2);
        assert_eq!(second.total_pages, 3);
        assert_eq!(second.first_number, 11);
        assert_eq!(second.items.len(), 10);

        let last = paginate(&all, 10, 3);
        assert_eq!(last.items, &all[20..]);
        assert!(last.render().ends_with("Page 3/3 | 23 checkpoints in total"));
        assert!(last.render().starts_with("21. CP21"));
    }

    #[test]
    fn test_paginate_clamps_and_handles_empty() {
        let all = items(5);
        assert_eq!(paginate(&all, 10, 7).page, 1);
        assert_eq!(paginate(&all, 0, 2).total_pages, 5);

        let empty = paginate(&[], 10, 1);
        assert_eq!(empty.total_pages, 1);
        assert!(empty.items.is_empty());
    }

    #[test]
    fn test_checkpoint_listing_whole_or_paged() {
        let all = items(12);
        assert_eq!(checkpoint_listing(&all, None, 5), numbered_export(&all));

        let paged = checkpoint_listing(&all, Some(3), 5);
        assert!(paged.starts_with("11. CP11\n12. CP12"));
        assert!(paged.ends_with("Page 3/3 | 12 checkpoints in total"));
    }

    #[test]
    fn test_empty_summary_mentions_kept_checkpoints() {
        let partition = Partition {
            retained: items(3),
            duplicates: Vec::new(),
        };
        let report = DedupReport::new(&partition, DedupConfig::default());
        assert_eq!(
            duplicates_summary(&report, 10),
            "0 duplicates removed, 3 checkpoints kept"
        );
    }

    #[test]
    fn test_duplicates_summary() {
        let partition = Partition {
            retained: items(2),
            duplicates: vec![
                DuplicateMatch {
                    index: 0,
                    checkpoint: "Vérifier le montant".to_string(),
                    matched: "vérifier le montant.".to_string(),
                    score: 0.97,
                },
                DuplicateMatch {
                    index: 2,
                    checkpoint: "Contrôler la date".to_string(),
                    matched: "Contrôler la date".to_string(),
                    score: 1.0,
                },
            ],
        };
        let report = DedupReport::new(&partition, DedupConfig::default());

        let summary = duplicates_summary(&report, 1);
        assert!(summary.starts_with("2 duplicates removed, 2 checkpoints kept"));
        assert!(summary.contains("- Vérifier le montant (matches \"vérifier le montant.\", similarity 0.97)"));
        assert!(!summary.contains("Contrôler"));
        assert!(summary.ends_with("...and 1 more"));
    }
}
