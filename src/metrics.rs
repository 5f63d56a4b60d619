#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageMetrics {
    pub page_number: usize,
    pub word_count: usize,
    pub command_count: usize,
    pub content_bytes: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMetrics {
    pub pages: Vec<PageMetrics>,
    pub total_render_ms: f64,
    pub total_bytes: usize,
}

impl DocumentMetrics {
    pub fn for_pages(count: usize) -> Self {
        Self {
            pages: (1..=count)
                .map(|page_number| PageMetrics {
                    page_number,
                    ..PageMetrics::default()
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn word_count(&self) -> usize {
        self.pages.iter().map(|page| page.word_count).sum()
    }
}
