// src/ingest/providers/html_board.rs
//! Card-style search result pages (Indeed, LinkedIn guest listings, Glassdoor).
//! One scraper, configured per board with a URL template and CSS selectors.

use async_trait::async_trait;
use metrics::counter;
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use url::Url;

use super::{iso_date, search_url};
use crate::ingest::fetch::PageFetcher;
use crate::ingest::normalize_text;
use crate::ingest::types::{JobPosting, SourceError, SourceProvider};

#[derive(Debug, Clone)]
pub struct CardSelectors {
    pub card: String,
    pub title: String,
    pub company: String,
    pub location: String,
    /// Anchor inside the card; `None` when the card element itself carries the href.
    pub link: Option<String>,
    /// Element holding a `datetime` attribute or a date as text.
    pub date: Option<String>,
}

pub struct HtmlBoardProvider {
    name: String,
    url_template: String,
    base_url: Url,
    selectors: CardSelectors,
    fetcher: Arc<dyn PageFetcher>,
}

struct Compiled {
    card: Selector,
    title: Selector,
    company: Selector,
    location: Selector,
    link: Option<Selector>,
    date: Option<Selector>,
}

impl HtmlBoardProvider {
    pub fn new(
        name: impl Into<String>,
        url_template: impl Into<String>,
        base_url: Url,
        selectors: CardSelectors,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        Self {
            name: name.into(),
            url_template: url_template.into(),
            base_url,
            selectors,
            fetcher,
        }
    }

    pub fn indeed(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self::new(
            "Indeed",
            "https://www.indeed.com/jobs?q={keyword}",
            Url::parse("https://www.indeed.com/").expect("static url"),
            CardSelectors {
                card: "a.tapItem".into(),
                title: "h2".into(),
                company: ".companyName".into(),
                location: ".companyLocation".into(),
                link: None,
                date: None,
            },
            fetcher,
        )
    }

    pub fn linkedin(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self::new(
            "LinkedIn",
            "https://www.linkedin.com/jobs-guest/jobs/api/seeMoreJobPostings/search?keywords={keyword}&f_TPR=r604800",
            Url::parse("https://www.linkedin.com/").expect("static url"),
            CardSelectors {
                card: "div.base-card".into(),
                title: "h3.base-search-card__title".into(),
                company: "h4.base-search-card__subtitle".into(),
                location: "span.job-search-card__location".into(),
                link: Some("a.base-card__full-link".into()),
                date: Some("time".into()),
            },
            fetcher,
        )
    }

    pub fn glassdoor(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self::new(
            "Glassdoor",
            "https://www.glassdoor.com/Job/jobs.htm?sc.keyword={keyword}",
            Url::parse("https://www.glassdoor.com/").expect("static url"),
            CardSelectors {
                card: r#"li[data-test="jobListing"]"#.into(),
                title: r#"a[data-test="job-title"]"#.into(),
                company: r#"[class*="EmployerProfile_compactEmployerName"]"#.into(),
                location: r#"[data-test="emp-location"]"#.into(),
                link: Some(r#"a[data-test="job-title"]"#.into()),
                date: None,
            },
            fetcher,
        )
    }

    fn compile(&self) -> Result<Compiled, SourceError> {
        let sel = |s: &str| {
            Selector::parse(s).map_err(|e| SourceError::parse(&self.name, format!("selector {s:?}: {e}")))
        };
        Ok(Compiled {
            card: sel(&self.selectors.card)?,
            title: sel(&self.selectors.title)?,
            company: sel(&self.selectors.company)?,
            location: sel(&self.selectors.location)?,
            link: self.selectors.link.as_deref().map(sel).transpose()?,
            date: self.selectors.date.as_deref().map(sel).transpose()?,
        })
    }

    /// Parse one results page. Cards without a title or a resolvable link are skipped.
    pub fn parse_page(&self, html: &str) -> Result<Vec<JobPosting>, SourceError> {
        let sel = self.compile()?;
        let doc = Html::parse_document(html);

        let mut out = Vec::new();
        for card in doc.select(&sel.card) {
            let title = first_text(card, &sel.title);
            if title.is_empty() {
                continue;
            }
            let href = match &sel.link {
                Some(s) => card.select(s).next().and_then(|a| a.value().attr("href")),
                None => card.value().attr("href"),
            };
            let Some(link) = href.and_then(|h| self.base_url.join(h.trim()).ok()) else {
                tracing::debug!(source = %self.name, %title, "card without usable link");
                continue;
            };
            let posted_date = sel
                .date
                .as_ref()
                .and_then(|s| card.select(s).next())
                .map(|el| {
                    el.value()
                        .attr("datetime")
                        .map(str::to_string)
                        .unwrap_or_else(|| el.text().collect::<String>())
                })
                .map(|raw| iso_date(&raw))
                .unwrap_or_default();

            out.push(JobPosting {
                title,
                company: first_text(card, &sel.company),
                location: first_text(card, &sel.location),
                link: link.to_string(),
                posted_date,
            });
        }

        counter!("jobs_fetched_total", "source" => self.name.clone()).increment(out.len() as u64);
        Ok(out)
    }
}

fn first_text(card: ElementRef<'_>, sel: &Selector) -> String {
    card.select(sel)
        .next()
        .map(|el| normalize_text(&el.text().collect::<Vec<_>>().join(" ")))
        .unwrap_or_default()
}

#[async_trait]
impl SourceProvider for HtmlBoardProvider {
    async fn fetch(&self, keyword: &str) -> Result<Vec<JobPosting>, SourceError> {
        let url = search_url(&self.url_template, keyword);
        let body = self.fetcher.get_text(&url).await?;
        self.parse_page(&body)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::fetch::StaticFetcher;

    fn indeed() -> HtmlBoardProvider {
        HtmlBoardProvider::indeed(Arc::new(StaticFetcher::new()))
    }

    #[test]
    fn relative_links_are_resolved() {
        let html = r#"<html><body>
            <a class="tapItem" href="/rc/clk?jk=abc">
              <h2><span>Senior Product&nbsp;Manager</span></h2>
              <span class="companyName">Acme</span>
              <div class="companyLocation">Berlin, Germany</div>
            </a>
        </body></html>"#;
        let jobs = indeed().parse_page(html).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "Senior Product Manager");
        assert_eq!(jobs[0].link, "https://www.indeed.com/rc/clk?jk=abc");
        assert_eq!(jobs[0].posted_date, "");
    }

    #[test]
    fn cards_without_title_or_link_are_skipped() {
        let html = r#"
            <a class="tapItem" href="/x"><h2>  </h2></a>
            <a class="tapItem"><h2>Product Manager</h2></a>
        "#;
        assert!(indeed().parse_page(html).unwrap().is_empty());
    }

    #[test]
    fn bad_selector_is_a_parse_error() {
        let p = HtmlBoardProvider::new(
            "Broken",
            "https://b.test/?q={keyword}",
            Url::parse("https://b.test/").unwrap(),
            CardSelectors {
                card: "div[".into(),
                title: "h2".into(),
                company: "p".into(),
                location: "p".into(),
                link: None,
                date: None,
            },
            Arc::new(StaticFetcher::new()),
        );
        assert!(matches!(p.parse_page("<div></div>"), Err(SourceError::Parse { .. })));
    }
}
