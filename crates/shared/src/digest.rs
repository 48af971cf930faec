use chrono::NaiveDate;
use serde::Serialize;

use crate::models::Article;

pub const NO_NEWS_MESSAGE: &str = "No significant fraud news found this week.";
pub const SOCIAL_INTRO: &str = "This week's top fraud & security updates:";
pub const SOCIAL_HASHTAGS: &str =
    "#FraudPrevention #CyberSecurity #Fintech #RiskManagement #SecurityNews";
pub const SOCIAL_ARTICLE_LIMIT: usize = 2;

const TEXT_WIDTH: usize = 80;

/// Rendered output of one run.
#[derive(Debug, Clone, Serialize)]
pub struct Digest {
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
    pub social_post: Option<String>,
}

impl Digest {
    pub fn render(articles: &[Article], date: NaiveDate) -> Self {
        let html_body = DigestFormatter::email_html(articles);
        let text_body = DigestFormatter::email_text(&html_body);
        Self {
            subject: DigestFormatter::email_subject(date),
            html_body,
            text_body,
            social_post: DigestFormatter::social_post(articles),
        }
    }
}

pub struct DigestFormatter;

impl DigestFormatter {
    pub fn email_subject(date: NaiveDate) -> String {
        format!("Your Weekly Fraud News Digest - {}", date.format("%Y-%m-%d"))
    }

    /// Titles and URLs go in verbatim; they are not escaped.
    pub fn email_html(articles: &[Article]) -> String {
        if articles.is_empty() {
            return NO_NEWS_MESSAGE.to_string();
        }

        let mut html = String::new();
        html.push_str("<html>\n<head></head>\n");
        html.push_str("<body style=\"font-family: Arial, sans-serif;\">\n");
        html.push_str("  <h2>Weekly Fraud &amp; Security News Digest</h2>\n");
        html.push_str("  <p>Here are the top stories from the past week:</p>\n");

        for article in articles {
            html.push_str(&Self::article_block(article));
            html.push('\n');
        }

        html.push_str("  <p><em>Automated digest by your friendly Givi-bot.</em></p>\n");
        html.push_str("</body>\n</html>");
        html
    }

    fn article_block(article: &Article) -> String {
        let mut block = format!(
            "  <p><strong><a href=\"{}\">{}</a></strong><br><small>Source: {}</small>",
            article.url, article.title, article.source
        );
        if let Some(summary) = &article.ai_summary {
            block.push_str(&format!("<br><em>AI Summary: {}</em>", summary));
        }
        block.push_str("</p>");
        block
    }

    /// Plain-text alternative for mail clients that do not render HTML.
    pub fn email_text(html: &str) -> String {
        html2text::from_read(html.as_bytes(), TEXT_WIDTH)
    }

    /// `None` when there is nothing to post.
    pub fn social_post(articles: &[Article]) -> Option<String> {
        if articles.is_empty() {
            return None;
        }

        let mut post = format!("{}\n\n", SOCIAL_INTRO);
        for article in articles.iter().take(SOCIAL_ARTICLE_LIMIT) {
            post.push_str(&format!("➡️ {}\n{}\n\n", article.title, article.url));
        }
        post.push_str(SOCIAL_HASHTAGS);
        Some(post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> Vec<Article> {
        vec![
            Article::new("A", "u1", "Reuters"),
            Article::new("B", "u2", "BBC"),
            Article::new("C", "u3", "AP"),
        ]
    }

    fn article_blocks(html: &str) -> Vec<&str> {
        html.lines()
            .map(str::trim)
            .filter(|l| l.starts_with("<p><strong>"))
            .collect()
    }

    // ==================== Email Tests ====================

    #[test]
    fn test_email_one_block_per_article_in_order() {
        let html = DigestFormatter::email_html(&abc());
        let blocks = article_blocks(&html);

        assert_eq!(blocks.len(), 3);
        assert_eq!(
            blocks[0],
            "<p><strong><a href=\"u1\">A</a></strong><br><small>Source: Reuters</small></p>"
        );
        assert!(blocks[1].contains("<a href=\"u2\">B</a>"));
        assert!(blocks[2].contains("<a href=\"u3\">C</a>"));
        assert!(html.contains("Givi-bot"));
    }

    #[test]
    fn test_email_empty_input_is_no_news_message() {
        assert_eq!(DigestFormatter::email_html(&[]), NO_NEWS_MESSAGE);
    }

    #[test]
    fn test_email_includes_summary_inside_block() {
        let mut articles = abc();
        articles[1].ai_summary = Some("Regulators fined a bank.".to_string());

        let html = DigestFormatter::email_html(&articles);
        let blocks = article_blocks(&html);

        assert!(!blocks[0].contains("AI Summary"));
        assert!(blocks[1].ends_with("<br><em>AI Summary: Regulators fined a bank.</em></p>"));
    }

    #[test]
    fn test_email_does_not_escape_titles() {
        let articles = vec![Article::new("Q&A <live>", "https://x.example/?a=1&b=2", "S")];
        let html = DigestFormatter::email_html(&articles);
        assert!(html.contains(">Q&A <live></a>"));
        assert!(html.contains("href=\"https://x.example/?a=1&b=2\""));
    }

    #[test]
    fn test_subject_embeds_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(
            DigestFormatter::email_subject(date),
            "Your Weekly Fraud News Digest - 2026-10-19"
        );
    }

    #[test]
    fn test_email_text_contains_titles() {
        let text = DigestFormatter::email_text(&DigestFormatter::email_html(&abc()));
        assert!(text.contains("Source: Reuters"));
        assert!(!text.contains("<p>"));
    }

    // ==================== Social Post Tests ====================

    #[test]
    fn test_social_post_limits_to_two_articles() {
        let post = DigestFormatter::social_post(&abc()).unwrap();

        assert_eq!(
            post,
            "This week's top fraud & security updates:\n\n\
             ➡️ A\nu1\n\n\
             ➡️ B\nu2\n\n\
             #FraudPrevention #CyberSecurity #Fintech #RiskManagement #SecurityNews"
        );
        assert!(!post.contains("u3"));
        assert_eq!(post.matches("➡️").count(), 2);
    }

    #[test]
    fn test_social_post_single_article() {
        let post = DigestFormatter::social_post(&abc()[..1]).unwrap();
        assert_eq!(post.matches("➡️").count(), 1);
        assert!(post.ends_with(SOCIAL_HASHTAGS));
    }

    #[test]
    fn test_social_post_empty_is_none() {
        assert!(DigestFormatter::social_post(&[]).is_none());
    }

    #[test]
    fn test_render_empty_digest() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let digest = Digest::render(&[], date);
        assert_eq!(digest.html_body, NO_NEWS_MESSAGE);
        assert!(digest.social_post.is_none());
    }
}
