//! Detail view of a single post

use serde::Serialize;

use crate::content::reading::{read_time, total_words};
use crate::content::PostDetail;
use crate::helpers::{date_xml, format_publication_date, is_safe_url, DateStyle};

/// A post shaped for the detail template
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub uid: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub date: String,
    pub datetime: Option<String>,
    pub banner_url: Option<String>,
    pub banner_alt: String,
    pub total_words: usize,
    /// Estimated reading time in minutes
    pub read_time: usize,
    pub sections: Vec<SectionView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
    pub heading: String,
    /// Sanitized markup of the section body
    pub html: String,
}

impl PostView {
    pub fn new(post: &PostDetail, style: &DateStyle, words_per_minute: usize) -> Self {
        let total_words = total_words(&post.content);

        Self {
            uid: post.uid.clone(),
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            author: post.author.clone(),
            date: format_publication_date(post.first_publication_date.as_ref(), style),
            datetime: post.first_publication_date.as_ref().map(date_xml),
            banner_url: post.banner.url.clone().filter(|url| is_safe_url(url)),
            banner_alt: post.banner.alt.clone().unwrap_or_default(),
            total_words,
            read_time: read_time(total_words, words_per_minute),
            sections: post
                .content
                .iter()
                .map(|section| SectionView {
                    heading: section.heading.clone(),
                    html: section.body.as_html(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::fake::detail_doc;
    use crate::content::reading::DEFAULT_WORDS_PER_MINUTE;
    use crate::content::{Banner, ContentSection, RichText, RichTextBlock};

    #[test]
    fn test_view_from_document() {
        let ten = "one two three four five six seven eight nine ten";
        let doc = detail_doc(
            "hooks",
            "2021-03-19T00:00:00+0000",
            vec![("Three word heading", ten), ("Another three words", ten)],
        );
        let post = PostDetail::try_from(doc).unwrap();
        let view = PostView::new(&post, &DateStyle::default(), DEFAULT_WORDS_PER_MINUTE);

        assert_eq!(view.total_words, 26);
        assert_eq!(view.read_time, 1);
        assert_eq!(view.date, "19 Mar 2021");
        assert_eq!(view.title, "Post hooks");
        assert_eq!(
            view.banner_url.as_deref(),
            Some("https://images.prismic.io/hooks.png")
        );
        assert_eq!(view.sections.len(), 2);
        assert_eq!(view.sections[0].html, format!("<p>{}</p>", ten));
    }

    #[test]
    fn test_long_post_read_time() {
        let words = vec!["word"; 201].join(" ");
        let post = PostDetail {
            uid: "long".to_string(),
            first_publication_date: None,
            last_publication_date: None,
            title: "Long".to_string(),
            subtitle: String::new(),
            author: String::new(),
            banner: Banner {
                url: Some("javascript:alert(1)".to_string()),
                alt: None,
            },
            content: vec![ContentSection {
                heading: String::new(),
                body: RichText(vec![RichTextBlock::paragraph(&words)]),
            }],
        };
        let view = PostView::new(&post, &DateStyle::default(), DEFAULT_WORDS_PER_MINUTE);

        assert_eq!(view.total_words, 201);
        assert_eq!(view.read_time, 2);
        assert_eq!(view.date, "");
        assert!(view.banner_url.is_none());
    }
}
