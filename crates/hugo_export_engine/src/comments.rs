use hugo_export_core::text::{decode_entities, escape_url};
use hugo_export_core::{iso_utc, Comment, ContentStore, Document, FrontMatter, Post, StoreError};
use serde_yaml::{Mapping, Value};

use crate::convert::{convert_content, Converter};

pub const COMMENTS_FILENAME: &str = "comments.md";

/// Side document holding a post's approved comments, oldest first.
/// `None` when the post has nothing to show.
pub fn build_comments_document(
    store: &dyn ContentStore,
    converter: &dyn Converter,
    post: &Post,
) -> Result<Option<Document>, StoreError> {
    let mut comments: Vec<Comment> = store
        .comments(post.id)?
        .into_iter()
        .filter(Comment::is_exportable)
        .collect();
    if comments.is_empty() {
        return Ok(None);
    }
    comments.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));

    let mut front_matter = FrontMatter::new();
    front_matter.insert(
        "title",
        format!("Comments on {}", decode_entities(&post.title)),
    );
    front_matter.insert("date", post.iso_date());

    let mut entries = Mapping::new();
    let mut body = String::from("## Comments\n");
    for comment in &comments {
        let text = convert_content(converter, &comment.content).body;
        let text = text.trim();
        entries.insert(Value::from(comment.id), comment_entry(comment, text));
        body.push_str(&format!(
            "\n### Comment by {} on {}\n\n{text}\n",
            comment.author,
            comment.date.format("%Y-%m-%d %H:%M:%S %z"),
        ));
    }
    front_matter.insert("comments", Value::Mapping(entries));

    Ok(Some(Document::new(front_matter, body)))
}

fn comment_entry(comment: &Comment, text: &str) -> Value {
    let mut entry = Mapping::new();
    entry.insert("type".into(), comment.comment_type.clone().into());
    entry.insert("author".into(), comment.author.clone().into());
    entry.insert("email".into(), comment.author_email.clone().into());
    entry.insert("url".into(), escape_url(&comment.author_url).into());
    entry.insert("date_gmt".into(), iso_utc(&comment.date).into());
    entry.insert("text".into(), text.into());
    Value::Mapping(entry)
}
