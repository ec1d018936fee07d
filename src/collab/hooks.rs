//! Extension hooks.
//!
//! A `Behavior` overrides only the points it cares about; every method has a
//! no-op default. `Behaviors` calls each registered behavior in registration
//! order.

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::response::Response;

use crate::collab::blog::{NewComment, StoredComment};
use crate::front::RequestContext;
use crate::http::PublicRequest;

/// Which ping protocol is being received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PingKind {
    Trackback,
    Webmention,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingArgs {
    pub post_id: Option<u64>,
    pub kind: PingKind,
}

/// A rendered document before it is turned into a response.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub content: Vec<u8>,
    pub content_type: String,
    pub template: String,
    pub headers: HeaderMap,
}

pub trait Behavior: Send + Sync {
    fn before_document(&self, _req: &PublicRequest, _ctx: &mut RequestContext) {}

    fn after_document(&self, _ctx: &RequestContext, _response: &mut Response) {}

    fn before_get_data(&self, _ctx: &mut RequestContext) {}

    fn document_headers(&self, _headers: &mut HeaderMap) {}

    fn serve_document(&self, _doc: &mut RenderedDocument) {}

    /// Replacement HTML for raw comment content.
    fn transform_comment(&self, _raw: &str) -> Option<String> {
        None
    }

    /// An `Err` rejects the comment with a message shown to the author.
    fn before_comment_create(&self, _comment: &mut NewComment) -> Result<(), String> {
        Ok(())
    }

    fn after_comment_create(&self, _comment: &NewComment, _stored: &StoredComment) {}

    /// Appended to the post-comment redirect URL.
    fn comment_redirect_suffix(&self, _stored: &StoredComment) -> String {
        String::new()
    }

    fn before_receive_trackback(&self, _args: &PingArgs) {}
}

/// Registered behaviors.
#[derive(Clone, Default)]
pub struct Behaviors {
    list: Vec<Arc<dyn Behavior>>,
}

impl Behaviors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, behavior: Arc<dyn Behavior>) {
        self.list.push(behavior);
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn before_document(&self, req: &PublicRequest, ctx: &mut RequestContext) {
        self.list.iter().for_each(|b| b.before_document(req, ctx));
    }

    pub fn after_document(&self, ctx: &RequestContext, response: &mut Response) {
        self.list.iter().for_each(|b| b.after_document(ctx, response));
    }

    pub fn before_get_data(&self, ctx: &mut RequestContext) {
        self.list.iter().for_each(|b| b.before_get_data(ctx));
    }

    pub fn document_headers(&self, headers: &mut HeaderMap) {
        self.list.iter().for_each(|b| b.document_headers(headers));
    }

    pub fn serve_document(&self, doc: &mut RenderedDocument) {
        self.list.iter().for_each(|b| b.serve_document(doc));
    }

    /// Concatenated output of every behavior; `None` when all of them pass.
    pub fn transform_comment(&self, raw: &str) -> Option<String> {
        let out: String = self
            .list
            .iter()
            .filter_map(|b| b.transform_comment(raw))
            .collect();
        (!out.is_empty()).then_some(out)
    }

    /// Stops at the first rejection.
    pub fn before_comment_create(&self, comment: &mut NewComment) -> Result<(), String> {
        self.list
            .iter()
            .try_for_each(|b| b.before_comment_create(comment))
    }

    pub fn after_comment_create(&self, comment: &NewComment, stored: &StoredComment) {
        self.list
            .iter()
            .for_each(|b| b.after_comment_create(comment, stored));
    }

    pub fn comment_redirect_suffix(&self, stored: &StoredComment) -> String {
        self.list
            .iter()
            .map(|b| b.comment_redirect_suffix(stored))
            .collect()
    }

    pub fn before_receive_trackback(&self, args: &PingArgs) {
        self.list.iter().for_each(|b| b.before_receive_trackback(args));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::blog::CommentStatus;

    struct Shouty;

    impl Behavior for Shouty {
        fn transform_comment(&self, raw: &str) -> Option<String> {
            Some(format!("<p>{}</p>", raw.to_uppercase()))
        }

        fn comment_redirect_suffix(&self, stored: &StoredComment) -> String {
            format!("#c{}", stored.id)
        }
    }

    struct Gatekeeper;

    impl Behavior for Gatekeeper {
        fn before_comment_create(&self, comment: &mut NewComment) -> Result<(), String> {
            if comment.content.contains("casino") {
                Err("No gambling".into())
            } else {
                comment.author = comment.author.trim().to_string();
                Ok(())
            }
        }
    }

    fn comment(content: &str) -> NewComment {
        NewComment {
            post_id: 1,
            author: "  Ann ".into(),
            email: "ann@example.org".into(),
            site: String::new(),
            content: content.into(),
            ip: None,
            trackback: false,
            status: None,
        }
    }

    #[test]
    fn test_empty_behaviors_are_no_ops() {
        let behaviors = Behaviors::new();
        assert!(behaviors.is_empty());
        assert_eq!(behaviors.transform_comment("hi"), None);
        let stored = StoredComment { id: 3, status: CommentStatus::Published };
        assert_eq!(behaviors.comment_redirect_suffix(&stored), "");
    }

    #[test]
    fn test_transform_and_suffix_concatenate() {
        let mut behaviors = Behaviors::new();
        behaviors.register(Arc::new(Shouty));
        behaviors.register(Arc::new(Gatekeeper));

        assert_eq!(behaviors.transform_comment("hi").as_deref(), Some("<p>HI</p>"));
        let stored = StoredComment { id: 3, status: CommentStatus::Published };
        assert_eq!(behaviors.comment_redirect_suffix(&stored), "#c3");
    }

    #[test]
    fn test_before_comment_create_can_reject() {
        let mut behaviors = Behaviors::new();
        behaviors.register(Arc::new(Gatekeeper));

        let mut ok = comment("hello");
        assert!(behaviors.before_comment_create(&mut ok).is_ok());
        assert_eq!(ok.author, "Ann");

        let mut spam = comment("best casino");
        assert_eq!(behaviors.before_comment_create(&mut spam), Err("No gambling".into()));
    }
}
