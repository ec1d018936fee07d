//! Trackback and webmention endpoints, plus the RSD discovery document.

use std::sync::LazyLock;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::Response;
use regex::Regex;

use crate::collab::templates::escape_html;
use crate::collab::{PingArgs, PingKind};
use crate::document::cache;
use crate::error::FrontError;
use crate::front::{CachePlan, Env, Reply};

static POST_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("post id regex should compile"));

const RSD_NAMESPACE: &str = "http://archipelago.phrasewise.com/rsd";
const ENGINE_NAME: &str = env!("CARGO_PKG_NAME");
/// Empty when the package declares no repository.
const ENGINE_LINK: &str = env!("CARGO_PKG_REPOSITORY");

/// XML-RPC APIs advertised in RSD; the first one is preferred.
const RSD_APIS: &[&str] = &["WordPress", "Movable Type", "MetaWeblog", "Blogger"];

/// `trackback/{post_id}`
pub fn trackback(env: &Env<'_>, args: Option<&str>) -> Result<Reply, FrontError> {
    let id = args
        .filter(|a| POST_ID.is_match(a))
        .and_then(|a| a.parse::<u64>().ok())
        .ok_or(FrontError::NotFound)?;

    env.behaviors().before_receive_trackback(&PingArgs {
        post_id: Some(id),
        kind: PingKind::Trackback,
    });
    Ok(Reply::Done(env.services().pings.receive_trackback(env.req, id)))
}

pub fn webmention(env: &Env<'_>) -> Result<Reply, FrontError> {
    env.behaviors().before_receive_trackback(&PingArgs {
        post_id: None,
        kind: PingKind::Webmention,
    });
    Ok(Reply::Done(env.services().pings.receive_webmention(env.req)))
}

/// Really Simple Discovery document.
pub fn rsd_document(blog_url: &str, xmlrpc_url: Option<&str>) -> String {
    let mut xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <rsd version=\"1.0\" xmlns=\"{RSD_NAMESPACE}\">\n\
         <service>\n  \
         <engineName>{ENGINE_NAME}</engineName>\n"
    );
    if !ENGINE_LINK.is_empty() {
        xml.push_str(&format!("  <engineLink>{}</engineLink>\n", escape_html(ENGINE_LINK)));
    }
    xml.push_str(&format!("  <homePageLink>{}</homePageLink>\n", escape_html(blog_url)));

    if let Some(api_link) = xmlrpc_url {
        let api_link = escape_html(api_link);
        xml.push_str("  <apis>\n");
        for (i, name) in RSD_APIS.iter().enumerate() {
            xml.push_str(&format!(
                "    <api name=\"{name}\" blogID=\"1\" preferred=\"{}\" apiLink=\"{api_link}\"/>\n",
                i == 0
            ));
        }
        xml.push_str("  </apis>\n");
    }

    xml.push_str("</service>\n</rsd>\n");
    xml
}

pub fn rsd(env: &Env<'_>) -> Result<Reply, FrontError> {
    let plan = CachePlan {
        files: env.files().deploy_stamps().to_vec(),
        timestamps: vec![env.blog().updated_at()],
        use_etag: false,
    };

    let mut headers = HeaderMap::new();
    if let Some(last_modified) = cache::last_modified(&plan) {
        cache::set_validators(&mut headers, last_modified, 0);
        if cache::not_modified_since(&env.req.headers, last_modified) {
            return Ok(Reply::Done(cache::not_modified(headers)));
        }
    }

    let xmlrpc = env.settings.enable_xmlrpc.then(|| env.site().xmlrpc_url());
    let body = rsd_document(env.site().url(), xmlrpc.as_deref());
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/xml; charset=UTF-8"),
    );

    let mut response = Response::new(Body::from(body));
    *response.headers_mut() = headers;
    Ok(Reply::Done(response))
}
