//! `@user@example.com` mentions in edited markdown.
//!
//! An email typed after `@` becomes a real mention when it belongs to a user
//! the issue can be assigned to. Anything unresolved stays as plain text.

use crate::config::Installation;
use crate::data::User;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static EMAIL_MENTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("mention regex is valid")
});

/// Mention as typed (`@jane@example.com`) to the user id the server expects.
pub type Mentions = HashMap<String, String>;

/// Distinct mentions in `markdown`, in order of first appearance.
pub fn mentioned_emails(markdown: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for m in EMAIL_MENTION.find_iter(markdown) {
        if !found.iter().any(|f| f == m.as_str()) {
            found.push(m.as_str().to_string());
        }
    }
    found
}

/// Match `mentioned` against `users` by email address.
pub fn resolve(mentioned: &[String], users: &[User], installation: Installation) -> Mentions {
    let mut resolved = Mentions::new();
    for typed in mentioned {
        let email = typed.trim_start_matches('@');
        let id = users
            .iter()
            .find(|u| u.email.as_deref().is_some_and(|e| e.eq_ignore_ascii_case(email)))
            .and_then(|u| u.assign_id(installation));
        match id {
            Some(id) => {
                tracing::info!("Resolved {} to user {}", typed, id);
                resolved.insert(typed.clone(), id.to_string());
            }
            None => tracing::warn!("No assignable user with email {}, leaving it as text", email),
        }
    }
    resolved
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece<'a> {
    Text(&'a str),
    Mention { typed: &'a str, id: &'a str },
}

/// Cut `text` around the resolved mentions it contains.
pub fn split<'a>(text: &'a str, mentions: &'a Mentions) -> Vec<Piece<'a>> {
    let mut pieces = Vec::new();
    let mut rest = 0;
    if !mentions.is_empty() {
        for m in EMAIL_MENTION.find_iter(text) {
            let Some(id) = mentions.get(m.as_str()) else {
                continue;
            };
            if m.start() > rest {
                pieces.push(Piece::Text(&text[rest..m.start()]));
            }
            pieces.push(Piece::Mention {
                typed: m.as_str(),
                id,
            });
            rest = m.end();
        }
    }
    if rest < text.len() {
        pieces.push(Piece::Text(&text[rest..]));
    }
    pieces
}
