//! Background commands. Each one owns its inputs, runs on the tokio runtime,
//! and reports back with exactly one message per unit of work.

use crate::data::User;
use crate::jira::IssueService;
use crate::tui::board::BoardState;
use crate::tui::message::{Message, TabLoad};
use crate::util::send_or_log;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Concurrent detail fetches while warming a tab's cache.
const PREFETCH_CONCURRENCY: usize = 3;

pub type Service = Arc<dyn IssueService>;

/// Search and board lookup for one tab.
#[derive(Debug, Clone)]
pub struct TabRequest {
    pub tab: usize,
    pub jql: String,
    pub page_size: usize,
    /// Board id plus the filter used to list its backlog.
    pub board: Option<(u64, String)>,
}

pub fn load_tab(service: Service, tx: mpsc::Sender<Message>, request: TabRequest) {
    tokio::spawn(async move {
        tracing::debug!("Loading tab {}: {}", request.tab, request.jql);
        let result = match service.search(&request.jql, 0, request.page_size).await {
            Ok(page) => {
                tracing::info!(
                    "Tab {} loaded {} of {} issues",
                    request.tab,
                    page.issues.len(),
                    page.total
                );
                let board = match request.board {
                    Some((board_id, filter)) => {
                        match service.backlog_members(board_id, &filter).await {
                            Ok(members) => Some(BoardState::new(
                                board_id,
                                members.into_iter().map(|i| i.key),
                            )),
                            Err(e) => {
                                tracing::warn!("Backlog lookup for board {} failed: {:#}", board_id, e);
                                None
                            }
                        }
                    }
                    None => None,
                };
                Ok(TabLoad {
                    issues: page.issues,
                    board,
                })
            }
            Err(e) => Err(format!("{:#}", e)),
        };
        send_or_log(
            &tx,
            Message::IssuesLoaded {
                tab: request.tab,
                result,
            },
            "tab issues",
        )
        .await;
    });
}

pub fn fetch_detail(
    service: Service,
    tx: mpsc::Sender<Message>,
    tab: usize,
    row: usize,
    key: String,
    generation: u64,
    comment_limit: usize,
) {
    tokio::spawn(async move {
        let result = service
            .get_issue(&key, comment_limit)
            .await
            .map(Arc::new)
            .map_err(|e| format!("{:#}", e));
        send_or_log(
            &tx,
            Message::DetailLoaded {
                tab,
                row,
                key,
                generation,
                result,
            },
            "issue detail",
        )
        .await;
    });
}

/// Warm the cache for `keys` with at most `PREFETCH_CONCURRENCY` requests in flight.
pub fn prefetch(
    service: Service,
    tx: mpsc::Sender<Message>,
    tab: usize,
    keys: Vec<(String, u64)>,
    comment_limit: usize,
) {
    if keys.is_empty() {
        return;
    }
    tokio::spawn(async move {
        tracing::debug!("Prefetching {} issues for tab {}", keys.len(), tab);
        stream::iter(keys)
            .map(|(key, generation)| {
                let service = Arc::clone(&service);
                let tx = tx.clone();
                async move {
                    let result = service
                        .get_issue(&key, comment_limit)
                        .await
                        .map(Arc::new)
                        .map_err(|e| format!("{:#}", e));
                    let msg = Message::Prefetched {
                        tab,
                        key,
                        generation,
                        result,
                    };
                    send_or_log(&tx, msg, "prefetch").await;
                }
            })
            .buffer_unordered(PREFETCH_CONCURRENCY)
            .collect::<Vec<_>>()
            .await;
    });
}

pub fn fetch_users(service: Service, tx: mpsc::Sender<Message>, key: String) {
    tokio::spawn(async move {
        let result = service
            .assignable_users(&key)
            .await
            .map_err(|e| format!("{:#}", e));
        send_or_log(&tx, Message::UsersLoaded(result), "assignable users").await;
    });
}

pub fn fetch_epics(service: Service, tx: mpsc::Sender<Message>, tab: usize, jql: String, limit: usize) {
    tokio::spawn(async move {
        let result = service
            .search(&jql, 0, limit)
            .await
            .map(|page| page.issues)
            .map_err(|e| format!("{:#}", e));
        send_or_log(&tx, Message::EpicsLoaded { tab, result }, "epics").await;
    });
}

pub fn assign_user(service: Service, tx: mpsc::Sender<Message>, tab: usize, key: String, user: User) {
    tokio::spawn(async move {
        tracing::info!("Assigning {} to {}", key, user.display_name);
        let result = service
            .assign(&key, Some(&user))
            .await
            .map_err(|e| format!("{:#}", e));
        send_or_log(&tx, Message::UserAssigned { tab, key, result }, "assignment").await;
    });
}

pub fn toggle_backlog(
    service: Service,
    tx: mpsc::Sender<Message>,
    tab: usize,
    board_id: u64,
    key: String,
    to_backlog: bool,
) {
    tokio::spawn(async move {
        let result = if to_backlog {
            service.move_to_backlog(board_id, &key).await
        } else {
            service.move_to_board(board_id, &key).await
        }
        .map_err(|e| format!("{:#}", e));
        send_or_log(
            &tx,
            Message::BacklogToggled {
                tab,
                key,
                to_backlog,
                result,
            },
            "backlog toggle",
        )
        .await;
    });
}
