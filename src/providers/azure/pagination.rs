use std::future::Future;

use log::debug;

use crate::error::Result;

/// One page of a cursor-paginated listing.
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub continuation_token: Option<String>,
}

impl<T> Page<T> {
    /// Token to echo back for the next page, if any. Empty tokens mean "last page".
    pub fn next_token(&self) -> Option<&str> {
        self.continuation_token
            .as_deref()
            .filter(|token| !token.is_empty())
    }
}

/// Drains a cursor-paginated listing into one ordered sequence.
///
/// `fetch_page` is called with `None` first, then with each non-empty
/// continuation token exactly as the previous page returned it. Items are
/// kept in arrival order and never de-duplicated.
pub async fn collect_all<T, F, Fut>(mut fetch_page: F) -> Result<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut items = Vec::new();
    let mut token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = fetch_page(token.take()).await?;
        pages += 1;

        let next = page.next_token().map(ToOwned::to_owned);
        items.extend(page.items);

        match next {
            Some(next) => token = Some(next),
            None => break,
        }
    }

    debug!("Collected {} items across {pages} pages", items.len());

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SnapshotError;
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_collects_every_page_in_order() {
        let seen_tokens = Mutex::new(Vec::new());

        let items = collect_all(|token: Option<String>| {
            seen_tokens.lock().unwrap().push(token.clone());
            async move {
                let page = match token.as_deref() {
                    None => Page {
                        items: vec![1, 2],
                        continuation_token: Some("t1".to_string()),
                    },
                    Some("t1") => Page {
                        items: vec![3],
                        continuation_token: Some("t2".to_string()),
                    },
                    Some("t2") => Page {
                        items: vec![4, 5],
                        continuation_token: None,
                    },
                    Some(other) => panic!("unexpected token {other}"),
                };
                Ok(page)
            }
        })
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2, 3, 4, 5]);
        assert_eq!(
            *seen_tokens.lock().unwrap(),
            vec![None, Some("t1".to_string()), Some("t2".to_string())]
        );
    }

    #[tokio::test]
    async fn test_empty_token_terminates() {
        let mut calls = 0;

        let items = collect_all(|_token| {
            calls += 1;
            async {
                Ok(Page {
                    items: vec!["a"],
                    continuation_token: Some(String::new()),
                })
            }
        })
        .await
        .unwrap();

        assert_eq!(items, vec!["a"]);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_duplicates_are_kept() {
        let items = collect_all(|token: Option<String>| async move {
            Ok(match token {
                None => Page {
                    items: vec!["same"],
                    continuation_token: Some("next".to_string()),
                },
                Some(_) => Page {
                    items: vec!["same"],
                    continuation_token: None,
                },
            })
        })
        .await
        .unwrap();

        assert_eq!(items, vec!["same", "same"]);
    }

    #[tokio::test]
    async fn test_page_error_aborts_walk() {
        let result: Result<Vec<u32>> = collect_all(|token: Option<String>| async move {
            match token {
                None => Ok(Page {
                    items: vec![1],
                    continuation_token: Some("t1".to_string()),
                }),
                Some(_) => Err(SnapshotError::Api {
                    status: 500,
                    message: "boom".to_string(),
                }),
            }
        })
        .await;

        assert!(matches!(result, Err(SnapshotError::Api { status: 500, .. })));
    }
}
