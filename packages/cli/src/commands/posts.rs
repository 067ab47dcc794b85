use anyhow::{bail, Result};
use api::{ApiError, Collection, PostDraft};
use store::{Page, Post};
use ui::{guard, DetailState, Guard, ListState, PaginatedList, PostDetail, PostList, Route};

use super::App;

/// Print one page. `page` is one-based, as shown to the user.
pub async fn list(app: &mut App, member: Option<i64>, page: u32, size: Option<u32>) -> Result<()> {
    let collection = member.map_or(Collection::All, Collection::Member);
    let size = size.unwrap_or_else(|| app.config.page_size());
    let requested = page.max(1) - 1;

    if let Collection::Member(id) = collection {
        let name = match app.client.member_name(id).await {
            Ok(name) => name,
            Err(err) => {
                tracing::warn!("Could not look up member {}: {}", id, err);
                format!("member #{id}")
            }
        };
        println!("Posts by {name}");
    }

    let list = PaginatedList::new(PostList::new(app.client.clone(), collection), size);
    list.go_to_page(requested).await;

    match list.state() {
        ListState::Loaded(page) => {
            if page.page_index != requested {
                println!(
                    "Page {} no longer exists, showing page {}",
                    requested + 1,
                    page.page_index + 1
                );
            }
            print_page(&page);
            Ok(())
        }
        ListState::Failed(err) => Err(err.into()),
        ListState::Idle | ListState::Loading => Ok(()),
    }
}

pub async fn show(app: &mut App, id: i64) -> Result<()> {
    let detail = load(app, id).await?;
    let Some(post) = detail.post() else {
        return Ok(());
    };

    println!("#{} {}", post.id, post.title);
    println!(
        "by {} ({}) on {}",
        post.author_name,
        Route::MemberBlog(post.author_id),
        post.created_at.format("%Y-%m-%d %H:%M")
    );
    println!();
    println!("{}", post.body);
    if detail.can_modify(&app.session().current()) {
        println!();
        println!("blog edit {id}  |  blog delete {id}");
    }
    Ok(())
}

pub async fn create(app: &mut App, title: String, content: String) -> Result<()> {
    require_session(app, Route::CreatePost)?;

    let post = app.client.create(&PostDraft::new(title, content)).await?;
    app.success(&format!("Created post #{} at {}", post.id, Route::PostDetail(post.id)));
    Ok(())
}

pub async fn edit(
    app: &mut App,
    id: i64,
    title: Option<String>,
    content: Option<String>,
) -> Result<()> {
    require_session(app, Route::EditPost(id))?;

    let detail = load(app, id).await?;
    let Some(post) = owned_post(app, &detail)? else {
        return Ok(());
    };

    let mut draft = PostDraft::from_post(&post);
    if let Some(title) = title {
        draft.title = title;
    }
    if let Some(content) = content {
        draft.content = content;
    }
    if draft == PostDraft::from_post(&post) {
        println!("Nothing to change");
        return Ok(());
    }

    let updated = app.client.update(id, &draft).await?;
    app.success(&format!("Updated post #{}", updated.id));
    Ok(())
}

pub async fn delete(app: &mut App, id: i64) -> Result<()> {
    let detail = load(app, id).await?;
    if owned_post(app, &detail)?.is_none() {
        return Ok(());
    }

    detail.delete().await?;
    if detail.state() == DetailState::Deleted {
        app.success(&format!("Deleted post #{id}. Back to {}", Route::BlogList));
    }
    Ok(())
}

async fn load(app: &App, id: i64) -> Result<PostDetail<store::FileStore, api::ReqwestTransport>> {
    let detail = PostDetail::new(app.client.clone());
    detail.load(id).await;
    match detail.state() {
        DetailState::NotFound => Err(ApiError::NotFound.into()),
        DetailState::Failed(err) => Err(err.into()),
        _ => Ok(detail),
    }
}

fn owned_post(
    app: &App,
    detail: &PostDetail<store::FileStore, api::ReqwestTransport>,
) -> Result<Option<Post>> {
    if !detail.can_modify(&app.session().current()) {
        bail!("Only the author can change this post");
    }
    Ok(detail.post())
}

fn require_session(app: &App, route: Route) -> Result<()> {
    match guard(&route, &app.session().current()) {
        Guard::Allow => Ok(()),
        Guard::Redirect(_) => Err(ApiError::auth("Login required").into()),
    }
}

fn print_page(page: &Page<Post>) {
    if page.is_empty() {
        println!("No posts yet");
        return;
    }
    for post in &page.items {
        println!(
            "{:>6}  {:<40}  {:<16}  {}",
            post.id,
            truncate(&post.title, 40),
            truncate(&post.author_name, 16),
            post.created_at.format("%Y-%m-%d")
        );
    }
    println!(
        "Page {} of {} ({} posts)",
        page.page_index + 1,
        page.total_pages.max(1),
        page.total_elements
    );
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}
