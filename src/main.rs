use std::process;
use std::sync::Arc;

use time::{OffsetDateTime, format_description::FormatItem, macros::format_description};
use tracing::{Dispatch, Level, dispatcher, error};
use tracing_subscriber::fmt as tracing_fmt;

use onepage::{
    application::{
        catalog::{ContentService, PostWithNavigation},
        repos::{ContentRepo, ContentSource, SourceError},
        routes, sitemap,
    },
    cache::{CacheConfig, CachedSource},
    config::{self, Command, OutputArgs, SlugArgs},
    domain::entities::PostSummary,
    infra::{
        client::ApiClient,
        telemetry::{self, TelemetryError},
    },
    util::relative_time,
};

const DETAIL_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]/[month padding:none]/[day padding:none]");

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] config::LoadError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("failed to construct API client: {0}")]
    Client(#[from] SourceError),
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_startup_error(&error);
        process::exit(1);
    }
}

fn report_startup_error(error: &StartupError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "startup error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "startup error");
    });
}

async fn run() -> Result<(), StartupError> {
    let (cli, settings) = config::load_with_cli()?;
    telemetry::init(&settings.logging)?;

    let client = ApiClient::new(
        settings.api.base_url.clone(),
        settings.api.key.clone(),
        settings.api.timeout,
    )?;
    let source: Arc<dyn ContentSource> = if settings.cache.enabled {
        Arc::new(CachedSource::new(
            Arc::new(client),
            &CacheConfig::from(&settings.cache),
        ))
    } else {
        Arc::new(client)
    };
    let service = ContentService::new(ContentRepo::new(source));

    match &cli.command {
        Command::Routes(output) => run_routes(&service, output).await,
        Command::Sitemap(output) => run_sitemap(&service, output).await,
        Command::Post(args) => run_post(&service, args).await,
        Command::Category(args) => run_category(&service, args).await,
        Command::Tag(args) => run_tag(&service, args).await,
        Command::Profile(output) => run_profile(&service, output).await,
    }

    Ok(())
}

async fn run_routes(service: &ContentService, output: &OutputArgs) {
    let plan = routes::route_plan(service).await;
    if output.json {
        print_json(&plan);
        return;
    }
    for path in plan.paths() {
        println!("{path}");
    }
}

async fn run_sitemap(service: &ContentService, output: &OutputArgs) {
    let map = sitemap::sitemap(service).await;
    if output.json {
        print_json(&map);
        return;
    }

    println!("サイトマップ");
    println!();
    println!("固定ページ:");
    for (label, path) in sitemap::FIXED_PAGES {
        println!("- {label} ({path})");
    }

    println!();
    println!("カテゴリ一覧:");
    match &map.categories {
        Some(categories) => {
            for category in categories {
                println!("- {} (/categories/{})", category.name, category.slug);
            }
        }
        None => println!("カテゴリの取得に失敗しました。再度お試しください。"),
    }

    println!();
    println!("タグ一覧:");
    match &map.tags {
        Some(tags) => {
            for tag in tags {
                println!("- #{} (/tags/{})", tag.name, tag.slug);
            }
        }
        None => println!("タグの取得に失敗しました。再度お試しください。"),
    }
}

async fn run_post(service: &ContentService, args: &SlugArgs) {
    match service.post_with_navigation(&args.slug).await {
        Ok(resolved) => {
            if args.output.json {
                print_json(&resolved);
            } else {
                print_post(&resolved);
            }
        }
        Err(err) => {
            error!(slug = %args.slug, error = %err, "post fetch failed");
            degrade(
                args.output.json,
                "投稿内容の取得に失敗しました。再度お試しください。",
            );
        }
    }
}

async fn run_category(service: &ContentService, args: &SlugArgs) {
    match service.posts_by_category(&args.slug).await {
        Ok(feed) => {
            if args.output.json {
                print_json(&feed);
                return;
            }
            match &feed.category {
                Some(category) => {
                    println!("カテゴリ：{}", category.name);
                    if feed.posts.is_empty() {
                        println!("これから書く予定です。。。");
                    }
                    for post in &feed.posts {
                        print_card(post, post.updated_at);
                    }
                }
                None => println!("これから書く予定です。。。"),
            }
        }
        Err(err) => {
            error!(slug = %args.slug, error = %err, "category feed fetch failed");
            degrade(
                args.output.json,
                "ブログ記事の取得に失敗しました。再度お試しください。",
            );
        }
    }
}

async fn run_tag(service: &ContentService, args: &SlugArgs) {
    match service.posts_by_tag(&args.slug).await {
        Ok(feed) => {
            if args.output.json {
                print_json(&feed);
                return;
            }
            match &feed.tag {
                Some(tag) => {
                    println!("タグ：{}", tag.name);
                    if feed.posts.is_empty() {
                        println!("現在、記事がありません。");
                    }
                    for post in &feed.posts {
                        print_card(post, post.published_at);
                    }
                }
                None => println!("現在、記事がありません。"),
            }
        }
        Err(err) => {
            error!(slug = %args.slug, error = %err, "tag feed fetch failed");
            degrade(
                args.output.json,
                "ブログ記事の取得に失敗しました。再度お試しください。",
            );
        }
    }
}

async fn run_profile(service: &ContentService, output: &OutputArgs) {
    match service.profile().await {
        Ok(profile) => {
            if output.json {
                print_json(&profile);
                return;
            }
            println!("{}", profile.name);
            println!("{}", profile.introduction);
            println!("アイコン: {}", profile.icon_image.url);
        }
        Err(err) => {
            error!(error = %err, "profile fetch failed");
            degrade(output.json, "プロフィールの取得に失敗しました。");
        }
    }
}

fn print_post(resolved: &PostWithNavigation) {
    let post = &resolved.post;
    println!("{}", post.title);
    println!("更新日: {}", detail_date(post.updated_at));
    if !post.tags.is_empty() {
        let tags = post
            .tags
            .iter()
            .map(|tag| format!("#{}", tag.name))
            .collect::<Vec<_>>()
            .join(" ");
        println!("タグ：{tags}");
    }
    println!();
    println!("{}", post.body);
    println!();
    if let Some(prev) = &resolved.prev {
        println!("前の記事: {} (/blog/{})", prev.title, prev.slug);
    }
    if let Some(next) = &resolved.next {
        println!("次の記事: {} (/blog/{})", next.title, next.slug);
    }
}

fn print_card(post: &PostSummary, stamp: Option<OffsetDateTime>) {
    match stamp {
        Some(stamp) => println!(
            "- {} (/blog/{}) {}",
            post.title,
            post.slug,
            relative_time::format_relative(stamp)
        ),
        None => println!("- {} (/blog/{})", post.title, post.slug),
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(body) => println!("{body}"),
        Err(err) => error!(error = %err, "failed to encode JSON output"),
    }
}

// A content failure degrades the output instead of failing the command:
// text mode prints the localized fallback copy, JSON mode emits `null`.
fn degrade(json: bool, message: &str) {
    if json {
        println!("null");
    } else {
        println!("{message}");
    }
}

fn detail_date(stamp: OffsetDateTime) -> String {
    stamp
        .format(DETAIL_DATE_FORMAT)
        .unwrap_or_else(|_| stamp.to_string())
}
